use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use crate::dto::VesselView;
use crate::state::AdminState;

pub fn router(state: AdminState) -> Router {
    Router::new()
        .route("/api/vessels", get(list_vessels))
        .route("/api/vessels/:mmsi", get(get_vessel))
        .route("/api/config", get(get_config))
        .with_state(state)
}

async fn list_vessels(State(state): State<AdminState>) -> Json<Vec<VesselView>> {
    let vessels = state.manager.get_all_vessels().into_iter().map(VesselView::from).collect();
    Json(vessels)
}

async fn get_vessel(State(state): State<AdminState>, Path(mmsi): Path<String>) -> Result<Json<VesselView>, StatusCode> {
    state
        .manager
        .get_vessel(&mmsi)
        .map(VesselView::from)
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn get_config(State(state): State<AdminState>) -> Json<serde_json::Value> {
    Json(toml_table_to_json(state.config.get_all()))
}

/// `toml::Table` has no `serde_json::Value` conversion in the `toml` crate
/// directly (its own `Value` enum differs in shape — e.g. datetimes), so the
/// admin surface walks it by hand.
fn toml_table_to_json(table: toml::Table) -> serde_json::Value {
    serde_json::Value::Object(table.into_iter().map(|(k, v)| (k, toml_value_to_json(v))).collect())
}

fn toml_value_to_json(value: toml::Value) -> serde_json::Value {
    match value {
        toml::Value::String(s) => serde_json::Value::String(s),
        toml::Value::Integer(i) => serde_json::Value::Number(i.into()),
        toml::Value::Float(f) => serde_json::Number::from_f64(f).map(serde_json::Value::Number).unwrap_or(serde_json::Value::Null),
        toml::Value::Boolean(b) => serde_json::Value::Bool(b),
        toml::Value::Datetime(dt) => serde_json::Value::String(dt.to_string()),
        toml::Value::Array(items) => serde_json::Value::Array(items.into_iter().map(toml_value_to_json).collect()),
        toml::Value::Table(table) => toml_table_to_json(table),
    }
}
