use std::sync::Arc;

use tower::ServiceExt;

use vessel_admin::{router, AdminState};
use vessel_ais::{topics, DecodedMessage};
use vessel_bus::Bus;
use vessel_config::ConfigManager;
use vessel_manager::{ManagerConfig, VesselManager};

async fn harness() -> (AdminState, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let repo = vessel_repository::Repository::start(dir.path().join("db.sqlite")).await.unwrap();
    let bus = Bus::new();
    let manager = Arc::new(VesselManager::new(bus.clone(), Arc::new(repo), ManagerConfig::default()));
    manager.start();

    let config = Arc::new(ConfigManager::new(dir.path().join("config.toml")));
    config.set("max_tracked", 50i64.into()).unwrap();

    bus.publish(
        topics::AIS_DECODED,
        DecodedMessage { mmsi: 235098765, msg_type: 1, lat: Some(53.40), lon: Some(-3.00), ..Default::default() },
    );
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    (AdminState { manager, config }, dir)
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn lists_tracked_vessels() {
    let (state, _dir) = harness().await;
    let response = router(state)
        .oneshot(axum::http::Request::builder().uri("/api/vessels").body(axum::body::Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), axum::http::StatusCode::OK);
    let vessels = body_json(response).await;
    assert_eq!(vessels.as_array().unwrap().len(), 1);
    assert_eq!(vessels[0]["mmsi"], "235098765");
}

#[tokio::test]
async fn unknown_vessel_is_not_found() {
    let (state, _dir) = harness().await;
    let response = router(state)
        .oneshot(axum::http::Request::builder().uri("/api/vessels/999999999").body(axum::body::Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), axum::http::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn exposes_config_as_json() {
    let (state, _dir) = harness().await;
    let response = router(state)
        .oneshot(axum::http::Request::builder().uri("/api/config").body(axum::body::Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), axum::http::StatusCode::OK);
    let config = body_json(response).await;
    assert_eq!(config["max_tracked"], 50);
}
