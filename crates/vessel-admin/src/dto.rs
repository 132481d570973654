use serde::Serialize;
use vessel_ais::vessel_full_type_name;
use vessel_manager::VesselRecord;

/// Wire representation of a [`VesselRecord`] for the admin API.
///
/// Kept separate from the internal domain type so the tracker's in-memory
/// shape can evolve without breaking this external interface (spec §1 draws
/// the admin surface's boundary at "reads/writes configuration... via the
/// interfaces defined in §6", not at the manager's internal record layout).
#[derive(Debug, Serialize)]
pub struct VesselView {
    pub mmsi: String,
    pub name: String,
    pub callsign: String,
    pub ship_type: i32,
    pub ship_type_name: String,
    pub imo: i64,
    pub has_static_data: bool,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub cog: Option<f64>,
    pub speed: Option<f64>,
    pub heading: Option<f64>,
    pub zone: Option<String>,
    pub first_sight: i64,
    pub last_sight: i64,
    pub ts: i64,
}

impl From<VesselRecord> for VesselView {
    fn from(record: VesselRecord) -> Self {
        Self {
            mmsi: record.mmsi.to_string(),
            name: record.static_data.name,
            callsign: record.static_data.callsign,
            ship_type: record.static_data.ship_type,
            ship_type_name: vessel_full_type_name(Some(record.static_data.ship_type)),
            imo: record.static_data.imo,
            has_static_data: record.static_data.has_static_data,
            lat: record.dynamic.lat,
            lon: record.dynamic.lon,
            cog: record.dynamic.cog,
            speed: record.dynamic.speed,
            heading: record.dynamic.heading,
            zone: record.dynamic.zone,
            first_sight: record.first_sight,
            last_sight: record.last_sight,
            ts: record.ts,
        }
    }
}
