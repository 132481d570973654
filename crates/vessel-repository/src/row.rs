use vessel_ais::Mmsi;

/// One persisted row (spec §6's "Persisted vessel row").
#[derive(Debug, Clone, PartialEq)]
pub struct VesselRow {
    pub mmsi: Mmsi,
    pub imo: i64,
    pub name: String,
    pub callsign: String,
    pub ship_type: i32,
    pub bow: i32,
    pub stern: i32,
    pub port: i32,
    pub starboard: i32,
    pub first_sight: i64,
    pub last_sight: i64,
    pub has_static_data: bool,
    pub static_data_received: Option<i64>,
}

impl VesselRow {
    pub(crate) fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            mmsi: Mmsi::parse(&row.get::<_, String>("mmsi")?)
                .expect("mmsi column holds only values this repository wrote"),
            imo: row.get("imo")?,
            name: row.get("name")?,
            callsign: row.get("callsign")?,
            ship_type: row.get("type")?,
            bow: row.get("bow")?,
            stern: row.get("stern")?,
            port: row.get("port")?,
            starboard: row.get("starboard")?,
            first_sight: row.get("first_sight")?,
            last_sight: row.get("last_sight")?,
            has_static_data: row.get::<_, i64>("has_static_data")? != 0,
            static_data_received: row.get("static_data_received")?,
        })
    }
}

/// Input to [`crate::Repository::upsert_vessel`]: the manager has already
/// applied spec §4.4 step 3's defaults, so every field here is concrete.
#[derive(Debug, Clone)]
pub struct UpsertVessel {
    pub mmsi: Mmsi,
    pub imo: i64,
    pub name: String,
    pub callsign: String,
    pub ship_type: i32,
    pub bow: i32,
    pub stern: i32,
    pub port: i32,
    pub starboard: i32,
}

/// Aggregate counts for the admin surface (spec §4.3's `get_vessel_stats`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VesselStats {
    pub total: i64,
    pub identified: i64,
    pub unknown: i64,
    pub percent_identified: f64,
}
