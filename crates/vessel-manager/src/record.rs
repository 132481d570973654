use vessel_ais::{Dimensions, Mmsi};
use vessel_repository::VesselRow;

/// Identity fields carried by type-5 messages (spec §3's "Static").
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StaticData {
    pub name: String,
    pub callsign: String,
    pub ship_type: i32,
    pub imo: i64,
    pub dimensions: Dimensions,
    pub has_static_data: bool,
    pub static_data_received: Option<i64>,
}

impl StaticData {
    fn from_row(row: &VesselRow) -> Self {
        Self {
            name: row.name.clone(),
            callsign: row.callsign.clone(),
            ship_type: row.ship_type,
            imo: row.imo,
            dimensions: Dimensions {
                to_bow: row.bow,
                to_stern: row.stern,
                to_port: row.port,
                to_starboard: row.starboard,
            },
            has_static_data: row.has_static_data,
            static_data_received: row.static_data_received,
        }
    }
}

/// Transient fields carried by position-report messages (spec §3's
/// "Dynamic"), plus the zone membership derived from them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DynamicData {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub cog: Option<f64>,
    pub speed: Option<f64>,
    pub heading: Option<f64>,
    pub zone: Option<String>,
}

/// The subset of dynamic fields a single decoded message carries, used to
/// overlay onto a vessel's previous [`DynamicData`] (spec §4.4 step 8/10).
#[derive(Debug, Clone, Default)]
pub struct DynamicUpdate {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub cog: Option<f64>,
    pub speed: Option<f64>,
    pub heading: Option<f64>,
}

impl DynamicData {
    /// Field-wise overlay: only fields actually present in `update` replace
    /// the existing value. `zone` is replaced only when `zone` is `Some`
    /// (i.e. this message carried a position, per spec §4.4 step 9) — the
    /// distinction between "not recomputed" and "recomputed to no zone" is
    /// why `zone` takes `Option<Option<String>>` rather than flattening.
    fn merged(&self, update: &DynamicUpdate, zone: Option<Option<String>>) -> Self {
        Self {
            lat: update.lat.or(self.lat),
            lon: update.lon.or(self.lon),
            cog: update.cog.or(self.cog),
            speed: update.speed.or(self.speed),
            heading: update.heading.or(self.heading),
            zone: zone.unwrap_or_else(|| self.zone.clone()),
        }
    }
}

/// The reconciled view of one ship (spec §3's "Vessel record").
#[derive(Debug, Clone, PartialEq)]
pub struct VesselRecord {
    pub mmsi: Mmsi,
    pub static_data: StaticData,
    pub dynamic: DynamicData,
    /// Unix timestamp of the last update to this record in this session.
    pub ts: i64,
    pub first_sight: i64,
    pub last_sight: i64,
}

impl VesselRecord {
    /// A freshly-created record with no prior static or dynamic data (spec
    /// §4.4 step 4's "not found" branch: "Baseline is empty").
    pub fn empty(mmsi: Mmsi) -> Self {
        Self {
            mmsi,
            static_data: StaticData::default(),
            dynamic: DynamicData::default(),
            ts: 0,
            first_sight: 0,
            last_sight: 0,
        }
    }

    /// Reconstruct a baseline record from a stored repository row (spec
    /// §4.4 step 4's "found" branch: "Use the stored record as the
    /// baseline").
    pub fn from_row(row: &VesselRow) -> Self {
        Self {
            mmsi: row.mmsi.clone(),
            static_data: StaticData::from_row(row),
            dynamic: DynamicData::default(),
            ts: 0,
            first_sight: row.first_sight,
            last_sight: row.last_sight,
        }
    }

    /// Apply the repository's post-write row and this message's dynamic
    /// fields on top of `self` as the baseline (spec §4.4 step 10: "Merge
    /// baseline ← repo result ← dynamic data ← `{ts: now_unix}`").
    pub fn merged(&self, row: &VesselRow, update: &DynamicUpdate, zone: Option<Option<String>>, now: i64) -> Self {
        Self {
            mmsi: row.mmsi.clone(),
            static_data: StaticData::from_row(row),
            dynamic: self.dynamic.merged(update, zone),
            ts: now,
            first_sight: row.first_sight,
            last_sight: row.last_sight,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dynamic_overlay_keeps_fields_not_present_in_update() {
        let base = DynamicData {
            lat: Some(1.0),
            lon: Some(2.0),
            zone: Some("harbour".into()),
            ..Default::default()
        };
        let update = DynamicUpdate {
            speed: Some(12.0),
            ..Default::default()
        };
        let merged = base.merged(&update, None);
        assert_eq!(merged.lat, Some(1.0));
        assert_eq!(merged.speed, Some(12.0));
        assert_eq!(merged.zone, Some("harbour".into()));
    }

    #[test]
    fn zone_overlay_can_clear_to_none() {
        let base = DynamicData {
            zone: Some("harbour".into()),
            ..Default::default()
        };
        let merged = base.merged(&DynamicUpdate::default(), Some(None));
        assert_eq!(merged.zone, None);
    }
}
