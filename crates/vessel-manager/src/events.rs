use vessel_ais::Mmsi;

use crate::record::VesselRecord;

/// Published on [`vessel_ais::topics::VESSEL_APPEARED`]: a vessel the
/// repository already knew about reappeared this session (spec §4.4 step 4).
#[derive(Debug, Clone)]
pub struct VesselAppeared {
    pub mmsi: Mmsi,
    pub vessel: VesselRecord,
    pub known: bool,
}

/// Published on [`vessel_ais::topics::VESSEL_FIRST_SEEN`]: a vessel never
/// recorded before appeared this session (spec §4.4 step 4).
#[derive(Debug, Clone)]
pub struct VesselFirstSeen {
    pub mmsi: Mmsi,
    pub has_static_data: bool,
}

/// Published on [`vessel_ais::topics::VESSEL_IDENTIFIED`]: static data was
/// just discovered for a tracked vessel (spec §4.4 step 7).
#[derive(Debug, Clone)]
pub struct VesselIdentified {
    pub mmsi: Mmsi,
    pub vessel: VesselRecord,
}

/// Published on [`vessel_ais::topics::VESSEL_ZONE_ENTERED`] (spec §4.4
/// step 12: none → zone).
#[derive(Debug, Clone)]
pub struct VesselZoneEntered {
    pub mmsi: Mmsi,
    pub zone: String,
    pub vessel: VesselRecord,
}

/// Published on [`vessel_ais::topics::VESSEL_ZONE_EXITED`] (spec §4.4
/// step 12: zone → none).
#[derive(Debug, Clone)]
pub struct VesselZoneExited {
    pub mmsi: Mmsi,
    pub zone: String,
    pub vessel: VesselRecord,
}

/// Published on [`vessel_ais::topics::VESSEL_ZONE_MOVED`] (spec §4.4
/// step 12: zoneA → zoneB).
#[derive(Debug, Clone)]
pub struct VesselZoneMoved {
    pub mmsi: Mmsi,
    pub from_zone: String,
    pub to_zone: String,
    pub vessel: VesselRecord,
}

/// Published on [`vessel_ais::topics::VESSEL_UPDATED`] after every accepted
/// message (spec §4.4 step 13).
#[derive(Debug, Clone)]
pub struct VesselUpdated {
    pub vessel: VesselRecord,
}
