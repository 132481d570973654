//! Reserved bus topic names (spec §6).
//!
//! Centralized here because every crate that publishes or subscribes to one
//! of these already depends on `vessel-ais` for [`crate::DecodedMessage`] or
//! [`crate::Mmsi`].

/// Raw AIS sentence bytes, published by source plugins.
pub const AIS_RAW: &str = "ais.raw";

/// Decoded AIS records, published by processor plugins.
pub const AIS_DECODED: &str = "ais.decoded";

/// Screen navigation commands (`{action: "next"|"previous"}`).
pub const SCREEN_COMMAND: &str = "screen.command";

/// A vessel seen before (repository hit) reappeared this session.
pub const VESSEL_APPEARED: &str = "vessel.appeared";

/// A vessel never seen before (no repository row) appeared this session.
pub const VESSEL_FIRST_SEEN: &str = "vessel.first_seen";

/// A tracked vessel's static data was just discovered.
pub const VESSEL_IDENTIFIED: &str = "vessel.identified";

/// A tracked vessel entered a configured zone.
pub const VESSEL_ZONE_ENTERED: &str = "vessel.zone_entered";

/// A tracked vessel exited a configured zone.
pub const VESSEL_ZONE_EXITED: &str = "vessel.zone_exited";

/// A tracked vessel moved directly from one zone to another.
pub const VESSEL_ZONE_MOVED: &str = "vessel.zone_moved";

/// A tracked vessel's merged record changed; published on every update.
pub const VESSEL_UPDATED: &str = "vessel.updated";
