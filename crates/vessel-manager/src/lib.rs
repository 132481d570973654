//! Identity reconciliation, zone detection and event emission (spec §4.4).
//!
//! [`VesselManager`] is a single-task subscriber over the decoded-message
//! topic: it reconciles each message against an in-memory map of tracked
//! vessels (backed durably by [`vessel_repository::Repository`]), derives
//! zone transitions, and publishes the `vessel.*` events other components
//! react to.

mod events;
mod manager;
mod record;

pub use events::{
    VesselAppeared, VesselFirstSeen, VesselIdentified, VesselUpdated, VesselZoneEntered, VesselZoneExited,
    VesselZoneMoved,
};
pub use manager::{ManagerConfig, VesselManager};
pub use record::{DynamicData, DynamicUpdate, StaticData, VesselRecord};
