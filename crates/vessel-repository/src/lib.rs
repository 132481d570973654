//! Durable key-value store of vessels indexed by MMSI (spec §4.3).

mod error;
mod repository;
mod row;

pub use error::RepositoryError;
pub use repository::Repository;
pub use row::{UpsertVessel, VesselRow, VesselStats};
