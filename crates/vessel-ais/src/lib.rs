//! Decoded AIS message types, zone geometry and vessel type lookups.
//!
//! This crate defines the boundary type between the (out-of-scope) AIS
//! sentence decoder and the rest of the pipeline: [`DecodedMessage`]. It also
//! owns the pure geometry used for zone membership ([`Zone::contains`]) and a
//! descriptive lookup for the numeric `ship_type` field ([`vessel_type_name`]).

pub mod decode;
pub mod topics;
pub mod types;
pub mod vessel_type;
pub mod zone;

pub use decode::{DecodeError, SentenceDecoder};
pub use types::{DecodedMessage, Dimensions, Mmsi, MmsiError};
pub use vessel_type::{vessel_full_type_name, vessel_subtype_name, vessel_type_name};
pub use zone::Zone;

/// Mean Earth radius in kilometres, as used by the haversine zone check.
pub const EARTH_RADIUS_KM: f64 = 6371.0;
