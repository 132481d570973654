use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A validated 9-digit Maritime Mobile Service Identity.
///
/// Construction rejects anything that is not exactly 9 ASCII digits; callers
/// that need the "is this a ship" filter from spec §4.4 should use
/// [`Mmsi::is_sar_aircraft`] after construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Mmsi(String);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MmsiError {
    #[error("mmsi '{0}' is not exactly 9 digits")]
    WrongLength(String),
}

impl Mmsi {
    /// Parse an MMSI from its raw numeric form (as carried on the wire).
    pub fn from_raw(raw: u32) -> Result<Self, MmsiError> {
        Self::parse(&raw.to_string())
    }

    /// Parse an MMSI from its string form, validating length.
    pub fn parse(s: &str) -> Result<Self, MmsiError> {
        if s.len() == 9 && s.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(s.to_string()))
        } else {
            Err(MmsiError::WrongLength(s.to_string()))
        }
    }

    /// MMSIs starting with "111" are SAR aircraft, not ships, per spec §3/§4.4.
    pub fn is_sar_aircraft(&self) -> bool {
        self.0.starts_with("111")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Mmsi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Hull dimensions in metres, relative to the GPS antenna position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub to_bow: i32,
    pub to_stern: i32,
    pub to_port: i32,
    pub to_starboard: i32,
}

/// A decoded AIS message, as produced by the (out-of-scope) decoder.
///
/// Fields are optional because which ones are present depends on `msg_type`:
/// type 5 carries static identity fields, position-report types carry
/// dynamic fields. Only `mmsi` and `msg_type` are guaranteed, per spec §3.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecodedMessage {
    pub mmsi: u32,
    pub msg_type: u8,

    // Static (type 5) fields.
    pub shipname: Option<String>,
    pub callsign: Option<String>,
    pub ship_type: Option<i32>,
    pub imo: Option<i64>,
    pub to_bow: Option<i32>,
    pub to_stern: Option<i32>,
    pub to_port: Option<i32>,
    pub to_starboard: Option<i32>,

    // Dynamic (position-bearing) fields.
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub cog: Option<f64>,
    pub speed: Option<f64>,
    pub heading: Option<f64>,
}

impl DecodedMessage {
    /// Type-5 messages carry static identity fields, per spec §3/§4.4.
    pub const STATIC_MSG_TYPE: u8 = 5;

    pub fn has_static_data(&self) -> bool {
        self.msg_type == Self::STATIC_MSG_TYPE
    }

    /// Dimensions carried by this message, if any were present.
    pub fn dimensions(&self) -> Option<Dimensions> {
        if self.to_bow.is_none()
            && self.to_stern.is_none()
            && self.to_port.is_none()
            && self.to_starboard.is_none()
        {
            return None;
        }
        Some(Dimensions {
            to_bow: self.to_bow.unwrap_or(0),
            to_stern: self.to_stern.unwrap_or(0),
            to_port: self.to_port.unwrap_or(0),
            to_starboard: self.to_starboard.unwrap_or(0),
        })
    }

    /// Whether this message carries a usable position (spec §4.4 step 9).
    pub fn has_position(&self) -> bool {
        self.lat.is_some() && self.lon.is_some()
    }
}
