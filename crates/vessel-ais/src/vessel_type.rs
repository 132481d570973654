//! AIS `ship_type` code lookups.
//!
//! Supplements the distilled spec with the vessel-type naming the original
//! daemon carried (`vf_core.ais_utils`): codes fall back to a base category
//! (tens digit) when no exact match exists, and the remainder can describe a
//! hazard subcategory.

const VESSEL_TYPES: &[(i32, &str)] = &[
    (-1, "Unknown"),
    (0, "Unknown"),
    (20, "Wing in Ground"),
    (30, "Fishing"),
    (31, "Towing"),
    (32, "Towing (Large)"),
    (33, "Dredge"),
    (34, "Diving Vessel"),
    (35, "Military Ops"),
    (36, "Sailing"),
    (37, "Pleasure Craft"),
    (40, "High Speed Craft"),
    (50, "Pilot Vessel"),
    (51, "Search & Rescue"),
    (52, "Tug"),
    (53, "Port Tender"),
    (54, "Anti-pollution Equip."),
    (55, "Law Enforcement"),
    (56, "Local"),
    (57, "Local"),
    (58, "Medical Transport"),
    (59, "Non-combatant Ship"),
    (60, "Passenger Ship"),
    (70, "Cargo Ship"),
    (80, "Tanker"),
    (90, "Other"),
];

const VESSEL_SUBCATS: &[(i32, &str)] = &[
    (1, "Hazardous (High)"),
    (2, "Hazardous"),
    (3, "Hazardous (Low)"),
    (4, "Non-hazardous"),
];

fn lookup_type(code: i32) -> Option<&'static str> {
    VESSEL_TYPES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}

fn lookup_subcat(code: i32) -> Option<&'static str> {
    VESSEL_SUBCATS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}

/// Human-readable vessel type name for an AIS `ship_type` code.
///
/// Falls back to the base category (`(code / 10) * 10`) when there is no
/// exact match, and to `"Reserved"` if even the base category is unknown.
pub fn vessel_type_name(type_code: Option<i32>) -> &'static str {
    let Some(code) = type_code else {
        return "Unknown";
    };

    if let Some(name) = lookup_type(code) {
        return name;
    }

    let base = (code / 10) * 10;
    lookup_type(base).unwrap_or("Reserved")
}

/// Hazard/cargo subtype, only meaningful when the code fell back to its base
/// category (an exact match has no subtype).
pub fn vessel_subtype_name(type_code: Option<i32>) -> Option<&'static str> {
    let code = type_code?;
    if lookup_type(code).is_some() {
        return None;
    }
    lookup_subcat(code % 10)
}

/// Combined `"<type>"` or `"<type> - <subtype>"` description.
pub fn vessel_full_type_name(type_code: Option<i32>) -> String {
    let main = vessel_type_name(type_code);
    match vessel_subtype_name(type_code) {
        Some(sub) => format!("{main} - {sub}"),
        None => main.to_string(),
    }
}
