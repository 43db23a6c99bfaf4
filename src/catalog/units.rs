//! Linear units with their length in metres.

use super::find;

pub const UNITS: &[(&str, f64)] = &[
    ("m", 1.0),
    ("metre", 1.0),
    ("meter", 1.0),
    ("km", 1000.0),
    ("ft", 0.3048),
    ("foot", 0.3048),
    ("us-ft", 1200.0 / 3937.0),
    ("us_survey_foot", 1200.0 / 3937.0),
];

/// Metres per unit, if the unit is known. Angular units return `None`.
pub fn to_meter(unit: &str) -> Option<f64> {
    find(UNITS, unit, |&(n, _)| [n, n]).map(|(_, m)| *m)
}

/// True for the spellings used for angular units.
pub fn is_degrees(unit: &str) -> bool {
    matches!(
        unit.to_ascii_lowercase().as_str(),
        "degree" | "degrees" | "deg" | "dd"
    )
}
