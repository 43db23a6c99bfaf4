//! Universal Transverse Mercator: a transverse Mercator with the zone's
//! central meridian, k₀ = 0.9996 and the standard false origin.

use tracing::debug;

use crate::constants::D2R;
use crate::error::ProjError;
use crate::params::ResolvedParams;
use crate::proj::common::adjust_zone;
use crate::proj::{transverse_mercator, Projection, ProjectionDef};

pub const NAMES: &[&str] = &["Universal Transverse Mercator System", "utm"];

pub const DEF: ProjectionDef = ProjectionDef { names: NAMES, init };

const K0: f64 = 0.9996;
const FALSE_EASTING: f64 = 500_000.0;
const FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

/// Central meridian of `zone`, in radians.
pub fn central_meridian(zone: i32) -> f64 {
    (6.0 * f64::from(zone.abs()) - 183.0) * D2R
}

pub fn init(p: &ResolvedParams) -> Result<Box<dyn Projection>, ProjError> {
    let zone = adjust_zone(p.zone, p.long0);
    if !(1..=60).contains(&zone.abs()) {
        return Err(ProjError::Init(format!("utm zone {zone} is out of range 1..=60")));
    }
    debug!(zone, south = p.utm_south, "utm zone");

    let mut tm = p.clone();
    tm.zone = Some(zone);
    tm.lat0 = 0.0;
    tm.long0 = central_meridian(zone);
    tm.x0 = FALSE_EASTING;
    tm.y0 = if p.utm_south { FALSE_NORTHING_SOUTH } else { 0.0 };
    tm.k0 = K0;
    transverse_mercator::init(&tm)
}
