pub mod albers_equal_area;
pub mod common;
pub mod ellipsoid;
pub mod equirectangular;
pub mod fast_transverse_mercator;
pub mod geocentric;
pub mod lambert_conformal;
pub mod longlat;
pub mod mercator;
pub mod oblique_mercator;
pub mod registry;
pub mod sinusoidal;
pub mod stereographic;
pub mod swiss_oblique_mercator;
pub mod transverse_mercator;
pub mod utm;

use std::fmt;

use crate::error::ProjError;
use crate::params::ResolvedParams;

pub use registry::Registry;

/// Trait for map projections supporting forward and inverse transforms.
///
/// Longitudes are absolute (not relative to the central meridian) and in
/// radians; projected coordinates are metres including false easting and
/// northing.
pub trait Projection: Send + Sync {
    /// Forward: (lon_rad, lat_rad) -> (easting, northing)
    fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64), ProjError>;

    /// Inverse: (easting, northing) -> (lon_rad, lat_rad)
    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError>;

    /// Forward with a height. Only geocentric output transforms it.
    fn forward_3d(&self, lon: f64, lat: f64, z: f64) -> Result<(f64, f64, f64), ProjError> {
        let (x, y) = self.forward(lon, lat)?;
        Ok((x, y, z))
    }

    fn inverse_3d(&self, x: f64, y: f64, z: f64) -> Result<(f64, f64, f64), ProjError> {
        let (lon, lat) = self.inverse(x, y)?;
        Ok((lon, lat, z))
    }

    fn ellipsoid(&self) -> &ellipsoid::Ellipsoid;
}

/// Builds a projection's state from resolved parameters.
pub type InitFn = fn(&ResolvedParams) -> Result<Box<dyn Projection>, ProjError>;

/// A registrable projection: its aliases and its constructor.
#[derive(Clone, Copy)]
pub struct ProjectionDef {
    pub names: &'static [&'static str],
    pub init: InitFn,
}

impl ProjectionDef {
    /// The short PROJ name, by convention the last alias.
    pub fn short_name(&self) -> &'static str {
        self.names.last().copied().unwrap_or("")
    }
}

impl fmt::Debug for ProjectionDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectionDef").field("names", &self.names).finish()
    }
}

/// Every projection shipped with the crate.
pub fn builtin_projections() -> [ProjectionDef; 14] {
    [
        mercator::DEF,
        longlat::DEF,
        transverse_mercator::DEF,
        fast_transverse_mercator::DEF,
        utm::DEF,
        lambert_conformal::DEF,
        oblique_mercator::DEF,
        swiss_oblique_mercator::DEF,
        geocentric::DEF,
        equirectangular::DEF,
        sinusoidal::DEF,
        albers_equal_area::DEF,
        stereographic::DEF,
        stereographic::STEREA_DEF,
    ]
}
