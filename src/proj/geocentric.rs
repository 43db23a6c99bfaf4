//! Earth-centred, earth-fixed Cartesian coordinates.
//!
//! The only plugin whose output depends on height: `forward_3d` and
//! `inverse_3d` carry `z` through the geodetic ↔ geocentric conversion.

use crate::datum::geocentric::{geocentric_to_geodetic, geodetic_to_geocentric};
use crate::error::ProjError;
use crate::params::ResolvedParams;
use crate::proj::ellipsoid::Ellipsoid;
use crate::proj::{Projection, ProjectionDef};

pub const NAMES: &[&str] = &["Geocentric", "geocentric", "Geocent", "geocent"];

pub const DEF: ProjectionDef = ProjectionDef { names: NAMES, init };

pub struct Geocentric {
    ellipsoid: Ellipsoid,
}

impl Geocentric {
    pub fn new(ellipsoid: Ellipsoid) -> Self {
        Self { ellipsoid }
    }
}

pub fn init(p: &ResolvedParams) -> Result<Box<dyn Projection>, ProjError> {
    Ok(Box::new(Geocentric::new(p.ellipsoid)))
}

impl Projection for Geocentric {
    fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64), ProjError> {
        let (x, y, _) = self.forward_3d(lon, lat, 0.0)?;
        Ok((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        let (lon, lat, _) = self.inverse_3d(x, y, 0.0)?;
        Ok((lon, lat))
    }

    fn forward_3d(&self, lon: f64, lat: f64, z: f64) -> Result<(f64, f64, f64), ProjError> {
        let (x, y, z) = geodetic_to_geocentric(lon, lat, z, self.ellipsoid.es, self.ellipsoid.a);
        if !(x.is_finite() && y.is_finite() && z.is_finite()) {
            return Err(ProjError::Projection(format!(
                "latitude {lat} is outside [-π/2, π/2]"
            )));
        }
        Ok((x, y, z))
    }

    fn inverse_3d(&self, x: f64, y: f64, z: f64) -> Result<(f64, f64, f64), ProjError> {
        let e = &self.ellipsoid;
        Ok(geocentric_to_geodetic(x, y, z, e.es, e.a, e.b))
    }

    fn ellipsoid(&self) -> &Ellipsoid {
        &self.ellipsoid
    }
}
