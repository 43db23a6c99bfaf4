//! Geographic coordinates: the identity projection.
//!
//! The transform pipeline treats a `longlat` CRS specially (degrees in and
//! out, no projection call), so these methods only matter when the plugin is
//! used directly.

use crate::error::ProjError;
use crate::params::ResolvedParams;
use crate::proj::ellipsoid::Ellipsoid;
use crate::proj::{Projection, ProjectionDef};

pub const NAMES: &[&str] = &["identity", "latlong", "lonlat", "latlon", "longlat"];

pub const DEF: ProjectionDef = ProjectionDef { names: NAMES, init };

pub struct LongLat {
    ellipsoid: Ellipsoid,
}

impl LongLat {
    pub fn new(ellipsoid: Ellipsoid) -> Self {
        Self { ellipsoid }
    }
}

pub fn init(p: &ResolvedParams) -> Result<Box<dyn Projection>, ProjError> {
    Ok(Box::new(LongLat::new(p.ellipsoid)))
}

impl Projection for LongLat {
    fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64), ProjError> {
        Ok((lon, lat))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        Ok((x, y))
    }

    fn ellipsoid(&self) -> &Ellipsoid {
        &self.ellipsoid
    }
}
