//! Equirectangular (Plate Carrée) projection.
//!
//! forward: x = a·(λ - λ₀)·cos(φ_ts), y = a·(φ - φ₀)
//! inverse: λ = λ₀ + x/(a·cos(φ_ts)), φ = φ₀ + y/a

use crate::error::ProjError;
use crate::params::ResolvedParams;
use crate::proj::common::{adjust_lat, adjust_lon};
use crate::proj::ellipsoid::Ellipsoid;
use crate::proj::{Projection, ProjectionDef};

pub const NAMES: &[&str] = &[
    "Equirectangular",
    "Equidistant_Cylindrical",
    "Equidistant_Cylindrical_Spherical",
    "eqc",
];

pub const DEF: ProjectionDef = ProjectionDef { names: NAMES, init };

pub struct Equirectangular {
    ellipsoid: Ellipsoid,
    lon0: f64,
    lat0: f64,
    cos_lat_ts: f64,
    false_easting: f64,
    false_northing: f64,
}

impl Equirectangular {
    pub fn new(
        ellipsoid: Ellipsoid,
        lon0: f64,
        lat0: f64,
        lat_ts: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> Self {
        Self {
            ellipsoid,
            lon0,
            lat0,
            cos_lat_ts: lat_ts.cos(),
            false_easting,
            false_northing,
        }
    }
}

pub fn init(p: &ResolvedParams) -> Result<Box<dyn Projection>, ProjError> {
    Ok(Box::new(Equirectangular::new(
        p.ellipsoid,
        p.long0,
        p.lat0,
        p.lat_ts.unwrap_or(0.0),
        p.x0,
        p.y0,
    )))
}

impl Projection for Equirectangular {
    fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64), ProjError> {
        let a = self.ellipsoid.a;
        let x = a * adjust_lon(lon - self.lon0) * self.cos_lat_ts + self.false_easting;
        let y = a * adjust_lat(lat - self.lat0) + self.false_northing;
        Ok((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        let a = self.ellipsoid.a;
        let lon = adjust_lon(self.lon0 + (x - self.false_easting) / (a * self.cos_lat_ts));
        let lat = adjust_lat(self.lat0 + (y - self.false_northing) / a);
        Ok((lon, lat))
    }

    fn ellipsoid(&self) -> &Ellipsoid {
        &self.ellipsoid
    }
}
