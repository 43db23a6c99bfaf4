//! Sinusoidal (Sanson–Flamsteed) projection.
//!
//! On the sphere x = a·(λ - λ₀)·cos(φ), y = a·φ. On an ellipsoid y is the
//! meridional arc and x is scaled by the prime-vertical radius.

use crate::constants::{EPSLN, HALF_PI};
use crate::error::ProjError;
use crate::params::ResolvedParams;
use crate::proj::common::{adjust_lon, pj_enfn, pj_inv_mlfn, pj_mlfn};
use crate::proj::ellipsoid::Ellipsoid;
use crate::proj::{Projection, ProjectionDef};

pub const NAMES: &[&str] = &["Sinusoidal", "sinu"];

pub const DEF: ProjectionDef = ProjectionDef { names: NAMES, init };

pub struct Sinusoidal {
    ellipsoid: Ellipsoid,
    lon0: f64,
    false_easting: f64,
    false_northing: f64,
    en: Option<[f64; 5]>,
}

impl Sinusoidal {
    pub fn new(ellipsoid: Ellipsoid, lon0: f64, false_easting: f64, false_northing: f64) -> Self {
        let en = (!ellipsoid.sphere && ellipsoid.es > 0.0).then(|| pj_enfn(ellipsoid.es));
        Self {
            ellipsoid,
            lon0,
            false_easting,
            false_northing,
            en,
        }
    }
}

pub fn init(p: &ResolvedParams) -> Result<Box<dyn Projection>, ProjError> {
    Ok(Box::new(Sinusoidal::new(p.ellipsoid, p.long0, p.x0, p.y0)))
}

impl Projection for Sinusoidal {
    fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64), ProjError> {
        let a = self.ellipsoid.a;
        let dlon = adjust_lon(lon - self.lon0);
        let (x, y) = match &self.en {
            None => (a * dlon * lat.cos(), a * lat),
            Some(en) => {
                let (s, c) = lat.sin_cos();
                let x = a * dlon * c / (1.0 - self.ellipsoid.es * s * s).sqrt();
                (x, a * pj_mlfn(lat, s, c, en))
            }
        };
        Ok((x + self.false_easting, y + self.false_northing))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        let a = self.ellipsoid.a;
        let x = (x - self.false_easting) / a;
        let y = (y - self.false_northing) / a;
        match &self.en {
            None => {
                let cos_lat = y.cos();
                if cos_lat.abs() < EPSLN {
                    return Ok((self.lon0, y));
                }
                Ok((adjust_lon(self.lon0 + x / cos_lat), y))
            }
            Some(en) => {
                let lat = pj_inv_mlfn(y, self.ellipsoid.es, en);
                if lat.abs() >= HALF_PI {
                    if lat.abs() - EPSLN < HALF_PI {
                        return Ok((self.lon0, lat));
                    }
                    return Err(ProjError::Projection(format!(
                        "northing {} is beyond the pole",
                        y * a
                    )));
                }
                let s = lat.sin();
                let lon = self.lon0 + x * (1.0 - self.ellipsoid.es * s * s).sqrt() / lat.cos();
                Ok((adjust_lon(lon), lat))
            }
        }
    }

    fn ellipsoid(&self) -> &Ellipsoid {
        &self.ellipsoid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proj::ellipsoid::{sphere, wgs84};
    use approx::assert_relative_eq;

    #[test]
    fn test_roundtrip() {
        for ellipsoid in [wgs84(), sphere(6_371_007.181)] {
            let proj = Sinusoidal::new(ellipsoid, 0.0, 0.0, 0.0);
            let cases: &[(f64, f64)] = &[
                (0.0, 0.0),
                (10.0, 45.0),
                (-73.9857, 40.7484),
                (139.6917, 35.6895),
                (-179.0, -70.0),
            ];
            for &(lon_deg, lat_deg) in cases {
                let lon = lon_deg.to_radians();
                let lat = lat_deg.to_radians();
                let (x, y) = proj.forward(lon, lat).unwrap();
                let (lon2, lat2) = proj.inverse(x, y).unwrap();
                assert_relative_eq!(lon2, lon, epsilon = 1e-10);
                assert_relative_eq!(lat2, lat, epsilon = 1e-10);
            }
        }
    }

    #[test]
    fn test_modis_tile_corner() {
        // MODIS grid sphere, corner of tile h18v04 (0°E, 50°N)
        let proj = Sinusoidal::new(sphere(6_371_007.181), 0.0, 0.0, 0.0);
        let (x, y) = proj.forward(0.0, 50f64.to_radians()).unwrap();
        assert_relative_eq!(x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(y, 5_559_752.598_832_6, epsilon = 1e-3);
    }

    #[test]
    fn test_equator_matches_arc_length() {
        let proj = Sinusoidal::new(wgs84(), 0.0, 0.0, 0.0);
        let lon = 15.0_f64.to_radians();
        let (x, y) = proj.forward(lon, 0.0).unwrap();
        assert_relative_eq!(x, 6_378_137.0 * lon, epsilon = 1e-6);
        assert_relative_eq!(y, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_pole() {
        let proj = Sinusoidal::new(wgs84(), 0.0, 0.0, 0.0);
        let (x, y) = proj.forward(45.0_f64.to_radians(), HALF_PI).unwrap();
        assert_relative_eq!(x, 0.0, epsilon = 1e-6);
        let (_, lat) = proj.inverse(x, y).unwrap();
        assert_relative_eq!(lat, HALF_PI, epsilon = 1e-9);
    }
}
