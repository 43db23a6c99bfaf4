//! Mercator projection, spherical and ellipsoidal.
//!
//!   forward: x = x₀ + a·k₀·(λ - λ₀), y = y₀ - a·k₀·ln(tsfn(φ, e))
//!   inverse: λ = λ₀ + x/(a·k₀),      φ = phi_from_ts(exp(-y/(a·k₀)), e)
//!
//! On a sphere tsfn reduces to tan(π/4 - φ/2), which gives Web Mercator
//! (EPSG:3857) when `a = b = 6378137`. A true-scale latitude `lat_ts`
//! replaces `k₀`.

use crate::constants::{EPSLN, FORTPI, HALF_PI, R2D};
use crate::error::ProjError;
use crate::params::ResolvedParams;
use crate::proj::common::{adjust_lon, msfn, phi_from_ts, tsfn};
use crate::proj::ellipsoid::Ellipsoid;
use crate::proj::{Projection, ProjectionDef};

pub const NAMES: &[&str] = &[
    "Mercator",
    "Popular Visualisation Pseudo Mercator",
    "Mercator_1SP",
    "Mercator_Auxiliary_Sphere",
    "Mercator_Variant_A",
    "merc",
];

pub const DEF: ProjectionDef = ProjectionDef { names: NAMES, init };

pub struct Mercator {
    ellipsoid: Ellipsoid,
    lon0: f64,
    k0: f64,
    false_easting: f64,
    false_northing: f64,
}

impl Mercator {
    pub fn new(
        ellipsoid: Ellipsoid,
        lon0: f64,
        lat_ts: Option<f64>,
        k0: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> Self {
        // Scale factor from the standard parallel, when one is given
        let k0 = match lat_ts.filter(|t| *t != 0.0) {
            Some(lat_ts) if ellipsoid.sphere => lat_ts.cos(),
            Some(lat_ts) => msfn(lat_ts, ellipsoid.es),
            None => k0,
        };
        Self {
            ellipsoid,
            lon0,
            k0,
            false_easting,
            false_northing,
        }
    }
}

pub fn init(p: &ResolvedParams) -> Result<Box<dyn Projection>, ProjError> {
    Ok(Box::new(Mercator::new(
        p.ellipsoid,
        p.long0,
        p.lat_ts,
        p.k0,
        p.x0,
        p.y0,
    )))
}

impl Projection for Mercator {
    fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64), ProjError> {
        if (lat.abs() - HALF_PI).abs() <= EPSLN {
            return Err(ProjError::Projection(format!(
                "Mercator is undefined at the poles (lat = {})",
                lat * R2D
            )));
        }
        let ak0 = self.ellipsoid.a * self.k0;
        let x = self.false_easting + ak0 * adjust_lon(lon - self.lon0);
        let y = if self.ellipsoid.sphere {
            self.false_northing + ak0 * (FORTPI + 0.5 * lat).tan().ln()
        } else {
            self.false_northing - ak0 * tsfn(lat, self.ellipsoid.e).ln()
        };
        Ok((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        let ak0 = self.ellipsoid.a * self.k0;
        let x = x - self.false_easting;
        let y = y - self.false_northing;
        let lat = if self.ellipsoid.sphere {
            HALF_PI - 2.0 * (-y / ak0).exp().atan()
        } else {
            phi_from_ts((-y / ak0).exp(), self.ellipsoid.e)
        };
        let lon = adjust_lon(self.lon0 + x / ak0);
        Ok((lon, lat))
    }

    fn ellipsoid(&self) -> &Ellipsoid {
        &self.ellipsoid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defs::{proj_string, EPSG_3857};
    use crate::proj::ellipsoid::{sphere, wgs84};
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn web_mercator() -> Box<dyn Projection> {
        let params = ResolvedParams::build(proj_string::parse(EPSG_3857).unwrap()).unwrap();
        init(&params).unwrap()
    }

    #[test]
    fn test_web_mercator_origin() {
        let proj = web_mercator();
        let (x, y) = proj.forward(0.0, 0.0).unwrap();
        assert_relative_eq!(x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(y, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_web_mercator_roundtrip() {
        let proj = web_mercator();
        let cases: &[(f64, f64)] = &[
            (0.0, 0.0),
            (10.0, 45.0),
            (-73.9857, 40.7484), // NYC
            (139.6917, 35.6895), // Tokyo
            (-180.0, 0.0),
            (180.0, 0.0),
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

    #[test]
    fn test_web_mercator_antimeridian_keeps_sign() {
        let proj = web_mercator();
        let (x, _) = proj.forward(PI, 0.0).unwrap();
        assert_relative_eq!(x, 20_037_508.342_789_244, epsilon = 1e-6);
        let (x, _) = proj.forward(-PI, 0.0).unwrap();
        assert_relative_eq!(x, -20_037_508.342_789_244, epsilon = 1e-6);
    }

    #[test]
    fn test_web_mercator_reference() {
        let proj = web_mercator();
        let (x, y) = proj
            .forward(-112.500_429_200_000_04_f64.to_radians(), 42.036_926_809_999_976_f64.to_radians())
            .unwrap();
        assert_relative_eq!(x, -12_523_490.492_568_73, epsilon = 1e-4);
        assert_relative_eq!(y, 5_166_512.507_073_69, epsilon = 1e-4);
    }

    #[test]
    fn test_pole_is_an_error() {
        let proj = Mercator::new(wgs84(), 0.0, None, 1.0, 0.0, 0.0);
        assert!(matches!(
            proj.forward(0.0, PI / 2.0),
            Err(ProjError::Projection(_))
        ));
    }

    #[test]
    fn test_ellipsoidal_mercator_roundtrip() {
        let proj = Mercator::new(wgs84(), 0.0, None, 1.0, 0.0, 0.0);
        let cases: &[(f64, f64)] = &[
            (0.0, 0.0),
            (10.0, 45.0),
            (-73.9857, 40.7484),
            (139.6917, 35.6895),
            (20.0, -84.0),
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

    #[test]
    fn test_true_scale_latitude() {
        let lat_ts = 41f64.to_radians();
        let ell = Mercator::new(wgs84(), 0.0, Some(lat_ts), 1.0, 0.0, 0.0);
        assert_relative_eq!(ell.k0, msfn(lat_ts, wgs84().es));
        let sph = Mercator::new(sphere(6_370_997.0), 0.0, Some(lat_ts), 1.0, 0.0, 0.0);
        assert_relative_eq!(sph.k0, lat_ts.cos());
        let (x, _) = sph.forward(1f64.to_radians(), 0.0).unwrap();
        assert_relative_eq!(x, 6_370_997.0 * lat_ts.cos() * 1f64.to_radians(), epsilon = 1e-6);
    }
}
