//! Swiss Oblique Mercator (EPSG method 9815 as used by CH1903 / LV03).
//!
//! Maps the ellipsoid onto a sphere of radius R, rotates the pole to the
//! origin and applies a plain Mercator on the rotated sphere.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use tracing::debug;

use crate::error::ProjError;
use crate::params::ResolvedParams;
use crate::proj::ellipsoid::Ellipsoid;
use crate::proj::{Projection, ProjectionDef};

pub const NAMES: &[&str] = &["Swiss_Oblique_Mercator", "Swiss Oblique Mercator", "somerc"];

pub const DEF: ProjectionDef = ProjectionDef { names: NAMES, init };

const MAX_ITER: usize = 20;
const LAT_TOL: f64 = 1e-7;

pub struct SwissObliqueMercator {
    ellipsoid: Ellipsoid,
    lon0: f64,
    false_easting: f64,
    false_northing: f64,
    r: f64,
    alpha: f64,
    b0: f64,
    k: f64,
}

impl SwissObliqueMercator {
    pub fn new(
        ellipsoid: Ellipsoid,
        lon0: f64,
        lat0: f64,
        k0: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> Self {
        let es = ellipsoid.es;
        let e = ellipsoid.e;
        let sin0 = lat0.sin();

        let r = k0 * ellipsoid.a * (1.0 - es).sqrt() / (1.0 - es * sin0 * sin0);
        let alpha = (1.0 + es / (1.0 - es) * lat0.cos().powi(4)).sqrt();
        let b0 = (sin0 / alpha).asin();
        let k = (FRAC_PI_4 + b0 / 2.0).tan().ln() - alpha * (FRAC_PI_4 + lat0 / 2.0).tan().ln()
            + alpha * e / 2.0 * ((1.0 + e * sin0) / (1.0 - e * sin0)).ln();

        Self {
            ellipsoid,
            lon0,
            false_easting,
            false_northing,
            r,
            alpha,
            b0,
            k,
        }
    }
}

pub fn init(p: &ResolvedParams) -> Result<Box<dyn Projection>, ProjError> {
    Ok(Box::new(SwissObliqueMercator::new(
        p.ellipsoid,
        p.long0,
        p.lat0,
        p.k0,
        p.x0,
        p.y0,
    )))
}

impl Projection for SwissObliqueMercator {
    fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64), ProjError> {
        let e = self.ellipsoid.e;
        let esin = e * lat.sin();
        let s = -self.alpha * ((FRAC_PI_4 - lat / 2.0).tan().ln() + e / 2.0 * ((1.0 + esin) / (1.0 - esin)).ln())
            + self.k;

        // Latitude and longitude on the sphere
        let b = 2.0 * (s.exp().atan() - FRAC_PI_4);
        let i = self.alpha * (lon - self.lon0);

        // Rotate to the pseudo-equatorial system
        let (sin_b0, cos_b0) = self.b0.sin_cos();
        let rot_i = (i.sin() / (sin_b0 * b.tan() + cos_b0 * i.cos())).atan();
        let rot_b = (cos_b0 * b.sin() - sin_b0 * b.cos() * i.cos()).asin();

        let x = self.r * rot_i + self.false_easting;
        let y = self.r / 2.0 * ((1.0 + rot_b.sin()) / (1.0 - rot_b.sin())).ln() + self.false_northing;
        if !(x.is_finite() && y.is_finite()) {
            return Err(ProjError::Projection(
                "point has no image on the swiss oblique mercator".into(),
            ));
        }
        Ok((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        let e = self.ellipsoid.e;
        let rot_i = (x - self.false_easting) / self.r;
        let rot_b = 2.0 * (((y - self.false_northing) / self.r).exp().atan() - FRAC_PI_4);

        let (sin_b0, cos_b0) = self.b0.sin_cos();
        let b = (cos_b0 * rot_b.sin() + sin_b0 * rot_b.cos() * rot_i.cos()).asin();
        let i = (rot_i.sin() / (cos_b0 * rot_i.cos() - sin_b0 * rot_b.tan())).atan();
        let lon = self.lon0 + i / self.alpha;

        let s0 = ((FRAC_PI_4 + b / 2.0).tan().ln() - self.k) / self.alpha;
        let mut phi = b;
        for _ in 0..MAX_ITER {
            let s = s0 + e * (FRAC_PI_4 + (e * phi.sin()).asin() / 2.0).tan().ln();
            let next = 2.0 * s.exp().atan() - FRAC_PI_2;
            let done = (next - phi).abs() <= LAT_TOL;
            phi = next;
            if done {
                return Ok((lon, phi));
            }
        }
        debug!(x, y, "swiss oblique mercator latitude did not converge");
        Err(ProjError::Projection(format!(
            "latitude did not converge for ({x}, {y})"
        )))
    }

    fn ellipsoid(&self) -> &Ellipsoid {
        &self.ellipsoid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defs::proj_string;
    use approx::assert_relative_eq;

    const LV03: &str = "+proj=somerc +lat_0=46.95240555555556 +lon_0=7.439583333333333 +k_0=1 +x_0=600000 +y_0=200000 +ellps=bessel +units=m +no_defs";

    fn lv03() -> Box<dyn Projection> {
        init(&ResolvedParams::build(proj_string::parse(LV03).unwrap()).unwrap()).unwrap()
    }

    #[test]
    fn test_origin() {
        let (x, y) = lv03()
            .forward(7.439_583_333_333_333_f64.to_radians(), 46.952_405_555_555_56_f64.to_radians())
            .unwrap();
        assert_relative_eq!(x, 600_000.0, epsilon = 1e-6);
        assert_relative_eq!(y, 200_000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_bessel_reference() {
        let (x, y) = lv03()
            .forward(8.225_f64.to_radians(), 46.815_f64.to_radians())
            .unwrap();
        assert_relative_eq!(x, 659_933.418_732_427, epsilon = 1e-3);
        assert_relative_eq!(y, 185_026.714_081_790_6, epsilon = 1e-3);
    }

    #[test]
    fn test_roundtrip() {
        let proj = lv03();
        let cases: &[(f64, f64)] = &[
            (8.23, 46.82),
            (6.14, 46.2),  // Geneva
            (9.83, 46.5),  // Engadin
            (7.59, 47.56), // Basel
        ];
        for &(lon_deg, lat_deg) in cases {
            let lon = lon_deg.to_radians();
            let lat = lat_deg.to_radians();
            let (x, y) = proj.forward(lon, lat).unwrap();
            let (lon2, lat2) = proj.inverse(x, y).unwrap();
            assert_relative_eq!(lon2, lon, epsilon = 1e-8);
            assert_relative_eq!(lat2, lat, epsilon = 1e-8);
        }
    }
}
