//! Transverse Mercator by the classic power series in the longitude
//! difference (Snyder 8-5 ff.), with a closed form on the sphere.
//!
//! Cheaper than the Krüger series but only accurate within a few degrees of
//! the central meridian.

use crate::constants::{EPSLN, HALF_PI};
use crate::error::ProjError;
use crate::params::ResolvedParams;
use crate::proj::common::{adjust_lon, pj_enfn, pj_inv_mlfn, pj_mlfn, sign};
use crate::proj::ellipsoid::Ellipsoid;
use crate::proj::{Projection, ProjectionDef};

pub const NAMES: &[&str] = &["Fast_Transverse_Mercator", "Fast Transverse Mercator"];

pub const DEF: ProjectionDef = ProjectionDef { names: NAMES, init };

pub fn init(p: &ResolvedParams) -> Result<Box<dyn Projection>, ProjError> {
    Ok(Box::new(FastTransverseMercator::from_params(p)?))
}

pub struct FastTransverseMercator {
    ellipsoid: Ellipsoid,
    lon0: f64,
    lat0: f64,
    k0: f64,
    false_easting: f64,
    false_northing: f64,
    en: [f64; 5],
    ml0: f64,
}

impl FastTransverseMercator {
    pub fn new(
        ellipsoid: Ellipsoid,
        lon0: f64,
        lat0: f64,
        k0: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> Self {
        let en = pj_enfn(ellipsoid.es);
        let ml0 = if ellipsoid.es > 0.0 {
            let (s, c) = lat0.sin_cos();
            pj_mlfn(lat0, s, c, &en)
        } else {
            0.0
        };
        Self {
            ellipsoid,
            lon0,
            lat0,
            k0,
            false_easting,
            false_northing,
            en,
            ml0,
        }
    }

    pub fn from_params(p: &ResolvedParams) -> Result<Self, ProjError> {
        Ok(Self::new(p.ellipsoid, p.long0, p.lat0, p.k0, p.x0, p.y0))
    }

    fn is_spherical(&self) -> bool {
        self.ellipsoid.es <= 0.0 || self.ellipsoid.es.is_nan()
    }
}

impl Projection for FastTransverseMercator {
    fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64), ProjError> {
        let a = self.ellipsoid.a;
        let dlon = adjust_lon(lon - self.lon0);
        let (sin_phi, cos_phi) = lat.sin_cos();

        if self.is_spherical() {
            let b = cos_phi * dlon.sin();
            if (b.abs() - 1.0).abs() < EPSLN {
                return Err(ProjError::Projection(
                    "point is 90° from the central meridian".into(),
                ));
            }
            let x = 0.5 * a * self.k0 * ((1.0 + b) / (1.0 - b)).ln() + self.false_easting;
            let mut y = cos_phi * dlon.cos() / (1.0 - b * b).sqrt();
            let abs_y = y.abs();
            if abs_y >= 1.0 {
                if abs_y - 1.0 > EPSLN {
                    return Err(ProjError::Projection(
                        "point is outside the transverse mercator domain".into(),
                    ));
                }
                y = 0.0;
            } else {
                y = y.acos();
            }
            if lat < 0.0 {
                y = -y;
            }
            let y = a * self.k0 * (y - self.lat0) + self.false_northing;
            return Ok((x, y));
        }

        let es = self.ellipsoid.es;
        let ep2 = self.ellipsoid.ep2;
        let mut al = cos_phi * dlon;
        let als = al * al;
        let c = ep2 * cos_phi * cos_phi;
        let cs = c * c;
        let tq = if cos_phi.abs() > EPSLN { lat.tan() } else { 0.0 };
        let t = tq * tq;
        let ts = t * t;
        let con = 1.0 - es * sin_phi * sin_phi;
        al /= con.sqrt();
        let ml = pj_mlfn(lat, sin_phi, cos_phi, &self.en);

        let x = a
            * (self.k0
                * al
                * (1.0
                    + als / 6.0
                        * (1.0 - t
                            + c
                            + als / 20.0
                                * (5.0 - 18.0 * t + ts + 14.0 * c - 58.0 * t * c
                                    + als / 42.0 * (61.0 + 179.0 * ts - ts * t - 479.0 * t)))))
            + self.false_easting;
        let y = a
            * (self.k0
                * (ml - self.ml0
                    + sin_phi * dlon * al / 2.0
                        * (1.0
                            + als / 12.0
                                * (5.0 - t + 9.0 * c + 4.0 * cs
                                    + als / 30.0
                                        * (61.0 + ts - 58.0 * t + 270.0 * c - 330.0 * t * c
                                            + als / 56.0
                                                * (1385.0 + 543.0 * ts - ts * t - 3111.0 * t))))))
            + self.false_northing;
        Ok((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        let x = (x - self.false_easting) / self.ellipsoid.a;
        let y = (y - self.false_northing) / self.ellipsoid.a;

        if self.is_spherical() {
            let f = (x / self.k0).exp();
            let g = 0.5 * (f - 1.0 / f);
            let h = (self.lat0 + y / self.k0).cos();
            let con = ((1.0 - h * h) / (1.0 + g * g)).sqrt();
            let mut lat = con.clamp(-1.0, 1.0).asin();
            if y < 0.0 {
                lat = -lat;
            }
            let lon = if g == 0.0 && h == 0.0 {
                0.0
            } else {
                adjust_lon(g.atan2(h) + self.lon0)
            };
            return Ok((lon, lat));
        }

        let es = self.ellipsoid.es;
        let phi = pj_inv_mlfn(self.ml0 + y / self.k0, es, &self.en);
        if phi.abs() >= HALF_PI {
            return Ok((0.0, HALF_PI * sign(y)));
        }

        let (sin_phi, cos_phi) = phi.sin_cos();
        let tan_phi = if cos_phi.abs() > EPSLN { phi.tan() } else { 0.0 };
        let c = self.ellipsoid.ep2 * cos_phi * cos_phi;
        let cs = c * c;
        let t = tan_phi * tan_phi;
        let ts = t * t;
        let mut con = 1.0 - es * sin_phi * sin_phi;
        let d = x * con.sqrt() / self.k0;
        let ds = d * d;
        con *= tan_phi;

        let lat = phi
            - (con * ds / (1.0 - es))
                * 0.5
                * (1.0
                    - ds / 12.0
                        * (5.0 + 3.0 * t - 9.0 * c * t + c - 4.0 * cs
                            - ds / 30.0
                                * (61.0 + 90.0 * t - 252.0 * c * t + 45.0 * ts + 46.0 * c
                                    - ds / 56.0 * (1385.0 + 3633.0 * t + 4095.0 * ts + 1574.0 * ts * t))));
        let lon = adjust_lon(
            self.lon0
                + d * (1.0
                    - ds / 6.0
                        * (1.0 + 2.0 * t + c
                            - ds / 20.0
                                * (5.0 + 28.0 * t + 24.0 * ts + 8.0 * c * t + 6.0 * c
                                    - ds / 42.0 * (61.0 + 662.0 * t + 1320.0 * ts + 720.0 * ts * t))))
                    / cos_phi,
        );
        Ok((lon, lat))
    }

    fn ellipsoid(&self) -> &Ellipsoid {
        &self.ellipsoid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proj::ellipsoid::{sphere, wgs84};
    use crate::proj::transverse_mercator::TransverseMercator;
    use approx::assert_relative_eq;

    #[test]
    fn test_sphere_reference() {
        let tm = FastTransverseMercator::new(sphere(6_400_000.0), 0.0, 0.0, 1.0, 0.0, 0.0);
        let (x, y) = tm.forward(2f64.to_radians(), 1f64.to_radians()).unwrap();
        assert_relative_eq!(x, 223_413.466_406_322_32, epsilon = 1e-6);
        assert_relative_eq!(y, 111_769.145_040_596_85, epsilon = 1e-6);
        let (lon, lat) = tm.inverse(x, y).unwrap();
        assert_relative_eq!(lon, 2f64.to_radians(), epsilon = 1e-12);
        assert_relative_eq!(lat, 1f64.to_radians(), epsilon = 1e-12);
    }

    #[test]
    fn test_sphere_southern_hemisphere() {
        let tm = FastTransverseMercator::new(sphere(6_370_997.0), 0.3, 0.0, 0.9996, 500_000.0, 0.0);
        let (x, y) = tm.forward(0.33, -0.6).unwrap();
        assert!(y < 0.0);
        let (lon, lat) = tm.inverse(x, y).unwrap();
        assert_relative_eq!(lon, 0.33, epsilon = 1e-12);
        assert_relative_eq!(lat, -0.6, epsilon = 1e-12);
    }

    #[test]
    fn test_agrees_with_exact_series_near_meridian() {
        let lon0 = 9f64.to_radians();
        let fast = FastTransverseMercator::new(wgs84(), lon0, 0.0, 0.9996, 500_000.0, 0.0);
        let exact = TransverseMercator::new(wgs84(), lon0, 0.0, 0.9996, 500_000.0, 0.0);
        for &(lon, lat) in &[(9.0, 45.0), (10.5, 50.0), (7.0, -20.0), (11.0, 70.0)] {
            let (lon, lat) = (f64::to_radians(lon), f64::to_radians(lat));
            let (x1, y1) = fast.forward(lon, lat).unwrap();
            let (x2, y2) = exact.forward(lon, lat).unwrap();
            assert_relative_eq!(x1, x2, epsilon = 0.05);
            assert_relative_eq!(y1, y2, epsilon = 0.05);
            let (lon2, lat2) = fast.inverse(x1, y1).unwrap();
            assert_relative_eq!(lon2, lon, epsilon = 1e-8);
            assert_relative_eq!(lat2, lat, epsilon = 1e-8);
        }
    }

    #[test]
    fn test_sphere_quarter_turn_is_an_error() {
        let tm = FastTransverseMercator::new(sphere(6_400_000.0), 0.0, 0.0, 1.0, 0.0, 0.0);
        assert!(tm.forward(HALF_PI, 0.0).is_err());
    }
}
