//! Stereographic projections: polar (`stere`) and the oblique double
//! stereographic (`sterea`) that first maps the ellipsoid conformally onto
//! a Gaussian sphere.
//!
//! Polar examples: EPSG:3031 (Antarctic), EPSG:3413 (Arctic), UPS.
//! Oblique example: EPSG:28992 (Amersfoort / RD New).

use tracing::debug;

use crate::constants::{EPSLN, FORTPI, HALF_PI};
use crate::error::ProjError;
use crate::params::ResolvedParams;
use crate::proj::common::{adjust_lon, msfn, phi_from_ts, tsfn};
use crate::proj::ellipsoid::Ellipsoid;
use crate::proj::{Projection, ProjectionDef};

pub const POLAR_NAMES: &[&str] = &[
    "Stereographic_North_Pole",
    "Stereographic_South_Pole",
    "Polar_Stereographic",
    "Polar_Stereographic_variant_A",
    "Polar_Stereographic_variant_B",
    "stere",
];

pub const OBLIQUE_NAMES: &[&str] = &[
    "Oblique_Stereographic",
    "Oblique Stereographic Alternative",
    "Double_Stereographic",
    "sterea",
];

pub const DEF: ProjectionDef = ProjectionDef {
    names: POLAR_NAMES,
    init: init_polar,
};

pub const STEREA_DEF: ProjectionDef = ProjectionDef {
    names: OBLIQUE_NAMES,
    init: init_oblique,
};

/// Polar Stereographic projection.
pub struct PolarStereographic {
    ellipsoid: Ellipsoid,
    lon0: f64,
    is_north: bool,
    false_easting: f64,
    false_northing: f64,
    // ρ = akm · t
    akm: f64,
}

impl PolarStereographic {
    /// `lat_ts` selects variant A (true scale at that latitude); without it,
    /// or with `lat_ts` at the pole, `k0` is the scale at the pole.
    pub fn new(
        ellipsoid: Ellipsoid,
        lon0: f64,
        is_north: bool,
        lat_ts: Option<f64>,
        k0: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> Self {
        let e = ellipsoid.e;
        let akm = match lat_ts.filter(|t| (t.abs() - HALF_PI).abs() >= EPSLN) {
            Some(lat_ts) => {
                let lat_ts = lat_ts.abs();
                ellipsoid.a * msfn(lat_ts, ellipsoid.es) / tsfn(lat_ts, e)
            }
            None => {
                let con = ((1.0 + e).powf(1.0 + e) * (1.0 - e).powf(1.0 - e)).sqrt();
                ellipsoid.a * 2.0 * k0 / con
            }
        };

        Self {
            ellipsoid,
            lon0,
            is_north,
            false_easting,
            false_northing,
            akm,
        }
    }
}

pub fn init_polar(p: &ResolvedParams) -> Result<Box<dyn Projection>, ProjError> {
    if (p.lat0.abs() - HALF_PI).abs() > EPSLN {
        return Err(ProjError::Init(
            "stere needs lat_0 at a pole; use sterea for an oblique origin".into(),
        ));
    }
    Ok(Box::new(PolarStereographic::new(
        p.ellipsoid,
        p.long0,
        p.lat0 > 0.0,
        p.lat_ts,
        p.k0,
        p.x0,
        p.y0,
    )))
}

impl Projection for PolarStereographic {
    fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64), ProjError> {
        let (lat_adj, sign) = if self.is_north { (lat, 1.0) } else { (-lat, -1.0) };
        if lat_adj <= -HALF_PI + EPSLN {
            return Err(ProjError::Projection(
                "the pole opposite the projection centre has no image".into(),
            ));
        }

        let rho = self.akm * tsfn(lat_adj, self.ellipsoid.e);
        let dlam = adjust_lon(lon - self.lon0);

        let x = rho * dlam.sin() + self.false_easting;
        let y = -sign * rho * dlam.cos() + self.false_northing;
        Ok((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        let x_ = x - self.false_easting;
        let y_ = y - self.false_northing;
        let y_adj = if self.is_north { -y_ } else { y_ };

        let rho = x_.hypot(y_adj);
        let lat_adj = phi_from_ts(rho / self.akm, self.ellipsoid.e);
        let lat = if self.is_north { lat_adj } else { -lat_adj };
        let lon = if rho == 0.0 {
            self.lon0
        } else {
            adjust_lon(self.lon0 + x_.atan2(y_adj))
        };
        Ok((lon, lat))
    }

    fn ellipsoid(&self) -> &Ellipsoid {
        &self.ellipsoid
    }
}

/// Conformal mapping of the ellipsoid onto the Gaussian sphere tangent at
/// the latitude of origin.
struct Gauss {
    c: f64,
    k: f64,
    e: f64,
    ratexp: f64,
    phic0: f64,
    rc: f64,
}

fn srat(esinp: f64, exp: f64) -> f64 {
    ((1.0 - esinp) / (1.0 + esinp)).powf(exp)
}

impl Gauss {
    const MAX_ITER: usize = 20;
    const DEL_TOL: f64 = 1e-14;

    fn new(ellipsoid: &Ellipsoid, lat0: f64) -> Self {
        let es = ellipsoid.es;
        let e = ellipsoid.e;
        let sphi = lat0.sin();
        let cphi2 = lat0.cos().powi(2);
        let rc = (1.0 - es).sqrt() / (1.0 - es * sphi * sphi);
        let c = (1.0 + es * cphi2 * cphi2 / (1.0 - es)).sqrt();
        let phic0 = (sphi / c).asin();
        let ratexp = 0.5 * c * e;
        let k = (0.5 * phic0 + FORTPI).tan()
            / ((0.5 * lat0 + FORTPI).tan().powf(c) * srat(e * sphi, ratexp));
        Self {
            c,
            k,
            e,
            ratexp,
            phic0,
            rc,
        }
    }

    fn forward(&self, lon: f64, lat: f64) -> (f64, f64) {
        let chi = 2.0
            * (self.k * (0.5 * lat + FORTPI).tan().powf(self.c) * srat(self.e * lat.sin(), self.ratexp)).atan()
            - HALF_PI;
        (self.c * lon, chi)
    }

    fn inverse(&self, lon: f64, chi: f64) -> (f64, f64) {
        let num = ((0.5 * chi + FORTPI).tan() / self.k).powf(1.0 / self.c);
        let mut lat = chi;
        for _ in 0..Self::MAX_ITER {
            let next = 2.0 * (num * srat(self.e * lat.sin(), -0.5 * self.e)).atan() - HALF_PI;
            let done = (next - lat).abs() < Self::DEL_TOL;
            lat = next;
            if done {
                return (lon / self.c, lat);
            }
        }
        debug!(chi, "gauss sphere inverse did not converge");
        (lon / self.c, lat)
    }
}

/// Oblique (double) Stereographic projection.
pub struct ObliqueStereographic {
    ellipsoid: Ellipsoid,
    lon0: f64,
    k0: f64,
    false_easting: f64,
    false_northing: f64,
    gauss: Gauss,
    sinc0: f64,
    cosc0: f64,
    r2: f64,
}

impl ObliqueStereographic {
    pub fn new(
        ellipsoid: Ellipsoid,
        lon0: f64,
        lat0: f64,
        k0: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> Self {
        let gauss = Gauss::new(&ellipsoid, lat0);
        let (sinc0, cosc0) = gauss.phic0.sin_cos();
        let r2 = 2.0 * gauss.rc;
        Self {
            ellipsoid,
            lon0,
            k0,
            false_easting,
            false_northing,
            gauss,
            sinc0,
            cosc0,
            r2,
        }
    }
}

pub fn init_oblique(p: &ResolvedParams) -> Result<Box<dyn Projection>, ProjError> {
    Ok(Box::new(ObliqueStereographic::new(
        p.ellipsoid,
        p.long0,
        p.lat0,
        p.k0,
        p.x0,
        p.y0,
    )))
}

impl Projection for ObliqueStereographic {
    fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64), ProjError> {
        let (lambda, chi) = self.gauss.forward(adjust_lon(lon - self.lon0), lat);

        let (sinc, cosc) = chi.sin_cos();
        let (sinl, cosl) = lambda.sin_cos();
        let denom = 1.0 + self.sinc0 * sinc + self.cosc0 * cosc * cosl;
        if denom.abs() < EPSLN {
            return Err(ProjError::Projection(
                "antipode of the projection centre has no image".into(),
            ));
        }
        let k = self.k0 * self.r2 / denom;

        let a = self.ellipsoid.a;
        let x = a * k * cosc * sinl + self.false_easting;
        let y = a * k * (self.cosc0 * sinc - self.sinc0 * cosc * cosl) + self.false_northing;
        Ok((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        let a = self.ellipsoid.a;
        let x = (x - self.false_easting) / (a * self.k0);
        let y = (y - self.false_northing) / (a * self.k0);

        let rho = x.hypot(y);
        let (lambda, chi) = if rho != 0.0 {
            let c = 2.0 * rho.atan2(self.r2);
            let (sinc, cosc) = c.sin_cos();
            let chi = (cosc * self.sinc0 + y * sinc * self.cosc0 / rho).clamp(-1.0, 1.0).asin();
            let lambda = (x * sinc).atan2(rho * self.cosc0 * cosc - y * self.sinc0 * sinc);
            (lambda, chi)
        } else {
            (0.0, self.gauss.phic0)
        };

        let (lon, lat) = self.gauss.inverse(lambda, chi);
        Ok((adjust_lon(lon + self.lon0), lat))
    }

    fn ellipsoid(&self) -> &Ellipsoid {
        &self.ellipsoid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defs::proj_string;
    use crate::proj::ellipsoid::sphere;
    use approx::assert_relative_eq;

    fn from_def(def: &str) -> Result<Box<dyn Projection>, ProjError> {
        let params = ResolvedParams::build(proj_string::parse(def)?)?;
        match params.proj_name.as_str() {
            "sterea" => init_oblique(&params),
            _ => init_polar(&params),
        }
    }

    fn antarctic() -> Box<dyn Projection> {
        from_def("+proj=stere +lat_0=-90 +lat_ts=-71 +lon_0=0 +k=1 +x_0=0 +y_0=0 +datum=WGS84").unwrap()
    }

    fn arctic() -> Box<dyn Projection> {
        from_def("+proj=stere +lat_0=90 +lat_ts=70 +lon_0=-45 +k=1 +x_0=0 +y_0=0 +datum=WGS84").unwrap()
    }

    #[test]
    fn test_polar_antarctic_roundtrip() {
        let proj = antarctic();
        let cases: &[(f64, f64)] = &[(0.0, -75.0), (90.0, -80.0), (-120.0, -70.0), (45.0, -65.0)];
        for &(lon_deg, lat_deg) in cases {
            let lon = lon_deg.to_radians();
            let lat = lat_deg.to_radians();
            let (x, y) = proj.forward(lon, lat).unwrap();
            let (lon2, lat2) = proj.inverse(x, y).unwrap();
            assert_relative_eq!(lon2, lon, epsilon = 1e-9);
            assert_relative_eq!(lat2, lat, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_polar_antarctic_orientation() {
        // 90°E lies along +x, the Greenwich meridian along +y
        let proj = antarctic();
        let (x, y) = proj.forward(90f64.to_radians(), (-75f64).to_radians()).unwrap();
        assert!(x > 0.0);
        assert_relative_eq!(y, 0.0, epsilon = 1e-6);
        let (x, y) = proj.forward(0.0, (-75f64).to_radians()).unwrap();
        assert_relative_eq!(x, 0.0, epsilon = 1e-6);
        assert!(y > 0.0);
    }

    #[test]
    fn test_polar_arctic_roundtrip() {
        let proj = arctic();
        let cases: &[(f64, f64)] = &[(-45.0, 75.0), (0.0, 80.0), (90.0, 85.0), (-90.0, 70.0)];
        for &(lon_deg, lat_deg) in cases {
            let lon = lon_deg.to_radians();
            let lat = lat_deg.to_radians();
            let (x, y) = proj.forward(lon, lat).unwrap();
            let (lon2, lat2) = proj.inverse(x, y).unwrap();
            assert_relative_eq!(lon2, lon, epsilon = 1e-9);
            assert_relative_eq!(lat2, lat, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_poles_map_to_origin() {
        let (x, y) = antarctic().forward(0.0, -HALF_PI).unwrap();
        assert_relative_eq!(x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(y, 0.0, epsilon = 1e-6);
        let (x, y) = arctic().forward((-45.0_f64).to_radians(), HALF_PI).unwrap();
        assert_relative_eq!(x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(y, 0.0, epsilon = 1e-6);
        let (lon, lat) = arctic().inverse(0.0, 0.0).unwrap();
        assert_relative_eq!(lon, (-45.0_f64).to_radians());
        assert_relative_eq!(lat, HALF_PI, epsilon = 1e-12);
    }

    #[test]
    fn test_ups_scale_at_pole() {
        let ups = from_def("+proj=stere +lat_0=90 +lat_ts=90 +lon_0=0 +k=0.994 +x_0=2000000 +y_0=2000000 +datum=WGS84")
            .unwrap();
        let (x, y) = ups.forward(0.0, 84f64.to_radians()).unwrap();
        assert_relative_eq!(x, 2_000_000.0, epsilon = 1e-6);
        assert!(y < 2_000_000.0);
        let (lon, lat) = ups.inverse(x, y).unwrap();
        assert_relative_eq!(lon, 0.0, epsilon = 1e-12);
        assert_relative_eq!(lat, 84f64.to_radians(), epsilon = 1e-10);
    }

    #[test]
    fn test_polar_needs_polar_origin() {
        assert!(matches!(
            from_def("+proj=stere +lat_0=45 +datum=WGS84"),
            Err(ProjError::Init(_))
        ));
    }

    #[test]
    fn test_oblique_origin_and_roundtrip() {
        let proj = from_def(
            "+proj=sterea +lat_0=52.15616055555555 +lon_0=5.38763888888889 +k=0.9999079 +x_0=155000 +y_0=463000 +ellps=bessel +units=m",
        )
        .unwrap();
        let (x, y) = proj
            .forward(5.387_638_888_888_89_f64.to_radians(), 52.156_160_555_555_55_f64.to_radians())
            .unwrap();
        assert_relative_eq!(x, 155_000.0, epsilon = 1e-6);
        assert_relative_eq!(y, 463_000.0, epsilon = 1e-6);

        let cases: &[(f64, f64)] = &[
            (4.9, 52.37), // Amsterdam area
            (5.5, 51.44), // Eindhoven area
            (6.9, 53.2),
        ];
        for &(lon_deg, lat_deg) in cases {
            let lon = lon_deg.to_radians();
            let lat = lat_deg.to_radians();
            let (x, y) = proj.forward(lon, lat).unwrap();
            let (lon2, lat2) = proj.inverse(x, y).unwrap();
            assert_relative_eq!(lon2, lon, epsilon = 1e-11);
            assert_relative_eq!(lat2, lat, epsilon = 1e-11);
        }
    }

    #[test]
    fn test_oblique_sphere_is_plain_stereographic() {
        let r = 6_370_997.0;
        let proj = ObliqueStereographic::new(sphere(r), 0.0, 0.0, 1.0, 0.0, 0.0);
        let (x, _) = proj.forward(45f64.to_radians(), 0.0).unwrap();
        // On the equator ρ = 2R·tan(λ/2)
        assert_relative_eq!(x, 2.0 * r * (45f64.to_radians() * 0.5).tan(), epsilon = 1e-6);
    }
}
