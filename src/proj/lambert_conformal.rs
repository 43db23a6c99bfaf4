//! Lambert Conformal Conic projection, 1SP and 2SP variants.
//!
//! A single standard parallel is the degenerate 2SP case with `lat_1 = lat_2`,
//! where the cone constant becomes `sin(lat_1)`.

use crate::constants::{EPSLN, HALF_PI};
use crate::error::ProjError;
use crate::params::ResolvedParams;
use crate::proj::common::{adjust_lon, msfn, phi_from_ts, tsfn};
use crate::proj::ellipsoid::Ellipsoid;
use crate::proj::{Projection, ProjectionDef};

pub const NAMES: &[&str] = &[
    "Lambert Tangential Conformal Conic Projection",
    "Lambert_Conformal_Conic",
    "Lambert_Conformal_Conic_1SP",
    "Lambert_Conformal_Conic_2SP",
    "Lambert Conic Conformal (1SP)",
    "Lambert Conic Conformal (2SP)",
    "lcc",
];

pub const DEF: ProjectionDef = ProjectionDef { names: NAMES, init };

pub struct LambertConformalConic {
    ellipsoid: Ellipsoid,
    lon0: f64,
    k0: f64,
    n: f64,     // cone constant
    f_val: f64, // F = m₁/(n·t₁ⁿ)
    rho0: f64,  // ρ₀ = a·F·t₀ⁿ
    false_easting: f64,
    false_northing: f64,
}

impl LambertConformalConic {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        ellipsoid: Ellipsoid,
        lon0: f64,
        lat0: f64,
        lat1: f64,
        lat2: f64,
        k0: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> Result<Self, ProjError> {
        if (lat1 + lat2).abs() < EPSLN {
            return Err(ProjError::Init(
                "standard parallels are equal and on opposite sides of the equator".into(),
            ));
        }
        let e = ellipsoid.e;
        let es = ellipsoid.es;

        let m1 = msfn(lat1, es);
        let m2 = msfn(lat2, es);
        let t0 = tsfn(lat0, e);
        let t1 = tsfn(lat1, e);
        let t2 = tsfn(lat2, e);

        let n = if (lat1 - lat2).abs() > EPSLN {
            (m1 / m2).ln() / (t1 / t2).ln()
        } else {
            lat1.sin()
        };
        if n.is_nan() {
            return Err(ProjError::Init("cone constant is undefined".into()));
        }

        let f_val = m1 / (n * t1.powf(n));
        let rho0 = ellipsoid.a * f_val * t0.powf(n);

        Ok(Self {
            ellipsoid,
            lon0,
            k0,
            n,
            f_val,
            rho0,
            false_easting,
            false_northing,
        })
    }
}

pub fn init(p: &ResolvedParams) -> Result<Box<dyn Projection>, ProjError> {
    let lat1 = p.lat1.unwrap_or(p.lat0);
    // A missing second parallel means the 1SP form
    let lat2 = p.lat2.unwrap_or(lat1);
    Ok(Box::new(LambertConformalConic::new(
        p.ellipsoid,
        p.long0,
        p.lat0,
        lat1,
        lat2,
        p.k0,
        p.x0,
        p.y0,
    )?))
}

impl Projection for LambertConformalConic {
    fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64), ProjError> {
        let rho = if (2.0 * lat.abs() - std::f64::consts::PI).abs() <= EPSLN {
            if lat * self.n <= 0.0 {
                return Err(ProjError::Projection(
                    "pole opposite the cone apex has no image".into(),
                ));
            }
            0.0
        } else {
            let t = tsfn(lat, self.ellipsoid.e);
            self.ellipsoid.a * self.f_val * t.powf(self.n)
        };
        let theta = self.n * adjust_lon(lon - self.lon0);

        let x = self.k0 * rho * theta.sin() + self.false_easting;
        let y = self.k0 * (self.rho0 - rho * theta.cos()) + self.false_northing;
        Ok((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        let x_ = (x - self.false_easting) / self.k0;
        let y_ = self.rho0 - (y - self.false_northing) / self.k0;

        // For n < 0, flip signs before computing angle and radius
        let (xn, yn) = if self.n < 0.0 { (-x_, -y_) } else { (x_, y_) };
        let mut rho = xn.hypot(yn);
        if self.n < 0.0 {
            rho = -rho;
        }
        let theta = if rho != 0.0 { xn.atan2(yn) } else { 0.0 };

        let lat = if rho != 0.0 || self.n > 0.0 {
            let ts = (rho / (self.ellipsoid.a * self.f_val)).powf(1.0 / self.n);
            phi_from_ts(ts, self.ellipsoid.e)
        } else {
            -HALF_PI
        };
        let lon = adjust_lon(theta / self.n + self.lon0);
        Ok((lon, lat))
    }

    fn ellipsoid(&self) -> &Ellipsoid {
        &self.ellipsoid
    }
}
