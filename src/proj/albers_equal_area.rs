//! Albers Equal Area Conic projection.
//!
//! Area-preserving conic built on the authalic `q` term (`qsfn`).

use tracing::debug;

use crate::constants::EPSLN;
use crate::error::ProjError;
use crate::params::ResolvedParams;
use crate::proj::common::{adjust_lon, asinz, msfn, qsfn};
use crate::proj::ellipsoid::Ellipsoid;
use crate::proj::{Projection, ProjectionDef};

pub const NAMES: &[&str] = &["Albers_Conic_Equal_Area", "Albers_Equal_Area", "Albers", "aea"];

pub const DEF: ProjectionDef = ProjectionDef { names: NAMES, init };

pub struct AlbersEqualArea {
    ellipsoid: Ellipsoid,
    lon0: f64,
    n: f64,
    c: f64,
    rho0: f64,
    false_easting: f64,
    false_northing: f64,
}

impl AlbersEqualArea {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        ellipsoid: Ellipsoid,
        lon0: f64,
        lat0: f64,
        lat1: f64,
        lat2: f64,
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
        let q0 = qsfn(e, lat0.sin());
        let q1 = qsfn(e, lat1.sin());
        let q2 = qsfn(e, lat2.sin());

        let n = if (lat1 - lat2).abs() > EPSLN {
            (m1 * m1 - m2 * m2) / (q2 - q1)
        } else {
            lat1.sin()
        };

        let c = m1 * m1 + n * q1;
        let rho0 = ellipsoid.a * (c - n * q0).sqrt() / n;

        Ok(Self {
            ellipsoid,
            lon0,
            n,
            c,
            rho0,
            false_easting,
            false_northing,
        })
    }

    /// Latitude from the authalic `q` term by Newton iteration.
    fn phi_from_q(&self, q: f64) -> f64 {
        let e = self.ellipsoid.e;
        let mut phi = asinz(0.5 * q);
        if e < EPSLN {
            return phi;
        }
        let es = self.ellipsoid.es;
        for _ in 0..25 {
            let (sin_phi, cos_phi) = phi.sin_cos();
            let con = e * sin_phi;
            let com = 1.0 - con * con;
            let dphi = 0.5 * com * com / cos_phi
                * (q / (1.0 - es) - sin_phi / com + 0.5 / e * ((1.0 - con) / (1.0 + con)).ln());
            phi += dphi;
            if dphi.abs() <= 1e-7 {
                return phi;
            }
        }
        debug!(q, "albers latitude did not converge");
        phi
    }
}

pub fn init(p: &ResolvedParams) -> Result<Box<dyn Projection>, ProjError> {
    let lat1 = p.lat1.unwrap_or(p.lat0);
    let lat2 = p.lat2.unwrap_or(lat1);
    Ok(Box::new(AlbersEqualArea::new(
        p.ellipsoid,
        p.long0,
        p.lat0,
        lat1,
        lat2,
        p.x0,
        p.y0,
    )?))
}

impl Projection for AlbersEqualArea {
    fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64), ProjError> {
        let q = qsfn(self.ellipsoid.e, lat.sin());
        let rho = self.ellipsoid.a * (self.c - self.n * q).sqrt() / self.n;
        let theta = self.n * adjust_lon(lon - self.lon0);

        let x = rho * theta.sin() + self.false_easting;
        let y = self.rho0 - rho * theta.cos() + self.false_northing;
        Ok((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        let x_ = x - self.false_easting;
        let y_ = self.rho0 - (y - self.false_northing);

        let (xn, yn) = if self.n < 0.0 { (-x_, -y_) } else { (x_, y_) };
        let mut rho = xn.hypot(yn);
        if self.n < 0.0 {
            rho = -rho;
        }
        let theta = if rho != 0.0 { xn.atan2(yn) } else { 0.0 };

        let con = rho * self.n / self.ellipsoid.a;
        let lat = if self.ellipsoid.sphere {
            asinz((self.c - con * con) / (2.0 * self.n))
        } else {
            self.phi_from_q((self.c - con * con) / self.n)
        };
        let lon = adjust_lon(theta / self.n + self.lon0);
        Ok((lon, lat))
    }

    fn ellipsoid(&self) -> &Ellipsoid {
        &self.ellipsoid
    }
}
