//! Hotine Oblique Mercator, variants A and B, defined either by a centre
//! and azimuth or by two points on the central line.
//!
//! Variant A (`+no_uoff`, or one of the variant-A method names) measures u
//! from the natural origin; variant B shifts it to the projection centre.

use crate::constants::{EPSLN, FORTPI, HALF_PI, TWO_PI};
use crate::error::ProjError;
use crate::params::ResolvedParams;
use crate::proj::common::{adjust_lon, phi_from_ts, tsfn};
use crate::proj::ellipsoid::Ellipsoid;
use crate::proj::{Projection, ProjectionDef};

pub const NAMES: &[&str] = &[
    "Hotine_Oblique_Mercator",
    "Hotine Oblique Mercator",
    "Hotine_Oblique_Mercator_variant_A",
    "Hotine_Oblique_Mercator_Variant_B",
    "Hotine_Oblique_Mercator_Azimuth_Natural_Origin",
    "Hotine_Oblique_Mercator_Two_Point_Natural_Origin",
    "Hotine_Oblique_Mercator_Azimuth_Center",
    "Oblique_Mercator",
    "omerc",
];

pub const DEF: ProjectionDef = ProjectionDef { names: NAMES, init };

/// Method names that imply no offset of the u origin.
const VARIANT_A_NAMES: &[&str] = &[
    "hotine_oblique_mercator",
    "hotine_oblique_mercator_variant_a",
    "hotine_oblique_mercator_azimuth_natural_origin",
];

const TOL: f64 = 1e-7;

/// How the central line is fixed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CentralLine {
    /// Centre longitude with the azimuth of the central line and/or the
    /// rectified grid angle, in radians.
    Azimuth {
        lonc: f64,
        alpha: Option<f64>,
        gamma: Option<f64>,
    },
    /// Two points (lon, lat) on the central line.
    TwoPoint { p1: (f64, f64), p2: (f64, f64) },
}

pub struct ObliqueMercator {
    ellipsoid: Ellipsoid,
    false_easting: f64,
    false_northing: f64,
    no_rot: bool,
    a_: f64,
    b_: f64,
    e_: f64,
    lam0: f64,
    singam: f64,
    cosgam: f64,
    sinrot: f64,
    cosrot: f64,
    r_b: f64,
    ar_b: f64,
    br_a: f64,
    u_0: f64,
    v_pole_n: f64,
    v_pole_s: f64,
}

impl ObliqueMercator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        ellipsoid: Ellipsoid,
        lat0: f64,
        line: CentralLine,
        k0: f64,
        false_easting: f64,
        false_northing: f64,
        no_off: bool,
        no_rot: bool,
    ) -> Result<Self, ProjError> {
        if let CentralLine::TwoPoint { p1: (_, phi1), p2: (_, phi2) } = line {
            if (phi1 - phi2).abs() <= TOL
                || phi1.abs() <= TOL
                || (phi1.abs() - HALF_PI).abs() <= TOL
                || (lat0.abs() - HALF_PI).abs() <= TOL
                || (phi2.abs() - HALF_PI).abs() <= TOL
            {
                return Err(ProjError::Init(
                    "central line points are degenerate for oblique mercator".into(),
                ));
            }
        }

        let es = ellipsoid.es;
        let e = ellipsoid.e;
        let one_es = 1.0 - es;
        let com = one_es.sqrt();

        let (a_, b_, e_, d, f) = if lat0.abs() > EPSLN {
            let (sinph0, cosph0) = lat0.sin_cos();
            let con = 1.0 - es * sinph0 * sinph0;
            let cos2 = cosph0 * cosph0;
            let b_ = (1.0 + es * cos2 * cos2 / one_es).sqrt();
            let a_ = b_ * k0 * com / con;
            let d = b_ * com / (cosph0 * con.sqrt());
            let mut f = d * d - 1.0;
            if f <= 0.0 {
                f = 0.0;
            } else {
                f = f.sqrt();
                if lat0 < 0.0 {
                    f = -f;
                }
            }
            f += d;
            (a_, b_, f * tsfn(lat0, e).powf(b_), d, f)
        } else {
            (k0, 1.0 / com, 1.0, 1.0, 1.0)
        };

        let (gamma0, gamma, alpha_c, lam0) = match line {
            CentralLine::Azimuth { lonc, alpha, gamma } => {
                let (gamma0, alpha_c, gamma) = match (alpha, gamma) {
                    (Some(alpha_c), gamma) => {
                        let gamma0 = (alpha_c.sin() / d).asin();
                        (gamma0, alpha_c, gamma.unwrap_or(alpha_c))
                    }
                    (None, Some(gamma)) => (gamma, (d * gamma.sin()).asin(), gamma),
                    (None, None) => {
                        return Err(ProjError::Init(
                            "oblique mercator needs alpha, gamma or two points".into(),
                        ))
                    }
                };
                let lam0 = lonc - (0.5 * (f - 1.0 / f) * gamma0.tan()).asin() / b_;
                (gamma0, gamma, alpha_c, lam0)
            }
            CentralLine::TwoPoint { p1: (lam1, phi1), p2: (mut lam2, phi2) } => {
                let h = tsfn(phi1, e).powf(b_);
                let l = tsfn(phi2, e).powf(b_);
                let f = e_ / h;
                let p = (l - h) / (l + h);
                let j = (e_ * e_ - l * h) / (e_ * e_ + l * h);
                let con = lam1 - lam2;
                if con < -std::f64::consts::PI {
                    lam2 -= TWO_PI;
                } else if con > std::f64::consts::PI {
                    lam2 += TWO_PI;
                }
                let lam0 = adjust_lon(
                    0.5 * (lam1 + lam2) - (j * (0.5 * b_ * (lam1 - lam2)).tan() / p).atan() / b_,
                );
                let gamma0 = (2.0 * (b_ * adjust_lon(lam1 - lam0)).sin() / (f - 1.0 / f)).atan();
                let alpha_c = (d * gamma0.sin()).asin();
                (gamma0, alpha_c, alpha_c, lam0)
            }
        };
        if !(gamma0.is_finite() && alpha_c.is_finite() && lam0.is_finite()) {
            return Err(ProjError::Init(
                "oblique mercator central line is undefined for these parameters".into(),
            ));
        }

        let r_b = 1.0 / b_;
        let ar_b = a_ * r_b;
        let u_0 = if no_off {
            0.0
        } else {
            let u = (ar_b * ((d * d - 1.0).sqrt() / alpha_c.cos()).atan()).abs();
            if lat0 < 0.0 {
                -u
            } else {
                u
            }
        };
        let half = 0.5 * gamma0;

        Ok(Self {
            ellipsoid,
            false_easting,
            false_northing,
            no_rot,
            a_,
            b_,
            e_,
            lam0,
            singam: gamma0.sin(),
            cosgam: gamma0.cos(),
            sinrot: gamma.sin(),
            cosrot: gamma.cos(),
            r_b,
            ar_b,
            br_a: 1.0 / ar_b,
            u_0,
            v_pole_n: ar_b * (FORTPI - half).tan().ln(),
            v_pole_s: ar_b * (FORTPI + half).tan().ln(),
        })
    }
}

fn is_variant_a(p: &ResolvedParams) -> bool {
    let name = p.proj_name.to_lowercase().replace(' ', "_");
    p.no_off || VARIANT_A_NAMES.contains(&name.as_str())
}

pub fn init(p: &ResolvedParams) -> Result<Box<dyn Projection>, ProjError> {
    let line = if p.alpha.is_some() || p.rectified_grid_angle.is_some() {
        CentralLine::Azimuth {
            lonc: p.longc.unwrap_or(p.long0),
            alpha: p.alpha,
            gamma: p.rectified_grid_angle,
        }
    } else {
        let missing = || ProjError::Init("two-point oblique mercator needs lon_1/lat_1/lon_2/lat_2".into());
        CentralLine::TwoPoint {
            p1: (p.long1.ok_or_else(missing)?, p.lat1.ok_or_else(missing)?),
            p2: (p.long2.ok_or_else(missing)?, p.lat2.ok_or_else(missing)?),
        }
    };
    Ok(Box::new(ObliqueMercator::new(
        p.ellipsoid,
        p.lat0,
        line,
        p.k0,
        p.x0,
        p.y0,
        is_variant_a(p),
        p.no_rot,
    )?))
}

impl Projection for ObliqueMercator {
    fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64), ProjError> {
        let lon = lon - self.lam0;
        let (mut u, v);
        if (lat.abs() - HALF_PI).abs() > EPSLN {
            let w = self.e_ / tsfn(lat, self.ellipsoid.e).powf(self.b_);
            let temp = 1.0 / w;
            let s = 0.5 * (w - temp);
            let t = 0.5 * (w + temp);
            let vv = (self.b_ * lon).sin();
            let uu = (s * self.singam - vv * self.cosgam) / t;
            if (uu.abs() - 1.0).abs() < EPSLN {
                return Err(ProjError::Projection(
                    "point projects to infinity on the oblique mercator".into(),
                ));
            }
            v = 0.5 * self.ar_b * ((1.0 - uu) / (1.0 + uu)).ln();
            let temp = (self.b_ * lon).cos();
            u = if temp.abs() < TOL {
                self.a_ * lon
            } else {
                self.ar_b * (s * self.cosgam + vv * self.singam).atan2(temp)
            };
        } else {
            v = if lat > 0.0 { self.v_pole_n } else { self.v_pole_s };
            u = self.ar_b * lat;
        }

        let (x, y) = if self.no_rot {
            (u, v)
        } else {
            u -= self.u_0;
            (v * self.cosrot + u * self.sinrot, u * self.cosrot - v * self.sinrot)
        };
        let a = self.ellipsoid.a;
        Ok((a * x + self.false_easting, a * y + self.false_northing))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        let a = self.ellipsoid.a;
        let x = (x - self.false_easting) / a;
        let y = (y - self.false_northing) / a;

        let (u, v) = if self.no_rot {
            (x, y)
        } else {
            (
                y * self.cosrot + x * self.sinrot + self.u_0,
                x * self.cosrot - y * self.sinrot,
            )
        };

        let qp = (-self.br_a * v).exp();
        let sp = 0.5 * (qp - 1.0 / qp);
        let tp = 0.5 * (qp + 1.0 / qp);
        let vp = (self.br_a * u).sin();
        let up = (vp * self.cosgam + sp * self.singam) / tp;

        let (lon, lat) = if (up.abs() - 1.0).abs() < EPSLN {
            (0.0, if up < 0.0 { -HALF_PI } else { HALF_PI })
        } else {
            let ts = (self.e_ / ((1.0 + up) / (1.0 - up)).sqrt()).powf(1.0 / self.b_);
            let lat = phi_from_ts(ts, self.ellipsoid.e);
            if !lat.is_finite() {
                return Err(ProjError::Projection(
                    "oblique mercator inverse has no finite latitude".into(),
                ));
            }
            let lon = -self.r_b * (sp * self.cosgam - vp * self.singam).atan2((self.br_a * u).cos());
            (lon, lat)
        };
        Ok((lon + self.lam0, lat))
    }

    fn ellipsoid(&self) -> &Ellipsoid {
        &self.ellipsoid
    }
}
