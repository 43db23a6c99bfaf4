//! Common helpers for projection math (longitude wrapping, conformal latitude,
//! meridional distance, authalic latitude).

use std::f64::consts::PI;

use tracing::debug;

use crate::constants::{EPSLN, HALF_PI, SPI, TWO_PI};

/// Iteration cap for the latitude solvers.
const MAX_ITER: usize = 20;

pub fn sign(x: f64) -> f64 {
    if x < 0.0 {
        -1.0
    } else {
        1.0
    }
}

/// Wrap a longitude into [-π, π]. Values within [-SPI, SPI] are untouched so
/// that ±180° keep their sign.
pub fn adjust_lon(x: f64) -> f64 {
    if x.abs() <= SPI {
        x
    } else {
        x - sign(x) * TWO_PI
    }
}

pub fn adjust_lat(x: f64) -> f64 {
    if x.abs() < HALF_PI {
        x
    } else {
        x - sign(x) * PI
    }
}

/// UTM zone for `lon` when none was given, clamped to 0..=60.
pub fn adjust_zone(zone: Option<i32>, lon: f64) -> i32 {
    match zone {
        Some(zone) => zone,
        None => {
            let zone = ((adjust_lon(lon) + PI) * 30.0 / PI).floor() as i32 + 1;
            zone.clamp(0, 60)
        }
    }
}

/// Radius of the parallel at `phi` divided by `a`.
pub fn msfn(phi: f64, es: f64) -> f64 {
    let (sin_phi, cos_phi) = phi.sin_cos();
    cos_phi / (1.0 - es * sin_phi * sin_phi).sqrt()
}

/// Conformal-latitude term t used by Mercator, LCC and the stereographics.
pub fn tsfn(phi: f64, e: f64) -> f64 {
    let con = e * phi.sin();
    let com = 0.5 * e;
    (0.5 * (HALF_PI - phi)).tan() / ((1.0 - con) / (1.0 + con)).powf(com)
}

/// Inverse of [`tsfn`]: latitude from t. Returns the last estimate if the
/// iteration does not settle.
pub fn phi_from_ts(ts: f64, e: f64) -> f64 {
    let half_e = 0.5 * e;
    let mut phi = HALF_PI - 2.0 * ts.atan();
    for _ in 0..=15 {
        let con = e * phi.sin();
        let dphi = HALF_PI - 2.0 * (ts * ((1.0 - con) / (1.0 + con)).powf(half_e)).atan() - phi;
        phi += dphi;
        if dphi.abs() <= 1e-10 {
            return phi;
        }
    }
    debug!(ts, "phi_from_ts did not converge");
    phi
}

/// Authalic q term for equal-area projections.
pub fn qsfn(e: f64, sin_phi: f64) -> f64 {
    if e > 1.0e-7 {
        let con = e * sin_phi;
        (1.0 - e * e) * (sin_phi / (1.0 - con * con) - (0.5 / e) * ((1.0 - con) / (1.0 + con)).ln())
    } else {
        2.0 * sin_phi
    }
}

/// Round-off safe asin.
pub fn asinz(x: f64) -> f64 {
    x.clamp(-1.0, 1.0).asin()
}

const C00: f64 = 1.0;
const C02: f64 = 0.25;
const C04: f64 = 0.046_875;
const C06: f64 = 0.019_531_25;
const C08: f64 = 0.010_681_152_343_75;
const C22: f64 = 0.75;
const C44: f64 = 0.468_75;
const C46: f64 = 0.013_020_833_333_333_333_33;
const C48: f64 = 0.007_120_768_229_166_666_66;
const C66: f64 = 0.364_583_333_333_333_333_33;
const C68: f64 = 0.005_696_614_583_333_333_33;
const C88: f64 = 0.307_617_187_5;

/// Coefficients for the meridional distance series.
pub fn pj_enfn(es: f64) -> [f64; 5] {
    let mut t = es * es;
    let en0 = C00 - es * (C02 + es * (C04 + es * (C06 + es * C08)));
    let en1 = es * (C22 - es * (C04 + es * (C06 + es * C08)));
    let en2 = t * (C44 - es * (C46 + es * C48));
    t *= es;
    let en3 = t * (C66 - es * C68);
    let en4 = t * es * C88;
    [en0, en1, en2, en3, en4]
}

/// Meridional distance from the equator to `phi`, in units of `a`.
pub fn pj_mlfn(phi: f64, sin_phi: f64, cos_phi: f64, en: &[f64; 5]) -> f64 {
    let cphi = cos_phi * sin_phi;
    let sphi = sin_phi * sin_phi;
    en[0] * phi - cphi * (en[1] + sphi * (en[2] + sphi * (en[3] + sphi * en[4])))
}

/// Latitude from meridional distance `arg` (units of `a`).
pub fn pj_inv_mlfn(arg: f64, es: f64, en: &[f64; 5]) -> f64 {
    let k = 1.0 / (1.0 - es);
    let mut phi = arg;
    for _ in 0..MAX_ITER {
        let (s, c) = phi.sin_cos();
        let t = 1.0 - es * s * s;
        let step = (pj_mlfn(phi, s, c, en) - arg) * (t * t.sqrt()) * k;
        phi -= step;
        if step.abs() < EPSLN {
            return phi;
        }
    }
    debug!(arg, "pj_inv_mlfn did not converge");
    phi
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proj::ellipsoid::wgs84;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_4;

    #[test]
    fn test_meridional_arc_equator() {
        let en = pj_enfn(wgs84().es);
        assert_relative_eq!(pj_mlfn(0.0, 0.0, 1.0, &en), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_meridional_arc_45() {
        let ell = wgs84();
        let en = pj_enfn(ell.es);
        let (s, c) = FRAC_PI_4.sin_cos();
        let m = ell.a * pj_mlfn(FRAC_PI_4, s, c, &en);
        assert_relative_eq!(m, 4_984_944.378, epsilon = 0.01);
        let phi = pj_inv_mlfn(m / ell.a, ell.es, &en);
        assert_relative_eq!(phi, FRAC_PI_4, epsilon = 1e-11);
    }

    #[test]
    fn test_adjust_lon_keeps_antimeridian() {
        assert_eq!(adjust_lon(PI), PI);
        assert_eq!(adjust_lon(-PI), -PI);
        assert_relative_eq!(adjust_lon(190f64.to_radians()), (-170f64).to_radians(), epsilon = 1e-12);
        assert_relative_eq!(adjust_lat(100f64.to_radians()), (-80f64).to_radians(), epsilon = 1e-12);
    }

    #[test]
    fn test_adjust_zone() {
        assert_eq!(adjust_zone(None, 15f64.to_radians()), 33);
        assert_eq!(adjust_zone(None, (-177f64).to_radians()), 1);
        assert_eq!(adjust_zone(Some(12), 0.0), 12);
    }

    #[test]
    fn test_tsfn_inverse() {
        let e = wgs84().e;
        for lat in [-80.0f64, -30.0, 0.0, 12.5, 60.0, 89.0] {
            let phi = lat.to_radians();
            assert_relative_eq!(phi_from_ts(tsfn(phi, e), e), phi, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_qsfn_sphere() {
        assert_relative_eq!(qsfn(0.0, 0.5), 1.0);
        assert!(qsfn(wgs84().e, 1.0) < 2.0);
    }
}
