//! Geodetic ↔ geocentric conversion and the Helmert shift to and from WGS84.

use std::f64::consts::PI;

use crate::constants::HALF_PI;
use crate::datum::DatumType;

/// cos(67.5°)
const COS_67P5: f64 = 0.382_683_432_365_089_77;
/// Toms region constant for the initial latitude estimate.
const AD_C: f64 = 1.002_6;

/// (lon, lat, h) radians and metres to geocentric X, Y, Z.
///
/// Latitudes slightly past the poles (within 0.1 %) are clamped. Anything
/// further out yields infinite coordinates, which the caller rejects.
pub fn geodetic_to_geocentric(lon: f64, lat: f64, h: f64, es: f64, a: f64) -> (f64, f64, f64) {
    let mut lat = lat;
    if lat < -HALF_PI && lat > -1.001 * HALF_PI {
        lat = -HALF_PI;
    } else if lat > HALF_PI && lat < 1.001 * HALF_PI {
        lat = HALF_PI;
    } else if lat < -HALF_PI {
        return (f64::NEG_INFINITY, f64::NEG_INFINITY, h);
    } else if lat > HALF_PI {
        return (f64::INFINITY, f64::INFINITY, h);
    }

    let lon = if lon > PI { lon - 2.0 * PI } else { lon };
    let (sin_lat, cos_lat) = lat.sin_cos();
    let rn = a / (1.0 - es * sin_lat * sin_lat).sqrt();
    (
        (rn + h) * cos_lat * lon.cos(),
        (rn + h) * cos_lat * lon.sin(),
        (rn * (1.0 - es) + h) * sin_lat,
    )
}

/// Geocentric X, Y, Z to (lon, lat, h), using the closed-form method of
/// Toms (1996) with the branch for height chosen away from the pole.
pub fn geocentric_to_geodetic(x: f64, y: f64, z: f64, es: f64, a: f64, b: f64) -> (f64, f64, f64) {
    let w2 = x * x + y * y;
    let w = w2.sqrt();
    let ep2 = if b != 0.0 { (a * a - b * b) / (b * b) } else { 0.0 };

    let lon;
    let mut at_pole = false;
    if x != 0.0 {
        lon = y.atan2(x);
    } else if y > 0.0 {
        lon = HALF_PI;
    } else if y < 0.0 {
        lon = -HALF_PI;
    } else {
        at_pole = true;
        lon = 0.0;
        if z == 0.0 {
            // centre of the earth
            return (lon, HALF_PI, -b);
        }
    }

    let t0 = z * AD_C;
    let s0 = (t0 * t0 + w2).sqrt();
    let sin_b0 = t0 / s0;
    let cos_b0 = w / s0;
    let sin3_b0 = sin_b0 * sin_b0 * sin_b0;
    let t1 = z + b * ep2 * sin3_b0;
    let sum = w - a * es * cos_b0 * cos_b0 * cos_b0;
    let s1 = (t1 * t1 + sum * sum).sqrt();
    let sin_p1 = t1 / s1;
    let cos_p1 = sum / s1;
    let rn = a / (1.0 - es * sin_p1 * sin_p1).sqrt();

    let h = if cos_p1 >= COS_67P5 {
        w / cos_p1 - rn
    } else if cos_p1 <= -COS_67P5 {
        w / -cos_p1 - rn
    } else {
        z / sin_p1 + rn * (es - 1.0)
    };
    let lat = if at_pole {
        if z >= 0.0 {
            HALF_PI
        } else {
            -HALF_PI
        }
    } else {
        (sin_p1 / cos_p1).atan()
    };
    (lon, lat, h)
}

/// Apply the datum's Helmert parameters, moving X, Y, Z into WGS84.
pub fn geocentric_to_wgs84(p: (f64, f64, f64), datum_type: DatumType, params: &[f64]) -> (f64, f64, f64) {
    let (x, y, z) = p;
    match (datum_type, params) {
        (DatumType::ThreeParam, [dx, dy, dz, ..]) => (x + dx, y + dy, z + dz),
        (DatumType::SevenParam, &[dx, dy, dz, rx, ry, rz, m]) => (
            m * (x - rz * y + ry * z) + dx,
            m * (rz * x + y - rx * z) + dy,
            m * (-ry * x + rx * y + z) + dz,
        ),
        _ => p,
    }
}

/// Inverse of [`geocentric_to_wgs84`].
pub fn geocentric_from_wgs84(p: (f64, f64, f64), datum_type: DatumType, params: &[f64]) -> (f64, f64, f64) {
    let (x, y, z) = p;
    match (datum_type, params) {
        (DatumType::ThreeParam, [dx, dy, dz, ..]) => (x - dx, y - dy, z - dz),
        (DatumType::SevenParam, &[dx, dy, dz, rx, ry, rz, m]) => {
            let xt = (x - dx) / m;
            let yt = (y - dy) / m;
            let zt = (z - dz) / m;
            (
                xt + rz * yt - ry * zt,
                -rz * xt + yt + rx * zt,
                ry * xt - rx * yt + zt,
            )
        }
        _ => p,
    }
}
