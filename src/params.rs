//! Parameter records for a CRS definition.
//!
//! [`ProjectionParams`] is what the definition parsers produce: every field
//! optional, angles already in radians. [`ResolvedParams::build`] merges in
//! the datum catalog, applies defaults and derives the ellipsoid constants,
//! returning a record that is never mutated afterwards.

use tracing::trace;

use crate::catalog;
use crate::constants::{EPSLN, RA4, RA6, SIXTH};
use crate::error::ProjError;
use crate::proj::ellipsoid::Ellipsoid;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProjectionParams {
    pub title: Option<String>,
    pub proj_name: Option<String>,
    pub ellps: Option<String>,
    pub datum_code: Option<String>,
    pub datum_name: Option<String>,
    /// towgs84 values as written: metres, arcseconds, ppm
    pub datum_params: Option<Vec<f64>>,
    pub nadgrids: Option<String>,
    pub a: Option<f64>,
    pub b: Option<f64>,
    pub rf: Option<f64>,
    pub r_a: bool,
    pub sphere: bool,
    pub lat0: Option<f64>,
    pub lat1: Option<f64>,
    pub lat2: Option<f64>,
    pub lat_ts: Option<f64>,
    pub long0: Option<f64>,
    pub long1: Option<f64>,
    pub long2: Option<f64>,
    pub alpha: Option<f64>,
    pub longc: Option<f64>,
    pub rectified_grid_angle: Option<f64>,
    pub x0: Option<f64>,
    pub y0: Option<f64>,
    pub k0: Option<f64>,
    pub to_meter: Option<f64>,
    pub units: Option<String>,
    pub from_greenwich: Option<f64>,
    pub axis: Option<String>,
    pub zone: Option<i32>,
    pub utm_south: bool,
    pub approx: bool,
    pub no_off: bool,
    pub no_rot: bool,
}

/// Semi-axes after catalog lookup.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SphereParams {
    pub a: f64,
    pub b: f64,
    pub rf: f64,
    pub sphere: bool,
}

/// Eccentricity terms derived from the semi-axes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Eccentricity {
    pub es: f64,
    pub e: f64,
    pub ep2: f64,
}

/// Resolve the semi-axes from whichever of `a`, `b`, `rf`, `ellps` were given.
pub fn derive_sphere(
    a: Option<f64>,
    b: Option<f64>,
    rf: Option<f64>,
    ellps: &str,
    sphere: bool,
) -> SphereParams {
    let (a, mut b, rf) = match a.filter(|a| *a != 0.0) {
        Some(a) => (a, b, rf),
        None => {
            let def = catalog::ellipsoid::lookup(ellps).unwrap_or_else(catalog::ellipsoid::wgs84);
            let nonzero = |v: f64| (v != 0.0).then_some(v);
            (def.a, nonzero(def.b), nonzero(def.rf))
        }
    };

    if let Some(rf) = rf.filter(|rf| *rf != 0.0) {
        if b.map_or(true, |b| b == 0.0) {
            b = Some((1.0 - 1.0 / rf) * a);
        }
    }
    // `a` alone describes a sphere
    let mut b = b.unwrap_or(a);
    let mut sphere = sphere;
    if rf == Some(0.0) || (a - b).abs() < EPSLN {
        sphere = true;
        b = a;
    }
    SphereParams {
        a,
        b,
        rf: rf.unwrap_or(0.0),
        sphere,
    }
}

/// Eccentricity terms. With `r_a` the authalic radius stands in for `a` when
/// computing `ep2`, and `es` is zeroed.
pub fn derive_eccentricity(a: f64, b: f64, r_a: bool) -> Eccentricity {
    let mut a2 = a * a;
    let b2 = b * b;
    let mut es = (a2 - b2) / a2;
    let mut e = 0.0;
    if r_a {
        let a = a * (1.0 - es * (SIXTH + es * (RA4 + es * RA6)));
        a2 = a * a;
        es = 0.0;
    } else {
        e = es.sqrt();
    }
    let ep2 = (a2 - b2) / b2;
    Eccentricity { es, e, ep2 }
}

/// Fully resolved, immutable parameters handed to the datum engine and to
/// projection plugins.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedParams {
    pub title: Option<String>,
    pub proj_name: String,
    pub ellps: String,
    pub ellipsoid: Ellipsoid,
    pub datum_code: Option<String>,
    pub datum_name: Option<String>,
    pub datum_params: Option<Vec<f64>>,
    pub nadgrids: Option<String>,
    pub lat0: f64,
    pub lat1: Option<f64>,
    pub lat2: Option<f64>,
    pub lat_ts: Option<f64>,
    pub long0: f64,
    pub long1: Option<f64>,
    pub long2: Option<f64>,
    pub alpha: Option<f64>,
    pub longc: Option<f64>,
    pub rectified_grid_angle: Option<f64>,
    pub x0: f64,
    pub y0: f64,
    pub k0: f64,
    pub to_meter: Option<f64>,
    pub units: Option<String>,
    pub from_greenwich: f64,
    pub axis: String,
    pub zone: Option<i32>,
    pub utm_south: bool,
    pub approx: bool,
    pub no_off: bool,
    pub no_rot: bool,
}

impl ResolvedParams {
    pub fn build(params: ProjectionParams) -> Result<Self, ProjError> {
        let ProjectionParams {
            title,
            proj_name,
            mut ellps,
            datum_code,
            mut datum_name,
            mut datum_params,
            mut nadgrids,
            a,
            b,
            rf,
            r_a,
            sphere,
            lat0,
            lat1,
            lat2,
            lat_ts,
            long0,
            long1,
            long2,
            alpha,
            longc,
            rectified_grid_angle,
            x0,
            y0,
            k0,
            to_meter,
            units,
            from_greenwich,
            axis,
            zone,
            utm_south,
            approx,
            no_off,
            no_rot,
        } = params;

        let proj_name = proj_name
            .ok_or_else(|| ProjError::Definition("definition has no projection name".into()))?;

        if let Some(code) = datum_code.as_deref().filter(|c| *c != "none") {
            if let Some(def) = catalog::datum::lookup(code) {
                trace!(datum = def.code, "datum resolved from catalog");
                if datum_params.is_none() && !def.towgs84.is_empty() {
                    datum_params = Some(def.towgs84.to_vec());
                }
                if nadgrids.is_none() {
                    nadgrids = def.nadgrids.map(str::to_owned);
                }
                ellps = Some(def.ellipse.to_owned());
                datum_name = Some(def.datum_name.to_owned());
            }
        }

        let ellps = ellps.unwrap_or_else(|| "wgs84".to_owned());
        let sphere = derive_sphere(a, b, rf, &ellps, sphere);
        let ecc = derive_eccentricity(sphere.a, sphere.b, r_a);
        let ellipsoid = Ellipsoid {
            a: sphere.a,
            b: sphere.b,
            rf: sphere.rf,
            es: ecc.es,
            e: ecc.e,
            ep2: ecc.ep2,
            sphere: sphere.sphere,
        };

        let truthy = |v: Option<f64>| v.filter(|v| *v != 0.0);

        Ok(Self {
            title,
            proj_name,
            ellps,
            ellipsoid,
            datum_code,
            datum_name,
            datum_params,
            nadgrids: nadgrids.filter(|n| !n.is_empty()),
            lat0: lat0.unwrap_or(0.0),
            lat1: truthy(lat1).or(lat0),
            lat2,
            lat_ts,
            long0: long0.unwrap_or(0.0),
            long1,
            long2,
            alpha,
            longc,
            rectified_grid_angle,
            x0: x0.unwrap_or(0.0),
            y0: y0.unwrap_or(0.0),
            k0: truthy(k0).unwrap_or(1.0),
            to_meter,
            units,
            from_greenwich: from_greenwich.unwrap_or(0.0),
            axis: axis.unwrap_or_else(|| "enu".to_owned()),
            zone,
            utm_south,
            approx,
            no_off,
            no_rot,
        })
    }
}
