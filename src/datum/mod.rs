//! Datum engine: how a CRS ties to WGS84 and how points move between datums.

pub mod geocentric;
pub mod transform;

use crate::constants::SEC_TO_RAD;
use crate::grid::{parse_nadgrids, NadgridRef};
use crate::params::ResolvedParams;

pub use transform::datum_transform;

/// Tolerance on eccentricity squared when comparing two datums.
const ES_TOLERANCE: f64 = 0.000_000_000_050;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DatumType {
    ThreeParam,
    SevenParam,
    /// WGS84 or a datum treated as equivalent to it
    Wgs84,
    /// Datum shifts are skipped entirely (`+datum=none`, `+nadgrids=@null`)
    NoDatum,
    GridShift,
}

impl DatumType {
    /// Whether the datum carries Helmert parameters.
    pub fn has_params(self) -> bool {
        matches!(self, DatumType::ThreeParam | DatumType::SevenParam)
    }
}

/// The datum attached to a CRS. Rotations are radians and the scale is the
/// multiplier `1 + ppm / 1e6`. Grids are kept by name and looked up in a
/// grid store when a shift is applied.
#[derive(Clone, Debug, PartialEq)]
pub struct Datum {
    pub datum_type: DatumType,
    pub params: Vec<f64>,
    pub a: f64,
    pub b: f64,
    pub es: f64,
    pub ep2: f64,
    pub grids: Vec<NadgridRef>,
}

impl Datum {
    pub fn new(params: &ResolvedParams) -> Self {
        let ell = &params.ellipsoid;
        let mut datum_type = if params.datum_code.as_deref() == Some("none") {
            DatumType::NoDatum
        } else {
            DatumType::Wgs84
        };

        let mut values = params.datum_params.clone().unwrap_or_default();
        if values.len() >= 3 && values[..3].iter().any(|v| *v != 0.0) {
            datum_type = DatumType::ThreeParam;
        }
        if values.len() >= 7 && values[3..7].iter().any(|v| *v != 0.0) {
            datum_type = DatumType::SevenParam;
            values[3] *= SEC_TO_RAD;
            values[4] *= SEC_TO_RAD;
            values[5] *= SEC_TO_RAD;
            values[6] = values[6] / 1_000_000.0 + 1.0;
        }

        // A mandatory `null` still makes a grid datum: it is the identity on
        // WGS84, so the ellipsoid is swapped rather than shifted.
        let grids = params.nadgrids.as_deref().map(parse_nadgrids).unwrap_or_default();
        if grids.iter().any(|g| g.mandatory || !g.is_null) {
            datum_type = DatumType::GridShift;
        }

        Self {
            datum_type,
            params: values,
            a: ell.a,
            b: ell.b,
            es: ell.es,
            ep2: ell.ep2,
            grids,
        }
    }

    /// Names of the listed grids, in order.
    pub fn grid_names(&self) -> impl Iterator<Item = &str> {
        self.grids.iter().map(|g| g.name.as_str())
    }
}

/// Whether two datums are interchangeable, so no shift is needed.
pub fn compare_datums(source: &Datum, dest: &Datum) -> bool {
    if source.datum_type != dest.datum_type {
        return false;
    }
    if source.a != dest.a || (source.es - dest.es).abs() > ES_TOLERANCE {
        return false;
    }
    match source.datum_type {
        DatumType::ThreeParam => source.params.get(..3) == dest.params.get(..3),
        DatumType::SevenParam => source.params.get(..7) == dest.params.get(..7),
        DatumType::GridShift => source.grid_names().eq(dest.grid_names()),
        _ => true,
    }
}
