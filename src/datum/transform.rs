use tracing::trace;

use crate::constants::{R2D, SRS_WGS84_ESQUARED, SRS_WGS84_SEMIMAJOR, SRS_WGS84_SEMIMINOR};
use crate::datum::geocentric::{
    geocentric_from_wgs84, geocentric_to_geodetic, geocentric_to_wgs84, geodetic_to_geocentric,
};
use crate::datum::{compare_datums, Datum, DatumType};
use crate::error::ProjError;
use crate::grid::shift::apply_grid_shift;
use crate::grid::GridStore;

/// Move a geodetic point (lon, lat radians, h metres) from `source` datum
/// to `dest` datum. Grids are looked up in `store` at call time.
pub fn datum_transform(
    source: &Datum,
    dest: &Datum,
    point: (f64, f64, f64),
    store: &GridStore,
) -> Result<(f64, f64, f64), ProjError> {
    if compare_datums(source, dest) {
        trace!("datums match, no shift");
        return Ok(point);
    }
    if source.datum_type == DatumType::NoDatum || dest.datum_type == DatumType::NoDatum {
        trace!("datum shift disabled on one side");
        return Ok(point);
    }

    let (mut lon, mut lat, h) = point;

    let mut source_a = source.a;
    let mut source_es = source.es;
    if source.datum_type == DatumType::GridShift {
        trace!("applying source grid shift");
        (lon, lat) = apply_grid_shift(&store.resolve(&source.grids), false, lon, lat)?;
        source_a = SRS_WGS84_SEMIMAJOR;
        source_es = SRS_WGS84_ESQUARED;
    }

    let (mut dest_a, mut dest_b, mut dest_es) = (dest.a, dest.b, dest.es);
    if dest.datum_type == DatumType::GridShift {
        dest_a = SRS_WGS84_SEMIMAJOR;
        dest_b = SRS_WGS84_SEMIMINOR;
        dest_es = SRS_WGS84_ESQUARED;
    }

    if source_es == dest_es
        && source_a == dest_a
        && !source.datum_type.has_params()
        && !dest.datum_type.has_params()
    {
        trace!("ellipsoids match, skipping geocentric conversion");
        return Ok((lon, lat, h));
    }

    trace!(source = ?source.datum_type, dest = ?dest.datum_type, "shifting through geocentric");
    let mut xyz = geodetic_to_geocentric(lon, lat, h, source_es, source_a);
    if !xyz.0.is_finite() || !xyz.1.is_finite() {
        return Err(ProjError::InvalidCoordinate(format!(
            "latitude {} is outside the valid range",
            lat * R2D
        )));
    }
    if source.datum_type.has_params() {
        xyz = geocentric_to_wgs84(xyz, source.datum_type, &source.params);
    }
    if dest.datum_type.has_params() {
        xyz = geocentric_from_wgs84(xyz, dest.datum_type, &dest.params);
    }
    let (mut lon, mut lat, h) = geocentric_to_geodetic(xyz.0, xyz.1, xyz.2, dest_es, dest_a, dest_b);

    if dest.datum_type == DatumType::GridShift {
        trace!("applying inverse destination grid shift");
        (lon, lat) = apply_grid_shift(&store.resolve(&dest.grids), true, lon, lat)?;
    }
    Ok((lon, lat, h))
}
