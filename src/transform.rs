//! Point transform between two CRSs.
//!
//! Every transform goes through geodetic radians: source axis order and
//! units are undone, the source projection is inverted, the datum is
//! shifted and the destination projection is applied. Only the datum step
//! short-circuits when both sides agree.

use tracing::trace;

use crate::constants::{D2R, R2D};
use crate::crs::Proj;
use crate::datum::{compare_datums, datum_transform};
use crate::error::ProjError;
use crate::grid::GridStore;
use crate::point::Point;

/// Both CRSs of a transform plus what the datum step needs: the grid store
/// and the WGS84 CRS used as a pivot.
#[derive(Clone, Copy, Debug)]
pub struct Pipeline<'a> {
    source: &'a Proj,
    dest: &'a Proj,
    grids: &'a GridStore,
    wgs84: &'a Proj,
}

impl<'a> Pipeline<'a> {
    pub fn new(source: &'a Proj, dest: &'a Proj, grids: &'a GridStore, wgs84: &'a Proj) -> Self {
        Self {
            source,
            dest,
            grids,
            wgs84,
        }
    }

    pub fn transform(&self, point: Point, enforce_axis: bool) -> Result<Point, ProjError> {
        transform(self.source, self.dest, point, enforce_axis, self.grids, self.wgs84)
    }

    /// Source and destination swapped.
    pub fn reversed(&self) -> Self {
        Self {
            source: self.dest,
            dest: self.source,
            ..*self
        }
    }

    /// Transform points in place. Stops at the first failure, leaving the
    /// remaining points unchanged.
    pub fn transform_batch(&self, points: &mut [Point], enforce_axis: bool) -> Result<(), ProjError> {
        for p in points.iter_mut() {
            *p = self.transform(*p, enforce_axis)?;
        }
        Ok(())
    }
}

/// Transform `point` from `source` to `dest`.
///
/// Axis order is only honoured when `enforce_axis` is set. The returned
/// `z` is the height after the datum shift, or `None` when the input had
/// none.
pub fn transform(
    source: &Proj,
    dest: &Proj,
    point: Point,
    enforce_axis: bool,
    grids: &GridStore,
    wgs84: &Proj,
) -> Result<Point, ProjError> {
    check_sanity(&point)?;
    let has_z = point.z.is_some();

    let mut source = source;
    let mut point = point;
    if needs_wgs84_pivot(source, dest) {
        trace!(source = source.name(), dest = dest.name(), "pivoting through WGS84");
        point = transform(source, wgs84, point, enforce_axis, grids, wgs84)?;
        source = wgs84;
    }

    if enforce_axis && source.axis() != "enu" {
        point = adjust_axis(source.axis(), false, point)?;
    }

    let z = point.z.unwrap_or(0.0);
    let (lon, lat, h) = if source.is_longlat() {
        (point.x * D2R, point.y * D2R, z)
    } else {
        let (x, y) = match source.to_meter().filter(|k| *k != 0.0) {
            Some(k) => (point.x * k, point.y * k),
            None => (point.x, point.y),
        };
        source.projection().inverse_3d(x, y, z)?
    };
    let lon = lon + source.from_greenwich();

    let (lon, lat, h) = datum_transform(source.datum(), dest.datum(), (lon, lat, h), grids)?;

    let lon = lon - dest.from_greenwich();
    let (x, y, z) = if dest.is_longlat() {
        (lon * R2D, lat * R2D, h)
    } else {
        let (x, y, z) = dest.projection().forward_3d(lon, lat, h)?;
        match dest.to_meter().filter(|k| *k != 0.0) {
            Some(k) => (x / k, y / k, z),
            None => (x, y, z),
        }
    };

    let mut out = Point {
        x,
        y,
        z: Some(z),
        m: point.m,
    };
    if enforce_axis && dest.axis() != "enu" {
        out = adjust_axis(dest.axis(), true, out)?;
    }
    if !has_z {
        out.z = None;
    }
    Ok(out)
}

/// A CRS tied to WGS84 by Helmert parameters or a grid can only be shifted
/// directly to or from a CRS declared as WGS84, or to one on the same datum;
/// anything else goes through WGS84 first.
fn needs_wgs84_pivot(source: &Proj, dest: &Proj) -> bool {
    if compare_datums(source.datum(), dest.datum()) {
        return false;
    }
    (source.has_towgs84() && !dest.is_wgs84_code()) || (dest.has_towgs84() && !source.is_wgs84_code())
}

fn check_sanity(point: &Point) -> Result<(), ProjError> {
    if point.x.is_finite() && point.y.is_finite() {
        Ok(())
    } else {
        Err(ProjError::InvalidCoordinate(format!(
            "coordinates must be finite numbers, got ({}, {})",
            point.x, point.y
        )))
    }
}

#[derive(Clone, Copy)]
enum Slot {
    X,
    Y,
    Z,
}

/// Map a point between `axis` order and east-north-up. `denorm` selects
/// the direction (towards `axis` when set); for a valid axis string both
/// directions apply the same mapping, since each swap or sign flip is its
/// own inverse.
pub fn adjust_axis(axis: &str, denorm: bool, point: Point) -> Result<Point, ProjError> {
    let letters: Vec<char> = axis.chars().collect();
    if letters.len() != 3 || !letters.iter().all(|c| "ewnsud".contains(*c)) {
        return Err(ProjError::InvalidAxis(axis.to_owned()));
    }

    let mut out = Point {
        x: point.x,
        y: point.y,
        z: None,
        m: point.m,
    };
    for (i, &c) in letters.iter().enumerate() {
        let (v, slot) = match i {
            0 => (point.x, if "ew".contains(c) { Slot::X } else { Slot::Y }),
            1 => (point.y, if "ns".contains(c) { Slot::Y } else { Slot::X }),
            _ => match point.z {
                Some(z) => (z, Slot::Z),
                None => continue,
            },
        };
        let v = if matches!(c, 'w' | 's' | 'd') { -v } else { v };
        match (c, slot) {
            ('u' | 'd', _) | (_, Slot::Z) => out.z = Some(v),
            (_, Slot::X) => out.x = v,
            (_, Slot::Y) => out.y = v,
        }
    }
    trace!(axis, denorm, "axis adjusted");
    Ok(out)
}
