//! Applying a grid shift to a geodetic point.

use std::f64::consts::PI;

use tracing::{debug, warn};

use crate::constants::R2D;
use crate::error::ProjError;
use crate::grid::{NadgridInfo, Subgrid};
use crate::proj::common::adjust_lon;

/// Convergence tolerance of the inverse shift, radians.
const INVERSE_TOL: f64 = 1e-12;
const INVERSE_MAX_ITER: usize = 10;

/// Shift (lon, lat) radians through the first grid in `grids` that covers
/// the point. With `inverse` the shift is removed instead of added.
///
/// A `null` entry stops the search with no shift. Unloaded optional grids
/// are skipped; an unloaded mandatory grid is an error. When nothing matches
/// and every grid tried was optional the point is returned unshifted.
pub fn apply_grid_shift(
    grids: &[NadgridInfo],
    inverse: bool,
    lon: f64,
    lat: f64,
) -> Result<(f64, f64), ProjError> {
    if grids.is_empty() {
        return Err(ProjError::GridShift("no grids listed".into()));
    }
    let input = [-lon, lat];
    let mut output = None;
    let mut attempted = Vec::new();
    let mut all_optional = true;

    'grids: for info in grids {
        attempted.push(info.name.as_str());
        if info.is_null {
            output = Some(input);
            break;
        }
        all_optional &= !info.mandatory;
        let Some(grid) = &info.grid else {
            if info.mandatory {
                return Err(ProjError::GridShift(format!(
                    "mandatory grid '{}' is not loaded",
                    info.name
                )));
            }
            warn!(grid = %info.name, "optional grid is not loaded, skipping");
            continue;
        };
        for subgrid in &grid.subgrids {
            if !subgrid.contains(input[0], input[1]) {
                continue;
            }
            if let Some(shifted) = apply_subgrid_shift(input, inverse, subgrid) {
                output = Some(shifted);
                break 'grids;
            }
        }
    }

    match output {
        Some(out) => Ok((-out[0], out[1])),
        None if all_optional => {
            warn!(grids = ?attempted, "no optional grid covers the point, leaving it unshifted");
            Ok((lon, lat))
        }
        None => Err(ProjError::GridShift(format!(
            "no grid shift table covers {} {}; tried {:?}",
            lon * R2D,
            lat * R2D,
            attempted
        ))),
    }
}

/// Shift one point (−lon, lat) with a single subgrid. `None` when the point
/// falls outside the interpolation domain.
pub fn apply_subgrid_shift(pin: [f64; 2], inverse: bool, ct: &Subgrid) -> Option<[f64; 2]> {
    if pin[0].is_nan() {
        return None;
    }
    let mut tb = [pin[0] - ct.ll[0], pin[1] - ct.ll[1]];
    tb[0] = adjust_lon(tb[0] - PI) + PI;
    let shift = nad_interpolate(tb, ct)?;

    if !inverse {
        return Some([pin[0] + shift[0], pin[1] + shift[1]]);
    }

    let mut t = [tb[0] - shift[0], tb[1] - shift[1]];
    let mut converged = false;
    for _ in 0..INVERSE_MAX_ITER {
        let Some(del) = nad_interpolate(t, ct) else {
            debug!("inverse grid shift left the grid, using first approximation");
            converged = true;
            break;
        };
        let dif = [tb[0] - (del[0] + t[0]), tb[1] - (del[1] + t[1])];
        t[0] += dif[0];
        t[1] += dif[1];
        if dif[0].abs() <= INVERSE_TOL && dif[1].abs() <= INVERSE_TOL {
            converged = true;
            break;
        }
    }
    if !converged {
        debug!("inverse grid shift did not converge");
        return None;
    }
    Some([adjust_lon(t[0] + ct.ll[0]), t[1] + ct.ll[1]])
}

/// Bilinear interpolation of the shift at an offset from the subgrid's
/// lower-left corner. Nodes on the last row or column reuse their own value
/// for the missing neighbour.
pub fn nad_interpolate(pin: [f64; 2], ct: &Subgrid) -> Option<[f64; 2]> {
    let t = [pin[0] / ct.del[0], pin[1] / ct.del[1]];
    let index = [t[0].floor(), t[1].floor()];
    let frct = [t[0] - index[0], t[1] - index[1]];
    if index[0] < 0.0 || index[0] >= ct.lim[0] as f64 || index[1] < 0.0 || index[1] >= ct.lim[1] as f64 {
        return None;
    }
    let (ix, iy) = (index[0] as usize, index[1] as usize);
    let ix1 = (ix + 1).min(ct.lim[0] - 1);
    let iy1 = (iy + 1).min(ct.lim[1] - 1);
    let node = |col: usize, row: usize| ct.cvs.get(row * ct.lim[0] + col).copied();

    let f00 = node(ix, iy)?;
    let f10 = node(ix1, iy)?;
    let f11 = node(ix1, iy1)?;
    let f01 = node(ix, iy1)?;

    let m11 = frct[0] * frct[1];
    let m10 = frct[0] * (1.0 - frct[1]);
    let m00 = (1.0 - frct[0]) * (1.0 - frct[1]);
    let m01 = (1.0 - frct[0]) * frct[1];
    Some([
        m00 * f00[0] + m10 * f10[0] + m01 * f01[0] + m11 * f11[0],
        m00 * f00[1] + m10 * f10[1] + m01 * f01[1] + m11 * f11[1],
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::D2R;
    use crate::grid::ntv2::fixture;
    use crate::grid::{get_nadgrids, seconds_to_radians, GridStore};
    use approx::assert_relative_eq;

    fn store() -> GridStore {
        let store = GridStore::new();
        let data = fixture::build(&[fixture::small()], true, true);
        store.load_ntv2("small", &data, true).unwrap();
        store
    }

    #[test]
    fn test_node_is_exact() {
        let store = store();
        let mut corner = fixture::small();
        corner.shifts[0] = (0.35, 0.65);
        store
            .load_ntv2("corner", &fixture::build(&[corner], true, true), true)
            .unwrap();

        // lower-left node: 0°E (−lon = 0), 0°N, stored shift lat 0.35", lon 0.65"
        let grids = get_nadgrids("corner", &store);
        let (lon, lat) = apply_grid_shift(&grids, false, 0.0, 0.0).unwrap();
        assert_eq!(lat, seconds_to_radians(0.35f32 as f64));
        assert_eq!(lon, -seconds_to_radians(0.65f32 as f64));

        let grids = get_nadgrids("small", &store);

        // node (1, 1): 1°W, 1°N, shift lat 0.4", lon 0.8" (positive west)
        let (lon, lat) = apply_grid_shift(&grids, false, -D2R, D2R).unwrap();
        assert_relative_eq!(lat, D2R + seconds_to_radians(0.4 as f32 as f64), epsilon = 1e-12);
        assert_relative_eq!(lon, -D2R - seconds_to_radians(0.8 as f32 as f64), epsilon = 1e-12);
    }

    #[test]
    fn test_forward_then_inverse() {
        let store = store();
        let grids = get_nadgrids("small", &store);
        let (lon0, lat0) = (-0.37 * D2R, 1.21 * D2R);
        let (lon1, lat1) = apply_grid_shift(&grids, false, lon0, lat0).unwrap();
        assert!(lon1 != lon0 && lat1 != lat0);
        let (lon2, lat2) = apply_grid_shift(&grids, true, lon1, lat1).unwrap();
        assert_relative_eq!(lon2, lon0, epsilon = 1e-12);
        assert_relative_eq!(lat2, lat0, epsilon = 1e-12);
    }

    #[test]
    fn test_upper_edge_node() {
        let store = store();
        let grids = get_nadgrids("small", &store);
        // north-west corner, node 8: lat 0.8", lon 1.6"
        let (lon, lat) = apply_grid_shift(&grids, false, -2.0 * D2R, 2.0 * D2R).unwrap();
        assert_relative_eq!(lat, 2.0 * D2R + seconds_to_radians(0.8 as f32 as f64), epsilon = 1e-12);
        assert_relative_eq!(lon, -2.0 * D2R - seconds_to_radians(1.6 as f32 as f64), epsilon = 1e-12);
    }

    #[test]
    fn test_missing_grids() {
        let store = store();
        let outside = (10.0 * D2R, 10.0 * D2R);

        let mandatory_missing = get_nadgrids("absent", &store);
        assert!(matches!(
            apply_grid_shift(&mandatory_missing, false, 0.0, 0.0),
            Err(ProjError::GridShift(_))
        ));

        let optional = get_nadgrids("@absent,@small", &store);
        assert_eq!(apply_grid_shift(&optional, false, outside.0, outside.1).unwrap(), outside);

        let mandatory = get_nadgrids("small", &store);
        assert!(apply_grid_shift(&mandatory, false, outside.0, outside.1).is_err());

        let with_null = get_nadgrids("small,null", &store);
        assert_eq!(apply_grid_shift(&with_null, false, outside.0, outside.1).unwrap(), outside);

        assert!(apply_grid_shift(&[], false, 0.0, 0.0).is_err());
    }
}
