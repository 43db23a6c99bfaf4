//! NTv2 (`.gsb`) binary grid reader.
//!
//! Layout: a 176-byte file header, then per subgrid a 176-byte header
//! followed by `node_count` records of `(lat_shift, lon_shift[, lat_acc,
//! lon_acc])` as 32-bit floats. Angles are arcseconds, longitudes positive
//! west. Byte order is detected from the field count at offset 8, which is
//! always 11.

use tracing::warn;

use crate::error::ProjError;
use crate::grid::{seconds_to_radians, GridHeader, NadGrid, Subgrid};

const HEADER_LEN: usize = 176;
const FIELD_COUNT: i32 = 11;

struct Reader<'a> {
    data: &'a [u8],
    little_endian: bool,
}

impl<'a> Reader<'a> {
    fn bytes<const N: usize>(&self, offset: usize) -> Result<[u8; N], ProjError> {
        self.data
            .get(offset..offset + N)
            .and_then(|s| s.try_into().ok())
            .ok_or_else(|| {
                ProjError::GridLoad(format!(
                    "NTv2 buffer truncated: need {} bytes, have {}",
                    offset + N,
                    self.data.len()
                ))
            })
    }

    fn i32(&self, offset: usize) -> Result<i32, ProjError> {
        let b = self.bytes::<4>(offset)?;
        Ok(if self.little_endian {
            i32::from_le_bytes(b)
        } else {
            i32::from_be_bytes(b)
        })
    }

    fn f32(&self, offset: usize) -> Result<f32, ProjError> {
        let b = self.bytes::<4>(offset)?;
        Ok(if self.little_endian {
            f32::from_le_bytes(b)
        } else {
            f32::from_be_bytes(b)
        })
    }

    fn f64(&self, offset: usize) -> Result<f64, ProjError> {
        let b = self.bytes::<8>(offset)?;
        Ok(if self.little_endian {
            f64::from_le_bytes(b)
        } else {
            f64::from_be_bytes(b)
        })
    }

    fn text(&self, offset: usize) -> Result<String, ProjError> {
        let b = self.bytes::<8>(offset)?;
        Ok(String::from_utf8_lossy(&b).trim().trim_end_matches('\0').to_owned())
    }
}

fn detect_little_endian(data: &[u8]) -> Result<bool, ProjError> {
    let big = Reader {
        data,
        little_endian: false,
    };
    if big.i32(8)? == FIELD_COUNT {
        return Ok(false);
    }
    let little = Reader {
        data,
        little_endian: true,
    };
    if little.i32(8)? != FIELD_COUNT {
        warn!("failed to detect NTv2 byte order, assuming little-endian");
    }
    Ok(true)
}

/// Parse an NTv2 buffer. `include_error_fields` says whether node records
/// carry the two accuracy floats (16 bytes) or only the shifts (8 bytes).
pub fn parse(data: &[u8], include_error_fields: bool) -> Result<NadGrid, ProjError> {
    let r = Reader {
        data,
        little_endian: detect_little_endian(data)?,
    };
    let n_subgrids = r.i32(40)?;
    let n_subgrids = usize::try_from(n_subgrids)
        .map_err(|_| ProjError::GridLoad(format!("NTv2 subgrid count {n_subgrids} is negative")))?;
    let header = GridHeader {
        n_fields: r.i32(8)?,
        n_subgrid_fields: r.i32(24)?,
        n_subgrids,
        shift_type: r.text(56)?,
        from_semi_major_axis: r.f64(120)?,
        from_semi_minor_axis: r.f64(136)?,
        to_semi_major_axis: r.f64(152)?,
        to_semi_minor_axis: r.f64(168)?,
    };

    let record_len = if include_error_fields { 16 } else { 8 };
    let mut offset = HEADER_LEN;
    let mut subgrids = Vec::with_capacity(n_subgrids);
    for _ in 0..n_subgrids {
        let (subgrid, node_count) = read_subgrid(&r, offset, record_len)?;
        subgrids.push(subgrid);
        offset += HEADER_LEN + node_count * record_len;
    }
    Ok(NadGrid { header, subgrids })
}

fn read_subgrid(r: &Reader<'_>, offset: usize, record_len: usize) -> Result<(Subgrid, usize), ProjError> {
    let name = r.text(offset + 8)?;
    let lower_lat = r.f64(offset + 72)?;
    let upper_lat = r.f64(offset + 88)?;
    let lower_lon = r.f64(offset + 104)?;
    let upper_lon = r.f64(offset + 120)?;
    let lat_interval = r.f64(offset + 136)?;
    let lon_interval = r.f64(offset + 152)?;
    let node_count = r.i32(offset + 168)?;
    let node_count = usize::try_from(node_count).map_err(|_| {
        ProjError::GridLoad(format!("NTv2 subgrid {name} has negative node count {node_count}"))
    })?;
    if lat_interval == 0.0 || lon_interval == 0.0 {
        return Err(ProjError::GridLoad(format!("NTv2 subgrid {name} has a zero interval")));
    }

    // rounding absorbs float drift in interval * count
    let lon_columns = (1.0 + (upper_lon - lower_lon) / lon_interval).round() as usize;
    let lat_rows = (1.0 + (upper_lat - lower_lat) / lat_interval).round() as usize;

    let nodes_offset = offset + HEADER_LEN;
    let cvs = (0..node_count)
        .map(|i| {
            let at = nodes_offset + i * record_len;
            let lat_shift = r.f32(at)? as f64;
            let lon_shift = r.f32(at + 4)? as f64;
            Ok([seconds_to_radians(lon_shift), seconds_to_radians(lat_shift)])
        })
        .collect::<Result<Vec<_>, ProjError>>()?;

    let subgrid = Subgrid {
        name,
        ll: [seconds_to_radians(lower_lon), seconds_to_radians(lower_lat)],
        del: [seconds_to_radians(lon_interval), seconds_to_radians(lat_interval)],
        lim: [lon_columns, lat_rows],
        count: node_count,
        cvs,
    };
    Ok((subgrid, node_count))
}


#[cfg(test)]
mod tests {
    use super::fixture::*;
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_parse_little_endian() {
        let data = build(&[small()], true, true);
        let grid = parse(&data, true).unwrap();
        assert_eq!(grid.header.n_fields, 11);
        assert_eq!(grid.header.n_subgrids, 1);
        assert_eq!(grid.header.shift_type, "SECONDS");
        assert_relative_eq!(grid.header.to_semi_major_axis, 6_378_137.0);

        let sub = &grid.subgrids[0];
        assert_eq!(sub.name, "SMALL");
        assert_eq!(sub.lim, [3, 3]);
        assert_eq!(sub.count, 9);
        assert_eq!(sub.cvs.len(), 9);
        assert_relative_eq!(sub.del[0], 1f64.to_radians(), epsilon = 1e-15);
        assert_relative_eq!(sub.cvs[4][0], seconds_to_radians(0.8), epsilon = 1e-12);
        assert_relative_eq!(sub.cvs[4][1], seconds_to_radians(0.4), epsilon = 1e-12);
    }

    #[test]
    fn test_parse_big_endian_without_error_fields() {
        let data = build(&[small(), small()], false, false);
        let grid = parse(&data, false).unwrap();
        assert_eq!(grid.subgrids.len(), 2);
        assert_eq!(grid.subgrids[1].lim, [3, 3]);
        assert_relative_eq!(grid.subgrids[1].cvs[8][1], seconds_to_radians(0.8), epsilon = 1e-12);
    }

    #[test]
    fn test_column_count_rounds() {
        let mut sub = small();
        sub.bounds.3 = 7199.999_999_9;
        let grid = parse(&build(&[sub], true, true), true).unwrap();
        assert_eq!(grid.subgrids[0].lim, [3, 3]);
    }

    #[test]
    fn test_truncated_buffer() {
        let data = build(&[small()], true, true);
        let err = parse(&data[..300], true).unwrap_err();
        assert!(matches!(err, ProjError::GridLoad(_)));
        assert!(parse(&[0u8; 10], true).is_err());
    }
}
