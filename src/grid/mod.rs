//! Datum shift grids: the in-memory store, `nadgrids` list resolution and
//! the binary loaders.
//!
//! Grids are keyed by the name used in `+nadgrids=`. A CRS only records the
//! names; they are looked up in the [`GridStore`] each time a shift is
//! applied, so a grid may be loaded after the CRS that uses it was built.

pub mod geotiff;
pub mod ntv2;
pub mod shift;

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use crate::constants::D2R;
use crate::error::ProjError;

/// Arcseconds to radians.
pub(crate) fn seconds_to_radians(seconds: f64) -> f64 {
    (seconds / 3600.0) * D2R
}

/// File-level metadata. Raster grids only fill `n_subgrids`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GridHeader {
    pub n_fields: i32,
    pub n_subgrid_fields: i32,
    pub n_subgrids: usize,
    pub shift_type: String,
    pub from_semi_major_axis: f64,
    pub from_semi_minor_axis: f64,
    pub to_semi_major_axis: f64,
    pub to_semi_minor_axis: f64,
}

/// One regular block of shift vectors.
///
/// Coordinates use the positive-west longitude convention of NTv2: `ll[0]`
/// is the negated eastern edge, and column indices grow westwards.
#[derive(Clone, Debug, PartialEq)]
pub struct Subgrid {
    pub name: String,
    /// Lower-left corner (−lon, lat), radians
    pub ll: [f64; 2],
    /// Node spacing (lon, lat), radians
    pub del: [f64; 2],
    /// Column and row counts
    pub lim: [usize; 2],
    pub count: usize,
    /// Row-major shift vectors (−dlon, dlat), radians
    pub cvs: Vec<[f64; 2]>,
}

impl Subgrid {
    /// Whether (−lon, lat) falls inside the node extent, padded by a small
    /// fraction of the node spacing.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        let epsilon = (self.del[1].abs() + self.del[0].abs()) / 10_000.0;
        let min_x = self.ll[0] - epsilon;
        let min_y = self.ll[1] - epsilon;
        let max_x = self.ll[0] + (self.lim[0] as f64 - 1.0) * self.del[0] + epsilon;
        let max_y = self.ll[1] + (self.lim[1] as f64 - 1.0) * self.del[1] + epsilon;
        !(min_y > y || min_x > x || max_y < y || max_x < x)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct NadGrid {
    pub header: GridHeader,
    pub subgrids: Vec<Subgrid>,
}

/// One entry of a `nadgrids` list, before lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NadgridRef {
    pub name: String,
    pub mandatory: bool,
    /// The literal `null` grid: an identity shift
    pub is_null: bool,
}

/// A list entry resolved against a store.
#[derive(Clone, Debug)]
pub struct NadgridInfo {
    pub name: String,
    pub mandatory: bool,
    pub grid: Option<Arc<NadGrid>>,
    pub is_null: bool,
}

/// Split a `nadgrids` value such as `"@conus,@alaska,null"`.
pub fn parse_nadgrids(nadgrids: &str) -> Vec<NadgridRef> {
    nadgrids
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| {
            let (mandatory, name) = match name.strip_prefix('@') {
                Some(rest) => (false, rest),
                None => (true, name),
            };
            NadgridRef {
                name: name.to_owned(),
                mandatory,
                is_null: name == "null",
            }
        })
        .collect()
}

/// Parse `nadgrids` and resolve each entry against the grids loaded in `store`.
pub fn get_nadgrids(nadgrids: &str, store: &GridStore) -> Vec<NadgridInfo> {
    store.resolve(&parse_nadgrids(nadgrids))
}

/// Shared, thread-safe registry of loaded grids. Cloning shares the storage.
#[derive(Clone, Debug, Default)]
pub struct GridStore {
    grids: Arc<RwLock<HashMap<String, Arc<NadGrid>>>>,
}

impl GridStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a grid under `key`, replacing any previous one.
    pub fn insert(&self, key: &str, grid: NadGrid) -> Arc<NadGrid> {
        debug!(key, subgrids = grid.subgrids.len(), "grid loaded");
        let grid = Arc::new(grid);
        self.grids
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_owned(), Arc::clone(&grid));
        grid
    }

    pub fn get(&self, key: &str) -> Option<Arc<NadGrid>> {
        self.grids
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.grids
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }

    pub fn resolve(&self, refs: &[NadgridRef]) -> Vec<NadgridInfo> {
        refs.iter()
            .map(|r| NadgridInfo {
                name: r.name.clone(),
                mandatory: r.mandatory,
                grid: if r.is_null { None } else { self.get(&r.name) },
                is_null: r.is_null,
            })
            .collect()
    }

    /// Parse an NTv2 (`.gsb`) buffer and register it under `key`.
    pub fn load_ntv2(
        &self,
        key: &str,
        data: &[u8],
        include_error_fields: bool,
    ) -> Result<Arc<NadGrid>, ProjError> {
        let grid = ntv2::parse(data, include_error_fields)?;
        Ok(self.insert(key, grid))
    }

    /// Decode a GeoTIFF grid on the blocking pool and register it under `key`.
    pub async fn load_geotiff(&self, key: &str, data: Vec<u8>) -> Result<Arc<NadGrid>, ProjError> {
        let grid = tokio::task::spawn_blocking(move || geotiff::parse(&data))
            .await
            .map_err(|e| ProjError::GridLoad(format!("GeoTIFF decode task failed: {e}")))??;
        Ok(self.insert(key, grid))
    }

    /// Register a single raster grid from its latitude and longitude offset
    /// bands (arcseconds, row-major from the north-west corner) and its
    /// extent `[min_lon, min_lat, max_lon, max_lat]` in degrees.
    pub fn load_raster(
        &self,
        key: &str,
        lat_band: &[f32],
        lon_band: &[f32],
        width: usize,
        height: usize,
        extent: [f64; 4],
    ) -> Result<Arc<NadGrid>, ProjError> {
        let subgrid = geotiff::raster_subgrid(key, lat_band, lon_band, width, height, extent)?;
        let grid = NadGrid {
            header: GridHeader {
                n_subgrids: 1,
                ..Default::default()
            },
            subgrids: vec![subgrid],
        };
        Ok(self.insert(key, grid))
    }
}
