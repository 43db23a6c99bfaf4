//! GeoTIFF shift grids (the PROJ-data `.tif` layout).
//!
//! Each image is one subgrid with two float bands: latitude offset then
//! longitude offset, both in arcseconds (longitude positive east). PROJ
//! writes coarse parent grids before their children, so images are read in
//! reverse to give finer grids precedence when matching.

use std::io::Cursor;

use tiff::decoder::{Decoder, DecodingResult};
use tiff::tags::Tag;

use crate::constants::D2R;
use crate::error::ProjError;
use crate::grid::{seconds_to_radians, GridHeader, NadGrid, Subgrid};

/// Build a subgrid from two row-major bands (first row is the northern
/// edge, first column the western edge) and the node extent
/// `[min_lon, min_lat, max_lon, max_lat]` in degrees.
pub fn raster_subgrid(
    name: &str,
    lat_band: &[f32],
    lon_band: &[f32],
    width: usize,
    height: usize,
    extent: [f64; 4],
) -> Result<Subgrid, ProjError> {
    if width < 2 || height < 2 {
        return Err(ProjError::GridLoad(format!(
            "raster grid {name} must be at least 2x2, got {width}x{height}"
        )));
    }
    let n = width * height;
    if lat_band.len() < n || lon_band.len() < n {
        return Err(ProjError::GridLoad(format!(
            "raster grid {name} bands hold {} and {} values, expected {n}",
            lat_band.len(),
            lon_band.len()
        )));
    }
    let [min_x, min_y, max_x, max_y] = extent;
    let dx = (max_x - min_x) / (width - 1) as f64;
    let dy = (max_y - min_y) / (height - 1) as f64;

    // bottom row first, east to west within a row
    let mut cvs = Vec::with_capacity(n);
    for i in (0..height).rev() {
        for j in (0..width).rev() {
            let index = i * width + j;
            cvs.push([
                -seconds_to_radians(lon_band[index] as f64),
                seconds_to_radians(lat_band[index] as f64),
            ]);
        }
    }

    Ok(Subgrid {
        name: name.to_owned(),
        ll: [-max_x * D2R, min_y * D2R],
        del: [dx * D2R, dy * D2R],
        lim: [width, height],
        count: n,
        cvs,
    })
}

/// Decode every image of a GeoTIFF grid file.
pub fn parse(data: &[u8]) -> Result<NadGrid, ProjError> {
    let mut decoder = Decoder::new(Cursor::new(data))?;
    let mut subgrids = Vec::new();
    loop {
        let name = format!("image{}", subgrids.len());
        subgrids.push(read_image(&mut decoder, &name)?);
        if !decoder.more_images() {
            break;
        }
        decoder.next_image()?;
    }
    subgrids.reverse();
    Ok(NadGrid {
        header: GridHeader {
            n_subgrids: subgrids.len(),
            ..Default::default()
        },
        subgrids,
    })
}

fn read_image(decoder: &mut Decoder<Cursor<&[u8]>>, name: &str) -> Result<Subgrid, ProjError> {
    let (width, height) = decoder.dimensions()?;
    let (width, height) = (width as usize, height as usize);
    let scale = decoder.get_tag_f64_vec(Tag::ModelPixelScaleTag)?;
    let tiepoint = decoder.get_tag_f64_vec(Tag::ModelTiepointTag)?;
    if scale.len() < 2 || tiepoint.len() < 6 {
        return Err(ProjError::GridLoad(format!("{name}: malformed georeferencing tags")));
    }
    let planar = decoder
        .find_tag(Tag::PlanarConfiguration)?
        .map(|v| v.into_u16())
        .transpose()?
        .unwrap_or(1);

    let samples: Vec<f32> = match decoder.read_image()? {
        DecodingResult::F32(v) => v,
        DecodingResult::F64(v) => v.into_iter().map(|s| s as f32).collect(),
        _ => {
            return Err(ProjError::GridLoad(format!("{name}: offset bands must be floating point")));
        }
    };

    let n = width * height;
    if n == 0 || samples.len() < 2 * n {
        return Err(ProjError::GridLoad(format!("{name}: expected at least two bands")));
    }
    let (lat_band, lon_band): (Vec<f32>, Vec<f32>) = if planar == 2 {
        (samples[..n].to_vec(), samples[n..2 * n].to_vec())
    } else {
        let per_pixel = samples.len() / n;
        samples
            .chunks_exact(per_pixel)
            .map(|px| (px[0], px[1]))
            .unzip()
    };

    let min_x = tiepoint[3];
    let max_y = tiepoint[4];
    let max_x = min_x + (width as f64 - 1.0) * scale[0];
    let min_y = max_y - (height as f64 - 1.0) * scale[1];
    raster_subgrid(name, &lat_band, &lon_band, width, height, [min_x, min_y, max_x, max_y])
}
