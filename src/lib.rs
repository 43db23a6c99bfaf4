//! Coordinate conversion between cartographic reference systems.
//!
//! A CRS is described by a PROJ string, WKT, PROJJSON or a registered name
//! such as `EPSG:3857`. It resolves into a [`Proj`]: normalised parameters,
//! a datum and a bound projection plugin. [`transform::transform`] moves a
//! point between two of them through geodetic coordinates, shifting datums
//! with Helmert parameters or NTv2/GeoTIFF grids as needed.
//!
//! ```no_run
//! let utm = reproj::converter("+proj=utm +zone=33 +datum=WGS84 +units=m")?;
//! let [x, y] = utm.forward(&[15.0, 52.0])?;
//! let [lon, lat] = utm.inverse(&[x, y])?;
//! # Ok::<(), reproj::ProjError>(())
//! ```

pub mod api;
pub mod catalog;
pub mod constants;
pub mod crs;
pub mod datum;
pub mod defs;
pub mod error;
pub mod grid;
pub mod params;
pub mod point;
pub mod proj;
pub mod transform;

pub use api::{convert, convert_between, converter, converter_between, define, Context, Converter, ToProj};
pub use crs::Proj;
pub use error::ProjError;
pub use point::{Coordinate, Point};
