//! Numeric constants shared by the parser, datum engine and projections.

use std::f64::consts::PI;

pub const D2R: f64 = 0.017_453_292_519_943_295_77;
pub const R2D: f64 = 57.295_779_513_082_320_88;
pub const HALF_PI: f64 = PI / 2.0;
pub const FORTPI: f64 = PI / 4.0;
pub const TWO_PI: f64 = PI * 2.0;
/// Slightly larger than π so that ±180° survive longitude wrapping untouched.
pub const SPI: f64 = 3.141_592_653_59;

pub const EPSLN: f64 = 1.0e-10;

/// Arcseconds to radians.
pub const SEC_TO_RAD: f64 = 4.848_136_811_095_359_935_899_141_023_57e-6;

// Authalic radius series.
pub const SIXTH: f64 = 0.166_666_666_666_666_666_7;
pub const RA4: f64 = 0.047_222_222_222_222_222_22;
pub const RA6: f64 = 0.022_156_084_656_084_656_08;

// WGS84 numbers used as the grid-shift pivot ellipsoid.
pub const SRS_WGS84_SEMIMAJOR: f64 = 6_378_137.0;
pub const SRS_WGS84_SEMIMINOR: f64 = 6_356_752.314;
pub const SRS_WGS84_ESQUARED: f64 = 0.006_694_379_990_141_316_5;
