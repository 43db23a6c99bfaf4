//! Prime meridians, in degrees east of Greenwich.

use super::find;

pub const PRIME_MERIDIANS: &[(&str, f64)] = &[
    ("greenwich", 0.0),
    ("lisbon", -9.131906111111),
    ("paris", 2.337229166667),
    ("bogota", -74.080916666667),
    ("madrid", -3.687938888889),
    ("rome", 12.452333333333),
    ("bern", 7.439583333333),
    ("jakarta", 106.807719444444),
    ("ferro", -17.666666666667),
    ("brussels", 4.367975),
    ("stockholm", 18.058277777778),
    ("athens", 23.7163375),
    ("oslo", 10.722916666667),
];

pub fn lookup(name: &str) -> Option<f64> {
    find(PRIME_MERIDIANS, name, |&(n, _)| [n, n]).map(|(_, deg)| *deg)
}
