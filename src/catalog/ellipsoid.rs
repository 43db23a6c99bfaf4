//! Reference ellipsoid catalog.
//!
//! Each entry carries the semi-major axis plus either the semi-minor axis or
//! the inverse flattening, exactly as the defining authority publishes it.

use super::find;

/// A named ellipsoid as published; `b` or `rf` is zero when not given.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EllipsoidDef {
    pub code: &'static str,
    pub a: f64,
    pub b: f64,
    pub rf: f64,
    pub name: &'static str,
}

const fn entry(code: &'static str, a: f64, b: f64, rf: f64, name: &'static str) -> EllipsoidDef {
    EllipsoidDef { code, a, b, rf, name }
}

pub const ELLIPSOIDS: &[EllipsoidDef] = &[
    entry("MERIT", 6378137.0, 0.0, 298.257, "MERIT 1983"),
    entry("SGS85", 6378136.0, 0.0, 298.257, "Soviet Geodetic System 85"),
    entry("GRS80", 6378137.0, 0.0, 298.257222101, "GRS 1980(IUGG, 1980)"),
    entry("IAU76", 6378140.0, 0.0, 298.257, "IAU 1976"),
    entry("airy", 6377563.396, 6356256.91, 0.0, "Airy 1830"),
    entry("APL4", 6378137.0, 0.0, 298.25, "Appl. Physics. 1965"),
    entry("NWL9D", 6378145.0, 0.0, 298.25, "Naval Weapons Lab., 1965"),
    entry("mod_airy", 6377340.189, 6356034.446, 0.0, "Modified Airy"),
    entry("andrae", 6377104.43, 0.0, 300.0, "Andrae 1876 (Den., Iclnd.)"),
    entry("aust_SA", 6378160.0, 0.0, 298.25, "Australian Natl & S. Amer. 1969"),
    entry("GRS67", 6378160.0, 0.0, 298.247167427, "GRS 67(IUGG 1967)"),
    entry("bessel", 6377397.155, 0.0, 299.1528128, "Bessel 1841"),
    entry("bess_nam", 6377483.865, 0.0, 299.1528128, "Bessel 1841 (Namibia)"),
    entry("clrk66", 6378206.4, 6356583.8, 0.0, "Clarke 1866"),
    entry("clrk80", 6378249.145, 0.0, 293.4663, "Clarke 1880 mod."),
    entry("clrk58", 6378293.645208759, 0.0, 294.2606763692654, "Clarke 1858"),
    entry("CPM", 6375738.7, 0.0, 334.29, "Comm. des Poids et Mesures 1799"),
    entry("delmbr", 6376428.0, 0.0, 311.5, "Delambre 1810 (Belgium)"),
    entry("engelis", 6378136.05, 0.0, 298.2566, "Engelis 1985"),
    entry("evrst30", 6377276.345, 0.0, 300.8017, "Everest 1830"),
    entry("evrst48", 6377304.063, 0.0, 300.8017, "Everest 1948"),
    entry("evrst56", 6377301.243, 0.0, 300.8017, "Everest 1956"),
    entry("evrst69", 6377295.664, 0.0, 300.8017, "Everest 1969"),
    entry("evrstSS", 6377298.556, 0.0, 300.8017, "Everest (Sabah & Sarawak)"),
    entry("fschr60", 6378166.0, 0.0, 298.3, "Fischer (Mercury Datum) 1960"),
    entry("fschr60m", 6378155.0, 0.0, 298.3, "Fischer 1960"),
    entry("fschr68", 6378150.0, 0.0, 298.3, "Fischer 1968"),
    entry("helmert", 6378200.0, 0.0, 298.3, "Helmert 1906"),
    entry("hough", 6378270.0, 0.0, 297.0, "Hough"),
    entry("intl", 6378388.0, 0.0, 297.0, "International 1909 (Hayford)"),
    entry("kaula", 6378163.0, 0.0, 298.24, "Kaula 1961"),
    entry("lerch", 6378139.0, 0.0, 298.257, "Lerch 1979"),
    entry("mprts", 6397300.0, 0.0, 191.0, "Maupertius 1738"),
    entry("new_intl", 6378157.5, 6356772.2, 0.0, "New International 1967"),
    entry("plessis", 6376523.0, 6355863.0, 0.0, "Plessis 1817 (France)"),
    entry("krass", 6378245.0, 0.0, 298.3, "Krassovsky, 1942"),
    entry("SEasia", 6378155.0, 6356773.3205, 0.0, "Southeast Asia"),
    entry("walbeck", 6376896.0, 6355834.8467, 0.0, "Walbeck"),
    entry("WGS60", 6378165.0, 0.0, 298.3, "WGS 60"),
    entry("WGS66", 6378145.0, 0.0, 298.25, "WGS 66"),
    entry("WGS7", 6378135.0, 0.0, 298.26, "WGS 72"),
    entry("WGS84", 6378137.0, 0.0, 298.257223563, "WGS 84"),
    entry("sphere", 6370997.0, 6370997.0, 0.0, "Normal Sphere (r=6370997)"),
];

/// Look up an ellipsoid by code (`"GRS80"`) or by its long name (`"GRS 1980(IUGG, 1980)"`).
pub fn lookup(key: &str) -> Option<&'static EllipsoidDef> {
    find(ELLIPSOIDS, key, |e| [e.code, e.name])
}

pub fn wgs84() -> &'static EllipsoidDef {
    &ELLIPSOIDS[ELLIPSOIDS.len() - 2]
}
