//! Datum catalog: shift parameters to WGS84 (or a grid list) plus the ellipsoid.
//!
//! Rotations are in arcseconds and scale in ppm, in the position-vector
//! convention; the datum engine normalises them when a `Datum` is built.

use super::find;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DatumDef {
    pub code: &'static str,
    pub towgs84: &'static [f64],
    pub nadgrids: Option<&'static str>,
    pub ellipse: &'static str,
    pub datum_name: &'static str,
}

const fn helmert(
    code: &'static str,
    towgs84: &'static [f64],
    ellipse: &'static str,
    datum_name: &'static str,
) -> DatumDef {
    DatumDef {
        code,
        towgs84,
        nadgrids: None,
        ellipse,
        datum_name,
    }
}

pub const DATUMS: &[DatumDef] = &[
    helmert("wgs84", &[0.0, 0.0, 0.0], "WGS84", "WGS84"),
    helmert("ch1903", &[674.374, 15.056, 405.346], "bessel", "swiss"),
    helmert(
        "ggrs87",
        &[-199.87, 74.79, 246.62],
        "GRS80",
        "Greek_Geodetic_Reference_System_1987",
    ),
    helmert("nad83", &[0.0, 0.0, 0.0], "GRS80", "North_American_Datum_1983"),
    DatumDef {
        code: "nad27",
        towgs84: &[],
        nadgrids: Some("@conus,@alaska,@ntv2_0.gsb,@ntv1_can.dat"),
        ellipse: "clrk66",
        datum_name: "North_American_Datum_1927",
    },
    helmert(
        "potsdam",
        &[598.1, 73.7, 418.2, 0.202, 0.045, -2.455, 6.7],
        "bessel",
        "Potsdam Rauenberg 1950 DHDN",
    ),
    helmert("carthage", &[-263.0, 6.0, 431.0], "clark80", "Carthage 1934 Tunisia"),
    helmert(
        "hermannskogel",
        &[577.326, 90.129, 463.919, 5.137, 1.474, 5.297, 2.4232],
        "bessel",
        "Hermannskogel",
    ),
    helmert(
        "mgi",
        &[577.326, 90.129, 463.919, 5.137, 1.474, 5.297, 2.4232],
        "bessel",
        "Militar-Geographische Institut",
    ),
    helmert(
        "osni52",
        &[482.530, -130.596, 564.557, -1.042, -0.214, -0.631, 8.15],
        "airy",
        "Irish National",
    ),
    helmert(
        "ire65",
        &[482.530, -130.596, 564.557, -1.042, -0.214, -0.631, 8.15],
        "mod_airy",
        "Ireland 1965",
    ),
    helmert("rassadiran", &[-133.63, -157.5, -158.62], "intl", "Rassadiran"),
    helmert(
        "nzgd49",
        &[59.47, -5.04, 187.44, 0.47, -0.1, 1.024, -4.5993],
        "intl",
        "New Zealand Geodetic Datum 1949",
    ),
    helmert(
        "osgb36",
        &[446.448, -125.157, 542.060, 0.1502, 0.2470, 0.8421, -20.4894],
        "airy",
        "Ordnance Survey of Great Britain 1936",
    ),
    helmert("s_jtsk", &[589.0, 76.0, 480.0], "bessel", "S-JTSK (Ferro)"),
    helmert("beduaram", &[-106.0, -87.0, 188.0], "clrk80", "Beduaram"),
    helmert("gunung_segara", &[-403.0, 684.0, 41.0], "bessel", "Gunung Segara Jakarta"),
    helmert(
        "rnb72",
        &[106.869, -52.2978, 103.724, -0.33657, 0.456955, -1.84218, 1.0],
        "intl",
        "Reseau National Belge 1972",
    ),
];

/// Look up a datum by code (`"osgb36"`) or by its long name.
pub fn lookup(key: &str) -> Option<&'static DatumDef> {
    find(DATUMS, key, |d| [d.code, d.datum_name])
}

/// EPSG Helmert method codes.
pub const POSITION_VECTOR: u32 = 9606;
pub const COORDINATE_FRAME: u32 = 9607;
pub const GEOCENTRIC_TRANSLATIONS: u32 = 9603;

/// Build a towgs84 parameter list from an EPSG Helmert transformation.
///
/// Datums store rotations in the position-vector convention, so the
/// coordinate-frame method has its rotation signs flipped. Geocentric
/// translations keep only the three shifts.
pub fn helmert_params(method_code: u32, params: [f64; 7]) -> Vec<f64> {
    let [tx, ty, tz, rx, ry, rz, ds] = params;
    match method_code {
        GEOCENTRIC_TRANSLATIONS => vec![tx, ty, tz],
        COORDINATE_FRAME => vec![tx, ty, tz, -rx, -ry, -rz, ds],
        _ => vec![tx, ty, tz, rx, ry, rz, ds],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_code_and_alias() {
        let osgb = lookup("osgb36").unwrap();
        assert_eq!(osgb.ellipse, "airy");
        assert_eq!(osgb.towgs84.len(), 7);
        assert_eq!(lookup("Ordnance Survey of Great Britain 1936").unwrap().code, "osgb36");
        assert_eq!(lookup("WGS84").unwrap().code, "wgs84");
        assert_eq!(lookup("North_American_Datum_1983").unwrap().code, "nad83");
    }

    #[test]
    fn test_grid_datum() {
        let nad27 = lookup("nad27").unwrap();
        assert!(nad27.towgs84.is_empty());
        assert_eq!(nad27.nadgrids, Some("@conus,@alaska,@ntv2_0.gsb,@ntv1_can.dat"));
    }

    #[test]
    fn test_helmert_sign_conventions() {
        let raw = [1.0, 2.0, 3.0, 0.1, 0.2, 0.3, 4.0];
        assert_eq!(helmert_params(POSITION_VECTOR, raw), raw.to_vec());
        assert_eq!(
            helmert_params(COORDINATE_FRAME, raw),
            vec![1.0, 2.0, 3.0, -0.1, -0.2, -0.3, 4.0]
        );
        assert_eq!(helmert_params(GEOCENTRIC_TRANSLATIONS, raw), vec![1.0, 2.0, 3.0]);
    }
}
