//! Map-projection parameters named the WKT / EPSG way, shared by the WKT and
//! PROJJSON readers.

use tracing::debug;

use crate::constants::D2R;
use crate::params::ProjectionParams;

pub(crate) enum ParamKind {
    Angle,
    Length,
    Scale,
}

/// Conversion parameters collected by canonical meaning, already in radians
/// and metres. The first value seen for a slot wins.
#[derive(Default)]
pub(crate) struct ConversionParams {
    lat_center: Option<f64>,
    lat_origin: Option<f64>,
    lat1: Option<f64>,
    lat2: Option<f64>,
    lat_ts: Option<f64>,
    long0: Option<f64>,
    longc: Option<f64>,
    x0: Option<f64>,
    y0: Option<f64>,
    k0: Option<f64>,
    alpha: Option<f64>,
    gamma: Option<f64>,
    a: Option<f64>,
    b: Option<f64>,
}

impl ConversionParams {
    /// Slot and unit kind for a parameter name, `None` for names with no
    /// use downstream.
    pub(crate) fn slot(&mut self, name: &str) -> Option<(&mut Option<f64>, ParamKind)> {
        let key = name.to_lowercase().replace([' ', '-'], "_");
        let hit = match key.as_str() {
            "false_easting" | "easting_at_false_origin" | "easting_at_projection_centre" => {
                (&mut self.x0, ParamKind::Length)
            }
            "false_northing" | "northing_at_false_origin" | "northing_at_projection_centre" => {
                (&mut self.y0, ParamKind::Length)
            }
            "central_meridian" | "longitude_of_natural_origin" | "longitude_of_false_origin"
            | "longitude_of_origin" => (&mut self.long0, ParamKind::Angle),
            "latitude_of_origin" | "central_parallel" | "latitude_of_natural_origin"
            | "latitude_of_false_origin" => (&mut self.lat_origin, ParamKind::Angle),
            "latitude_of_center" | "latitude_of_projection_centre" => {
                (&mut self.lat_center, ParamKind::Angle)
            }
            "longitude_of_center" | "longitude_of_projection_centre" => {
                (&mut self.longc, ParamKind::Angle)
            }
            "standard_parallel_1" | "latitude_of_1st_standard_parallel" => {
                (&mut self.lat1, ParamKind::Angle)
            }
            "standard_parallel_2" | "latitude_of_2nd_standard_parallel" => {
                (&mut self.lat2, ParamKind::Angle)
            }
            "latitude_of_true_scale" | "standard_parallel" | "latitude_of_standard_parallel" => {
                (&mut self.lat_ts, ParamKind::Angle)
            }
            "scale_factor" | "scale_factor_at_natural_origin"
            | "scale_factor_at_projection_centre" | "scale_factor_on_initial_line" => {
                (&mut self.k0, ParamKind::Scale)
            }
            "azimuth" | "azimuth_of_initial_line" | "azimuth_at_projection_centre" => {
                (&mut self.alpha, ParamKind::Angle)
            }
            "rectified_grid_angle" | "angle_from_rectified_to_skew_grid" => {
                (&mut self.gamma, ParamKind::Angle)
            }
            "semi_major" => (&mut self.a, ParamKind::Length),
            "semi_minor" => (&mut self.b, ParamKind::Length),
            other => {
                debug!(parameter = other, "ignoring conversion parameter");
                return None;
            }
        };
        Some(hit)
    }

    /// Store `value`, converting with the parameter's own unit factor when it
    /// has one, else degrees for angles and `to_meter` for lengths.
    pub(crate) fn set(&mut self, name: &str, value: f64, own_factor: Option<f64>, to_meter: f64) {
        let Some((slot, kind)) = self.slot(name) else {
            return;
        };
        let converted = match (kind, own_factor) {
            (ParamKind::Scale, _) => value,
            (_, Some(factor)) => value * factor,
            (ParamKind::Angle, None) => value * D2R,
            (ParamKind::Length, None) => value * to_meter,
        };
        slot.get_or_insert(converted);
    }

    /// Write the collected values onto `p`, resolving the latitude-of-origin
    /// precedence and the method-specific `lat_ts` forms.
    pub(crate) fn apply(self, method: &str, p: &mut ProjectionParams) {
        p.x0 = self.x0;
        p.y0 = self.y0;
        p.k0 = self.k0;
        p.long0 = self.long0;
        p.longc = self.longc;
        p.lat0 = self.lat_center.or(self.lat_origin).or(self.lat1);
        p.lat1 = self.lat1;
        p.lat2 = self.lat2;
        p.lat_ts = self.lat_ts;
        p.alpha = self.alpha;
        p.rectified_grid_angle = self.gamma;
        if p.a.is_none() {
            p.a = self.a;
        }
        if self.b.is_some() && p.rf.map_or(true, |rf| rf == 0.0) {
            p.b = self.b;
        }

        if p.lat_ts.is_some() {
            return;
        }
        let lower = method.to_lowercase();
        let pole = |lat: f64| if lat > 0.0 { 90.0 * D2R } else { -90.0 * D2R };
        if lower.contains("mercator") && !lower.contains("transverse") && !lower.contains("oblique") {
            if self.lat1.is_some() {
                p.lat_ts = self.lat1;
                p.lat0 = self.lat_center.or(self.lat_origin);
            }
        } else if lower == "stereographic_south_pole" || lower == "polar stereographic (variant b)" {
            if let Some(lat1) = self.lat1 {
                p.lat0 = Some(pole(lat1));
                p.lat_ts = Some(lat1);
            }
        } else if lower == "polar_stereographic" {
            if let Some(lat0) = p.lat0 {
                p.lat_ts = Some(lat0);
                p.lat0 = Some(pole(lat0));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_lat0_precedence() {
        let mut c = ConversionParams::default();
        c.set("standard_parallel_1", 40.0, None, 1.0);
        c.set("latitude_of_origin", 35.0, None, 1.0);
        let mut p = ProjectionParams::default();
        c.apply("Lambert_Conformal_Conic", &mut p);
        assert_relative_eq!(p.lat0.unwrap(), 35.0 * D2R);
        assert_relative_eq!(p.lat1.unwrap(), 40.0 * D2R);

        let mut c = ConversionParams::default();
        c.set("Latitude of 1st standard parallel", 40.0, None, 1.0);
        let mut p = ProjectionParams::default();
        c.apply("lcc", &mut p);
        assert_relative_eq!(p.lat0.unwrap(), 40.0 * D2R);
    }

    #[test]
    fn test_units() {
        let mut c = ConversionParams::default();
        c.set("False easting", 1000.0, None, 0.3048);
        c.set("False northing", 1000.0, Some(1.0), 0.3048);
        c.set("Scale factor at natural origin", 0.9996, Some(1.0), 0.3048);
        c.set("Longitude of natural origin", 100.0, Some(0.015_707_963_267_948_967), 1.0);
        let mut p = ProjectionParams::default();
        c.apply("Transverse Mercator", &mut p);
        assert_relative_eq!(p.x0.unwrap(), 304.8);
        assert_relative_eq!(p.y0.unwrap(), 1000.0);
        assert_relative_eq!(p.k0.unwrap(), 0.9996);
        assert_relative_eq!(p.long0.unwrap(), 90.0 * D2R, epsilon = 1e-12);
    }

    #[test]
    fn test_polar_stereographic_variant_b() {
        let mut c = ConversionParams::default();
        c.set("standard_parallel_1", -71.0, None, 1.0);
        let mut p = ProjectionParams::default();
        c.apply("Polar Stereographic (variant B)", &mut p);
        assert_relative_eq!(p.lat0.unwrap(), -90.0 * D2R);
        assert_relative_eq!(p.lat_ts.unwrap(), -71.0 * D2R);
    }

    #[test]
    fn test_mercator_2sp() {
        let mut c = ConversionParams::default();
        c.set("standard_parallel_1", 20.0, None, 1.0);
        let mut p = ProjectionParams::default();
        c.apply("Mercator_2SP", &mut p);
        assert_relative_eq!(p.lat_ts.unwrap(), 20.0 * D2R);
        assert_eq!(p.lat0, None);
    }
}
