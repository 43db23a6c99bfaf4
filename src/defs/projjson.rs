//! PROJJSON (`serde_json::Value`) to parameter record.

use serde_json::Value;
use tracing::debug;

use crate::catalog;
use crate::catalog::datum::{helmert_params, COORDINATE_FRAME, GEOCENTRIC_TRANSLATIONS, POSITION_VECTOR};
use crate::constants::D2R;
use crate::defs::conversion::ConversionParams;
use crate::defs::wkt;
use crate::error::ProjError;
use crate::params::ProjectionParams;

/// True for a JSON object that looks like a PROJJSON CRS.
pub fn is_projjson(value: &Value) -> bool {
    value
        .get("type")
        .and_then(Value::as_str)
        .is_some_and(|t| t.ends_with("CRS"))
}

pub fn parse(value: &Value) -> Result<ProjectionParams, ProjError> {
    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| ProjError::Definition("PROJJSON object without a type".into()))?;
    let mut p = ProjectionParams {
        title: value.get("name").and_then(Value::as_str).map(str::to_owned),
        ..Default::default()
    };
    match kind {
        "GeographicCRS" => {
            p.proj_name = Some("longlat".into());
            p.units = Some("degrees".into());
            datum(value, &mut p);
        }
        "GeodeticCRS" => {
            let cartesian = value
                .pointer("/coordinate_system/subtype")
                .and_then(Value::as_str)
                .is_some_and(|s| s.eq_ignore_ascii_case("cartesian"));
            p.proj_name = Some(if cartesian { "geocent" } else { "longlat" }.into());
            p.units = Some(if cartesian { "meter" } else { "degrees" }.into());
            datum(value, &mut p);
        }
        "ProjectedCRS" => projected(value, &mut p)?,
        "BoundCRS" => return bound(value),
        "CompoundCRS" => {
            let horizontal = value
                .get("components")
                .and_then(Value::as_array)
                .and_then(|c| c.first())
                .ok_or_else(|| ProjError::Definition("CompoundCRS without components".into()))?;
            return parse(horizontal);
        }
        other => {
            return Err(ProjError::Definition(format!("unsupported PROJJSON type {other}")));
        }
    }
    if let Some(axis) = axis_order(value) {
        p.axis = Some(axis);
    }
    Ok(p)
}

/// Unit factor of a PROJJSON unit: a name or a `{name, conversion_factor}`.
fn unit_factor(unit: Option<&Value>, angular: bool) -> Option<f64> {
    match unit? {
        Value::String(name) => match name.as_str() {
            "degree" => Some(D2R),
            "radian" | "metre" | "unity" => Some(1.0),
            "grad" => Some(std::f64::consts::PI / 200.0),
            "arc-second" => Some(D2R / 3600.0),
            other if !angular => catalog::units::to_meter(other),
            _ => None,
        },
        Value::Object(map) => map.get("conversion_factor").and_then(Value::as_f64),
        _ => None,
    }
}

fn datum(crs: &Value, p: &mut ProjectionParams) {
    let Some(datum) = crs.get("datum").or_else(|| crs.get("datum_ensemble")) else {
        return;
    };
    if let Some(name) = datum.get("name").and_then(Value::as_str) {
        let code = wkt::datum_code(name);
        p.datum_code = Some(if code.starts_with("world_geodetic_system_1984") {
            "wgs84".into()
        } else {
            code
        });
    }
    if let Some(ellipsoid) = datum.get("ellipsoid") {
        if let Some(name) = ellipsoid.get("name").and_then(Value::as_str) {
            p.ellps = Some(name.to_owned());
        }
        let a = ellipsoid
            .get("semi_major_axis")
            .or_else(|| ellipsoid.get("radius"))
            .and_then(Value::as_f64);
        p.a = a;
        p.rf = ellipsoid.get("inverse_flattening").and_then(Value::as_f64);
        p.b = ellipsoid.get("semi_minor_axis").and_then(Value::as_f64);
        if ellipsoid.get("radius").is_some() {
            p.b = a;
        }
    }
    if let Some(pm) = datum.get("prime_meridian").or_else(|| crs.get("prime_meridian")) {
        match pm.get("longitude") {
            Some(Value::Object(lon)) => {
                let value = lon.get("value").and_then(Value::as_f64).unwrap_or(0.0);
                let factor = unit_factor(lon.get("unit"), true).unwrap_or(D2R);
                p.from_greenwich = Some(value * factor);
            }
            Some(lon) => {
                if let Some(value) = lon.as_f64() {
                    p.from_greenwich = Some(value * D2R);
                }
            }
            None => {}
        }
    }
}

fn projected(crs: &Value, p: &mut ProjectionParams) -> Result<(), ProjError> {
    if let Some(base) = crs.get("base_crs") {
        datum(base, p);
    }
    let linear = crs
        .pointer("/coordinate_system/axis/0/unit")
        .and_then(|u| unit_factor(Some(u), false));
    p.units = Some("meter".into());
    if let Some(factor) = linear {
        p.to_meter = Some(factor);
        if (factor - 1.0).abs() > f64::EPSILON {
            p.units = crs
                .pointer("/coordinate_system/axis/0/unit/name")
                .and_then(Value::as_str)
                .map(str::to_lowercase);
        }
    }

    let conversion = crs
        .get("conversion")
        .ok_or_else(|| ProjError::Definition("ProjectedCRS without a conversion".into()))?;
    let method = conversion
        .pointer("/method/name")
        .and_then(Value::as_str)
        .ok_or_else(|| ProjError::Definition("conversion without a method name".into()))?;
    p.proj_name = Some(method.to_owned());

    let mut collected = ConversionParams::default();
    for param in conversion
        .get("parameters")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
    {
        let (Some(name), Some(value)) = (
            param.get("name").and_then(Value::as_str),
            param.get("value").and_then(Value::as_f64),
        ) else {
            continue;
        };
        let factor = unit_factor(param.get("unit"), false);
        collected.set(name, value, factor, p.to_meter.unwrap_or(1.0));
    }
    collected.apply(method, p);
    Ok(())
}

/// A BoundCRS is its source CRS plus a Helmert transformation to WGS84.
fn bound(value: &Value) -> Result<ProjectionParams, ProjError> {
    let source = value
        .get("source_crs")
        .ok_or_else(|| ProjError::Definition("BoundCRS without source_crs".into()))?;
    let mut p = parse(source)?;
    let Some(transformation) = value.get("transformation") else {
        return Ok(p);
    };
    let method_code = transformation
        .pointer("/method/id/code")
        .and_then(Value::as_u64)
        .map(|c| c as u32)
        .unwrap_or_else(|| {
            let name = transformation
                .pointer("/method/name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_lowercase();
            if name.contains("coordinate frame") {
                COORDINATE_FRAME
            } else if name.contains("geocentric translations") {
                GEOCENTRIC_TRANSLATIONS
            } else {
                POSITION_VECTOR
            }
        });

    let mut raw = [0.0; 7];
    for param in transformation
        .get("parameters")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
    {
        let name = param.get("name").and_then(Value::as_str).unwrap_or_default().to_lowercase();
        let value = param.get("value").and_then(Value::as_f64).unwrap_or(0.0);
        let index = match name.as_str() {
            "x-axis translation" => 0,
            "y-axis translation" => 1,
            "z-axis translation" => 2,
            "x-axis rotation" => 3,
            "y-axis rotation" => 4,
            "z-axis rotation" => 5,
            "scale difference" => 6,
            other => {
                debug!(parameter = other, "ignoring BoundCRS transformation parameter");
                continue;
            }
        };
        raw[index] = value;
    }
    p.datum_params = Some(helmert_params(method_code, raw));
    Ok(p)
}

fn axis_order(crs: &Value) -> Option<String> {
    let axes = crs.pointer("/coordinate_system/axis")?.as_array()?;
    let mut order = String::new();
    for axis in axes {
        let letter = match axis.get("direction").and_then(Value::as_str)? {
            "east" => 'e',
            "west" => 'w',
            "north" => 'n',
            "south" => 's',
            "up" => 'u',
            "down" => 'd',
            _ => return None,
        };
        order.push(letter);
    }
    if order.len() == 2 {
        order.push('u');
    }
    (order.len() == 3).then_some(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use serde_json::json;

    fn utm33() -> Value {
        json!({
            "type": "ProjectedCRS",
            "name": "WGS 84 / UTM zone 33N",
            "base_crs": {
                "name": "WGS 84",
                "datum_ensemble": {
                    "name": "World Geodetic System 1984 ensemble",
                    "ellipsoid": {
                        "name": "WGS 84",
                        "semi_major_axis": 6378137,
                        "inverse_flattening": 298.257223563
                    }
                },
                "coordinate_system": {
                    "subtype": "ellipsoidal",
                    "axis": [
                        {"name": "Geodetic latitude", "direction": "north", "unit": "degree"},
                        {"name": "Geodetic longitude", "direction": "east", "unit": "degree"}
                    ]
                }
            },
            "conversion": {
                "name": "UTM zone 33N",
                "method": {"name": "Transverse Mercator", "id": {"authority": "EPSG", "code": 9807}},
                "parameters": [
                    {"name": "Latitude of natural origin", "value": 0, "unit": "degree"},
                    {"name": "Longitude of natural origin", "value": 15, "unit": "degree"},
                    {"name": "Scale factor at natural origin", "value": 0.9996, "unit": "unity"},
                    {"name": "False easting", "value": 500000, "unit": "metre"},
                    {"name": "False northing", "value": 0, "unit": "metre"}
                ]
            },
            "coordinate_system": {
                "subtype": "Cartesian",
                "axis": [
                    {"name": "Easting", "abbreviation": "E", "direction": "east", "unit": "metre"},
                    {"name": "Northing", "abbreviation": "N", "direction": "north", "unit": "metre"}
                ]
            },
            "id": {"authority": "EPSG", "code": 32633}
        })
    }

    #[test]
    fn test_projected() {
        let value = utm33();
        assert!(is_projjson(&value));
        let p = parse(&value).unwrap();
        assert_eq!(p.proj_name.as_deref(), Some("Transverse Mercator"));
        assert_eq!(p.datum_code.as_deref(), Some("wgs84"));
        assert_relative_eq!(p.long0.unwrap(), 15.0 * D2R);
        assert_relative_eq!(p.k0.unwrap(), 0.9996);
        assert_relative_eq!(p.x0.unwrap(), 500_000.0);
        assert_eq!(p.to_meter, Some(1.0));
        assert_eq!(p.axis.as_deref(), Some("enu"));
    }

    #[test]
    fn test_geographic_keeps_axis() {
        let value = utm33()["base_crs"].clone();
        let mut value = value;
        value["type"] = json!("GeographicCRS");
        let p = parse(&value).unwrap();
        assert_eq!(p.proj_name.as_deref(), Some("longlat"));
        assert_eq!(p.axis.as_deref(), Some("neu"));
        assert_relative_eq!(p.rf.unwrap(), 298.257_223_563);
    }

    #[test]
    fn test_bound_crs_coordinate_frame() {
        let value = json!({
            "type": "BoundCRS",
            "source_crs": {
                "type": "GeographicCRS",
                "name": "Pulkovo 1942",
                "datum": {
                    "name": "Pulkovo 1942",
                    "ellipsoid": {"name": "Krassowsky 1940", "semi_major_axis": 6378245, "inverse_flattening": 298.3}
                }
            },
            "target_crs": {"type": "GeographicCRS", "name": "WGS 84"},
            "transformation": {
                "name": "Pulkovo 1942 to WGS 84",
                "method": {"name": "Coordinate Frame rotation", "id": {"authority": "EPSG", "code": 9607}},
                "parameters": [
                    {"name": "X-axis translation", "value": 23.57, "unit": "metre"},
                    {"name": "Y-axis translation", "value": -140.95, "unit": "metre"},
                    {"name": "Z-axis translation", "value": -79.8, "unit": "metre"},
                    {"name": "X-axis rotation", "value": 0, "unit": "arc-second"},
                    {"name": "Y-axis rotation", "value": 0.35, "unit": "arc-second"},
                    {"name": "Z-axis rotation", "value": 0.79, "unit": "arc-second"},
                    {"name": "Scale difference", "value": -0.22, "unit": "parts per million"}
                ]
            }
        });
        let p = parse(&value).unwrap();
        let params = p.datum_params.unwrap();
        assert_eq!(params.len(), 7);
        assert_relative_eq!(params[0], 23.57);
        assert_relative_eq!(params[4], -0.35);
        assert_relative_eq!(params[5], -0.79);
        assert_relative_eq!(params[6], -0.22);
    }

    #[test]
    fn test_rejects_unknown_type() {
        assert!(parse(&json!({"type": "VerticalCRS"})).is_err());
        assert!(parse(&json!({"name": "x"})).is_err());
        assert!(!is_projjson(&json!({"x": 1})));
    }
}
