//! Points and the coordinate shapes accepted at the public boundary.
//!
//! A [`Coordinate`] is read into a [`Point`] before transforming and the
//! result is written back into a fresh value of the caller's shape. The
//! caller's value is only borrowed, so it is never mutated. Anything past
//! `x` and `y` (height, measure, extra array slots, other JSON keys) is
//! copied through untouched, except that a geocentric endpoint makes `z`
//! part of the result.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::error::ProjError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub m: Option<f64>,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            z: None,
            m: None,
        }
    }

    pub fn new_3d(x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z: Some(z),
            m: None,
        }
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

impl From<[f64; 2]> for Point {
    fn from([x, y]: [f64; 2]) -> Self {
        Self::new(x, y)
    }
}

/// A value that can go through a transform and come back in the same shape.
pub trait Coordinate: Sized {
    fn to_point(&self) -> Result<Point, ProjError>;

    /// Build the output from a transformed point. `geocent` is set when
    /// either endpoint is geocentric, in which case `z` comes from `point`.
    fn with_point(&self, point: Point, geocent: bool) -> Self;
}

fn pick_z(original: Option<f64>, point: &Point, geocent: bool) -> Option<f64> {
    if geocent {
        point.z.or(original)
    } else {
        original
    }
}

impl Coordinate for Point {
    fn to_point(&self) -> Result<Point, ProjError> {
        Ok(*self)
    }

    fn with_point(&self, point: Point, geocent: bool) -> Self {
        Point {
            x: point.x,
            y: point.y,
            z: pick_z(self.z, &point, geocent),
            m: self.m,
        }
    }
}

impl Coordinate for (f64, f64) {
    fn to_point(&self) -> Result<Point, ProjError> {
        Ok(Point::new(self.0, self.1))
    }

    fn with_point(&self, point: Point, _geocent: bool) -> Self {
        (point.x, point.y)
    }
}

impl Coordinate for (f64, f64, f64) {
    fn to_point(&self) -> Result<Point, ProjError> {
        Ok(Point::new_3d(self.0, self.1, self.2))
    }

    fn with_point(&self, point: Point, geocent: bool) -> Self {
        let z = pick_z(Some(self.2), &point, geocent).unwrap_or(self.2);
        (point.x, point.y, z)
    }
}

impl Coordinate for [f64; 2] {
    fn to_point(&self) -> Result<Point, ProjError> {
        Ok(Point::new(self[0], self[1]))
    }

    fn with_point(&self, point: Point, _geocent: bool) -> Self {
        [point.x, point.y]
    }
}

impl Coordinate for [f64; 3] {
    fn to_point(&self) -> Result<Point, ProjError> {
        Ok(Point::new_3d(self[0], self[1], self[2]))
    }

    fn with_point(&self, point: Point, geocent: bool) -> Self {
        let z = pick_z(Some(self[2]), &point, geocent).unwrap_or(self[2]);
        [point.x, point.y, z]
    }
}

impl Coordinate for [f64; 4] {
    fn to_point(&self) -> Result<Point, ProjError> {
        Ok(Point {
            x: self[0],
            y: self[1],
            z: Some(self[2]),
            m: Some(self[3]),
        })
    }

    fn with_point(&self, point: Point, geocent: bool) -> Self {
        let z = pick_z(Some(self[2]), &point, geocent).unwrap_or(self[2]);
        [point.x, point.y, z, self[3]]
    }
}

/// `[x, y, z?, m?, ...]`; slots past the fourth are carried along.
impl Coordinate for Vec<f64> {
    fn to_point(&self) -> Result<Point, ProjError> {
        match self.as_slice() {
            [x, y, rest @ ..] => Ok(Point {
                x: *x,
                y: *y,
                z: rest.first().copied(),
                m: rest.get(1).copied(),
            }),
            _ => Err(ProjError::InvalidCoordinate(format!(
                "expected at least two ordinates, got {}",
                self.len()
            ))),
        }
    }

    fn with_point(&self, point: Point, geocent: bool) -> Self {
        let mut out = self.clone();
        for (slot, v) in out.iter_mut().zip([point.x, point.y]) {
            *slot = v;
        }
        if let (true, Some(z), Some(slot)) = (geocent, point.z, out.get_mut(2)) {
            *slot = z;
        }
        out
    }
}

fn as_number(value: Option<&Value>, what: &str) -> Result<Option<f64>, ProjError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_f64()
            .map(Some)
            .ok_or_else(|| ProjError::InvalidCoordinate(format!("{what} is not a number: {v}"))),
    }
}

fn json_number(v: f64) -> Value {
    Number::from_f64(v).map_or(Value::Null, Value::Number)
}

/// A JSON array `[x, y, ...]` or object `{"x": .., "y": .., ...}`. Other
/// array slots and object keys are copied to the output unchanged.
impl Coordinate for Value {
    fn to_point(&self) -> Result<Point, ProjError> {
        match self {
            Value::Array(items) => {
                if items.len() < 2 {
                    return Err(ProjError::InvalidCoordinate(format!(
                        "expected at least two ordinates, got {}",
                        items.len()
                    )));
                }
                let require = |i: usize, what: &str| {
                    as_number(items.get(i), what)?
                        .ok_or_else(|| ProjError::InvalidCoordinate(format!("{what} is missing")))
                };
                Ok(Point {
                    x: require(0, "x")?,
                    y: require(1, "y")?,
                    z: as_number(items.get(2), "z")?,
                    m: as_number(items.get(3), "m")?,
                })
            }
            Value::Object(map) => map_to_point(map),
            other => Err(ProjError::InvalidCoordinate(format!(
                "expected an array or object, got {other}"
            ))),
        }
    }

    fn with_point(&self, point: Point, geocent: bool) -> Self {
        match self {
            Value::Array(items) => {
                let mut out = items.clone();
                for (slot, v) in out.iter_mut().zip([point.x, point.y]) {
                    *slot = json_number(v);
                }
                if let (true, Some(z), Some(slot)) = (geocent, point.z, out.get_mut(2)) {
                    *slot = json_number(z);
                }
                Value::Array(out)
            }
            Value::Object(map) => Value::Object(map_with_point(map, point, geocent)),
            other => other.clone(),
        }
    }
}

fn map_to_point(map: &Map<String, Value>) -> Result<Point, ProjError> {
    let require = |key: &str| {
        as_number(map.get(key), key)?
            .ok_or_else(|| ProjError::InvalidCoordinate(format!("{key} is missing")))
    };
    Ok(Point {
        x: require("x")?,
        y: require("y")?,
        z: as_number(map.get("z"), "z")?,
        m: as_number(map.get("m"), "m")?,
    })
}

fn map_with_point(map: &Map<String, Value>, point: Point, geocent: bool) -> Map<String, Value> {
    let mut out = map.clone();
    out.insert("x".into(), json_number(point.x));
    out.insert("y".into(), json_number(point.y));
    if geocent {
        if let Some(z) = point.z {
            out.insert("z".into(), json_number(z));
        }
    }
    out
}

impl Coordinate for Map<String, Value> {
    fn to_point(&self) -> Result<Point, ProjError> {
        map_to_point(self)
    }

    fn with_point(&self, point: Point, geocent: bool) -> Self {
        map_with_point(self, point, geocent)
    }
}

#[cfg(feature = "geo-types")]
impl Coordinate for geo_types::Coord<f64> {
    fn to_point(&self) -> Result<Point, ProjError> {
        Ok(Point::new(self.x, self.y))
    }

    fn with_point(&self, point: Point, _geocent: bool) -> Self {
        geo_types::Coord {
            x: point.x,
            y: point.y,
        }
    }
}

#[cfg(feature = "geo-types")]
impl Coordinate for geo_types::Point<f64> {
    fn to_point(&self) -> Result<Point, ProjError> {
        Ok(Point::new(self.x(), self.y()))
    }

    fn with_point(&self, point: Point, _geocent: bool) -> Self {
        geo_types::Point::new(point.x, point.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_array_extras_kept() {
        let coord = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let p = coord.to_point().unwrap();
        assert_eq!(p.z, Some(3.0));
        assert_eq!(p.m, Some(4.0));

        let out = coord.with_point(Point::new_3d(10.0, 20.0, 30.0), false);
        assert_eq!(out, vec![10.0, 20.0, 3.0, 4.0, 5.0]);
        let out = coord.with_point(Point::new_3d(10.0, 20.0, 30.0), true);
        assert_eq!(out, vec![10.0, 20.0, 30.0, 4.0, 5.0]);
    }

    #[test]
    fn test_short_array_rejected() {
        assert!(matches!(vec![1.0].to_point(), Err(ProjError::InvalidCoordinate(_))));
        assert!(json!([1.0]).to_point().is_err());
    }

    #[test]
    fn test_fixed_shapes() {
        assert_eq!([1.0, 2.0].with_point(Point::new(3.0, 4.0), true), [3.0, 4.0]);
        assert_eq!(
            [1.0, 2.0, 5.0].with_point(Point::new_3d(3.0, 4.0, 9.0), false),
            [3.0, 4.0, 5.0]
        );
        assert_eq!(
            (1.0, 2.0, 5.0).with_point(Point::new_3d(3.0, 4.0, 9.0), true),
            (3.0, 4.0, 9.0)
        );
        assert_eq!(
            [1.0, 2.0, 5.0, 7.0].with_point(Point::new_3d(3.0, 4.0, 9.0), true),
            [3.0, 4.0, 9.0, 7.0]
        );
    }

    #[test]
    fn test_point_keeps_measure() {
        let p = Point {
            x: 1.0,
            y: 2.0,
            z: Some(3.0),
            m: Some(4.0),
        };
        let out = p.with_point(Point::new_3d(5.0, 6.0, 7.0), false);
        assert_eq!(out, Point { x: 5.0, y: 6.0, z: Some(3.0), m: Some(4.0) });
    }

    #[test]
    fn test_json_object_extras() {
        let coord = json!({"x": 1.0, "y": 2.0, "z": 3.0, "name": "pt", "id": 7});
        let p = coord.to_point().unwrap();
        assert_eq!(p, Point { x: 1.0, y: 2.0, z: Some(3.0), m: None });

        let out = coord.with_point(Point::new_3d(10.0, 20.0, 99.0), false);
        assert_eq!(out, json!({"x": 10.0, "y": 20.0, "z": 3.0, "name": "pt", "id": 7}));
        let out = coord.with_point(Point::new_3d(10.0, 20.0, 99.0), true);
        assert_eq!(out["z"], json!(99.0));
        // the input is untouched
        assert_eq!(coord["x"], json!(1.0));
    }

    #[test]
    fn test_json_bad_values() {
        assert!(json!({"x": "a", "y": 1}).to_point().is_err());
        assert!(json!({"y": 1}).to_point().is_err());
        assert!(json!("1,2").to_point().is_err());
    }

    #[test]
    fn test_serde_shape() {
        let p: Point = serde_json::from_value(json!({"x": 1.5, "y": -2.0})).unwrap();
        assert_eq!(p, Point::new(1.5, -2.0));
        assert_eq!(serde_json::to_value(p).unwrap(), json!({"x": 1.5, "y": -2.0}));
    }
}
