//! PROJ string parser (`+proj=utm +zone=33 +datum=WGS84 ...`).

use tracing::debug;

use crate::catalog;
use crate::constants::D2R;
use crate::error::ProjError;
use crate::params::ProjectionParams;

/// Parse a `+key=value` definition into a parameter record.
///
/// Angles are converted from degrees to radians. Flags without a value
/// (`+south`, `+r_a`, `+approx`) are set to true. Unknown keys are ignored.
pub fn parse(def: &str) -> Result<ProjectionParams, ProjError> {
    let mut p = ProjectionParams::default();
    let mut explicit_to_meter = None;

    for token in def.split('+').map(str::trim).filter(|t| !t.is_empty()) {
        let (key, value) = match token.split_once('=') {
            Some((k, v)) => (k.trim().to_ascii_lowercase(), Some(v.trim())),
            None => (token.to_ascii_lowercase(), None),
        };
        let text = || {
            value
                .map(str::to_owned)
                .ok_or_else(|| ProjError::Definition(format!("+{key} needs a value")))
        };
        let num = || value.map_or_else(|| Err(missing(&key)), |v| number(&key, v));
        let deg = || num().map(|v| v * D2R);

        match key.as_str() {
            "title" => p.title = Some(text()?),
            "proj" => p.proj_name = Some(text()?),
            "datum" => p.datum_code = Some(text()?),
            "ellps" => p.ellps = Some(text()?),
            "a" => p.a = Some(num()?),
            "b" => p.b = Some(num()?),
            "rf" => p.rf = Some(num()?),
            "r_a" => p.r_a = true,
            "lat_0" => p.lat0 = Some(deg()?),
            "lat_1" => p.lat1 = Some(deg()?),
            "lat_2" => p.lat2 = Some(deg()?),
            "lat_ts" => p.lat_ts = Some(deg()?),
            "lon_0" => p.long0 = Some(deg()?),
            "lon_1" => p.long1 = Some(deg()?),
            "lon_2" => p.long2 = Some(deg()?),
            "lonc" => p.longc = Some(deg()?),
            "alpha" => p.alpha = Some(deg()?),
            "gamma" => p.rectified_grid_angle = Some(deg()?),
            "x_0" => p.x0 = Some(num()?),
            "y_0" => p.y0 = Some(num()?),
            "k" | "k_0" => p.k0 = Some(num()?),
            "zone" => p.zone = Some(num()? as i32),
            "south" => p.utm_south = true,
            "towgs84" => {
                let values = text()?
                    .split(',')
                    .map(|v| number(&key, v.trim()))
                    .collect::<Result<Vec<_>, _>>()?;
                p.datum_params = Some(values);
            }
            "to_meter" => explicit_to_meter = Some(num()?),
            "units" => {
                let units = text()?;
                p.to_meter = catalog::units::to_meter(&units);
                p.units = Some(units);
            }
            "from_greenwich" => p.from_greenwich = Some(deg()?),
            "pm" => {
                let pm = text()?;
                let degrees = match catalog::prime_meridian::lookup(&pm) {
                    Some(d) => d,
                    None => number(&key, &pm)?,
                };
                p.from_greenwich = Some(degrees * D2R);
            }
            "nadgrids" => {
                let grids = text()?;
                if grids == "@null" {
                    p.datum_code = Some("none".into());
                } else {
                    p.nadgrids = Some(grids);
                }
            }
            "axis" => {
                let axis = text()?;
                validate_axis(&axis)?;
                p.axis = Some(axis);
            }
            "approx" => p.approx = true,
            "no_uoff" | "no_off" => p.no_off = true,
            "no_rot" => p.no_rot = true,
            "no_defs" | "wktext" | "type" => {}
            other => debug!(key = other, "ignoring unsupported PROJ string parameter"),
        }
    }

    if explicit_to_meter.is_some() {
        p.to_meter = explicit_to_meter;
    }
    Ok(p)
}

fn missing(key: &str) -> ProjError {
    ProjError::Definition(format!("+{key} needs a value"))
}

fn number(key: &str, value: &str) -> Result<f64, ProjError> {
    value
        .parse::<f64>()
        .map_err(|_| ProjError::Definition(format!("+{key}={value} is not a number")))
}

/// Check an axis string: three letters from `ewnsud`, one from each of the
/// pairs e/w, n/s and u/d.
pub fn validate_axis(axis: &str) -> Result<(), ProjError> {
    let bad = || ProjError::InvalidAxis(axis.to_owned());
    if axis.chars().count() != 3 {
        return Err(bad());
    }
    let mut seen = [false; 3];
    for c in axis.chars() {
        let pair = match c {
            'e' | 'w' => 0,
            'n' | 's' => 1,
            'u' | 'd' => 2,
            _ => return Err(bad()),
        };
        if seen[pair] {
            return Err(bad());
        }
        seen[pair] = true;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_parse_utm() {
        let p = parse("+proj=utm +zone=33 +south +datum=WGS84 +units=m +no_defs").unwrap();
        assert_eq!(p.proj_name.as_deref(), Some("utm"));
        assert_eq!(p.zone, Some(33));
        assert!(p.utm_south);
        assert_eq!(p.datum_code.as_deref(), Some("WGS84"));
        assert_eq!(p.to_meter, Some(1.0));
    }

    #[test]
    fn test_angles_in_radians() {
        let p = parse("+proj=lcc +lat_1=49 +lat_2=44 +lat_0=46.5 +lon_0=3 +x_0=700000 +k_0=0.9996")
            .unwrap();
        assert_relative_eq!(p.lat1.unwrap(), 49.0 * D2R);
        assert_relative_eq!(p.lat0.unwrap(), 46.5 * D2R);
        assert_relative_eq!(p.long0.unwrap(), 3.0 * D2R);
        assert_relative_eq!(p.x0.unwrap(), 700_000.0);
        assert_relative_eq!(p.k0.unwrap(), 0.9996);
    }

    #[test]
    fn test_towgs84_and_nadgrids() {
        let p = parse("+proj=longlat +ellps=bessel +towgs84=674.4,15.1,405.3 +nadgrids=@conus,null")
            .unwrap();
        assert_eq!(p.datum_params, Some(vec![674.4, 15.1, 405.3]));
        assert_eq!(p.nadgrids.as_deref(), Some("@conus,null"));
    }

    #[test]
    fn test_null_grid_clears_datum() {
        let p = parse("+proj=merc +a=6378137 +b=6378137 +nadgrids=@null +no_defs").unwrap();
        assert_eq!(p.datum_code.as_deref(), Some("none"));
        assert!(p.nadgrids.is_none());
    }

    #[test]
    fn test_prime_meridian_named_and_numeric() {
        let p = parse("+proj=longlat +pm=paris").unwrap();
        assert_relative_eq!(p.from_greenwich.unwrap(), 2.337_229_166_667 * D2R);
        let p = parse("+proj=longlat +pm=-9.5").unwrap();
        assert_relative_eq!(p.from_greenwich.unwrap(), -9.5 * D2R);
    }

    #[test]
    fn test_units_and_explicit_to_meter() {
        let p = parse("+proj=tmerc +units=us-ft").unwrap();
        assert_relative_eq!(p.to_meter.unwrap(), 1200.0 / 3937.0);
        let p = parse("+proj=tmerc +to_meter=0.5 +units=ft").unwrap();
        assert_relative_eq!(p.to_meter.unwrap(), 0.5);
    }

    #[test]
    fn test_axis_validation() {
        assert!(parse("+proj=longlat +axis=neu").is_ok());
        assert!(matches!(
            parse("+proj=longlat +axis=nnu"),
            Err(ProjError::InvalidAxis(_))
        ));
        assert!(matches!(
            parse("+proj=longlat +axis=enx"),
            Err(ProjError::InvalidAxis(_))
        ));
        assert!(validate_axis("wsd").is_ok());
        assert!(validate_axis("en").is_err());
    }

    #[test]
    fn test_bad_number() {
        assert!(matches!(
            parse("+proj=merc +lat_ts=north"),
            Err(ProjError::Definition(_))
        ));
    }

    #[test]
    fn test_flags() {
        let p = parse("+proj=omerc +R_A +approx +no_uoff +no_rot").unwrap();
        assert!(p.r_a && p.approx && p.no_off && p.no_rot);
    }
}
