//! Definition parsing and the named-definition table.
//!
//! A CRS code reaches the rest of the crate as a [`ProjectionParams`] record,
//! produced from one of four shapes: a registered name, WKT, a PROJ string or
//! a PROJJSON object.

pub(crate) mod conversion;
pub mod proj_string;
pub mod projjson;
pub mod wkt;

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use serde_json::Value;
use tracing::debug;

use crate::error::ProjError;
use crate::params::ProjectionParams;

pub const WGS84: &str = "+title=WGS 84 (long/lat) +proj=longlat +ellps=WGS84 +datum=WGS84 +units=degrees";
pub const NAD83: &str =
    "+title=NAD83 (long/lat) +proj=longlat +a=6378137.0 +b=6356752.31414036 +ellps=GRS80 +datum=NAD83 +units=degrees";
pub const EPSG_3857: &str = "+title=WGS 84 / Pseudo-Mercator +proj=merc +a=6378137 +b=6378137 +lat_ts=0.0 +lon_0=0.0 +x_0=0.0 +y_0=0 +k=1.0 +units=m +nadgrids=@null +no_defs";

/// Names of the definitions every [`Definitions::new`] table starts with.
const BUILTINS: &[(&str, &str)] = &[
    ("EPSG:4326", WGS84),
    ("EPSG:4269", NAD83),
    ("EPSG:3857", EPSG_3857),
];
const BUILTIN_ALIASES: &[(&str, &str)] = &[
    ("WGS84", "EPSG:4326"),
    ("EPSG:3785", "EPSG:3857"),
    ("GOOGLE", "EPSG:3857"),
    ("EPSG:900913", "EPSG:3857"),
    ("EPSG:102113", "EPSG:3857"),
];

/// Parse a definition string that is not a registered name.
pub fn parse_str(code: &str) -> Result<ProjectionParams, ProjError> {
    if wkt::is_wkt(code) {
        wkt::parse(code)
    } else if code.starts_with('+') {
        proj_string::parse(code)
    } else {
        Err(ProjError::Definition(format!("unrecognised definition {code:?}")))
    }
}

/// Name → parameter table, shared by every Proj built from one context.
#[derive(Debug, Default)]
pub struct Definitions {
    table: RwLock<HashMap<String, ProjectionParams>>,
}

impl Definitions {
    /// A table holding the built-in WGS84, NAD83 and Web Mercator codes.
    pub fn new() -> Result<Self, ProjError> {
        let defs = Self::empty();
        for (name, def) in BUILTINS {
            defs.define(name, def)?;
        }
        for (alias, name) in BUILTIN_ALIASES {
            defs.define_alias(alias, name)?;
        }
        Ok(defs)
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Register `name` from a PROJ string or WKT.
    pub fn define(&self, name: &str, def: &str) -> Result<(), ProjError> {
        let params = if def.starts_with('+') {
            proj_string::parse(def)?
        } else {
            wkt::parse(def)?
        };
        self.insert(name, params);
        Ok(())
    }

    /// Register `name` from a PROJJSON object.
    pub fn define_json(&self, name: &str, def: &Value) -> Result<(), ProjError> {
        let params = projjson::parse(def)?;
        self.insert(name, params);
        Ok(())
    }

    /// Register `name` from an already-parsed record.
    pub fn insert(&self, name: &str, params: ProjectionParams) {
        debug!(name, proj = ?params.proj_name, "definition registered");
        self.table
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_owned(), params);
    }

    /// Make `alias` resolve to a copy of the definition stored under `existing`.
    pub fn define_alias(&self, alias: &str, existing: &str) -> Result<(), ProjError> {
        let params = self
            .get(existing)
            .ok_or_else(|| ProjError::Definition(format!("no definition named {existing:?}")))?;
        self.insert(alias, params);
        Ok(())
    }

    /// A copy of the definition registered under `name`.
    pub fn get(&self, name: &str) -> Option<ProjectionParams> {
        self.table
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.table
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    /// Resolve a code: registered name first, then WKT, then PROJ string.
    pub fn parse(&self, code: &str) -> Result<ProjectionParams, ProjError> {
        match self.get(code) {
            Some(params) => Ok(params),
            None => parse_str(code),
        }
    }

    /// Resolve a JSON value: a string goes through [`Self::parse`], an
    /// object is read as PROJJSON.
    pub fn parse_json(&self, code: &Value) -> Result<ProjectionParams, ProjError> {
        match code {
            Value::String(s) => self.parse(s),
            v if projjson::is_projjson(v) => projjson::parse(v),
            other => Err(ProjError::Definition(format!("unrecognised definition {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builtins() {
        let defs = Definitions::new().unwrap();
        for name in ["WGS84", "EPSG:4326", "EPSG:4269", "EPSG:3857", "GOOGLE", "EPSG:900913"] {
            assert!(defs.contains(name), "{name}");
        }
        let merc = defs.get("EPSG:3785").unwrap();
        assert_eq!(merc.proj_name.as_deref(), Some("merc"));
        assert_eq!(merc.datum_code.as_deref(), Some("none"));
        assert_eq!(defs.get("WGS84").unwrap().datum_code.as_deref(), Some("WGS84"));
    }

    #[test]
    fn test_lookup_is_case_sensitive_copy() {
        let defs = Definitions::new().unwrap();
        assert!(defs.get("epsg:4326").is_none());
        let mut copy = defs.get("EPSG:4326").unwrap();
        copy.proj_name = Some("merc".into());
        assert_eq!(defs.get("EPSG:4326").unwrap().proj_name.as_deref(), Some("longlat"));
    }

    #[test]
    fn test_define_dispatch() {
        let defs = Definitions::empty();
        defs.define("EPSG:32633", "+proj=utm +zone=33 +datum=WGS84 +units=m +no_defs")
            .unwrap();
        defs.define(
            "EPSG:4230",
            r#"GEOGCS["ED50",DATUM["European_Datum_1950",SPHEROID["International 1924",6378388,297]],PRIMEM["Greenwich",0],UNIT["degree",0.0174532925199433]]"#,
        )
        .unwrap();
        assert_eq!(defs.parse("EPSG:32633").unwrap().zone, Some(33));
        assert_eq!(defs.parse("EPSG:4230").unwrap().ellps.as_deref(), Some("intl"));
        assert!(defs.define_alias("X", "EPSG:0").is_err());
    }

    #[test]
    fn test_parse_shapes() {
        let defs = Definitions::new().unwrap();
        assert!(defs.parse("+proj=longlat").is_ok());
        assert!(matches!(defs.parse("not a crs"), Err(ProjError::Definition(_))));
        assert!(defs.parse_json(&json!("EPSG:3857")).is_ok());
        assert!(defs.parse_json(&json!(42)).is_err());
        let geog = json!({"type": "GeographicCRS", "name": "x"});
        assert_eq!(
            defs.parse_json(&geog).unwrap().proj_name.as_deref(),
            Some("longlat")
        );
    }
}
