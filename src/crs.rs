//! The resolved CRS object: parameters, datum and a bound projection.
//!
//! Construction walks definition → parameters → datum → plugin lookup →
//! plugin init. Each stage can fail with its own error; once built a
//! [`Proj`] never changes.

use std::fmt;

use serde_json::Value;
use tracing::debug;

use crate::datum::{Datum, DatumType};
use crate::defs::Definitions;
use crate::error::ProjError;
use crate::params::{ProjectionParams, ResolvedParams};
use crate::proj::ellipsoid::Ellipsoid;
use crate::proj::{Projection, Registry};

pub struct Proj {
    params: ResolvedParams,
    datum: Datum,
    projection: Box<dyn Projection>,
    /// Short name of the bound plugin (`longlat`, `utm`, ...)
    name: &'static str,
}

impl Proj {
    /// Resolve `code` (a registered name, WKT or PROJ string) and bind it
    /// to a projection from `registry`.
    pub fn new(code: &str, defs: &Definitions, registry: &Registry) -> Result<Self, ProjError> {
        Self::from_params(defs.parse(code)?, registry)
    }

    /// As [`Proj::new`], for a JSON string or PROJJSON object.
    pub fn from_json(code: &Value, defs: &Definitions, registry: &Registry) -> Result<Self, ProjError> {
        Self::from_params(defs.parse_json(code)?, registry)
    }

    pub fn from_params(params: ProjectionParams, registry: &Registry) -> Result<Self, ProjError> {
        Self::from_resolved(ResolvedParams::build(params)?, registry)
    }

    pub fn from_resolved(params: ResolvedParams, registry: &Registry) -> Result<Self, ProjError> {
        let def = registry
            .get(&params.proj_name)
            .ok_or_else(|| ProjError::UnknownProjection(params.proj_name.clone()))?;
        let datum = Datum::new(&params);
        let projection = (def.init)(&params)?;
        debug!(
            projection = def.short_name(),
            datum = ?datum.datum_type,
            "projection initialised"
        );
        Ok(Self {
            params,
            datum,
            projection,
            name: def.short_name(),
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn params(&self) -> &ResolvedParams {
        &self.params
    }

    pub fn datum(&self) -> &Datum {
        &self.datum
    }

    pub fn projection(&self) -> &dyn Projection {
        self.projection.as_ref()
    }

    pub fn ellipsoid(&self) -> &Ellipsoid {
        &self.params.ellipsoid
    }

    pub fn title(&self) -> Option<&str> {
        self.params.title.as_deref()
    }

    pub fn axis(&self) -> &str {
        &self.params.axis
    }

    pub fn to_meter(&self) -> Option<f64> {
        self.params.to_meter
    }

    pub fn from_greenwich(&self) -> f64 {
        self.params.from_greenwich
    }

    /// Geographic CRS: coordinates are degrees and no projection is applied.
    pub fn is_longlat(&self) -> bool {
        self.name == "longlat"
    }

    /// Earth-centred Cartesian CRS: the height takes part in the transform.
    pub fn is_geocent(&self) -> bool {
        self.name == "geocent"
    }

    /// Whether the datum is tied to WGS84 through Helmert parameters or a
    /// grid, rather than being WGS84 itself.
    pub(crate) fn has_towgs84(&self) -> bool {
        matches!(
            self.datum.datum_type,
            DatumType::ThreeParam | DatumType::SevenParam | DatumType::GridShift
        )
    }

    pub(crate) fn is_wgs84_code(&self) -> bool {
        self.params
            .datum_code
            .as_deref()
            .is_some_and(|code| code.eq_ignore_ascii_case("wgs84"))
    }

    /// Project geodetic radians with the bound plugin.
    pub fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64), ProjError> {
        self.projection.forward(lon, lat)
    }

    pub fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        self.projection.inverse(x, y)
    }
}

impl fmt::Debug for Proj {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Proj")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("datum", &self.datum)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn setup() -> (Definitions, Registry) {
        (Definitions::new().unwrap(), Registry::with_builtins())
    }

    #[test]
    fn test_builtin_names() {
        let (defs, registry) = setup();
        let wgs = Proj::new("WGS84", &defs, &registry).unwrap();
        assert!(wgs.is_longlat());
        assert!(wgs.is_wgs84_code());
        assert_eq!(wgs.datum().datum_type, DatumType::Wgs84);

        let merc = Proj::new("EPSG:3857", &defs, &registry).unwrap();
        assert_eq!(merc.name(), "merc");
        assert_eq!(merc.datum().datum_type, DatumType::NoDatum);
        assert!(merc.ellipsoid().sphere);
    }

    #[test]
    fn test_proj_string() {
        let (defs, registry) = setup();
        let utm = Proj::new("+proj=utm +zone=33 +datum=WGS84 +units=m", &defs, &registry).unwrap();
        assert_eq!(utm.name(), "utm");
        assert_eq!(utm.axis(), "enu");
        assert_eq!(utm.to_meter(), Some(1.0));
        let (x, _) = utm.forward(15f64.to_radians(), 0.0).unwrap();
        assert_relative_eq!(x, 500_000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_wkt_definition() {
        let (defs, registry) = setup();
        let wkt = r#"GEOGCS["GCS_WGS_1984",DATUM["D_WGS_1984",SPHEROID["WGS_1984",6378137,298.257223563]],PRIMEM["Greenwich",0],UNIT["Degree",0.017453292519943295]]"#;
        let p = Proj::new(wkt, &defs, &registry).unwrap();
        assert!(p.is_longlat());
        assert_relative_eq!(p.ellipsoid().a, 6_378_137.0);
    }

    #[test]
    fn test_json_definition() {
        let (defs, registry) = setup();
        let p = Proj::from_json(&Value::String("EPSG:4269".into()), &defs, &registry).unwrap();
        assert!(p.is_longlat());
        assert_eq!(p.params().datum_code.as_deref(), Some("NAD83"));
    }

    #[test]
    fn test_unparseable_definition() {
        let (defs, registry) = setup();
        let err = Proj::new("EPSG:999999", &defs, &registry).unwrap_err();
        assert!(matches!(err, ProjError::Definition(_)));
    }

    #[test]
    fn test_unknown_projection() {
        let (defs, registry) = setup();
        let err = Proj::new("+proj=robin +datum=WGS84", &defs, &registry).unwrap_err();
        assert!(matches!(err, ProjError::UnknownProjection(name) if name == "robin"));
    }

    #[test]
    fn test_minimal_registry_rejects_unregistered_plugins() {
        let defs = Definitions::new().unwrap();
        let registry = Registry::start();
        assert!(Proj::new("EPSG:3857", &defs, &registry).is_ok());
        let err = Proj::new("+proj=lcc +lat_1=45 +lat_2=50", &defs, &registry).unwrap_err();
        assert!(matches!(err, ProjError::UnknownProjection(_)));
    }

    #[test]
    fn test_init_failure_surfaces() {
        let (defs, registry) = setup();
        let err = Proj::new("+proj=lcc +lat_1=30 +lat_2=-30 +ellps=GRS80", &defs, &registry).unwrap_err();
        assert!(matches!(err, ProjError::Init(_)));
    }

    #[test]
    fn test_geocent_flag() {
        let (defs, registry) = setup();
        let p = Proj::new("+proj=geocent +datum=WGS84", &defs, &registry).unwrap();
        assert!(p.is_geocent());
        assert!(!p.is_longlat());
    }

    #[test]
    fn test_towgs84_detection() {
        let (defs, registry) = setup();
        let ed50 = Proj::new("+proj=longlat +ellps=intl +towgs84=-87,-98,-121", &defs, &registry).unwrap();
        assert!(ed50.has_towgs84());
        assert!(!ed50.is_wgs84_code());
        let wgs = Proj::new("+proj=longlat +datum=WGS84", &defs, &registry).unwrap();
        assert!(!wgs.has_towgs84());
    }
}
