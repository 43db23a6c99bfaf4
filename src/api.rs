//! Public entry points.
//!
//! A [`Context`] owns the projection registry, the named-definition table
//! and the grid store. The free functions at the crate root use the
//! process-wide [`Context::global`].

use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use serde_json::Value;
use tracing::debug;

use crate::crs::Proj;
use crate::defs::Definitions;
use crate::error::ProjError;
use crate::grid::GridStore;
use crate::point::Coordinate;
use crate::proj::{ProjectionDef, Registry};
use crate::transform;

static GLOBAL: OnceLock<Context> = OnceLock::new();

#[derive(Debug)]
pub struct Context {
    registry: RwLock<Registry>,
    defs: Definitions,
    grids: GridStore,
    wgs84: Arc<Proj>,
}

impl Context {
    /// A context with every built-in projection and definition.
    pub fn new() -> Result<Self, ProjError> {
        Self::with_registry(Registry::with_builtins())
    }

    /// A context whose registry holds only `merc` and `longlat`. Other
    /// projections can be added with [`Context::add_projection`].
    pub fn minimal() -> Result<Self, ProjError> {
        Self::with_registry(Registry::start())
    }

    pub fn with_registry(registry: Registry) -> Result<Self, ProjError> {
        let defs = Definitions::new()?;
        let wgs84 = Arc::new(Proj::new("WGS84", &defs, &registry)?);
        debug!(projections = registry.len(), "context created");
        Ok(Self {
            registry: RwLock::new(registry),
            defs,
            grids: GridStore::new(),
            wgs84,
        })
    }

    /// The process-wide context, created with [`Context::new`] on first use.
    pub fn global() -> Result<&'static Context, ProjError> {
        if let Some(ctx) = GLOBAL.get() {
            return Ok(ctx);
        }
        let ctx = Context::new()?;
        Ok(GLOBAL.get_or_init(|| ctx))
    }

    /// Register a projection plugin. Later registrations shadow earlier
    /// ones with the same name.
    pub fn add_projection(&self, def: ProjectionDef) -> usize {
        self.registry
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .add(def)
    }

    pub fn has_projection(&self, name: &str) -> bool {
        self.registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(name)
    }

    pub fn defs(&self) -> &Definitions {
        &self.defs
    }

    /// Register `name` from a PROJ string or WKT.
    pub fn define(&self, name: &str, def: &str) -> Result<(), ProjError> {
        self.defs.define(name, def)
    }

    pub fn define_json(&self, name: &str, def: &Value) -> Result<(), ProjError> {
        self.defs.define_json(name, def)
    }

    pub fn define_alias(&self, alias: &str, existing: &str) -> Result<(), ProjError> {
        self.defs.define_alias(alias, existing)
    }

    pub fn grids(&self) -> &GridStore {
        &self.grids
    }

    /// The WGS84 geographic CRS used when no source is given.
    pub fn wgs84(&self) -> &Arc<Proj> {
        &self.wgs84
    }

    /// Build a CRS from a code string.
    pub fn proj(&self, code: &str) -> Result<Proj, ProjError> {
        let registry = self.registry.read().unwrap_or_else(PoisonError::into_inner);
        Proj::new(code, &self.defs, &registry)
    }

    /// Build a CRS from a JSON string or PROJJSON object.
    pub fn proj_json(&self, code: &Value) -> Result<Proj, ProjError> {
        let registry = self.registry.read().unwrap_or_else(PoisonError::into_inner);
        Proj::from_json(code, &self.defs, &registry)
    }

    /// Converter from WGS84 to `to`. The converter also remembers `to` on
    /// its own, see [`Converter::proj`].
    pub fn converter(&self, to: impl ToProj) -> Result<Converter, ProjError> {
        let to = to.to_proj(self)?;
        Ok(self.make_converter(Arc::clone(&self.wgs84), to, true))
    }

    /// Converter between two CRSs.
    pub fn converter_between(&self, from: impl ToProj, to: impl ToProj) -> Result<Converter, ProjError> {
        let from = from.to_proj(self)?;
        let to = to.to_proj(self)?;
        Ok(self.make_converter(from, to, false))
    }

    /// Transform `coord` from WGS84 to `to`.
    pub fn convert<C: Coordinate>(&self, to: impl ToProj, coord: &C) -> Result<C, ProjError> {
        self.converter(to)?.forward(coord)
    }

    /// Transform `coord` from `from` to `to`.
    pub fn convert_between<C: Coordinate>(
        &self,
        from: impl ToProj,
        to: impl ToProj,
        coord: &C,
    ) -> Result<C, ProjError> {
        self.converter_between(from, to)?.forward(coord)
    }

    fn make_converter(&self, from: Arc<Proj>, to: Arc<Proj>, single: bool) -> Converter {
        Converter {
            from,
            to,
            single,
            grids: self.grids.clone(),
            wgs84: Arc::clone(&self.wgs84),
        }
    }
}

/// Anything that names or is a CRS.
pub trait ToProj {
    fn to_proj(&self, ctx: &Context) -> Result<Arc<Proj>, ProjError>;
}

impl ToProj for str {
    fn to_proj(&self, ctx: &Context) -> Result<Arc<Proj>, ProjError> {
        ctx.proj(self).map(Arc::new)
    }
}

impl ToProj for String {
    fn to_proj(&self, ctx: &Context) -> Result<Arc<Proj>, ProjError> {
        self.as_str().to_proj(ctx)
    }
}

impl ToProj for Value {
    fn to_proj(&self, ctx: &Context) -> Result<Arc<Proj>, ProjError> {
        ctx.proj_json(self).map(Arc::new)
    }
}

impl ToProj for Arc<Proj> {
    fn to_proj(&self, _ctx: &Context) -> Result<Arc<Proj>, ProjError> {
        Ok(Arc::clone(self))
    }
}

impl ToProj for Proj {
    /// Rebuilds the CRS from its resolved parameters.
    fn to_proj(&self, ctx: &Context) -> Result<Arc<Proj>, ProjError> {
        let registry = ctx.registry.read().unwrap_or_else(PoisonError::into_inner);
        Proj::from_resolved(self.params().clone(), &registry).map(Arc::new)
    }
}

/// A single-CRS converter stands for that CRS.
impl ToProj for Converter {
    fn to_proj(&self, _ctx: &Context) -> Result<Arc<Proj>, ProjError> {
        self.proj().cloned().ok_or_else(|| {
            ProjError::Definition("converter between two CRSs does not name a single one".into())
        })
    }
}

impl<T: ToProj + ?Sized> ToProj for &T {
    fn to_proj(&self, ctx: &Context) -> Result<Arc<Proj>, ProjError> {
        (**self).to_proj(ctx)
    }
}

/// A bound pair of CRSs. Cheap to clone and safe to share across threads.
#[derive(Clone, Debug)]
pub struct Converter {
    from: Arc<Proj>,
    to: Arc<Proj>,
    single: bool,
    grids: GridStore,
    wgs84: Arc<Proj>,
}

impl Converter {
    pub fn source(&self) -> &Arc<Proj> {
        &self.from
    }

    pub fn dest(&self) -> &Arc<Proj> {
        &self.to
    }

    /// The target CRS of a converter built from one CRS only.
    pub fn proj(&self) -> Option<&Arc<Proj>> {
        self.single.then_some(&self.to)
    }

    pub fn forward<C: Coordinate>(&self, coord: &C) -> Result<C, ProjError> {
        self.forward_with_axis(coord, false)
    }

    pub fn inverse<C: Coordinate>(&self, coord: &C) -> Result<C, ProjError> {
        self.inverse_with_axis(coord, false)
    }

    /// As [`Converter::forward`], honouring both CRSs' axis order when
    /// `enforce_axis` is set.
    pub fn forward_with_axis<C: Coordinate>(&self, coord: &C, enforce_axis: bool) -> Result<C, ProjError> {
        self.run(&self.from, &self.to, coord, enforce_axis)
    }

    pub fn inverse_with_axis<C: Coordinate>(&self, coord: &C, enforce_axis: bool) -> Result<C, ProjError> {
        self.run(&self.to, &self.from, coord, enforce_axis)
    }

    /// Forward-transform every coordinate, failing on the first error.
    pub fn forward_all<C: Coordinate>(&self, coords: &[C]) -> Result<Vec<C>, ProjError> {
        coords.iter().map(|c| self.forward(c)).collect()
    }

    pub fn inverse_all<C: Coordinate>(&self, coords: &[C]) -> Result<Vec<C>, ProjError> {
        coords.iter().map(|c| self.inverse(c)).collect()
    }

    fn run<C: Coordinate>(&self, from: &Proj, to: &Proj, coord: &C, enforce_axis: bool) -> Result<C, ProjError> {
        let point = coord.to_point()?;
        let out = transform::transform(from, to, point, enforce_axis, &self.grids, &self.wgs84)?;
        Ok(coord.with_point(out, from.is_geocent() || to.is_geocent()))
    }
}

/// Converter from WGS84 to `to`, using the global context.
pub fn converter(to: impl ToProj) -> Result<Converter, ProjError> {
    Context::global()?.converter(to)
}

/// Converter between two CRSs, using the global context.
pub fn converter_between(from: impl ToProj, to: impl ToProj) -> Result<Converter, ProjError> {
    Context::global()?.converter_between(from, to)
}

/// Transform `coord` from WGS84 to `to`, using the global context.
pub fn convert<C: Coordinate>(to: impl ToProj, coord: &C) -> Result<C, ProjError> {
    Context::global()?.convert(to, coord)
}

/// Transform `coord` between two CRSs, using the global context.
pub fn convert_between<C: Coordinate>(from: impl ToProj, to: impl ToProj, coord: &C) -> Result<C, ProjError> {
    Context::global()?.convert_between(from, to, coord)
}

/// Register a named definition in the global context.
pub fn define(name: &str, def: &str) -> Result<(), ProjError> {
    Context::global()?.define(name, def)
}
