//! Name → projection lookup.

use std::collections::HashMap;

use tracing::trace;

use crate::proj::{builtin_projections, longlat, mercator, ProjectionDef};

/// Projection registry. Names are matched case-insensitively; a name that
/// misses is retried with runs of `-`, `(`, `)` and whitespace collapsed to
/// `_`, so `"Lambert Conic Conformal (2SP)"` finds `lambert_conic_conformal_2sp`.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    defs: Vec<ProjectionDef>,
    names: HashMap<String, usize>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding only `merc` and `longlat`.
    pub fn start() -> Self {
        let mut registry = Self::new();
        registry.add(mercator::DEF);
        registry.add(longlat::DEF);
        registry
    }

    /// A registry holding every built-in projection.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for def in builtin_projections() {
            registry.add(def);
        }
        registry
    }

    /// Register `def` under all of its names and return its index. A later
    /// registration of the same name shadows the earlier one.
    pub fn add(&mut self, def: ProjectionDef) -> usize {
        let index = self.defs.len();
        for name in def.names {
            self.names.insert(name.to_lowercase(), index);
        }
        trace!(projection = def.short_name(), index, "projection registered");
        self.defs.push(def);
        index
    }

    pub fn get(&self, name: &str) -> Option<&ProjectionDef> {
        if name.is_empty() {
            return None;
        }
        let lower = name.to_lowercase();
        self.names
            .get(&lower)
            .or_else(|| self.names.get(&normalize_name(&lower)))
            .and_then(|&index| self.defs.get(index))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}

fn normalize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_run = false;
    for c in name.chars() {
        if c == '-' || c == '(' || c == ')' || c.is_whitespace() {
            in_run = true;
        } else {
            if in_run && !out.is_empty() {
                out.push('_');
            }
            in_run = false;
            out.push(c);
        }
    }
    out
}
