//! Name → filter lookup.
//!
//! The orchestrator resolves the requested effect here before it touches any
//! input, so an unknown name fails fast without decoding anything.

use super::{Filter, FilterError, FilterKind, Pipeline};
use std::collections::HashMap;

pub struct FilterRegistry {
    filters: HashMap<String, Box<dyn Filter>>,
    strict: bool,
}

impl FilterRegistry {
    /// Empty registry where re-registering a name replaces the old filter.
    pub fn new() -> Self {
        Self {
            filters: HashMap::new(),
            strict: false,
        }
    }

    /// Empty registry that rejects duplicate names.
    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Self::new()
        }
    }

    /// The five built-in pipelines with fresh grain on every run.
    pub fn builtin() -> Self {
        Self::builtin_with_grain_seed(None)
    }

    /// The built-in pipelines, with a fixed grain seed when `seed` is set.
    ///
    /// The seed is mixed with each image's key, so images still get distinct
    /// grain.
    pub fn builtin_with_grain_seed(seed: Option<u64>) -> Self {
        let mut registry = Self::new();
        for kind in FilterKind::ALL {
            let pipeline = Pipeline::for_kind(kind).with_grain_seed(seed);
            // A non-strict registry never rejects a name.
            let _ = registry.register(kind.name(), Box::new(pipeline));
        }
        registry
    }

    pub fn register(
        &mut self,
        name: impl Into<String>,
        filter: Box<dyn Filter>,
    ) -> Result<(), FilterError> {
        let name = name.into();
        if self.strict && self.filters.contains_key(&name) {
            return Err(FilterError::DuplicateName(name));
        }
        self.filters.insert(name, filter);
        Ok(())
    }

    /// Look up a filter by exact name.
    pub fn resolve(&self, name: &str) -> Result<&dyn Filter, FilterError> {
        self.filters
            .get(name)
            .map(|f| f.as_ref())
            .ok_or_else(|| FilterError::UnknownFilter(name.to_string()))
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.filters.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl Default for FilterRegistry {
    fn default() -> Self {
        Self::new()
    }
}
