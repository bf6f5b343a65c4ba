//! Configuration for the expansion pipeline

use std::collections::BTreeMap;

use super::Stage;
use crate::template::Catalog;

/// Configuration options for wiring a crate
#[derive(Debug, Clone, Default)]
pub struct WiringConfig {
    /// Templates to expand
    pub catalog: Catalog,

    /// Parameter names overriding [`Stage::default_parameter`]
    pub parameter_names: BTreeMap<Stage, String>,
}

impl WiringConfig {
    /// Create a new configuration with the built-in catalog and default names
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the template catalog
    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Register a stage's accumulator under a different parameter name
    pub fn with_parameter_name(mut self, stage: Stage, name: impl Into<String>) -> Self {
        self.parameter_names.insert(stage, name.into());
        self
    }

    /// Parameter name a stage registers under
    pub fn parameter_name(&self, stage: Stage) -> &str {
        self.parameter_names
            .get(&stage)
            .map(|s| s.as_str())
            .unwrap_or_else(|| stage.default_parameter())
    }
}
