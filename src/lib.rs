//! Data-access wiring - expands data-access templates for every resource of a crate
//!
//! A crate bundles resource (projection) types. Each of them needs the same set of
//! storage readers and writers, finders, units of work and query services, differing
//! only by names and type references. This library expands a catalog of templates
//! for a crate and registers the results as named parameters in a
//! [`ParameterStore`].
//!
//! # Example
//!
//! ```rust
//! use data_access_wiring::{apply, CrateContext, MemoryStore, ResourceType};
//!
//! let context = CrateContext::new("acme", "Acme", "Shop")
//!     .with_resource(ResourceType::new("Order", "order", "acme::OrderType"))
//!     .with_root_type("order", "acme::OrderRootType");
//!
//! let mut store = MemoryStore::new();
//! apply(&context, &mut store).unwrap();
//!
//! let finders = store.parameter("finders").unwrap();
//! assert!(finders.contains_key("order::projection.standard::view_store::finder"));
//! ```

pub mod context;
pub mod error;
pub mod naming;
pub mod pipeline;
pub mod store;
pub mod template;
pub mod tree;

pub use context::{CrateContext, ManifestError, ResourceType};
pub use error::ExpandError;
pub use naming::to_snake_case;
pub use pipeline::{Stage, WiringConfig};
pub use store::{MemoryStore, ParameterStore, StoreError};
pub use template::{Catalog, CatalogError, Expander, Family};
pub use tree::{ConfigTree, ConfigValue};

use thiserror::Error;
use tracing::{debug, info_span};

/// Errors that can occur while wiring a crate
#[derive(Debug, Error)]
pub enum WiringError {
    /// A stage could not expand its templates
    #[error("{stage} stage failed: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: ExpandError,
    },

    /// Error loading a template catalog
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Error loading a crate manifest
    #[error("manifest error: {0}")]
    Manifest(#[from] ManifestError),

    /// Error loading or writing a parameter store
    #[error("parameter store error: {0}")]
    Store(#[from] StoreError),
}

impl WiringError {
    /// The expansion error behind a failed stage, if any
    pub fn expand_error(&self) -> Option<&ExpandError> {
        match self {
            WiringError::Stage { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Registers the data-access configuration of crates
#[derive(Debug, Clone, Default)]
pub struct DataAccessConfiguration {
    config: WiringConfig,
}

impl DataAccessConfiguration {
    /// Create a configuration using the built-in catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a configuration with custom settings
    pub fn with_config(config: WiringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &WiringConfig {
        &self.config
    }

    /// Expand every stage for `context` and register the results in `store`.
    ///
    /// Stages run in [`Stage::ORDER`]. A failing stage registers nothing; stages
    /// before it keep their registrations.
    pub fn apply(
        &self,
        context: &CrateContext,
        store: &mut dyn ParameterStore,
    ) -> Result<(), WiringError> {
        let span = info_span!("apply", crate_prefix = context.prefix());
        let _enter = span.enter();

        let expander = Expander::new(context);
        pipeline::run(&self.config, &expander, store)
            .map_err(|(stage, source)| WiringError::Stage { stage, source })?;

        debug!(resources = context.resources().len(), "crate wired");
        Ok(())
    }
}

/// Wire a crate with the built-in catalog and default parameter names
pub fn apply(context: &CrateContext, store: &mut dyn ParameterStore) -> Result<(), WiringError> {
    DataAccessConfiguration::new().apply(context, store)
}
