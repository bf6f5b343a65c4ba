//! Expansion pipeline
//!
//! Each [`Stage`] builds one accumulator: it starts from whatever the parameter
//! store already holds under the stage's name, merges in the crate-level family
//! (if the stage has one) and then the resource-level family once per resource,
//! in crate order. The accumulator is registered only if every expansion
//! succeeded.

mod config;

use std::fmt;

use tracing::{debug, debug_span};

pub use config::WiringConfig;

use crate::error::ExpandError;
use crate::store::ParameterStore;
use crate::template::{Expander, Family};
use crate::tree::ConfigTree;

/// The registration stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stage {
    StorageReaders,
    StorageWriters,
    Finders,
    UnitOfWorks,
    QueryServices,
}

impl Stage {
    /// Stages in the order [`run`] executes them
    pub const ORDER: [Stage; 5] = [
        Stage::StorageReaders,
        Stage::StorageWriters,
        Stage::Finders,
        Stage::UnitOfWorks,
        Stage::QueryServices,
    ];

    /// Parameter name used when the configuration does not override it
    pub fn default_parameter(self) -> &'static str {
        match self {
            Stage::StorageReaders => "storage_readers",
            Stage::StorageWriters => "storage_writers",
            Stage::Finders => "finders",
            Stage::UnitOfWorks => "unit_of_works",
            Stage::QueryServices => "query_services",
        }
    }

    /// Family expanded once without a resource
    pub fn crate_family(self) -> Option<Family> {
        match self {
            Stage::StorageReaders => Some(Family::StorageReaders),
            Stage::StorageWriters => Some(Family::StorageWriters),
            _ => None,
        }
    }

    /// Family expanded once per resource
    pub fn resource_family(self) -> Family {
        match self {
            Stage::StorageReaders => Family::ResourceReaders,
            Stage::StorageWriters => Family::ResourceWriters,
            Stage::Finders => Family::ResourceFinders,
            Stage::UnitOfWorks => Family::ResourceUnitOfWorks,
            Stage::QueryServices => Family::ResourceQueryServices,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.default_parameter())
    }
}

/// Build a stage's accumulator without registering it
pub fn build_stage(
    stage: Stage,
    config: &WiringConfig,
    expander: &Expander<'_>,
    seed: Option<ConfigTree>,
) -> Result<ConfigTree, ExpandError> {
    let mut accumulator = seed.unwrap_or_default();

    if let Some(family) = stage.crate_family() {
        let expanded = expander.expand(config.catalog.family(family), None)?;
        debug!(family = %family, entries = expanded.len(), "expanded crate templates");
        merge_into(&mut accumulator, expanded);
    }

    let family = stage.resource_family();
    for resource in expander.context().resources() {
        let expanded = expander.expand(config.catalog.family(family), Some(resource))?;
        debug!(
            family = %family,
            resource = resource.prefix(),
            entries = expanded.len(),
            "expanded resource templates"
        );
        merge_into(&mut accumulator, expanded);
    }

    Ok(accumulator)
}

/// Run one stage against a parameter store.
///
/// On error the store is left as it was.
pub fn run_stage(
    stage: Stage,
    config: &WiringConfig,
    expander: &Expander<'_>,
    store: &mut dyn ParameterStore,
) -> Result<(), ExpandError> {
    let name = config.parameter_name(stage);
    let span = debug_span!("stage", stage = %stage, parameter = name);
    let _enter = span.enter();

    let accumulator = build_stage(stage, config, expander, store.get(name))?;
    debug!(entries = accumulator.len(), "registering parameter");
    store.set(name, accumulator);
    Ok(())
}

/// Run every stage in [`Stage::ORDER`], stopping at the first failure.
///
/// Stages that completed before the failure stay registered.
pub fn run(
    config: &WiringConfig,
    expander: &Expander<'_>,
    store: &mut dyn ParameterStore,
) -> Result<(), (Stage, ExpandError)> {
    for stage in Stage::ORDER {
        run_stage(stage, config, expander, store).map_err(|e| (stage, e))?;
    }
    Ok(())
}

fn merge_into(accumulator: &mut ConfigTree, expanded: ConfigTree) {
    for key in accumulator.merge(expanded) {
        debug!(key = %key, "replaced existing entry");
    }
}
