//! Template expansion - substitutes markers throughout configuration trees

use tracing::trace;

use super::markers::{
    MarkerSet, AGGREGATE_ROOT_TYPE, CRATE_PREFIX, PACKAGE, PROJECTION_TYPE, RES_NAME, RES_PREFIX,
    VENDOR,
};
use crate::context::{CrateContext, ResourceType};
use crate::error::ExpandError;
use crate::naming::to_snake_case;
use crate::tree::{ConfigTree, ConfigValue};

/// Expands templates for one crate
#[derive(Debug, Clone)]
pub struct Expander<'a> {
    context: &'a CrateContext,
    crate_markers: MarkerSet,
}

impl<'a> Expander<'a> {
    /// Create an expander bound to a crate context
    pub fn new(context: &'a CrateContext) -> Self {
        let crate_markers = MarkerSet::new()
            .with(CRATE_PREFIX, context.prefix())
            .with(VENDOR, to_snake_case(context.vendor()))
            .with(PACKAGE, to_snake_case(context.package()));

        Self {
            context,
            crate_markers,
        }
    }

    pub fn context(&self) -> &'a CrateContext {
        self.context
    }

    /// Build the marker bindings for one expansion call.
    ///
    /// Without a resource only the crate markers are bound. With a resource the
    /// resource markers are added, which requires its prefix to have a registered
    /// aggregate root type.
    pub fn markers_for(&self, resource: Option<&ResourceType>) -> Result<MarkerSet, ExpandError> {
        let mut markers = self.crate_markers.clone();

        if let Some(resource) = resource {
            let root_type = self.context.root_type(resource.prefix())?;
            markers.bind(RES_PREFIX, resource.prefix());
            markers.bind(RES_NAME, to_snake_case(resource.name()));
            markers.bind(PROJECTION_TYPE, resource.type_id());
            markers.bind(AGGREGATE_ROOT_TYPE, root_type);
        }

        Ok(markers)
    }

    /// Expand a template tree, optionally in the context of a resource.
    ///
    /// Returns a new tree; the template is left untouched.
    pub fn expand(
        &self,
        template: &ConfigTree,
        resource: Option<&ResourceType>,
    ) -> Result<ConfigTree, ExpandError> {
        let markers = self.markers_for(resource)?;
        trace!(
            resource = resource.map(|r| r.prefix()),
            entries = template.len(),
            "expanding template"
        );
        Ok(substitute_tree(template, &markers))
    }
}

/// Apply one marker set to every key and string value, recursing into subtrees
pub fn substitute_tree(tree: &ConfigTree, markers: &MarkerSet) -> ConfigTree {
    tree.iter()
        .map(|(key, value)| {
            let value = match value {
                ConfigValue::Tree(sub) => ConfigValue::Tree(substitute_tree(sub, markers)),
                ConfigValue::String(s) => ConfigValue::String(markers.apply(s)),
                ConfigValue::Bool(b) => ConfigValue::Bool(*b),
            };
            (markers.apply(key), value)
        })
        .collect()
}
