//! Template catalog: the static families of data-access templates
//!
//! Templates are declarative TOML. `class` fields hold symbolic identifiers that the
//! hosting registration facility resolves through its own symbol table.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use thiserror::Error;

use super::markers::RESOURCE_MARKERS;
use crate::tree::{ConfigTree, MalformedValue};

/// Errors that can occur when loading a template catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read template catalog: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse template catalog TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    /// A table that does not name a known family
    #[error("unknown template family: {name}")]
    UnknownFamily { name: String },

    /// A family or one of its values has a type templates cannot hold
    #[error("malformed template in family {family}: {source}")]
    MalformedTemplate {
        family: Family,
        #[source]
        source: MalformedValue,
    },

    #[error("Failed to write template catalog TOML: {0}")]
    SerializeError(#[from] toml::ser::Error),

    /// A crate-level family refers to a marker only bound per resource
    #[error("crate-level family {family} uses resource marker {marker}")]
    ResourceMarkerInCrateFamily { family: Family, marker: String },
}

/// Whether a family is expanded once per crate or once per resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Crate,
    Resource,
}

/// The template families known to the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Family {
    StorageWriters,
    StorageReaders,
    ResourceWriters,
    ResourceReaders,
    ResourceUnitOfWorks,
    ResourceFinders,
    ResourceQueryServices,
}

impl Family {
    pub const ALL: [Family; 7] = [
        Family::StorageWriters,
        Family::StorageReaders,
        Family::ResourceWriters,
        Family::ResourceReaders,
        Family::ResourceUnitOfWorks,
        Family::ResourceFinders,
        Family::ResourceQueryServices,
    ];

    /// Table name used in catalog TOML
    pub fn as_str(self) -> &'static str {
        match self {
            Family::StorageWriters => "storage_writers",
            Family::StorageReaders => "storage_readers",
            Family::ResourceWriters => "resource_writers",
            Family::ResourceReaders => "resource_readers",
            Family::ResourceUnitOfWorks => "resource_unit_of_works",
            Family::ResourceFinders => "resource_finders",
            Family::ResourceQueryServices => "resource_query_services",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == name)
    }

    pub fn scope(self) -> Scope {
        match self {
            Family::StorageWriters | Family::StorageReaders => Scope::Crate,
            _ => Scope::Resource,
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Built-in data-access templates
const DEFAULT_CATALOG: &str = r#"
# Crate-level storage, expanded once per crate

[storage_writers."%crate_prefix%::version_list::event_source::writer"]
class = "storage::couchdb::StructureVersionListWriter"
connection = "%crate_prefix%.event_source"

[storage_writers."%crate_prefix%::version_list::view_store::writer"]
class = "storage::elasticsearch::StructureVersionListWriter"
connection = "shared.view_store"
settings = { index = "%vendor%-%package%", type = "version_list" }

[storage_readers."%crate_prefix%::version_list::event_source::reader"]
class = "storage::couchdb::StructureVersionListReader"
connection = "%crate_prefix%.event_source"

[storage_readers."%crate_prefix%::version_list::view_store::reader"]
class = "storage::elasticsearch::StructureVersionListReader"
connection = "shared.view_store"
settings = { index = "%vendor%-%package%", type = "version_list" }

# Resource-level storage, expanded once per resource

[resource_writers."%res_prefix%::domain_event::event_source::writer"]
class = "storage::couchdb::EventStreamAppender"
connection = "%crate_prefix%.event_source"

[resource_writers."%res_prefix%::projection.standard::view_store::writer"]
class = "storage::elasticsearch::ProjectionWriter"
connection = "shared.view_store"

[resource_writers."%res_prefix%::projection.standard::view_store::writer".settings]
index = "%vendor%-%package%"
type = "%vendor%-%package%-%res_name%-standard"
parameters = { index = { refresh = true }, delete = { refresh = true } }

[resource_readers."%res_prefix%::event_stream::event_source::reader"]
class = "storage::couchdb::EventStreamReader"
connection = "%crate_prefix%.event_source"
settings = { design_doc = "%vendor%-%package%-%res_name%" }

[resource_readers."%res_prefix%::domain_event::event_source::reader"]
class = "storage::couchdb::DomainEventReader"
connection = "%crate_prefix%.event_source"
settings = { design_doc = "%vendor%-%package%-%res_name%" }

[resource_readers."%res_prefix%::projection.standard::view_store::reader"]
class = "storage::elasticsearch::ProjectionReader"
connection = "shared.view_store"
dependencies = { resource_type = "%projection_type%" }
settings = { index = "%vendor%-%package%", type = "%vendor%-%package%-%res_name%-standard" }

# Units of work

[resource_unit_of_works."%res_prefix%::domain_event::event_source::unit_of_work"]
class = "unit_of_work::UnitOfWork"
event_reader = "%res_prefix%::event_stream::event_source::reader"
event_writer = "%res_prefix%::domain_event::event_source::writer"
dependencies = { aggregate_root_type = "%aggregate_root_type%" }

# Finders

[resource_finders."%res_prefix%::projection.standard::view_store::finder"]
class = "finder::elasticsearch::ProjectionFinder"
connection = "shared.view_store"
dependencies = { resource_type = "%projection_type%" }

[resource_finders."%res_prefix%::projection.standard::view_store::finder".settings]
index = "%vendor%-%package%"
type = "%vendor%-%package%-%res_name%-standard"
log_search_query = false

# Query services

[resource_query_services."%res_prefix%::query_service"]
class = "query::QueryService"
settings = { default_mapping = "%res_name%.standard" }

[resource_query_services."%res_prefix%::query_service".finder_mappings."%res_name%.standard"]
finder = "%res_prefix%::projection.standard::view_store::finder"

[resource_query_services."%res_prefix%::query_service".finder_mappings."%res_name%.standard".query_translation]
class = "finder::elasticsearch::QueryTranslation"
settings = { multi_fields = {}, query_filters = { workflow_state = "!deleted" } }

[resource_query_services."%res_prefix%::query_service".finder_mappings.domain_event]
finder = "shared::domain_event::view_store::finder"
query_translation = { class = "finder::elasticsearch::QueryTranslation" }
"#;

/// The full set of template families
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    families: BTreeMap<Family, ConfigTree>,
}

impl Catalog {
    /// Create a catalog where every family is empty
    pub fn empty() -> Self {
        Self {
            families: Family::ALL
                .into_iter()
                .map(|f| (f, ConfigTree::new()))
                .collect(),
        }
    }

    /// Load a catalog from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load a catalog from a TOML string.
    ///
    /// Every top-level table must name a family; families that are absent are empty.
    pub fn from_str(content: &str) -> Result<Self, CatalogError> {
        let parsed: toml::Table = toml::from_str(content)?;
        let mut catalog = Self::empty();

        for (name, value) in parsed {
            let family =
                Family::from_name(&name).ok_or_else(|| CatalogError::UnknownFamily { name })?;
            let table = match value {
                toml::Value::Table(t) => t,
                other => {
                    return Err(CatalogError::MalformedTemplate {
                        family,
                        source: MalformedValue {
                            path: family.as_str().to_string(),
                            found: other.type_str(),
                        },
                    })
                }
            };
            let tree = ConfigTree::from_toml(table, family.as_str())
                .map_err(|source| CatalogError::MalformedTemplate { family, source })?;
            catalog.set_family(family, tree)?;
        }

        Ok(catalog)
    }

    /// Replace one family's templates
    pub fn set_family(&mut self, family: Family, templates: ConfigTree) -> Result<(), CatalogError> {
        if family.scope() == Scope::Crate {
            let markers = templates.find_markers();
            if let Some(marker) = markers.into_iter().find(|m| RESOURCE_MARKERS.contains(&m.as_str())) {
                return Err(CatalogError::ResourceMarkerInCrateFamily { family, marker });
            }
        }
        self.families.insert(family, templates);
        Ok(())
    }

    /// Builder-style [`set_family`](Self::set_family)
    pub fn with_family(mut self, family: Family, templates: ConfigTree) -> Result<Self, CatalogError> {
        self.set_family(family, templates)?;
        Ok(self)
    }

    /// Templates of one family
    pub fn family(&self, family: Family) -> &ConfigTree {
        // every family is present from `empty()` on
        &self.families[&family]
    }

    /// Serialize back to catalog TOML
    pub fn to_toml_string(&self) -> Result<String, CatalogError> {
        let tables: BTreeMap<&str, &ConfigTree> = self
            .families
            .iter()
            .filter(|(_, tree)| !tree.is_empty())
            .map(|(family, tree)| (family.as_str(), tree))
            .collect();
        Ok(toml::to_string(&tables)?)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::from_str(DEFAULT_CATALOG).expect("Default catalog should be valid TOML")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::ConfigValue;

    #[test]
    fn test_default_catalog_families() {
        let catalog = Catalog::default();
        assert_eq!(catalog.family(Family::StorageWriters).len(), 2);
        assert_eq!(catalog.family(Family::StorageReaders).len(), 2);
        assert_eq!(catalog.family(Family::ResourceWriters).len(), 2);
        assert_eq!(catalog.family(Family::ResourceReaders).len(), 3);
        assert_eq!(catalog.family(Family::ResourceUnitOfWorks).len(), 1);
        assert_eq!(catalog.family(Family::ResourceFinders).len(), 1);
        assert_eq!(catalog.family(Family::ResourceQueryServices).len(), 1);
    }

    #[test]
    fn test_default_catalog_nested_values() {
        let catalog = Catalog::default();
        let finder = catalog
            .family(Family::ResourceFinders)
            .get("%res_prefix%::projection.standard::view_store::finder")
            .and_then(ConfigValue::as_tree)
            .expect("finder template");
        assert_eq!(
            finder.get_path("settings.log_search_query"),
            Some(&ConfigValue::Bool(false))
        );

        let query_service = catalog
            .family(Family::ResourceQueryServices)
            .get("%res_prefix%::query_service")
            .and_then(ConfigValue::as_tree)
            .expect("query service template");
        assert_eq!(
            query_service
                .get_path("finder_mappings.%res_name%.standard.query_translation.settings.multi_fields"),
            Some(&ConfigValue::Tree(ConfigTree::new()))
        );
    }

    #[test]
    fn test_crate_families_have_no_resource_markers() {
        let catalog = Catalog::default();
        for family in [Family::StorageWriters, Family::StorageReaders] {
            for marker in catalog.family(family).find_markers() {
                assert!(!RESOURCE_MARKERS.contains(&marker.as_str()), "{family}: {marker}");
            }
        }
    }

    #[test]
    fn test_missing_families_are_empty() {
        let catalog = Catalog::from_str(
            r#"
            [resource_finders."%res_prefix%::finder"]
            class = "Finder"
            "#,
        )
        .expect("Should parse");
        assert_eq!(catalog.family(Family::ResourceFinders).len(), 1);
        assert!(catalog.family(Family::StorageWriters).is_empty());
    }

    #[test]
    fn test_unknown_family_error() {
        let result = Catalog::from_str("[storage_cleaners.x]\nclass = \"Cleaner\"");
        assert!(matches!(
            result,
            Err(CatalogError::UnknownFamily { ref name }) if name == "storage_cleaners"
        ));
    }

    #[test]
    fn test_malformed_template_error() {
        let result = Catalog::from_str(
            r#"
            [resource_finders."%res_prefix%::finder"]
            class = "Finder"
            settings = { multi_fields = ["title"] }
            "#,
        );
        match result {
            Err(CatalogError::MalformedTemplate { family, source }) => {
                assert_eq!(family, Family::ResourceFinders);
                assert_eq!(
                    source.path,
                    "resource_finders.%res_prefix%::finder.settings.multi_fields"
                );
                assert_eq!(source.found, "array");
            }
            other => panic!("Expected MalformedTemplate, got {:?}", other),
        }
    }

    #[test]
    fn test_family_must_be_table() {
        let result = Catalog::from_str("storage_readers = \"nope\"");
        assert!(matches!(
            result,
            Err(CatalogError::MalformedTemplate { family: Family::StorageReaders, .. })
        ));
    }

    #[test]
    fn test_resource_marker_in_crate_family_rejected() {
        let result = Catalog::from_str(
            r#"
            [storage_writers."%crate_prefix%::writer"]
            class = "Writer"
            settings = { type = "%res_name%" }
            "#,
        );
        assert!(matches!(
            result,
            Err(CatalogError::ResourceMarkerInCrateFamily { family: Family::StorageWriters, ref marker })
                if marker == "%res_name%"
        ));
    }

    #[test]
    fn test_to_toml_round_trips_default() {
        let catalog = Catalog::default();
        let text = catalog.to_toml_string().expect("Should serialize");
        let reparsed = Catalog::from_str(&text).expect("Should reparse");
        assert_eq!(reparsed, catalog);
    }
}
