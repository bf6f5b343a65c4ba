//! Parameter stores
//!
//! The registration facility that consumes expanded configuration is seen through
//! the [`ParameterStore`] trait: named parameters can be read and (re)defined.
//! [`MemoryStore`] is the in-process implementation used by the CLI and tests.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;
use thiserror::Error;

use crate::tree::{ConfigTree, MalformedValue};

/// A key-value store of named configuration parameters
pub trait ParameterStore {
    /// Current value of a parameter, if defined
    fn get(&self, name: &str) -> Option<ConfigTree>;

    /// Define or replace a parameter
    fn set(&mut self, name: &str, value: ConfigTree);
}

/// Errors that can occur when loading or writing a parameter store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to read parameter defaults: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse parameter defaults TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("parameter {name} must be a table")]
    NotATable { name: String },
    #[error("malformed default for parameter {name}: {source}")]
    Malformed {
        name: String,
        #[source]
        source: MalformedValue,
    },
    #[error("no parameter named {name}")]
    UnknownParameter { name: String },
    #[error("Failed to write parameters as TOML: {0}")]
    TomlOutput(#[from] toml::ser::Error),
    #[error("Failed to write parameters as JSON: {0}")]
    JsonOutput(#[from] serde_json::Error),
}

/// In-memory parameter store
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MemoryStore {
    params: BTreeMap<String, ConfigTree>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Load pre-seeded parameters from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, StoreError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load pre-seeded parameters from a TOML string; each top-level table is one parameter
    pub fn from_str(content: &str) -> Result<Self, StoreError> {
        let parsed: toml::Table = toml::from_str(content)?;
        let mut store = Self::new();

        for (name, value) in parsed {
            let toml::Value::Table(table) = value else {
                return Err(StoreError::NotATable { name });
            };
            let tree = ConfigTree::from_toml(table, &name)
                .map_err(|source| StoreError::Malformed {
                    name: name.clone(),
                    source,
                })?;
            store.params.insert(name, tree);
        }

        Ok(store)
    }

    /// Borrow a parameter without cloning it
    pub fn parameter(&self, name: &str) -> Option<&ConfigTree> {
        self.params.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.params.keys().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// A store holding only the named parameter
    pub fn subset(&self, name: &str) -> Result<MemoryStore, StoreError> {
        let tree = self
            .params
            .get(name)
            .ok_or_else(|| StoreError::UnknownParameter {
                name: name.to_string(),
            })?;
        let mut store = MemoryStore::new();
        store.params.insert(name.to_string(), tree.clone());
        Ok(store)
    }

    pub fn into_inner(self) -> BTreeMap<String, ConfigTree> {
        self.params
    }

    pub fn to_toml_string(&self) -> Result<String, StoreError> {
        Ok(toml::to_string(self)?)
    }

    pub fn to_json_string(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl ParameterStore for MemoryStore {
    fn get(&self, name: &str) -> Option<ConfigTree> {
        self.params.get(name).cloned()
    }

    fn set(&mut self, name: &str, value: ConfigTree) {
        self.params.insert(name.to_string(), value);
    }
}
