//! Crate contexts and resource descriptors
//!
//! A [`CrateContext`] carries everything template expansion needs to know about
//! one crate: its naming (prefix, vendor, package), the ordered list of resource
//! types it contains and the directory mapping each resource prefix to its
//! aggregate root type. Contexts are built in code or loaded from a TOML manifest.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::error::ExpandError;

/// Errors that can occur when loading a crate manifest
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("Failed to read crate manifest: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse crate manifest TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("duplicate resource prefix in crate manifest: {prefix}")]
    DuplicatePrefix { prefix: String },
}

/// One projection/resource type of a crate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceType {
    name: String,
    prefix: String,
    type_id: String,
}

impl ResourceType {
    /// Create a resource descriptor
    pub fn new(
        name: impl Into<String>,
        prefix: impl Into<String>,
        type_id: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            prefix: prefix.into(),
            type_id: type_id.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Prefix unique within the crate
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Stable identifier of the concrete resource type
    pub fn type_id(&self) -> &str {
        &self.type_id
    }
}

/// The crate being wired
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrateContext {
    prefix: String,
    vendor: String,
    package: String,
    resources: Vec<ResourceType>,
    root_types: BTreeMap<String, String>,
}

/// TOML structure for deserializing crate manifests
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlManifest {
    #[serde(rename = "crate")]
    krate: TomlCrate,
    #[serde(default)]
    resources: Vec<TomlResource>,
    #[serde(default)]
    root_types: BTreeMap<String, String>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlCrate {
    prefix: String,
    vendor: String,
    package: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlResource {
    name: String,
    prefix: String,
    #[serde(rename = "type")]
    type_id: String,
    root_type: Option<String>,
}

impl CrateContext {
    /// Create a context without resources
    pub fn new(
        prefix: impl Into<String>,
        vendor: impl Into<String>,
        package: impl Into<String>,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            vendor: vendor.into(),
            package: package.into(),
            resources: Vec::new(),
            root_types: BTreeMap::new(),
        }
    }

    /// Append a resource; iteration order follows insertion order
    pub fn with_resource(mut self, resource: ResourceType) -> Self {
        self.resources.push(resource);
        self
    }

    /// Register the aggregate root type for a resource prefix
    pub fn with_root_type(mut self, prefix: impl Into<String>, type_id: impl Into<String>) -> Self {
        self.root_types.insert(prefix.into(), type_id.into());
        self
    }

    /// Load a context from a TOML manifest file
    pub fn from_file(path: &Path) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load a context from a TOML manifest string
    pub fn from_str(content: &str) -> Result<Self, ManifestError> {
        let parsed: TomlManifest = toml::from_str(content)?;

        let mut context = CrateContext::new(
            parsed.krate.prefix,
            parsed.krate.vendor,
            parsed.krate.package,
        );
        context.root_types = parsed.root_types;

        for res in parsed.resources {
            if context.resource(&res.prefix).is_some() {
                return Err(ManifestError::DuplicatePrefix { prefix: res.prefix });
            }
            if let Some(root_type) = res.root_type {
                context.root_types.insert(res.prefix.clone(), root_type);
            }
            context
                .resources
                .push(ResourceType::new(res.name, res.prefix, res.type_id));
        }

        Ok(context)
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn vendor(&self) -> &str {
        &self.vendor
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    /// Resources in declaration order
    pub fn resources(&self) -> &[ResourceType] {
        &self.resources
    }

    /// Find a resource by prefix
    pub fn resource(&self, prefix: &str) -> Option<&ResourceType> {
        self.resources.iter().find(|r| r.prefix == prefix)
    }

    /// Look up the aggregate root type registered for a resource prefix
    pub fn root_type(&self, prefix: &str) -> Result<&str, ExpandError> {
        self.root_types
            .get(prefix)
            .map(|s| s.as_str())
            .ok_or_else(|| ExpandError::unknown_root_type(prefix))
    }
}
