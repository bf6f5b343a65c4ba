//! Configuration trees
//!
//! A [`ConfigTree`] is the unit every template, every expanded entry and every
//! registered parameter is made of: an ordered map from string keys to either a
//! string, a boolean or another tree.

use std::collections::btree_map;
use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

/// A value stored under a key of a [`ConfigTree`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ConfigValue {
    String(String),
    Bool(bool),
    Tree(ConfigTree),
}

impl ConfigValue {
    /// Borrow the string payload, if this is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_tree(&self) -> Option<&ConfigTree> {
        match self {
            ConfigValue::Tree(t) => Some(t),
            _ => None,
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        ConfigValue::String(value.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        ConfigValue::String(value)
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        ConfigValue::Bool(value)
    }
}

impl From<ConfigTree> for ConfigValue {
    fn from(value: ConfigTree) -> Self {
        ConfigValue::Tree(value)
    }
}

/// A TOML value that has no [`ConfigValue`] counterpart
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unsupported value at `{path}`: expected string, boolean or table, found {found}")]
pub struct MalformedValue {
    /// Dotted path of the offending entry
    pub path: String,
    /// TOML type name of the offending value
    pub found: &'static str,
}

/// Ordered mapping of string keys to configuration values
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ConfigTree(BTreeMap<String, ConfigValue>);

impl ConfigTree {
    /// Create an empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ConfigValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert a value, returning the one it replaced
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<ConfigValue>,
    ) -> Option<ConfigValue> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(|k| k.as_str())
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, ConfigValue> {
        self.0.iter()
    }

    /// Shallow top-level union: entries of `other` replace entries with the same key.
    ///
    /// Returns the keys that were overwritten.
    pub fn merge(&mut self, other: ConfigTree) -> Vec<String> {
        let mut overwritten = Vec::new();
        for (key, value) in other.0 {
            if let Some(previous) = self.0.insert(key.clone(), value) {
                if self.0.get(&key) != Some(&previous) {
                    overwritten.push(key);
                }
            }
        }
        overwritten
    }

    /// Look up a value by dotted path, e.g. `settings.type`.
    ///
    /// Keys may themselves contain dots (`projection.standard`); at every level the
    /// longest key matching a prefix of the remaining path is tried first.
    pub fn get_path(&self, path: &str) -> Option<&ConfigValue> {
        if let Some(value) = self.0.get(path) {
            return Some(value);
        }

        for (idx, _) in path.rmatch_indices('.') {
            let (head, rest) = (&path[..idx], &path[idx + 1..]);
            if let Some(ConfigValue::Tree(sub)) = self.0.get(head) {
                if let Some(value) = sub.get_path(rest) {
                    return Some(value);
                }
            }
        }

        None
    }

    /// Collect every `%name%` marker left in keys or string values, in key order
    pub fn find_markers(&self) -> Vec<String> {
        let mut found = Vec::new();
        self.collect_markers(&mut found);
        found
    }

    fn collect_markers(&self, found: &mut Vec<String>) {
        for (key, value) in &self.0 {
            scan_markers(key, found);
            match value {
                ConfigValue::String(s) => scan_markers(s, found),
                ConfigValue::Tree(t) => t.collect_markers(found),
                ConfigValue::Bool(_) => {}
            }
        }
    }

    /// Convert a parsed TOML table, rejecting integers, floats, datetimes and arrays.
    ///
    /// `path` is the location of `table` itself and is only used for error reporting.
    pub fn from_toml(table: toml::Table, path: &str) -> Result<Self, MalformedValue> {
        let mut tree = ConfigTree::new();
        for (key, value) in table {
            let child_path = if path.is_empty() {
                key.clone()
            } else {
                format!("{}.{}", path, key)
            };
            let value = match value {
                toml::Value::String(s) => ConfigValue::String(s),
                toml::Value::Boolean(b) => ConfigValue::Bool(b),
                toml::Value::Table(t) => ConfigValue::Tree(Self::from_toml(t, &child_path)?),
                other => {
                    return Err(MalformedValue {
                        path: child_path,
                        found: other.type_str(),
                    })
                }
            };
            tree.0.insert(key, value);
        }
        Ok(tree)
    }
}

impl IntoIterator for ConfigTree {
    type Item = (String, ConfigValue);
    type IntoIter = btree_map::IntoIter<String, ConfigValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ConfigTree {
    type Item = (&'a String, &'a ConfigValue);
    type IntoIter = btree_map::Iter<'a, String, ConfigValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<(String, ConfigValue)> for ConfigTree {
    fn from_iter<I: IntoIterator<Item = (String, ConfigValue)>>(iter: I) -> Self {
        ConfigTree(iter.into_iter().collect())
    }
}

/// Find `%word%` tokens where word is lowercase ascii, digits or underscores
fn scan_markers(text: &str, found: &mut Vec<String>) {
    let mut rest = text;
    while let Some(start) = rest.find('%') {
        let after = &rest[start + 1..];
        match after.find('%') {
            Some(end) => {
                let name = &after[..end];
                let is_marker = !name.is_empty()
                    && name
                        .chars()
                        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
                if is_marker {
                    found.push(format!("%{}%", name));
                    rest = &after[end + 1..];
                } else {
                    rest = after;
                }
            }
            None => break,
        }
    }
}
