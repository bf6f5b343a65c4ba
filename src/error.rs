//! Error types for template expansion

use thiserror::Error;

/// Errors that can occur while expanding templates for a crate
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExpandError {
    /// A resource's prefix has no entry in the crate's root-type directory
    #[error("no aggregate root type registered for resource prefix: {prefix}")]
    UnknownRootType { prefix: String },
}

impl ExpandError {
    /// Create an unknown root type error
    pub fn unknown_root_type(prefix: impl Into<String>) -> Self {
        Self::UnknownRootType {
            prefix: prefix.into(),
        }
    }

    /// The resource prefix the failing lookup was made for
    pub fn prefix(&self) -> &str {
        match self {
            Self::UnknownRootType { prefix } => prefix,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_root_type_display() {
        let err = ExpandError::unknown_root_type("order");
        assert_eq!(
            err.to_string(),
            "no aggregate root type registered for resource prefix: order"
        );
        assert_eq!(err.prefix(), "order");
    }
}
