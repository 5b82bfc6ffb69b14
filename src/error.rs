//! Error handling module for the layout engine
//!
//! Load failures are recovered inside the persistence adapter and never reach
//! this module's callers. Save failures and edit-control input errors are
//! surfaced through the types below.

use thiserror::Error;

/// Errors reported by a [`DocumentStore`](crate::store::DocumentStore)
#[derive(Error, Debug)]
pub enum StoreError {
    /// No document has been written under this key yet
    #[error("No document stored under '{key}'")]
    NotFound { key: String },

    /// The backing storage could not be read or written
    #[error("Storage I/O failed for '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// The store refused the write
    #[error("Store rejected write to '{key}': {reason}")]
    Rejected { key: String, reason: String },

    /// A stored document exists but is not valid JSON
    #[error("Document under '{key}' is not valid JSON: {source}")]
    Malformed {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    /// Returns true if the failure only means "nothing saved yet"
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Failure of a save attempt. Always surfaced to the operator so they can retry.
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("Failed to save layout: {0}")]
    Store(#[from] StoreError),

    #[error("Failed to serialize layout: {0}")]
    Serialize(#[from] serde_json::Error),

    /// JSON has no encoding for NaN or infinity
    #[error("Config value {section}.{key} is not a finite number")]
    NonFinite { section: String, key: String },
}

/// Raw edit-control input that does not fit a field descriptor
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("'{input}' is not a whole number")]
    NotANumber { input: String },

    #[error("{value} is outside the allowed range {min}..={max}")]
    OutOfRange { value: i64, min: i64, max: i64 },

    #[error("'{input}' is not one of: {}", options.join(", "))]
    UnknownOption {
        input: String,
        options: Vec<&'static str>,
    },

    #[error("'{input}' is not a yes/no value")]
    NotAFlag { input: String },
}

/// Main error type for the layout engine
#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("Invalid field value: {0}")]
    Field(#[from] FieldError),

    /// A layout violates one of its structural invariants
    #[error("Invalid layout: {0}")]
    Invariant(String),

    /// Lookup of a section id or config key that the caller required to exist
    #[error("Unknown {what}: {name}")]
    Unknown { what: &'static str, name: String },
}

/// Result type alias for layout engine operations
pub type Result<T> = std::result::Result<T, LayoutError>;

impl LayoutError {
    /// Create an invariant violation error
    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::Invariant(msg.into())
    }

    /// Create an unknown-section error
    pub fn unknown_section(id: impl Into<String>) -> Self {
        Self::Unknown {
            what: "section",
            name: id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StoreError::NotFound {
            key: "site/layout".to_string(),
        };
        assert_eq!(err.to_string(), "No document stored under 'site/layout'");

        let err = LayoutError::unknown_section("hero");
        assert_eq!(err.to_string(), "Unknown section: hero");

        let err: LayoutError = FieldError::NotANumber {
            input: "x".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "Invalid field value: 'x' is not a whole number");
    }

    #[test]
    fn test_store_error_conversion() {
        let store_err = StoreError::Rejected {
            key: "site/layout".to_string(),
            reason: "quota".to_string(),
        };
        let err: PersistenceError = store_err.into();
        assert!(matches!(err, PersistenceError::Store(_)));
        assert!(err.to_string().contains("quota"));
    }

    #[test]
    fn test_non_finite_display() {
        let err = PersistenceError::NonFinite {
            section: "hero".to_string(),
            key: "ratio".to_string(),
        };
        assert_eq!(err.to_string(), "Config value hero.ratio is not a finite number");
    }

    #[test]
    fn test_not_found_detection() {
        let io = StoreError::Io {
            key: "k".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(!io.is_not_found());
        assert!(StoreError::NotFound { key: "k".into() }.is_not_found());
    }

    #[test]
    fn test_field_error_lists_options() {
        let err = FieldError::UnknownOption {
            input: "tiles".to_string(),
            options: vec!["cards", "grid", "list"],
        };
        assert_eq!(err.to_string(), "'tiles' is not one of: cards, grid, list");
    }
}
