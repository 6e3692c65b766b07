//! Error types for netforge.
//!
//! Synthesis raises exactly one user-facing kind, [`Error::Configuration`]:
//! configuration errors are deterministic, so re-running with the same input
//! fails identically and there is no retry path. The remaining variants cover
//! the ambient surfaces (spec file loading, plan graph invariants, IO).

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for netforge operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for netforge.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid network specification. Synthesis aborts; no partial topology
    /// is ever returned.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Failed to load a network spec file.
    #[error("Failed to load network spec '{path}': {message}")]
    SpecLoad {
        /// Path to the spec file
        path: PathBuf,
        /// Error message
        message: String,
    },

    /// Resource plan graph invariant violated (duplicate declaration,
    /// dependency cycle). These indicate a synthesizer bug, not bad input.
    #[error("Resource graph error: {0}")]
    Graph(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error.
    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Creates a new configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Creates a new spec load error.
    pub fn spec_load(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::SpecLoad {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new resource graph error.
    pub fn graph(message: impl Into<String>) -> Self {
        Self::Graph(message.into())
    }

    /// Returns true if this error comes from user configuration rather than
    /// an internal invariant.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Configuration(_) | Error::SpecLoad { .. })
    }

    /// Returns the error code for CLI exit status.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Configuration(_) => 2,
            Error::SpecLoad { .. } | Error::YamlParse(_) => 3,
            Error::Graph(_) => 4,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_error_carries_reason() {
        let err = Error::configuration("CIDR count exceeds zone count");
        assert_eq!(
            err.to_string(),
            "Configuration error: CIDR count exceeds zone count"
        );
        assert!(err.is_configuration());
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn graph_error_is_not_configuration() {
        let err = Error::graph("duplicate declaration 'aws_subnet.x'");
        assert!(!err.is_configuration());
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn spec_load_formats_path() {
        let err = Error::spec_load("/tmp/net.yml", "no such file");
        assert_eq!(
            err.to_string(),
            "Failed to load network spec '/tmp/net.yml': no such file"
        );
    }
}
