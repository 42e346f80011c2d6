//! Error types for manifest operations.
//!
//! Covers reading and writing manifest files, parsing them as YAML or JSON,
//! and building a registry from them.

use command_router_core::RegistryError;
use thiserror::Error;

use crate::ManifestIssue;

/// Errors that can occur while loading or building a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// A command, program or option failed validation.
    #[error("invalid manifest: {0}")]
    Invalid(#[from] ManifestIssue),

    /// The registry rejected an entry.
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),
}

/// Convenience alias for results with [`ManifestError`].
pub type Result<T> = std::result::Result<T, ManifestError>;
