//! Error types for semcheck-core configuration.
//!
//! Validation, output and step errors live next to their modules:
//! [`crate::version::ValidationError`], [`crate::output::OutputError`],
//! [`crate::action::ActionError`].

use thiserror::Error;

/// Errors that can occur when loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A config file could not be read or deserialized.
    #[error("invalid configuration: {0}")]
    Deserialize(#[from] Box<figment::Error>),
}

/// Result type alias using [`ConfigError`].
pub type ConfigResult<T> = Result<T, ConfigError>;
