//! Core library for semcheck.
//!
//! Validates version strings against Semantic Versioning 2.0.0 and publishes
//! the result as CI step outputs.
//!
//! # Modules
//!
//! - [`version`] - Grammar matching and the [`Version`] value
//! - [`action`] - The validation step: missing vs. malformed input, outputs
//! - [`output`] - Output sinks (`GITHUB_OUTPUT` file, writers, memory)
//! - [`annotation`] - Workflow-command annotations
//! - [`platform`] - Step inputs and CI runner detection
//! - [`config`] - Configuration loading and management
//! - [`error`] - Configuration error types
//!
//! # Quick Start
//!
//! ```
//! use semcheck_core::action::{self, IS_VALID, PARSED_VERSION};
//! use semcheck_core::output::MemorySink;
//! use semcheck_core::version::ParseOptions;
//!
//! let mut outputs = MemorySink::new();
//! let outcome = action::run(Some("v1.4.0-rc.1"), &ParseOptions::default(), &mut outputs)
//!     .expect("input was supplied");
//!
//! assert!(outcome.is_valid());
//! assert_eq!(outputs.get(IS_VALID), Some("true"));
//! assert!(outputs.get(PARSED_VERSION).unwrap().contains(r#""prerelease":"rc.1""#));
//! ```
#![deny(unsafe_code)]

pub mod action;

pub mod annotation;

pub mod config;

pub mod error;

pub mod output;

pub mod platform;

pub mod version;

pub use config::{Config, ConfigLoader, LogLevel};

pub use error::{ConfigError, ConfigResult};

pub use version::{ParseOptions, ValidationError, Version};
