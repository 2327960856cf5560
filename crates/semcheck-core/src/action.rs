//! The validation step: take the `version` input, validate it, publish the
//! three step outputs.
//!
//! Two failure tiers are kept apart:
//!
//! - A missing (absent or empty) input is fatal: [`run`] returns
//!   [`ActionError::MissingInput`] after writing best-effort outputs.
//! - A malformed input is an ordinary result: [`run`] returns
//!   [`Outcome::Invalid`] and the step succeeds with `is_valid=false`.

use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::output::{OutputError, OutputSink};
use crate::version::{self, ParseOptions, ValidationError, Version};

/// Name of the step input.
pub const VERSION_INPUT: &str = "version";

/// Output key: `"true"` or `"false"`.
pub const IS_VALID: &str = "is_valid";

/// Output key: JSON object on success, empty otherwise.
pub const PARSED_VERSION: &str = "parsed_version";

/// Output key: empty on success, the failure message otherwise.
pub const ERROR_MESSAGE: &str = "error_message";

/// Fatal step failures.
#[derive(Error, Debug)]
pub enum ActionError {
    /// The required input was absent or empty.
    #[error("Input required and not supplied: {name}")]
    MissingInput {
        /// Input name.
        name: &'static str,
    },

    /// Outputs could not be published.
    #[error(transparent)]
    Output(#[from] OutputError),

    /// The parsed version could not be rendered as JSON.
    #[error("failed to serialize parsed version: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result alias for step execution.
pub type ActionResult<T> = Result<T, ActionError>;

/// Non-fatal result of one step run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The input is a valid semantic version.
    Valid {
        /// The parsed version.
        version: Version,
        /// The `parsed_version` output, as published.
        parsed: String,
    },
    /// The input was supplied but does not match the grammar.
    Invalid(ValidationError),
}

impl Outcome {
    /// Whether the input validated.
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Valid { .. })
    }

    /// The parsed version, when valid.
    pub const fn version(&self) -> Option<&Version> {
        match self {
            Self::Valid { version, .. } => Some(version),
            Self::Invalid(_) => None,
        }
    }

    /// The published `parsed_version` JSON, when valid.
    pub fn parsed_json(&self) -> Option<&str> {
        match self {
            Self::Valid { parsed, .. } => Some(parsed.as_str()),
            Self::Invalid(_) => None,
        }
    }

    /// The validation error, when invalid.
    pub const fn error(&self) -> Option<&ValidationError> {
        match self {
            Self::Valid { .. } => None,
            Self::Invalid(err) => Some(err),
        }
    }
}

/// Run the step for `input` and publish its outputs to `sink`.
///
/// `None` and `Some("")` are both a missing input. Any failure to publish
/// outputs is fatal; before returning it, `is_valid=false` and the failure
/// message are written on a best-effort basis.
#[instrument(skip(options, sink), fields(allow_v_prefix = options.allow_v_prefix))]
pub fn run(
    input: Option<&str>,
    options: &ParseOptions,
    sink: &mut dyn OutputSink,
) -> ActionResult<Outcome> {
    let Some(input) = input.filter(|s| !s.is_empty()) else {
        let err = ActionError::MissingInput {
            name: VERSION_INPUT,
        };
        publish_failure(sink, &err.to_string());
        return Err(err);
    };

    let result = match version::validate_with(input, options) {
        Ok(version) => publish_valid(sink, input, version),
        Err(err) => publish_invalid(sink, input, err),
    };

    result.inspect_err(|err| publish_failure(sink, &err.to_string()))
}

fn publish_valid(
    sink: &mut dyn OutputSink,
    input: &str,
    version: Version,
) -> ActionResult<Outcome> {
    let parsed = serde_json::to_string(&version)?;
    info!(
        input,
        %version,
        prerelease = version.is_prerelease(),
        v_prefix = version.has_v_prefix(),
        "version validated"
    );
    publish(sink, true, &parsed, "")?;
    Ok(Outcome::Valid { version, parsed })
}

fn publish_invalid(
    sink: &mut dyn OutputSink,
    input: &str,
    err: ValidationError,
) -> ActionResult<Outcome> {
    warn!(input, reason = %err.reason(), "version rejected");
    publish(sink, false, "", &err.to_string())?;
    Ok(Outcome::Invalid(err))
}

fn publish(
    sink: &mut dyn OutputSink,
    is_valid: bool,
    parsed_version: &str,
    error_message: &str,
) -> Result<(), OutputError> {
    sink.emit(IS_VALID, if is_valid { "true" } else { "false" })?;
    sink.emit(PARSED_VERSION, parsed_version)?;
    sink.emit(ERROR_MESSAGE, error_message)?;
    Ok(())
}

/// Best-effort failure outputs: `is_valid=false`, empty `parsed_version`,
/// `error_message` set to `message`. Write errors are logged and dropped.
///
/// For failures that happen before [`run`] gets to execute, such as a broken
/// configuration file.
pub fn publish_failure(sink: &mut dyn OutputSink, message: &str) {
    if let Err(publish_err) = publish(sink, false, "", message) {
        debug!(error = %publish_err, "best-effort outputs not written");
    }
}
