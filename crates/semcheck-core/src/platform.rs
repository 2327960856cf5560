//! CI platform environment: step inputs and runner detection.
//!
//! GitHub Actions passes a step input named `version` as the environment
//! variable `INPUT_VERSION`. Values are trimmed before use, so an input made
//! only of whitespace counts as missing.

use camino::Utf8PathBuf;
use serde::Serialize;
use tracing::debug;

use crate::output::GITHUB_OUTPUT_ENV;

/// Set to `true` by the GitHub Actions runner.
pub const GITHUB_ACTIONS_ENV: &str = "GITHUB_ACTIONS";

/// Per-job temporary directory provided by the GitHub Actions runner.
pub const RUNNER_TEMP_ENV: &str = "RUNNER_TEMP";

/// Environment variable carrying the step input `name`.
///
/// Spaces become underscores and the name is uppercased:
/// `version` → `INPUT_VERSION`, `release tag` → `INPUT_RELEASE_TAG`.
pub fn input_env_var(name: &str) -> String {
    format!("INPUT_{}", name.replace(' ', "_").to_uppercase())
}

/// Read the step input `name` through `lookup`, trimming whitespace.
///
/// Returns `None` when the variable is unset. An empty string is returned as
/// is; deciding whether that counts as missing is the caller's job.
pub fn read_input<F>(name: &str, lookup: F) -> Option<String>
where
    F: FnOnce(&str) -> Option<String>,
{
    let var = input_env_var(name);
    let value = lookup(&var)?;
    debug!(var = %var, "step input found");
    Some(value.trim().to_string())
}

/// Read the step input `name` from the process environment.
pub fn get_input(name: &str) -> Option<String> {
    read_input(name, |var| {
        std::env::var_os(var).map(|v| v.to_string_lossy().into_owned())
    })
}

/// What the process can tell about the CI runner it is in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CiEnvironment {
    /// Running inside GitHub Actions.
    pub github_actions: bool,
    /// Output file from `GITHUB_OUTPUT`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_file: Option<Utf8PathBuf>,
    /// Job temp directory from `RUNNER_TEMP`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runner_temp: Option<Utf8PathBuf>,
}

impl CiEnvironment {
    /// Inspect the process environment.
    pub fn detect() -> Self {
        Self::detect_with(|var| std::env::var(var).ok())
    }

    /// Inspect an environment provided by `lookup`.
    pub fn detect_with<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty_path =
            |var: &str| lookup(var).filter(|v| !v.is_empty()).map(Utf8PathBuf::from);

        Self {
            github_actions: lookup(GITHUB_ACTIONS_ENV).as_deref() == Some("true"),
            output_file: non_empty_path(GITHUB_OUTPUT_ENV),
            runner_temp: non_empty_path(RUNNER_TEMP_ENV),
        }
    }
}
