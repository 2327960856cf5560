//! Semantic version validation.
//!
//! [`validate`] matches a string against the Semantic Versioning 2.0.0
//! grammar, optionally tolerating one leading `v`, and decomposes it into a
//! [`Version`]. A `Version` can only be obtained from a string that matched
//! the whole grammar; there is no partially-populated result.
//!
//! ```
//! use semcheck_core::version;
//!
//! let v = version::validate("v2.1.0-beta.2+exp.sha.5114f85").unwrap();
//! assert_eq!(v.major(), 2);
//! assert_eq!(v.prerelease(), Some("beta.2"));
//! assert_eq!(v.raw(), "v2.1.0-beta.2+exp.sha.5114f85");
//!
//! let err = version::validate("1.2").unwrap_err();
//! assert_eq!(err.to_string(), "Invalid semver format: '1.2'");
//! ```

mod parse;

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, instrument};

pub use parse::{Component, Section, SyntaxError};

/// Longest input accepted, in bytes, `v` prefix included.
pub const MAX_LENGTH: usize = 256;

/// Errors from version validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The input does not match the semver grammar.
    #[error("Invalid semver format: '{input}'")]
    InvalidFormat {
        /// The input exactly as supplied.
        input: String,
        /// The grammar rule that rejected it.
        reason: SyntaxError,
    },
}

impl ValidationError {
    /// The rejected input, verbatim.
    pub fn input(&self) -> &str {
        match self {
            Self::InvalidFormat { input, .. } => input,
        }
    }

    /// The grammar rule that rejected the input.
    pub const fn reason(&self) -> &SyntaxError {
        match self {
            Self::InvalidFormat { reason, .. } => reason,
        }
    }
}

/// Result alias for validation.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Knobs for [`validate_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Accept a single lowercase `v` before the version (default: `true`).
    pub allow_v_prefix: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            allow_v_prefix: true,
        }
    }
}

impl ParseOptions {
    /// Bare semver 2.0.0: no `v` prefix.
    pub const fn strict() -> Self {
        Self {
            allow_v_prefix: false,
        }
    }
}

/// A validated semantic version.
///
/// Serializes to the `parsed_version` output shape: `major`, `minor`,
/// `patch`, `prerelease` (string or null), `build` (string or null), `raw`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Version {
    major: u64,
    minor: u64,
    patch: u64,
    prerelease: Option<String>,
    build: Option<String>,
    raw: String,
}

impl Version {
    /// Major version number.
    pub const fn major(&self) -> u64 {
        self.major
    }

    /// Minor version number.
    pub const fn minor(&self) -> u64 {
        self.minor
    }

    /// Patch version number.
    pub const fn patch(&self) -> u64 {
        self.patch
    }

    /// Dot-joined prerelease identifiers, if a `-` section was present.
    pub fn prerelease(&self) -> Option<&str> {
        self.prerelease.as_deref()
    }

    /// Dot-joined build metadata, if a `+` section was present.
    pub fn build(&self) -> Option<&str> {
        self.build.as_deref()
    }

    /// The input exactly as supplied, including any `v` prefix.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Whether a prerelease section is present.
    pub const fn is_prerelease(&self) -> bool {
        self.prerelease.is_some()
    }

    /// Whether the raw input carried a leading `v`.
    pub fn has_v_prefix(&self) -> bool {
        self.raw.starts_with('v')
    }
}

/// Canonical form, without any `v` prefix.
impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(ref pre) = self.prerelease {
            write!(f, "-{pre}")?;
        }
        if let Some(ref build) = self.build {
            write!(f, "+{build}")?;
        }
        Ok(())
    }
}

impl FromStr for Version {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        validate(s)
    }
}

/// Validate `input` with the default options (leading `v` allowed).
pub fn validate(input: &str) -> ValidationResult<Version> {
    validate_with(input, &ParseOptions::default())
}

/// Validate `input` against the semver grammar.
///
/// Pure: no I/O, and the same input always yields the same result.
#[instrument(level = "debug", skip(options), fields(allow_v_prefix = options.allow_v_prefix))]
pub fn validate_with(input: &str, options: &ParseOptions) -> ValidationResult<Version> {
    if input.len() > MAX_LENGTH {
        debug!(len = input.len(), "input too long");
        return Err(ValidationError::InvalidFormat {
            input: input.to_string(),
            reason: SyntaxError::TooLong(input.len()),
        });
    }

    let text = if options.allow_v_prefix {
        input.strip_prefix('v').unwrap_or(input)
    } else {
        input
    };

    let parts = parse::parse(text).map_err(|reason| {
        debug!(%reason, "grammar mismatch");
        ValidationError::InvalidFormat {
            input: input.to_string(),
            reason,
        }
    })?;

    let version = Version {
        major: parts.major,
        minor: parts.minor,
        patch: parts.patch,
        prerelease: parts.prerelease.map(str::to_string),
        build: parts.build.map(str::to_string),
        raw: input.to_string(),
    };
    debug!(%version, "validated version");
    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_version() {
        let v = validate("1.2.3").unwrap();
        assert_eq!((v.major(), v.minor(), v.patch()), (1, 2, 3));
        assert_eq!(v.prerelease(), None);
        assert_eq!(v.build(), None);
        assert_eq!(v.raw(), "1.2.3");
    }

    #[test]
    fn v_prefix_is_kept_in_raw() {
        let v = validate("v2.0.0").unwrap();
        assert_eq!((v.major(), v.minor(), v.patch()), (2, 0, 0));
        assert_eq!(v.raw(), "v2.0.0");
        assert!(v.has_v_prefix());
        assert_eq!(v.to_string(), "2.0.0");
    }

    #[test]
    fn prerelease_only() {
        let v = validate("1.0.0-alpha.1").unwrap();
        assert_eq!(v.prerelease(), Some("alpha.1"));
        assert!(v.is_prerelease());
    }

    #[test]
    fn prerelease_and_build() {
        let v = validate("2.1.0-beta.2+exp.sha.5114f85").unwrap();
        assert_eq!(v.prerelease(), Some("beta.2"));
        assert_eq!(v.build(), Some("exp.sha.5114f85"));
    }

    #[test]
    fn build_only() {
        let v = validate("1.0.0+20130313144700").unwrap();
        assert_eq!(v.prerelease(), None);
        assert_eq!(v.build(), Some("20130313144700"));
        assert!(!v.is_prerelease());
    }

    #[test]
    fn missing_patch_is_invalid() {
        let err = validate("1.2").unwrap_err();
        assert_eq!(err.to_string(), "Invalid semver format: '1.2'");
        assert_eq!(err.input(), "1.2");
        assert_eq!(err.reason(), &SyntaxError::ComponentCount(2));
    }

    #[test]
    fn leading_zeros_invalidate_regardless_of_suffixes() {
        for input in ["01.2.3", "1.01.3", "1.2.03", "01.2.3-alpha+build", "v00.1.0"] {
            let err = validate(input).unwrap_err();
            assert!(
                matches!(err.reason(), SyntaxError::LeadingZero(_)),
                "{input}: {err:?}"
            );
        }
    }

    #[test]
    fn empty_string_is_invalid() {
        let err = validate("").unwrap_err();
        assert_eq!(err.to_string(), "Invalid semver format: ''");
        assert_eq!(err.reason(), &SyntaxError::Empty);
    }

    #[test]
    fn lone_v_is_invalid() {
        let err = validate("v").unwrap_err();
        assert_eq!(err.to_string(), "Invalid semver format: 'v'");
    }

    #[test]
    fn length_is_capped() {
        let longest = format!("1.0.0-{}", "a".repeat(MAX_LENGTH - 6));
        assert_eq!(longest.len(), MAX_LENGTH);
        assert!(validate(&longest).is_ok());

        let too_long = format!("{longest}a");
        let err = validate(&too_long).unwrap_err();
        assert_eq!(err.reason(), &SyntaxError::TooLong(MAX_LENGTH + 1));
        assert_eq!(err.input(), too_long);
    }

    #[test]
    fn length_cap_counts_the_v_prefix() {
        let input = format!("v1.0.0-{}", "a".repeat(MAX_LENGTH - 6));
        assert!(validate(&input).is_err());
    }

    #[test]
    fn six_digit_components_are_exact() {
        let v = validate("999999.999999.999999").unwrap();
        assert_eq!(v.major(), 999_999);
        assert_eq!(v.minor(), 999_999);
        assert_eq!(v.patch(), 999_999);
    }

    #[test]
    fn u64_max_is_exact_and_one_more_is_rejected() {
        let v = validate("0.0.18446744073709551615").unwrap();
        assert_eq!(v.patch(), u64::MAX);

        let err = validate("0.0.18446744073709551616").unwrap_err();
        assert_eq!(err.reason(), &SyntaxError::Overflow(Component::Patch));
    }

    #[test]
    fn only_one_lowercase_v_is_tolerated() {
        for input in ["V1.2.3", "vv1.2.3", " 1.2.3", "1.2.3\n", "version1.2.3"] {
            assert!(validate(input).is_err(), "{input:?} should be rejected");
        }
    }

    #[test]
    fn strict_options_reject_v_prefix() {
        assert!(validate_with("v1.2.3", &ParseOptions::strict()).is_err());
        assert!(validate_with("1.2.3", &ParseOptions::strict()).is_ok());
    }

    #[test]
    fn raw_equals_input_for_valid_strings() {
        for input in [
            "0.0.0",
            "v0.1.0",
            "1.0.0-0.3.7",
            "1.0.0-x.7.z.92",
            "1.0.0-alpha+001",
            "1.0.0+21AF26D3----117B344092BD",
            "10.20.30-rc.1+build.5",
        ] {
            assert_eq!(validate(input).unwrap().raw(), input);
        }
    }

    #[test]
    fn display_reconstructs_canonical_form() {
        for (input, canonical) in [
            ("1.2.3", "1.2.3"),
            ("v1.2.3", "1.2.3"),
            ("1.0.0-alpha.1", "1.0.0-alpha.1"),
            ("v2.1.0-beta.2+exp.sha.5114f85", "2.1.0-beta.2+exp.sha.5114f85"),
            ("1.0.0+build.007", "1.0.0+build.007"),
        ] {
            assert_eq!(validate(input).unwrap().to_string(), canonical);
        }
    }

    #[test]
    fn error_message_contains_input_verbatim() {
        for input in ["1.2", "not-a-version", "1.2.3-", "1.2.3+a+b", "１.2.3"] {
            let err = validate(input).unwrap_err();
            assert_eq!(err.to_string(), format!("Invalid semver format: '{input}'"));
        }
    }

    #[test]
    fn from_str_uses_default_options() {
        let v: Version = "v3.4.5".parse().unwrap();
        assert_eq!(v.major(), 3);
        assert!("3.4".parse::<Version>().is_err());
    }

    #[test]
    fn serializes_to_output_shape() {
        let v = validate("1.2.3").unwrap();
        assert_eq!(
            serde_json::to_string(&v).unwrap(),
            r#"{"major":1,"minor":2,"patch":3,"prerelease":null,"build":null,"raw":"1.2.3"}"#
        );

        let v = validate("v2.1.0-beta.2+exp.sha.5114f85").unwrap();
        assert_eq!(
            serde_json::to_string(&v).unwrap(),
            r#"{"major":2,"minor":1,"patch":0,"prerelease":"beta.2","build":"exp.sha.5114f85","raw":"v2.1.0-beta.2+exp.sha.5114f85"}"#
        );
    }

    #[test]
    fn agrees_with_semver_crate() {
        let corpus = [
            "0.0.0",
            "1.2.3",
            "10.20.30",
            "1.1.2-prerelease+meta",
            "1.1.2+meta-valid",
            "1.0.0-alpha",
            "1.0.0-beta",
            "1.0.0-alpha.beta",
            "1.0.0-alpha.beta.1",
            "1.0.0-alpha.1",
            "1.0.0-alpha0.valid",
            "1.0.0-alpha.0valid",
            "1.0.0-rc.1+build.1",
            "2.0.0-rc.1+build.123",
            "1.2.3-beta",
            "10.2.3-DEV-SNAPSHOT",
            "1.2.3-SNAPSHOT-123",
            "2.0.0+build.1848",
            "2.0.1-alpha.1227",
            "1.0.0+0.build.1-rc.10000aaa-kk-0.1",
            "18446744073709551615.0.0",
            "1",
            "1.2",
            "1.2.3-0123",
            "1.2.3-0123.0123",
            "1.1.2+.123",
            "+invalid",
            "-invalid",
            "-invalid+invalid",
            "alpha",
            "alpha.beta",
            "1.0.0-alpha_beta",
            "1.0.0-alpha..",
            "1.0.0-alpha..1",
            "01.1.1",
            "1.01.1",
            "1.1.01",
            "1.2.3.DEV",
            "1.2-SNAPSHOT",
            "1.0.0-alpha+beta+gamma",
            "9.8.7+meta+meta",
            "99999999999999999999999.999999999999999999.99999999999999999",
            "v1.2.3",
            "",
        ];

        for input in corpus {
            let ours = validate_with(input, &ParseOptions::strict()).is_ok();
            let theirs = semver::Version::parse(input).is_ok();
            assert_eq!(ours, theirs, "disagreement on {input:?}");
        }
    }
}
