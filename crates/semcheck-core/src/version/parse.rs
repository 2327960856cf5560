//! Single-pass grammar matching for `MAJOR.MINOR.PATCH[-PRERELEASE][+BUILD]`.

use std::fmt;

use thiserror::Error;

/// One of the three numeric components of a version core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    /// `X` in `X.Y.Z`.
    Major,
    /// `Y` in `X.Y.Z`.
    Minor,
    /// `Z` in `X.Y.Z`.
    Patch,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Major => write!(f, "major"),
            Self::Minor => write!(f, "minor"),
            Self::Patch => write!(f, "patch"),
        }
    }
}

/// One of the two dot-separated identifier sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    /// The `-` suffix.
    Prerelease,
    /// The `+` suffix.
    Build,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prerelease => write!(f, "prerelease"),
            Self::Build => write!(f, "build metadata"),
        }
    }
}

/// Why a string does not match the semver grammar.
///
/// This never reaches pipeline outputs; it exists so logs can say which rule
/// rejected the input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    /// Nothing left to parse.
    #[error("empty input")]
    Empty,

    /// The core did not split into exactly three components.
    #[error("expected MAJOR.MINOR.PATCH, found {0} component(s)")]
    ComponentCount(usize),

    /// A numeric component had no digits.
    #[error("{0} version is empty")]
    EmptyComponent(Component),

    /// A numeric component contained something other than ASCII digits.
    #[error("unexpected character {found:?} in {component} version")]
    NonDigit {
        /// Component being parsed.
        component: Component,
        /// First offending character.
        found: char,
    },

    /// A numeric component was written with a leading zero.
    #[error("{0} version has a leading zero")]
    LeadingZero(Component),

    /// A numeric component does not fit in a `u64`.
    #[error("{0} version does not fit in 64 bits")]
    Overflow(Component),

    /// Two dots in a row, or a dangling `-`, `+` or `.`.
    #[error("empty {0} identifier")]
    EmptyIdentifier(Section),

    /// An identifier contained something outside `[0-9A-Za-z-]`.
    #[error("unexpected character {found:?} in {section} identifier")]
    InvalidCharacter {
        /// Section being parsed.
        section: Section,
        /// First offending character.
        found: char,
    },

    /// The input is longer than [`super::MAX_LENGTH`] bytes.
    #[error("input is {0} bytes long, limit is {limit}", limit = super::MAX_LENGTH)]
    TooLong(usize),

    /// A purely numeric prerelease identifier such as `01`.
    #[error("numeric prerelease identifier {0:?} has a leading zero")]
    PrereleaseLeadingZero(String),
}

/// Borrowed pieces of a string that matched the grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Parts<'a> {
    pub(crate) major: u64,
    pub(crate) minor: u64,
    pub(crate) patch: u64,
    pub(crate) prerelease: Option<&'a str>,
    pub(crate) build: Option<&'a str>,
}

/// Match `text` against the grammar. Any `v` prefix must already be removed.
pub(crate) fn parse(text: &str) -> Result<Parts<'_>, SyntaxError> {
    if text.is_empty() {
        return Err(SyntaxError::Empty);
    }

    // Build metadata may contain '-', so it is split off first.
    let (rest, build) = match text.split_once('+') {
        Some((rest, build)) => (rest, Some(build)),
        None => (text, None),
    };
    let (core, prerelease) = match rest.split_once('-') {
        Some((core, pre)) => (core, Some(pre)),
        None => (rest, None),
    };

    let (major, minor, patch) = parse_core(core)?;
    if let Some(pre) = prerelease {
        check_identifiers(pre, Section::Prerelease)?;
    }
    if let Some(build) = build {
        check_identifiers(build, Section::Build)?;
    }

    Ok(Parts {
        major,
        minor,
        patch,
        prerelease,
        build,
    })
}

fn parse_core(core: &str) -> Result<(u64, u64, u64), SyntaxError> {
    let pieces: Vec<&str> = core.split('.').collect();
    let [major, minor, patch] = pieces.as_slice() else {
        return Err(SyntaxError::ComponentCount(pieces.len()));
    };

    Ok((
        parse_numeric(major, Component::Major)?,
        parse_numeric(minor, Component::Minor)?,
        parse_numeric(patch, Component::Patch)?,
    ))
}

fn parse_numeric(digits: &str, component: Component) -> Result<u64, SyntaxError> {
    if digits.is_empty() {
        return Err(SyntaxError::EmptyComponent(component));
    }
    if let Some(found) = digits.chars().find(|c| !c.is_ascii_digit()) {
        return Err(SyntaxError::NonDigit { component, found });
    }
    if digits.len() > 1 && digits.starts_with('0') {
        return Err(SyntaxError::LeadingZero(component));
    }
    // Only overflow can fail here: the string is non-empty ASCII digits.
    digits
        .parse::<u64>()
        .map_err(|_| SyntaxError::Overflow(component))
}

fn check_identifiers(section_text: &str, section: Section) -> Result<(), SyntaxError> {
    for ident in section_text.split('.') {
        if ident.is_empty() {
            return Err(SyntaxError::EmptyIdentifier(section));
        }
        if let Some(found) = ident
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-'))
        {
            return Err(SyntaxError::InvalidCharacter { section, found });
        }
        if section == Section::Prerelease
            && ident.len() > 1
            && ident.starts_with('0')
            && ident.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(SyntaxError::PrereleaseLeadingZero(ident.to_string()));
        }
    }
    Ok(())
}
