//! GitHub Actions workflow-command annotations (`::warning::…`).

use std::fmt;

/// Annotation severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// `::warning::`
    Warning,
    /// `::error::`
    Error,
}

impl Level {
    /// Workflow command name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Render a workflow command line such as `::warning::message`.
///
/// The message is escaped so that it stays on one line.
pub fn format_annotation(level: Level, message: &str) -> String {
    format!("::{level}::{}", escape_data(message))
}

/// Escape command data: `%`, `\r` and `\n` become `%25`, `%0D`, `%0A`.
pub fn escape_data(message: &str) -> String {
    message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}
