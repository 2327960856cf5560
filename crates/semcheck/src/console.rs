//! Human-facing step messages.
//!
//! These lines are for people reading the job log; scripts consume the step
//! outputs instead. When stdout carries the outputs, messages go to stderr.
//! Inside GitHub Actions, warnings and errors are written as workflow-command
//! annotations so they show up on the run summary.

use owo_colors::{OwoColorize, Stream};
use semcheck_core::annotation::{self, Level};

/// Where console messages are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Standard output.
    Stdout,
    /// Standard error.
    Stderr,
}

impl Target {
    const fn stream(self) -> Stream {
        match self {
            Self::Stdout => Stream::Stdout,
            Self::Stderr => Stream::Stderr,
        }
    }
}

/// Writes step messages.
#[derive(Debug, Clone, Copy)]
pub struct Console {
    target: Target,
    annotate: bool,
}

impl Console {
    /// `annotate` selects workflow-command syntax for warnings and errors.
    pub const fn new(target: Target, annotate: bool) -> Self {
        Self { target, annotate }
    }

    /// A plain informational line.
    pub fn info(&self, message: &str) {
        self.line(message);
    }

    /// A warning line.
    pub fn warning(&self, message: &str) {
        self.line(&self.render(Level::Warning, message));
    }

    /// An error line.
    pub fn error(&self, message: &str) {
        self.line(&self.render(Level::Error, message));
    }

    fn render(&self, level: Level, message: &str) -> String {
        if self.annotate {
            return annotation::format_annotation(level, message);
        }
        let stream = self.target.stream();
        let label = format!("{level}:");
        let label = match level {
            Level::Error => label
                .if_supports_color(stream, |t| t.red().bold().to_string())
                .to_string(),
            Level::Warning => label
                .if_supports_color(stream, |t| t.yellow().bold().to_string())
                .to_string(),
        };
        format!("{label} {message}")
    }

    fn line(&self, text: &str) {
        match self.target {
            Target::Stdout => println!("{text}"),
            Target::Stderr => eprintln!("{text}"),
        }
    }
}
