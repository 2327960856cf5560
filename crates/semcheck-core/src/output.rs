//! Step outputs.
//!
//! A pipeline step publishes its results as key/value pairs. [`OutputSink`]
//! is the only thing the action runner needs; where the pairs end up is the
//! sink's business:
//!
//! - [`GithubOutputFile`] appends to the file GitHub Actions names in
//!   `GITHUB_OUTPUT`.
//! - [`WriterSink`] writes the same format to any [`Write`] (stdout when the
//!   step runs outside a pipeline).
//! - [`MemorySink`] keeps the pairs in memory.
//!
//! # File format
//!
//! Single-line values are written as `key=value`. Values with line breaks use
//! the heredoc form, with a delimiter that occurs in neither key nor value:
//!
//! ```text
//! key<<ghadelimiter
//! first line
//! second line
//! ghadelimiter
//! ```

use std::fs::OpenOptions;
use std::io::{self, Write};

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;
use tracing::debug;

/// Environment variable holding the output file path inside GitHub Actions.
pub const GITHUB_OUTPUT_ENV: &str = "GITHUB_OUTPUT";

const DELIMITER_BASE: &str = "ghadelimiter";

/// Errors from writing outputs.
#[derive(Error, Debug)]
pub enum OutputError {
    /// The destination could not be opened or written.
    #[error("failed to write output to {destination}: {source}")]
    Io {
        /// File path or stream name.
        destination: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The key cannot be represented in the output format.
    #[error("invalid output key {0:?}")]
    InvalidKey(String),
}

/// Result alias for output operations.
pub type OutputResult<T> = Result<T, OutputError>;

/// Destination for step outputs.
pub trait OutputSink {
    /// Publish one key/value pair.
    fn emit(&mut self, key: &str, value: &str) -> OutputResult<()>;
}

impl<S: OutputSink + ?Sized> OutputSink for &mut S {
    fn emit(&mut self, key: &str, value: &str) -> OutputResult<()> {
        (**self).emit(key, value)
    }
}

/// Render one entry in the output file format, trailing newline included.
pub fn format_entry(key: &str, value: &str) -> OutputResult<String> {
    if key.is_empty() || key.contains(['=', '\n', '\r']) || key.contains("<<") {
        return Err(OutputError::InvalidKey(key.to_string()));
    }

    if !value.contains(['\n', '\r']) {
        return Ok(format!("{key}={value}\n"));
    }

    let delimiter = heredoc_delimiter(key, value);
    Ok(format!("{key}<<{delimiter}\n{value}\n{delimiter}\n"))
}

fn heredoc_delimiter(key: &str, value: &str) -> String {
    let mut delimiter = DELIMITER_BASE.to_string();
    let mut suffix = 0u32;
    while key.contains(&delimiter) || value.contains(&delimiter) {
        suffix += 1;
        delimiter = format!("{DELIMITER_BASE}_{suffix}");
    }
    delimiter
}

// ============================================================================
// GitHub Actions output file
// ============================================================================

/// Appends outputs to a GitHub Actions output file.
///
/// The file is opened in append mode for every entry, so entries written
/// by earlier steps or other tools are preserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GithubOutputFile {
    path: Utf8PathBuf,
}

impl GithubOutputFile {
    /// Write to an explicit path.
    pub fn new<P: Into<Utf8PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// The output file path.
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> OutputError {
        OutputError::Io {
            destination: self.path.to_string(),
            source,
        }
    }
}

impl OutputSink for GithubOutputFile {
    fn emit(&mut self, key: &str, value: &str) -> OutputResult<()> {
        let entry = format_entry(key, value)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_error(e))?;
        file.write_all(entry.as_bytes())
            .map_err(|e| self.io_error(e))?;
        debug!(key, path = %self.path, "output written");
        Ok(())
    }
}

// ============================================================================
// Generic writer
// ============================================================================

/// Writes outputs in the file format to any writer.
#[derive(Debug)]
pub struct WriterSink<W> {
    writer: W,
    name: String,
}

impl<W: Write> WriterSink<W> {
    /// Wrap `writer`; `name` identifies it in error messages.
    pub fn new<N: Into<String>>(writer: W, name: N) -> Self {
        Self {
            writer,
            name: name.into(),
        }
    }

    /// Recover the wrapped writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl WriterSink<io::Stdout> {
    /// Write outputs to standard output.
    pub fn stdout() -> Self {
        Self::new(io::stdout(), "stdout")
    }
}

impl<W: Write> OutputSink for WriterSink<W> {
    fn emit(&mut self, key: &str, value: &str) -> OutputResult<()> {
        let entry = format_entry(key, value)?;
        self.writer
            .write_all(entry.as_bytes())
            .and_then(|()| self.writer.flush())
            .map_err(|source| OutputError::Io {
                destination: self.name.clone(),
                source,
            })
    }
}

// ============================================================================
// In-memory recorder
// ============================================================================

/// Records outputs in emission order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemorySink {
    entries: Vec<(String, String)>,
}

impl MemorySink {
    /// An empty recorder.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// All recorded pairs, in emission order.
    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    /// The last value emitted for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Re-emit every recorded pair into another sink.
    pub fn replay<S: OutputSink + ?Sized>(&self, sink: &mut S) -> OutputResult<()> {
        for (key, value) in &self.entries {
            sink.emit(key, value)?;
        }
        Ok(())
    }
}

impl OutputSink for MemorySink {
    fn emit(&mut self, key: &str, value: &str) -> OutputResult<()> {
        // Same key rules as the file format, so tests catch bad keys.
        format_entry(key, value)?;
        self.entries.push((key.to_string(), value.to_string()));
        Ok(())
    }
}
