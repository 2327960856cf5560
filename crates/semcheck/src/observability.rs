//! Observability setup: structured JSONL logging.
//!
//! Logs never go to stdout. stdout may carry step outputs (`key=value` lines
//! or JSON), so log records go to a file or, failing that, to stderr.
//!
//! Log file resolution, first match wins:
//! 1. `SEMCHECK_LOG_PATH` (full file path)
//! 2. `SEMCHECK_LOG_DIR`
//! 3. `log_dir` from configuration
//! 4. `$RUNNER_TEMP/semcheck` inside a CI runner
//! 5. `/var/log` (unix), then the platform data-local directory

use anyhow::Result;
use serde_json::{Map, Value};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::Event;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::layer::{Context as LayerContext, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;

const ENV_LOG_PATH: &str = "SEMCHECK_LOG_PATH";
const ENV_LOG_DIR: &str = "SEMCHECK_LOG_DIR";
const DEFAULT_LOG_DIR_UNIX: &str = "/var/log";
const LOG_FILE_SUFFIX: &str = ".jsonl";

/// Configuration for observability setup.
#[derive(Clone, Debug)]
pub struct ObservabilityConfig {
    /// Service name; also the log file stem.
    pub service: String,
    /// Directory from configuration.
    pub log_dir: Option<PathBuf>,
    /// CI runner temp directory (`RUNNER_TEMP`).
    pub runner_temp: Option<PathBuf>,
}

impl ObservabilityConfig {
    /// Build from configuration values; env overrides are read at init time.
    pub fn new(log_dir: Option<PathBuf>, runner_temp: Option<PathBuf>) -> Self {
        Self {
            service: env!("CARGO_PKG_NAME").to_string(),
            log_dir,
            runner_temp,
        }
    }
}

/// Keeps the background log writer alive; drop it last.
pub struct ObservabilityGuard {
    _log_guard: WorkerGuard,
}

/// Install the global subscriber.
///
/// Falls back to stderr when no log file location is writable.
pub fn init_observability(
    cfg: &ObservabilityConfig,
    env_filter: EnvFilter,
) -> Result<ObservabilityGuard> {
    let sources = LogSources {
        path_override: std::env::var_os(ENV_LOG_PATH).map(PathBuf::from),
        dir_override: std::env::var_os(ENV_LOG_DIR).map(PathBuf::from),
        config_dir: cfg.log_dir.clone(),
        runner_temp: cfg.runner_temp.clone(),
    };

    let (log_writer, log_guard) = match sources.resolve(&cfg.service) {
        Ok(target) => target.writer(),
        Err(err) => {
            eprintln!("Warning: {err}. Falling back to stderr logging.");
            tracing_appender::non_blocking(std::io::stderr())
        }
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(JsonLogLayer::new(log_writer))
        .try_init()?;

    tracing::debug!("observability initialized");

    Ok(ObservabilityGuard {
        _log_guard: log_guard,
    })
}

/// Build an `EnvFilter` based on CLI flags and environment.
///
/// Priority: quiet flag > verbose flag > RUST_LOG env > default_level
pub fn env_filter(quiet: bool, verbose: u8, default_level: &str) -> EnvFilter {
    if quiet {
        return EnvFilter::new("error");
    }

    match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    }
}

// ============================================================================
// JSON Log Layer
// ============================================================================

struct JsonLogLayer<W> {
    writer: W,
}

impl<W> JsonLogLayer<W> {
    const fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<S, W> tracing_subscriber::Layer<S> for JsonLogLayer<W>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    W: for<'writer> tracing_subscriber::fmt::MakeWriter<'writer> + Send + Sync + 'static,
{
    fn on_new_span(
        &self,
        attrs: &tracing::span::Attributes<'_>,
        id: &tracing::span::Id,
        ctx: LayerContext<'_, S>,
    ) {
        if let Some(span) = ctx.span(id) {
            let mut visitor = JsonVisitor::default();
            attrs.record(&mut visitor);
            span.extensions_mut().insert(SpanFields(visitor.values));
        }
    }

    fn on_record(
        &self,
        id: &tracing::span::Id,
        values: &tracing::span::Record<'_>,
        ctx: LayerContext<'_, S>,
    ) {
        if let Some(span) = ctx.span(id) {
            let mut visitor = JsonVisitor::default();
            values.record(&mut visitor);
            let mut extensions = span.extensions_mut();
            match extensions.get_mut::<SpanFields>() {
                Some(fields) => fields.0.extend(visitor.values),
                None => extensions.insert(SpanFields(visitor.values)),
            }
        }
    }

    fn on_event(&self, event: &Event<'_>, ctx: LayerContext<'_, S>) {
        let metadata = event.metadata();
        let mut map = Map::new();
        map.insert("timestamp".to_string(), Value::String(format_timestamp()));
        map.insert(
            "level".to_string(),
            Value::String(metadata.level().as_str().to_lowercase()),
        );
        map.insert(
            "target".to_string(),
            Value::String(metadata.target().to_string()),
        );

        if let Some(scope) = ctx.event_scope(event) {
            for span in scope.from_root() {
                if let Some(fields) = span.extensions().get::<SpanFields>() {
                    map.extend(fields.0.clone());
                }
            }
        }

        let mut visitor = JsonVisitor::default();
        event.record(&mut visitor);
        map.extend(visitor.values);

        let mut writer = self.writer.make_writer();
        if serde_json::to_writer(&mut writer, &Value::Object(map)).is_ok() {
            let _ = writer.write_all(b"\n");
        }
    }
}

#[derive(Clone, Debug)]
struct SpanFields(Map<String, Value>);

#[derive(Default)]
struct JsonVisitor {
    values: Map<String, Value>,
}

impl JsonVisitor {
    fn put(&mut self, field: &tracing::field::Field, value: Value) {
        self.values.insert(field.name().to_string(), value);
    }
}

impl tracing::field::Visit for JsonVisitor {
    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.put(field, Value::Bool(value));
    }

    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.put(field, Value::Number(value.into()));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.put(field, Value::Number(value.into()));
    }

    fn record_f64(&mut self, field: &tracing::field::Field, value: f64) {
        if let Some(number) = serde_json::Number::from_f64(value) {
            self.put(field, Value::Number(number));
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.put(field, Value::String(value.to_string()));
    }

    fn record_error(
        &mut self,
        field: &tracing::field::Field,
        value: &(dyn std::error::Error + 'static),
    ) {
        self.put(field, Value::String(value.to_string()));
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.put(field, Value::String(format!("{value:?}")));
    }
}

/// RFC 3339 UTC timestamp with millisecond precision.
fn format_timestamp() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    let secs = now.as_secs();
    let secs_of_day = secs % 86400;
    let (year, month, day) = days_to_ymd((secs / 86400) as i64);

    format!(
        "{year:04}-{month:02}-{day:02}T{:02}:{:02}:{:02}.{:03}Z",
        secs_of_day / 3600,
        (secs_of_day % 3600) / 60,
        secs_of_day % 60,
        now.subsec_millis()
    )
}

/// Days since the Unix epoch to a civil (year, month, day), proleptic Gregorian.
const fn days_to_ymd(days: i64) -> (i32, u32, u32) {
    let z = days + 719468;
    let era = if z >= 0 { z } else { z - 146096 } / 146097;
    let doe = (z - era * 146097) as u32;
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365;
    let y = yoe as i64 + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = doy - (153 * mp + 2) / 5 + 1;
    let m = if mp < 10 { mp + 3 } else { mp - 9 };
    let y = if m <= 2 { y + 1 } else { y };
    (y as i32, m, d)
}

// ============================================================================
// Log Target Resolution
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
struct LogTarget {
    dir: PathBuf,
    file_name: String,
}

impl LogTarget {
    fn in_dir(dir: PathBuf, service: &str) -> Result<Self, String> {
        let target = Self {
            dir,
            file_name: format!("{service}{LOG_FILE_SUFFIX}"),
        };
        target.ensure_writable()?;
        Ok(target)
    }

    fn at_path(path: &Path) -> Result<Self, String> {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| format!("{ENV_LOG_PATH} must end in a UTF-8 file name"))?
            .to_string();
        let dir = path.parent().unwrap_or_else(|| Path::new(".")).to_path_buf();
        let target = Self { dir, file_name };
        target.ensure_writable()?;
        Ok(target)
    }

    fn path(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }

    fn ensure_writable(&self) -> Result<(), String> {
        std::fs::create_dir_all(&self.dir).map_err(|e| {
            format!("Failed to create log directory {}: {e}", self.dir.display())
        })?;
        let path = self.path();
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| format!("Failed to open log file {}: {e}", path.display()))?;
        Ok(())
    }

    fn writer(self) -> (NonBlocking, WorkerGuard) {
        let appender = tracing_appender::rolling::daily(&self.dir, &self.file_name);
        tracing_appender::non_blocking(appender)
    }
}

/// Candidate log locations, env lookups already done.
#[derive(Debug, Default)]
struct LogSources {
    path_override: Option<PathBuf>,
    dir_override: Option<PathBuf>,
    config_dir: Option<PathBuf>,
    runner_temp: Option<PathBuf>,
}

impl LogSources {
    fn resolve(self, service: &str) -> Result<LogTarget, String> {
        if let Some(path) = self.path_override {
            return LogTarget::at_path(&path);
        }
        if let Some(dir) = self.dir_override.or(self.config_dir) {
            return LogTarget::in_dir(dir, service);
        }

        // Never the working directory: in CI that is the checked-out repo.
        let mut candidates = Vec::new();
        if let Some(temp) = self.runner_temp {
            candidates.push(temp.join(service));
        }
        if cfg!(unix) {
            candidates.push(PathBuf::from(DEFAULT_LOG_DIR_UNIX));
        }
        if let Some(proj_dirs) = directories::ProjectDirs::from("", "", service) {
            candidates.push(proj_dirs.data_local_dir().join("logs"));
        }

        candidates
            .into_iter()
            .find_map(|dir| LogTarget::in_dir(dir, service).ok())
            .ok_or_else(|| "No writable log directory found".to_string())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn quiet_overrides_everything() {
        assert_eq!(env_filter(true, 2, "info").to_string(), "error");
    }

    #[test]
    fn verbose_maps_to_debug_and_trace() {
        assert_eq!(env_filter(false, 1, "info").to_string(), "debug");
        assert_eq!(env_filter(false, 3, "info").to_string(), "trace");
    }

    #[test]
    fn path_override_wins() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("custom.jsonl");
        let sources = LogSources {
            path_override: Some(file.clone()),
            dir_override: Some(tmp.path().join("ignored")),
            ..LogSources::default()
        };

        let target = sources.resolve("demo").unwrap();
        assert_eq!(target.path(), file);
        assert!(file.exists());
    }

    #[test]
    fn dir_override_beats_config_dir() {
        let tmp = TempDir::new().unwrap();
        let sources = LogSources {
            dir_override: Some(tmp.path().join("env")),
            config_dir: Some(tmp.path().join("config")),
            ..LogSources::default()
        };

        let target = sources.resolve("demo").unwrap();
        assert_eq!(target.dir, tmp.path().join("env"));
        assert_eq!(target.file_name, "demo.jsonl");
    }

    #[test]
    fn config_dir_is_used_without_env() {
        let tmp = TempDir::new().unwrap();
        let sources = LogSources {
            config_dir: Some(tmp.path().to_path_buf()),
            ..LogSources::default()
        };
        assert_eq!(sources.resolve("demo").unwrap().dir, tmp.path());
    }

    #[test]
    fn runner_temp_is_first_fallback() {
        let tmp = TempDir::new().unwrap();
        let sources = LogSources {
            runner_temp: Some(tmp.path().to_path_buf()),
            ..LogSources::default()
        };

        let target = sources.resolve("demo").unwrap();
        assert_eq!(target.dir, tmp.path().join("demo"));
    }

    #[test]
    fn unwritable_path_override_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("file");
        std::fs::write(&blocker, "").unwrap();
        let sources = LogSources {
            path_override: Some(blocker.join("nested.jsonl")),
            ..LogSources::default()
        };
        assert!(sources.resolve("demo").is_err());
    }

    #[test]
    fn timestamp_shape() {
        let ts = format_timestamp();
        assert_eq!(ts.len(), 24, "{ts}");
        assert!(ts.ends_with('Z'));
        assert_eq!(&ts[4..5], "-");
        assert_eq!(&ts[10..11], "T");
        assert_eq!(&ts[19..20], ".");
    }

    #[test]
    fn civil_dates() {
        assert_eq!(days_to_ymd(0), (1970, 1, 1));
        assert_eq!(days_to_ymd(19782), (2024, 2, 29));
        assert_eq!(days_to_ymd(-1), (1969, 12, 31));
    }
}
