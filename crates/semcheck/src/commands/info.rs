//! Info command: package, configuration and CI environment details.

use clap::Args;
use owo_colors::{OwoColorize, Stream};
use serde::Serialize;
use tracing::{debug, instrument};

use semcheck_core::action::VERSION_INPUT;
use semcheck_core::config::{self, Config};
use semcheck_core::platform::{self, CiEnvironment};

/// Arguments for the `info` subcommand.
#[derive(Args, Debug, Default)]
pub struct InfoArgs {
    // No subcommand-specific arguments; uses global --json flag
}

#[derive(Serialize)]
struct PackageInfo {
    name: &'static str,
    version: &'static str,
    #[serde(skip_serializing_if = "str::is_empty")]
    description: &'static str,
    #[serde(skip_serializing_if = "str::is_empty")]
    repository: &'static str,
    #[serde(skip_serializing_if = "str::is_empty")]
    license: &'static str,
}

impl PackageInfo {
    const fn new() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            description: env!("CARGO_PKG_DESCRIPTION"),
            repository: env!("CARGO_PKG_REPOSITORY"),
            license: env!("CARGO_PKG_LICENSE"),
        }
    }
}

#[derive(Serialize)]
struct ConfigInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    config_file: Option<String>,
    log_level: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    log_dir: Option<String>,
    allow_v_prefix: bool,
}

impl ConfigInfo {
    fn from_config(config: &Config, cwd: &camino::Utf8Path) -> Self {
        Self {
            config_file: config::find_project_config(cwd).map(|p| p.to_string()),
            log_level: config.log_level.as_str(),
            log_dir: config.log_dir.as_ref().map(|p| p.to_string()),
            allow_v_prefix: config.parse_options().allow_v_prefix,
        }
    }
}

#[derive(Serialize)]
struct EnvVar {
    name: String,
    value: Option<String>,
    description: &'static str,
}

impl EnvVar {
    fn read(name: impl Into<String>, description: &'static str) -> Self {
        let name = name.into();
        let value = std::env::var(&name).ok();
        Self {
            name,
            value,
            description,
        }
    }
}

#[derive(Serialize)]
struct FullInfo {
    #[serde(flatten)]
    package: PackageInfo,
    config: ConfigInfo,
    ci: CiEnvironment,
    env_vars: Vec<EnvVar>,
}

fn relevant_env_vars() -> Vec<EnvVar> {
    vec![
        EnvVar::read(
            platform::input_env_var(VERSION_INPUT),
            "Version input when no argument is given",
        ),
        EnvVar::read("GITHUB_ACTIONS", "Enables workflow annotations"),
        EnvVar::read("GITHUB_OUTPUT", "Step output file"),
        EnvVar::read("RUNNER_TEMP", "Preferred log directory in CI"),
        EnvVar::read("RUST_LOG", "Log filter directive"),
        EnvVar::read("SEMCHECK_LOG_PATH", "Explicit log file path"),
        EnvVar::read("SEMCHECK_LOG_DIR", "Log directory"),
    ]
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

/// Print package, configuration and environment information.
///
/// # Arguments
/// * `global_json` - Global `--json` flag from CLI
/// * `config` - Loaded configuration
/// * `ci` - Detected CI environment
/// * `cwd` - Current working directory for config discovery
#[instrument(name = "cmd_info", skip_all, fields(json_output = global_json))]
pub fn cmd_info(
    _args: InfoArgs,
    global_json: bool,
    config: &Config,
    ci: &CiEnvironment,
    cwd: &camino::Utf8Path,
) -> anyhow::Result<()> {
    debug!("executing info command");

    let info = FullInfo {
        package: PackageInfo::new(),
        config: ConfigInfo::from_config(config, cwd),
        ci: ci.clone(),
        env_vars: relevant_env_vars(),
    };

    if global_json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    let out = Stream::Stdout;
    println!(
        "{} {}",
        info.package.name.if_supports_color(out, |t| t.bold()),
        info.package.version.if_supports_color(out, |t| t.green())
    );
    if !info.package.description.is_empty() {
        println!("{}", info.package.description);
    }
    if !info.package.license.is_empty() {
        println!("License: {}", info.package.license);
    }
    if !info.package.repository.is_empty() {
        println!("Repository: {}", info.package.repository);
    }

    println!();
    println!(
        "{}",
        "Configuration".if_supports_color(out, |t| t.underline())
    );
    match info.config.config_file {
        Some(ref path) => println!("  Config file: {path}"),
        None => println!("  Config file: none loaded"),
    }
    println!("  Log level: {}", info.config.log_level);
    if let Some(ref dir) = info.config.log_dir {
        println!("  Log directory: {dir}");
    }
    println!("  Accept v prefix: {}", yes_no(info.config.allow_v_prefix));

    println!();
    println!(
        "{}",
        "CI Environment".if_supports_color(out, |t| t.underline())
    );
    println!("  GitHub Actions: {}", yes_no(info.ci.github_actions));
    match info.ci.output_file {
        Some(ref path) => println!("  Output file: {path}"),
        None => println!("  Output file: none (outputs printed to stdout)"),
    }

    let set_vars: Vec<_> = info.env_vars.iter().filter(|v| v.value.is_some()).collect();
    if !set_vars.is_empty() {
        println!();
        println!(
            "{}",
            "Environment".if_supports_color(out, |t| t.underline())
        );
        for var in set_vars {
            println!(
                "  {}: {}",
                var.name,
                var.value.as_deref().unwrap_or_default()
            );
        }
    }

    Ok(())
}
