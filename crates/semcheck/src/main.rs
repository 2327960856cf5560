//! semcheck CLI
#![deny(unsafe_code)]

use anyhow::Context;
use clap::Parser;
use semcheck::{Cli, Commands, commands};
use semcheck_core::config::{Config, ConfigLoader};
use semcheck_core::platform::CiEnvironment;
use tracing::debug;

mod observability;

/// Everything resolved before a subcommand runs.
struct Session {
    cwd: camino::Utf8PathBuf,
    config: Config,
    ci: CiEnvironment,
    _guard: observability::ObservabilityGuard,
}

impl Session {
    fn start(cli: &Cli) -> anyhow::Result<Self> {
        if let Some(ref dir) = cli.chdir {
            std::env::set_current_dir(dir)
                .with_context(|| format!("failed to change directory to {}", dir.display()))?;
        }

        let cwd = std::env::current_dir().context("failed to determine current directory")?;
        let cwd = camino::Utf8PathBuf::try_from(cwd).map_err(|e| {
            anyhow::anyhow!(
                "current directory is not valid UTF-8: {}",
                e.into_path_buf().display()
            )
        })?;
        let mut loader = ConfigLoader::new().with_project_search(&cwd);
        if let Some(ref config_path) = cli.config {
            let config_path = camino::Utf8PathBuf::try_from(config_path.clone()).map_err(|e| {
                anyhow::anyhow!(
                    "config path is not valid UTF-8: {}",
                    e.into_path_buf().display()
                )
            })?;
            loader = loader.with_file(&config_path);
        }
        let config = loader.load().context("failed to load configuration")?;
        let ci = CiEnvironment::detect();

        let obs_config = observability::ObservabilityConfig::new(
            config.log_dir.as_ref().map(|dir| dir.clone().into_std_path_buf()),
            ci.runner_temp.as_ref().map(|dir| dir.clone().into_std_path_buf()),
        );
        let env_filter =
            observability::env_filter(cli.quiet, cli.verbose, config.log_level.as_str());
        let guard = observability::init_observability(&obs_config, env_filter)
            .context("failed to initialize logging/tracing")?;

        Ok(Self {
            cwd,
            config,
            ci,
            _guard: guard,
        })
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    cli.color.apply();

    let session = match Session::start(&cli) {
        Ok(session) => session,
        Err(err) => {
            // Later steps read the outputs even when this one fails.
            if let Commands::Validate(ref args) = cli.command {
                commands::validate::publish_setup_failure(args, cli.json, &err);
            }
            return Err(err);
        }
    };

    debug!(
        verbose = cli.verbose,
        quiet = cli.quiet,
        json = cli.json,
        color = ?cli.color,
        chdir = ?cli.chdir,
        github_actions = session.ci.github_actions,
        "CLI initialized"
    );

    let result = match cli.command {
        Commands::Validate(args) => {
            commands::validate::cmd_validate(args, cli.json, &session.config, &session.ci)
        }
        Commands::Info(args) => commands::info::cmd_info(
            args,
            cli.json,
            &session.config,
            &session.ci,
            &session.cwd,
        ),
    };
    if let Err(ref err) = result {
        tracing::error!(error = %err, "fatal error");
    }
    result
}
