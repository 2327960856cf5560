//! Validate command: the pipeline step itself.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use serde::Serialize;
use tracing::{debug, instrument};

use semcheck_core::action::{self, ActionError, ActionResult, Outcome, VERSION_INPUT};
use semcheck_core::config::Config;
use semcheck_core::output::{GithubOutputFile, MemorySink, OutputSink, WriterSink};
use semcheck_core::platform::{self, CiEnvironment};
use semcheck_core::version::{ParseOptions, Version};

use crate::console::{Console, Target};

/// Arguments for the `validate` subcommand.
#[derive(Args, Debug, Default)]
pub struct ValidateArgs {
    /// Version to validate (default: the `version` step input, $INPUT_VERSION)
    #[arg(value_name = "VERSION")]
    pub version: Option<String>,

    /// Reject a leading `v`; accept bare semver only
    #[arg(long)]
    pub strict: bool,

    /// Append outputs to FILE instead of printing them
    #[arg(long, value_name = "FILE", env = "GITHUB_OUTPUT")]
    pub output_file: Option<PathBuf>,
}

/// `--json` rendering of the three outputs.
#[derive(Serialize)]
struct JsonOutputs<'a> {
    is_valid: bool,
    parsed_version: Option<&'a Version>,
    error_message: String,
}

impl<'a> JsonOutputs<'a> {
    fn from_result(result: &'a ActionResult<Outcome>) -> Self {
        match result {
            Ok(Outcome::Valid { version, .. }) => Self {
                is_valid: true,
                parsed_version: Some(version),
                error_message: String::new(),
            },
            Ok(Outcome::Invalid(err)) => Self::failure(err.to_string()),
            Err(err) => Self::failure(err.to_string()),
        }
    }

    fn failure(error_message: String) -> Self {
        Self {
            is_valid: false,
            parsed_version: None,
            error_message,
        }
    }
}

/// Validate the version input and publish `is_valid`, `parsed_version`
/// and `error_message`.
///
/// Outputs go to `--output-file` / `GITHUB_OUTPUT` when set, otherwise to
/// stdout (`key=value` lines, or one JSON object with `--json`).
///
/// # Errors
///
/// Fails when the input is missing or outputs cannot be written. An
/// invalid version is not an error.
#[instrument(name = "cmd_validate", skip_all, fields(json_output = global_json))]
pub fn cmd_validate(
    args: ValidateArgs,
    global_json: bool,
    config: &Config,
    ci: &CiEnvironment,
) -> anyhow::Result<()> {
    let options = if args.strict {
        ParseOptions::strict()
    } else {
        config.parse_options()
    };
    let output_file = output_file(&args);
    let input = args
        .version
        .or_else(|| platform::get_input(VERSION_INPUT));

    debug!(
        input = ?input,
        output_file = ?output_file,
        allow_v_prefix = options.allow_v_prefix,
        "executing validate command"
    );

    let result = match output_file {
        Some(path) => {
            let path = utf8_output_path(path)?;
            let console = Console::new(Target::Stdout, ci.github_actions);
            let mut sink = GithubOutputFile::new(path);
            run_step(&console, input.as_deref(), &options, &mut sink)
        }
        None => {
            let console = Console::new(Target::Stderr, ci.github_actions);
            let mut recorded = MemorySink::new();
            let result = run_step(&console, input.as_deref(), &options, &mut recorded);
            print_outputs(&recorded, &result, global_json)?;
            result
        }
    };

    // Reported verbatim: the message is what the pipeline shows for the step.
    result.map(drop).map_err(anyhow::Error::from)
}

fn run_step(
    console: &Console,
    input: Option<&str>,
    options: &ParseOptions,
    sink: &mut dyn OutputSink,
) -> ActionResult<Outcome> {
    if let Some(input) = input.filter(|s| !s.is_empty()) {
        console.info(&format!("Validating version: '{input}'"));
    }

    let result = action::run(input, options, sink);
    match &result {
        Ok(Outcome::Valid { version, parsed }) => {
            console.info(&format!("Version '{}' is a valid semver", version.raw()));
            console.info(&format!("Parsed version: {parsed}"));
        }
        Ok(Outcome::Invalid(err)) => console.warning(&err.to_string()),
        Err(err @ ActionError::MissingInput { .. }) => console.error(&err.to_string()),
        Err(err) => console.error(&format!("Failed to publish outputs: {err}")),
    }
    result
}

/// Publish best-effort failure outputs for a run that stopped before the
/// step itself ran (bad configuration, unusable `--chdir`, logging setup).
///
/// Outputs go where [`cmd_validate`] would have sent them. Write failures
/// are ignored; the caller still reports `err` and exits non-zero.
pub fn publish_setup_failure(args: &ValidateArgs, global_json: bool, err: &anyhow::Error) {
    let message = format!("{err:#}");
    let ci = CiEnvironment::detect();

    match output_file(args) {
        Some(path) => {
            Console::new(Target::Stdout, ci.github_actions).error(&message);
            match utf8_output_path(path) {
                Ok(path) => {
                    let mut sink = GithubOutputFile::new(path);
                    action::publish_failure(&mut sink, &message);
                    debug!(path = %sink.path(), "setup failure published");
                }
                Err(path_err) => debug!(error = %path_err, "setup failure not published"),
            }
        }
        None => {
            Console::new(Target::Stderr, ci.github_actions).error(&message);
            if global_json {
                let outputs = JsonOutputs::failure(message);
                if let Ok(json) = serde_json::to_string_pretty(&outputs) {
                    println!("{json}");
                }
            } else {
                action::publish_failure(&mut WriterSink::stdout(), &message);
            }
        }
    }
}

fn output_file(args: &ValidateArgs) -> Option<PathBuf> {
    args.output_file
        .clone()
        .filter(|path| !path.as_os_str().is_empty())
}

fn utf8_output_path(path: PathBuf) -> anyhow::Result<camino::Utf8PathBuf> {
    camino::Utf8PathBuf::try_from(path).map_err(|e| {
        anyhow::anyhow!(
            "output file path is not valid UTF-8: {}",
            e.into_path_buf().display()
        )
    })
}

fn print_outputs(
    recorded: &MemorySink,
    result: &ActionResult<Outcome>,
    global_json: bool,
) -> anyhow::Result<()> {
    if global_json {
        let outputs = JsonOutputs::from_result(result);
        println!("{}", serde_json::to_string_pretty(&outputs)?);
    } else {
        recorded
            .replay(&mut WriterSink::stdout())
            .context("failed to print outputs")?;
    }
    Ok(())
}
