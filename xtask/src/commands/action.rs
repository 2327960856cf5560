use std::fs;
use std::path::PathBuf;

use clap::Args;
use semcheck_core::action::{ERROR_MESSAGE, IS_VALID, PARSED_VERSION, VERSION_INPUT};
use semcheck_core::platform::input_env_var;

const STEP_ID: &str = "semcheck";

#[derive(Args, Debug)]
pub struct ActionArgs {
    /// Output file (default: action.yml at the workspace root)
    #[arg(long, default_value = "action.yml")]
    pub out: PathBuf,
}

/// Write the composite action metadata that wraps `semcheck validate`.
pub fn cmd_action(args: ActionArgs) -> Result<(), String> {
    let path = crate::workspace_root().join(args.out);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| format!("{}: {e}", parent.display()))?;
    }

    fs::write(&path, render()).map_err(|e| format!("{}: {e}", path.display()))?;
    println!("wrote {}", path.display());
    Ok(())
}

fn render() -> String {
    let outputs = [
        (IS_VALID, "Whether the version is valid semver (true/false)"),
        (PARSED_VERSION, "JSON object with the parsed version components"),
        (ERROR_MESSAGE, "Why validation failed; empty when valid"),
    ];

    let mut yaml = format!(
        "name: semcheck\n\
         description: {description}\n\
         inputs:\n  \
           {VERSION_INPUT}:\n    \
             description: Version string to validate\n    \
             required: true\n\
         outputs:\n",
        description = semcheck::command()
            .get_about()
            .map(ToString::to_string)
            .unwrap_or_default(),
    );
    for (key, description) in outputs {
        yaml.push_str(&format!(
            "  {key}:\n    description: {description}\n    \
             value: ${{{{ steps.{STEP_ID}.outputs.{key} }}}}\n"
        ));
    }
    yaml.push_str(&format!(
        "runs:\n  \
           using: composite\n  \
           steps:\n    \
             - id: {STEP_ID}\n      \
               shell: bash\n      \
               run: semcheck validate\n      \
               env:\n        \
                 {env}: ${{{{ inputs.{VERSION_INPUT} }}}}\n",
        env = input_env_var(VERSION_INPUT),
    ));
    yaml
}
