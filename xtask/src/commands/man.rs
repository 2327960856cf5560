use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;

#[derive(Args, Debug)]
pub struct ManArgs {
    /// Output directory (default: dist/share/man/man1)
    #[arg(long = "out-dir", default_value = "dist/share/man/man1")]
    pub out_dir: PathBuf,
}

pub fn cmd_man(args: ManArgs) -> Result<(), String> {
    let out_dir = crate::workspace_root().join(args.out_dir);
    fs::create_dir_all(&out_dir).map_err(|e| format!("{}: {e}", out_dir.display()))?;

    let cmd = semcheck::command();
    write_page(&cmd, &out_dir.join("semcheck.1"))?;

    // One page per subcommand: semcheck-validate.1, semcheck-info.1
    for subcommand in cmd.get_subcommands() {
        let page = out_dir.join(format!("semcheck-{}.1", subcommand.get_name()));
        write_page(subcommand, &page)?;
    }

    Ok(())
}

fn write_page(cmd: &clap::Command, path: &Path) -> Result<(), String> {
    let mut buffer: Vec<u8> = Vec::new();
    clap_mangen::Man::new(cmd.clone())
        .render(&mut buffer)
        .map_err(|e| format!("render {}: {e}", path.display()))?;
    fs::write(path, buffer).map_err(|e| format!("{}: {e}", path.display()))?;
    println!("wrote {}", path.display());
    Ok(())
}
