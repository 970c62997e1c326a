//! `dpt init` command - Initialize a new workspace

use console::style;
use miette::Result;
use std::path::PathBuf;

use crate::core::workspace::Workspace;

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (default: current directory)
    pub path: Option<PathBuf>,
}

pub fn run(args: InitArgs) -> Result<()> {
    let path = match args.path {
        Some(path) => {
            std::fs::create_dir_all(&path).map_err(|e| miette::miette!("{}", e))?;
            path
        }
        None => std::env::current_dir().map_err(|e| miette::miette!("{}", e))?,
    };

    let workspace = Workspace::init(&path).map_err(|e| miette::miette!("{}", e))?;

    println!(
        "{} Workspace creado en {}",
        style("✓").green(),
        workspace.root().display()
    );
    println!(
        "  Configure la URL del backend en {} o vía DPT_API_URL.",
        style(workspace.config_path().display()).cyan()
    );
    Ok(())
}
