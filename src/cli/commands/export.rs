//! `dpt export` command - Export the stored active query as an artifact

use console::style;
use miette::Result;
use std::path::PathBuf;
use std::str::FromStr;

use crate::cli::commands::{open_gateway, open_session};
use crate::cli::GlobalOpts;
use crate::core::export::{self, ExportFormat};
use crate::core::gateway::ActiveQueryGateway;

#[derive(clap::Args, Debug)]
pub struct ExportArgs {
    /// Artifact format (json, csv, html)
    #[arg(default_value = "json", value_parser = ExportFormat::from_str)]
    pub format: ExportFormat,

    /// Output file (default: <tipo>_reporte.<ext>)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

pub fn run(args: ExportArgs, global: &GlobalOpts) -> Result<()> {
    let session = open_session(global)?;
    let Some(gateway) = open_gateway(&session.config) else {
        return Err(miette::miette!(
            "No hay backend configurado. Defina api_url en la configuración o DPT_API_URL."
        ));
    };

    let Some(snapshot) = gateway.load().map_err(|e| miette::miette!("{}", e))? else {
        return Err(miette::miette!(
            "No hay ninguna consulta guardada para exportar. Ejecute una consulta primero."
        ));
    };

    let artifact = export::export(&snapshot.query_type, &snapshot.results_data, args.format)
        .map_err(|e| miette::miette!("Error al exportar: {}", e))?;

    let path = args
        .output
        .unwrap_or_else(|| PathBuf::from(&artifact.file_name));
    std::fs::write(&path, &artifact.bytes)
        .map_err(|e| miette::miette!("Error al exportar: {}", e))?;

    println!(
        "{} Reporte exportado a {}",
        style("✓").green(),
        style(path.display()).cyan()
    );
    Ok(())
}
