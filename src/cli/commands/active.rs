//! `dpt active` command - Inspect or clear the stored active query

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::commands::{open_gateway, open_session};
use crate::cli::{render, GlobalOpts};
use crate::core::gateway::ActiveQueryGateway;

#[derive(Subcommand, Debug)]
pub enum ActiveCommands {
    /// Show the stored active query and its results
    Show,

    /// Clear the stored active query
    Clear,
}

pub fn run(cmd: ActiveCommands, global: &GlobalOpts) -> Result<()> {
    let session = open_session(global)?;
    let Some(gateway) = open_gateway(&session.config) else {
        return Err(miette::miette!(
            "No hay backend configurado. Defina api_url en la configuración o DPT_API_URL."
        ));
    };

    match cmd {
        ActiveCommands::Show => {
            let snapshot = gateway.load().map_err(|e| miette::miette!("{}", e))?;
            match snapshot {
                None => {
                    println!("No hay ninguna consulta guardada para este usuario.");
                }
                Some(snapshot) => {
                    if !global.quiet {
                        println!(
                            "{} {}",
                            style("Tipo de consulta:").bold(),
                            snapshot.query_type
                        );
                        if let (Some(start), Some(end)) =
                            (&snapshot.start_date, &snapshot.end_date)
                        {
                            println!("{} {} - {}", style("Rango:").bold(), start, end);
                        }
                        println!();
                    }
                    render::render_result(&snapshot.results_data, global.format, global.quiet);
                }
            }
        }
        ActiveCommands::Clear => {
            gateway.clear().map_err(|e| miette::miette!("{}", e))?;
            println!("{} Consulta activa limpiada.", style("✓").green());
        }
    }
    Ok(())
}
