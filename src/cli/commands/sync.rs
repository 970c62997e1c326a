//! `dpt sync` command - Mirror collections from the backend

use console::style;
use miette::Result;
use std::str::FromStr;

use crate::cli::commands::{open_session, remote_client};
use crate::cli::GlobalOpts;
use crate::core::store::MirrorStore;
use crate::entities::CollectionKind;

#[derive(clap::Args, Debug)]
pub struct SyncArgs {
    /// Sync only one collection (stock, proveedores, ventas, compras,
    /// pedidos, movimientos-caja)
    #[arg(long, short = 'c', value_parser = CollectionKind::from_str)]
    pub collection: Option<CollectionKind>,
}

pub fn run(args: SyncArgs, global: &GlobalOpts) -> Result<()> {
    let session = open_session(global)?;
    let Some(remote) = remote_client(&session.config)? else {
        return Err(miette::miette!(
            "No hay backend configurado. Defina api_url en la configuración o DPT_API_URL."
        ));
    };
    let store =
        MirrorStore::open(&session.workspace, None).map_err(|e| miette::miette!("{}", e))?;

    let kinds: Vec<CollectionKind> = match args.collection {
        Some(kind) => vec![kind],
        None => CollectionKind::ALL.to_vec(),
    };

    for kind in kinds {
        match remote.fetch_collection(kind) {
            Ok(records) => {
                let outcome = store
                    .replace_collection(kind, &records)
                    .map_err(|e| miette::miette!("{}", e))?;
                let note = if outcome.changed { "actualizada" } else { "sin cambios" };
                println!(
                    "{} {:<17} {:>5} registros ({})",
                    style("✓").green(),
                    kind.to_string(),
                    outcome.records,
                    note
                );
            }
            Err(err) => {
                println!(
                    "{} {:<17} {}",
                    style("✗").red(),
                    kind.to_string(),
                    style(err).red()
                );
            }
        }
    }
    Ok(())
}
