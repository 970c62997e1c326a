//! `dpt import` command - Seed the local mirror from a JSON file

use console::style;
use miette::Result;
use std::path::PathBuf;
use std::str::FromStr;

use crate::cli::commands::{open_session, open_store};
use crate::cli::GlobalOpts;
use crate::core::remote::extract_items;
use crate::entities::CollectionKind;

#[derive(clap::Args, Debug)]
pub struct ImportArgs {
    /// Target collection (stock, proveedores, ventas, compras, pedidos,
    /// movimientos-caja)
    #[arg(value_parser = CollectionKind::from_str)]
    pub collection: CollectionKind,

    /// JSON file holding an array of records (or `{"results": [...]}`)
    pub file: PathBuf,
}

pub fn run(args: ImportArgs, global: &GlobalOpts) -> Result<()> {
    let session = open_session(global)?;
    let store = open_store(&session)?;

    let contents = std::fs::read_to_string(&args.file)
        .map_err(|e| miette::miette!("no se pudo leer {}: {}", args.file.display(), e))?;
    let body: serde_json::Value =
        serde_json::from_str(&contents).map_err(|e| miette::miette!("JSON inválido: {}", e))?;
    let records = extract_items(body)
        .ok_or_else(|| miette::miette!("se esperaba una lista de registros"))?;

    let outcome = store
        .replace_collection(args.collection, &records)
        .map_err(|e| miette::miette!("{}", e))?;

    println!(
        "{} {} registros importados en {}",
        style("✓").green(),
        outcome.records,
        style(args.collection.to_string()).cyan()
    );
    Ok(())
}
