//! Console rendering of result envelopes

use console::style;
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::truncate_str;
use crate::cli::OutputFormat;
use crate::query::result::{QueryResult, SummaryValue};

const MAX_CELL: usize = 48;

/// Spanish labels for row columns, matching the original screens
pub fn header_label(key: &str) -> &str {
    match key {
        "id" => "ID",
        "date" => "Fecha",
        "product" => "Producto",
        "products" => "Productos",
        "quantity" => "Cantidad",
        "units" => "Unidades",
        "total" => "Total",
        "user" => "Usuario",
        "name" => "Nombre",
        "stock" => "Stock",
        "price" => "Precio",
        "category" => "Categoría",
        "status" => "Estado",
        "type" => "Tipo",
        "amount" => "Monto",
        "description" => "Descripción",
        "payment_method" | "paymentMethod" => "Método de Pago",
        "customerName" => "Cliente",
        "cuit" => "CUIT",
        "phone" => "Teléfono",
        "address" => "Dirección",
        "items" => "Items",
        "supplier" => "Proveedor",
        other => other,
    }
}

/// Spanish labels for summary keys
pub fn summary_label(key: &str) -> &str {
    match key {
        "totalItems" => "Total de Items",
        "lowStockItems" => "Items con Stock Bajo",
        "totalProductos" => "Total Productos",
        "totalInsumos" => "Total Insumos",
        "totalSuppliers" => "Proveedores Totales",
        "totalSales" => "Ventas Totales",
        "totalRevenue" => "Ingresos Totales",
        "totalPurchases" => "Compras Totales",
        "totalAmount" => "Monto Total",
        "totalOrders" => "Pedidos Totales",
        "pendingOrders" => "Pedidos Pendientes",
        "totalMovements" => "Movimientos Totales",
        "totalIncome" => "Ingresos",
        "totalExpenses" => "Egresos",
        "period" => "Período",
        "porTipo" => "Por Tipo",
        "porEstado" => "Por Estado",
        other => other,
    }
}

/// Render a result envelope to stdout in the requested format
pub fn render_result(result: &QueryResult, format: OutputFormat, quiet: bool) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(result).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Csv => render_csv(result),
        OutputFormat::Md => render_table(result, quiet, true),
        OutputFormat::Tsv => render_tsv(result),
        OutputFormat::Auto => render_table(result, quiet, false),
    }
}

fn render_csv(result: &QueryResult) {
    let columns = result.columns();
    if columns.is_empty() {
        return;
    }
    println!("{}", columns.join(","));
    for row in &result.data {
        let cells: Vec<String> = row
            .values()
            .map(|cell| crate::cli::helpers::escape_csv(&cell.display()))
            .collect();
        println!("{}", cells.join(","));
    }
}

fn render_tsv(result: &QueryResult) {
    let columns = result.columns();
    if columns.is_empty() {
        return;
    }
    println!("{}", columns.join("\t"));
    for row in &result.data {
        let cells: Vec<String> = row.values().map(|cell| cell.display()).collect();
        println!("{}", cells.join("\t"));
    }
}

fn render_table(result: &QueryResult, quiet: bool, markdown: bool) {
    if !quiet {
        if markdown {
            println!("## {}", result.title);
        } else {
            println!("{}", style(&result.title).bold().underlined());
        }
        println!();
        for (key, value) in &result.summary {
            match value {
                SummaryValue::Breakdown(entries) => {
                    println!("{}:", style(summary_label(key)).bold());
                    for (name, amount) in entries {
                        println!("  {} {:.2}", format!("{}:", name), amount);
                    }
                }
                other => {
                    println!(
                        "{} {}",
                        style(format!("{}:", summary_label(key))).bold(),
                        other.display()
                    );
                }
            }
        }
        println!();
    }

    if result.data.is_empty() {
        println!("No hay datos que mostrar para los criterios seleccionados.");
        return;
    }

    let mut builder = Builder::default();
    builder.push_record(result.columns().iter().map(|key| header_label(key)));
    for row in &result.data {
        builder.push_record(
            row.values()
                .map(|cell| truncate_str(&cell.display(), MAX_CELL)),
        );
    }
    let mut table = builder.build();
    if markdown {
        table.with(Style::markdown());
    } else {
        table.with(Style::sharp());
    }
    println!("{}", table);

    if !quiet {
        println!();
        println!("{} registro(s).", style(result.data.len()).cyan());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_labels() {
        assert_eq!(header_label("payment_method"), "Método de Pago");
        assert_eq!(header_label("customerName"), "Cliente");
        assert_eq!(header_label("desconocido"), "desconocido");
    }

    #[test]
    fn test_summary_labels() {
        assert_eq!(summary_label("totalRevenue"), "Ingresos Totales");
        assert_eq!(summary_label("period"), "Período");
        assert_eq!(summary_label("otro"), "otro");
    }
}
