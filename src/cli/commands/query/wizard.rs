//! Interactive query builder
//!
//! Walks the same selections as the consultation screen: query type,
//! standard date range, and the category's filter controls. Empty answers
//! leave the corresponding criterion inactive.

use dialoguer::{theme::ColorfulTheme, Input, MultiSelect, Select};
use miette::Result;

use crate::cli::commands::query::{execute, RunOpts};
use crate::cli::GlobalOpts;
use crate::query::executor::orders::STATUSES;
use crate::query::filter::{
    CashFilters, DateWindow, NumericCriterion, OrderFilters, PurchaseFilters, QuantityCriterion,
    SalesFilters, SetCriterion, SortOrder, StockFilters, SupplierFilters, TextCriterion,
};
use crate::query::predicate::{CompareOp, TextOp};
use crate::query::units::Unit;
use crate::query::QueryFilters;

const PAYMENT_METHODS: [&str; 3] = ["Efectivo", "Tarjeta", "Transferencia"];

pub fn run(global: &GlobalOpts) -> Result<()> {
    let theme = ColorfulTheme::default();

    let options = [
        "Estado de Stock",
        "Información de Proveedores",
        "Reporte de Ventas",
        "Reporte de Compras",
        "Reporte de Pedidos",
        "Movimientos de Caja",
    ];
    let choice = Select::with_theme(&theme)
        .with_prompt("Seleccionar tipo de consulta")
        .items(&options)
        .default(0)
        .interact()
        .map_err(|e| miette::miette!("{}", e))?;

    let filters = match choice {
        0 => QueryFilters::Stock(stock_filters(&theme)?),
        1 => QueryFilters::Proveedores(supplier_filters(&theme)?),
        2 => QueryFilters::Ventas(sales_filters(&theme)?),
        3 => QueryFilters::Compras(purchase_filters(&theme)?),
        4 => QueryFilters::Pedidos(order_filters(&theme)?),
        _ => QueryFilters::MovimientosCaja(cash_filters(&theme)?),
    };

    execute(filters, &RunOpts::default(), global)
}

fn prompt(theme: &ColorfulTheme, label: &str) -> Result<String> {
    Input::<String>::with_theme(theme)
        .with_prompt(label)
        .allow_empty(true)
        .interact_text()
        .map_err(|e| miette::miette!("{}", e))
}

fn prompt_text(theme: &ColorfulTheme, label: &str) -> Result<TextCriterion> {
    Ok(TextCriterion::new(prompt(theme, label)?, TextOp::Contains))
}

fn prompt_numeric(theme: &ColorfulTheme, label: &str) -> Result<NumericCriterion> {
    let raw = prompt(theme, label)?;
    if raw.trim().is_empty() {
        return Ok(NumericCriterion::default());
    }
    let op_labels = ["=", ">", ">=", "<", "<="];
    let ops = [
        CompareOp::Equals,
        CompareOp::Gt,
        CompareOp::Gte,
        CompareOp::Lt,
        CompareOp::Lte,
    ];
    let op = Select::with_theme(theme)
        .with_prompt(format!("Operador para {}", label))
        .items(&op_labels)
        .default(0)
        .interact()
        .map_err(|e| miette::miette!("{}", e))?;
    Ok(NumericCriterion::new(raw, ops[op]))
}

fn prompt_set(theme: &ColorfulTheme, label: &str, options: &[&str]) -> Result<SetCriterion> {
    let picked = MultiSelect::with_theme(theme)
        .with_prompt(label)
        .items(options)
        .interact()
        .map_err(|e| miette::miette!("{}", e))?;
    Ok(SetCriterion(
        picked.into_iter().map(|i| options[i].to_string()).collect(),
    ))
}

fn prompt_window(theme: &ColorfulTheme) -> Result<DateWindow> {
    let start = prompt(theme, "Fecha de inicio (YYYY-MM-DD)")?;
    let end = prompt(theme, "Fecha de fin (YYYY-MM-DD)")?;
    Ok(DateWindow {
        start: Some(start),
        end: Some(end),
        ..DateWindow::default()
    })
}

fn stock_filters(theme: &ColorfulTheme) -> Result<StockFilters> {
    let name = prompt_text(theme, "Nombre del producto")?;
    let quantity_raw = prompt(theme, "Cantidad")?;
    let quantity = if quantity_raw.trim().is_empty() {
        QuantityCriterion::default()
    } else {
        let units = [Unit::Grams, Unit::Kilograms, Unit::Milliliters, Unit::Liters, Unit::Units];
        let unit_labels = ["g", "Kg", "ml", "L", "Unidades"];
        let unit = Select::with_theme(theme)
            .with_prompt("Unidad de la cantidad")
            .items(&unit_labels)
            .default(4)
            .interact()
            .map_err(|e| miette::miette!("{}", e))?;
        QuantityCriterion {
            raw: quantity_raw,
            op: CompareOp::Equals,
            unit: units[unit],
        }
    };
    Ok(StockFilters {
        name,
        quantity,
        price: prompt_numeric(theme, "Precio")?,
        category: TextCriterion::new(prompt(theme, "Categoría (producto/insumo)")?, TextOp::Equals),
        status: prompt_set(
            theme,
            "Estado de stock",
            &["Stock Bajo", "Stock Medio", "Stock Alto"],
        )?,
        ..StockFilters::default()
    })
}

fn supplier_filters(theme: &ColorfulTheme) -> Result<SupplierFilters> {
    Ok(SupplierFilters {
        name: prompt_text(theme, "Nombre")?,
        cuit: prompt_text(theme, "CUIT")?,
        phone: prompt_text(theme, "Teléfono")?,
        address: prompt_text(theme, "Dirección")?,
        products: prompt_text(theme, "Producto ofrecido")?,
        ..SupplierFilters::default()
    })
}

fn sales_filters(theme: &ColorfulTheme) -> Result<SalesFilters> {
    Ok(SalesFilters {
        product: prompt_text(theme, "Producto")?,
        user: prompt_text(theme, "Usuario")?,
        total: prompt_numeric(theme, "Total")?,
        quantity: prompt_numeric(theme, "Cantidad")?,
        window: prompt_window(theme)?,
        ..SalesFilters::default()
    })
}

fn purchase_filters(theme: &ColorfulTheme) -> Result<PurchaseFilters> {
    Ok(PurchaseFilters {
        supplier: prompt_text(theme, "Proveedor")?,
        total: prompt_numeric(theme, "Monto total")?,
        types: prompt_set(theme, "Tipo de compra", &["Producto", "Insumo", "Mixto"])?,
        product: prompt_text(theme, "Producto comprado")?,
        window: prompt_window(theme)?,
        ..PurchaseFilters::default()
    })
}

fn order_filters(theme: &ColorfulTheme) -> Result<OrderFilters> {
    Ok(OrderFilters {
        customer: prompt_text(theme, "Cliente")?,
        payment_methods: prompt_set(theme, "Método de pago", &PAYMENT_METHODS)?,
        statuses: prompt_set(theme, "Estado del pedido", &STATUSES)?,
        product: prompt_text(theme, "Producto pedido")?,
        units: prompt_numeric(theme, "Unidades")?,
        window: prompt_window(theme)?,
        ..OrderFilters::default()
    })
}

fn cash_filters(theme: &ColorfulTheme) -> Result<CashFilters> {
    let sort_options = ["Más recientes primero", "Más antiguos primero"];
    let sort = Select::with_theme(theme)
        .with_prompt("Orden por fecha")
        .items(&sort_options)
        .default(0)
        .interact()
        .map_err(|e| miette::miette!("{}", e))?;
    Ok(CashFilters {
        amount: prompt_numeric(theme, "Monto")?,
        description: prompt_text(theme, "Descripción")?,
        user: prompt_text(theme, "Usuario")?,
        types: prompt_set(theme, "Tipo de movimiento", &["Entrada", "Salida"])?,
        payment_methods: prompt_set(theme, "Método de pago", &PAYMENT_METHODS)?,
        sort: if sort == 0 {
            SortOrder::Descending
        } else {
            SortOrder::Ascending
        },
        window: prompt_window(theme)?,
        ..CashFilters::default()
    })
}
