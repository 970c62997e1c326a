//! `dpt query` command - Run an ad-hoc query over one record category
//!
//! One subcommand per category, each exposing that category's filterable
//! fields as flags. `dpt query wizard` builds the same filter state
//! interactively.

pub mod wizard;

use std::path::PathBuf;
use std::str::FromStr;

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::commands::{open_gateway, open_session, open_store};
use crate::cli::{render, GlobalOpts};
use crate::core::export::{self, ExportFormat};
use crate::core::gateway::ActiveQueryGateway;
use crate::query::date::DateSpec;
use crate::query::filter::{
    CashFilters, DateWindow, NumericCriterion, OrderFilters, PurchaseFilters, QuantityCriterion,
    SalesFilters, SetCriterion, SortOrder, StockFilters, SupplierFilters, TextCriterion,
};
use crate::query::predicate::{CompareOp, TextOp};
use crate::query::units::Unit;
use crate::query::{QueryEngine, QueryFilters};

#[derive(Subcommand, Debug)]
pub enum QueryCommands {
    /// Estado de Stock
    Stock(StockArgs),

    /// Información de Proveedores
    Proveedores(ProveedoresArgs),

    /// Reporte de Ventas
    Ventas(VentasArgs),

    /// Reporte de Compras
    Compras(ComprasArgs),

    /// Reporte de Pedidos
    Pedidos(PedidosArgs),

    /// Reporte de Movimientos de Caja
    MovimientosCaja(CajaArgs),

    /// Build a query interactively
    Wizard,
}

pub fn run(cmd: QueryCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        QueryCommands::Stock(args) => {
            let run_opts = args.run.clone();
            execute(QueryFilters::Stock(args.into_filters()), &run_opts, global)
        }
        QueryCommands::Proveedores(args) => {
            let run_opts = args.run.clone();
            execute(
                QueryFilters::Proveedores(args.into_filters()),
                &run_opts,
                global,
            )
        }
        QueryCommands::Ventas(args) => {
            let run_opts = args.run.clone();
            execute(QueryFilters::Ventas(args.into_filters()), &run_opts, global)
        }
        QueryCommands::Compras(args) => {
            let run_opts = args.run.clone();
            execute(QueryFilters::Compras(args.into_filters()), &run_opts, global)
        }
        QueryCommands::Pedidos(args) => {
            let run_opts = args.run.clone();
            execute(QueryFilters::Pedidos(args.into_filters()), &run_opts, global)
        }
        QueryCommands::MovimientosCaja(args) => {
            let run_opts = args.run.clone();
            execute(
                QueryFilters::MovimientosCaja(args.into_filters()),
                &run_opts,
                global,
            )
        }
        QueryCommands::Wizard => wizard::run(global),
    }
}

/// Flags shared by every query subcommand
#[derive(clap::Args, Clone, Debug, Default)]
pub struct RunOpts {
    /// Export the result (json, csv, html)
    #[arg(long, value_parser = ExportFormat::from_str)]
    pub export: Option<ExportFormat>,

    /// Output file for --export (default: <tipo>_reporte.<ext>)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Do not persist the active query to the backend
    #[arg(long)]
    pub no_save: bool,
}

/// Standard start/end dates plus the granular from/to components
#[derive(clap::Args, Clone, Debug, Default)]
pub struct DateRangeOpts {
    /// Fecha de inicio (YYYY-MM-DD)
    #[arg(long)]
    pub start_date: Option<String>,

    /// Fecha de fin (YYYY-MM-DD)
    #[arg(long)]
    pub end_date: Option<String>,

    #[arg(long, help_heading = "Fecha granular")]
    pub from_year: Option<i32>,
    #[arg(long, help_heading = "Fecha granular")]
    pub from_month: Option<u32>,
    #[arg(long, help_heading = "Fecha granular")]
    pub from_day: Option<u32>,
    #[arg(long, help_heading = "Fecha granular")]
    pub from_hour: Option<u32>,
    #[arg(long, help_heading = "Fecha granular")]
    pub from_minute: Option<u32>,
    #[arg(long, help_heading = "Fecha granular")]
    pub to_year: Option<i32>,
    #[arg(long, help_heading = "Fecha granular")]
    pub to_month: Option<u32>,
    #[arg(long, help_heading = "Fecha granular")]
    pub to_day: Option<u32>,
    #[arg(long, help_heading = "Fecha granular")]
    pub to_hour: Option<u32>,
    #[arg(long, help_heading = "Fecha granular")]
    pub to_minute: Option<u32>,
}

impl DateRangeOpts {
    pub fn window(&self) -> DateWindow {
        DateWindow {
            start: self.start_date.clone(),
            end: self.end_date.clone(),
            from: DateSpec {
                year: self.from_year,
                month: self.from_month,
                day: self.from_day,
                hour: self.from_hour,
                minute: self.from_minute,
            },
            to: DateSpec {
                year: self.to_year,
                month: self.to_month,
                day: self.to_day,
                hour: self.to_hour,
                minute: self.to_minute,
            },
        }
    }
}

fn numeric(value: &Option<String>, op: CompareOp) -> NumericCriterion {
    NumericCriterion::new(value.clone().unwrap_or_default(), op)
}

fn text(value: &Option<String>, op: TextOp) -> TextCriterion {
    TextCriterion::new(value.clone().unwrap_or_default(), op)
}

#[derive(clap::Args, Debug)]
pub struct StockArgs {
    /// Filtrar por id
    #[arg(long)]
    pub id: Option<String>,
    #[arg(long, default_value = "equals", value_parser = CompareOp::from_str)]
    pub id_op: CompareOp,

    /// Buscar por nombre
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long, default_value = "contains", value_parser = TextOp::from_str)]
    pub name_op: TextOp,

    /// Cantidad, interpretada en --unit
    #[arg(long)]
    pub quantity: Option<String>,
    #[arg(long, default_value = "equals", value_parser = CompareOp::from_str)]
    pub quantity_op: CompareOp,
    /// Unidad de la cantidad (g, kg, ml, l, u)
    #[arg(long, default_value = "u", value_parser = Unit::from_str)]
    pub unit: Unit,

    /// Precio
    #[arg(long)]
    pub price: Option<String>,
    #[arg(long, default_value = "equals", value_parser = CompareOp::from_str)]
    pub price_op: CompareOp,

    /// Categoría (producto/insumo)
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long, default_value = "equals", value_parser = TextOp::from_str)]
    pub category_op: TextOp,

    /// Estado derivado (Stock Bajo, Stock Medio, Stock Alto; repetible)
    #[arg(long = "status", value_delimiter = ',')]
    pub status: Vec<String>,

    #[command(flatten)]
    pub run: RunOpts,
}

impl StockArgs {
    fn into_filters(self) -> StockFilters {
        StockFilters {
            id: numeric(&self.id, self.id_op),
            name: text(&self.name, self.name_op),
            quantity: QuantityCriterion {
                raw: self.quantity.unwrap_or_default(),
                op: self.quantity_op,
                unit: self.unit,
            },
            price: numeric(&self.price, self.price_op),
            category: text(&self.category, self.category_op),
            status: SetCriterion(self.status),
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct ProveedoresArgs {
    /// Filtrar por id
    #[arg(long)]
    pub id: Option<String>,
    #[arg(long, default_value = "equals", value_parser = CompareOp::from_str)]
    pub id_op: CompareOp,

    /// Buscar por nombre
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long, default_value = "contains", value_parser = TextOp::from_str)]
    pub name_op: TextOp,

    /// CUIT
    #[arg(long)]
    pub cuit: Option<String>,
    #[arg(long, default_value = "contains", value_parser = TextOp::from_str)]
    pub cuit_op: TextOp,

    /// Teléfono
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long, default_value = "contains", value_parser = TextOp::from_str)]
    pub phone_op: TextOp,

    /// Dirección
    #[arg(long)]
    pub address: Option<String>,
    #[arg(long, default_value = "contains", value_parser = TextOp::from_str)]
    pub address_op: TextOp,

    /// Producto ofrecido
    #[arg(long)]
    pub product: Option<String>,
    #[arg(long, default_value = "contains", value_parser = TextOp::from_str)]
    pub product_op: TextOp,

    #[command(flatten)]
    pub run: RunOpts,
}

impl ProveedoresArgs {
    fn into_filters(self) -> SupplierFilters {
        SupplierFilters {
            id: numeric(&self.id, self.id_op),
            name: text(&self.name, self.name_op),
            cuit: text(&self.cuit, self.cuit_op),
            phone: text(&self.phone, self.phone_op),
            address: text(&self.address, self.address_op),
            products: text(&self.product, self.product_op),
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct VentasArgs {
    /// Filtrar por id de venta
    #[arg(long)]
    pub id: Option<String>,
    #[arg(long, default_value = "equals", value_parser = CompareOp::from_str)]
    pub id_op: CompareOp,

    /// Buscar por producto
    #[arg(long)]
    pub product: Option<String>,
    #[arg(long, default_value = "contains", value_parser = TextOp::from_str)]
    pub product_op: TextOp,

    /// Buscar por usuario
    #[arg(long)]
    pub user: Option<String>,
    #[arg(long, default_value = "contains", value_parser = TextOp::from_str)]
    pub user_op: TextOp,

    /// Total de la línea
    #[arg(long)]
    pub total: Option<String>,
    #[arg(long, default_value = "equals", value_parser = CompareOp::from_str)]
    pub total_op: CompareOp,

    /// Cantidad vendida
    #[arg(long)]
    pub quantity: Option<String>,
    #[arg(long, default_value = "equals", value_parser = CompareOp::from_str)]
    pub quantity_op: CompareOp,

    #[command(flatten)]
    pub dates: DateRangeOpts,

    #[command(flatten)]
    pub run: RunOpts,
}

impl VentasArgs {
    fn into_filters(self) -> SalesFilters {
        SalesFilters {
            id: numeric(&self.id, self.id_op),
            product: text(&self.product, self.product_op),
            user: text(&self.user, self.user_op),
            total: numeric(&self.total, self.total_op),
            quantity: numeric(&self.quantity, self.quantity_op),
            window: self.dates.window(),
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct ComprasArgs {
    /// Filtrar por id de compra
    #[arg(long)]
    pub id: Option<String>,
    #[arg(long, default_value = "equals", value_parser = CompareOp::from_str)]
    pub id_op: CompareOp,

    /// Buscar por proveedor
    #[arg(long)]
    pub supplier: Option<String>,
    #[arg(long, default_value = "contains", value_parser = TextOp::from_str)]
    pub supplier_op: TextOp,

    /// Monto total
    #[arg(long)]
    pub total: Option<String>,
    #[arg(long, default_value = "equals", value_parser = CompareOp::from_str)]
    pub total_op: CompareOp,

    /// Tipo de compra (Producto, Insumo, Mixto; repetible)
    #[arg(long = "type", value_delimiter = ',')]
    pub types: Vec<String>,

    /// Buscar por producto comprado
    #[arg(long)]
    pub product: Option<String>,
    #[arg(long, default_value = "contains", value_parser = TextOp::from_str)]
    pub product_op: TextOp,

    #[command(flatten)]
    pub dates: DateRangeOpts,

    #[command(flatten)]
    pub run: RunOpts,
}

impl ComprasArgs {
    fn into_filters(self) -> PurchaseFilters {
        PurchaseFilters {
            id: numeric(&self.id, self.id_op),
            supplier: text(&self.supplier, self.supplier_op),
            total: numeric(&self.total, self.total_op),
            types: SetCriterion(self.types),
            product: text(&self.product, self.product_op),
            window: self.dates.window(),
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct PedidosArgs {
    /// Filtrar por id de pedido
    #[arg(long)]
    pub id: Option<String>,
    #[arg(long, default_value = "equals", value_parser = CompareOp::from_str)]
    pub id_op: CompareOp,

    /// Buscar por cliente
    #[arg(long)]
    pub customer: Option<String>,
    #[arg(long, default_value = "contains", value_parser = TextOp::from_str)]
    pub customer_op: TextOp,

    /// Método de pago (repetible)
    #[arg(long = "payment-method", value_delimiter = ',')]
    pub payment_methods: Vec<String>,

    /// Estado del pedido (repetible)
    #[arg(long = "status", value_delimiter = ',')]
    pub statuses: Vec<String>,

    /// Buscar por producto pedido
    #[arg(long)]
    pub product: Option<String>,
    #[arg(long, default_value = "contains", value_parser = TextOp::from_str)]
    pub product_op: TextOp,

    /// Unidades pedidas (coincide si algún item cumple)
    #[arg(long)]
    pub units: Option<String>,
    #[arg(long, default_value = "equals", value_parser = CompareOp::from_str)]
    pub units_op: CompareOp,

    #[command(flatten)]
    pub dates: DateRangeOpts,

    #[command(flatten)]
    pub run: RunOpts,
}

impl PedidosArgs {
    fn into_filters(self) -> OrderFilters {
        OrderFilters {
            id: numeric(&self.id, self.id_op),
            customer: text(&self.customer, self.customer_op),
            payment_methods: SetCriterion(self.payment_methods),
            statuses: SetCriterion(self.statuses),
            product: text(&self.product, self.product_op),
            units: numeric(&self.units, self.units_op),
            window: self.dates.window(),
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct CajaArgs {
    /// Filtrar por id de movimiento
    #[arg(long)]
    pub id: Option<String>,
    #[arg(long, default_value = "equals", value_parser = CompareOp::from_str)]
    pub id_op: CompareOp,

    /// Monto
    #[arg(long)]
    pub amount: Option<String>,
    #[arg(long, default_value = "equals", value_parser = CompareOp::from_str)]
    pub amount_op: CompareOp,

    /// Buscar en la descripción
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long, default_value = "contains", value_parser = TextOp::from_str)]
    pub description_op: TextOp,

    /// Buscar por usuario
    #[arg(long)]
    pub user: Option<String>,
    #[arg(long, default_value = "contains", value_parser = TextOp::from_str)]
    pub user_op: TextOp,

    /// Tipo de movimiento (Entrada, Salida; repetible)
    #[arg(long = "type", value_delimiter = ',')]
    pub types: Vec<String>,

    /// Método de pago (repetible)
    #[arg(long = "payment-method", value_delimiter = ',')]
    pub payment_methods: Vec<String>,

    /// Orden por fecha (asc, desc)
    #[arg(long, default_value = "desc", value_parser = SortOrder::from_str)]
    pub sort: SortOrder,

    #[command(flatten)]
    pub dates: DateRangeOpts,

    #[command(flatten)]
    pub run: RunOpts,
}

impl CajaArgs {
    fn into_filters(self) -> CashFilters {
        CashFilters {
            id: numeric(&self.id, self.id_op),
            amount: numeric(&self.amount, self.amount_op),
            description: text(&self.description, self.description_op),
            user: text(&self.user, self.user_op),
            types: SetCriterion(self.types),
            payment_methods: SetCriterion(self.payment_methods),
            sort: self.sort,
            window: self.dates.window(),
        }
    }
}

/// Run the engine over an assembled filter state and render the envelope
pub(crate) fn execute(filters: QueryFilters, run: &RunOpts, global: &GlobalOpts) -> Result<()> {
    let session = open_session(global)?;
    let store = open_store(&session)?;
    let gateway = if run.no_save {
        None
    } else {
        open_gateway(&session.config)
    };

    let engine = QueryEngine::new();
    let result = engine
        .run(
            &filters,
            &store,
            gateway.as_ref().map(|g| g as &dyn ActiveQueryGateway),
        )
        .map_err(|e| miette::miette!("{}", e))?;

    render::render_result(&result, global.format, global.quiet);

    if let Some(format) = run.export {
        let query_type = filters.query_type().to_string();
        match export::export(&query_type, &result, format) {
            Ok(artifact) => {
                let path = run
                    .output
                    .clone()
                    .unwrap_or_else(|| PathBuf::from(&artifact.file_name));
                match std::fs::write(&path, &artifact.bytes) {
                    Ok(()) => {
                        println!(
                            "{} Reporte exportado a {}",
                            style("✓").green(),
                            style(path.display()).cyan()
                        );
                    }
                    Err(err) => {
                        // The rendered result above stays valid either way
                        eprintln!("{} Error al exportar: {}", style("✗").red(), err);
                    }
                }
            }
            Err(err) => {
                eprintln!("{} Error al exportar: {}", style("✗").red(), err);
            }
        }
    }

    Ok(())
}
