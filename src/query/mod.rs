//! The ad-hoc query engine
//!
//! One engine for the six record categories. The CLI builds an immutable
//! [`filter::QueryFilters`] value, the engine validates it, pulls the
//! collection snapshot from the record store, runs the category's
//! executor, and best-effort persists the resulting envelope as the
//! user's active query.

pub mod date;
pub mod executor;
pub mod filter;
pub mod predicate;
pub mod result;
pub mod units;

use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;

use crate::core::gateway::{ActiveQueryGateway, ActiveQuerySnapshot};
use crate::core::store::{RecordStore, StoreError};
use crate::entities::CollectionKind;
use crate::query::date::parse_any_date;
use crate::query::filter::{
    CashFilters, DateWindow, OrderFilters, PurchaseFilters, SalesFilters, StockFilters,
    SupplierFilters,
};
use crate::query::result::QueryResult;

/// The six query categories, spelled as the backend spells them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryType {
    Stock,
    Proveedores,
    Ventas,
    Compras,
    Pedidos,
    MovimientosCaja,
}

impl QueryType {
    pub fn collection(&self) -> CollectionKind {
        match self {
            QueryType::Stock => CollectionKind::Stock,
            QueryType::Proveedores => CollectionKind::Suppliers,
            QueryType::Ventas => CollectionKind::Sales,
            QueryType::Compras => CollectionKind::Purchases,
            QueryType::Pedidos => CollectionKind::Orders,
            QueryType::MovimientosCaja => CollectionKind::CashMovements,
        }
    }
}

impl std::fmt::Display for QueryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryType::Stock => write!(f, "stock"),
            QueryType::Proveedores => write!(f, "proveedores"),
            QueryType::Ventas => write!(f, "ventas"),
            QueryType::Compras => write!(f, "compras"),
            QueryType::Pedidos => write!(f, "pedidos"),
            QueryType::MovimientosCaja => write!(f, "movimientos_caja"),
        }
    }
}

impl std::str::FromStr for QueryType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" => Err(ValidationError::MissingQueryType),
            "stock" => Ok(QueryType::Stock),
            "proveedores" => Ok(QueryType::Proveedores),
            "ventas" => Ok(QueryType::Ventas),
            "compras" => Ok(QueryType::Compras),
            "pedidos" => Ok(QueryType::Pedidos),
            "movimientos_caja" | "movimientos-caja" | "caja" => Ok(QueryType::MovimientosCaja),
            other => Err(ValidationError::UnknownQueryType(other.to_string())),
        }
    }
}

/// The full immutable filter state for one run
#[derive(Debug, Clone)]
pub enum QueryFilters {
    Stock(StockFilters),
    Proveedores(SupplierFilters),
    Ventas(SalesFilters),
    Compras(PurchaseFilters),
    Pedidos(OrderFilters),
    MovimientosCaja(CashFilters),
}

impl QueryFilters {
    pub fn query_type(&self) -> QueryType {
        match self {
            QueryFilters::Stock(_) => QueryType::Stock,
            QueryFilters::Proveedores(_) => QueryType::Proveedores,
            QueryFilters::Ventas(_) => QueryType::Ventas,
            QueryFilters::Compras(_) => QueryType::Compras,
            QueryFilters::Pedidos(_) => QueryType::Pedidos,
            QueryFilters::MovimientosCaja(_) => QueryType::MovimientosCaja,
        }
    }

    fn window(&self) -> Option<&DateWindow> {
        match self {
            QueryFilters::Stock(_) | QueryFilters::Proveedores(_) => None,
            QueryFilters::Ventas(f) => Some(&f.window),
            QueryFilters::Compras(f) => Some(&f.window),
            QueryFilters::Pedidos(f) => Some(&f.window),
            QueryFilters::MovimientosCaja(f) => Some(&f.window),
        }
    }
}

/// User-visible validation failures; reported as messages, never thrown
/// past the CLI boundary as anything else
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Debe seleccionar un tipo de consulta.")]
    MissingQueryType,

    #[error("Tipo de consulta no válido: {0}.")]
    UnknownQueryType(String),

    #[error("Debe ingresar al menos un filtro o una fecha de inicio y fin.")]
    NoCriteria,

    #[error("Debe ingresar al menos un filtro para ejecutar la consulta.")]
    NoFieldFilter,

    #[error("La fecha de inicio no puede ser posterior a la fecha de fin.")]
    StartAfterEnd,

    #[error("Por favor, ingrese una fecha de inicio.")]
    MissingStartDate,

    #[error("Por favor, ingrese una fecha de fin.")]
    MissingEndDate,

    #[error("Fecha inválida: {0}.")]
    UnparseableDate(String),
}

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// A run arrived while another was in flight; it is dropped, not queued
    #[error("Ya hay una consulta en ejecución; la solicitud fue descartada.")]
    Busy,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Validate the standard date pair of a window
fn validate_window(window: &DateWindow) -> Result<(), ValidationError> {
    let start = window.start_raw();
    let end = window.end_raw();
    match (start, end) {
        (None, None) => Ok(()),
        (Some(_), None) => Err(ValidationError::MissingEndDate),
        (None, Some(_)) => Err(ValidationError::MissingStartDate),
        (Some(start), Some(end)) => {
            let start_ts = parse_any_date(start)
                .ok_or_else(|| ValidationError::UnparseableDate(start.to_string()))?;
            let end_ts = parse_any_date(end)
                .ok_or_else(|| ValidationError::UnparseableDate(end.to_string()))?;
            if start_ts > end_ts {
                return Err(ValidationError::StartAfterEnd);
            }
            Ok(())
        }
    }
}

/// The safety rail: refuse to run without any constraint rather than
/// render or export a full unfiltered dataset by accident.
fn validate(filters: &QueryFilters) -> Result<(), ValidationError> {
    if let Some(window) = filters.window() {
        validate_window(window)?;
    }
    match filters {
        QueryFilters::Stock(f) => {
            if !f.has_any() {
                return Err(ValidationError::NoFieldFilter);
            }
        }
        QueryFilters::Proveedores(f) => {
            if !f.has_any() {
                return Err(ValidationError::NoFieldFilter);
            }
        }
        QueryFilters::Ventas(f) => {
            if !f.has_any_field() && !f.window.has_standard_pair() {
                return Err(ValidationError::NoCriteria);
            }
        }
        QueryFilters::Compras(f) => {
            if !f.has_any_field() && !f.window.has_standard_pair() {
                return Err(ValidationError::NoCriteria);
            }
        }
        QueryFilters::Pedidos(f) => {
            if !f.has_any_field() && !f.window.has_standard_pair() {
                return Err(ValidationError::NoCriteria);
            }
        }
        QueryFilters::MovimientosCaja(f) => {
            if !f.has_any_field() && !f.window.has_standard_pair() {
                return Err(ValidationError::NoCriteria);
            }
        }
    }
    Ok(())
}

/// Runs queries. Holds nothing but the reentrancy flag; all inputs arrive
/// per call, so execution is a pure function of (records, filters).
#[derive(Default)]
pub struct QueryEngine {
    running: AtomicBool,
}

struct RunGuard<'a>(&'a AtomicBool);

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl QueryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn acquire(&self) -> Result<RunGuard<'_>, QueryError> {
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            Ok(RunGuard(&self.running))
        } else {
            Err(QueryError::Busy)
        }
    }

    /// Validate, execute, and best-effort persist the active query.
    ///
    /// The guard covers the persistence round-trip too: a second run
    /// arriving before `run` returns is dropped with [`QueryError::Busy`].
    /// Persistence failures are logged and never affect the result.
    pub fn run(
        &self,
        filters: &QueryFilters,
        store: &dyn RecordStore,
        gateway: Option<&dyn ActiveQueryGateway>,
    ) -> Result<QueryResult, QueryError> {
        let _guard = self.acquire()?;
        validate(filters)?;

        let query_type = filters.query_type();
        store.ensure_loaded(query_type.collection())?;

        let result = match filters {
            QueryFilters::Stock(f) => executor::stock::execute(&store.stock()?, f),
            QueryFilters::Proveedores(f) => executor::suppliers::execute(&store.suppliers()?, f),
            QueryFilters::Ventas(f) => executor::sales::execute(&store.sales()?, f),
            QueryFilters::Compras(f) => {
                // Category fallback for uncategorized items resolves
                // against stock; load it alongside
                store.ensure_loaded(CollectionKind::Stock)?;
                executor::purchases::execute(&store.purchases()?, &store.stock()?, f)
            }
            QueryFilters::Pedidos(f) => executor::orders::execute(&store.orders()?, f),
            QueryFilters::MovimientosCaja(f) => executor::cash::execute(&store.cash_movements()?, f),
        };

        if let Some(gateway) = gateway {
            let snapshot = ActiveQuerySnapshot {
                query_type: query_type.to_string(),
                start_date: filters
                    .window()
                    .and_then(|w| w.start_raw())
                    .map(str::to_string),
                end_date: filters
                    .window()
                    .and_then(|w| w.end_raw())
                    .map(str::to_string),
                results_data: result.clone(),
            };
            if let Err(err) = gateway.save(&snapshot) {
                tracing::warn!(
                    error = %err,
                    "no se pudo guardar la consulta activa; los resultados se muestran igualmente"
                );
            }
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::gateway::MemoryGateway;
    use crate::core::store::MemoryStore;
    use crate::query::filter::{NumericCriterion, TextCriterion};
    use crate::query::predicate::{CompareOp, TextOp};
    use std::str::FromStr;

    fn store_with_sales() -> MemoryStore {
        let mut store = MemoryStore::default();
        store.sales = serde_json::from_str(
            r#"[{"id": 1, "date": "2024-03-10",
                 "sale_items": [{"product_name": "Torta", "quantity": 1, "price": 300}]}]"#,
        )
        .unwrap();
        store
    }

    #[test]
    fn test_query_type_parsing() {
        assert_eq!(QueryType::from_str("ventas").unwrap(), QueryType::Ventas);
        assert_eq!(
            QueryType::from_str("movimientos-caja").unwrap(),
            QueryType::MovimientosCaja
        );
        assert_eq!(
            QueryType::from_str("").unwrap_err(),
            ValidationError::MissingQueryType
        );
        assert!(matches!(
            QueryType::from_str("recetas").unwrap_err(),
            ValidationError::UnknownQueryType(_)
        ));
    }

    #[test]
    fn test_unconstrained_query_is_rejected() {
        let engine = QueryEngine::new();
        let store = store_with_sales();
        let err = engine
            .run(
                &QueryFilters::Ventas(SalesFilters::default()),
                &store,
                None,
            )
            .unwrap_err();
        assert!(err.to_string().contains("fecha de inicio y fin"));
    }

    #[test]
    fn test_start_after_end_is_rejected() {
        let engine = QueryEngine::new();
        let store = store_with_sales();
        let filters = SalesFilters {
            window: DateWindow {
                start: Some("2024-06-01".to_string()),
                end: Some("2024-01-01".to_string()),
                ..DateWindow::default()
            },
            ..SalesFilters::default()
        };
        let err = engine
            .run(&QueryFilters::Ventas(filters), &store, None)
            .unwrap_err();
        assert!(matches!(
            err,
            QueryError::Validation(ValidationError::StartAfterEnd)
        ));
    }

    #[test]
    fn test_missing_end_date_is_rejected() {
        let engine = QueryEngine::new();
        let store = store_with_sales();
        let filters = SalesFilters {
            window: DateWindow {
                start: Some("2024-01-01".to_string()),
                ..DateWindow::default()
            },
            ..SalesFilters::default()
        };
        let err = engine
            .run(&QueryFilters::Ventas(filters), &store, None)
            .unwrap_err();
        assert!(matches!(
            err,
            QueryError::Validation(ValidationError::MissingEndDate)
        ));
    }

    #[test]
    fn test_unparseable_date_is_rejected() {
        let filters = SalesFilters {
            window: DateWindow {
                start: Some("mañana".to_string()),
                end: Some("2024-12-31".to_string()),
                ..DateWindow::default()
            },
            ..SalesFilters::default()
        };
        let err = validate(&QueryFilters::Ventas(filters)).unwrap_err();
        assert!(matches!(err, ValidationError::UnparseableDate(_)));
    }

    #[test]
    fn test_run_executes_and_saves_snapshot() {
        let engine = QueryEngine::new();
        let store = store_with_sales();
        let gateway = MemoryGateway::default();
        let filters = QueryFilters::Ventas(SalesFilters {
            product: TextCriterion::new("torta", TextOp::Contains),
            ..SalesFilters::default()
        });

        let result = engine.run(&filters, &store, Some(&gateway)).unwrap();
        assert_eq!(result.data.len(), 1);

        let saved = gateway.load().unwrap().unwrap();
        assert_eq!(saved.query_type, "ventas");
        assert_eq!(saved.results_data.data.len(), 1);

        // A second run overwrites the single snapshot
        engine.run(&filters, &store, Some(&gateway)).unwrap();
        assert_eq!(gateway.save_count(), 2);
    }

    #[test]
    fn test_identical_runs_yield_identical_results() {
        let engine = QueryEngine::new();
        let store = store_with_sales();
        let filters = QueryFilters::Ventas(SalesFilters {
            total: NumericCriterion::new("300", CompareOp::Equals),
            ..SalesFilters::default()
        });
        let a = engine.run(&filters, &store, None).unwrap();
        let b = engine.run(&filters, &store, None).unwrap();
        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn test_guard_released_after_validation_failure() {
        let engine = QueryEngine::new();
        let store = store_with_sales();
        let bad = QueryFilters::Ventas(SalesFilters::default());
        assert!(engine.run(&bad, &store, None).is_err());

        // A later, valid run must not observe a stuck guard
        let good = QueryFilters::Ventas(SalesFilters {
            product: TextCriterion::new("torta", TextOp::Contains),
            ..SalesFilters::default()
        });
        assert!(engine.run(&good, &store, None).is_ok());
    }
}
