//! Immutable filter state
//!
//! The CLI (flags or the interactive wizard) builds one of these value
//! objects per run and hands it to the engine; nothing here is ambient or
//! mutable, which keeps query execution a pure function of
//! (records, filters).
//!
//! Numeric criteria keep the raw operand text on purpose: unparseable
//! input deactivates only that criterion instead of aborting the query or
//! silently comparing against zero.

use crate::query::date::DateSpec;
use crate::query::predicate::{CompareOp, TextOp};
use crate::query::units::Unit;

/// Sort direction for date-ordered results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Ascending,
    #[default]
    Descending,
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortOrder::Ascending),
            "desc" | "descending" => Ok(SortOrder::Descending),
            other => Err(format!("orden no válido: {}", other)),
        }
    }
}

/// A numeric criterion over a measured field (amount, total, quantity)
#[derive(Debug, Clone, Default)]
pub struct NumericCriterion {
    pub raw: String,
    pub op: CompareOp,
}

impl NumericCriterion {
    pub fn new(raw: impl Into<String>, op: CompareOp) -> Self {
        Self { raw: raw.into(), op }
    }

    /// The parsed operand, or `None` when the criterion is blank or the
    /// text is not a number (guard-and-skip, never an error)
    pub fn operand(&self) -> Option<f64> {
        let raw = self.raw.trim();
        if raw.is_empty() {
            return None;
        }
        raw.parse::<f64>().ok()
    }

    pub fn is_active(&self) -> bool {
        self.operand().is_some()
    }

    /// Integer operand for identifier fields
    pub fn id_operand(&self) -> Option<i64> {
        self.operand().map(|v| v as i64)
    }
}

/// A text criterion with its contains/equals toggle
#[derive(Debug, Clone, Default)]
pub struct TextCriterion {
    pub value: String,
    pub op: TextOp,
}

impl TextCriterion {
    pub fn new(value: impl Into<String>, op: TextOp) -> Self {
        Self {
            value: value.into(),
            op,
        }
    }

    pub fn is_active(&self) -> bool {
        !self.value.trim().is_empty()
    }
}

/// A membership criterion: OR across the selected values
#[derive(Debug, Clone, Default)]
pub struct SetCriterion(pub Vec<String>);

impl SetCriterion {
    pub fn is_active(&self) -> bool {
        !self.0.is_empty()
    }
}

/// A quantity criterion carrying the unit the user typed it in
#[derive(Debug, Clone)]
pub struct QuantityCriterion {
    pub raw: String,
    pub op: CompareOp,
    pub unit: Unit,
}

impl Default for QuantityCriterion {
    fn default() -> Self {
        Self {
            raw: String::new(),
            op: CompareOp::Equals,
            unit: Unit::Units,
        }
    }
}

impl QuantityCriterion {
    pub fn operand(&self) -> Option<f64> {
        let raw = self.raw.trim();
        if raw.is_empty() {
            return None;
        }
        raw.parse::<f64>().ok()
    }

    pub fn is_active(&self) -> bool {
        self.operand().is_some()
    }
}

/// The standard start/end date pair plus the granular from/to descriptors
#[derive(Debug, Clone, Default)]
pub struct DateWindow {
    /// `YYYY-MM-DD` as typed in the standard date inputs
    pub start: Option<String>,
    pub end: Option<String>,
    pub from: DateSpec,
    pub to: DateSpec,
}

impl DateWindow {
    /// Both standard dates present
    pub fn has_standard_pair(&self) -> bool {
        self.start_raw().is_some() && self.end_raw().is_some()
    }

    pub fn has_granular(&self) -> bool {
        !self.from.is_empty() || !self.to.is_empty()
    }

    pub fn is_active(&self) -> bool {
        self.has_standard_pair() || self.has_granular()
    }

    pub fn start_raw(&self) -> Option<&str> {
        self.start.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    pub fn end_raw(&self) -> Option<&str> {
        self.end.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

/// Stock filters: id, name, unit-aware quantity, price, category and the
/// derived stock status
#[derive(Debug, Clone, Default)]
pub struct StockFilters {
    pub id: NumericCriterion,
    pub name: TextCriterion,
    pub quantity: QuantityCriterion,
    pub price: NumericCriterion,
    pub category: TextCriterion,
    pub status: SetCriterion,
}

impl StockFilters {
    pub fn has_any(&self) -> bool {
        self.id.is_active()
            || self.name.is_active()
            || self.quantity.is_active()
            || self.price.is_active()
            || self.category.is_active()
            || self.status.is_active()
    }
}

/// Supplier filters: every field carries its own contains/equals toggle
#[derive(Debug, Clone, Default)]
pub struct SupplierFilters {
    pub id: NumericCriterion,
    pub name: TextCriterion,
    pub cuit: TextCriterion,
    pub phone: TextCriterion,
    pub address: TextCriterion,
    pub products: TextCriterion,
}

impl SupplierFilters {
    pub fn has_any(&self) -> bool {
        self.id.is_active()
            || self.name.is_active()
            || self.cuit.is_active()
            || self.phone.is_active()
            || self.address.is_active()
            || self.products.is_active()
    }
}

#[derive(Debug, Clone, Default)]
pub struct SalesFilters {
    pub id: NumericCriterion,
    pub product: TextCriterion,
    pub user: TextCriterion,
    pub total: NumericCriterion,
    pub quantity: NumericCriterion,
    pub window: DateWindow,
}

impl SalesFilters {
    pub fn has_any_field(&self) -> bool {
        self.id.is_active()
            || self.product.is_active()
            || self.user.is_active()
            || self.total.is_active()
            || self.quantity.is_active()
            || self.window.has_granular()
    }
}

#[derive(Debug, Clone, Default)]
pub struct PurchaseFilters {
    pub id: NumericCriterion,
    pub supplier: TextCriterion,
    pub total: NumericCriterion,
    pub types: SetCriterion,
    pub product: TextCriterion,
    pub window: DateWindow,
}

impl PurchaseFilters {
    pub fn has_any_field(&self) -> bool {
        self.id.is_active()
            || self.supplier.is_active()
            || self.total.is_active()
            || self.types.is_active()
            || self.product.is_active()
            || self.window.has_granular()
    }
}

#[derive(Debug, Clone, Default)]
pub struct OrderFilters {
    pub id: NumericCriterion,
    pub customer: TextCriterion,
    pub payment_methods: SetCriterion,
    pub statuses: SetCriterion,
    pub product: TextCriterion,
    /// Matches when any line item satisfies the numeric test
    pub units: NumericCriterion,
    pub window: DateWindow,
}

impl OrderFilters {
    pub fn has_any_field(&self) -> bool {
        self.id.is_active()
            || self.customer.is_active()
            || self.payment_methods.is_active()
            || self.statuses.is_active()
            || self.product.is_active()
            || self.units.is_active()
            || self.window.has_granular()
    }
}

#[derive(Debug, Clone, Default)]
pub struct CashFilters {
    pub id: NumericCriterion,
    pub amount: NumericCriterion,
    pub description: TextCriterion,
    pub user: TextCriterion,
    pub types: SetCriterion,
    pub payment_methods: SetCriterion,
    pub sort: SortOrder,
    pub window: DateWindow,
}

impl CashFilters {
    pub fn has_any_field(&self) -> bool {
        self.id.is_active()
            || self.amount.is_active()
            || self.description.is_active()
            || self.user.is_active()
            || self.types.is_active()
            || self.payment_methods.is_active()
            || self.window.has_granular()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unparseable_numeric_criterion_is_inactive() {
        let crit = NumericCriterion::new("abc", CompareOp::Gt);
        assert!(!crit.is_active());
        assert!(crit.operand().is_none());

        let blank = NumericCriterion::new("  ", CompareOp::Equals);
        assert!(!blank.is_active());

        let ok = NumericCriterion::new("12.5", CompareOp::Lte);
        assert_eq!(ok.operand(), Some(12.5));
        assert!(ok.is_active());
    }

    #[test]
    fn test_text_criterion_active_on_non_blank() {
        assert!(!TextCriterion::default().is_active());
        assert!(TextCriterion::new("harina", TextOp::Contains).is_active());
        assert!(!TextCriterion::new("   ", TextOp::Contains).is_active());
    }

    #[test]
    fn test_date_window_activity() {
        let mut window = DateWindow::default();
        assert!(!window.is_active());

        window.start = Some("2024-01-01".to_string());
        assert!(!window.has_standard_pair());

        window.end = Some("2024-06-30".to_string());
        assert!(window.has_standard_pair());
        assert!(window.is_active());

        let granular_only = DateWindow {
            from: DateSpec {
                month: Some(11),
                ..DateSpec::default()
            },
            ..DateWindow::default()
        };
        assert!(granular_only.has_granular());
        assert!(granular_only.is_active());
    }

    #[test]
    fn test_unparseable_filter_does_not_satisfy_rail() {
        let filters = SalesFilters {
            total: NumericCriterion::new("doscientos", CompareOp::Gt),
            ..SalesFilters::default()
        };
        assert!(!filters.has_any_field());
    }
}
