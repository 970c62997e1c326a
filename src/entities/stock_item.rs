//! Stock record - a product or supply with its quantity and alert threshold

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::entities::{de_f64_flexible, de_opt_id};
use crate::query::units::Unit;

/// An inventory record. `stock` and `low_stock_threshold` are expressed in
/// the record's own `unit` (grams, milliliters or plain counts).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockItem {
    #[serde(default, deserialize_with = "de_opt_id")]
    pub id: Option<i64>,

    #[serde(default)]
    pub name: String,

    #[serde(default, deserialize_with = "de_f64_flexible")]
    pub stock: f64,

    /// Historical records store `g`, `ml` or `u`; free text is tolerated
    #[serde(default = "default_unit")]
    pub unit: String,

    #[serde(default, deserialize_with = "de_f64_flexible")]
    pub price: f64,

    /// `producto` or `insumo`
    #[serde(default, alias = "type")]
    pub category: String,

    #[serde(
        default = "default_threshold",
        alias = "lowStockThreshold",
        deserialize_with = "de_f64_flexible"
    )]
    pub low_stock_threshold: f64,
}

fn default_unit() -> String {
    "u".to_string()
}

fn default_threshold() -> f64 {
    10.0
}

impl StockItem {
    /// Parsed unit; `None` for unrecognized spellings (such records can
    /// never satisfy a unit-aware quantity filter)
    pub fn parsed_unit(&self) -> Option<Unit> {
        Unit::from_str(&self.unit).ok()
    }

    /// Alert threshold, falling back to the historical default when the
    /// record carries zero or garbage
    pub fn threshold(&self) -> f64 {
        if self.low_stock_threshold > 0.0 {
            self.low_stock_threshold
        } else {
            default_threshold()
        }
    }

    /// Derived stock status: below threshold, below twice the threshold,
    /// or healthy
    pub fn status(&self) -> &'static str {
        let threshold = self.threshold();
        if self.stock < threshold {
            "Stock Bajo"
        } else if self.stock < threshold * 2.0 {
            "Stock Medio"
        } else {
            "Stock Alto"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_historical_spellings() {
        let item: StockItem = serde_json::from_str(
            r#"{"id": 3, "name": "Harina", "stock": "500", "unit": "g",
                "price": 120.0, "type": "producto", "lowStockThreshold": 1000}"#,
        )
        .unwrap();
        assert_eq!(item.stock, 500.0);
        assert_eq!(item.category, "producto");
        assert_eq!(item.low_stock_threshold, 1000.0);
        assert_eq!(item.parsed_unit(), Some(Unit::Grams));
    }

    #[test]
    fn test_defaults() {
        let item: StockItem = serde_json::from_str(r#"{"name": "Azúcar"}"#).unwrap();
        assert_eq!(item.unit, "u");
        assert_eq!(item.low_stock_threshold, 10.0);
        assert_eq!(item.stock, 0.0);
    }

    #[test]
    fn test_status_thresholds() {
        let mut item: StockItem =
            serde_json::from_str(r#"{"name": "Harina", "stock": 500, "low_stock_threshold": 1000}"#)
                .unwrap();
        assert_eq!(item.status(), "Stock Bajo");

        item.stock = 1500.0;
        assert_eq!(item.status(), "Stock Medio");

        item.stock = 2000.0;
        assert_eq!(item.status(), "Stock Alto");
    }

    #[test]
    fn test_zero_threshold_falls_back() {
        let item: StockItem =
            serde_json::from_str(r#"{"name": "Sal", "stock": 5, "low_stock_threshold": 0}"#)
                .unwrap();
        assert_eq!(item.threshold(), 10.0);
        assert_eq!(item.status(), "Stock Bajo");
    }

    #[test]
    fn test_unknown_unit_is_tolerated() {
        let item: StockItem =
            serde_json::from_str(r#"{"name": "Huevos", "unit": "docena"}"#).unwrap();
        assert_eq!(item.parsed_unit(), None);
    }
}
