//! Sale record
//!
//! Three generations of sale shapes coexist in the collection: itemized
//! sales under `sale_items`, itemized sales under `items`, and flat legacy
//! rows carrying a single product or just an aggregate total. The
//! [`Sale::line_items`] normalization collapses them all into one shape so
//! old sales never drop out of reports.

use serde::{Deserialize, Serialize};

use crate::entities::{de_opt_f64_flexible, de_opt_id};

pub const FALLBACK_PRODUCT: &str = "Venta (sin items detallados)";
pub const DEFAULT_USER: &str = "Sistema";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sale {
    #[serde(default, deserialize_with = "de_opt_id")]
    pub id: Option<i64>,

    #[serde(default, alias = "timestamp", alias = "created_at")]
    pub date: String,

    #[serde(default, alias = "sale_items")]
    pub items: Vec<SaleItem>,

    #[serde(
        default,
        alias = "totalAmount",
        alias = "total",
        alias = "amount",
        deserialize_with = "de_opt_f64_flexible"
    )]
    pub total_amount: Option<f64>,

    /// Legacy flat shape: one product directly on the sale
    #[serde(default)]
    pub product: Option<String>,

    #[serde(default, alias = "productName")]
    pub product_name: Option<String>,

    #[serde(default, deserialize_with = "de_opt_f64_flexible")]
    pub quantity: Option<f64>,

    #[serde(default, alias = "user_username", alias = "user_name")]
    pub user: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleItem {
    #[serde(
        default,
        alias = "productName",
        alias = "product",
        alias = "name"
    )]
    pub product_name: String,

    #[serde(default, alias = "qty", deserialize_with = "de_opt_f64_flexible")]
    pub quantity: Option<f64>,

    #[serde(
        default,
        alias = "unitPrice",
        alias = "price",
        deserialize_with = "de_opt_f64_flexible"
    )]
    pub unit_price: Option<f64>,

    #[serde(default, deserialize_with = "de_opt_f64_flexible")]
    pub total: Option<f64>,
}

impl SaleItem {
    pub fn quantity(&self) -> f64 {
        self.quantity.unwrap_or(0.0)
    }

    /// Stored total, or quantity times unit price when absent
    pub fn line_total(&self) -> f64 {
        self.total
            .unwrap_or_else(|| self.quantity() * self.unit_price.unwrap_or(0.0))
    }
}

impl Sale {
    /// The recorded user, defaulting to the system account
    pub fn user(&self) -> &str {
        self.user
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or(DEFAULT_USER)
    }

    /// Normalized line items, synthesizing a row for legacy itemless sales
    /// so the sale still appears in reports.
    pub fn line_items(&self) -> Vec<SaleItem> {
        if !self.items.is_empty() {
            return self.items.clone();
        }

        if let Some(product) = self.product.as_deref().filter(|p| !p.trim().is_empty()) {
            return vec![SaleItem {
                product_name: product.to_string(),
                quantity: Some(self.quantity.unwrap_or(1.0)),
                unit_price: None,
                total: Some(self.total_amount.unwrap_or(0.0)),
            }];
        }

        if let Some(total) = self.total_amount {
            let name = self
                .product_name
                .as_deref()
                .filter(|p| !p.trim().is_empty())
                .unwrap_or(FALLBACK_PRODUCT);
            return vec![SaleItem {
                product_name: name.to_string(),
                quantity: Some(1.0),
                unit_price: None,
                total: Some(total),
            }];
        }

        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_itemized_sale() {
        let sale: Sale = serde_json::from_str(
            r#"{"id": 1, "timestamp": "2024-11-15T10:30:00Z",
                "sale_items": [{"product_name": "Torta", "quantity": 2, "price": 150}]}"#,
        )
        .unwrap();
        let items = sale.line_items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].product_name, "Torta");
        assert_eq!(items[0].line_total(), 300.0);
    }

    #[test]
    fn test_item_total_takes_precedence() {
        let item: SaleItem =
            serde_json::from_str(r#"{"product": "Pan", "qty": 3, "unitPrice": 10, "total": 25}"#)
                .unwrap();
        assert_eq!(item.line_total(), 25.0);
    }

    #[test]
    fn test_legacy_flat_sale() {
        let sale: Sale = serde_json::from_str(
            r#"{"id": 2, "date": "2023-01-10", "product": "Pan", "quantity": 4, "total": 80}"#,
        )
        .unwrap();
        let items = sale.line_items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].product_name, "Pan");
        assert_eq!(items[0].quantity(), 4.0);
        assert_eq!(items[0].line_total(), 80.0);
    }

    #[test]
    fn test_total_only_sale_synthesizes_pseudo_item() {
        let sale: Sale =
            serde_json::from_str(r#"{"id": 3, "date": "2022-06-01", "total_amount": 120}"#)
                .unwrap();
        let items = sale.line_items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].product_name, FALLBACK_PRODUCT);
        assert_eq!(items[0].quantity(), 1.0);
        assert_eq!(items[0].line_total(), 120.0);
    }

    #[test]
    fn test_user_fallback() {
        let sale: Sale = serde_json::from_str(r#"{"user_username": "caja1"}"#).unwrap();
        assert_eq!(sale.user(), "caja1");

        let sale: Sale = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(sale.user(), DEFAULT_USER);
    }

    #[test]
    fn test_empty_sale_has_no_rows() {
        let sale: Sale = serde_json::from_str(r#"{"id": 4}"#).unwrap();
        assert!(sale.line_items().is_empty());
    }
}
