//! Purchase record

use serde::{Deserialize, Serialize};

use crate::entities::{de_f64_flexible, de_opt_f64_flexible, de_opt_id};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Purchase {
    #[serde(default, deserialize_with = "de_opt_id")]
    pub id: Option<i64>,

    #[serde(default)]
    pub date: String,

    #[serde(default, alias = "supplierName", alias = "supplier")]
    pub supplier_name: String,

    #[serde(default)]
    pub items: Vec<PurchaseItem>,

    #[serde(
        default,
        alias = "totalAmount",
        alias = "total",
        deserialize_with = "de_f64_flexible"
    )]
    pub total_amount: f64,

    #[serde(default = "default_status")]
    pub status: String,
}

fn default_status() -> String {
    "Completada".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseItem {
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

    #[serde(default, alias = "totalAmount", deserialize_with = "de_opt_f64_flexible")]
    pub total: Option<f64>,

    /// `producto`/`insumo`; often absent on older rows, in which case the
    /// purchases executor resolves it by product name against the stock
    /// collection
    #[serde(
        default,
        alias = "type",
        alias = "productCategory",
        alias = "product_category"
    )]
    pub category: String,
}

impl PurchaseItem {
    pub fn line_total(&self) -> f64 {
        self.total.unwrap_or_else(|| {
            self.quantity.unwrap_or(0.0) * self.unit_price.unwrap_or(0.0)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_aliases() {
        let purchase: Purchase = serde_json::from_str(
            r#"{"id": 5, "date": "2024-03-01", "supplierName": "Molinos SA",
                "totalAmount": "1500.50",
                "items": [{"productName": "Harina", "qty": 10, "unitPrice": 150,
                           "productCategory": "insumo"}]}"#,
        )
        .unwrap();
        assert_eq!(purchase.supplier_name, "Molinos SA");
        assert_eq!(purchase.total_amount, 1500.5);
        assert_eq!(purchase.items[0].category, "insumo");
        assert_eq!(purchase.items[0].line_total(), 1500.0);
    }

    #[test]
    fn test_status_defaults_to_completed() {
        let purchase: Purchase = serde_json::from_str(r#"{"id": 6}"#).unwrap();
        assert_eq!(purchase.status, "Completada");
    }

    #[test]
    fn test_item_total_precedence() {
        let item: PurchaseItem =
            serde_json::from_str(r#"{"product": "Azúcar", "quantity": 2, "price": 10, "total": 18}"#)
                .unwrap();
        assert_eq!(item.line_total(), 18.0);
    }
}
