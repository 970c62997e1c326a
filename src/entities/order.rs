//! Customer order record

use serde::{Deserialize, Serialize};

use crate::entities::{de_opt_f64_flexible, de_opt_id};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(default, deserialize_with = "de_opt_id")]
    pub id: Option<i64>,

    #[serde(default, alias = "fecha_de_orden_del_pedido")]
    pub date: String,

    #[serde(default, alias = "customerName")]
    pub customer_name: String,

    #[serde(default, alias = "paymentMethod")]
    pub payment_method: String,

    /// Free text in old records ("entregado al cliente"); normalized to
    /// the fixed vocabulary by the orders executor
    #[serde(default)]
    pub status: String,

    #[serde(default)]
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    #[serde(
        default,
        alias = "productName",
        alias = "product",
        alias = "name"
    )]
    pub product_name: String,

    #[serde(default, alias = "qty", deserialize_with = "de_opt_f64_flexible")]
    pub quantity: Option<f64>,
}

impl OrderItem {
    pub fn quantity(&self) -> f64 {
        self.quantity.unwrap_or(0.0)
    }
}

impl Order {
    /// Product names joined for display
    pub fn products_joined(&self) -> String {
        self.items
            .iter()
            .map(|it| it.product_name.as_str())
            .filter(|name| !name.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Item quantities joined for display
    pub fn units_joined(&self) -> String {
        self.items
            .iter()
            .filter_map(|it| it.quantity.map(|q| {
                let s = format!("{:.3}", q);
                s.trim_end_matches('0').trim_end_matches('.').to_string()
            }))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
