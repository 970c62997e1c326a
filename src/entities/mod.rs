//! Record type definitions
//!
//! The six record categories served by the backend:
//!
//! - [`StockItem`] - Products and supplies with quantities and thresholds
//! - [`Supplier`] - Suppliers with CUIT, contact info and offered products
//! - [`Sale`] - Sales with line items (several historical shapes)
//! - [`Purchase`] - Supplier purchases with line items
//! - [`Order`] - Customer orders with status and payment method
//! - [`CashMovement`] - Cash register entries and exits
//!
//! Collections arrive as loosely-typed JSON that accumulated several
//! spellings per logical field over the life of the backend. Each struct
//! resolves those spellings once, at deserialization, so the query engine
//! never sees an alias.

pub mod cash_movement;
pub mod order;
pub mod purchase;
pub mod sale;
pub mod stock_item;
pub mod supplier;

pub use cash_movement::CashMovement;
pub use order::{Order, OrderItem};
pub use purchase::{Purchase, PurchaseItem};
pub use sale::{Sale, SaleItem};
pub use stock_item::StockItem;
pub use supplier::Supplier;

use serde::{Deserialize, Deserializer};

/// The six record categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    Stock,
    Suppliers,
    Sales,
    Purchases,
    Orders,
    CashMovements,
}

impl CollectionKind {
    pub const ALL: [CollectionKind; 6] = [
        CollectionKind::Stock,
        CollectionKind::Suppliers,
        CollectionKind::Sales,
        CollectionKind::Purchases,
        CollectionKind::Orders,
        CollectionKind::CashMovements,
    ];
}

impl std::fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollectionKind::Stock => write!(f, "stock"),
            CollectionKind::Suppliers => write!(f, "proveedores"),
            CollectionKind::Sales => write!(f, "ventas"),
            CollectionKind::Purchases => write!(f, "compras"),
            CollectionKind::Orders => write!(f, "pedidos"),
            CollectionKind::CashMovements => write!(f, "movimientos_caja"),
        }
    }
}

impl std::str::FromStr for CollectionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "stock" | "inventario" => Ok(CollectionKind::Stock),
            "proveedores" => Ok(CollectionKind::Suppliers),
            "ventas" => Ok(CollectionKind::Sales),
            "compras" => Ok(CollectionKind::Purchases),
            "pedidos" => Ok(CollectionKind::Orders),
            "movimientos_caja" | "movimientos-caja" | "caja" => Ok(CollectionKind::CashMovements),
            other => Err(format!("colección desconocida: {}", other)),
        }
    }
}

/// Accept a number, a numeric string, null or a missing field; anything
/// unparseable collapses to zero, mirroring how the screens always treated
/// stringly-typed amounts.
pub(crate) fn de_f64_flexible<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(de_opt_f64_flexible(deserializer)?.unwrap_or(0.0))
}

/// Like [`de_f64_flexible`] but keeping absence observable
pub(crate) fn de_opt_f64_flexible<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<f64>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(f64),
        Text(String),
        Null,
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Num(v) => Some(v),
        Raw::Text(s) => s.trim().parse::<f64>().ok(),
        Raw::Null => None,
    })
}

/// Record ids are backend-assigned integers but occasionally arrive as
/// strings through older exports
pub(crate) fn de_opt_id<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<i64>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(i64),
        Text(String),
        Null,
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Num(v) => Some(v),
        Raw::Text(s) => s.trim().parse::<i64>().ok(),
        Raw::Null => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_collection_kind_round_trip() {
        for kind in CollectionKind::ALL {
            assert_eq!(CollectionKind::from_str(&kind.to_string()).unwrap(), kind);
        }
    }

    #[test]
    fn test_collection_kind_accepts_cli_spelling() {
        assert_eq!(
            CollectionKind::from_str("movimientos-caja").unwrap(),
            CollectionKind::CashMovements
        );
        assert!(CollectionKind::from_str("usuarios").is_err());
    }

    #[derive(Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "de_f64_flexible")]
        amount: f64,
        #[serde(default, deserialize_with = "de_opt_id")]
        id: Option<i64>,
    }

    #[test]
    fn test_flexible_scalars() {
        let p: Probe = serde_json::from_str(r#"{"amount": "12.5", "id": "7"}"#).unwrap();
        assert_eq!(p.amount, 12.5);
        assert_eq!(p.id, Some(7));

        let p: Probe = serde_json::from_str(r#"{"amount": 3, "id": 9}"#).unwrap();
        assert_eq!(p.amount, 3.0);
        assert_eq!(p.id, Some(9));

        let p: Probe = serde_json::from_str(r#"{"amount": "n/a", "id": null}"#).unwrap();
        assert_eq!(p.amount, 0.0);
        assert_eq!(p.id, None);

        let p: Probe = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(p.amount, 0.0);
        assert_eq!(p.id, None);
    }
}
