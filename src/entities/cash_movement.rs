//! Cash register movement record

use serde::{Deserialize, Serialize};

use crate::entities::{de_f64_flexible, de_opt_id};

pub const DEFAULT_USER: &str = "Sistema";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashMovement {
    #[serde(default, deserialize_with = "de_opt_id")]
    pub id: Option<i64>,

    #[serde(
        default,
        alias = "timestamp",
        alias = "created_at",
        alias = "date_iso"
    )]
    pub date: String,

    /// Free text in old records; normalized to `Entrada`/`Salida` by the
    /// cash executor
    #[serde(default, rename = "type")]
    pub movement_type: String,

    #[serde(default, deserialize_with = "de_f64_flexible")]
    pub amount: f64,

    #[serde(default)]
    pub description: String,

    #[serde(default, alias = "user_username", alias = "user_name")]
    pub user: Option<String>,

    #[serde(default, alias = "paymentMethod")]
    pub payment_method: String,
}

impl CashMovement {
    pub fn user(&self) -> &str {
        self.user
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or(DEFAULT_USER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_aliases() {
        let movement: CashMovement = serde_json::from_str(
            r#"{"id": 11, "created_at": "2024-02-05T09:15:00Z", "type": "entrada",
                "amount": "350.75", "description": "Venta mostrador",
                "user_name": "caja1", "payment_method": "Efectivo"}"#,
        )
        .unwrap();
        assert_eq!(movement.movement_type, "entrada");
        assert_eq!(movement.amount, 350.75);
        assert_eq!(movement.user(), "caja1");
    }

    #[test]
    fn test_unparseable_amount_is_zero() {
        let movement: CashMovement =
            serde_json::from_str(r#"{"type": "Salida", "amount": "---"}"#).unwrap();
        assert_eq!(movement.amount, 0.0);
    }

    #[test]
    fn test_user_fallback() {
        let movement: CashMovement = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(movement.user(), DEFAULT_USER);
    }
}
