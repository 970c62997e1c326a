//! Cash movements report
//!
//! Unlike the other reports, date ordering is part of the contract here:
//! the result is always sorted by movement date, ascending or descending
//! per the user's choice.

use chrono::NaiveDateTime;

use crate::entities::CashMovement;
use crate::query::date::parse_any_date;
use crate::query::executor::{date_in_window, period_label, stock::opt_id_cell};
use crate::query::filter::{CashFilters, SortOrder};
use crate::query::predicate::{id_matches, measure_matches, set_matches, text_matches};
use crate::query::result::{CellValue, QueryResult, Row, SummaryValue};

pub const TITLE: &str = "Reporte de Movimientos de Caja";

/// Normalize a free-text movement type by prefix/substring sniffing.
/// Unrecognized values pass through unchanged and are logged.
pub fn normalize_type(raw: &str) -> String {
    let lower = raw.trim().to_lowercase();
    if lower.starts_with('e') || lower.contains("entrada") || lower == "in" {
        "Entrada".to_string()
    } else if lower.starts_with('s') || lower.contains("salida") || lower == "out" {
        "Salida".to_string()
    } else {
        if !lower.is_empty() {
            tracing::warn!(movement_type = raw, "tipo de movimiento no reconocido");
        }
        raw.trim().to_string()
    }
}

pub fn execute(movements: &[CashMovement], filters: &CashFilters) -> QueryResult {
    let mut matched: Vec<(&CashMovement, String, Option<NaiveDateTime>)> = Vec::new();

    for movement in movements {
        if let Some(operand) = filters.id.id_operand() {
            match movement.id {
                Some(id) if id_matches(id, filters.id.op, operand) => {}
                _ => continue,
            }
        }
        if let Some(operand) = filters.amount.operand() {
            if !measure_matches(movement.amount, filters.amount.op, operand) {
                continue;
            }
        }
        if filters.description.is_active()
            && !text_matches(
                &movement.description,
                filters.description.op,
                &filters.description.value,
            )
        {
            continue;
        }
        if filters.user.is_active()
            && !text_matches(movement.user(), filters.user.op, &filters.user.value)
        {
            continue;
        }
        if !date_in_window(&movement.date, &filters.window) {
            continue;
        }

        let movement_type = normalize_type(&movement.movement_type);
        if filters.types.is_active() && !set_matches(&movement_type, &filters.types.0) {
            continue;
        }
        if filters.payment_methods.is_active()
            && !set_matches(&movement.payment_method, &filters.payment_methods.0)
        {
            continue;
        }

        matched.push((movement, movement_type, parse_any_date(&movement.date)));
    }

    // Sorting is part of the contract. Unparseable dates sort earliest;
    // the sort is stable so ties keep collection order.
    matched.sort_by(|a, b| {
        let key_a = a.2.unwrap_or(NaiveDateTime::MIN);
        let key_b = b.2.unwrap_or(NaiveDateTime::MIN);
        match filters.sort {
            SortOrder::Ascending => key_a.cmp(&key_b),
            SortOrder::Descending => key_b.cmp(&key_a),
        }
    });

    let total_income: f64 = matched
        .iter()
        .filter(|(_, t, _)| t == "Entrada")
        .map(|(m, _, _)| m.amount)
        .sum();
    let total_expenses: f64 = matched
        .iter()
        .filter(|(_, t, _)| t == "Salida")
        .map(|(m, _, _)| m.amount)
        .sum();

    let mut result = QueryResult::new(TITLE);
    result.summary_entry("totalMovements", SummaryValue::Count(matched.len() as i64));
    result.summary_entry("totalIncome", SummaryValue::Money(total_income));
    result.summary_entry("totalExpenses", SummaryValue::Money(total_expenses));
    result.summary_entry("period", SummaryValue::Text(period_label(&filters.window)));
    result.summary_entry(
        "porTipo",
        SummaryValue::Breakdown(vec![
            ("Entrada".to_string(), total_income),
            ("Salida".to_string(), total_expenses),
        ]),
    );

    for (movement, movement_type, _) in matched {
        result.push_row(
            Row::new()
                .cell("id", opt_id_cell(movement.id))
                .cell("date", CellValue::Text(movement.date.clone()))
                .cell("type", CellValue::Text(movement_type))
                .cell("amount", CellValue::Money(movement.amount))
                .cell(
                    "payment_method",
                    CellValue::Text(movement.payment_method.clone()),
                )
                .cell("description", CellValue::Text(movement.description.clone()))
                .cell("user", CellValue::Text(movement.user().to_string())),
        );
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::filter::{DateWindow, SetCriterion};

    fn movements() -> Vec<CashMovement> {
        serde_json::from_str(
            r#"[
                {"id": 1, "date": "2024-02-05T09:15:00Z", "type": "entrada",
                 "amount": 300, "description": "Venta mostrador",
                 "payment_method": "Efectivo", "user": "caja1"},
                {"id": 2, "date": "2024-02-07T12:00:00Z", "type": "S",
                 "amount": 120, "description": "Compra insumos",
                 "payment_method": "Efectivo", "user": "caja1"},
                {"id": 3, "date": "2024-02-06T18:30:00Z", "type": "in",
                 "amount": 80.5, "description": "Pedido señas",
                 "payment_method": "Tarjeta", "user": "caja2"}
            ]"#,
        )
        .unwrap()
    }

    #[test]
    fn test_normalize_type_sniffing() {
        assert_eq!(normalize_type("entrada"), "Entrada");
        assert_eq!(normalize_type("E"), "Entrada");
        assert_eq!(normalize_type("in"), "Entrada");
        assert_eq!(normalize_type("Salida"), "Salida");
        assert_eq!(normalize_type("s"), "Salida");
        assert_eq!(normalize_type("out"), "Salida");
        assert_eq!(normalize_type("ajuste"), "ajuste");
    }

    #[test]
    fn test_descending_sort_contract() {
        let filters = CashFilters {
            sort: SortOrder::Descending,
            types: SetCriterion(vec!["Entrada".to_string(), "Salida".to_string()]),
            ..CashFilters::default()
        };
        let result = execute(&movements(), &filters);
        let dates: Vec<_> = result
            .data
            .iter()
            .map(|row| parse_any_date(&row.get("date").unwrap().display()).unwrap())
            .collect();
        assert_eq!(dates.len(), 3);
        for pair in dates.windows(2) {
            assert!(pair[0] >= pair[1]);
        }
    }

    #[test]
    fn test_ascending_sort() {
        let filters = CashFilters {
            sort: SortOrder::Ascending,
            types: SetCriterion(vec!["Entrada".to_string()]),
            ..CashFilters::default()
        };
        let result = execute(&movements(), &filters);
        assert_eq!(result.data.len(), 2);
        assert_eq!(result.data[0].get("id").unwrap().display(), "1");
        assert_eq!(result.data[1].get("id").unwrap().display(), "3");
    }

    #[test]
    fn test_income_and_expense_totals() {
        let filters = CashFilters {
            window: DateWindow {
                start: Some("2024-02-01".to_string()),
                end: Some("2024-02-28".to_string()),
                ..DateWindow::default()
            },
            ..CashFilters::default()
        };
        let result = execute(&movements(), &filters);
        assert_eq!(result.summary[0].1, SummaryValue::Count(3));
        assert_eq!(result.summary[1].1, SummaryValue::Money(380.5));
        assert_eq!(result.summary[2].1, SummaryValue::Money(120.0));
    }

    #[test]
    fn test_type_membership_after_normalization() {
        let filters = CashFilters {
            types: SetCriterion(vec!["Salida".to_string()]),
            ..CashFilters::default()
        };
        let result = execute(&movements(), &filters);
        assert_eq!(result.data.len(), 1);
        assert_eq!(result.data[0].get("type").unwrap().display(), "Salida");
    }
}
