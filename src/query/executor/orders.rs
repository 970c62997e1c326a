//! Customer orders report with status normalization

use crate::entities::Order;
use crate::query::executor::{date_in_window, period_label, stock::opt_id_cell};
use crate::query::filter::OrderFilters;
use crate::query::predicate::{id_matches, measure_matches, set_matches, text_matches};
use crate::query::result::{CellValue, QueryResult, Row, SummaryValue};

pub const TITLE: &str = "Reporte de Pedidos";

/// The fixed status vocabulary
pub const STATUSES: [&str; 5] = [
    "Pendiente",
    "En Preparación",
    "Listo",
    "Entregado",
    "Cancelado",
];

/// Normalize a free-text status by substring sniffing. Unrecognized
/// values pass through unchanged (they simply never match a membership
/// filter) and are logged, not rejected.
pub fn normalize_status(raw: &str) -> String {
    let lower = raw.trim().to_lowercase();
    if lower.contains("cancel") {
        "Cancelado".to_string()
    } else if lower.contains("entreg") {
        "Entregado".to_string()
    } else if lower.contains("prepar") {
        "En Preparación".to_string()
    } else if lower.contains("listo") {
        "Listo".to_string()
    } else if lower.contains("pend") {
        "Pendiente".to_string()
    } else {
        if !lower.is_empty() {
            tracing::warn!(status = raw, "estado de pedido no reconocido");
        }
        raw.trim().to_string()
    }
}

pub fn execute(orders: &[Order], filters: &OrderFilters) -> QueryResult {
    let mut result = QueryResult::new(TITLE);
    let mut by_status: Vec<(String, f64)> = Vec::new();
    let mut rows = Vec::new();

    for order in orders {
        if let Some(operand) = filters.id.id_operand() {
            match order.id {
                Some(id) if id_matches(id, filters.id.op, operand) => {}
                _ => continue,
            }
        }
        if filters.customer.is_active()
            && !text_matches(
                &order.customer_name,
                filters.customer.op,
                &filters.customer.value,
            )
        {
            continue;
        }
        if !date_in_window(&order.date, &filters.window) {
            continue;
        }
        if filters.payment_methods.is_active()
            && !set_matches(&order.payment_method, &filters.payment_methods.0)
        {
            continue;
        }

        let status = normalize_status(&order.status);
        if filters.statuses.is_active() && !set_matches(&status, &filters.statuses.0) {
            continue;
        }
        if filters.product.is_active()
            && !order.items.iter().any(|item| {
                text_matches(&item.product_name, filters.product.op, &filters.product.value)
            })
        {
            continue;
        }
        if let Some(operand) = filters.units.operand() {
            // Matches when any line item satisfies the numeric test
            if !order
                .items
                .iter()
                .any(|item| measure_matches(item.quantity(), filters.units.op, operand))
            {
                continue;
            }
        }

        match by_status.iter_mut().find(|(name, _)| *name == status) {
            Some((_, count)) => *count += 1.0,
            None => by_status.push((status.clone(), 1.0)),
        }
        rows.push(
            Row::new()
                .cell("id", opt_id_cell(order.id))
                .cell("date", CellValue::Text(order.date.clone()))
                .cell("customerName", CellValue::Text(order.customer_name.clone()))
                .cell("paymentMethod", CellValue::Text(order.payment_method.clone()))
                .cell("status", CellValue::Text(status))
                .cell("products", CellValue::Text(order.products_joined()))
                .cell("units", CellValue::Text(order.units_joined())),
        );
    }

    let pending = by_status
        .iter()
        .find(|(name, _)| name == "Pendiente")
        .map(|(_, count)| *count as i64)
        .unwrap_or(0);

    result.summary_entry("totalOrders", SummaryValue::Count(rows.len() as i64));
    result.summary_entry("pendingOrders", SummaryValue::Count(pending));
    result.summary_entry("period", SummaryValue::Text(period_label(&filters.window)));
    result.summary_entry("porEstado", SummaryValue::Breakdown(by_status));
    result.data = rows;
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::filter::{NumericCriterion, SetCriterion};
    use crate::query::predicate::CompareOp;

    fn orders() -> Vec<Order> {
        serde_json::from_str(
            r#"[
                {"id": 1, "date": "2024-05-02T15:00:00Z", "customerName": "Lucía",
                 "paymentMethod": "Efectivo", "status": "entregado al cliente",
                 "items": [{"productName": "Torta", "quantity": 3}]},
                {"id": 2, "fecha_de_orden_del_pedido": "2024-05-03T10:00:00Z",
                 "customer_name": "Marcos", "payment_method": "Tarjeta",
                 "status": "pendiente de retiro",
                 "items": [{"product": "Pan", "qty": 12}]},
                {"id": 3, "date": "2024-05-04", "customerName": "Sofía",
                 "paymentMethod": "Transferencia", "status": "en preparación",
                 "items": [{"productName": "Tarta", "quantity": 1}]}
            ]"#,
        )
        .unwrap()
    }

    #[test]
    fn test_normalize_status_vocabulary() {
        assert_eq!(normalize_status("entregado al cliente"), "Entregado");
        assert_eq!(normalize_status("PENDIENTE"), "Pendiente");
        assert_eq!(normalize_status("en preparación"), "En Preparación");
        assert_eq!(normalize_status("listo para retirar"), "Listo");
        assert_eq!(normalize_status("cancelado por el cliente"), "Cancelado");
        // Unrecognized values pass through
        assert_eq!(normalize_status("extraviado"), "extraviado");
    }

    #[test]
    fn test_status_membership_over_normalized_value() {
        let filters = OrderFilters {
            statuses: SetCriterion(vec!["Entregado".to_string()]),
            ..OrderFilters::default()
        };
        let result = execute(&orders(), &filters);
        assert_eq!(result.data.len(), 1);
        assert_eq!(result.data[0].get("status").unwrap().display(), "Entregado");
        assert_eq!(result.data[0].get("customerName").unwrap().display(), "Lucía");
    }

    #[test]
    fn test_units_filter_matches_any_item() {
        let filters = OrderFilters {
            units: NumericCriterion::new("10", CompareOp::Gte),
            ..OrderFilters::default()
        };
        let result = execute(&orders(), &filters);
        assert_eq!(result.data.len(), 1);
        assert_eq!(result.data[0].get("id").unwrap().display(), "2");
    }

    #[test]
    fn test_summary_breakdown_counts() {
        let result = execute(&orders(), &OrderFilters::default());
        assert_eq!(result.summary[0].1, SummaryValue::Count(3));
        assert_eq!(result.summary[1].1, SummaryValue::Count(1));
        let SummaryValue::Breakdown(ref by_status) = result.summary[3].1 else {
            panic!("expected breakdown");
        };
        assert!(by_status.contains(&("Entregado".to_string(), 1.0)));
        assert!(by_status.contains(&("Pendiente".to_string(), 1.0)));
        assert!(by_status.contains(&("En Preparación".to_string(), 1.0)));
    }

    #[test]
    fn test_payment_method_membership() {
        let filters = OrderFilters {
            payment_methods: SetCriterion(vec!["tarjeta".to_string()]),
            ..OrderFilters::default()
        };
        let result = execute(&orders(), &filters);
        assert_eq!(result.data.len(), 1);
        assert_eq!(result.data[0].get("customerName").unwrap().display(), "Marcos");
    }
}
