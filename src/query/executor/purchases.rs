//! Purchases report with inferred purchase type

use crate::entities::{Purchase, StockItem};
use crate::query::executor::{date_in_window, period_label, stock::opt_id_cell};
use crate::query::filter::PurchaseFilters;
use crate::query::predicate::{id_matches, measure_matches, set_matches, text_matches};
use crate::query::result::{CellValue, QueryResult, Row, SummaryValue};

pub const TITLE: &str = "Reporte de Compras";

pub fn execute(
    purchases: &[Purchase],
    stock: &[StockItem],
    filters: &PurchaseFilters,
) -> QueryResult {
    let mut result = QueryResult::new(TITLE);
    let mut total = 0.0;
    let mut by_type: Vec<(String, f64)> = Vec::new();
    let mut rows = Vec::new();

    for purchase in purchases {
        if let Some(operand) = filters.id.id_operand() {
            match purchase.id {
                Some(id) if id_matches(id, filters.id.op, operand) => {}
                _ => continue,
            }
        }
        if filters.supplier.is_active()
            && !text_matches(
                &purchase.supplier_name,
                filters.supplier.op,
                &filters.supplier.value,
            )
        {
            continue;
        }
        if let Some(operand) = filters.total.operand() {
            if !measure_matches(purchase.total_amount, filters.total.op, operand) {
                continue;
            }
        }
        if !date_in_window(&purchase.date, &filters.window) {
            continue;
        }

        let item_names: Vec<String> = purchase
            .items
            .iter()
            .map(|item| item.product_name.clone())
            .filter(|name| !name.is_empty())
            .collect();
        let purchase_type = infer_type(purchase, stock);

        if filters.types.is_active() && !set_matches(&purchase_type, &filters.types.0) {
            continue;
        }
        if filters.product.is_active()
            && !item_names
                .iter()
                .any(|name| text_matches(name, filters.product.op, &filters.product.value))
        {
            continue;
        }

        total += purchase.total_amount;
        match by_type.iter_mut().find(|(name, _)| *name == purchase_type) {
            Some((_, sum)) => *sum += purchase.total_amount,
            None => by_type.push((purchase_type.clone(), purchase.total_amount)),
        }
        rows.push(
            Row::new()
                .cell("id", opt_id_cell(purchase.id))
                .cell("date", CellValue::Text(purchase.date.clone()))
                .cell("supplier", CellValue::Text(purchase.supplier_name.clone()))
                .cell("items", CellValue::Text(item_names.join(", ")))
                .cell("total", CellValue::Money(purchase.total_amount))
                .cell("status", CellValue::Text(purchase.status.clone()))
                .cell("type", CellValue::Text(purchase_type)),
        );
    }

    result.summary_entry("totalPurchases", SummaryValue::Count(rows.len() as i64));
    result.summary_entry("totalAmount", SummaryValue::Money(total));
    result.summary_entry("period", SummaryValue::Text(period_label(&filters.window)));
    result.summary_entry("porTipo", SummaryValue::Breakdown(by_type));
    result.data = rows;
    result
}

/// Infer `Producto`/`Insumo`/`Mixto` from the item categories, resolving
/// missing categories by product name against the stock collection
pub(crate) fn infer_type(purchase: &Purchase, stock: &[StockItem]) -> String {
    let mut detected: Vec<String> = Vec::new();
    for item in &purchase.items {
        let mut category = item.category.trim().to_lowercase();
        if category.is_empty() && !item.product_name.is_empty() {
            if let Some(found) = stock
                .iter()
                .find(|s| s.name.eq_ignore_ascii_case(&item.product_name))
            {
                category = found.category.trim().to_lowercase();
            }
        }
        if !category.is_empty() && !detected.contains(&category) {
            detected.push(category);
        }
    }

    match detected.len() {
        0 => "Producto".to_string(),
        1 => {
            if detected[0].contains("insumo") {
                "Insumo".to_string()
            } else {
                "Producto".to_string()
            }
        }
        _ => "Mixto".to_string(),
    }
}
