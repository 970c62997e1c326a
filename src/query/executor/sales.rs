//! Sales report: one row per (sale, line item) pair

use crate::entities::Sale;
use crate::query::executor::{date_in_window, period_label, stock::opt_id_cell};
use crate::query::filter::SalesFilters;
use crate::query::predicate::{id_matches, measure_matches, text_matches};
use crate::query::result::{CellValue, QueryResult, Row, SummaryValue};

pub const TITLE: &str = "Reporte de Ventas";

pub fn execute(sales: &[Sale], filters: &SalesFilters) -> QueryResult {
    let mut result = QueryResult::new(TITLE);
    let mut revenue = 0.0;
    let mut rows = Vec::new();

    for sale in sales {
        if let Some(operand) = filters.id.id_operand() {
            match sale.id {
                Some(id) if id_matches(id, filters.id.op, operand) => {}
                _ => continue,
            }
        }
        if filters.user.is_active()
            && !text_matches(sale.user(), filters.user.op, &filters.user.value)
        {
            continue;
        }
        if !date_in_window(&sale.date, &filters.window) {
            continue;
        }

        for item in sale.line_items() {
            if filters.product.is_active()
                && !text_matches(&item.product_name, filters.product.op, &filters.product.value)
            {
                continue;
            }
            if let Some(operand) = filters.quantity.operand() {
                if !measure_matches(item.quantity(), filters.quantity.op, operand) {
                    continue;
                }
            }
            let total = item.line_total();
            if let Some(operand) = filters.total.operand() {
                if !measure_matches(total, filters.total.op, operand) {
                    continue;
                }
            }

            revenue += total;
            rows.push(
                Row::new()
                    .cell("id", opt_id_cell(sale.id))
                    .cell("date", CellValue::Text(sale.date.clone()))
                    .cell("product", CellValue::Text(item.product_name.clone()))
                    .cell("quantity", CellValue::Number(item.quantity()))
                    .cell("total", CellValue::Money(total))
                    .cell("user", CellValue::Text(sale.user().to_string())),
            );
        }
    }

    result.summary_entry("totalSales", SummaryValue::Count(rows.len() as i64));
    result.summary_entry("totalRevenue", SummaryValue::Money(revenue));
    result.summary_entry("period", SummaryValue::Text(period_label(&filters.window)));
    result.data = rows;
    result
}
