//! Stock query: current inventory state with unit-aware quantity filtering

use crate::entities::StockItem;
use crate::query::filter::StockFilters;
use crate::query::predicate::{id_matches, measure_matches, set_matches, text_matches};
use crate::query::result::{CellValue, QueryResult, Row, SummaryValue};
use crate::query::units::{self, Unit, UnitFamily};

pub const TITLE: &str = "Estado del Stock";

pub fn execute(records: &[StockItem], filters: &StockFilters) -> QueryResult {
    let matched: Vec<&StockItem> = records
        .iter()
        .filter(|item| matches(item, filters))
        .collect();

    let mut result = QueryResult::new(TITLE);
    result.summary_entry("totalItems", SummaryValue::Count(matched.len() as i64));
    result.summary_entry(
        "lowStockItems",
        SummaryValue::Count(
            matched
                .iter()
                .filter(|item| item.status() == "Stock Bajo")
                .count() as i64,
        ),
    );
    result.summary_entry(
        "totalProductos",
        SummaryValue::Text(category_totals(&matched, false)),
    );
    result.summary_entry(
        "totalInsumos",
        SummaryValue::Text(category_totals(&matched, true)),
    );

    for item in matched {
        result.push_row(
            Row::new()
                .cell("id", opt_id_cell(item.id))
                .cell("name", CellValue::Text(item.name.clone()))
                .cell("stock", CellValue::Text(display_stock(item)))
                .cell("price", CellValue::Money(item.price))
                .cell("category", CellValue::Text(item.category.clone()))
                .cell("status", CellValue::Text(item.status().to_string())),
        );
    }
    result
}

fn matches(item: &StockItem, filters: &StockFilters) -> bool {
    if let Some(operand) = filters.id.id_operand() {
        match item.id {
            Some(id) if id_matches(id, filters.id.op, operand) => {}
            _ => return false,
        }
    }
    if filters.name.is_active()
        && !text_matches(&item.name, filters.name.op, &filters.name.value)
    {
        return false;
    }
    if let Some(operand) = filters.quantity.operand() {
        // A record whose unit cannot convert to the filter's unit is
        // excluded, not an error
        let Some(unit) = item.parsed_unit() else {
            return false;
        };
        match units::normalize(item.stock, unit, filters.quantity.unit) {
            Ok(converted) => {
                if !measure_matches(converted, filters.quantity.op, operand) {
                    return false;
                }
            }
            Err(_) => return false,
        }
    }
    if let Some(operand) = filters.price.operand() {
        if !measure_matches(item.price, filters.price.op, operand) {
            return false;
        }
    }
    if filters.category.is_active()
        && !text_matches(&item.category, filters.category.op, &filters.category.value)
    {
        return false;
    }
    if filters.status.is_active() && !set_matches(item.status(), &filters.status.0) {
        return false;
    }
    true
}

fn display_stock(item: &StockItem) -> String {
    match item.parsed_unit() {
        Some(unit) => units::display_quantity(item.stock, unit),
        None => format!("{} {}", item.stock, item.unit),
    }
}

/// Per-unit-family totals for one category, formatted and concatenated
/// (`12.50Kg + 3U`), omitting zero components
fn category_totals(items: &[&StockItem], insumos: bool) -> String {
    let mut mass = 0.0;
    let mut volume = 0.0;
    let mut count = 0.0;

    for item in items {
        let is_insumo = item.category.to_lowercase().contains("insumo");
        if is_insumo != insumos {
            continue;
        }
        match item.parsed_unit() {
            Some(unit) => match unit.family() {
                UnitFamily::Mass => {
                    mass += units::normalize(item.stock, unit, Unit::Grams).unwrap_or(0.0)
                }
                UnitFamily::Volume => {
                    volume += units::normalize(item.stock, unit, Unit::Milliliters).unwrap_or(0.0)
                }
                UnitFamily::Count => count += item.stock,
            },
            // Unrecognized units are tallied as plain counts
            None => count += item.stock,
        }
    }

    let mut parts = Vec::new();
    if mass != 0.0 {
        parts.push(units::display_total(mass, UnitFamily::Mass));
    }
    if volume != 0.0 {
        parts.push(units::display_total(volume, UnitFamily::Volume));
    }
    if count != 0.0 {
        parts.push(units::display_total(count, UnitFamily::Count));
    }
    if parts.is_empty() {
        "0".to_string()
    } else {
        parts.join(" + ")
    }
}

pub(crate) fn opt_id_cell(id: Option<i64>) -> CellValue {
    match id {
        Some(id) => CellValue::Int(id),
        None => CellValue::Empty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::filter::QuantityCriterion;
    use crate::query::predicate::CompareOp;

    fn harina() -> StockItem {
        serde_json::from_str(
            r#"{"id": 1, "name": "Harina", "stock": 500, "unit": "g",
                "price": 120, "category": "insumo", "low_stock_threshold": 1000}"#,
        )
        .unwrap()
    }

    fn tortas() -> StockItem {
        serde_json::from_str(
            r#"{"id": 2, "name": "Torta", "stock": 3, "unit": "u",
                "price": 2500, "category": "producto", "low_stock_threshold": 1}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_unit_aware_quantity_filter() {
        let records = vec![harina(), tortas()];
        let filters = StockFilters {
            quantity: QuantityCriterion {
                raw: "0.5".to_string(),
                op: CompareOp::Equals,
                unit: Unit::Kilograms,
            },
            ..StockFilters::default()
        };
        let result = execute(&records, &filters);
        // The count-unit record is incompatible with a Kg filter
        assert_eq!(result.data.len(), 1);
        let row = &result.data[0];
        assert_eq!(row.get("stock").unwrap().display(), "0.5Kg");
        assert_eq!(row.get("status").unwrap().display(), "Stock Bajo");
    }

    #[test]
    fn test_name_filter_and_summary() {
        let records = vec![harina(), tortas()];
        let result = execute(
            &records,
            &StockFilters {
                name: crate::query::filter::TextCriterion::new(
                    "torta",
                    crate::query::predicate::TextOp::Contains,
                ),
                ..StockFilters::default()
            },
        );
        assert_eq!(result.data.len(), 1);
        assert_eq!(result.summary[0].1, SummaryValue::Count(1));
    }

    #[test]
    fn test_category_totals_format() {
        let records = vec![harina(), tortas()];
        let all: Vec<&StockItem> = records.iter().collect();
        assert_eq!(category_totals(&all, true), "0.50Kg");
        assert_eq!(category_totals(&all, false), "3U");
    }

    #[test]
    fn test_status_filter() {
        let records = vec![harina(), tortas()];
        let filters = StockFilters {
            status: crate::query::filter::SetCriterion(vec!["Stock Bajo".to_string()]),
            ..StockFilters::default()
        };
        let result = execute(&records, &filters);
        assert_eq!(result.data.len(), 1);
        assert_eq!(result.data[0].get("name").unwrap().display(), "Harina");
    }

    #[test]
    fn test_idempotent_runs() {
        let records = vec![harina(), tortas()];
        let filters = StockFilters::default();
        let a = execute(&records, &filters);
        let b = execute(&records, &filters);
        assert_eq!(a, b);
    }
}
