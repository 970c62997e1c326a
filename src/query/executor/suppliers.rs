//! Supplier information query

use crate::entities::Supplier;
use crate::query::executor::stock::opt_id_cell;
use crate::query::filter::SupplierFilters;
use crate::query::predicate::{id_matches, text_matches};
use crate::query::result::{CellValue, QueryResult, Row, SummaryValue};

pub const TITLE: &str = "Información de Proveedores";

pub fn execute(suppliers: &[Supplier], filters: &SupplierFilters) -> QueryResult {
    let matched: Vec<&Supplier> = suppliers
        .iter()
        .filter(|supplier| matches(supplier, filters))
        .collect();

    let mut result = QueryResult::new(TITLE);
    result.summary_entry("totalSuppliers", SummaryValue::Count(matched.len() as i64));

    for supplier in matched {
        result.push_row(
            Row::new()
                .cell("id", opt_id_cell(supplier.id))
                .cell("name", CellValue::Text(supplier.name.clone()))
                .cell("cuit", CellValue::Text(supplier.cuit.clone()))
                .cell("phone", CellValue::Text(supplier.phone.clone()))
                .cell("address", CellValue::Text(supplier.address.clone()))
                .cell("products", CellValue::Text(supplier.products.joined())),
        );
    }
    result
}

fn matches(supplier: &Supplier, filters: &SupplierFilters) -> bool {
    if let Some(operand) = filters.id.id_operand() {
        match supplier.id {
            Some(id) if id_matches(id, filters.id.op, operand) => {}
            _ => return false,
        }
    }
    let text_fields = [
        (&filters.name, supplier.name.as_str()),
        (&filters.cuit, supplier.cuit.as_str()),
        (&filters.phone, supplier.phone.as_str()),
        (&filters.address, supplier.address.as_str()),
    ];
    for (criterion, value) in text_fields {
        if criterion.is_active() && !text_matches(value, criterion.op, &criterion.value) {
            return false;
        }
    }
    if filters.products.is_active() {
        let joined = supplier.products.joined();
        if !text_matches(&joined, filters.products.op, &filters.products.value) {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::filter::TextCriterion;
    use crate::query::predicate::TextOp;

    fn suppliers() -> Vec<Supplier> {
        serde_json::from_str(
            r#"[
                {"id": 1, "name": "Molinos SA", "cuit": "30123456789",
                 "phone": "1144445555", "address": "Av. Siempre Viva 100",
                 "products": [{"productName": "harina"}, {"productName": "levadura"}]},
                {"id": 2, "name": "Lácteos del Sur", "cuit": "30987654321",
                 "phone": "1166667777", "address": "Ruta 2 km 40",
                 "products": "leche, manteca, crema"}
            ]"#,
        )
        .unwrap()
    }

    #[test]
    fn test_products_filter_spans_both_shapes() {
        let by_list = execute(
            &suppliers(),
            &SupplierFilters {
                products: TextCriterion::new("harina", TextOp::Contains),
                ..SupplierFilters::default()
            },
        );
        assert_eq!(by_list.data.len(), 1);
        assert_eq!(by_list.data[0].get("name").unwrap().display(), "Molinos SA");

        let by_string = execute(
            &suppliers(),
            &SupplierFilters {
                products: TextCriterion::new("manteca", TextOp::Contains),
                ..SupplierFilters::default()
            },
        );
        assert_eq!(by_string.data.len(), 1);
        assert_eq!(
            by_string.data[0].get("name").unwrap().display(),
            "Lácteos del Sur"
        );
    }

    #[test]
    fn test_cuit_equality_toggle() {
        let filters = SupplierFilters {
            cuit: TextCriterion::new("30123456789", TextOp::Equals),
            ..SupplierFilters::default()
        };
        let result = execute(&suppliers(), &filters);
        assert_eq!(result.data.len(), 1);

        let partial = SupplierFilters {
            cuit: TextCriterion::new("30123", TextOp::Equals),
            ..SupplierFilters::default()
        };
        assert_eq!(execute(&suppliers(), &partial).data.len(), 0);

        let contains = SupplierFilters {
            cuit: TextCriterion::new("30123", TextOp::Contains),
            ..SupplierFilters::default()
        };
        assert_eq!(execute(&suppliers(), &contains).data.len(), 1);
    }

    #[test]
    fn test_summary_counts_matches() {
        let result = execute(&suppliers(), &SupplierFilters::default());
        assert_eq!(result.summary[0].1, SummaryValue::Count(2));
    }
}
