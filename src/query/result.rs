//! The uniform result envelope
//!
//! Every executor produces the same shape — `{ title, summary, data }` —
//! consumed identically by console rendering, export and the active-query
//! snapshot. Rows and summary entries preserve insertion order, including
//! through a JSON round trip, so a re-run of the same query against the
//! same records is byte-for-byte identical.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A single table cell
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Int(i64),
    /// Monetary / measured value, rendered with two decimals
    Money(f64),
    /// Plain numeric value, trailing zeros trimmed
    Number(f64),
    Empty,
}

impl CellValue {
    /// Render for tables and CSV
    pub fn display(&self) -> String {
        match self {
            CellValue::Text(s) => s.clone(),
            CellValue::Int(n) => n.to_string(),
            CellValue::Money(v) => format!("{:.2}", v),
            CellValue::Number(v) => {
                let s = format!("{:.3}", v);
                s.trim_end_matches('0').trim_end_matches('.').to_string()
            }
            CellValue::Empty => String::new(),
        }
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CellValue::Text(s) => serializer.serialize_str(s),
            CellValue::Int(n) => serializer.serialize_i64(*n),
            CellValue::Money(v) | CellValue::Number(v) => serializer.serialize_f64(*v),
            CellValue::Empty => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for CellValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(match value {
            serde_json::Value::Null => CellValue::Empty,
            serde_json::Value::String(s) => CellValue::Text(s),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    CellValue::Int(i)
                } else {
                    CellValue::Number(n.as_f64().unwrap_or(0.0))
                }
            }
            other => CellValue::Text(other.to_string()),
        })
    }
}

/// One flat result row: ordered (column, cell) pairs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cells: Vec<(String, CellValue)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style cell append; insertion order is the column order
    pub fn cell(mut self, key: &str, value: CellValue) -> Self {
        self.cells.push((key.to_string(), value));
        self
    }

    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.cells.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn columns(&self) -> Vec<&str> {
        self.cells.iter().map(|(k, _)| k.as_str()).collect()
    }

    pub fn values(&self) -> impl Iterator<Item = &CellValue> {
        self.cells.iter().map(|(_, v)| v)
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (key, value) in &self.cells {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Row {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RowVisitor;

        impl<'de> Visitor<'de> for RowVisitor {
            type Value = Row;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a result row object")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Row, A::Error> {
                let mut cells = Vec::new();
                while let Some((key, value)) = map.next_entry::<String, CellValue>()? {
                    cells.push((key, value));
                }
                Ok(Row { cells })
            }
        }

        deserializer.deserialize_map(RowVisitor)
    }
}

/// A summary entry value: a scalar, or a structured breakdown kept as a
/// dedicated entry so renderers can special-case it instead of receiving
/// it flattened into the top-level mapping.
#[derive(Debug, Clone, PartialEq)]
pub enum SummaryValue {
    Text(String),
    Count(i64),
    Money(f64),
    Breakdown(Vec<(String, f64)>),
}

impl SummaryValue {
    pub fn display(&self) -> String {
        match self {
            SummaryValue::Text(s) => s.clone(),
            SummaryValue::Count(n) => n.to_string(),
            SummaryValue::Money(v) => format!("{:.2}", v),
            SummaryValue::Breakdown(entries) => entries
                .iter()
                .map(|(k, v)| format!("{}: {:.2}", k, v))
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

impl Serialize for SummaryValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SummaryValue::Text(s) => serializer.serialize_str(s),
            SummaryValue::Count(n) => serializer.serialize_i64(*n),
            SummaryValue::Money(v) => serializer.serialize_f64(*v),
            SummaryValue::Breakdown(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for SummaryValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SummaryVisitor;

        impl<'de> Visitor<'de> for SummaryVisitor {
            type Value = SummaryValue;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a scalar or breakdown summary value")
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<SummaryValue, E> {
                Ok(SummaryValue::Text(v.to_string()))
            }

            fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<SummaryValue, E> {
                Ok(SummaryValue::Count(v))
            }

            fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<SummaryValue, E> {
                Ok(SummaryValue::Count(v as i64))
            }

            fn visit_f64<E: serde::de::Error>(self, v: f64) -> Result<SummaryValue, E> {
                Ok(SummaryValue::Money(v))
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<SummaryValue, A::Error> {
                let mut entries = Vec::new();
                while let Some((key, value)) = map.next_entry::<String, f64>()? {
                    entries.push((key, value));
                }
                Ok(SummaryValue::Breakdown(entries))
            }
        }

        deserializer.deserialize_any(SummaryVisitor)
    }
}

/// The normalized result envelope produced by every executor
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    pub title: String,
    pub summary: Vec<(String, SummaryValue)>,
    pub data: Vec<Row>,
}

impl QueryResult {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            summary: Vec::new(),
            data: Vec::new(),
        }
    }

    pub fn summary_entry(&mut self, key: &str, value: SummaryValue) {
        self.summary.push((key.to_string(), value));
    }

    /// Push a row, preserving executor-produced order
    pub fn push_row(&mut self, row: Row) {
        self.data.push(row);
    }

    /// Column keys of the first row; every executor emits homogeneous rows
    pub fn columns(&self) -> Vec<&str> {
        self.data.first().map(Row::columns).unwrap_or_default()
    }
}

impl Serialize for QueryResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("title", &self.title)?;
        map.serialize_entry("summary", &OrderedSummary(&self.summary))?;
        map.serialize_entry("data", &self.data)?;
        map.end()
    }
}

struct OrderedSummary<'a>(&'a [(String, SummaryValue)]);

impl Serialize for OrderedSummary<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for QueryResult {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ResultVisitor;

        impl<'de> Visitor<'de> for ResultVisitor {
            type Value = QueryResult;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a result envelope")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<QueryResult, A::Error> {
                let mut result = QueryResult::default();
                while let Some(key) = map.next_key::<String>()? {
                    match key.as_str() {
                        "title" => result.title = map.next_value()?,
                        "summary" => result.summary = map.next_value::<SummaryEntries>()?.0,
                        "data" => result.data = map.next_value()?,
                        _ => {
                            map.next_value::<serde::de::IgnoredAny>()?;
                        }
                    }
                }
                Ok(result)
            }
        }

        deserializer.deserialize_map(ResultVisitor)
    }
}

struct SummaryEntries(Vec<(String, SummaryValue)>);

impl<'de> Deserialize<'de> for SummaryEntries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = SummaryEntries;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a summary mapping")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<SummaryEntries, A::Error> {
                let mut entries = Vec::new();
                while let Some((key, value)) = map.next_entry::<String, SummaryValue>()? {
                    entries.push((key, value));
                }
                Ok(SummaryEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> QueryResult {
        let mut result = QueryResult::new("Reporte de Ventas");
        result.summary_entry("totalSales", SummaryValue::Count(2));
        result.summary_entry("totalRevenue", SummaryValue::Money(350.5));
        result.summary_entry(
            "porTipo",
            SummaryValue::Breakdown(vec![
                ("Entrada".to_string(), 300.0),
                ("Salida".to_string(), 50.5),
            ]),
        );
        result.push_row(
            Row::new()
                .cell("id", CellValue::Int(2))
                .cell("product", CellValue::Text("Torta".to_string()))
                .cell("total", CellValue::Money(300.0)),
        );
        result.push_row(
            Row::new()
                .cell("id", CellValue::Empty)
                .cell("product", CellValue::Text("Pan".to_string()))
                .cell("total", CellValue::Money(50.5)),
        );
        result
    }

    #[test]
    fn test_columns_come_from_first_row() {
        assert_eq!(sample().columns(), vec!["id", "product", "total"]);
    }

    #[test]
    fn test_serialization_preserves_order() {
        let json = serde_json::to_string(&sample()).unwrap();
        let id_pos = json.find("\"id\"").unwrap();
        let product_pos = json.find("\"product\"").unwrap();
        let total_pos = json.find("\"total\"").unwrap();
        assert!(id_pos < product_pos && product_pos < total_pos);
        let sales_pos = json.find("totalSales").unwrap();
        let revenue_pos = json.find("totalRevenue").unwrap();
        assert!(sales_pos < revenue_pos);
    }

    #[test]
    fn test_json_round_trip_is_stable() {
        let original = sample();
        let json = serde_json::to_string(&original).unwrap();
        let restored: QueryResult = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.title, original.title);
        assert_eq!(restored.columns(), original.columns());
        // Byte-for-byte stable across the round trip
        assert_eq!(json, serde_json::to_string(&restored).unwrap());
    }

    #[test]
    fn test_breakdown_stays_structured() {
        let json = serde_json::to_value(&sample()).unwrap();
        assert!(json["summary"]["porTipo"].is_object());
        assert_eq!(json["summary"]["porTipo"]["Entrada"], 300.0);
    }

    #[test]
    fn test_cell_display() {
        assert_eq!(CellValue::Money(12.5).display(), "12.50");
        assert_eq!(CellValue::Number(12.5).display(), "12.5");
        assert_eq!(CellValue::Number(3.0).display(), "3");
        assert_eq!(CellValue::Int(-4).display(), "-4");
        assert_eq!(CellValue::Empty.display(), "");
    }
}
