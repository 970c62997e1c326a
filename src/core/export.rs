//! Export adapter
//!
//! Turns a result envelope into a downloadable artifact. The engine is
//! agnostic to the bytes; the printable HTML report stands in for the
//! PDF the backend used to render.

use rust_embed::Embed;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use tera::Tera;
use thiserror::Error;

use crate::query::result::{QueryResult, SummaryValue};

#[derive(Embed)]
#[folder = "templates/"]
struct Templates;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
    Html,
}

impl ExportFormat {
    fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::Html => "html",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Csv => "text/csv",
            ExportFormat::Html => "text/html",
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            "html" => Ok(ExportFormat::Html),
            other => Err(ExportError::UnknownFormat(other.to_string())),
        }
    }
}

/// A rendered artifact ready to be written wherever the caller wants
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("formato de exportación no válido: {0}")]
    UnknownFormat(String),

    #[error("no se pudo serializar el reporte: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("no se pudo generar el CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("no se pudo renderizar la plantilla: {0}")]
    Template(#[from] tera::Error),

    #[error("plantilla de reporte no encontrada")]
    MissingTemplate,
}

/// Export a result envelope as a downloadable artifact
pub fn export(
    query_type: &str,
    result: &QueryResult,
    format: ExportFormat,
) -> Result<ExportArtifact, ExportError> {
    let bytes = match format {
        ExportFormat::Json => render_json(query_type, result)?,
        ExportFormat::Csv => render_csv(result)?,
        ExportFormat::Html => render_html(query_type, result)?,
    };
    Ok(ExportArtifact {
        file_name: format!("{}_reporte.{}", query_type, format.extension()),
        content_type: format.content_type(),
        bytes,
    })
}

struct JsonEnvelope<'a> {
    query_type: &'a str,
    result: &'a QueryResult,
}

impl Serialize for JsonEnvelope<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("query_type", self.query_type)?;
        map.serialize_entry("report", self.result)?;
        map.end()
    }
}

fn render_json(query_type: &str, result: &QueryResult) -> Result<Vec<u8>, ExportError> {
    let envelope = JsonEnvelope { query_type, result };
    Ok(serde_json::to_vec_pretty(&envelope)?)
}

fn render_csv(result: &QueryResult) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    let columns = result.columns();
    if !columns.is_empty() {
        writer.write_record(&columns)?;
        for row in &result.data {
            let record: Vec<String> = row.values().map(|cell| cell.display()).collect();
            writer.write_record(&record)?;
        }
    }
    writer
        .into_inner()
        .map_err(|err| ExportError::Csv(err.into_error().into()))
}

fn render_html(query_type: &str, result: &QueryResult) -> Result<Vec<u8>, ExportError> {
    let raw = Templates::get("report.html.tera").ok_or(ExportError::MissingTemplate)?;
    let template =
        std::str::from_utf8(raw.data.as_ref()).map_err(|_| ExportError::MissingTemplate)?;
    let mut tera = Tera::default();
    tera.add_raw_template("report.html", template)?;

    let mut scalars: Vec<serde_json::Value> = Vec::new();
    let mut breakdowns: Vec<serde_json::Value> = Vec::new();
    for (key, value) in &result.summary {
        match value {
            SummaryValue::Breakdown(entries) => breakdowns.push(serde_json::json!({
                "label": key,
                "entries": entries
                    .iter()
                    .map(|(name, value)| serde_json::json!({
                        "name": name,
                        "value": format!("{:.2}", value),
                    }))
                    .collect::<Vec<_>>(),
            })),
            other => scalars.push(serde_json::json!({
                "label": key,
                "value": other.display(),
            })),
        }
    }

    let rows: Vec<Vec<String>> = result
        .data
        .iter()
        .map(|row| row.values().map(|cell| cell.display()).collect())
        .collect();

    let mut context = tera::Context::new();
    context.insert("title", &result.title);
    context.insert("query_type", query_type);
    context.insert("summary", &scalars);
    context.insert("breakdowns", &breakdowns);
    context.insert("columns", &result.columns());
    context.insert("rows", &rows);

    Ok(tera.render("report.html", &context)?.into_bytes())
}
