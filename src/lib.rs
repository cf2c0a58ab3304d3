//! # Symptom Report
//!
//! Renders health log records (headache, pain, blood pressure) as a
//! paginated, bordered PDF table.
//!
//! Layout is page-native: each row is measured before it is drawn and
//! placed against the bottom margin of the page it lands on. A row that
//! doesn't fit moves, whole, to a new page, and the column header row is
//! repeated at the top of every page.
//!
//! ## Architecture
//!
//! ```text
//! Input (JSON records + title/kind)
//!       ↓
//!   [schema]   Pick the column set, project each record to cell strings
//!       ↓
//!   [layout]   Measure rows, decide page breaks, drive the surface
//!       ↓
//!   [surface]  Abstract drawing capability
//!       ↓
//!   [pdf]      Collect pages, serialize to PDF bytes
//! ```

pub mod config;
pub mod error;
pub mod font;
pub mod layout;
pub mod logging;
pub mod model;
pub mod pdf;
pub mod schema;
pub mod style;
pub mod surface;
pub mod text;

use std::io::Write;

use base64::Engine as _;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

pub use config::ReportConfig;
pub use error::ReportError;
pub use model::{Record, ReportKind, ReportOptions};

use layout::LayoutEngine;
use pdf::PdfSurface;
use surface::Surface;

/// Content type of the rendered document.
pub const MIME_TYPE: &str = "application/pdf";

/// Render records to PDF bytes with the default page setup.
///
/// This is the primary entry point. Malformed records never fail the
/// render; they show up as blank cells.
pub fn render(records: &[Record], options: &ReportOptions) -> Result<Vec<u8>, ReportError> {
    render_with_config(records, options, &ReportConfig::default())
}

/// Render records to PDF bytes with an explicit configuration.
pub fn render_with_config(
    records: &[Record],
    options: &ReportOptions,
    config: &ReportConfig,
) -> Result<Vec<u8>, ReportError> {
    render_with(&mut PdfSurface::new(), records, options, config)
}

/// Render through any drawing surface.
pub fn render_with<S: Surface>(
    surface: &mut S,
    records: &[Record],
    options: &ReportOptions,
    config: &ReportConfig,
) -> Result<Vec<u8>, ReportError> {
    config.validate()?;
    LayoutEngine::from_config(config).render(surface, records, options)
}

/// Render a report described as JSON to PDF bytes.
///
/// Accepts a bare array of records, an object
/// `{ "title": ..., "kind": ..., "records": [...] }`, or a request body
/// `{ "data": { "logData": [...] }, "metadata": { "exportType": ... } }`.
pub fn render_json(json: &str) -> Result<Vec<u8>, ReportError> {
    let (records, options) = parse_input(json)?;
    render(&records, &options)
}

/// Render and write the finished document to `writer`.
///
/// Nothing is written unless rendering succeeds.
pub fn render_to_writer<W: Write>(
    writer: &mut W,
    records: &[Record],
    options: &ReportOptions,
    config: &ReportConfig,
) -> Result<usize, ReportError> {
    let bytes = render_with_config(records, options, config)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(bytes.len())
}

/// Base64 text of a rendered document, for transports that carry
/// attachments as strings.
pub fn to_base64(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

/// Attachment file name for a report kind, e.g. `headache_report.pdf`.
pub fn suggested_file_name(kind: ReportKind) -> &'static str {
    kind.file_name()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ReportInput {
    Records(Vec<Record>),
    Object(Map<String, Value>),
}

/// Parse any accepted JSON input shape into records and options.
///
/// Fields of the wrong type are treated as absent: a non-array record list
/// is empty, a non-string title is no title, an unknown kind is inferred
/// from the title.
pub fn parse_input(json: &str) -> Result<(Vec<Record>, ReportOptions), ReportError> {
    let input: ReportInput = serde_json::from_str(json)?;
    let object = match input {
        ReportInput::Records(records) => return Ok((records, ReportOptions::default())),
        ReportInput::Object(object) => object,
    };

    let (records, title, kind) = match object.get("data") {
        Some(data) => {
            let metadata = object.get("metadata");
            (
                data.get("logData"),
                metadata.and_then(|m| m.get("exportType")),
                metadata.and_then(|m| m.get("kind")),
            )
        }
        None => (object.get("records"), object.get("title"), object.get("kind")),
    };

    let records: Vec<Record> = match records {
        Some(Value::Array(items)) => items.iter().cloned().map(Record::new).collect(),
        _ => Vec::new(),
    };
    let options = ReportOptions {
        title: title.and_then(Value::as_str).map(str::to_string),
        kind: kind.and_then(Value::as_str).and_then(|k| k.parse().ok()),
        generated_at: None,
    };

    debug!(records = records.len(), title = ?options.title, kind = ?options.kind, "parsed report input");
    Ok((records, options))
}
