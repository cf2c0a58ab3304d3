//! Structured error types for the report renderer.
//!
//! Malformed records and titles are never errors; they are normalized to
//! safe defaults. What remains are the real failure sources: unparsable
//! JSON input, configuration problems, and failures of the drawing surface
//! or the output writer.

use thiserror::Error;

use crate::config::ConfigError;

/// The unified error type returned by all public rendering functions.
#[derive(Debug, Error)]
pub enum ReportError {
    /// JSON input failed to parse.
    #[error("Failed to parse report input: {source}{}", hint_suffix(.hint))]
    Parse {
        #[source]
        source: serde_json::Error,
        hint: String,
    },
    /// The drawing surface rejected an operation. Terminal for the whole render.
    #[error("Surface error: {0}")]
    Surface(String),
    /// The finished document could not be written out.
    #[error("Write error: {0}")]
    Io(#[from] std::io::Error),
    /// The page configuration is unusable.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

fn hint_suffix(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

impl From<serde_json::Error> for ReportError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "Expected an array of records or an object with a \"records\" array.".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input. Is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        ReportError::Parse { source: e, hint }
    }
}
