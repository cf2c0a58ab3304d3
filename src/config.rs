//! Report configuration loaded from TOML.
//!
//! Every key is optional. A missing file section falls back to the
//! built-in US Letter landscape layout with 30pt margins.
//!
//! ```toml
//! [page]
//! size = "letter"
//! orientation = "landscape"
//! margin = 30
//!
//! [fonts]
//! title_size = 18
//! body_size = 9
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::layout::{LayoutEngine, Typography, MIN_ROW_HEIGHT};
use crate::model::{Edges, Orientation, PageConfig, PageSize, ReportKind};
use crate::schema::Schema;

/// Errors that can occur while loading or validating configuration.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    /// Failed to read config file.
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    /// Config file contains invalid TOML or unknown keys.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    /// The printable width can't hold the widest column schema.
    #[error("Printable width {printable:.1}pt is narrower than the {required:.1}pt table")]
    PageTooNarrow { printable: f64, required: f64 },

    /// The printable height can't hold the tallest header row plus one body row.
    #[error("Printable height {printable:.1}pt can't fit a header and one row ({required:.1}pt)")]
    PageTooShort { printable: f64, required: f64 },

    #[error("Invalid {field}: {value}")]
    InvalidValue { field: &'static str, value: f64 },
}

/// TOML configuration file structure.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub page: Option<PageSection>,
    #[serde(default)]
    pub fonts: Option<FontSection>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PageSection {
    #[serde(default)]
    pub size: Option<PageSize>,
    #[serde(default)]
    pub orientation: Option<Orientation>,
    #[serde(default)]
    pub margin: Option<Margin>,
}

/// A margin given either as one number or per edge.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Margin {
    Uniform(f64),
    Edges(Edges),
}

impl From<Margin> for Edges {
    fn from(margin: Margin) -> Self {
        match margin {
            Margin::Uniform(v) => Edges::uniform(v),
            Margin::Edges(edges) => edges,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FontSection {
    #[serde(default)]
    pub title_size: Option<f64>,
    #[serde(default)]
    pub timestamp_size: Option<f64>,
    #[serde(default)]
    pub header_size: Option<f64>,
    #[serde(default)]
    pub body_size: Option<f64>,
    #[serde(default)]
    pub footer_size: Option<f64>,
}

/// Fully resolved configuration the layout engine runs with.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ReportConfig {
    pub page: PageConfig,
    pub typography: Typography,
}

impl ReportConfig {
    /// Load and validate configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let file: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        debug!(path = %path.display(), "loaded config file");
        Self::from_file(file)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(contents).map_err(|e| ConfigError::ParseError {
            path: PathBuf::from("<inline>"),
            reason: e.to_string(),
        })?;
        Self::from_file(file)
    }

    /// Overlay a parsed file onto the defaults and validate the result.
    pub fn from_file(file: ConfigFile) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(page) = file.page {
            if let Some(size) = page.size {
                config.page.size = size;
            }
            if let Some(orientation) = page.orientation {
                config.page.orientation = orientation;
            }
            if let Some(margin) = page.margin {
                config.page.margin = margin.into();
            }
        }

        if let Some(fonts) = file.fonts {
            let t = &mut config.typography;
            t.title_size = fonts.title_size.unwrap_or(t.title_size);
            t.timestamp_size = fonts.timestamp_size.unwrap_or(t.timestamp_size);
            t.header_size = fonts.header_size.unwrap_or(t.header_size);
            t.body_size = fonts.body_size.unwrap_or(t.body_size);
            t.footer_size = fonts.footer_size.unwrap_or(t.footer_size);
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject geometry the table can't be laid out in.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let margin = self.page.margin;
        for (field, value) in [
            ("margin.top", margin.top),
            ("margin.right", margin.right),
            ("margin.bottom", margin.bottom),
            ("margin.left", margin.left),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidValue { field, value });
            }
        }

        let t = &self.typography;
        for (field, value) in [
            ("fonts.title_size", t.title_size),
            ("fonts.timestamp_size", t.timestamp_size),
            ("fonts.header_size", t.header_size),
            ("fonts.body_size", t.body_size),
            ("fonts.footer_size", t.footer_size),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidValue { field, value });
            }
        }

        if let PageSize::Custom { width, height } = self.page.size {
            for (field, value) in [("size.width", width), ("size.height", height)] {
                if !value.is_finite() || value <= 0.0 {
                    return Err(ConfigError::InvalidValue { field, value });
                }
            }
        }

        let printable = self.page.printable_width();
        let required = Schema::widest();
        if printable < required {
            return Err(ConfigError::PageTooNarrow {
                printable,
                required,
            });
        }

        let engine = LayoutEngine::from_config(self);
        let tallest_header = ReportKind::ALL
            .iter()
            .map(|kind| engine.header_row_height(Schema::for_kind(*kind)))
            .fold(0.0, f64::max);
        let printable = self.page.bounds().height();
        let required = tallest_header + MIN_ROW_HEIGHT;
        if printable < required {
            return Err(ConfigError::PageTooShort {
                printable,
                required,
            });
        }

        Ok(())
    }
}
