//! # Report Model
//!
//! The input representation for the renderer: loosely typed log records,
//! the report kind that selects a column schema, and the page geometry the
//! layout engine works against.
//!
//! Records are deliberately *not* strongly typed. They come from client
//! storage that has changed shape over time, so every field may be missing,
//! null, or of the wrong type. The schema module is responsible for turning
//! whatever is there into display strings.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Display title used when the caller supplies none.
pub const DEFAULT_TITLE: &str = "Symptom Report";

/// One log entry of unknown shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Value);

impl Record {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Look up a field. Records that are not JSON objects have no fields.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.0.as_object().and_then(|map| map.get(key))
    }
}

impl From<Value> for Record {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// The three kinds of log the renderer knows how to lay out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReportKind {
    Headache,
    Pain,
    BloodPressure,
}

impl ReportKind {
    pub const ALL: [ReportKind; 3] = [
        ReportKind::Headache,
        ReportKind::Pain,
        ReportKind::BloodPressure,
    ];

    /// Infer the kind from a free-text title by keyword.
    ///
    /// Priority is fixed: headache/migraine, then blood pressure/bp, then
    /// pain. Anything else, including a missing title, is a headache report.
    pub fn infer(title: Option<&str>) -> ReportKind {
        let t = title.unwrap_or("").to_lowercase();

        if t.contains("headache") || t.contains("migraine") {
            return ReportKind::Headache;
        }
        if t.contains("blood pressure") || t.contains("bloodpressure") || t.contains("bp") {
            return ReportKind::BloodPressure;
        }
        if t.contains("pain") {
            return ReportKind::Pain;
        }

        ReportKind::Headache
    }

    /// Human-readable label, used as the document subject.
    pub fn label(&self) -> &'static str {
        match self {
            ReportKind::Headache => "Headache log",
            ReportKind::Pain => "Pain log",
            ReportKind::BloodPressure => "Blood pressure log",
        }
    }

    /// File name a delivery transport can attach the document under.
    pub fn file_name(&self) -> &'static str {
        match self {
            ReportKind::Headache => "headache_report.pdf",
            ReportKind::Pain => "pain_report.pdf",
            ReportKind::BloodPressure => "blood_pressure_report.pdf",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReportKind::Headache => "headache",
            ReportKind::Pain => "pain",
            ReportKind::BloodPressure => "blood-pressure",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown report kind {0:?} (expected headache, pain, or blood-pressure)")]
pub struct ParseReportKindError(pub String);

impl FromStr for ReportKind {
    type Err = ParseReportKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "headache" | "migraine" => Ok(ReportKind::Headache),
            "pain" => Ok(ReportKind::Pain),
            "bloodpressure" | "blood-pressure" | "blood_pressure" | "blood pressure" | "bp" => {
                Ok(ReportKind::BloodPressure)
            }
            _ => Err(ParseReportKindError(s.to_string())),
        }
    }
}

/// Per-call rendering options.
#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    /// Visible document title. Also selects the kind when `kind` is unset.
    pub title: Option<String>,
    /// Explicit report kind. Takes precedence over title keywords.
    pub kind: Option<ReportKind>,
    /// Timestamp printed under the title. Defaults to the local clock.
    pub generated_at: Option<NaiveDateTime>,
}

impl ReportOptions {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn with_kind(mut self, kind: ReportKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn generated_at(mut self, at: NaiveDateTime) -> Self {
        self.generated_at = Some(at);
        self
    }

    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(DEFAULT_TITLE)
    }

    pub fn resolved_kind(&self) -> ReportKind {
        self.kind
            .unwrap_or_else(|| ReportKind::infer(self.title.as_deref()))
    }
}

/// Document metadata embedded in the PDF info dictionary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub title: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
}

/// Configuration for a page: size, orientation, margins.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageConfig {
    #[serde(default)]
    pub size: PageSize,
    #[serde(default)]
    pub orientation: Orientation,
    /// Page margins in points (1/72 inch).
    #[serde(default = "default_margin")]
    pub margin: Edges,
}

fn default_margin() -> Edges {
    Edges::uniform(30.0)
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            size: PageSize::Letter,
            orientation: Orientation::Landscape,
            margin: default_margin(),
        }
    }
}

impl PageConfig {
    /// Returns (width, height) in points after applying orientation.
    pub fn dimensions(&self) -> (f64, f64) {
        let (w, h) = self.size.dimensions();
        let (short, long) = if w <= h { (w, h) } else { (h, w) };
        match self.orientation {
            Orientation::Portrait => (short, long),
            Orientation::Landscape => (long, short),
        }
    }

    pub fn printable_width(&self) -> f64 {
        self.dimensions().0 - self.margin.horizontal()
    }

    pub fn bounds(&self) -> PageBounds {
        let (w, h) = self.dimensions();
        PageBounds {
            left: self.margin.left,
            right: w - self.margin.right,
            top: self.margin.top,
            bottom: h - self.margin.bottom,
        }
    }
}

/// Standard page sizes in points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSize {
    A4,
    A3,
    #[default]
    Letter,
    Legal,
    Tabloid,
    Custom {
        width: f64,
        height: f64,
    },
}

impl PageSize {
    /// Returns (width, height) in points, portrait.
    pub fn dimensions(&self) -> (f64, f64) {
        match self {
            PageSize::A4 => (595.28, 841.89),
            PageSize::A3 => (841.89, 1190.55),
            PageSize::Letter => (612.0, 792.0),
            PageSize::Legal => (612.0, 1008.0),
            PageSize::Tabloid => (792.0, 1224.0),
            PageSize::Custom { width, height } => (*width, *height),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Portrait,
    #[default]
    Landscape,
}

/// Edge values (top, right, bottom, left) used for margins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Edges {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Edges {
    pub fn uniform(v: f64) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }
}

/// The drawable area of a page, in top-down page coordinates.
/// Fixed for the whole render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBounds {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl PageBounds {
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }
}

/// Where the next thing gets drawn on the current page.
///
/// Owned by a single render call and passed by value: every drawing step
/// takes a cursor and hands back the advanced one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cursor {
    pub x: f64,
    pub y: f64,
}

impl Cursor {
    /// Top-left of the printable area of a fresh page.
    pub fn top_of(bounds: &PageBounds) -> Self {
        Self {
            x: bounds.left,
            y: bounds.top,
        }
    }

    pub fn down(self, dy: f64) -> Self {
        Self {
            x: self.x,
            y: self.y + dy,
        }
    }
}
