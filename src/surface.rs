//! # Drawing Surface
//!
//! The drawing capability the layout engine renders through. The engine
//! only ever strokes rectangles, draws wrapped text, measures wrapped text,
//! and starts pages; everything else about the output format lives behind
//! this trait.
//!
//! Coordinates are top-down page coordinates in points: `(0, 0)` is the
//! top-left corner of the page.
//!
//! A surface belongs to exactly one render. Once any call has failed the
//! surface must not be reused.

use std::fmt::Write as _;

use crate::error::ReportError;
use crate::model::{Metadata, PageConfig};
use crate::style::TextStyle;
use crate::text::TextLayout;

/// The box a piece of text is wrapped into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextFrame {
    pub x: f64,
    pub y: f64,
    /// Wrap width.
    pub width: f64,
    /// Lines that would extend below `y + max_height` are not drawn.
    pub max_height: Option<f64>,
}

impl TextFrame {
    pub fn new(x: f64, y: f64, width: f64) -> Self {
        Self {
            x,
            y,
            width,
            max_height: None,
        }
    }

    pub fn clipped_to(mut self, max_height: f64) -> Self {
        self.max_height = Some(max_height);
        self
    }
}

pub trait Surface {
    /// Open the document and its first page.
    fn begin_document(&mut self, page: &PageConfig, metadata: &Metadata) -> Result<(), ReportError>;

    /// Close the current page and start a fresh one with the same setup.
    fn add_page(&mut self) -> Result<(), ReportError>;

    fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64) -> Result<(), ReportError>;

    /// Draw `text` wrapped to `frame.width`, top of the first line at `frame.y`.
    fn draw_text(&mut self, text: &str, frame: TextFrame, style: &TextStyle) -> Result<(), ReportError>;

    /// Height `text` occupies when wrapped to `max_width`.
    fn measure_text_height(&self, text: &str, max_width: f64, style: &TextStyle) -> f64;

    /// Finish the document and hand back its bytes.
    fn finalize(&mut self) -> Result<Vec<u8>, ReportError>;
}

/// One call made against a [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    BeginDocument { width: f64, height: f64 },
    AddPage,
    StrokeRect { x: f64, y: f64, width: f64, height: f64 },
    Text { text: String, frame: TextFrame, style: TextStyle },
    Finalize,
}

/// A surface that records every call instead of producing a file.
///
/// Measurement uses the same font metrics and line breaker as the PDF
/// backend, so layouts recorded here match what gets printed. `finalize`
/// returns a plain-text transcript of the recorded calls.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    ops: Vec<DrawOp>,
    text_layout: TextLayout,
    page_open: bool,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Recorded drawing calls grouped by page.
    pub fn pages(&self) -> Vec<Vec<&DrawOp>> {
        let mut pages: Vec<Vec<&DrawOp>> = Vec::new();
        for op in &self.ops {
            match op {
                DrawOp::BeginDocument { .. } | DrawOp::AddPage => pages.push(Vec::new()),
                DrawOp::Finalize => {}
                _ => {
                    if let Some(page) = pages.last_mut() {
                        page.push(op);
                    }
                }
            }
        }
        pages
    }

    pub fn page_count(&self) -> usize {
        self.pages().len()
    }

    /// Every string drawn, in drawing order.
    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    fn require_page(&self, op: &str) -> Result<(), ReportError> {
        if self.page_open {
            Ok(())
        } else {
            Err(ReportError::Surface(format!("{op} called with no open page")))
        }
    }
}

impl Surface for RecordingSurface {
    fn begin_document(&mut self, page: &PageConfig, _metadata: &Metadata) -> Result<(), ReportError> {
        if !self.ops.is_empty() {
            return Err(ReportError::Surface("document already begun".to_string()));
        }
        let (width, height) = page.dimensions();
        self.ops.push(DrawOp::BeginDocument { width, height });
        self.page_open = true;
        Ok(())
    }

    fn add_page(&mut self) -> Result<(), ReportError> {
        self.require_page("add_page")?;
        self.ops.push(DrawOp::AddPage);
        Ok(())
    }

    fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64) -> Result<(), ReportError> {
        self.require_page("stroke_rect")?;
        self.ops.push(DrawOp::StrokeRect { x, y, width, height });
        Ok(())
    }

    fn draw_text(&mut self, text: &str, frame: TextFrame, style: &TextStyle) -> Result<(), ReportError> {
        self.require_page("draw_text")?;
        self.ops.push(DrawOp::Text {
            text: text.to_string(),
            frame,
            style: *style,
        });
        Ok(())
    }

    fn measure_text_height(&self, text: &str, max_width: f64, style: &TextStyle) -> f64 {
        self.text_layout.measure_height(text, max_width, style)
    }

    fn finalize(&mut self) -> Result<Vec<u8>, ReportError> {
        self.require_page("finalize")?;
        self.ops.push(DrawOp::Finalize);
        self.page_open = false;

        let mut transcript = String::new();
        for op in &self.ops {
            let _ = writeln!(transcript, "{:?}", op);
        }
        Ok(transcript.into_bytes())
    }
}
