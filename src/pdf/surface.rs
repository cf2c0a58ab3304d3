//! The [`Surface`] that produces PDF bytes.
//!
//! Drawing calls are collected into [`PdfPage`]s as they arrive; nothing is
//! serialized until `finalize`. Text is broken into lines here with the
//! same [`TextLayout`] used for measurement, so what the layout engine
//! measured is exactly what gets printed.

use tracing::trace;

use super::{PageElement, PdfPage, PdfWriter, TextLine};
use crate::error::ReportError;
use crate::model::{Metadata, PageConfig};
use crate::style::{Color, TextStyle};
use crate::surface::{Surface, TextFrame};
use crate::text::TextLayout;

const BORDER_WIDTH: f64 = 1.0;

#[derive(Debug, Default)]
enum State {
    #[default]
    Empty,
    Open,
    Finished,
}

#[derive(Debug, Default)]
pub struct PdfSurface {
    state: State,
    page_size: (f64, f64),
    metadata: Metadata,
    pages: Vec<PdfPage>,
    text_layout: TextLayout,
}

impl PdfSurface {
    pub fn new() -> Self {
        Self::default()
    }

    fn current_page(&mut self, op: &str) -> Result<&mut PdfPage, ReportError> {
        match self.state {
            State::Open => self
                .pages
                .last_mut()
                .ok_or_else(|| ReportError::Surface(format!("{op}: document has no pages"))),
            State::Empty => Err(ReportError::Surface(format!(
                "{op} called before begin_document"
            ))),
            State::Finished => Err(ReportError::Surface(format!(
                "{op} called after finalize"
            ))),
        }
    }

    fn push_page(&mut self) {
        let (width, height) = self.page_size;
        self.pages.push(PdfPage {
            width,
            height,
            elements: Vec::new(),
        });
    }
}

impl Surface for PdfSurface {
    fn begin_document(&mut self, page: &PageConfig, metadata: &Metadata) -> Result<(), ReportError> {
        if !matches!(self.state, State::Empty) {
            return Err(ReportError::Surface("document already begun".to_string()));
        }
        self.page_size = page.dimensions();
        self.metadata = metadata.clone();
        self.state = State::Open;
        self.push_page();
        Ok(())
    }

    fn add_page(&mut self) -> Result<(), ReportError> {
        self.current_page("add_page")?;
        self.push_page();
        trace!(page = self.pages.len(), "started page");
        Ok(())
    }

    fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64) -> Result<(), ReportError> {
        let page = self.current_page("stroke_rect")?;
        page.elements.push(PageElement::StrokeRect {
            x,
            y,
            width,
            height,
            line_width: BORDER_WIDTH,
            color: Color::BLACK,
        });
        Ok(())
    }

    fn draw_text(&mut self, text: &str, frame: TextFrame, style: &TextStyle) -> Result<(), ReportError> {
        let broken = self.text_layout.break_into_lines(text, frame.width, style);
        let line_height = style.line_height();
        let ascent = style.font.metrics().ascent(style.font_size);

        let mut lines = Vec::with_capacity(broken.len());
        for (i, line) in broken.into_iter().enumerate() {
            let top = i as f64 * line_height;
            if let Some(max) = frame.max_height {
                if top + line_height > max {
                    break;
                }
            }
            let text = line.text.trim_end_matches(' ');
            if text.is_empty() {
                continue;
            }
            lines.push(TextLine {
                x: frame.x,
                baseline: frame.y + top + ascent,
                text: text.to_string(),
            });
        }

        let page = self.current_page("draw_text")?;
        if !lines.is_empty() {
            page.elements.push(PageElement::Text {
                lines,
                font: style.font,
                font_size: style.font_size,
                color: style.color,
            });
        }
        Ok(())
    }

    fn measure_text_height(&self, text: &str, max_width: f64, style: &TextStyle) -> f64 {
        self.text_layout.measure_height(text, max_width, style)
    }

    fn finalize(&mut self) -> Result<Vec<u8>, ReportError> {
        self.current_page("finalize")?;
        self.state = State::Finished;
        let pages = std::mem::take(&mut self.pages);
        Ok(PdfWriter::new().write(&pages, &self.metadata))
    }
}
