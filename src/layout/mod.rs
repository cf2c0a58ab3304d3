//! # Page-Aware Table Layout
//!
//! Lays a record sequence out as a bordered table that flows INTO pages.
//!
//! The engine never lays out on an infinite canvas and slices afterwards.
//! Before each row is drawn it is measured, and the question "does this
//! fit?" is asked against the page bottom:
//!
//! 1. Draw the title block on page one.
//! 2. Draw the column header row (itself checked against the bottom).
//! 3. For each record: project it to cells, measure the row, and if it
//!    would cross the bottom margin start a new page, repeat the header,
//!    and draw the row there. Rows are never split.
//! 4. Draw the footer line directly under the last row, without a check.
//!
//! With no records the header is followed by a notice and no footer.
//!
//! The [`Cursor`] is a plain value. Every drawing step takes the cursor it
//! starts at and returns the one after it; nothing reads a shared "current
//! y" off the surface.

pub mod page_break;

use chrono::{Local, NaiveDateTime};
use tracing::{debug, info, warn};

use crate::config::ReportConfig;
use crate::error::ReportError;
use crate::model::{Cursor, Metadata, PageBounds, PageConfig, Record, ReportOptions};
use crate::schema::normalize::format_timestamp;
use crate::schema::Schema;
use crate::style::{Color, TextStyle};
use crate::surface::{Surface, TextFrame};
use crate::text::TextLayout;
use page_break::{cap_height, decide_break, BreakDecision};

/// The column header row is never shorter than this. It grows when a
/// label wraps.
pub const MIN_HEADER_HEIGHT: f64 = 18.0;
/// No body row is shorter than this, whatever it contains.
pub const MIN_ROW_HEIGHT: f64 = 18.0;
/// Horizontal inset of cell text on each side.
pub const CELL_INSET_X: f64 = 3.0;
/// Added to the tallest cell's text height.
pub const ROW_PADDING: f64 = 6.0;
/// Vertical space left between consecutive rows.
pub const ROW_GAP: f64 = 2.0;

const HEADER_INSET_Y: f64 = 4.0;
const HEADER_INSET_BOTTOM: f64 = 2.0;
const CELL_INSET_Y: f64 = 3.0;

pub const EMPTY_NOTICE: &str = "No records provided.";
pub const FOOTER_TEXT: &str = "End of report.";

/// Font sizes for each part of the report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Typography {
    pub title_size: f64,
    pub timestamp_size: f64,
    pub header_size: f64,
    pub body_size: f64,
    pub footer_size: f64,
}

impl Default for Typography {
    fn default() -> Self {
        Self {
            title_size: 18.0,
            timestamp_size: 10.0,
            header_size: 10.0,
            body_size: 9.0,
            footer_size: 9.0,
        }
    }
}

impl Typography {
    fn title(&self) -> TextStyle {
        TextStyle::bold(self.title_size)
    }

    fn timestamp(&self) -> TextStyle {
        TextStyle::regular(self.timestamp_size).with_color(Color::GRAY)
    }

    fn header(&self) -> TextStyle {
        TextStyle::bold(self.header_size)
    }

    fn body(&self) -> TextStyle {
        TextStyle::regular(self.body_size)
    }

    fn footer(&self) -> TextStyle {
        TextStyle::regular(self.footer_size).with_color(Color::GRAY)
    }
}

/// Counters for one finished render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderSummary {
    pub pages: usize,
    pub rows: usize,
    /// Rows taller than a page that were cut to fit.
    pub clipped_rows: usize,
}

/// The table layout engine. Stateless between renders.
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    page: PageConfig,
    typography: Typography,
}

impl LayoutEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &ReportConfig) -> Self {
        Self {
            page: config.page,
            typography: config.typography,
        }
    }

    pub fn page(&self) -> &PageConfig {
        &self.page
    }

    /// Render `records` onto `surface` and return the finished bytes.
    pub fn render<S: Surface>(
        &self,
        surface: &mut S,
        records: &[Record],
        options: &ReportOptions,
    ) -> Result<Vec<u8>, ReportError> {
        self.render_with_summary(surface, records, options)
            .map(|(bytes, _)| bytes)
    }

    /// Like [`render`](Self::render), also reporting page and row counts.
    pub fn render_with_summary<S: Surface>(
        &self,
        surface: &mut S,
        records: &[Record],
        options: &ReportOptions,
    ) -> Result<(Vec<u8>, RenderSummary), ReportError> {
        let title = options.display_title();
        let kind = options.resolved_kind();
        let schema = Schema::for_kind(kind);
        let bounds = self.page.bounds();
        let generated_at = options
            .generated_at
            .unwrap_or_else(|| Local::now().naive_local());

        debug!(%kind, title, records = records.len(), "resolved report schema");

        let metadata = Metadata {
            title: Some(title.to_string()),
            subject: Some(kind.label().to_string()),
            creator: Some(concat!("symptom-report ", env!("CARGO_PKG_VERSION")).to_string()),
        };
        surface.begin_document(&self.page, &metadata)?;

        let mut summary = RenderSummary {
            pages: 1,
            ..Default::default()
        };

        let cursor = self.draw_title_block(surface, &bounds, title, &generated_at)?;
        let mut cursor = self.draw_header_row(surface, schema, &bounds, cursor, &mut summary)?;

        if records.is_empty() {
            surface.draw_text(
                EMPTY_NOTICE,
                TextFrame::new(bounds.left, cursor.y, bounds.width()),
                &self.typography.body(),
            )?;
        } else {
            for (index, record) in records.iter().enumerate() {
                cursor = self.draw_row(surface, schema, &bounds, cursor, index, record, &mut summary)?;
            }
            self.draw_footer(surface, &bounds, cursor)?;
        }

        let bytes = surface.finalize()?;
        info!(
            %kind,
            pages = summary.pages,
            rows = summary.rows,
            clipped = summary.clipped_rows,
            bytes = bytes.len(),
            "report rendered"
        );
        Ok((bytes, summary))
    }

    /// Height of a body row holding `cells`, before any page cap.
    pub fn row_height<S: Surface>(&self, surface: &S, schema: &Schema, cells: &[String]) -> f64 {
        let style = self.typography.body();
        let tallest = cells
            .iter()
            .zip(schema.column_widths)
            .map(|(cell, width)| surface.measure_text_height(cell, width - 2.0 * CELL_INSET_X, &style))
            .fold(0.0, f64::max);
        (tallest + ROW_PADDING).max(MIN_ROW_HEIGHT)
    }

    /// Height of the column header row for `schema`.
    ///
    /// Labels are fixed strings, so this depends only on the typography and
    /// can be checked before any surface exists.
    pub fn header_row_height(&self, schema: &Schema) -> f64 {
        let style = self.typography.header();
        let layout = TextLayout::new();
        let tallest = schema
            .headers
            .iter()
            .zip(schema.column_widths)
            .map(|(header, width)| layout.measure_height(header, width - 2.0 * CELL_INSET_X, &style))
            .fold(0.0, f64::max);
        (tallest + HEADER_INSET_Y + HEADER_INSET_BOTTOM).max(MIN_HEADER_HEIGHT)
    }

    /// The tallest row that fits on a fresh page under the repeated header.
    pub fn max_row_height(&self, schema: &Schema) -> f64 {
        let bounds = self.page.bounds();
        (bounds.height() - self.header_row_height(schema)).max(MIN_ROW_HEIGHT)
    }

    fn draw_title_block<S: Surface>(
        &self,
        surface: &mut S,
        bounds: &PageBounds,
        title: &str,
        generated_at: &NaiveDateTime,
    ) -> Result<Cursor, ReportError> {
        let cursor = Cursor::top_of(bounds);
        let width = bounds.width();

        let title_style = self.typography.title();
        surface.draw_text(title, TextFrame::new(cursor.x, cursor.y, width), &title_style)?;
        let title_height = surface.measure_text_height(title, width, &title_style);
        let cursor = cursor.down(title_height + 0.25 * title_style.line_height());

        let stamp_style = self.typography.timestamp();
        let stamp = format!("Generated: {}", format_timestamp(generated_at));
        surface.draw_text(&stamp, TextFrame::new(cursor.x, cursor.y, width), &stamp_style)?;
        let stamp_height = surface.measure_text_height(&stamp, width, &stamp_style);

        Ok(cursor.down(stamp_height + stamp_style.line_height()))
    }

    /// Draw the column headers at `cursor`, first moving to a new page if
    /// the header row itself doesn't fit.
    fn draw_header_row<S: Surface>(
        &self,
        surface: &mut S,
        schema: &Schema,
        bounds: &PageBounds,
        cursor: Cursor,
        summary: &mut RenderSummary,
    ) -> Result<Cursor, ReportError> {
        let height = self.header_row_height(schema);
        let cursor = match decide_break(cursor.y, height, bounds.bottom) {
            BreakDecision::Place => cursor,
            BreakDecision::MoveToNextPage => {
                surface.add_page()?;
                summary.pages += 1;
                Cursor::top_of(bounds)
            }
        };

        let style = self.typography.header();
        let mut x = bounds.left;
        for (header, width) in schema.headers.iter().zip(schema.column_widths) {
            surface.stroke_rect(x, cursor.y, *width, height)?;
            let frame = TextFrame::new(x + CELL_INSET_X, cursor.y + HEADER_INSET_Y, width - 2.0 * CELL_INSET_X);
            surface.draw_text(header, frame, &style)?;
            x += width;
        }

        Ok(Cursor {
            x: bounds.left,
            y: cursor.y + height,
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_row<S: Surface>(
        &self,
        surface: &mut S,
        schema: &Schema,
        bounds: &PageBounds,
        cursor: Cursor,
        index: usize,
        record: &Record,
        summary: &mut RenderSummary,
    ) -> Result<Cursor, ReportError> {
        let cells = schema.project(record);
        let (height, clipped) = cap_height(self.row_height(surface, schema, &cells), self.max_row_height(schema));
        if clipped {
            warn!(row = index, height, "row taller than a page; clipping cell text");
            summary.clipped_rows += 1;
        }

        let cursor = match decide_break(cursor.y, height, bounds.bottom) {
            BreakDecision::Place => cursor,
            BreakDecision::MoveToNextPage => {
                debug!(row = index, y = cursor.y, height, "row overflows page; breaking");
                surface.add_page()?;
                summary.pages += 1;
                self.draw_header_row(surface, schema, bounds, Cursor::top_of(bounds), summary)?
            }
        };

        let style = self.typography.body();
        let mut x = bounds.left;
        for (cell, width) in cells.iter().zip(schema.column_widths) {
            surface.stroke_rect(x, cursor.y, *width, height)?;
            if !cell.is_empty() {
                let mut frame = TextFrame::new(x + CELL_INSET_X, cursor.y + CELL_INSET_Y, width - 2.0 * CELL_INSET_X);
                if clipped {
                    frame = frame.clipped_to(height - ROW_PADDING);
                }
                surface.draw_text(cell, frame, &style)?;
            }
            x += width;
        }
        summary.rows += 1;

        Ok(cursor.down(height + ROW_GAP))
    }

    /// The footer goes wherever the cursor is. It may run past the bottom
    /// margin when the last row ends right at it.
    fn draw_footer<S: Surface>(
        &self,
        surface: &mut S,
        bounds: &PageBounds,
        cursor: Cursor,
    ) -> Result<Cursor, ReportError> {
        let style = self.typography.footer();
        let cursor = cursor.down(style.line_height());
        surface.draw_text(
            FOOTER_TEXT,
            TextFrame::new(bounds.left, cursor.y, bounds.width()),
            &style,
        )?;
        let height = surface.measure_text_height(FOOTER_TEXT, bounds.width(), &style);
        Ok(cursor.down(height))
    }
}
