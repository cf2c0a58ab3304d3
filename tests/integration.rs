//! Integration tests for the report rendering pipeline.
//!
//! These tests exercise the full path from records to drawn pages and PDF
//! bytes. They verify:
//! - The right column schema is chosen
//! - Rows never cross the bottom margin and are never split
//! - The header row is repeated on every page
//! - Malformed input renders as blank cells, never as errors
//! - Output is structurally valid and reproducible
//! - The text printed in the PDF is the text that was laid out

use chrono::{NaiveDate, NaiveDateTime};
use miniz_oxide::inflate::decompress_to_vec_zlib;
use proptest::prelude::*;
use serde_json::json;

use symptom_report::error::ReportError;
use symptom_report::layout::{LayoutEngine, Typography, EMPTY_NOTICE, FOOTER_TEXT};
use symptom_report::model::{Edges, Metadata, Orientation, PageConfig, PageSize};
use symptom_report::schema::{self, Schema};
use symptom_report::style::TextStyle;
use symptom_report::surface::{DrawOp, RecordingSurface, Surface, TextFrame};
use symptom_report::*;

// ─── Helpers ────────────────────────────────────────────────────

fn pinned_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 31)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

fn options(title: &str) -> ReportOptions {
    ReportOptions::titled(title).generated_at(pinned_time())
}

/// A headache record whose notes start with `Entry {i}`. Every seventh
/// record gets long notes so row heights vary.
fn headache_record(i: usize) -> Record {
    let filler = "pressure behind the eyes ".repeat((i % 7) * 4);
    Record::new(json!({
        "startDateTime": "2024-03-01T09:15:00",
        "durationMinutes": 30 + i,
        "intensity": i % 10,
        "symptoms": ["Aura", "Nausea"],
        "triggers": ["Stress"],
        "medications": ["Ibuprofen"],
        "requiredLyingDown": i % 2 == 0,
        "missedWork": false,
        "notes": format!("Entry {i} {filler}"),
    }))
}

fn record_surface(records: &[Record], options: &ReportOptions) -> RecordingSurface {
    let mut surface = RecordingSurface::new();
    render_with(&mut surface, records, options, &ReportConfig::default()).unwrap();
    surface
}

fn page_texts<'a>(page: &[&'a DrawOp]) -> Vec<&'a str> {
    page.iter()
        .filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
        .collect()
}

/// Record indices parsed from the `Entry N` notes cells, in drawing order.
fn entry_indices(texts: &[&str]) -> Vec<usize> {
    texts
        .iter()
        .filter_map(|t| t.strip_prefix("Entry "))
        .filter_map(|rest| rest.split_whitespace().next())
        .filter_map(|n| n.parse().ok())
        .collect()
}

fn count_occurrences(haystack: &[u8], needle: &[u8]) -> usize {
    haystack.windows(needle.len()).filter(|w| *w == needle).count()
}

fn assert_valid_pdf(bytes: &[u8]) {
    assert!(bytes.starts_with(b"%PDF-1.7"), "missing PDF header");
    assert!(bytes.ends_with(b"%%EOF\n"), "missing EOF marker");
    assert!(count_occurrences(bytes, b"xref") >= 1);
    assert!(count_occurrences(bytes, b"trailer") == 1);
}

/// Decode a PDF literal string operand.
fn unescape_pdf_string(raw: &str) -> String {
    let mut out = String::new();
    let mut chars = raw.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.peek().copied() {
            Some(d) if d.is_digit(8) => {
                let mut code = 0u32;
                for _ in 0..3 {
                    match chars.peek().and_then(|c| c.to_digit(8)) {
                        Some(v) => {
                            code = code * 8 + v;
                            chars.next();
                        }
                        None => break,
                    }
                }
                out.push(char::from_u32(code).unwrap_or('?'));
            }
            Some(other) => {
                out.push(other);
                chars.next();
            }
            None => {}
        }
    }
    out
}

/// Every `Tj` operand in the document, in content-stream order.
fn pdf_text_lines(bytes: &[u8]) -> Vec<String> {
    let mut lines = Vec::new();
    let mut pos = 0;
    while let Some(found) = bytes[pos..].windows(8).position(|w| w == b"/Length ") {
        let start = pos + found + 8;
        let digits: String = bytes[start..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .map(|b| *b as char)
            .collect();
        let length: usize = digits.parse().unwrap();
        let data_start = start
            + bytes[start..]
                .windows(7)
                .position(|w| w == b"stream\n")
                .unwrap()
            + 7;
        let content = decompress_to_vec_zlib(&bytes[data_start..data_start + length]).unwrap();
        let content = String::from_utf8(content).unwrap();

        for line in content.lines() {
            if let Some(operand) = line.strip_suffix(") Tj").and_then(|l| l.strip_prefix('(')) {
                lines.push(unescape_pdf_string(operand));
            }
        }
        pos = data_start + length;
    }
    lines
}

fn without_whitespace<'a>(texts: impl IntoIterator<Item = &'a str>) -> String {
    texts
        .into_iter()
        .flat_map(|t| t.chars())
        .filter(|c| !c.is_whitespace())
        .collect()
}

fn page_config_strategy() -> impl Strategy<Value = ReportConfig> {
    prop_oneof![
        Just(ReportConfig::default()),
        Just(ReportConfig {
            page: PageConfig {
                size: PageSize::Legal,
                ..PageConfig::default()
            },
            typography: Typography::default(),
        }),
        (300.0f64..700.0, 10.0f64..60.0, 10.0f64..60.0).prop_map(|(height, top, bottom)| {
            ReportConfig {
                page: PageConfig {
                    size: PageSize::Custom { width: 792.0, height },
                    orientation: Orientation::Landscape,
                    margin: Edges {
                        top,
                        right: 30.0,
                        bottom,
                        left: 30.0,
                    },
                },
                typography: Typography::default(),
            }
        }),
    ]
}

/// A surface that fails on the Nth rectangle.
struct FailingSurface {
    inner: RecordingSurface,
    fail_at: usize,
    rects: usize,
}

impl Surface for FailingSurface {
    fn begin_document(&mut self, page: &PageConfig, metadata: &Metadata) -> Result<(), ReportError> {
        self.inner.begin_document(page, metadata)
    }

    fn add_page(&mut self) -> Result<(), ReportError> {
        self.inner.add_page()
    }

    fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64) -> Result<(), ReportError> {
        self.rects += 1;
        if self.rects == self.fail_at {
            return Err(ReportError::Surface("disk full".to_string()));
        }
        self.inner.stroke_rect(x, y, width, height)
    }

    fn draw_text(&mut self, text: &str, frame: TextFrame, style: &TextStyle) -> Result<(), ReportError> {
        self.inner.draw_text(text, frame, style)
    }

    fn measure_text_height(&self, text: &str, max_width: f64, style: &TextStyle) -> f64 {
        self.inner.measure_text_height(text, max_width, style)
    }

    fn finalize(&mut self) -> Result<Vec<u8>, ReportError> {
        self.inner.finalize()
    }
}

// ─── Schema Selection ───────────────────────────────────────────

#[test]
fn test_title_keyword_priority() {
    assert_eq!(schema::resolve("Headache Log").kind, ReportKind::Headache);
    assert_eq!(schema::resolve("Blood Pressure").kind, ReportKind::BloodPressure);
    assert_eq!(schema::resolve("Pain Log").kind, ReportKind::Pain);
    assert_eq!(schema::resolve("").kind, ReportKind::Headache);
    assert_eq!(schema::resolve("BP and headache notes").kind, ReportKind::Headache);
}

#[test]
fn test_explicit_kind_overrides_title() {
    let records = vec![Record::new(json!({ "systolic": 118, "diastolic": 76 }))];
    let opts = options("Headache Log").with_kind(ReportKind::BloodPressure);
    let surface = record_surface(&records, &opts);
    let texts = surface.texts();

    assert!(texts.contains(&"Systolic"));
    assert!(texts.contains(&"118"));
    assert!(!texts.contains(&"Intensity"));
}

#[test]
fn test_every_schema_fits_printable_width() {
    let printable = PageConfig::default().printable_width();
    for kind in ReportKind::ALL {
        assert!(Schema::for_kind(kind).total_width() <= printable);
    }
}

// ─── Empty Input ────────────────────────────────────────────────

#[test]
fn test_zero_records_renders_header_and_notice() {
    let surface = record_surface(&[], &options("Pain Log"));
    let pages = surface.pages();
    assert_eq!(pages.len(), 1);

    let texts = page_texts(&pages[0]);
    for header in schema::PAIN.headers {
        assert!(texts.contains(header), "missing header {header}");
    }
    assert!(texts.contains(&EMPTY_NOTICE));
    assert!(!texts.contains(&FOOTER_TEXT));

    let rects = pages[0]
        .iter()
        .filter(|op| matches!(op, DrawOp::StrokeRect { .. }))
        .count();
    assert_eq!(rects, schema::PAIN.column_count(), "only the header row is drawn");
}

#[test]
fn test_zero_records_still_produces_pdf() {
    let bytes = render(&[], &options("Headache Log")).unwrap();
    assert_valid_pdf(&bytes);
    assert_eq!(count_occurrences(&bytes, b"/Count 1"), 1);
}

// ─── Pagination ─────────────────────────────────────────────────

#[test]
fn test_rows_never_cross_bottom_margin() {
    let records: Vec<Record> = (0..120).map(headache_record).collect();
    let surface = record_surface(&records, &options("Headache Log"));
    let bottom = PageConfig::default().bounds().bottom;

    assert!(surface.page_count() > 2, "expected several pages");
    for (p, page) in surface.pages().iter().enumerate() {
        for op in page {
            if let DrawOp::StrokeRect { y, height, .. } = op {
                assert!(
                    y + height <= bottom + 1e-9,
                    "page {p}: rect at {y} + {height} crosses bottom {bottom}"
                );
            }
        }
    }
}

#[test]
fn test_header_repeated_on_every_page() {
    let records: Vec<Record> = (0..120).map(headache_record).collect();
    let surface = record_surface(&records, &options("Headache Log"));
    let headers: Vec<&str> = schema::HEADACHE.headers.to_vec();
    let top = PageConfig::default().bounds().top;
    let header_height = LayoutEngine::new().header_row_height(&schema::HEADACHE);

    for (p, page) in surface.pages().iter().enumerate() {
        let texts = page_texts(page);
        // Page one opens with the title and timestamp.
        let skip = if p == 0 { 2 } else { 0 };
        assert_eq!(texts[skip..skip + headers.len()], headers[..], "page {p}");

        if p > 0 {
            let first_rect = page.iter().find_map(|op| match op {
                DrawOp::StrokeRect { y, height, .. } => Some((*y, *height)),
                _ => None,
            });
            assert_eq!(first_rect, Some((top, header_height)), "page {p}");
        }
    }
}

#[test]
fn test_every_row_drawn_once_in_order() {
    let records: Vec<Record> = (0..120).map(headache_record).collect();
    let surface = record_surface(&records, &options("Headache Log"));

    let indices = entry_indices(&surface.texts());
    assert_eq!(indices, (0..120).collect::<Vec<_>>());
}

#[test]
fn test_rows_are_not_split_across_pages() {
    let records: Vec<Record> = (0..120).map(headache_record).collect();
    let surface = record_surface(&records, &options("Headache Log"));
    let columns = schema::HEADACHE.column_count();

    for (p, page) in surface.pages().iter().enumerate() {
        let rects = page
            .iter()
            .filter(|op| matches!(op, DrawOp::StrokeRect { .. }))
            .count();
        assert_eq!(rects % columns, 0, "page {p} holds a partial row");
    }
}

#[test]
fn test_footer_follows_last_row() {
    let records: Vec<Record> = (0..3).map(headache_record).collect();
    let surface = record_surface(&records, &options("Headache Log"));
    let texts = surface.texts();
    assert_eq!(texts.last(), Some(&FOOTER_TEXT));
}

#[test]
fn test_oversized_row_is_capped_and_fits() {
    let mut records: Vec<Record> = (0..2).map(headache_record).collect();
    records.push(Record::new(json!({
        "startDateTime": "2024-03-02T10:00:00",
        "notes": "Entry 2 ".to_string() + &"very long rambling note ".repeat(3000),
    })));
    records.push(headache_record(3));

    let surface = record_surface(&records, &options("Headache Log"));
    let bottom = PageConfig::default().bounds().bottom;
    for op in surface.ops() {
        if let DrawOp::StrokeRect { y, height, .. } = op {
            assert!(y + height <= bottom + 1e-9);
        }
    }
    assert_eq!(entry_indices(&surface.texts()), vec![0, 1, 2, 3]);
}

#[test]
fn test_pdf_page_count_matches_layout() {
    let records: Vec<Record> = (0..80).map(headache_record).collect();
    let opts = options("Headache Log");
    let surface = record_surface(&records, &opts);
    let bytes = render(&records, &opts).unwrap();

    assert_valid_pdf(&bytes);
    let count = format!("/Count {}", surface.page_count());
    assert_eq!(count_occurrences(&bytes, count.as_bytes()), 1);
    assert_eq!(
        count_occurrences(&bytes, b"/Type /Page "),
        surface.page_count()
    );
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_page_break_invariant_holds_for_any_layout(
        config in page_config_strategy(),
        kind in proptest::sample::select(ReportKind::ALL.to_vec()),
        notes in proptest::collection::vec((0usize..30, proptest::bool::weighted(0.05)), 0..50),
    ) {
        prop_assert!(config.validate().is_ok());

        let records: Vec<Record> = notes
            .iter()
            .enumerate()
            .map(|(i, (reps, oversized))| {
                let reps = if *oversized { 800 } else { *reps };
                let filler = "pressure behind the eyes ".repeat(reps);
                Record::new(json!({ "notes": format!("Entry {i} {filler}") }))
            })
            .collect();

        let mut surface = RecordingSurface::new();
        let opts = ReportOptions::default().with_kind(kind).generated_at(pinned_time());
        render_with(&mut surface, &records, &opts, &config).unwrap();

        let table = Schema::for_kind(kind);
        let bounds = config.page.bounds();
        let header_height = LayoutEngine::from_config(&config).header_row_height(table);

        for (p, page) in surface.pages().iter().enumerate() {
            let mut rects = 0;
            for op in page {
                if let DrawOp::StrokeRect { y, height, .. } = op {
                    prop_assert!(y + height <= bounds.bottom + 1e-6, "page {}: {} + {}", p, y, height);
                    rects += 1;
                }
            }
            prop_assert_eq!(rects % table.column_count(), 0, "page {} holds a partial row", p);

            let texts = page_texts(page);
            let skip = if p == 0 { 2 } else { 0 };
            prop_assert_eq!(&texts[skip..skip + table.column_count()], table.headers);

            if p > 0 {
                let first_rect = page.iter().find_map(|op| match op {
                    DrawOp::StrokeRect { y, height, .. } => Some((*y, *height)),
                    _ => None,
                });
                prop_assert_eq!(first_rect, Some((bounds.top, header_height)));
            }
        }

        prop_assert_eq!(entry_indices(&surface.texts()), (0..records.len()).collect::<Vec<_>>());
    }
}

// ─── Printed Text ───────────────────────────────────────────────

#[test]
fn test_pdf_prints_every_header_word() {
    let bytes = render(&[], &options("Headache Log")).unwrap();
    let printed = pdf_text_lines(&bytes);

    for header in schema::HEADACHE.headers {
        for word in header.split_whitespace() {
            assert!(printed.iter().any(|l| l == word), "{word:?} missing from {printed:?}");
        }
    }
    assert!(printed.iter().all(|l| !l.ends_with(' ')), "{printed:?}");
}

#[test]
fn test_pdf_text_matches_recorded_text() {
    let records: Vec<Record> = (0..40).map(headache_record).collect();
    for (title, records) in [("Headache Log", vec![]), ("Headache Log", records), ("Pain Log", vec![])] {
        let opts = options(title);
        let recorded = record_surface(&records, &opts);
        let printed = pdf_text_lines(&render(&records, &opts).unwrap());

        let expected = without_whitespace(recorded.texts());
        let actual = without_whitespace(printed.iter().map(String::as_str));
        assert_eq!(actual, expected, "{title} with {} records", records.len());
    }

    let printed = pdf_text_lines(&render(&[], &options("Headache Log")).unwrap());
    assert!(printed.iter().any(|l| l == EMPTY_NOTICE));

    let printed = pdf_text_lines(&render(&[headache_record(1)], &options("Headache Log")).unwrap());
    assert_eq!(printed.last().map(String::as_str), Some(FOOTER_TEXT));
    for cell in ["Aura, Nausea", "Stress", "Ibuprofen", "No"] {
        assert!(printed.iter().any(|l| l == cell), "{cell:?} missing from {printed:?}");
    }
}

// ─── Normalization ──────────────────────────────────────────────

#[test]
fn test_malformed_fields_render_blank() {
    let records = vec![Record::new(json!({
        "startDateTime": null,
        "triggers": null,
        "intensity": "abc",
        "durationMinutes": "NaN",
        "notes": null,
    }))];
    let surface = record_surface(&records, &options("Headache Log"));

    for text in surface.texts() {
        assert!(!text.contains("null"), "{text:?}");
        assert!(!text.contains("NaN"), "{text:?}");
        assert!(!text.contains("undefined"), "{text:?}");
    }
    // Only the two boolean columns have content.
    let body: Vec<&str> = surface
        .texts()
        .into_iter()
        .skip(2 + schema::HEADACHE.column_count())
        .filter(|t| *t != FOOTER_TEXT)
        .collect();
    assert_eq!(body, vec!["No", "No"]);
}

#[test]
fn test_non_object_records_render_as_empty_rows() {
    let records = vec![
        Record::new(json!("not a record")),
        Record::new(json!(42)),
        Record::new(json!([1, 2, 3])),
    ];
    let bytes = render(&records, &options("Pain Log")).unwrap();
    assert_valid_pdf(&bytes);
}

// ─── Row Height ─────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_row_height_monotonic_in_cell_text(
        base in proptest::collection::vec("[a-zA-Z]{1,12}", 0..20),
        extra in proptest::collection::vec("[a-zA-Z]{1,12}", 1..20),
        column in 0usize..9,
    ) {
        let engine = LayoutEngine::new();
        let surface = RecordingSurface::new();
        let schema = &schema::HEADACHE;

        let a = base.join(" ");
        let b = if a.is_empty() {
            extra.join(" ")
        } else {
            format!("{a} {}", extra.join(" "))
        };

        let mut cells_a = vec![String::new(); schema.column_count()];
        let mut cells_b = cells_a.clone();
        cells_a[column] = a;
        cells_b[column] = b;

        let height_a = engine.row_height(&surface, schema, &cells_a);
        let height_b = engine.row_height(&surface, schema, &cells_b);
        prop_assert!(height_b >= height_a, "{height_b} < {height_a}");
    }
}

// ─── Output ─────────────────────────────────────────────────────

#[test]
fn test_render_is_deterministic_with_pinned_time() {
    let records: Vec<Record> = (0..40).map(headache_record).collect();
    let first = render(&records, &options("Headache Log")).unwrap();
    let second = render(&records, &options("Headache Log")).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_only_timestamp_differs_between_times() {
    let records: Vec<Record> = (0..5).map(headache_record).collect();
    let later = NaiveDate::from_ymd_opt(2024, 2, 1)
        .unwrap()
        .and_hms_opt(8, 5, 0)
        .unwrap();

    let first = record_surface(&records, &options("Headache Log"));
    let second = record_surface(&records, &ReportOptions::titled("Headache Log").generated_at(later));

    let a = first.texts();
    let b = second.texts();
    assert_eq!(a.len(), b.len());
    let differing: Vec<usize> = (0..a.len()).filter(|&i| a[i] != b[i]).collect();
    assert_eq!(differing, vec![1]);
    assert_eq!(b[1], "Generated: 2/1/2024, 8:05:00 AM");
}

#[test]
fn test_surface_failure_is_terminal() {
    let records: Vec<Record> = (0..10).map(headache_record).collect();
    let mut surface = FailingSurface {
        inner: RecordingSurface::new(),
        fail_at: 20,
        rects: 0,
    };

    let err = render_with(&mut surface, &records, &options("Headache Log"), &ReportConfig::default())
        .unwrap_err();
    assert!(matches!(err, ReportError::Surface(ref msg) if msg == "disk full"));
    assert!(!surface.inner.ops().contains(&DrawOp::Finalize));
}

#[test]
fn test_render_to_writer_writes_whole_document() {
    let records: Vec<Record> = (0..5).map(headache_record).collect();
    let opts = options("Headache Log");
    let mut out = Vec::new();

    let written = render_to_writer(&mut out, &records, &opts, &ReportConfig::default()).unwrap();
    assert_eq!(written, out.len());
    assert_eq!(out, render(&records, &opts).unwrap());
}

#[test]
fn test_render_to_writer_writes_nothing_on_failure() {
    let mut config = ReportConfig::default();
    config.page.margin.left = 200.0;
    let mut out = Vec::new();

    let err = render_to_writer(&mut out, &[headache_record(0)], &options("Headache Log"), &config)
        .unwrap_err();
    assert!(matches!(err, ReportError::Config(_)));
    assert!(out.is_empty());
}

#[test]
fn test_render_json_request_body() {
    let body = json!({
        "data": { "logData": [
            { "dateTime": "2024-05-01T07:45:00", "systolic": 131, "diastolic": 84, "pulse": 70 }
        ] },
        "metadata": { "exportType": "Blood Pressure" }
    });
    let bytes = render_json(&body.to_string()).unwrap();
    assert_valid_pdf(&bytes);
}

#[test]
fn test_render_json_rejects_invalid_json() {
    let err = render_json("[{\"notes\": \"unterminated}").unwrap_err();
    assert!(matches!(err, ReportError::Parse { .. }));
}

#[test]
fn test_base64_and_mime_type() {
    let bytes = render(&[], &options("Headache Log")).unwrap();
    let encoded = to_base64(&bytes);
    assert!(encoded.starts_with("JVBERi0xLjc"));
    assert_eq!(MIME_TYPE, "application/pdf");
    assert_eq!(suggested_file_name(ReportKind::Pain), "pain_report.pdf");
}
