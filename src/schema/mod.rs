//! # Column Schemas
//!
//! A schema fixes the column headers, column widths, and the projection
//! from a raw record to display cells for one kind of log. There is one
//! static schema per [`ReportKind`]; projection matches on the kind, so a
//! new kind cannot be added without giving it columns.
//!
//! Column widths are in points and are sized for the printable width of a
//! US Letter landscape page with 30pt margins (732pt). The config loader
//! refuses page setups narrower than the widest schema.

pub mod normalize;

use crate::model::{Record, ReportKind};

/// Column layout and projection for one report kind.
#[derive(Debug, PartialEq)]
pub struct Schema {
    pub kind: ReportKind,
    pub headers: &'static [&'static str],
    pub column_widths: &'static [f64],
}

pub static HEADACHE: Schema = Schema {
    kind: ReportKind::Headache,
    headers: &[
        "Start",
        "Duration",
        "Intensity",
        "Symptoms",
        "Triggers",
        "Meds",
        "Lying Down",
        "Missed Work",
        "Notes",
    ],
    column_widths: &[88.0, 55.0, 50.0, 90.0, 85.0, 70.0, 55.0, 65.0, 110.0],
};

pub static PAIN: Schema = Schema {
    kind: ReportKind::Pain,
    headers: &[
        "Date/Time",
        "Pain",
        "Region",
        "Type",
        "Duration",
        "Triggers",
        "Meds",
        "Relief %",
        "Impact",
        "Notes",
    ],
    column_widths: &[88.0, 40.0, 70.0, 55.0, 55.0, 80.0, 70.0, 55.0, 65.0, 102.0],
};

pub static BLOOD_PRESSURE: Schema = Schema {
    kind: ReportKind::BloodPressure,
    headers: &[
        "Date/Time",
        "Systolic",
        "Diastolic",
        "Pulse",
        "Posture",
        "Arm",
        "Device",
        "Notes",
    ],
    column_widths: &[110.0, 55.0, 55.0, 45.0, 60.0, 45.0, 85.0, 155.0],
};

/// Pick the schema for a free-text title by keyword.
pub fn resolve(title: &str) -> &'static Schema {
    Schema::for_kind(ReportKind::infer(Some(title)))
}

impl Schema {
    pub fn for_kind(kind: ReportKind) -> &'static Schema {
        match kind {
            ReportKind::Headache => &HEADACHE,
            ReportKind::Pain => &PAIN,
            ReportKind::BloodPressure => &BLOOD_PRESSURE,
        }
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn total_width(&self) -> f64 {
        self.column_widths.iter().sum()
    }

    /// The widest table any schema draws.
    pub fn widest() -> f64 {
        ReportKind::ALL
            .iter()
            .map(|kind| Schema::for_kind(*kind).total_width())
            .fold(0.0, f64::max)
    }

    /// Project a record into one display string per column.
    pub fn project(&self, record: &Record) -> Vec<String> {
        match self.kind {
            ReportKind::Headache => project_headache(record),
            ReportKind::Pain => project_pain(record),
            ReportKind::BloodPressure => project_blood_pressure(record),
        }
    }
}

fn project_headache(log: &Record) -> Vec<String> {
    vec![
        normalize::date_time(log.field("startDateTime")),
        normalize::minutes(log.field("durationMinutes")),
        normalize::number_text(log.field("intensity")),
        normalize::list(log.field("symptoms")),
        normalize::list(log.field("triggers")),
        normalize::list(log.field("medications")),
        normalize::flag(log.field("requiredLyingDown")).to_string(),
        normalize::flag(log.field("missedWork")).to_string(),
        normalize::text(log.field("notes")),
    ]
}

fn project_pain(log: &Record) -> Vec<String> {
    vec![
        normalize::date_time(log.field("dateTime")),
        normalize::number_text(log.field("painLevel")),
        normalize::text(log.field("bodyRegion")),
        normalize::text(log.field("painType")),
        normalize::minutes(log.field("durationMinutes")),
        normalize::list(log.field("triggers")),
        normalize::list(log.field("medications")),
        normalize::number_text(log.field("reliefPercent")),
        normalize::functional_impact(log.field("functionalImpact")),
        normalize::text(log.field("notes")),
    ]
}

fn project_blood_pressure(log: &Record) -> Vec<String> {
    vec![
        normalize::date_time(log.field("dateTime")),
        normalize::number_text(log.field("systolic")),
        normalize::number_text(log.field("diastolic")),
        normalize::number_text(log.field("pulse")),
        normalize::text(log.field("posture")),
        normalize::text(log.field("armUsed")),
        normalize::text(log.field("deviceType")),
        normalize::text(log.field("notes")),
    ]
}
