//! Field normalization.
//!
//! Every helper takes an optional JSON value straight from a record and
//! returns a display string. None of them fail: missing, null, or mistyped
//! values become an empty string (or "No" for flags), so a broken record
//! still renders as a row.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

const DATE_TIME_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";
const DATE_FORMAT: &str = "%-m/%-d/%Y";

/// Naive layouts tried after RFC 3339, most specific first.
const NAIVE_LAYOUTS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// A string field. Anything that isn't a string is empty.
pub fn text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        _ => String::new(),
    }
}

/// A numeric field as a finite number, if there is one.
///
/// JSON numbers and numeric strings are accepted. Null, booleans, blank
/// strings, and non-finite values are not.
pub fn number(value: Option<&Value>) -> Option<f64> {
    let n = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            s.parse::<f64>().ok()?
        }
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// A numeric field rendered for display, or empty.
pub fn number_text(value: Option<&Value>) -> String {
    number(value).map(format_number).unwrap_or_default()
}

/// Integral values print without a decimal point; everything else uses the
/// shortest representation that round-trips.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// A list field joined with ", ".
///
/// Non-arrays are an empty list. Strings and numbers are kept; blank
/// strings and any other item type are dropped.
pub fn list(value: Option<&Value>) -> String {
    let Some(Value::Array(items)) = value else {
        return String::new();
    };

    items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            Value::Number(_) => number(Some(item)).map(format_number),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// A boolean field as "Yes"/"No". Only a literal `true` is a yes.
pub fn flag(value: Option<&Value>) -> &'static str {
    match value {
        Some(Value::Bool(true)) => "Yes",
        _ => "No",
    }
}

/// An ISO-8601 datetime rendered as e.g. `1/16/2024, 9:05:00 AM`.
///
/// The wall-clock time is shown as written in the value, offset included.
/// Date-only values render without a time. Strings that don't parse are
/// passed through untouched.
pub fn date_time(value: Option<&Value>) -> String {
    let raw = text(value);
    let s = raw.trim();
    if s.is_empty() {
        return String::new();
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return dt.naive_local().format(DATE_TIME_FORMAT).to_string();
    }
    for layout in NAIVE_LAYOUTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, layout) {
            return dt.format(DATE_TIME_FORMAT).to_string();
        }
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return d.format(DATE_FORMAT).to_string();
    }

    raw
}

/// Format a naive timestamp the same way datetime cells are formatted.
pub fn format_timestamp(at: &NaiveDateTime) -> String {
    at.format(DATE_TIME_FORMAT).to_string()
}

/// A duration in minutes: `45 min`, `1 hr`, `2 hrs 30 min`.
pub fn minutes(value: Option<&Value>) -> String {
    let Some(n) = number(value) else {
        return String::new();
    };
    if n < 60.0 {
        return format!("{} min", format_number(n));
    }

    let hours = (n / 60.0).floor();
    let rest = n % 60.0;
    let unit = if hours == 1.0 { "hr" } else { "hrs" };
    if rest == 0.0 {
        format!("{} {}", format_number(hours), unit)
    } else {
        format!("{} {} {} min", format_number(hours), unit, format_number(rest))
    }
}

/// The functional-impact flag set, listing only the flags that are `true`.
pub fn functional_impact(value: Option<&Value>) -> String {
    const FLAGS: [(&str, &str); 4] = [
        ("sleep", "Sleep"),
        ("work", "Work"),
        ("walking", "Walking"),
        ("lifting", "Lifting"),
    ];

    let Some(Value::Object(map)) = value else {
        return String::new();
    };

    FLAGS
        .iter()
        .filter(|(key, _)| matches!(map.get(*key), Some(Value::Bool(true))))
        .map(|(_, label)| *label)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_rejects_non_strings() {
        assert_eq!(text(Some(&json!("note"))), "note");
        assert_eq!(text(Some(&json!(12))), "");
        assert_eq!(text(Some(&Value::Null)), "");
        assert_eq!(text(None), "");
    }

    #[test]
    fn numbers_never_render_as_nan_or_null() {
        assert_eq!(number_text(Some(&json!("abc"))), "");
        assert_eq!(number_text(Some(&Value::Null)), "");
        assert_eq!(number_text(None), "");
        assert_eq!(number_text(Some(&json!(true))), "");
        assert_eq!(number_text(Some(&json!("  "))), "");
        assert_eq!(number_text(Some(&json!("NaN"))), "");
        assert_eq!(number_text(Some(&json!("inf"))), "");
    }

    #[test]
    fn numbers_format_like_plain_values() {
        assert_eq!(number_text(Some(&json!(7))), "7");
        assert_eq!(number_text(Some(&json!(7.0))), "7");
        assert_eq!(number_text(Some(&json!(7.5))), "7.5");
        assert_eq!(number_text(Some(&json!(" 120 "))), "120");
        assert_eq!(number_text(Some(&json!(-3))), "-3");
    }

    #[test]
    fn list_joins_and_filters() {
        assert_eq!(list(Some(&json!(["nausea", "dizziness"]))), "nausea, dizziness");
        assert_eq!(list(Some(&json!(["stress", null, "", 3, {"x": 1}]))), "stress, 3");
        assert_eq!(list(Some(&json!([]))), "");
        assert_eq!(list(Some(&Value::Null)), "");
        assert_eq!(list(Some(&json!("stress"))), "");
        assert_eq!(list(None), "");
    }

    #[test]
    fn flags_are_yes_only_for_true() {
        assert_eq!(flag(Some(&json!(true))), "Yes");
        assert_eq!(flag(Some(&json!(false))), "No");
        assert_eq!(flag(Some(&json!("true"))), "No");
        assert_eq!(flag(Some(&json!(1))), "No");
        assert_eq!(flag(None), "No");
    }

    #[test]
    fn date_time_formats_iso_values() {
        assert_eq!(
            date_time(Some(&json!("2024-01-16T09:05:00"))),
            "1/16/2024, 9:05:00 AM"
        );
        assert_eq!(
            date_time(Some(&json!("2024-01-16T21:30:15.250Z"))),
            "1/16/2024, 9:30:15 PM"
        );
        assert_eq!(
            date_time(Some(&json!("2024-03-02T00:10:00-05:00"))),
            "3/2/2024, 12:10:00 AM"
        );
        assert_eq!(date_time(Some(&json!("2024-01-16T14:45"))), "1/16/2024, 2:45:00 PM");
        assert_eq!(date_time(Some(&json!("2024-01-16"))), "1/16/2024");
    }

    #[test]
    fn date_time_passes_unparsable_strings_through() {
        assert_eq!(date_time(Some(&json!("2024-16-01"))), "2024-16-01");
        assert_eq!(date_time(Some(&json!("yesterday"))), "yesterday");
        assert_eq!(date_time(Some(&json!(1705400000))), "");
        assert_eq!(date_time(None), "");
    }

    #[test]
    fn minutes_under_an_hour() {
        assert_eq!(minutes(Some(&json!(45))), "45 min");
        assert_eq!(minutes(Some(&json!(0))), "0 min");
    }

    #[test]
    fn minutes_in_hours() {
        assert_eq!(minutes(Some(&json!(60))), "1 hr");
        assert_eq!(minutes(Some(&json!(90))), "1 hr 30 min");
        assert_eq!(minutes(Some(&json!(120))), "2 hrs");
        assert_eq!(minutes(Some(&json!(185))), "3 hrs 5 min");
        assert_eq!(minutes(Some(&json!("75"))), "1 hr 15 min");
    }

    #[test]
    fn minutes_missing_is_empty() {
        assert_eq!(minutes(Some(&json!("long"))), "");
        assert_eq!(minutes(None), "");
    }

    #[test]
    fn functional_impact_lists_true_flags_in_order() {
        let fi = json!({ "lifting": true, "sleep": true, "work": false, "walking": "yes" });
        assert_eq!(functional_impact(Some(&fi)), "Sleep, Lifting");
        assert_eq!(functional_impact(Some(&json!({}))), "");
        assert_eq!(functional_impact(Some(&json!([true]))), "");
        assert_eq!(functional_impact(None), "");
    }

    #[test]
    fn timestamp_uses_cell_format() {
        let at = NaiveDate::from_ymd_opt(2026, 10, 16)
            .and_then(|d| d.and_hms_opt(15, 4, 5))
            .unwrap();
        assert_eq!(format_timestamp(&at), "10/16/2026, 3:04:05 PM");
    }
}
