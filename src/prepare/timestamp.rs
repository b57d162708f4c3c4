use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::data::model::CellValue;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

const TIME_FORMATS: &[&str] = &["%H:%M:%S%.f", "%H:%M", "%I:%M %p", "%I:%M:%S %p"];

/// Parse a timestamp in any of the accepted layouts.
///
/// Returns `None` for anything unparseable, including blanks.  Offsets in
/// RFC 3339 input are dropped, keeping the local wall-clock time.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    for fmt in TIME_FORMATS {
        if let Ok(t) = NaiveTime::parse_from_str(s, fmt) {
            // Time-only values such as `08:15` are anchored to the epoch date.
            return NaiveDate::from_ymd_opt(1970, 1, 1).map(|d| d.and_time(t));
        }
    }
    None
}

/// Parse a dataset cell.  Only text cells can hold a timestamp.
pub fn parse_cell(cell: &CellValue) -> Option<NaiveDateTime> {
    cell.as_text().and_then(parse_timestamp)
}

/// Hour of day in `[0, 23]`.
pub fn hour_of(ts: &NaiveDateTime) -> u32 {
    ts.hour()
}
