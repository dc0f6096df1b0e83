//! Field input formats: how a raw field string becomes an `f64`.
//!
//! A format is written as one of
//!
//! | Spec               | Meaning |
//! |--------------------|---------|
//! | `number`           | lenient decimal number (longest numeric prefix) |
//! | `number,<pattern>` | decimal pattern such as `#,##0.00` or `0.0%` |
//! | `date`             | date/time in one of the common layouts, as epoch seconds |
//! | `date,<pattern>`   | date/time in a chrono strftime layout, as epoch seconds |
//!
//! Parsing never fails loudly: [`FieldFormat::parse_value`] returns `None` and the
//! caller substitutes NaN.

use std::fmt;
use std::str::FromStr;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};

use crate::error::FormatError;

// ─────────────────────────────────────────────────────────────────────────────
// DecimalPattern
// ─────────────────────────────────────────────────────────────────────────────

/// A decimal pattern in the familiar `#,##0.00` notation.
///
/// Only the parts that matter for *reading* numbers are kept: literal text
/// around the digits, whether grouping separators are allowed, the scale of a
/// `%` or `‰` suffix and the number of fraction digits (used for display).
#[derive(Debug, Clone, PartialEq)]
pub struct DecimalPattern {
    source: String,
    prefix: String,
    suffix: String,
    grouping: bool,
    divisor: f64,
    fraction_digits: usize,
}

impl DecimalPattern {
    pub fn parse(pattern: &str) -> Result<Self, FormatError> {
        // Only the positive sub-pattern is relevant.
        let positive = pattern.split(';').next().unwrap_or_default();
        let is_number_char = |c: char| matches!(c, '#' | '0' | ',' | '.');
        let start = positive
            .find(is_number_char)
            .ok_or_else(|| FormatError::InvalidDecimalPattern(pattern.to_string()))?;
        let end = positive
            .rfind(is_number_char)
            .map(|i| i + 1)
            .unwrap_or(start);
        let number = &positive[start..end];
        if !number.contains(['#', '0']) || number.matches('.').count() > 1 {
            return Err(FormatError::InvalidDecimalPattern(pattern.to_string()));
        }
        let prefix = positive[..start].to_string();
        let suffix = positive[end..].to_string();
        let divisor = if suffix.contains('%') || prefix.contains('%') {
            100.0
        } else if suffix.contains('‰') || prefix.contains('‰') {
            1000.0
        } else {
            1.0
        };
        let fraction_digits = number
            .split_once('.')
            .map(|(_, frac)| frac.chars().filter(|c| matches!(c, '#' | '0')).count())
            .unwrap_or(0);
        Ok(Self {
            source: pattern.to_string(),
            prefix,
            suffix,
            grouping: number.contains(','),
            divisor,
            fraction_digits,
        })
    }

    /// Number of fraction digits the pattern displays.
    pub fn fraction_digits(&self) -> usize {
        self.fraction_digits
    }

    pub fn parse_value(&self, raw: &str) -> Option<f64> {
        let mut s = raw.trim();
        let negative = s.starts_with('-') && !self.prefix.starts_with('-');
        if negative {
            s = &s[1..];
        }
        let prefix = self.prefix.trim();
        if !prefix.is_empty() {
            s = s.strip_prefix(prefix).unwrap_or(s).trim_start();
        }
        let suffix = self.suffix.trim();
        if !suffix.is_empty() {
            s = s.strip_suffix(suffix).unwrap_or(s).trim_end();
        }
        let value = if self.grouping {
            let cleaned: String = s.chars().filter(|&c| c != ',').collect();
            parse_number_prefix(&cleaned)?
        } else {
            parse_number_prefix(s)?
        };
        let value = value / self.divisor;
        Some(if negative { -value } else { value })
    }
}

impl fmt::Display for DecimalPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Parse the longest numeric prefix of `s`, the way a lenient locale number
/// parser does (`"12.5ms"` → `12.5`). Returns `None` if no digit is found,
/// so `nan` and `inf` are not numbers here.
pub fn parse_number_prefix(s: &str) -> Option<f64> {
    let s = s.trim();
    let bytes = s.as_bytes();
    let mut i = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        i += 1;
    }
    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mut digits = i - int_start;
    if i < bytes.len() && bytes[i] == b'.' {
        let frac_start = i + 1;
        let mut j = frac_start;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        digits += j - frac_start;
        i = j;
    }
    if digits == 0 {
        return None;
    }
    // Exponent only counts if at least one digit follows it.
    if i < bytes.len() && matches!(bytes[i], b'e' | b'E') {
        let mut j = i + 1;
        if matches!(bytes.get(j), Some(b'+' | b'-')) {
            j += 1;
        }
        let exp_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            i = j;
        }
    }
    s[..i].parse::<f64>().ok()
}

// ─────────────────────────────────────────────────────────────────────────────
// Dates
// ─────────────────────────────────────────────────────────────────────────────

/// Layouts tried, in order, for `date` without an explicit pattern.
const DEFAULT_DATE_TIME_LAYOUTS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d_%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%d_%H:%M:%S%.f",
    "%d.%m.%Y %H:%M:%S%.f",
];

const DEFAULT_DATE_LAYOUTS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y"];

fn local_to_epoch_secs(ndt: &NaiveDateTime) -> Option<f64> {
    let dt = Local.from_local_datetime(ndt).earliest()?;
    Some(dt.timestamp() as f64 + f64::from(dt.timestamp_subsec_nanos()) * 1e-9)
}

fn offset_to_epoch_secs<Tz: TimeZone>(dt: &DateTime<Tz>) -> f64 {
    dt.timestamp() as f64 + f64::from(dt.timestamp_subsec_nanos()) * 1e-9
}

/// Parse a date using one explicit strftime layout. Offsets in the layout are
/// honoured; naive values are read as local time.
fn parse_date_with(raw: &str, layout: &str) -> Option<f64> {
    if let Ok(dt) = DateTime::parse_from_str(raw, layout) {
        return Some(offset_to_epoch_secs(&dt));
    }
    if let Ok(ndt) = NaiveDateTime::parse_from_str(raw, layout) {
        return local_to_epoch_secs(&ndt);
    }
    let date = NaiveDate::parse_from_str(raw, layout).ok()?;
    local_to_epoch_secs(&date.and_hms_opt(0, 0, 0)?)
}

fn parse_date_default(raw: &str) -> Option<f64> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(offset_to_epoch_secs(&dt));
    }
    for layout in DEFAULT_DATE_TIME_LAYOUTS {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(raw, layout) {
            return local_to_epoch_secs(&ndt);
        }
    }
    for layout in DEFAULT_DATE_LAYOUTS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, layout) {
            return local_to_epoch_secs(&date.and_hms_opt(0, 0, 0)?);
        }
    }
    None
}

// ─────────────────────────────────────────────────────────────────────────────
// FieldFormat
// ─────────────────────────────────────────────────────────────────────────────

/// Parser for one field (or the X column).
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FieldFormat {
    /// Lenient plain number.
    #[default]
    Number,
    /// Number read through a decimal pattern.
    NumberPattern(DecimalPattern),
    /// Date/time in a default layout, as seconds since the UNIX epoch.
    Date,
    /// Date/time in a strftime layout, as seconds since the UNIX epoch.
    DatePattern(String),
}

impl FieldFormat {
    /// Convert a raw field into a number. `None` means "not a number"; the
    /// caller decides how to report it.
    pub fn parse_value(&self, raw: &str) -> Option<f64> {
        let raw = raw.trim();
        match self {
            FieldFormat::Number => parse_number_prefix(raw),
            FieldFormat::NumberPattern(p) => p.parse_value(raw),
            FieldFormat::Date => parse_date_default(raw),
            FieldFormat::DatePattern(layout) => parse_date_with(raw, layout),
        }
    }

    pub fn is_date(&self) -> bool {
        matches!(self, FieldFormat::Date | FieldFormat::DatePattern(_))
    }
}

impl FromStr for FieldFormat {
    type Err = FormatError;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let (kind, pattern) = match spec.split_once(',') {
            Some((kind, pattern)) => (kind, Some(pattern)),
            None => (spec, None),
        };
        match (kind.trim(), pattern) {
            ("number", None) => Ok(FieldFormat::Number),
            ("date", None) | ("time", None) => Ok(FieldFormat::Date),
            (_, Some(p)) if p.is_empty() => Err(FormatError::EmptyPattern(spec.to_string())),
            ("number", Some(p)) => Ok(FieldFormat::NumberPattern(DecimalPattern::parse(p)?)),
            ("date", Some(p)) | ("time", Some(p)) => {
                if StrftimeItems::new(p).any(|item| matches!(item, Item::Error)) {
                    return Err(FormatError::InvalidDatePattern(p.to_string()));
                }
                Ok(FieldFormat::DatePattern(p.to_string()))
            }
            _ => Err(FormatError::Unrecognized(spec.to_string())),
        }
    }
}

impl fmt::Display for FieldFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldFormat::Number => write!(f, "number"),
            FieldFormat::NumberPattern(p) => write!(f, "number,{p}"),
            FieldFormat::Date => write!(f, "date"),
            FieldFormat::DatePattern(p) => write!(f, "date,{p}"),
        }
    }
}
