//! Axis tick-label formatters: decimal and adaptive time formatting.
//!
//! [`AxisFormatter`] is built from the same format spec as field input
//! (`--x-format`, `--y-format`, `--y2-format`): `number` keeps the adaptive
//! numeric labels, `number,<pattern>` fixes the fraction digits, `date` picks
//! the adaptive [`TimeFormatter`] and `date,<pattern>` renders every label with
//! one strftime layout. Time values are seconds since the UNIX epoch, matching
//! what date fields parse into.

use std::fmt::Write;

use chrono::{Datelike, Timelike};

use crate::data::format::FieldFormat;

// ─────────────────────────────────────────────────────────────────────────────
// TimeResolution
// ─────────────────────────────────────────────────────────────────────────────

/// Granularity of the sub-second portion shown in a time label.
///
/// Ordered from coarsest to finest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TimeResolution {
    /// `HH:MM:SS`
    Seconds,
    /// `HH:MM:SS.mmm`
    Milliseconds,
    /// `HH:MM:SS.mmmuuu`
    Microseconds,
}

// ─────────────────────────────────────────────────────────────────────────────
// TimeFormatter
// ─────────────────────────────────────────────────────────────────────────────

/// Adaptive timestamp formatter.
///
/// * The date (`MM-DD`) is shown only when the visible range crosses a
///   calendar day; the year only when it crosses a year.
/// * Milliseconds appear below [`milliseconds_threshold`](Self::milliseconds_threshold)
///   seconds of visible range, microseconds below
///   [`microseconds_threshold`](Self::microseconds_threshold).
#[derive(Debug, Clone)]
pub struct TimeFormatter {
    pub force_date_visible: bool,
    /// Visible range (seconds) below which milliseconds are shown. Default: 1 hour.
    pub milliseconds_threshold: f64,
    /// Visible range (seconds) below which microseconds are shown. Default: 1 second.
    pub microseconds_threshold: f64,
}

impl Default for TimeFormatter {
    fn default() -> Self {
        Self {
            force_date_visible: false,
            milliseconds_threshold: 3_600.0,
            microseconds_threshold: 1.0,
        }
    }
}

impl TimeFormatter {
    /// Format `value` (epoch seconds) given the visible range `(lo, hi)`.
    pub fn format(&self, value: f64, range: (f64, f64)) -> String {
        let (lo, hi) = if range.0 <= range.1 {
            range
        } else {
            (range.1, range.0)
        };
        let start = secs_to_local(lo);
        let end = secs_to_local(hi);
        let dt = secs_to_local(value);

        let show_date = self.force_date_visible || start.date_naive() != end.date_naive();
        let show_year = show_date && start.year() != end.year();

        let base = if show_year {
            dt.format("%Y-%m-%d %H:%M:%S").to_string()
        } else if show_date {
            dt.format("%m-%d %H:%M:%S").to_string()
        } else {
            dt.format("%H:%M:%S").to_string()
        };

        match self.determine_resolution(hi - lo) {
            TimeResolution::Seconds => base,
            TimeResolution::Milliseconds => {
                format!("{}.{:03}", base, dt.nanosecond() / 1_000_000)
            }
            TimeResolution::Microseconds => format!("{}.{:06}", base, dt.nanosecond() / 1_000),
        }
    }

    pub fn determine_resolution(&self, span_secs: f64) -> TimeResolution {
        if span_secs < self.microseconds_threshold {
            TimeResolution::Microseconds
        } else if span_secs < self.milliseconds_threshold {
            TimeResolution::Milliseconds
        } else {
            TimeResolution::Seconds
        }
    }
}

/// Epoch seconds to local time; non-finite or out-of-range values map to the epoch.
fn secs_to_local(secs: f64) -> chrono::DateTime<chrono::Local> {
    let utc = if secs.is_finite() {
        let s = secs.floor() as i64;
        let ns = (((secs - s as f64) * 1e9).round() as u32).min(999_999_999);
        chrono::DateTime::from_timestamp(s, ns)
    } else {
        None
    };
    utc.unwrap_or_default().with_timezone(&chrono::Local)
}

// ─────────────────────────────────────────────────────────────────────────────
// DecimalFormatter
// ─────────────────────────────────────────────────────────────────────────────

/// Plain decimal labels with optional fixed fraction digits.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DecimalFormatter {
    /// Fixed fraction digits, or `None` to derive them from the grid step.
    pub decimal_places: Option<usize>,
}

impl DecimalFormatter {
    pub fn format(&self, value: f64, step: f64) -> String {
        let digits = self.decimal_places.unwrap_or_else(|| decimals_for_step(step));
        format!("{:.*}", digits, value)
    }
}

/// Steps at or beyond `10^±SCIENTIFIC_EXPONENT` switch `Auto` labels to
/// scientific notation.
pub const SCIENTIFIC_EXPONENT: i32 = 6;

/// Fraction digits needed to tell apart ticks `step` apart.
pub fn decimals_for_step(step: f64) -> usize {
    if !step.is_finite() || step <= 0.0 {
        return 0;
    }
    let exp = step.log10().floor() as i32;
    if exp >= 0 {
        0
    } else {
        (-exp) as usize
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// AxisFormatter
// ─────────────────────────────────────────────────────────────────────────────

/// How tick labels of one axis are rendered.
#[derive(Debug, Clone, Default)]
pub enum AxisFormatter {
    /// Decimal, switching to scientific notation for very large/small steps.
    #[default]
    Auto,
    Decimal(DecimalFormatter),
    Time(Box<TimeFormatter>),
    /// Every label rendered with one strftime layout.
    TimePattern(String),
}

impl AxisFormatter {
    /// Formatter matching an axis format spec.
    pub fn from_format(format: &FieldFormat) -> Self {
        match format {
            FieldFormat::Number => AxisFormatter::Auto,
            FieldFormat::NumberPattern(p) => AxisFormatter::Decimal(DecimalFormatter {
                decimal_places: Some(p.fraction_digits()),
            }),
            FieldFormat::Date => AxisFormatter::Time(Box::default()),
            FieldFormat::DatePattern(layout) => AxisFormatter::TimePattern(layout.clone()),
        }
    }

    pub fn is_time(&self) -> bool {
        matches!(self, AxisFormatter::Time(_) | AxisFormatter::TimePattern(_))
    }

    /// Format a tick value. `range` is the visible axis range, `step` the grid
    /// step between ticks.
    pub fn format(&self, value: f64, range: (f64, f64), step: f64) -> String {
        match self {
            AxisFormatter::Auto => format_adaptive_numeric(value, step.abs()),
            AxisFormatter::Decimal(df) => df.format(value, step.abs()),
            AxisFormatter::Time(tf) => tf.format(value, range),
            AxisFormatter::TimePattern(layout) => {
                let mut out = String::new();
                if write!(out, "{}", secs_to_local(value).format(layout)).is_err() {
                    out.clear();
                }
                out
            }
        }
    }
}

fn format_adaptive_numeric(v: f64, step: f64) -> String {
    let sci = step.is_finite() && step > 0.0 && {
        let exp = step.log10().floor() as i32;
        exp <= -SCIENTIFIC_EXPONENT || exp >= SCIENTIFIC_EXPONENT
    };
    if sci {
        format_scientific(v, 2)
    } else {
        format!("{:.*}", decimals_for_step(step), v)
    }
}

/// Compact scientific notation like `1.23e5` or `-4.00e-2`.
fn format_scientific(value: f64, digits: usize) -> String {
    if value == 0.0 {
        return format!("{:.*}", digits, 0.0_f64);
    }
    if !value.is_finite() {
        return format!("{}", value);
    }
    let exp = value.abs().log10().floor() as i32;
    let mantissa = value / 10f64.powi(exp);
    if exp == 0 {
        format!("{:.*}", digits, mantissa)
    } else {
        format!("{:.*}e{}", digits, mantissa, exp)
    }
}
