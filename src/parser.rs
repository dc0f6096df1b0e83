//! Line parser: raw text line in, typed [`Point`] out.
//!
//! The field set is established lazily from the first non-skipped line of a
//! session (`Uninitialized -> Established`), since column count and header
//! names are unknown until real data is seen. What happens to it on restart is
//! governed by [`RestartInference`].

use log::{debug, warn};
use regex::Regex;

use crate::data::field::{Field, FieldLayout, FieldSet};
use crate::data::format::FieldFormat;
use crate::data::point::Point;
use crate::error::{LineError, ValueError};

/// Default field separator: runs of comma, tab or space.
pub const DEFAULT_SEPARATOR: &str = "[,\t ]+";

/// What a restart does to a field set that was inferred from data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RestartInference {
    /// Keep the fields and selection of the previous pass.
    #[default]
    Keep,
    /// Infer again from the first line of the new pass, unless names and
    /// selection are both pinned by configuration.
    Reinfer,
}

/// Result of feeding one line to the parser.
#[derive(Debug, Clone, PartialEq)]
pub enum LineOutcome {
    /// Empty line or `#` comment.
    Skipped,
    /// Header line, consumed for names only.
    Header,
    /// A data point. `invalid` lists the values that became NaN.
    Point {
        point: Point,
        invalid: Vec<ValueError>,
    },
}

#[derive(Debug, Clone)]
enum Inference {
    Uninitialized,
    Established(FieldSet),
}

/// Turns raw lines into points for one session at a time.
#[derive(Debug, Clone)]
pub struct LineParser {
    separator: Regex,
    layout: FieldLayout,
    header_line: bool,
    x_format: FieldFormat,
    state: Inference,
    /// The header line of the current pass has not been seen yet.
    header_pending: bool,
    /// Fields established but not yet handed out for this session.
    announce: bool,
    /// Points produced in this session; doubles as X when no X column is set.
    points: u64,
}

impl LineParser {
    pub fn new(separator: Regex, layout: FieldLayout, header_line: bool) -> Self {
        let x_format = layout.x.map(|x| layout.format_of(x)).unwrap_or_default();
        Self {
            separator,
            layout,
            header_line,
            x_format,
            state: Inference::Uninitialized,
            header_pending: header_line,
            announce: false,
            points: 0,
        }
    }

    /// Parse one raw line. `line` is the 1-based line number within the pass.
    ///
    /// Structural problems come back as `Err` (no point for that line); bad
    /// values only become NaN and are listed in the outcome. Both are logged.
    pub fn parse(&mut self, raw: &str, line: u64) -> Result<LineOutcome, LineError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Ok(LineOutcome::Skipped);
        }
        let cells: Vec<&str> = self.separator.split(trimmed).collect();

        if let Inference::Uninitialized = self.state {
            let set = FieldSet::establish(&self.layout, &cells, self.header_line);
            debug!(
                "fields established on line {}: {:?} from columns {:?}",
                line,
                set.fields.iter().map(|f| f.name.as_str()).collect::<Vec<_>>(),
                set.selection
            );
            self.state = Inference::Established(set);
            self.announce = true;
        }

        if self.header_pending {
            self.header_pending = false;
            return Ok(LineOutcome::Header);
        }

        let Some(set) = self.field_set() else {
            return Ok(LineOutcome::Skipped);
        };

        if cells.len() < set.min_columns {
            let err = LineError::InsufficientFields {
                line,
                expected: set.min_columns,
                found: cells.len(),
            };
            warn!("{err}");
            return Err(err);
        }

        let mut invalid = Vec::new();

        let x = match self.layout.x {
            Some(column) => {
                let raw_x = cells[column - 1];
                self.x_format.parse_value(raw_x).unwrap_or_else(|| {
                    invalid.push(ValueError::X {
                        line,
                        raw: raw_x.to_string(),
                    });
                    f64::NAN
                })
            }
            None => self.points as f64,
        };

        let values = set
            .selection
            .iter()
            .zip(&set.fields)
            .map(|(&column, field)| {
                let raw_v = cells[column - 1];
                field.format.parse_value(raw_v).unwrap_or_else(|| {
                    invalid.push(ValueError::Field {
                        line,
                        field: field.name.clone(),
                        raw: raw_v.to_string(),
                    });
                    f64::NAN
                })
            })
            .collect();

        for err in &invalid {
            warn!("{err}");
        }

        self.points += 1;
        Ok(LineOutcome::Point {
            point: Point::new(x, values),
            invalid,
        })
    }

    /// The fields of this session, exactly once after they become known.
    pub fn take_established(&mut self) -> Option<Vec<Field>> {
        match &self.state {
            Inference::Established(set) if self.announce => {
                self.announce = false;
                Some(set.fields.clone())
            }
            _ => None,
        }
    }

    pub fn field_set(&self) -> Option<&FieldSet> {
        match &self.state {
            Inference::Established(set) => Some(set),
            Inference::Uninitialized => None,
        }
    }

    /// Points produced in the current session.
    pub fn points(&self) -> u64 {
        self.points
    }

    /// Start a new session.
    pub fn reset(&mut self, policy: RestartInference) {
        self.points = 0;
        self.header_pending = self.header_line;
        let reinfer = policy == RestartInference::Reinfer && !self.layout.is_pinned();
        match self.state {
            Inference::Established(_) if !reinfer => self.announce = true,
            _ => {
                self.state = Inference::Uninitialized;
                self.announce = false;
            }
        }
    }
}
