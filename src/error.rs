//! Error types for configuration, line parsing and tailing.

use thiserror::Error;

/// An unrecognised or malformed format spec (`number`, `number,<pattern>`,
/// `date`, `date,<pattern>`).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("Unrecognized number format: {0}")]
    Unrecognized(String),
    #[error("Empty pattern in format: {0}")]
    EmptyPattern(String),
    #[error("Invalid decimal pattern: {0}")]
    InvalidDecimalPattern(String),
    #[error("Invalid date pattern: {0}")]
    InvalidDatePattern(String),
}

/// Fatal configuration problems, reported before any ingestion starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid field separator: {0}")]
    Separator(#[from] regex::Error),
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error("field indices are 1-based, got 0 in --{0}")]
    ZeroIndex(&'static str),
    #[error("Field specified in --y2 ({0}) not present in --select")]
    Y2NotSelected(usize),
    #[error(
        "Number of fields selected with --select ({selected}) does not match number of labels given with --fields ({names})"
    )]
    FieldCountMismatch { selected: usize, names: usize },
    #[error("invalid --field-format value '{0}', expected FIELD,FMT")]
    FieldFormatSyntax(String),
    #[error("invalid index list '{0}'")]
    IndexList(String),
    #[error("Field specified in --y2 ({0}) is the --x column and would not be plotted")]
    Y2IsX(usize),
    #[error("poll interval must be greater than zero")]
    PollInterval,
}

/// A line that could not be turned into a point at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineError {
    #[error("Expected at least {expected} fields, but saw {found} on line {line}")]
    InsufficientFields {
        line: u64,
        expected: usize,
        found: usize,
    },
}

/// A single value that failed to parse; the value becomes NaN.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    #[error("Invalid X value on line {line}: {raw}")]
    X { line: u64, raw: String },
    #[error("Invalid value on line {line} for \"{field}\": {raw}")]
    Field {
        line: u64,
        field: String,
        raw: String,
    },
}

impl ValueError {
    /// Line number the value was read from.
    pub fn line(&self) -> u64 {
        match self {
            ValueError::X { line, .. } | ValueError::Field { line, .. } => *line,
        }
    }
}

/// Fatal errors from the tailing reader.
#[derive(Debug, Error)]
pub enum TailError {
    #[error("I/O error while reading {source_name}: {error}")]
    Io {
        source_name: String,
        #[source]
        error: std::io::Error,
    },
}

/// Why the plot window stopped.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("window error: {0}")]
    Window(#[from] eframe::Error),
    #[error(transparent)]
    Tail(#[from] TailError),
}
