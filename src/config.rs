//! Configuration for a tailplot session.
//!
//! [`ConfigOptions`] is the raw, unvalidated form (what the command line
//! carries); [`TailPlotConfig::from_options`] checks it and produces the
//! configuration the pipeline and the window consume.

use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;
use std::time::Duration;

use regex::Regex;

use crate::data::axis_format::AxisFormatter;
use crate::data::field::FieldLayout;
use crate::data::format::FieldFormat;
use crate::error::ConfigError;
use crate::parser::{LineParser, RestartInference, DEFAULT_SEPARATOR};
use crate::tail::DEFAULT_POLL_INTERVAL;

/// Where lines come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Stdin,
    File(PathBuf),
}

impl Source {
    /// Whether the source can be reopened (restart, truncation handling).
    pub fn is_restartable(&self) -> bool {
        matches!(self, Source::File(_))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ConfigOptions
// ─────────────────────────────────────────────────────────────────────────────

/// Unvalidated options. Indices are 1-based source columns.
#[derive(Debug, Clone, Default)]
pub struct ConfigOptions {
    pub file: Option<PathBuf>,
    pub field_separator: Option<String>,
    /// Field names, split with the field separator.
    pub fields: Option<String>,
    pub select: Option<Vec<usize>>,
    pub y2: Option<Vec<usize>>,
    pub x: Option<usize>,
    pub field_formats: Vec<(usize, FieldFormat)>,
    pub x_format: Option<FieldFormat>,
    pub y_format: Option<FieldFormat>,
    pub y2_format: Option<FieldFormat>,
    pub header_line: bool,
    pub title: Option<String>,
    pub no_auto_restart: bool,
    pub reinfer_on_restart: bool,
    pub poll_interval: Option<Duration>,
}

// ─────────────────────────────────────────────────────────────────────────────
// TailPlotConfig
// ─────────────────────────────────────────────────────────────────────────────

/// Validated configuration.
///
/// | Field               | Purpose |
/// |---------------------|---------|
/// | `source`            | file to follow, or standard input |
/// | `separator`         | field separator regex |
/// | `layout`            | pinned names / selection / axes / formats |
/// | `header_line`       | first line of each pass is a header |
/// | `*_formatter`       | tick label formatting per axis |
/// | `auto_restart`      | restart when the file shrinks |
/// | `restart_inference` | what a restart does to inferred fields |
#[derive(Debug, Clone)]
pub struct TailPlotConfig {
    pub source: Source,
    pub separator: Regex,
    pub layout: FieldLayout,
    pub header_line: bool,
    /// Native window title.
    pub title: String,
    pub x_formatter: AxisFormatter,
    pub y_formatter: AxisFormatter,
    pub y2_formatter: AxisFormatter,
    pub auto_restart: bool,
    pub restart_inference: RestartInference,
    pub poll_interval: Duration,
}

fn check_indices(name: &'static str, indices: &[usize]) -> Result<(), ConfigError> {
    if indices.contains(&0) {
        return Err(ConfigError::ZeroIndex(name));
    }
    Ok(())
}

impl TailPlotConfig {
    /// Validate raw options. Every error here is fatal before ingestion starts.
    pub fn from_options(opts: ConfigOptions) -> Result<Self, ConfigError> {
        let separator = Regex::new(opts.field_separator.as_deref().unwrap_or(DEFAULT_SEPARATOR))?;

        if let Some(select) = &opts.select {
            check_indices("select", select)?;
        }
        if let Some(y2) = &opts.y2 {
            check_indices("y2", y2)?;
        }
        if let Some(x) = opts.x {
            check_indices("x", &[x])?;
        }
        let field_columns: Vec<usize> = opts.field_formats.iter().map(|(c, _)| *c).collect();
        check_indices("field-format", &field_columns)?;

        let y2: BTreeSet<usize> = opts.y2.iter().flatten().copied().collect();
        match (&opts.select, opts.x) {
            (Some(select), _) => {
                if let Some(&missing) = y2.iter().find(|c| !select.contains(c)) {
                    return Err(ConfigError::Y2NotSelected(missing));
                }
            }
            // The default selection leaves the X column out.
            (None, Some(x)) if y2.contains(&x) => return Err(ConfigError::Y2IsX(x)),
            (None, _) => {}
        }
        if opts.poll_interval == Some(Duration::ZERO) {
            return Err(ConfigError::PollInterval);
        }

        let names = opts.fields.as_deref().map(|s| {
            separator
                .split(s.trim())
                .map(str::to_string)
                .collect::<Vec<_>>()
        });
        if let (Some(names), Some(select)) = (&names, &opts.select) {
            if names.len() != select.len() {
                return Err(ConfigError::FieldCountMismatch {
                    selected: select.len(),
                    names: names.len(),
                });
            }
        }

        let formats: HashMap<usize, FieldFormat> = opts.field_formats.into_iter().collect();

        let source = match opts.file {
            Some(path) => Source::File(path),
            None => Source::Stdin,
        };
        let title = opts.title.unwrap_or_else(|| match &source {
            Source::File(path) => path.display().to_string(),
            Source::Stdin => "<standard input>".to_string(),
        });
        let axis = |f: &Option<FieldFormat>| {
            f.as_ref().map(AxisFormatter::from_format).unwrap_or_default()
        };

        Ok(Self {
            auto_restart: source.is_restartable() && !opts.no_auto_restart,
            source,
            separator,
            layout: FieldLayout {
                names,
                selection: opts.select,
                y2,
                x: opts.x,
                formats,
            },
            header_line: opts.header_line,
            title,
            x_formatter: axis(&opts.x_format),
            y_formatter: axis(&opts.y_format),
            y2_formatter: axis(&opts.y2_format),
            restart_inference: if opts.reinfer_on_restart {
                RestartInference::Reinfer
            } else {
                RestartInference::Keep
            },
            poll_interval: opts.poll_interval.unwrap_or(DEFAULT_POLL_INTERVAL),
        })
    }

    /// A fresh parser for this configuration.
    pub fn parser(&self) -> LineParser {
        LineParser::new(self.separator.clone(), self.layout.clone(), self.header_line)
    }

    /// Whether the chart needs a secondary Y axis.
    pub fn uses_y2(&self) -> bool {
        self.layout.has_y2()
    }
}
