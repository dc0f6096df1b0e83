//! Command-line surface.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use clap::{ArgAction, Parser};

use crate::config::{ConfigOptions, TailPlotConfig};
use crate::data::format::FieldFormat;
use crate::error::ConfigError;

/// Comma-separated list of 1-based field indices, e.g. `1,3`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexList(pub Vec<usize>);

impl FromStr for IndexList {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(',')
            .map(|part| part.trim().parse::<usize>())
            .collect::<Result<Vec<_>, _>>()
            .map(IndexList)
            .map_err(|_| ConfigError::IndexList(s.to_string()))
    }
}

/// `FIELD,FMT`, e.g. `1,date,%Y-%m-%d_%H:%M:%S`.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFormatArg {
    pub field: usize,
    pub format: FieldFormat,
}

impl FromStr for FieldFormatArg {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (field, format) = s
            .split_once(',')
            .ok_or_else(|| ConfigError::FieldFormatSyntax(s.to_string()))?;
        let field = field
            .trim()
            .parse::<usize>()
            .map_err(|_| ConfigError::FieldFormatSyntax(s.to_string()))?;
        Ok(Self {
            field,
            format: format.parse()?,
        })
    }
}

/// Plots a file, displaying new data as it is generated (analogous to 'tail -f').
/// If no file is specified, standard input is read.
#[derive(Debug, Parser)]
#[command(
    name = "tailplot",
    version,
    disable_help_flag = true,
    after_help = "If both --fields and --header-line are specified, the first line is skipped, \
and field names are taken from --fields.\n\n\
Example: plot the first and third fields, with the third on the Y2 axis\n  \
tailplot --select=1,3 --y2=3 file"
)]
pub struct Args {
    /// File to follow (default: standard input)
    pub file: Option<PathBuf>,

    /// Field separator regex
    #[arg(short = 'F', long, value_name = "REGEX", default_value = "[,\t ]+")]
    pub field_separator: String,

    /// Field names (separated by the field separator)
    #[arg(short = 'f', long, value_name = "FIELDS")]
    pub fields: Option<String>,

    /// Comma-separated list of field indices to plot (1-based)
    #[arg(short = 's', long, value_name = "FIELDS")]
    pub select: Option<IndexList>,

    /// Comma-separated list of field indices to place on the Y2 axis (1-based)
    #[arg(long, value_name = "FIELDS")]
    pub y2: Option<IndexList>,

    /// Index of the field to use as X value (1-based, default: point index)
    #[arg(short = 'x', long = "x", value_name = "INDEX")]
    pub x: Option<usize>,

    /// Input format of a field, e.g. 1,date,%Y-%m-%d_%H:%M:%S (default: number)
    #[arg(long, value_name = "FIELD,FMT")]
    pub field_format: Vec<FieldFormatArg>,

    /// Display format of the X axis, e.g. date (default: number)
    #[arg(long, value_name = "FMT")]
    pub x_format: Option<FieldFormat>,

    /// Display format of the Y axis (default: number)
    #[arg(long, value_name = "FMT")]
    pub y_format: Option<FieldFormat>,

    /// Display format of the Y2 axis (default: number)
    #[arg(long, value_name = "FMT")]
    pub y2_format: Option<FieldFormat>,

    /// Use the first line as a header line
    #[arg(short = 'h', long)]
    pub header_line: bool,

    /// Window title (defaults to the file name)
    #[arg(short = 't', long)]
    pub title: Option<String>,

    /// Do not restart when the file shrinks
    #[arg(long)]
    pub no_auto_restart: bool,

    /// Infer field names and selection again after a restart
    #[arg(long)]
    pub reinfer_on_restart: bool,

    /// Poll interval while waiting for new data, in milliseconds
    #[arg(long, value_name = "MS", default_value_t = 100)]
    pub poll_interval_ms: u64,

    /// Display this message
    #[arg(long, action = ArgAction::Help)]
    pub help: Option<bool>,
}

impl From<Args> for ConfigOptions {
    fn from(args: Args) -> Self {
        ConfigOptions {
            file: args.file,
            field_separator: Some(args.field_separator),
            fields: args.fields,
            select: args.select.map(|l| l.0),
            y2: args.y2.map(|l| l.0),
            x: args.x,
            field_formats: args
                .field_format
                .into_iter()
                .map(|a| (a.field, a.format))
                .collect(),
            x_format: args.x_format,
            y_format: args.y_format,
            y2_format: args.y2_format,
            header_line: args.header_line,
            title: args.title,
            no_auto_restart: args.no_auto_restart,
            reinfer_on_restart: args.reinfer_on_restart,
            poll_interval: Some(Duration::from_millis(args.poll_interval_ms)),
        }
    }
}

impl Args {
    pub fn into_config(self) -> Result<TailPlotConfig, ConfigError> {
        TailPlotConfig::from_options(self.into())
    }
}
