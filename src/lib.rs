//! tailplot crate root: re-exports and module wiring.
//!
//! Plots a text file while it is being written, like `tail -f` drawn as a
//! chart. The pipeline is split into cohesive modules:
//! - `source`: line sources (growing file, standard input)
//! - `parser`: splits lines into fields and points
//! - `tail`: the reader loop with restart and truncation handling
//! - `buffer`: FIFO between the reader and the display, coalesced flushes
//! - `flush`: drains the buffer, runs auto-scaling, drives a `DisplayAdapter`
//! - `autoscale`: per-axis extrema and margined bounds
//! - `app`: the egui/eframe window
//! - `config` / `cli`: validated configuration and the command line

pub mod app;
pub mod autoscale;
pub mod buffer;
pub mod cli;
pub mod config;
pub mod controllers;
pub mod data;
pub mod display;
pub mod error;
pub mod flush;
pub mod parser;
pub mod source;
pub mod tail;

// Public re-exports for a compact external API
pub use app::{run_tailplot, TailPlotApp};
pub use autoscale::{AutoScale, AxisId};
pub use buffer::{FlushScheduler, Ingest, PointBuffer};
pub use config::{ConfigOptions, Source, TailPlotConfig};
pub use controllers::TailController;
pub use data::field::{Axis, Field, FieldLayout};
pub use data::format::FieldFormat;
pub use data::point::Point;
pub use display::DisplayAdapter;
pub use error::{ConfigError, LineError, RunError, TailError, ValueError};
pub use flush::{FlushStats, Flusher};
pub use parser::{LineOutcome, LineParser, RestartInference};
pub use source::{FileSource, LineSource, ReadStatus, StreamSource};
pub use tail::Tailer;
