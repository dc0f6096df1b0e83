//! The native plot window.
//!
//! | Sub-module   | Responsibility |
//! | ------------ | -------------- |
//! | [`look`]     | Per-series colors and line width |
//! | [`series`]   | Plotted data per field; the [`DisplayAdapter`](crate::display::DisplayAdapter) the window drives |
//! | [`tail_app`] | [`TailPlotApp`] (eframe) with the auto-scale and restart controls |
//! | [`run`]      | [`run_tailplot()`] entry point and reader thread wiring |

mod look;
mod run;
mod series;
mod tail_app;

pub use look::{SeriesLook, PALETTE};
pub use run::run_tailplot;
pub use series::{PlotState, Series, Y2Mapping};
pub use tail_app::TailPlotApp;
