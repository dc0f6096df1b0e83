//! Interface the pipeline drives on the display side.

use crate::autoscale::AxisId;
use crate::data::field::Field;
use crate::data::point::Point;

/// Receives finalized points and axis-bound updates. All calls happen on the
/// consumer's execution context, from [`Flusher::flush`](crate::flush::Flusher::flush).
pub trait DisplayAdapter {
    /// The field set of a session became known. Called once per session.
    fn on_fields_established(&mut self, fields: &[Field]);

    /// All points since the previous flush, in arrival order. Values may be NaN.
    fn on_points_batch(&mut self, points: &[Point]);

    /// New bounds for an auto-scaled axis.
    fn on_axis_bounds(&mut self, axis: AxisId, lower: f64, upper: f64);

    /// The source restarted: drop every series and redraw from empty.
    fn on_restart(&mut self);
}
