//! Consumer side of the pipeline: drain the buffer, auto-scale, drive the display.

use log::debug;

use crate::autoscale::{AutoScale, AxisId};
use crate::buffer::{Ingest, PointBuffer};
use crate::data::field::Axis;
use crate::data::point::Point;
use crate::display::DisplayAdapter;

/// What one flush delivered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushStats {
    pub points: usize,
    pub batches: usize,
    pub restarts: usize,
}

/// Owns the auto-scale state and applies buffered items to a [`DisplayAdapter`].
///
/// Lives on the consumer's execution context; only the FIFO swap touches state
/// shared with the producer.
pub struct Flusher {
    buffer: PointBuffer,
    autoscale: AutoScale,
    /// Axis of each field of the current session.
    axes: Vec<Axis>,
}

impl Flusher {
    pub fn new(buffer: PointBuffer) -> Self {
        Self {
            buffer,
            autoscale: AutoScale::new(),
            axes: Vec::new(),
        }
    }

    pub fn buffer(&self) -> &PointBuffer {
        &self.buffer
    }

    pub fn autoscale(&self) -> &AutoScale {
        &self.autoscale
    }

    /// Drain everything appended since the last flush and apply it in order.
    ///
    /// Consecutive points go out as one `on_points_batch`, followed by any
    /// changed axis bounds. A restart marker splits the batch so the adapter
    /// sees `on_restart` between the points of the two sessions.
    pub fn flush(&mut self, adapter: &mut dyn DisplayAdapter) -> FlushStats {
        let mut stats = FlushStats::default();
        let items = self.buffer.take_batch();
        if items.is_empty() {
            return stats;
        }
        let mut batch = Vec::new();
        for item in items {
            match item {
                Ingest::Point(point) => batch.push(point),
                Ingest::Fields(fields) => {
                    self.deliver(&mut batch, adapter, &mut stats);
                    self.axes = fields.iter().map(|f| f.axis).collect();
                    adapter.on_fields_established(&fields);
                }
                Ingest::Restart => {
                    self.deliver(&mut batch, adapter, &mut stats);
                    self.autoscale.reset();
                    self.axes.clear();
                    adapter.on_restart();
                    stats.restarts += 1;
                }
            }
        }
        self.deliver(&mut batch, adapter, &mut stats);
        debug!(
            "flush: {} points in {} batches, {} restarts",
            stats.points, stats.batches, stats.restarts
        );
        stats
    }

    fn deliver(
        &mut self,
        batch: &mut Vec<Point>,
        adapter: &mut dyn DisplayAdapter,
        stats: &mut FlushStats,
    ) {
        if batch.is_empty() {
            return;
        }
        let x = self.autoscale.update(AxisId::X, batch.iter().map(|p| p.x));
        let y = self
            .autoscale
            .update(AxisId::Y, values_on(batch, &self.axes, Axis::Primary));
        let y2 = self
            .autoscale
            .update(AxisId::Y2, values_on(batch, &self.axes, Axis::Secondary));

        adapter.on_points_batch(batch);
        for (axis, bounds) in [(AxisId::X, x), (AxisId::Y, y), (AxisId::Y2, y2)] {
            if let Some((lo, hi)) = bounds {
                adapter.on_axis_bounds(axis, lo, hi);
            }
        }
        stats.points += batch.len();
        stats.batches += 1;
        batch.clear();
    }

    /// Switch auto-scale for `axis`; re-enabling applies the current bounds at once.
    pub fn set_auto_scale(&mut self, axis: AxisId, enabled: bool, adapter: &mut dyn DisplayAdapter) {
        if let Some((lo, hi)) = self.autoscale.set_auto_scale(axis, enabled) {
            adapter.on_axis_bounds(axis, lo, hi);
        }
    }
}

fn values_on<'a>(
    batch: &'a [Point],
    axes: &'a [Axis],
    axis: Axis,
) -> impl Iterator<Item = f64> + 'a {
    batch.iter().flat_map(move |p| {
        p.values
            .iter()
            .zip(axes)
            .filter(move |(_, a)| **a == axis)
            .map(|(v, _)| *v)
    })
}
