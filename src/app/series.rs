//! Plotted data per field, and the [`DisplayAdapter`] that fills it.

use crate::autoscale::AxisId;
use crate::data::field::{Axis, Field};
use crate::data::point::Point;
use crate::display::DisplayAdapter;

use super::look::SeriesLook;

/// One field's points. Missing values (NaN) break the line, so the data is
/// kept as runs of consecutive finite points.
#[derive(Debug, Clone)]
pub struct Series {
    pub field: Field,
    pub look: SeriesLook,
    segments: Vec<Vec<[f64; 2]>>,
    len: usize,
}

impl Series {
    pub fn new(field: Field, index: usize) -> Self {
        Self {
            field,
            look: SeriesLook::new(index),
            segments: vec![Vec::new()],
            len: 0,
        }
    }

    pub fn axis(&self) -> Axis {
        self.field.axis
    }

    /// Append a point; a non-finite coordinate ends the current run.
    pub fn push(&mut self, x: f64, y: f64) {
        if !x.is_finite() || !y.is_finite() {
            if self.segments.last().is_some_and(|s| !s.is_empty()) {
                self.segments.push(Vec::new());
            }
            return;
        }
        match self.segments.last_mut() {
            Some(run) => run.push([x, y]),
            None => self.segments.push(vec![[x, y]]),
        }
        self.len += 1;
    }

    /// Non-empty runs of finite points, oldest first.
    pub fn segments(&self) -> impl Iterator<Item = &[[f64; 2]]> {
        self.segments
            .iter()
            .filter(|s| !s.is_empty())
            .map(Vec::as_slice)
    }

    /// Number of finite points.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Everything the window draws, updated only through [`DisplayAdapter`].
#[derive(Debug, Clone, Default)]
pub struct PlotState {
    series: Vec<Series>,
    /// Latest auto-scaled bounds per axis, indexed by [`AxisId::index`].
    bounds: [Option<(f64, f64)>; 3],
    points: usize,
    restarts: usize,
}

impl PlotState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn series(&self) -> &[Series] {
        &self.series
    }

    pub fn bounds(&self, axis: AxisId) -> Option<(f64, f64)> {
        self.bounds[axis.index()]
    }

    /// Points received in the current session.
    pub fn points(&self) -> usize {
        self.points
    }

    pub fn restarts(&self) -> usize {
        self.restarts
    }
}

impl DisplayAdapter for PlotState {
    fn on_fields_established(&mut self, fields: &[Field]) {
        self.series = fields
            .iter()
            .enumerate()
            .map(|(i, f)| Series::new(f.clone(), i))
            .collect();
    }

    fn on_points_batch(&mut self, points: &[Point]) {
        for point in points {
            for (series, &v) in self.series.iter_mut().zip(&point.values) {
                series.push(point.x, v);
            }
        }
        self.points += points.len();
    }

    fn on_axis_bounds(&mut self, axis: AxisId, lower: f64, upper: f64) {
        self.bounds[axis.index()] = Some((lower, upper));
    }

    fn on_restart(&mut self) {
        self.series.clear();
        self.bounds = [None; 3];
        self.points = 0;
        self.restarts += 1;
    }
}

/// Linear map between the visible Y2 range and the visible primary Y range.
///
/// egui_plot has a single Y coordinate system, so Y2 series are drawn in
/// primary coordinates and the right-hand axis labels map back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Y2Mapping {
    /// Visible primary range.
    pub y: (f64, f64),
    /// Y2 range shown over the same screen extent.
    pub y2: (f64, f64),
}

impl Y2Mapping {
    pub fn to_primary(&self, v: f64) -> f64 {
        let (a, b) = self.y2;
        let (y0, y1) = self.y;
        if b == a {
            return (y0 + y1) / 2.0;
        }
        y0 + (v - a) * (y1 - y0) / (b - a)
    }

    pub fn to_secondary(&self, y: f64) -> f64 {
        let (a, b) = self.y2;
        let (y0, y1) = self.y;
        if y1 == y0 {
            return (a + b) / 2.0;
        }
        a + (y - y0) * (b - a) / (y1 - y0)
    }

    /// Move the primary range to `y` as a pan/zoom would, moving the Y2 range
    /// along so Y2 series stay where they are relative to the primary data.
    pub fn follow(&mut self, y: (f64, f64)) {
        self.y2 = (self.to_secondary(y.0), self.to_secondary(y.1));
        self.y = y;
    }
}
