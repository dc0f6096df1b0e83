#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tailplot::autoscale::AxisId;
use tailplot::buffer::{FlushScheduler, PointBuffer};
use tailplot::data::field::Field;
use tailplot::data::point::Point;
use tailplot::display::DisplayAdapter;

/// Counts flush requests instead of scheduling anything.
#[derive(Default)]
pub struct CountingScheduler {
    pub count: AtomicUsize,
}

impl FlushScheduler for CountingScheduler {
    fn schedule_flush(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}

impl CountingScheduler {
    pub fn get(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

pub fn counting_buffer() -> (PointBuffer, Arc<CountingScheduler>) {
    let scheduler = Arc::new(CountingScheduler::default());
    (PointBuffer::new(scheduler.clone()), scheduler)
}

/// One call made on a [`Recorder`].
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Fields(Vec<String>),
    Batch(Vec<Point>),
    Bounds(AxisId, f64, f64),
    Restart,
}

/// Display adapter that records every call in order.
#[derive(Debug, Default)]
pub struct Recorder {
    pub events: Vec<Event>,
}

impl DisplayAdapter for Recorder {
    fn on_fields_established(&mut self, fields: &[Field]) {
        self.events
            .push(Event::Fields(fields.iter().map(|f| f.name.clone()).collect()));
    }

    fn on_points_batch(&mut self, points: &[Point]) {
        self.events.push(Event::Batch(points.to_vec()));
    }

    fn on_axis_bounds(&mut self, axis: AxisId, lower: f64, upper: f64) {
        self.events.push(Event::Bounds(axis, lower, upper));
    }

    fn on_restart(&mut self) {
        self.events.push(Event::Restart);
    }
}

impl Recorder {
    pub fn bounds(&self, axis: AxisId) -> Vec<(f64, f64)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Bounds(a, lo, hi) if *a == axis => Some((*lo, *hi)),
                _ => None,
            })
            .collect()
    }

    pub fn position(&self, pred: impl Fn(&Event) -> bool) -> Option<usize> {
        self.events.iter().position(pred)
    }
}

pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

pub fn assert_bounds(actual: Option<(f64, f64)>, lo: f64, hi: f64) {
    let (a, b) = actual.unwrap_or_else(|| panic!("expected bounds ({lo}, {hi}), got none"));
    assert!(
        approx_eq(a, lo) && approx_eq(b, hi),
        "expected ({lo}, {hi}), got ({a}, {b})"
    );
}
