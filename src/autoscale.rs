//! Auto-scale engine: running extrema per axis and margined display bounds.

/// Margin used when every observed value on an axis is the same.
pub const DEGENERATE_MARGIN: f64 = 0.5;

/// Fraction of the observed span added on both sides.
pub const MARGIN_FRACTION: f64 = 0.1;

/// The three axes of the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AxisId {
    X,
    Y,
    Y2,
}

impl AxisId {
    pub const ALL: [AxisId; 3] = [AxisId::X, AxisId::Y, AxisId::Y2];

    pub fn index(self) -> usize {
        match self {
            AxisId::X => 0,
            AxisId::Y => 1,
            AxisId::Y2 => 2,
        }
    }
}

/// Observed extrema of one axis since the last restart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisState {
    pub observed_min: f64,
    pub observed_max: f64,
    pub auto_scale: bool,
}

impl Default for AxisState {
    fn default() -> Self {
        Self {
            observed_min: f64::INFINITY,
            observed_max: f64::NEG_INFINITY,
            auto_scale: true,
        }
    }
}

impl AxisState {
    /// Widen the extrema with `v`. Non-finite values are ignored.
    pub fn observe(&mut self, v: f64) {
        if !v.is_finite() {
            return;
        }
        if v < self.observed_min {
            self.observed_min = v;
        }
        if v > self.observed_max {
            self.observed_max = v;
        }
    }

    pub fn has_data(&self) -> bool {
        self.observed_min <= self.observed_max
    }

    /// Margined bounds for the observed extrema, `None` before any finite value.
    pub fn bounds(&self) -> Option<(f64, f64)> {
        if !self.has_data() {
            return None;
        }
        let span = self.observed_max - self.observed_min;
        let margin = if span > 0.0 {
            MARGIN_FRACTION * span
        } else {
            DEGENERATE_MARGIN
        };
        Some((self.observed_min - margin, self.observed_max + margin))
    }

    fn reset(&mut self) {
        self.observed_min = f64::INFINITY;
        self.observed_max = f64::NEG_INFINITY;
    }
}

/// Per-axis auto-scale state for one session.
#[derive(Debug, Clone, Default)]
pub struct AutoScale {
    axes: [AxisState; 3],
    /// Bounds last handed to the display, per axis.
    applied: [Option<(f64, f64)>; 3],
}

impl AutoScale {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn axis(&self, axis: AxisId) -> &AxisState {
        &self.axes[axis.index()]
    }

    /// Widen `axis` with `values` and return the new display bounds if
    /// auto-scale is on for that axis and they differ from the last ones
    /// returned.
    pub fn update<I>(&mut self, axis: AxisId, values: I) -> Option<(f64, f64)>
    where
        I: IntoIterator<Item = f64>,
    {
        let state = &mut self.axes[axis.index()];
        for v in values {
            state.observe(v);
        }
        self.pending_bounds(axis)
    }

    /// Bounds for `axis` that have not been applied yet, marking them applied.
    pub fn pending_bounds(&mut self, axis: AxisId) -> Option<(f64, f64)> {
        let i = axis.index();
        if !self.axes[i].auto_scale {
            return None;
        }
        let bounds = self.axes[i].bounds()?;
        if self.applied[i] == Some(bounds) {
            return None;
        }
        self.applied[i] = Some(bounds);
        Some(bounds)
    }

    /// Turn auto-scale on or off. Turning it on returns the bounds to apply
    /// right away, if any data has been seen.
    pub fn set_auto_scale(&mut self, axis: AxisId, enabled: bool) -> Option<(f64, f64)> {
        let i = axis.index();
        self.axes[i].auto_scale = enabled;
        // Manual control may have moved the view; force the next apply.
        self.applied[i] = None;
        if enabled {
            self.pending_bounds(axis)
        } else {
            None
        }
    }

    pub fn is_auto_scale(&self, axis: AxisId) -> bool {
        self.axes[axis.index()].auto_scale
    }

    /// Back to the initial sentinels, keeping the auto-scale switches.
    pub fn reset(&mut self) {
        for state in &mut self.axes {
            state.reset();
        }
        self.applied = [None; 3];
    }
}
