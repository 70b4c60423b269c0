use crate::core::ballistics::TrajectorySample;

pub const DISTANCE_TO_HEIGHT_RATIO: f64 = 2.0; // x:y data window ratio

const X_PADDING_RATIO: f64 = 0.06;
const Y_PADDING_RATIO: f64 = 0.10;

/// Data-space bounds for a chart. `x` always starts at zero.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AxisWindow {
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl AxisWindow {
    /// Pads raw extents independently on each axis, keeping at least one unit of span.
    pub fn padded(raw_max_x: f64, raw_min_y: f64, raw_max_y: f64) -> Self {
        let raw_x_span = finite_or(raw_max_x, 0.0).max(1.0);
        let raw_min_y = finite_or(raw_min_y, 0.0).min(0.0);
        let raw_max_y = finite_or(raw_max_y, 0.0).max(0.0);
        let y_pad = (raw_max_y - raw_min_y).max(1.0) * Y_PADDING_RATIO;

        Self {
            x_max: raw_x_span + raw_x_span * X_PADDING_RATIO,
            y_min: if raw_min_y < 0.0 { raw_min_y - y_pad } else { 0.0 },
            y_max: raw_max_y + y_pad,
        }
    }

    /// Window whose x:y span matches `DISTANCE_TO_HEIGHT_RATIO`, so a flight
    /// path keeps its true shape.
    pub fn fixed_ratio(raw_max_x: f64, raw_max_y: f64) -> Self {
        let raw_max_x = finite_or(raw_max_x, 0.0);
        let raw_max_y = finite_or(raw_max_y, 0.0);
        let raw_x_span = raw_max_x.max(1.0);
        let raw_y_span = raw_max_y.max(1.0);
        let x_pad = raw_x_span * X_PADDING_RATIO;
        let y_pad = raw_y_span * Y_PADDING_RATIO;

        let mut x_span = (raw_max_x + x_pad).max(1.0);
        let mut y_span = (raw_max_y + y_pad).max(1.0);

        if x_span / y_span < DISTANCE_TO_HEIGHT_RATIO {
            x_span = y_span * DISTANCE_TO_HEIGHT_RATIO;
        } else {
            y_span = x_span / DISTANCE_TO_HEIGHT_RATIO;
        }

        Self {
            x_max: x_span,
            y_min: 0.0,
            y_max: y_span,
        }
    }

    /// Fixed-ratio window enclosing a sampled flight path (distance vs. height).
    pub fn for_flight_path(samples: &[TrajectorySample]) -> Self {
        let max_distance = samples.iter().map(|s| s.distance_m).fold(0.0, f64::max);
        let max_height = samples.iter().map(|s| s.height_m).fold(0.0, f64::max);
        Self::fixed_ratio(max_distance, max_height)
    }

    pub fn x_span(&self) -> f64 {
        self.x_max
    }

    pub fn y_span(&self) -> f64 {
        self.y_max - self.y_min
    }
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() { value } else { fallback }
}
