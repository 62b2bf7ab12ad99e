//! Surface geometry shared by the renderer and the interaction overlay.

use crate::config::TimelineConfig;
use crate::lanes::lane_height;

/// Logical surface size and the device pixel ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceMetrics {
    pub width: f64,
    pub height: f64,
    pub pixel_ratio: f64,
}

impl Default for SurfaceMetrics {
    fn default() -> Self {
        Self::new(800.0, 400.0, 1.0)
    }
}

fn finite_non_negative(v: f64) -> f64 {
    if v.is_finite() { v.max(0.0) } else { 0.0 }
}

impl SurfaceMetrics {
    /// Non-finite or negative sizes collapse to zero; a non-positive ratio
    /// becomes 1.
    #[must_use]
    pub fn new(width: f64, height: f64, pixel_ratio: f64) -> Self {
        Self {
            width: finite_non_negative(width),
            height: finite_non_negative(height),
            pixel_ratio: if pixel_ratio.is_finite() && pixel_ratio > 0.0 {
                pixel_ratio
            } else {
                1.0
            },
        }
    }

    /// Logical length to device pixels.
    #[must_use]
    pub fn device(&self, logical: f64) -> f64 {
        logical * self.pixel_ratio
    }

    /// Device stroke width for a logical width, at least one device pixel.
    #[must_use]
    pub fn stroke(&self, logical_width: f64) -> f64 {
        self.device(logical_width).round().max(1.0)
    }

    /// Device coordinate for a stroke centerline. Odd device widths sit on
    /// half pixels so they cover whole pixels.
    #[must_use]
    pub fn align(&self, logical: f64, device_stroke: f64) -> f64 {
        let device = self.device(logical);
        #[allow(clippy::cast_possible_truncation)]
        let odd = (device_stroke.round() as i64) % 2 == 1;
        if odd { device.floor() + 0.5 } else { device.round() }
    }

    /// Device coordinate snapped to a whole pixel, for fills.
    #[must_use]
    pub fn snap(&self, logical: f64) -> f64 {
        self.device(logical).round()
    }
}

/// Where lanes, labels and the axis sit on the surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimelineLayout {
    pub surface: SurfaceMetrics,
    pub label_width: f64,
    pub axis_height: f64,
    pub lane_height: f64,
    pub lane_count: usize,
}

impl TimelineLayout {
    #[must_use]
    pub fn new(surface: SurfaceMetrics, config: &TimelineConfig, lane_count: usize) -> Self {
        let label_width = finite_non_negative(config.label_width).min(surface.width);
        let axis_height = finite_non_negative(config.axis_height).min(surface.height);
        let available = surface.height - axis_height;
        Self {
            surface,
            label_width,
            axis_height,
            lane_height: lane_height(
                lane_count,
                available,
                config.lane_min_height,
                config.lane_max_height,
            ),
            lane_count,
        }
    }

    #[must_use]
    pub fn plot_left(&self) -> f64 {
        self.label_width
    }

    /// Width events project onto.
    #[must_use]
    pub fn plot_width(&self) -> f64 {
        (self.surface.width - self.label_width).max(0.0)
    }

    /// Top of the time axis.
    #[must_use]
    pub fn axis_top(&self) -> f64 {
        (self.surface.height - self.axis_height).max(0.0)
    }

    #[must_use]
    pub fn lane_top(&self, lane: usize) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        let index = lane as f64;
        index * self.lane_height
    }

    #[must_use]
    pub fn lane_center_y(&self, lane: usize) -> f64 {
        self.lane_top(lane) + self.lane_height / 2.0
    }

    /// Surface x of a projected plot coordinate.
    #[must_use]
    pub fn marker_x(&self, projected: f64) -> f64 {
        self.plot_left() + projected
    }

    #[must_use]
    pub fn in_plot(&self, x: f64) -> bool {
        x >= self.plot_left() && x <= self.surface.width
    }
}
