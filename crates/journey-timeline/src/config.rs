//! Engine tuning.

use std::time::Duration;

use journey_core::{Config, Theme};

/// Tuning constants for the timeline engine, in logical surface units.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineConfig {
    /// Events closer than this (horizontally) merge into one cluster.
    pub cluster_min_distance: f64,
    /// Fraction of the viewport duration added on both sides when windowing.
    pub edge_buffer_ratio: f64,
    pub lane_min_height: f64,
    pub lane_max_height: f64,
    /// Smallest interaction zone edge.
    pub min_hit_size: f64,
    /// Width reserved on the left for lane labels.
    pub label_width: f64,
    /// Height reserved at the bottom for the time axis.
    pub axis_height: f64,
    /// Multiplier applied to marker radii.
    pub marker_scale: f64,
    /// Approximate glyph advance and line height, for tooltip sizing.
    pub char_width: f64,
    pub line_height: f64,
    /// Offset of the tooltip from the pointer.
    pub tooltip_offset: f64,
    pub recompute_debounce: Duration,
    pub frame_budget: Duration,
    pub show_connections: bool,
    pub theme: Theme,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            cluster_min_distance: 20.0,
            edge_buffer_ratio: 0.05,
            lane_min_height: 28.0,
            lane_max_height: 72.0,
            min_hit_size: 24.0,
            label_width: 120.0,
            axis_height: 24.0,
            marker_scale: 1.0,
            char_width: 7.0,
            line_height: 16.0,
            tooltip_offset: 12.0,
            recompute_debounce: Duration::from_millis(250),
            frame_budget: Duration::from_millis(16),
            show_connections: true,
            theme: Theme::Default,
        }
    }
}

impl TimelineConfig {
    /// Derive engine tuning from the application config.
    #[must_use]
    pub fn from_core(config: &Config) -> Self {
        Self {
            cluster_min_distance: config.cluster_min_distance,
            edge_buffer_ratio: config.edge_buffer_ratio,
            lane_min_height: config.lane_min_height,
            lane_max_height: config.lane_max_height.max(config.lane_min_height),
            recompute_debounce: Duration::from_millis(config.recompute_debounce_ms),
            frame_budget: Duration::from_millis(config.frame_budget_ms.max(1)),
            show_connections: config.show_connections,
            theme: config.theme,
            ..Self::default()
        }
    }

    /// Profile for a character-cell surface: one unit is one terminal cell.
    #[must_use]
    pub fn terminal() -> Self {
        Self {
            cluster_min_distance: 2.0,
            lane_min_height: 1.0,
            lane_max_height: 4.0,
            min_hit_size: 1.0,
            label_width: 12.0,
            axis_height: 1.0,
            marker_scale: 0.1,
            char_width: 1.0,
            line_height: 1.0,
            tooltip_offset: 1.0,
            ..Self::default()
        }
    }

    /// Apply the theme and connection toggle from the application config,
    /// keeping this profile's geometry.
    #[must_use]
    pub fn with_presentation(mut self, config: &Config) -> Self {
        self.theme = config.theme;
        self.show_connections = config.show_connections;
        self.recompute_debounce = Duration::from_millis(config.recompute_debounce_ms);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_core_copies_tuning() {
        let core = Config {
            cluster_min_distance: 12.0,
            recompute_debounce_ms: 100,
            frame_budget_ms: 0,
            theme: Theme::Matrix,
            show_connections: false,
            ..Config::default()
        };
        let cfg = TimelineConfig::from_core(&core);
        assert!((cfg.cluster_min_distance - 12.0).abs() < f64::EPSILON);
        assert_eq!(cfg.recompute_debounce, Duration::from_millis(100));
        assert_eq!(cfg.frame_budget, Duration::from_millis(1));
        assert_eq!(cfg.theme, Theme::Matrix);
        assert!(!cfg.show_connections);
    }

    #[test]
    fn terminal_profile_keeps_presentation() {
        let core = Config {
            theme: Theme::Neon,
            ..Config::default()
        };
        let cfg = TimelineConfig::terminal().with_presentation(&core);
        assert_eq!(cfg.theme, Theme::Neon);
        assert!((cfg.lane_max_height - 4.0).abs() < f64::EPSILON);
        assert!((cfg.edge_buffer_ratio - 0.05).abs() < f64::EPSILON);
    }
}
