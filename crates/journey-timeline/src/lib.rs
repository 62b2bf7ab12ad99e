//! Journey timeline viewport and rendering engine.
//!
//! - [`ViewportController`]: scale/position state machine and playback
//! - [`window_range`] / [`cluster_events`]: temporal windowing and overlap
//!   clustering
//! - [`LaneAllocator`]: per-source lanes over the windowed set
//! - [`draw`]: immediate-mode draw lists
//! - [`InteractionOverlay`]: hit zones, tooltips, selection and focus
//! - [`TimelineEngine`]: the context object tying them to a frame loop
//! - [`tui_surface`] / [`tui_input`]: the ftui terminal adapter

#![forbid(unsafe_code)]

pub mod config;
pub mod debounce;
pub mod engine;
pub mod lanes;
pub mod layout;
pub mod overlay;
pub mod render;
pub mod render_loop;
pub mod scale;
pub mod tui_input;
pub mod tui_surface;
pub mod viewport;
pub mod window;

pub use config::TimelineConfig;
pub use debounce::Debouncer;
pub use engine::{RenderedFrame, TimelineEngine, TimelineInput};
pub use lanes::{LaneAllocator, SourceLane, allocate_lanes, lane_height};
pub use layout::{SurfaceMetrics, TimelineLayout};
pub use overlay::{InteractionOverlay, InteractionZone, Selection, Tooltip};
pub use render::{DrawCommand, DrawList, Point, RenderInput, TextAlign, ThemePalette, draw};
pub use render_loop::{DeadlineScheduler, FrameHandle, FrameScheduler, RenderLoop};
pub use scale::Scale;
pub use tui_input::TuiInputMapper;
pub use tui_surface::{ZONE_HIT_BASE, rasterize, register_zone_hits, zone_for_hit};
pub use viewport::{DEFAULT_SPEED, MAX_SPEED, MIN_SPEED, Viewport, ViewportController};
pub use window::{EventCluster, cluster_events, project_x, window_range};
