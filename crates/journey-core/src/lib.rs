//! Core types, configuration, and models for the journey timeline
//!
//! This crate provides:
//! - Configuration management (`Config`, environment parsing)
//! - Data models (`TimelineEvent`, `DateRange`, `JourneyData`, etc.)
//! - The deterministic source palette
//! - Common error types and the tracing bootstrap

#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod palette;
pub mod timestamps;

// Re-export key types for convenience
pub use config::{Config, Theme};
pub use error::{Error as JourneyError, Result as JourneyResult};
pub use logging::init_tracing;
pub use models::{
    DateRange, EventId, EventType, Importance, JourneyData, JourneyStats, ProjectSummary,
    TimelineEvent, normalize_tags,
};
pub use palette::{Rgb, SOURCE_PALETTE, source_color};
