//! Configuration management for the journey timeline
//!
//! Values come from the process environment with a project `.env` fallback.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Render theme, as offered by the journey options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Default,
    Dark,
    Light,
    Matrix,
    Neon,
}

impl Theme {
    pub const ALL: [Self; 5] = [
        Self::Default,
        Self::Dark,
        Self::Light,
        Self::Matrix,
        Self::Neon,
    ];

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "default" | "" => Some(Self::Default),
            "dark" => Some(Self::Dark),
            "light" => Some(Self::Light),
            "matrix" => Some(Self::Matrix),
            "neon" => Some(Self::Neon),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Dark => "dark",
            Self::Light => "light",
            Self::Matrix => "matrix",
            Self::Neon => "neon",
        }
    }
}

/// Main configuration struct
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    // Aggregation
    pub default_days: u32,
    pub captures_path: PathBuf,
    pub repo_path: PathBuf,
    pub commit_source: Option<String>,

    // Presentation
    pub theme: Theme,
    pub show_connections: bool,

    // Engine tuning
    pub cluster_min_distance: f64,
    pub edge_buffer_ratio: f64,
    pub lane_min_height: f64,
    pub lane_max_height: f64,
    pub recompute_debounce_ms: u64,
    pub frame_budget_ms: u64,

    // Logging
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_days: 7,
            captures_path: default_captures_path(),
            repo_path: PathBuf::from("."),
            commit_source: None,

            theme: Theme::Default,
            show_connections: true,

            cluster_min_distance: 20.0,
            edge_buffer_ratio: 0.05,
            lane_min_height: 28.0,
            lane_max_height: 72.0,
            recompute_debounce_ms: 250,
            frame_budget_ms: 16,

            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        config.default_days = u32::try_from(env_u64("JOURNEY_DEFAULT_DAYS", 7))
            .unwrap_or(u32::MAX)
            .max(1);
        if let Some(v) = env_value("JOURNEY_CAPTURES_PATH").filter(|v| !v.trim().is_empty()) {
            config.captures_path = PathBuf::from(v.trim());
        }
        if let Some(v) = env_value("JOURNEY_REPO_PATH").filter(|v| !v.trim().is_empty()) {
            config.repo_path = PathBuf::from(v.trim());
        }
        config.commit_source = env_value("JOURNEY_COMMIT_SOURCE")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        if let Some(v) = env_value("JOURNEY_THEME") {
            config.theme = Theme::parse(&v).unwrap_or_default();
        }
        config.show_connections = env_bool("JOURNEY_SHOW_CONNECTIONS", config.show_connections);

        config.cluster_min_distance =
            positive_or(env_f64("JOURNEY_CLUSTER_MIN_DISTANCE", 20.0), 20.0);
        let ratio = env_f64("JOURNEY_EDGE_BUFFER_RATIO", 0.05);
        config.edge_buffer_ratio = if ratio.is_finite() && ratio >= 0.0 {
            ratio
        } else {
            0.05
        };
        config.lane_min_height = positive_or(env_f64("JOURNEY_LANE_MIN_HEIGHT", 28.0), 28.0);
        config.lane_max_height = positive_or(env_f64("JOURNEY_LANE_MAX_HEIGHT", 72.0), 72.0);
        if config.lane_max_height < config.lane_min_height {
            std::mem::swap(&mut config.lane_min_height, &mut config.lane_max_height);
        }
        config.recompute_debounce_ms = env_u64("JOURNEY_RECOMPUTE_DEBOUNCE_MS", 250);
        config.frame_budget_ms = env_u64("JOURNEY_FRAME_BUDGET_MS", 16).max(1);

        if let Some(v) = env_value("JOURNEY_LOG_LEVEL").filter(|v| !v.trim().is_empty()) {
            config.log_level = v.trim().to_string();
        }

        config
    }
}

fn default_captures_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("journey")
        .join("captures.jsonl")
}

fn positive_or(value: f64, default: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        default
    }
}

// Helper functions for environment variable parsing

static DOTENV_VALUES: OnceLock<HashMap<String, String>> = OnceLock::new();

#[cfg(test)]
thread_local! {
    static TEST_ENV_OVERRIDES: std::cell::RefCell<HashMap<String, String>> =
        std::cell::RefCell::new(HashMap::new());
}

#[cfg(test)]
fn test_env_override_value(key: &str) -> Option<String> {
    TEST_ENV_OVERRIDES.with(|cell| cell.borrow().get(key).cloned())
}

fn dotenv_values() -> &'static HashMap<String, String> {
    DOTENV_VALUES.get_or_init(|| load_dotenv_file(Path::new(".env")))
}

/// Read a value from the .env file (if present).
#[must_use]
pub fn dotenv_value(key: &str) -> Option<String> {
    dotenv_values().get(key).cloned()
}

/// Read a value from the real environment first, falling back to .env.
#[must_use]
pub fn env_value(key: &str) -> Option<String> {
    #[cfg(test)]
    if let Some(v) = test_env_override_value(key) {
        return Some(v);
    }
    env::var(key).ok().or_else(|| dotenv_value(key))
}

fn load_dotenv_file(path: &Path) -> HashMap<String, String> {
    let Ok(contents) = fs::read_to_string(path) else {
        return HashMap::new();
    };
    parse_dotenv_contents(&contents)
}

/// Parse `KEY=value` lines. Blank lines, `#` comments and an `export ` prefix
/// are tolerated; matching single or double quotes around a value are removed.
#[must_use]
pub fn parse_dotenv_contents(contents: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for raw_line in contents.lines() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        map.insert(key.to_string(), parse_dotenv_value(value));
    }
    map
}

fn parse_dotenv_value(raw: &str) -> String {
    let trimmed = raw.trim();
    for quote in ['"', '\''] {
        if let Some(rest) = trimmed.strip_prefix(quote) {
            if let Some(end) = rest.find(quote) {
                let remainder = rest[end + 1..].trim_start();
                if remainder.is_empty() || remainder.starts_with('#') {
                    return rest[..end].to_string();
                }
            }
        }
    }
    // Unquoted: strip an inline comment introduced by " #".
    trimmed
        .split_once(" #")
        .map_or(trimmed, |(value, _)| value.trim_end())
        .to_string()
}

fn parse_bool(value: &str, default: bool) -> bool {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "t" | "yes" | "y" => true,
        "0" | "false" | "f" | "no" | "n" => false,
        _ => default,
    }
}

fn env_bool(key: &str, default: bool) -> bool {
    env_value(key).map_or(default, |v| parse_bool(&v, default))
}

fn env_u64(key: &str, default: u64) -> u64 {
    env_value(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn env_f64(key: &str, default: f64) -> f64 {
    env_value(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
