//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/spotifetch/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/spotifetch/` (~/.config/spotifetch/)
//! - State/Logs: `$XDG_STATE_HOME/spotifetch/` (~/.local/state/spotifetch/)

use crate::analytics::TimeRange;
use crate::chart::Rgb;
use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Largest page the history service accepts.
pub const MAX_PAGE_SIZE: usize = 200;

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// History service connection and paging
    #[serde(default)]
    pub source: SourceConfig,

    /// Radial clock appearance
    #[serde(default)]
    pub chart: ChartConfig,

    /// Report defaults
    #[serde(default)]
    pub analytics: AnalyticsConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// History service configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SourceConfig {
    /// Base URL of the history service
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// User whose history is fetched (can be overridden on the command line)
    pub user_id: Option<String>,

    /// Bearer token sent with every request (optional)
    pub api_key: Option<String>,

    /// Events requested per page (1-200)
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Stop paging once this many events are held
    #[serde(default = "default_max_events")]
    pub max_events: usize,

    /// HTTP request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            user_id: None,
            api_key: None,
            page_size: default_page_size(),
            max_events: default_max_events(),
            timeout_secs: default_timeout(),
        }
    }
}

impl SourceConfig {
    /// Validate configuration, returning error message if invalid
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(Error::Config(format!(
                "source.page_size must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }
        if self.max_events == 0 {
            return Err(Error::Config(
                "source.max_events must be at least 1".to_string(),
            ));
        }
        if !(self.server_url.starts_with("http://") || self.server_url.starts_with("https://")) {
            return Err(Error::Config(format!(
                "source.server_url must be an http(s) URL, got {:?}",
                self.server_url
            )));
        }
        Ok(())
    }
}

fn default_server_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_page_size() -> usize {
    50
}

fn default_max_events() -> usize {
    2000
}

fn default_timeout() -> u64 {
    30
}

/// Radial clock configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ChartConfig {
    /// Chart width in pixels
    #[serde(default = "default_chart_size")]
    pub width: u32,

    /// Chart height in pixels
    #[serde(default = "default_chart_size")]
    pub height: u32,

    /// Fill for the quietest hour (`#rrggbb`)
    #[serde(default = "default_low_color")]
    pub low_color: String,

    /// Fill for the busiest hour (`#rrggbb`)
    #[serde(default = "default_high_color")]
    pub high_color: String,

    /// Hours that get a text label instead of a tick
    #[serde(default = "default_major_hours")]
    pub major_hours: Vec<u8>,

    /// Fraction of each hour's angular step left empty between bars
    #[serde(default = "default_band_padding")]
    pub band_padding: f64,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: default_chart_size(),
            height: default_chart_size(),
            low_color: default_low_color(),
            high_color: default_high_color(),
            major_hours: default_major_hours(),
            band_padding: default_band_padding(),
        }
    }
}

impl ChartConfig {
    /// Parse the two accent colors.
    pub fn colors(&self) -> Result<(Rgb, Rgb)> {
        Ok((
            Rgb::from_hex(&self.low_color)?,
            Rgb::from_hex(&self.high_color)?,
        ))
    }
}

fn default_chart_size() -> u32 {
    300
}

fn default_low_color() -> String {
    "#1e3a8a".to_string()
}

fn default_high_color() -> String {
    "#60a5fa".to_string()
}

fn default_major_hours() -> Vec<u8> {
    vec![0, 6, 12, 18]
}

fn default_band_padding() -> f64 {
    0.08
}

/// Report configuration
#[derive(Debug, Deserialize)]
pub struct AnalyticsConfig {
    /// Range shown when none is requested
    #[serde(default = "default_range")]
    pub default_range: TimeRange,

    /// Entries per top-N ranking
    #[serde(default = "default_top_count")]
    pub top_count: usize,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            default_range: default_range(),
            top_count: default_top_count(),
        }
    }
}

fn default_range() -> TimeRange {
    TimeRange::Month
}

fn default_top_count() -> usize {
    5
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Maximum number of log files to keep
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_files: default_max_log_files(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_files() -> usize {
    5
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/spotifetch/config.toml` (~/.config/spotifetch/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("spotifetch").join("config.toml")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/spotifetch/` (~/.local/state/spotifetch/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("spotifetch")
    }

    /// Returns the log file path
    ///
    /// `$XDG_STATE_HOME/spotifetch/spotifetch.log` (~/.local/state/spotifetch/spotifetch.log)
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("spotifetch.log")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.source.page_size, 50);
        assert_eq!(config.source.max_events, 2000);
        assert_eq!(config.chart.major_hours, vec![0, 6, 12, 18]);
        assert_eq!(config.analytics.default_range, TimeRange::Month);
        assert!(config.source.validate().is_ok());
    }

    #[test]
    fn test_parse_config() {
        let toml = r##"
[source]
server_url = "https://history.example.com"
user_id = "listener"
page_size = 100

[chart]
width = 480
high_color = "#ff6b6b"

[analytics]
default_range = "week"

[logging]
level = "debug"
"##;
        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.source.server_url, "https://history.example.com");
        assert_eq!(config.source.user_id.as_deref(), Some("listener"));
        assert_eq!(config.source.page_size, 100);
        assert_eq!(config.source.max_events, 2000);
        assert_eq!(config.chart.width, 480);
        assert_eq!(config.chart.height, 300);
        assert_eq!(config.analytics.default_range, TimeRange::Week);
        assert_eq!(config.logging.level, "debug");

        let (low, high) = config.chart.colors().unwrap();
        assert_eq!(low, Rgb::new(0x1e, 0x3a, 0x8a));
        assert_eq!(high, Rgb::new(0xff, 0x6b, 0x6b));
    }

    #[test]
    fn test_source_config_validation() {
        let config = SourceConfig {
            page_size: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = SourceConfig {
            page_size: MAX_PAGE_SIZE + 1,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = SourceConfig {
            max_events: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = SourceConfig {
            server_url: "localhost:8000".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_chart_color() {
        let config = ChartConfig {
            low_color: "blue".to_string(),
            ..Default::default()
        };
        assert!(config.colors().is_err());
    }
}
