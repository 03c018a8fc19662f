//! # spotifetch-core
//!
//! Core library for spotifetch - listening history analytics.
//!
//! This library provides:
//! - Domain types for play events and time windows
//! - Paginated history aggregation from an event source
//! - Pure analytics over an event list (ratios, fingerprint, hourly clock)
//! - A polar "radial clock" chart scene with hover and tooltip state
//! - Configuration management
//! - Logging infrastructure
//!
//! ## Data flow
//!
//! ```text
//! EventSource ──pages──▶ HistoryAggregator ──Vec<PlayEvent>──▶ AnalyticsEngine
//!                                                                   │
//!                                   ListeningReport ◀───────────────┘
//!                                         │ hourly distribution
//!                                         ▼
//!                                PolarChartRenderer ──▶ ChartTarget ──▶ SVG / terminal canvas
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use spotifetch_core::analytics::{AnalyticsEngine, TimeRange};
//! use spotifetch_core::history::{HistoryAggregator, HttpEventSource};
//! use spotifetch_core::Config;
//!
//! # async fn run() -> spotifetch_core::Result<()> {
//! let config = Config::load()?;
//! let source = HttpEventSource::new(&config.source)?;
//! let aggregator = HistoryAggregator::from_config(source, &config.source)?;
//! let history = aggregator.collect("some-user").await?;
//!
//! let engine = AnalyticsEngine::local();
//! let report = engine.report(&history.events, TimeRange::Month, chrono::Utc::now(), 5, 0);
//! println!("{} plays this month", report.total_plays);
//! # Ok(())
//! # }
//! ```

// Re-export commonly used items at the crate root
pub use config::Config;
pub use error::{Error, Result};
pub use types::*;

// Public modules
pub mod analytics;
pub mod chart;
pub mod config;
pub mod error;
pub mod format;
pub mod history;
pub mod logging;
pub mod types;
