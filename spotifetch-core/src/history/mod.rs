//! Listening history collection
//!
//! The history service exposes plays newest-first through a paged endpoint.
//! [`HistoryAggregator`] walks those pages strictly in order until the source
//! is exhausted or a safety cap is reached, producing one bounded event list.
//!
//! ## Sources
//!
//! - [`HttpEventSource`]: the history service over HTTP
//! - [`JsonFileSource`]: a local JSON export in the same record format
//!
//! ## Usage
//!
//! ```rust,ignore
//! let source = JsonFileSource::open("history.json")?;
//! let aggregator = HistoryAggregator::new(source, 50, 2000)?;
//! let history = aggregator.collect("listener").await?;
//! println!("{} events over {} pages", history.events.len(), history.pages);
//! ```

mod aggregator;
mod file;
mod http;
mod record;

pub use aggregator::{Aggregation, HistoryAggregator, StopReason, DEFAULT_CAP};
pub use file::JsonFileSource;
pub use http::HttpEventSource;
pub use record::HistoryRecord;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::PlayEvent;

/// A paged source of play events, newest first.
///
/// A page shorter than `limit` (including an empty page) means the source is
/// exhausted.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Fetch up to `limit` events after skipping the first `skip`.
    async fn fetch_page(&self, user_id: &str, skip: usize, limit: usize)
        -> Result<Vec<PlayEvent>>;
}

#[async_trait]
impl<T: EventSource + ?Sized> EventSource for Box<T> {
    async fn fetch_page(
        &self,
        user_id: &str,
        skip: usize,
        limit: usize,
    ) -> Result<Vec<PlayEvent>> {
        (**self).fetch_page(user_id, skip, limit).await
    }
}
