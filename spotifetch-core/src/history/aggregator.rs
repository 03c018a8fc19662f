//! Sequential, capped pagination over an [`EventSource`].

use crate::config::{SourceConfig, MAX_PAGE_SIZE};
use crate::error::{Error, Result};
use crate::types::PlayEvent;

use super::EventSource;

/// Default maximum number of events materialized by one run.
pub const DEFAULT_CAP: usize = 2000;

/// Why an aggregation run stopped requesting pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The last page was empty
    Exhausted,
    /// The last page was shorter than the page size
    ShortPage,
    /// The accumulator reached the cap
    CapReached,
}

impl StopReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            StopReason::Exhausted => "exhausted",
            StopReason::ShortPage => "short_page",
            StopReason::CapReached => "cap_reached",
        }
    }
}

/// Result of one aggregation run.
#[derive(Debug, Clone)]
pub struct Aggregation {
    /// Accumulated events in source order
    pub events: Vec<PlayEvent>,
    /// Number of page requests issued
    pub pages: usize,
    /// Why paging stopped
    pub stop: StopReason,
}

impl Aggregation {
    /// Whether the run stopped because of the cap rather than exhaustion.
    pub fn truncated(&self) -> bool {
        self.stop == StopReason::CapReached
    }
}

/// Pages through an event source into a bounded in-memory list.
pub struct HistoryAggregator<S> {
    source: S,
    page_size: usize,
    cap: usize,
}

impl<S: EventSource> HistoryAggregator<S> {
    /// Create an aggregator.
    ///
    /// `page_size` must be within 1..=200 and `cap` at least 1.
    pub fn new(source: S, page_size: usize, cap: usize) -> Result<Self> {
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(Error::Config(format!(
                "page size must be between 1 and {}, got {}",
                MAX_PAGE_SIZE, page_size
            )));
        }
        if cap == 0 {
            return Err(Error::Config("event cap must be at least 1".to_string()));
        }
        Ok(Self {
            source,
            page_size,
            cap,
        })
    }

    /// Create an aggregator using the paging settings from configuration.
    pub fn from_config(source: S, config: &SourceConfig) -> Result<Self> {
        Self::new(source, config.page_size, config.max_events)
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Collect the user's history.
    ///
    /// Pages are requested one at a time; the next `skip` is the number of
    /// events received so far. Any page failure aborts the whole run.
    pub async fn collect(&self, user_id: &str) -> Result<Aggregation> {
        let mut events: Vec<PlayEvent> = Vec::new();
        let mut pages = 0usize;

        let stop = loop {
            let skip = events.len();
            let page = self
                .source
                .fetch_page(user_id, skip, self.page_size)
                .await?;
            pages += 1;

            let returned = page.len();
            tracing::debug!(
                user_id,
                skip,
                returned,
                accumulated = skip + returned,
                "Fetched history page"
            );

            if returned == 0 {
                break StopReason::Exhausted;
            }

            events.extend(page);

            if returned < self.page_size {
                break StopReason::ShortPage;
            }
            if events.len() >= self.cap {
                break StopReason::CapReached;
            }
        };

        tracing::info!(
            user_id,
            events = events.len(),
            pages,
            stop = stop.as_str(),
            "History aggregation finished"
        );

        Ok(Aggregation {
            events,
            pages,
            stop,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone, Utc};
    use std::sync::Mutex;

    /// Serves scripted page lengths and records every request.
    struct ScriptedSource {
        pages: Vec<usize>,
        fail_on: Option<usize>,
        requests: Mutex<Vec<(usize, usize)>>,
    }

    impl ScriptedSource {
        fn new(pages: Vec<usize>) -> Self {
            Self {
                pages,
                fail_on: None,
                requests: Mutex::new(Vec::new()),
            }
        }

        fn requests(&self) -> Vec<(usize, usize)> {
            self.requests.lock().unwrap().clone()
        }
    }

    fn events(start: usize, n: usize) -> Vec<PlayEvent> {
        let base = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        (start..start + n)
            .map(|i| {
                let id = format!("t{}", i);
                PlayEvent::new(Some(&id), None, None, base - Duration::minutes(i as i64))
            })
            .collect()
    }

    #[async_trait]
    impl EventSource for ScriptedSource {
        async fn fetch_page(
            &self,
            _user_id: &str,
            skip: usize,
            limit: usize,
        ) -> Result<Vec<PlayEvent>> {
            let index = {
                let mut requests = self.requests.lock().unwrap();
                requests.push((skip, limit));
                requests.len() - 1
            };
            if self.fail_on == Some(index) {
                return Err(Error::EventSource("connection refused".to_string()));
            }
            let n = self.pages.get(index).copied().unwrap_or(0);
            Ok(events(skip, n))
        }
    }

    /// Always returns a full page.
    struct EndlessSource {
        requests: Mutex<usize>,
    }

    #[async_trait]
    impl EventSource for EndlessSource {
        async fn fetch_page(
            &self,
            _user_id: &str,
            skip: usize,
            limit: usize,
        ) -> Result<Vec<PlayEvent>> {
            *self.requests.lock().unwrap() += 1;
            Ok(events(skip, limit))
        }
    }

    #[tokio::test]
    async fn test_stops_after_short_page() {
        let source = ScriptedSource::new(vec![50, 50, 30, 50]);
        let aggregator = HistoryAggregator::new(source, 50, DEFAULT_CAP).unwrap();

        let result = aggregator.collect("listener").await.unwrap();

        assert_eq!(result.events.len(), 130);
        assert_eq!(result.pages, 3);
        assert_eq!(result.stop, StopReason::ShortPage);
        assert_eq!(
            aggregator.source.requests(),
            vec![(0, 50), (50, 50), (100, 50)]
        );
    }

    #[tokio::test]
    async fn test_stops_on_empty_page() {
        let source = ScriptedSource::new(vec![50, 0]);
        let aggregator = HistoryAggregator::new(source, 50, DEFAULT_CAP).unwrap();

        let result = aggregator.collect("listener").await.unwrap();

        assert_eq!(result.events.len(), 50);
        assert_eq!(result.pages, 2);
        assert_eq!(result.stop, StopReason::Exhausted);
    }

    #[tokio::test]
    async fn test_cap_bounds_endless_source() {
        let source = EndlessSource {
            requests: Mutex::new(0),
        };
        let aggregator = HistoryAggregator::new(source, 50, 100).unwrap();

        let result = aggregator.collect("listener").await.unwrap();

        assert_eq!(result.events.len(), 100);
        assert_eq!(result.pages, 2);
        assert!(result.truncated());
        assert_eq!(*aggregator.source.requests.lock().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_cap_overshoot_is_less_than_a_page() {
        let source = EndlessSource {
            requests: Mutex::new(0),
        };
        let aggregator = HistoryAggregator::new(source, 40, 100).unwrap();

        let result = aggregator.collect("listener").await.unwrap();

        assert_eq!(result.events.len(), 120);
        assert!(result.events.len() < 100 + 40);
        assert_eq!(result.stop, StopReason::CapReached);
    }

    #[tokio::test]
    async fn test_page_failure_propagates() {
        let mut source = ScriptedSource::new(vec![50, 50, 50]);
        source.fail_on = Some(1);
        let aggregator = HistoryAggregator::new(source, 50, DEFAULT_CAP).unwrap();

        let err = aggregator.collect("listener").await.unwrap_err();

        assert!(matches!(err, Error::EventSource(_)));
        // No further pages after the failure
        assert_eq!(aggregator.source.requests().len(), 2);
    }

    #[test]
    fn test_rejects_bad_paging() {
        assert!(HistoryAggregator::new(ScriptedSource::new(vec![]), 0, 10).is_err());
        assert!(HistoryAggregator::new(ScriptedSource::new(vec![]), 201, 10).is_err());
        assert!(HistoryAggregator::new(ScriptedSource::new(vec![]), 50, 0).is_err());
    }
}
