//! Offline event source over a JSON export.

use std::path::Path;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::PlayEvent;

use super::{EventSource, HistoryRecord};

/// Serves pages out of an in-memory list, newest first.
///
/// The export holds a single user's history, so `user_id` is ignored.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    events: Vec<PlayEvent>,
}

impl JsonFileSource {
    /// Load a JSON array of history records.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let records: Vec<HistoryRecord> = serde_json::from_str(&content)?;
        let events = records
            .into_iter()
            .map(HistoryRecord::into_event)
            .collect::<Result<Vec<_>>>()?;

        tracing::info!(path = %path.display(), events = events.len(), "Loaded history export");
        Ok(Self::from_events(events))
    }

    /// Wrap already-parsed events.
    pub fn from_events(mut events: Vec<PlayEvent>) -> Self {
        events.sort_by(|a, b| b.played_at.cmp(&a.played_at));
        Self { events }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[async_trait]
impl EventSource for JsonFileSource {
    async fn fetch_page(
        &self,
        _user_id: &str,
        skip: usize,
        limit: usize,
    ) -> Result<Vec<PlayEvent>> {
        let start = skip.min(self.events.len());
        let end = skip.saturating_add(limit).min(self.events.len());
        Ok(self.events[start..end].to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_open_sorts_newest_first_and_pages() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"track_id": "a", "played_at": "2024-05-01T10:00:00Z"}},
                {{"track_id": "b", "played_at": "2024-05-03T10:00:00Z"}},
                {{"track_id": "c", "played_at": "2024-05-02T10:00:00Z"}}
            ]"#
        )
        .unwrap();

        let source = JsonFileSource::open(file.path()).unwrap();
        assert_eq!(source.len(), 3);

        let first = source.fetch_page("anyone", 0, 2).await.unwrap();
        let ids: Vec<_> = first.iter().map(|e| e.track_id.as_deref().unwrap()).collect();
        assert_eq!(ids, vec!["b", "c"]);

        let second = source.fetch_page("anyone", 2, 2).await.unwrap();
        assert_eq!(second.len(), 1);
        assert!(source.fetch_page("anyone", 5, 2).await.unwrap().is_empty());
    }

    #[test]
    fn test_open_rejects_bad_timestamp() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"track_id": "a", "played_at": "soon"}}]"#).unwrap();
        assert!(JsonFileSource::open(file.path()).is_err());
    }
}
