//! Wire format of the history service.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::PlayEvent;

/// One play as returned by `GET /user/{user_id}/history/`.
///
/// The service identifies artists and albums by name; explicit ids are
/// honored when present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryRecord {
    #[serde(default)]
    pub track_id: Option<String>,
    #[serde(default)]
    pub artist_id: Option<String>,
    #[serde(default)]
    pub album_id: Option<String>,
    #[serde(default)]
    pub track_name: Option<String>,
    #[serde(default)]
    pub artist_name: Option<String>,
    #[serde(default)]
    pub album_name: Option<String>,
    #[serde(default)]
    pub album_image: Option<String>,
    pub played_at: String,
}

impl HistoryRecord {
    /// Convert to a [`PlayEvent`], normalizing identifiers and the timestamp.
    pub fn into_event(self) -> Result<PlayEvent> {
        let played_at = parse_played_at(&self.played_at)?;
        let track_name = non_empty(self.track_name);
        let artist_name = non_empty(self.artist_name);
        let album_name = non_empty(self.album_name);

        Ok(PlayEvent {
            track_id: non_empty(self.track_id),
            artist_id: non_empty(self.artist_id).or_else(|| artist_name.clone()),
            album_id: non_empty(self.album_id).or_else(|| album_name.clone()),
            played_at,
            track_name,
            artist_name,
            album_name,
            album_image: non_empty(self.album_image),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Parse an RFC 3339 timestamp; one without an offset is UTC.
pub(crate) fn parse_played_at(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(naive.and_utc());
        }
    }
    Err(Error::EventSource(format!(
        "invalid played_at timestamp: {:?}",
        raw
    )))
}
