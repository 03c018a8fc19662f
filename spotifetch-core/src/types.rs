//! Core domain types for spotifetch
//!
//! These types represent the canonical data model that every component
//! shares: the raw [`PlayEvent`] fetched from the history service and the
//! [`TimeWindow`] used to slice events into periods.
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Play event** | One record of a track having been played at a specific time |
//! | **Entity** | A track, album or artist, identified by an optional id |
//! | **Window** | A half-open `[from, to)` interval used to select events |
//! | **Local** | The timezone the analytics engine buckets days and hours in |

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ============================================
// Play events
// ============================================

/// One historical play.
///
/// Immutable once fetched. Identifiers are optional because the history
/// service does not guarantee them; a missing identifier is "unknown" and is
/// never counted as an entity of its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayEvent {
    /// Track identifier
    pub track_id: Option<String>,
    /// Artist identifier
    pub artist_id: Option<String>,
    /// Album identifier
    pub album_id: Option<String>,
    /// When the play happened
    pub played_at: DateTime<Utc>,
    /// Track display name
    #[serde(default)]
    pub track_name: Option<String>,
    /// Artist display name
    #[serde(default)]
    pub artist_name: Option<String>,
    /// Album display name
    #[serde(default)]
    pub album_name: Option<String>,
    /// Album cover URL
    #[serde(default)]
    pub album_image: Option<String>,
}

impl PlayEvent {
    /// Create an event with identifiers only (no display metadata).
    pub fn new(
        track_id: Option<&str>,
        artist_id: Option<&str>,
        album_id: Option<&str>,
        played_at: DateTime<Utc>,
    ) -> Self {
        Self {
            track_id: track_id.map(str::to_string),
            artist_id: artist_id.map(str::to_string),
            album_id: album_id.map(str::to_string),
            played_at,
            track_name: None,
            artist_name: None,
            album_name: None,
            album_image: None,
        }
    }
}

/// Which identifier of a [`PlayEvent`] to look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKey {
    Track,
    Album,
    Artist,
}

impl EntityKey {
    /// The event's identifier for this key, if known.
    pub fn id_of<'a>(&self, event: &'a PlayEvent) -> Option<&'a str> {
        match self {
            EntityKey::Track => event.track_id.as_deref(),
            EntityKey::Album => event.album_id.as_deref(),
            EntityKey::Artist => event.artist_id.as_deref(),
        }
    }

    /// The event's display name for this key, if known.
    pub fn name_of<'a>(&self, event: &'a PlayEvent) -> Option<&'a str> {
        match self {
            EntityKey::Track => event.track_name.as_deref(),
            EntityKey::Album => event.album_name.as_deref(),
            EntityKey::Artist => event.artist_name.as_deref(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKey::Track => "track",
            EntityKey::Album => "album",
            EntityKey::Artist => "artist",
        }
    }
}

// ============================================
// Time windows
// ============================================

/// Half-open interval `[from, to)`.
///
/// Invariant: `from < to`. Use [`TimeWindow::new`] to construct one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TimeWindow {
    from: DateTime<Utc>,
    to: DateTime<Utc>,
}

impl TimeWindow {
    /// Create a window, rejecting empty or inverted intervals.
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Self> {
        if from >= to {
            return Err(Error::InvalidWindow {
                from: from.to_rfc3339(),
                to: to.to_rfc3339(),
            });
        }
        Ok(Self { from, to })
    }

    /// The `days`-long window ending (exclusively) at `now`.
    ///
    /// `days` of zero is widened to one day so the window is never empty.
    pub fn trailing_days(now: DateTime<Utc>, days: u32) -> Self {
        let days = i64::from(days.max(1));
        Self {
            from: now - Duration::days(days),
            to: now,
        }
    }

    /// The local calendar week (Monday 00:00 to next Monday 00:00) containing `date`.
    pub fn week_starting<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> Result<Self> {
        let monday = date - Duration::days(i64::from(date.weekday().num_days_from_monday()));
        let from = local_midnight(monday, tz)?;
        let to = local_midnight(monday + Duration::days(7), tz)?;
        Self::new(from, to)
    }

    pub fn from(&self) -> DateTime<Utc> {
        self.from
    }

    pub fn to(&self) -> DateTime<Utc> {
        self.to
    }

    pub fn length(&self) -> Duration {
        self.to - self.from
    }

    /// Whether `ts` falls in `[from, to)`.
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.from <= ts && ts < self.to
    }

    /// The window of equal length ending where this one starts.
    pub fn preceding(&self) -> Self {
        Self {
            from: self.from - self.length(),
            to: self.from,
        }
    }

    /// The same window moved by a whole number of days (negative = earlier).
    pub fn shift_days(&self, days: i64) -> Self {
        Self {
            from: self.from + Duration::days(days),
            to: self.to + Duration::days(days),
        }
    }
}

/// Start of `date` in `tz`, as UTC.
///
/// When midnight does not exist locally (a DST gap), the first valid instant
/// of the following hour is used.
fn local_midnight<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> Result<DateTime<Utc>> {
    let midnight = date.and_hms_opt(0, 0, 0).ok_or_else(|| Error::InvalidWindow {
        from: date.to_string(),
        to: date.to_string(),
    })?;
    tz.from_local_datetime(&midnight)
        .earliest()
        .or_else(|| {
            tz.from_local_datetime(&(midnight + Duration::hours(1)))
                .earliest()
        })
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| Error::InvalidWindow {
            from: midnight.to_string(),
            to: midnight.to_string(),
        })
}
