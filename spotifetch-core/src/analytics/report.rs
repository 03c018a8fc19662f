//! Listening report for a fixed time range, and a per-range memo.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::engine::{
    slice, AnalyticsEngine, Fingerprint, MusicRatio, RankedEntity, WeeklyComparison,
};
use super::HourlyDistribution;
use crate::error::{Error, Result};
use crate::types::{EntityKey, PlayEvent, TimeWindow};

/// Report period, counted back from "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    Week,
    Month,
    Quarter,
    Year,
}

impl TimeRange {
    /// All ranges in display order.
    pub const ALL: [TimeRange; 4] = [
        TimeRange::Week,
        TimeRange::Month,
        TimeRange::Quarter,
        TimeRange::Year,
    ];

    pub fn days(&self) -> u32 {
        match self {
            TimeRange::Week => 7,
            TimeRange::Month => 30,
            TimeRange::Quarter => 90,
            TimeRange::Year => 365,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TimeRange::Week => "Last 7 days",
            TimeRange::Month => "Last 30 days",
            TimeRange::Quarter => "Last 90 days",
            TimeRange::Year => "Last 365 days",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::Week => "week",
            TimeRange::Month => "month",
            TimeRange::Quarter => "quarter",
            TimeRange::Year => "year",
        }
    }

    /// The next range, wrapping from year back to week.
    pub fn next(&self) -> Self {
        match self {
            TimeRange::Week => TimeRange::Month,
            TimeRange::Month => TimeRange::Quarter,
            TimeRange::Quarter => TimeRange::Year,
            TimeRange::Year => TimeRange::Week,
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "week" | "7d" => Ok(TimeRange::Week),
            "month" | "30d" => Ok(TimeRange::Month),
            "quarter" | "90d" => Ok(TimeRange::Quarter),
            "year" | "365d" => Ok(TimeRange::Year),
            other => Err(Error::Config(format!(
                "unknown range {:?} (expected week, month, quarter or year)",
                other
            ))),
        }
    }
}

/// Everything computed for one [`TimeRange`].
#[derive(Debug, Clone, Serialize)]
pub struct ListeningReport {
    pub range: TimeRange,
    pub generated_at: DateTime<Utc>,
    /// The range's window, ending at `generated_at`
    pub window: TimeWindow,
    /// Plays inside `window`
    pub total_plays: u32,
    pub ratio: MusicRatio,
    pub fingerprint: Fingerprint,
    /// Hour-of-day distribution of the plays inside `window`
    pub hourly: HourlyDistribution,
    /// Whole weeks between the shown week and the one containing `generated_at`
    pub week_offset: u32,
    /// The calendar week `week_offset` weeks back against the week before it
    pub weekly: WeeklyComparison,
    pub top_artists: Vec<RankedEntity>,
    pub top_albums: Vec<RankedEntity>,
    pub top_tracks: Vec<RankedEntity>,
}

impl<Tz: TimeZone> AnalyticsEngine<Tz> {
    /// Build the full report for `range` ending at `now`, with the weekly
    /// comparison for the calendar week `week_offset` weeks back.
    pub fn report(
        &self,
        events: &[PlayEvent],
        range: TimeRange,
        now: DateTime<Utc>,
        top_count: usize,
        week_offset: u32,
    ) -> ListeningReport {
        let window = TimeWindow::trailing_days(now, range.days());
        let current = slice(events, &window);

        let week = self.calendar_week(now, week_offset);

        let report = ListeningReport {
            range,
            generated_at: now,
            window,
            total_plays: current.len() as u32,
            ratio: self.music_ratio(events, range.days(), now),
            fingerprint: self.fingerprint(events, now),
            hourly: self.hourly_distribution(&current),
            week_offset,
            weekly: self.weekly_comparison(events, week),
            top_artists: self.top_entities(&current, EntityKey::Artist, top_count),
            top_albums: self.top_entities(&current, EntityKey::Album, top_count),
            top_tracks: self.top_entities(&current, EntityKey::Track, top_count),
        };

        tracing::info!(
            range = %range,
            week_offset,
            events = events.len(),
            plays = report.total_plays,
            "Generated listening report"
        );

        report
    }
}

/// Reports memoized per range.
///
/// Entries never expire on their own; call [`ReportCache::invalidate`] after
/// fetching new history.
#[derive(Debug, Default)]
pub struct ReportCache {
    reports: HashMap<TimeRange, ListeningReport>,
}

impl ReportCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, range: TimeRange) -> Option<&ListeningReport> {
        self.reports.get(&range)
    }

    pub fn insert(&mut self, report: ListeningReport) {
        self.reports.insert(report.range, report);
    }

    /// The cached report for `range`, computing and storing it on a miss.
    pub fn get_or_compute<F>(&mut self, range: TimeRange, compute: F) -> &ListeningReport
    where
        F: FnOnce() -> ListeningReport,
    {
        self.reports.entry(range).or_insert_with(|| {
            tracing::debug!(range = %range, "Report cache miss");
            compute()
        })
    }

    /// Drop every cached report.
    pub fn invalidate(&mut self) {
        self.reports.clear();
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }
}
