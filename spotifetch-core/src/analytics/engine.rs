//! Listening analytics over an event list.
//!
//! Calendar days and hours are taken in the engine's timezone; everything
//! that depends on the current time takes `now` explicitly.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, TimeZone, Timelike, Utc};
use serde::Serialize;

use super::{change_pct, clamp_percent, percent, HourlyDistribution};
use crate::types::{EntityKey, PlayEvent, TimeWindow};

/// Trailing window the fingerprint looks at.
pub const FINGERPRINT_DAYS: u32 = 30;

/// Number of busiest days summed for `concentration`.
const CONCENTRATION_DAYS: usize = 5;

/// Events whose `played_at` falls in `window`, in their original order.
pub fn slice(events: &[PlayEvent], window: &TimeWindow) -> Vec<PlayEvent> {
    events
        .iter()
        .filter(|e| window.contains(e.played_at))
        .cloned()
        .collect()
}

/// Number of distinct known identifiers for `key`.
///
/// Events without that identifier are skipped, never counted as one shared
/// "unknown" entity.
pub fn count_unique(events: &[PlayEvent], key: EntityKey) -> u32 {
    events
        .iter()
        .filter_map(|e| key.id_of(e))
        .collect::<HashSet<_>>()
        .len() as u32
}

/// Unique tracks/albums/artists for a period and the one before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MusicRatio {
    pub current_tracks: u32,
    pub current_albums: u32,
    pub current_artists: u32,
    pub previous_tracks: u32,
    pub previous_albums: u32,
    pub previous_artists: u32,
}

impl MusicRatio {
    pub fn tracks_change_pct(&self) -> i64 {
        change_pct(self.current_tracks, self.previous_tracks)
    }

    pub fn albums_change_pct(&self) -> i64 {
        change_pct(self.current_albums, self.previous_albums)
    }

    pub fn artists_change_pct(&self) -> i64 {
        change_pct(self.current_artists, self.previous_artists)
    }
}

/// Five-metric summary of listening regularity and diversity, each 0-100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Fingerprint {
    /// Share of the last 30 days with at least one play
    pub consistency: u8,
    /// Unique tracks per play
    pub discovery_rate: u8,
    /// Spread of per-day play counts relative to their mean
    pub variance: u8,
    /// Share of plays on the five busiest days
    pub concentration: u8,
    /// Plays per unique track, times ten
    pub replay_rate: u8,
}

impl Fingerprint {
    /// Metric names and values in display order.
    pub fn metrics(&self) -> [(&'static str, u8); 5] {
        [
            ("Consistency", self.consistency),
            ("Discovery Rate", self.discovery_rate),
            ("Variance", self.variance),
            ("Concentration", self.concentration),
            ("Replay Rate", self.replay_rate),
        ]
    }
}

/// One week's daily plays against the week before.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeeklyComparison {
    /// The week being shown
    pub week: TimeWindow,
    /// Plays per day, Monday first
    pub daily: [u32; 7],
    /// Plays in `week`
    pub total: u32,
    /// Plays in the seven days before `week`
    pub previous_total: u32,
}

impl WeeklyComparison {
    pub fn change_pct(&self) -> i64 {
        change_pct(self.total, self.previous_total)
    }
}

/// A track, album or artist with its play count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedEntity {
    pub id: String,
    /// Display name, falling back to the id
    pub name: String,
    pub plays: u32,
}

/// Computes derived listening statistics in a fixed timezone.
#[derive(Debug, Clone)]
pub struct AnalyticsEngine<Tz: TimeZone = Local> {
    tz: Tz,
}

impl AnalyticsEngine<Local> {
    /// Engine using the system's local timezone.
    pub fn local() -> Self {
        Self { tz: Local }
    }
}

impl<Tz: TimeZone> AnalyticsEngine<Tz> {
    pub fn with_timezone(tz: Tz) -> Self {
        Self { tz }
    }

    pub fn timezone(&self) -> &Tz {
        &self.tz
    }

    fn local_date(&self, ts: DateTime<Utc>) -> NaiveDate {
        ts.with_timezone(&self.tz).date_naive()
    }

    fn local_hour(&self, ts: DateTime<Utc>) -> usize {
        ts.with_timezone(&self.tz).hour() as usize
    }

    /// Unique counts for `[now - L, now)` and the `L` days before it.
    pub fn music_ratio(
        &self,
        events: &[PlayEvent],
        window_days: u32,
        now: DateTime<Utc>,
    ) -> MusicRatio {
        let current_window = TimeWindow::trailing_days(now, window_days);
        let current = slice(events, &current_window);
        let previous = slice(events, &current_window.preceding());

        MusicRatio {
            current_tracks: count_unique(&current, EntityKey::Track),
            current_albums: count_unique(&current, EntityKey::Album),
            current_artists: count_unique(&current, EntityKey::Artist),
            previous_tracks: count_unique(&previous, EntityKey::Track),
            previous_albums: count_unique(&previous, EntityKey::Album),
            previous_artists: count_unique(&previous, EntityKey::Artist),
        }
    }

    /// Fingerprint of the 30 days before `now`, bucketed by local calendar day.
    pub fn fingerprint(&self, events: &[PlayEvent], now: DateTime<Utc>) -> Fingerprint {
        let recent = slice(events, &TimeWindow::trailing_days(now, FINGERPRINT_DAYS));

        let mut per_day: BTreeMap<NaiveDate, u32> = BTreeMap::new();
        for event in &recent {
            *per_day.entry(self.local_date(event.played_at)).or_insert(0) += 1;
        }

        let total_plays = recent.len() as f64;
        let unique_tracks = f64::from(count_unique(&recent, EntityKey::Track));
        let active_days = per_day.len();

        let consistency = percent(active_days as f64, f64::from(FINGERPRINT_DAYS));
        let discovery_rate = percent(unique_tracks, total_plays);

        // Only days with plays take part in the spread.
        let variance = if active_days == 0 {
            0
        } else {
            let mean = total_plays / active_days as f64;
            if mean <= 0.0 {
                0
            } else {
                let squared: f64 = per_day
                    .values()
                    .map(|&c| (f64::from(c) - mean).powi(2))
                    .sum();
                let stddev = (squared / active_days as f64).sqrt();
                clamp_percent(stddev / mean * 100.0)
            }
        };

        let mut day_counts: Vec<u32> = per_day.values().copied().collect();
        day_counts.sort_unstable_by(|a, b| b.cmp(a));
        let busiest: u32 = day_counts.iter().take(CONCENTRATION_DAYS).sum();
        let concentration = percent(f64::from(busiest), total_plays);

        let replay_rate = if unique_tracks > 0.0 {
            clamp_percent(total_plays / unique_tracks * 10.0)
        } else {
            0
        };

        Fingerprint {
            consistency,
            discovery_rate,
            variance,
            concentration,
            replay_rate,
        }
    }

    /// Plays per local hour of day.
    pub fn hourly_distribution(&self, events: &[PlayEvent]) -> HourlyDistribution {
        let mut distribution = HourlyDistribution::default();
        for event in events {
            distribution.increment(self.local_hour(event.played_at));
        }
        distribution
    }

    /// The local calendar week `weeks_back` weeks before the one containing
    /// `now` (0 = the current week).
    pub fn calendar_week(&self, now: DateTime<Utc>, weeks_back: u32) -> TimeWindow {
        let date = self.local_date(now) - Duration::days(7 * i64::from(weeks_back));
        TimeWindow::week_starting(date, &self.tz).unwrap_or_else(|e| {
            tracing::warn!(error = %e, weeks_back, "Local week unavailable, using trailing 7 days");
            TimeWindow::trailing_days(now, 7).shift_days(-7 * i64::from(weeks_back))
        })
    }

    /// The seven local days ending where `week` starts. Stepping back on the
    /// wall clock keeps Monday midnight aligned across DST changes.
    fn week_before(&self, week: &TimeWindow) -> TimeWindow {
        let start = week.from().with_timezone(&self.tz).naive_local() - Duration::days(7);
        self.tz
            .from_local_datetime(&start)
            .earliest()
            .and_then(|from| TimeWindow::new(from.with_timezone(&Utc), week.from()).ok())
            .unwrap_or_else(|| week.preceding())
    }

    /// Daily plays in `week` (Monday first) plus totals for `week` and the
    /// seven days before it.
    pub fn weekly_comparison(&self, events: &[PlayEvent], week: TimeWindow) -> WeeklyComparison {
        let this_week = slice(events, &week);
        let previous_week = self.week_before(&week);

        let mut daily = [0u32; 7];
        for event in &this_week {
            let day = event
                .played_at
                .with_timezone(&self.tz)
                .weekday()
                .num_days_from_monday() as usize;
            daily[day] += 1;
        }

        WeeklyComparison {
            week,
            daily,
            total: this_week.len() as u32,
            previous_total: events
                .iter()
                .filter(|e| previous_week.contains(e.played_at))
                .count() as u32,
        }
    }

    /// The `n` most played entities for `key`.
    ///
    /// Ties go to the most recently played entity, then to the smaller id.
    pub fn top_entities(&self, events: &[PlayEvent], key: EntityKey, n: usize) -> Vec<RankedEntity> {
        struct Tally<'a> {
            plays: u32,
            last_played: DateTime<Utc>,
            name: Option<&'a str>,
        }

        let mut tallies: HashMap<&str, Tally> = HashMap::new();
        for event in events {
            let Some(id) = key.id_of(event) else {
                continue;
            };
            let tally = tallies.entry(id).or_insert(Tally {
                plays: 0,
                last_played: event.played_at,
                name: None,
            });
            tally.plays += 1;
            // Latest known name wins
            let name = key.name_of(event);
            if event.played_at >= tally.last_played {
                tally.last_played = event.played_at;
                tally.name = name.or(tally.name);
            } else if tally.name.is_none() {
                tally.name = name;
            }
        }

        let mut ranked: Vec<(&str, Tally)> = tallies.into_iter().collect();
        ranked.sort_by(|(a_id, a), (b_id, b)| {
            b.plays
                .cmp(&a.plays)
                .then(b.last_played.cmp(&a.last_played))
                .then(a_id.cmp(b_id))
        });

        ranked
            .into_iter()
            .take(n)
            .map(|(id, tally)| RankedEntity {
                id: id.to_string(),
                name: tally.name.unwrap_or(id).to_string(),
                plays: tally.plays,
            })
            .collect()
    }
}
