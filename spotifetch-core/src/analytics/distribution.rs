//! Hour-of-day play distribution.

use serde::Serialize;

/// Number of hourly buckets.
pub const HOURS: usize = 24;

/// Plays per local hour of day, index 0 = midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct HourlyDistribution([u32; HOURS]);

impl HourlyDistribution {
    /// Build from arbitrary counts: short input is zero-padded, entries past
    /// the 24th are ignored.
    pub fn from_counts(counts: &[u32]) -> Self {
        let mut buckets = [0u32; HOURS];
        for (bucket, &count) in buckets.iter_mut().zip(counts) {
            *bucket = count;
        }
        Self(buckets)
    }

    pub(crate) fn increment(&mut self, hour: usize) {
        if let Some(bucket) = self.0.get_mut(hour) {
            *bucket += 1;
        }
    }

    pub fn buckets(&self) -> &[u32; HOURS] {
        &self.0
    }

    pub fn get(&self, hour: usize) -> u32 {
        self.0.get(hour).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u32 {
        self.0.iter().sum()
    }

    pub fn max(&self) -> u32 {
        self.0.iter().copied().max().unwrap_or(0)
    }

    /// First hour with the highest count, or `None` when there are no plays.
    pub fn peak_hour(&self) -> Option<u8> {
        let max = self.max();
        if max == 0 {
            return None;
        }
        self.0.iter().position(|&c| c == max).map(|h| h as u8)
    }
}
