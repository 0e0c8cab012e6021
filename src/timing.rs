//! Reconciles the timing fields a backend reports for a run into one
//! consistent `(duration, start, end)` triple.
//!
//! A finished run's fields are authoritative. A run that is still active
//! reports a stale or absent end time, so its duration is recomputed from
//! the start time against the current clock on every call.

use crate::status::ResolvedStatus;
use chrono::{DateTime, TimeDelta, Utc};
use std::sync::Arc;

const BACKEND_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f%z";

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Raw timing fields as reported by the backend.
#[derive(Debug, Clone, Copy)]
pub struct TimingInput<'a> {
    pub result: &'a str,
    pub duration_in_millis: Option<i64>,
    pub start_time: Option<&'a str>,
    pub end_time: Option<&'a str>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolvedTimes {
    pub duration_in_millis: Option<i64>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

pub trait TimeHarmonizer: Send + Sync {
    fn harmonize(&self, input: &TimingInput<'_>, now: DateTime<Utc>) -> ResolvedTimes;
}

/// Default policy. `skew_millis` is how far the local clock runs ahead of
/// the server's, and is subtracted from `now` before computing live
/// durations.
#[derive(Debug, Clone, Copy, Default)]
pub struct SkewHarmonizer {
    pub skew_millis: i64,
}

impl SkewHarmonizer {
    pub fn new(skew_millis: i64) -> Self {
        Self { skew_millis }
    }
}

impl TimeHarmonizer for SkewHarmonizer {
    fn harmonize(&self, input: &TimingInput<'_>, now: DateTime<Utc>) -> ResolvedTimes {
        let start = input.start_time.and_then(parse_timestamp);
        let end = input.end_time.and_then(parse_timestamp);
        let raw_duration = input.duration_in_millis.filter(|d| *d >= 0);

        if input.is_active {
            return match start {
                Some(start) => {
                    let server_now = TimeDelta::try_milliseconds(self.skew_millis)
                        .and_then(|skew| now.checked_sub_signed(skew))
                        .unwrap_or(now);
                    let elapsed = (server_now - start).num_milliseconds().max(0);
                    ResolvedTimes {
                        duration_in_millis: Some(elapsed),
                        start_time: Some(start),
                        end_time: None,
                    }
                }
                None => ResolvedTimes {
                    duration_in_millis: raw_duration,
                    start_time: None,
                    end_time: None,
                },
            };
        }

        match (start, end) {
            (Some(start), Some(end)) if end >= start => ResolvedTimes {
                duration_in_millis: Some((end - start).num_milliseconds()),
                start_time: Some(start),
                end_time: Some(end),
            },
            (Some(start), _) => ResolvedTimes {
                duration_in_millis: raw_duration,
                start_time: Some(start),
                end_time: raw_duration
                    .and_then(TimeDelta::try_milliseconds)
                    .and_then(|d| start.checked_add_signed(d)),
            },
            (None, end) => ResolvedTimes {
                duration_in_millis: raw_duration,
                start_time: None,
                end_time: end,
            },
        }
    }
}

/// Accepts RFC 3339 as well as the `2016-05-24T08:57:04.432+0000` form.
/// Anything else is treated as absent.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, BACKEND_TIMESTAMP_FORMAT))
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

#[derive(Clone)]
pub struct TimeResolver {
    harmonizer: Arc<dyn TimeHarmonizer>,
    clock: Arc<dyn Clock>,
}

impl Default for TimeResolver {
    fn default() -> Self {
        Self::new(Arc::new(SkewHarmonizer::default()), Arc::new(SystemClock))
    }
}

impl TimeResolver {
    pub fn new(harmonizer: Arc<dyn TimeHarmonizer>, clock: Arc<dyn Clock>) -> Self {
        Self { harmonizer, clock }
    }

    pub fn resolve(
        &self,
        status: &ResolvedStatus,
        duration_in_millis: Option<i64>,
        start_time: Option<&str>,
        end_time: Option<&str>,
    ) -> ResolvedTimes {
        let input = TimingInput {
            result: status.canonical.as_str(),
            duration_in_millis,
            start_time,
            end_time,
            is_active: status.is_active,
        };
        self.harmonizer.harmonize(&input, self.clock.now())
    }
}
