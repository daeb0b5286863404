use chrono::{ DateTime, Utc };
use std::cell::Cell;
use std::fmt;
use std::str::FromStr;
use std::time::{ SystemTime, UNIX_EPOCH };
use thiserror::Error;

const MINUTE: f64 = 60.0;
const HOUR: f64 = MINUTE * 60.0;
const DAY: f64 = HOUR * 24.0;
const WEEK: f64 = DAY * 7.0;
const MONTH: f64 = DAY * 30.0;
const YEAR: f64 = MONTH * 12.0;

/// Furthest instant from the epoch a browser `Date` can hold (±100 000 000 days)
const MAX_MILLIS: f64 = 8.64e15;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TimestampError {
    #[error("unrecognized timestamp '{0}' (expected RFC 3339 or epoch milliseconds)")]
    Unrecognized(String),
}

/// An instant as epoch milliseconds.
///
/// The value may be NaN ("Invalid Date"). Such a timestamp is never rejected;
/// it simply flows through arithmetic and ends up in the last formatter bucket.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Timestamp(f64);

impl Timestamp {
    pub const INVALID: Timestamp = Timestamp(f64::NAN);

    /// Values that are not finite or lie outside the `Date` range become
    /// [`Timestamp::INVALID`].
    pub fn from_millis(millis: f64) -> Self {
        if millis.is_finite() && millis.abs() <= MAX_MILLIS { Self(millis) } else { Self::INVALID }
    }

    pub fn from_secs(secs: i64) -> Self {
        Self::from_millis((secs as f64) * 1000.0)
    }

    pub fn as_millis(self) -> f64 {
        self.0
    }

    pub fn is_valid(self) -> bool {
        self.0.is_finite()
    }

    /// Parses like a browser `Date` would: garbage yields [`Timestamp::INVALID`].
    pub fn parse_lenient(input: &str) -> Self {
        input.parse().unwrap_or(Self::INVALID)
    }

    pub fn add_secs(self, secs: f64) -> Self {
        Self::from_millis(self.0 + secs * 1000.0)
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Self::from_millis(value.timestamp_millis() as f64)
    }
}

impl From<SystemTime> for Timestamp {
    fn from(value: SystemTime) -> Self {
        match value.duration_since(UNIX_EPOCH) {
            Ok(since) => Self::from_millis(since.as_secs_f64() * 1000.0),
            Err(before) => Self::from_millis(-before.duration().as_secs_f64() * 1000.0),
        }
    }
}

impl From<i64> for Timestamp {
    fn from(millis: i64) -> Self {
        Self::from_millis(millis as f64)
    }
}

impl FromStr for Timestamp {
    type Err = TimestampError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(millis) = trimmed.parse::<i64>() {
            return Ok(millis.into());
        }
        DateTime::parse_from_rfc3339(trimmed)
            .map(|parsed| parsed.with_timezone(&Utc).into())
            .map_err(|_| TimestampError::Unrecognized(s.to_string()))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parsed = if self.is_valid() {
            DateTime::<Utc>::from_timestamp_millis(self.0 as i64)
        } else {
            None
        };
        match parsed {
            Some(datetime) => write!(f, "{}", datetime.to_rfc3339()),
            None => f.write_str("Invalid Date"),
        }
    }
}

/// Source of "now". Injected so formatting can be pinned in tests.
pub trait Clock {
    fn now(&self) -> Timestamp;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now().into()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct FixedClock {
    now: Cell<Timestamp>,
}

impl FixedClock {
    pub fn new(now: impl Into<Timestamp>) -> Self {
        Self { now: Cell::new(now.into()) }
    }

    pub fn set(&self, now: impl Into<Timestamp>) {
        self.now.set(now.into());
    }

    pub fn advance_secs(&self, secs: f64) {
        self.now.set(self.now.get().add_secs(secs));
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.now.get()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

/// Rounds to the nearest integer with ties going up, the way `Math.round` does
/// (`-0.5` becomes `-0`, not `-1`).
pub(crate) fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Whole seconds from `timestamp` to `now`. Negative for future timestamps.
pub fn elapsed_seconds(timestamp: Timestamp, now: Timestamp) -> f64 {
    round_half_up((now.as_millis() - timestamp.as_millis()) / 1000.0)
}

/// Formats relative dates against the clock it owns.
#[derive(Debug, Default)]
pub struct RelativeTimeFormatter<C: Clock = SystemClock> {
    clock: C,
}

impl RelativeTimeFormatter<SystemClock> {
    pub fn new() -> Self {
        Self { clock: SystemClock }
    }
}

impl<C: Clock> RelativeTimeFormatter<C> {
    pub fn with_clock(clock: C) -> Self {
        Self { clock }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Reads the clock once per call; nothing is cached between calls.
    pub fn format(&self, timestamp: impl Into<Timestamp>) -> String {
        format_relative_time_at(timestamp.into(), self.clock.now())
    }
}

/// Formats a timestamp relative to the system clock.
/// Examples: "just now", "2 minutes ago", "1 hour ago", "yesterday"
pub fn format_relative_time(timestamp: impl Into<Timestamp>) -> String {
    RelativeTimeFormatter::new().format(timestamp)
}

pub fn format_relative_time_at(timestamp: Timestamp, now: Timestamp) -> String {
    describe_elapsed(elapsed_seconds(timestamp, now))
}

/// Maps elapsed seconds onto the first matching bucket.
///
/// Units are calendar-naive (30-day months, 360-day years) and counts are not
/// singularized, so exactly one week reads "1 weeks ago". NaN matches no
/// threshold and lands in the years bucket.
pub fn describe_elapsed(diff: f64) -> String {
    if diff < 0.0 {
        "coming soon".to_string()
    } else if diff < 30.0 {
        "just now".to_string()
    } else if diff < MINUTE {
        format!("{} seconds ago", diff)
    } else if diff < 2.0 * MINUTE {
        "a minute ago".to_string()
    } else if diff < HOUR {
        format!("{} minutes ago", (diff / MINUTE).floor())
    } else if (diff / HOUR).floor() == 1.0 {
        "1 hour ago".to_string()
    } else if diff < DAY {
        format!("{} hours ago", (diff / HOUR).floor())
    } else if diff < DAY * 2.0 {
        "yesterday".to_string()
    } else if diff < WEEK {
        format!("{} days ago", (diff / DAY).floor())
    } else if diff < MONTH {
        format!("{} weeks ago", (diff / WEEK).floor())
    } else if diff < YEAR {
        format!("{} months ago", (diff / MONTH).floor())
    } else {
        format!("{} years ago", (diff / YEAR).floor())
    }
}
