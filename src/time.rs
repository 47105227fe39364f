//! Local-time handling for sensor readings
//!
//! Readings are partitioned by Ecuador local time, a fixed UTC-5 offset with
//! no daylight-saving transitions, so a constant `FixedOffset` is exact.

use chrono::{DateTime, Datelike, FixedOffset, SecondsFormat, Timelike, Utc};

/// Offset of Ecuador local time from UTC, in seconds
pub const ECUADOR_OFFSET_SECONDS: i32 = -5 * 3600;

/// Offset of Ecuador local time from UTC, in minutes
pub const ECUADOR_OFFSET_MINUTES: i32 = ECUADOR_OFFSET_SECONDS / 60;

/// The fixed UTC-5 offset
pub fn ecuador_offset() -> FixedOffset {
    // -18000s is well inside the +/-86400s range FixedOffset accepts.
    FixedOffset::east_opt(ECUADOR_OFFSET_SECONDS).unwrap_or_else(|| unreachable!())
}

/// Source of the current instant
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at a given instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// One instant seen both in UTC and in local time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalTimestamp {
    utc: DateTime<Utc>,
    local: DateTime<FixedOffset>,
}

impl LocalTimestamp {
    pub fn from_utc(utc: DateTime<Utc>) -> Self {
        Self {
            utc,
            local: utc.with_timezone(&ecuador_offset()),
        }
    }

    pub fn now(clock: &dyn Clock) -> Self {
        Self::from_utc(clock.now())
    }

    pub fn utc(&self) -> DateTime<Utc> {
        self.utc
    }

    pub fn local(&self) -> DateTime<FixedOffset> {
        self.local
    }

    /// UTC ISO-8601 with milliseconds, e.g. `2024-03-05T19:07:33.000Z`
    pub fn utc_iso(&self) -> String {
        self.utc.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// Local ISO-8601 with explicit offset, e.g. `2024-03-05T14:07:33-05:00`
    pub fn local_iso(&self) -> String {
        self.local.to_rfc3339_opts(SecondsFormat::Secs, false)
    }

    /// Milliseconds since the Unix epoch
    pub fn unix_millis(&self) -> i64 {
        self.utc.timestamp_millis()
    }

    /// Path segments `[YYYY, MM, DD, HH, mm]`, zero-padded except the year
    pub fn partition_segments(&self) -> [String; 5] {
        let l = &self.local;
        [
            l.year().to_string(),
            format!("{:02}", l.month()),
            format!("{:02}", l.day()),
            format!("{:02}", l.hour()),
            format!("{:02}", l.minute()),
        ]
    }

    pub fn year(&self) -> i32 {
        self.local.year()
    }

    pub fn month(&self) -> u32 {
        self.local.month()
    }

    pub fn day(&self) -> u32 {
        self.local.day()
    }

    pub fn hour(&self) -> u32 {
        self.local.hour()
    }

    pub fn minute(&self) -> u32 {
        self.local.minute()
    }

    pub fn second(&self) -> u32 {
        self.local.second()
    }
}
