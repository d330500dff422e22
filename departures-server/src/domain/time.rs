//! Service-day time handling.
//!
//! Schedules express stop times as "HH:MM:SS" strings relative to the start
//! of a service day. Trips that run past midnight keep counting hours, so
//! "25:30:00" is half past one the following morning. This module keeps those
//! values as integer seconds and only formats them at the edges.

use chrono::{DateTime, Days, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use std::fmt;

const SECS_PER_MINUTE: u32 = 60;
const SECS_PER_HOUR: u32 = 60 * SECS_PER_MINUTE;
const HOURS_PER_DAY: u32 = 24;

/// Output format for absolute timestamps: second precision, UTC suffix.
const UTC_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Error returned when parsing an invalid time string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// A scheduled time of day within a service day.
///
/// Hours are unbounded: a trip leaving before midnight and arriving after it
/// uses hour values of 24 and above to stay on the same service day.
///
/// # Examples
///
/// ```
/// use departures_server::domain::ServiceTime;
///
/// let late = ServiceTime::parse("25:30:00").unwrap();
/// assert_eq!(late.hours(), 25);
/// assert_eq!(late.to_string(), "25:30:00");
/// assert!(late > ServiceTime::parse("08:00:00").unwrap());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ServiceTime(u32);

impl ServiceTime {
    /// Create from seconds since the start of the service day.
    pub fn from_secs(secs: u32) -> Self {
        Self(secs)
    }

    /// Create from a wall-clock time of day (always below 24:00:00).
    pub fn from_time_of_day(time: NaiveTime) -> Self {
        Self(time.num_seconds_from_midnight())
    }

    /// Parse a time from "HH:MM:SS" format.
    ///
    /// The hour field takes one or more digits and is not capped at 23.
    /// Minutes and seconds must be exactly two digits each, below 60.
    ///
    /// # Examples
    ///
    /// ```
    /// use departures_server::domain::ServiceTime;
    ///
    /// assert!(ServiceTime::parse("00:00:00").is_ok());
    /// assert!(ServiceTime::parse("8:05:00").is_ok());
    /// assert!(ServiceTime::parse("27:59:59").is_ok());
    ///
    /// assert!(ServiceTime::parse("08:30").is_err());
    /// assert!(ServiceTime::parse("08:60:00").is_err());
    /// assert!(ServiceTime::parse("ab:cd:ef").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self, TimeError> {
        let mut parts = s.trim().split(':');
        let (Some(h), Some(m), Some(sec), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(TimeError::new("expected HH:MM:SS format"));
        };

        if h.is_empty() || !h.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TimeError::new("invalid hour digits"));
        }
        let hours: u32 = h
            .parse()
            .map_err(|_| TimeError::new("hour out of range"))?;

        let minutes =
            parse_two_digits(m).ok_or_else(|| TimeError::new("invalid minute digits"))?;
        if minutes > 59 {
            return Err(TimeError::new("minute must be 0-59"));
        }

        let seconds =
            parse_two_digits(sec).ok_or_else(|| TimeError::new("invalid second digits"))?;
        if seconds > 59 {
            return Err(TimeError::new("second must be 0-59"));
        }

        hours
            .checked_mul(SECS_PER_HOUR)
            .and_then(|h| h.checked_add(minutes * SECS_PER_MINUTE + seconds))
            .map(Self)
            .ok_or_else(|| TimeError::new("hour out of range"))
    }

    /// Seconds since the start of the service day.
    pub fn as_secs(&self) -> u32 {
        self.0
    }

    /// Hours since the start of the service day (may exceed 23).
    pub fn hours(&self) -> u32 {
        self.0 / SECS_PER_HOUR
    }

    /// Minute within the hour (0-59).
    pub fn minutes(&self) -> u32 {
        (self.0 % SECS_PER_HOUR) / SECS_PER_MINUTE
    }

    /// Second within the minute (0-59).
    pub fn seconds(&self) -> u32 {
        self.0 % SECS_PER_MINUTE
    }

    /// Anchor this time to a service date.
    ///
    /// Hours of 24 and above roll over into the following calendar days.
    ///
    /// # Examples
    ///
    /// ```
    /// use departures_server::domain::ServiceTime;
    /// use chrono::NaiveDate;
    ///
    /// let date = NaiveDate::from_ymd_opt(2025, 4, 2).unwrap();
    /// let time = ServiceTime::parse("25:30:00").unwrap();
    /// let at = time.on_service_day(date).unwrap();
    /// assert_eq!(at.to_string(), "2025-04-03 01:30:00");
    /// ```
    pub fn on_service_day(&self, date: NaiveDate) -> Option<NaiveDateTime> {
        let day_offset = self.hours() / HOURS_PER_DAY;
        let time = NaiveTime::from_hms_opt(
            self.hours() % HOURS_PER_DAY,
            self.minutes(),
            self.seconds(),
        )?;
        date.checked_add_days(Days::new(u64::from(day_offset)))
            .map(|d| d.and_time(time))
    }
}

impl fmt::Debug for ServiceTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ServiceTime({self})")
    }
}

impl fmt::Display for ServiceTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}",
            self.hours(),
            self.minutes(),
            self.seconds()
        )
    }
}

/// Format an absolute timestamp as `YYYY-MM-DDTHH:MM:SSZ`.
pub fn format_utc(at: &NaiveDateTime) -> String {
    at.format(UTC_FORMAT).to_string()
}

/// Parse a request start instant from an ISO 8601 string.
///
/// Accepts RFC 3339 with `Z` or a numeric offset, naive date-times with a
/// `T` or space separator (seconds and fractions optional), and a bare date
/// meaning midnight. The wall-clock time is kept as written; offsets are not
/// applied. Sub-second precision is dropped.
///
/// # Examples
///
/// ```
/// use departures_server::domain::parse_start_time;
///
/// let t = parse_start_time("2025-04-02T08:30:00Z").unwrap();
/// assert_eq!(t.to_string(), "2025-04-02 08:30:00");
///
/// let t = parse_start_time("2025-04-02").unwrap();
/// assert_eq!(t.to_string(), "2025-04-02 00:00:00");
///
/// assert!(parse_start_time("yesterday").is_err());
/// ```
pub fn parse_start_time(s: &str) -> Result<NaiveDateTime, TimeError> {
    let s = s.trim();

    let parsed = DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.naive_local())
        .ok()
        .or_else(|| {
            [
                "%Y-%m-%dT%H:%M:%S%.f",
                "%Y-%m-%d %H:%M:%S%.f",
                "%Y-%m-%dT%H:%M",
                "%Y-%m-%d %H:%M",
            ]
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        })
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
        .ok_or_else(|| TimeError::new("expected ISO 8601 date-time"))?;

    parsed
        .with_nanosecond(0)
        .ok_or_else(|| TimeError::new("invalid sub-second component"))
}

/// Parse exactly two ASCII digits into a u32.
fn parse_two_digits(s: &str) -> Option<u32> {
    let bytes = s.as_bytes();
    if bytes.len() != 2 {
        return None;
    }
    let d1 = (bytes[0] as char).to_digit(10)?;
    let d2 = (bytes[1] as char).to_digit(10)?;
    Some(d1 * 10 + d2)
}
