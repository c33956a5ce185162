//! Wall Time - minutes since local midnight on a 24-hour ring
//!
//! All arithmetic wraps modulo 1440. Also owns the compact 12-hour time
//! string format used by every outbound scheduling intent ("3:45p").

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minutes in one day
pub const MINUTES_PER_DAY: i64 = 1440;

/// AM/PM indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Meridiem {
    AM,
    PM,
}

impl Meridiem {
    /// Single-letter suffix used by the compact format
    pub fn suffix(self) -> char {
        match self {
            Meridiem::AM => 'a',
            Meridiem::PM => 'p',
        }
    }
}

/// Minutes since local midnight, always in [0, 1440)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub struct WallTime(u16);

impl WallTime {
    /// Midnight (12:00a)
    pub const MIDNIGHT: WallTime = WallTime(0);

    /// Noon (12:00p)
    pub const NOON: WallTime = WallTime(720);

    /// Build from any minute count, wrapping onto the ring
    pub fn wrapping(minutes: i64) -> Self {
        WallTime(minutes.rem_euclid(MINUTES_PER_DAY) as u16)
    }

    /// Build from a 24-hour clock reading; out-of-range parts wrap
    pub fn from_hm(hour: u32, minute: u32) -> Self {
        Self::wrapping(i64::from(hour) * 60 + i64::from(minute))
    }

    /// Minutes since midnight
    pub fn minutes(self) -> i64 {
        i64::from(self.0)
    }

    /// Hour in 24-hour format (0-23)
    pub fn hour24(self) -> u32 {
        u32::from(self.0) / 60
    }

    /// Hour in 12-hour format (1-12)
    pub fn hour12(self) -> u32 {
        match self.hour24() {
            0 => 12,
            h @ 1..=12 => h,
            h => h - 12,
        }
    }

    /// Minute within the hour (0-59)
    pub fn minute(self) -> u32 {
        u32::from(self.0) % 60
    }

    pub fn meridiem(self) -> Meridiem {
        if self.hour24() < 12 {
            Meridiem::AM
        } else {
            Meridiem::PM
        }
    }

    /// Shift by a signed number of minutes, wrapping past midnight
    pub fn add_minutes(self, delta: i64) -> Self {
        Self::wrapping(self.minutes() + delta.rem_euclid(MINUTES_PER_DAY))
    }
}

impl From<NaiveTime> for WallTime {
    fn from(time: NaiveTime) -> Self {
        WallTime::from_hm(time.hour(), time.minute())
    }
}

impl From<i64> for WallTime {
    fn from(minutes: i64) -> Self {
        WallTime::wrapping(minutes)
    }
}

impl From<WallTime> for i64 {
    fn from(time: WallTime) -> Self {
        time.minutes()
    }
}

impl std::fmt::Display for WallTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{:02}{}", self.hour12(), self.minute(), self.meridiem().suffix())
    }
}

/// Shortest signed distance from `from` to `to` around the ring, in (-720, 720]
pub fn minutes_difference(to: WallTime, from: WallTime) -> i64 {
    let half = MINUTES_PER_DAY / 2;
    let raw = (to.minutes() - from.minutes()).rem_euclid(MINUTES_PER_DAY);
    if raw > half {
        raw - MINUTES_PER_DAY
    } else {
        raw
    }
}

/// Format as the compact 12-hour form, e.g. "3:45p", "12:00a"
pub fn format_compact(time: WallTime) -> String {
    time.to_string()
}

/// Compact form with seconds for the live display, e.g. "3:45:07p"
pub fn format_compact_with_seconds(time: NaiveTime) -> String {
    let wall = WallTime::from(time);
    format!(
        "{}:{:02}:{:02}{}",
        wall.hour12(),
        wall.minute(),
        time.second(),
        wall.meridiem().suffix()
    )
}

/// Why a time string could not be parsed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeParseError {
    #[error("empty time string")]
    Empty,
    #[error("missing ':' separator in {0:?}")]
    MissingSeparator(String),
    #[error("invalid hour in {0:?}")]
    InvalidHour(String),
    #[error("invalid minute in {0:?}")]
    InvalidMinute(String),
    #[error("unrecognized suffix in {0:?}")]
    InvalidSuffix(String),
}

/// Parse a compact ("3:45p"), am/pm ("3:45 PM", "3:45pm") or 24-hour
/// ("15:45") time string
pub fn parse_time_string(input: &str) -> Result<WallTime, TimeParseError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(TimeParseError::Empty);
    }

    let lower = trimmed.to_ascii_lowercase();
    let digits_end = lower
        .find(|c: char| !(c.is_ascii_digit() || c == ':'))
        .unwrap_or(lower.len());
    let (clock, suffix) = lower.split_at(digits_end);

    let meridiem = match suffix.trim() {
        "" => None,
        "a" | "am" | "a.m." => Some(Meridiem::AM),
        "p" | "pm" | "p.m." => Some(Meridiem::PM),
        _ => return Err(TimeParseError::InvalidSuffix(input.to_string())),
    };

    let (hour_str, minute_str) = clock
        .split_once(':')
        .ok_or_else(|| TimeParseError::MissingSeparator(input.to_string()))?;

    let hour: u32 = hour_str
        .parse()
        .map_err(|_| TimeParseError::InvalidHour(input.to_string()))?;
    if minute_str.len() != 2 {
        return Err(TimeParseError::InvalidMinute(input.to_string()));
    }
    let minute: u32 = minute_str
        .parse()
        .map_err(|_| TimeParseError::InvalidMinute(input.to_string()))?;
    if minute > 59 {
        return Err(TimeParseError::InvalidMinute(input.to_string()));
    }

    let hour24 = match meridiem {
        None if hour <= 23 => hour,
        Some(_) if !(1..=12).contains(&hour) => {
            return Err(TimeParseError::InvalidHour(input.to_string()))
        }
        Some(Meridiem::AM) => hour % 12,
        Some(Meridiem::PM) => hour % 12 + 12,
        None => return Err(TimeParseError::InvalidHour(input.to_string())),
    };

    Ok(WallTime::from_hm(hour24, minute))
}

/// Normalize any accepted time string to the compact form.
///
/// Malformed input is returned unchanged.
pub fn to_compact_time_string(input: &str) -> String {
    match parse_time_string(input) {
        Ok(time) => format_compact(time),
        Err(e) => {
            tracing::warn!("keeping unparseable time string: {e}");
            input.to_string()
        }
    }
}

/// Convert any accepted time string to "HH:MM" 24-hour form.
///
/// Malformed input is returned unchanged.
pub fn to_24_hour_string(input: &str) -> String {
    match parse_time_string(input) {
        Ok(time) => format!("{:02}:{:02}", time.hour24(), time.minute()),
        Err(e) => {
            tracing::warn!("keeping unparseable time string: {e}");
            input.to_string()
        }
    }
}
