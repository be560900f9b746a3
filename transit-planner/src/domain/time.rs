//! Schedule time handling.
//!
//! Timetables give times as "HH:MM:SS" strings measured from the start of
//! the service day. Services running past midnight keep counting upwards
//! ("24:15:00", "25:02:00"), so a `TransitTime` is a plain number of seconds
//! after midnight rather than a wall-clock time of day.

use std::fmt;
use std::ops::Add;

use chrono::Duration;

/// Latest hour accepted by the parser (the second service day).
const MAX_HOUR: u32 = 47;

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

/// Seconds after midnight of the service day.
///
/// # Examples
///
/// ```
/// use transit_planner::domain::TransitTime;
///
/// let time = TransitTime::parse_hhmmss("08:05:30").unwrap();
/// assert_eq!(time.seconds(), 8 * 3600 + 5 * 60 + 30);
/// assert_eq!(time.to_string(), "08:05:30");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TransitTime(u32);

impl TransitTime {
    /// Midnight at the start of the service day.
    pub const MIDNIGHT: TransitTime = TransitTime(0);

    /// Create a time from seconds after midnight.
    pub const fn from_seconds(seconds: u32) -> Self {
        Self(seconds)
    }

    /// Create a time from hour, minute and second components.
    pub fn from_hms(hour: u32, minute: u32, second: u32) -> Result<Self, TimeError> {
        if hour > MAX_HOUR {
            return Err(TimeError::new("hour must be 0-47"));
        }
        if minute > 59 {
            return Err(TimeError::new("minute must be 0-59"));
        }
        if second > 59 {
            return Err(TimeError::new("second must be 0-59"));
        }
        Ok(Self(hour * 3600 + minute * 60 + second))
    }

    /// Parse a time from "HH:MM:SS" format.
    ///
    /// # Examples
    ///
    /// ```
    /// use transit_planner::domain::TransitTime;
    ///
    /// assert!(TransitTime::parse_hhmmss("00:00:00").is_ok());
    /// assert!(TransitTime::parse_hhmmss("25:10:00").is_ok());
    ///
    /// assert!(TransitTime::parse_hhmmss("8:00:00").is_err());
    /// assert!(TransitTime::parse_hhmmss("08:00").is_err());
    /// assert!(TransitTime::parse_hhmmss("08:61:00").is_err());
    /// ```
    pub fn parse_hhmmss(s: &str) -> Result<Self, TimeError> {
        // Must be exactly 8 characters: HH:MM:SS
        if s.len() != 8 {
            return Err(TimeError::new("expected HH:MM:SS format"));
        }

        let bytes = s.as_bytes();
        if bytes[2] != b':' || bytes[5] != b':' {
            return Err(TimeError::new("expected colons at positions 2 and 5"));
        }

        let hour =
            parse_two_digits(&bytes[0..2]).ok_or_else(|| TimeError::new("invalid hour digits"))?;
        let minute = parse_two_digits(&bytes[3..5])
            .ok_or_else(|| TimeError::new("invalid minute digits"))?;
        let second = parse_two_digits(&bytes[6..8])
            .ok_or_else(|| TimeError::new("invalid second digits"))?;

        Self::from_hms(hour, minute, second)
    }

    /// Returns the number of seconds after midnight.
    pub const fn seconds(&self) -> u32 {
        self.0
    }

    /// Returns the hour (0-47).
    pub fn hour(&self) -> u32 {
        self.0 / 3600
    }

    /// Returns the minute (0-59).
    pub fn minute(&self) -> u32 {
        (self.0 % 3600) / 60
    }

    /// Returns the second (0-59).
    pub fn second(&self) -> u32 {
        self.0 % 60
    }

    /// Add a duration, returning `None` on overflow or a negative result.
    pub fn checked_add(&self, duration: Duration) -> Option<Self> {
        let secs = i64::from(self.0).checked_add(duration.num_seconds())?;
        u32::try_from(secs).ok().map(Self)
    }

    /// Seconds elapsed since `earlier`, saturating at zero.
    pub fn seconds_since(&self, earlier: Self) -> u32 {
        self.0.saturating_sub(earlier.0)
    }

    /// Returns the duration between two times.
    ///
    /// Returns a negative duration if `other` is after `self`.
    pub fn signed_duration_since(&self, other: Self) -> Duration {
        Duration::seconds(i64::from(self.0) - i64::from(other.0))
    }
}

impl Add<Duration> for TransitTime {
    type Output = Self;

    /// Saturates at the representable bounds.
    fn add(self, rhs: Duration) -> Self::Output {
        self.checked_add(rhs).unwrap_or(if rhs < Duration::zero() {
            TransitTime::MIDNIGHT
        } else {
            TransitTime(u32::MAX)
        })
    }
}

impl fmt::Debug for TransitTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TransitTime({self})")
    }
}

impl fmt::Display for TransitTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}",
            self.hour(),
            self.minute(),
            self.second()
        )
    }
}

impl std::str::FromStr for TransitTime {
    type Err = TimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_hhmmss(s)
    }
}

/// Parse two ASCII digit bytes into a u32.
fn parse_two_digits(bytes: &[u8]) -> Option<u32> {
    if bytes.len() != 2 {
        return None;
    }
    let d1 = (bytes[0] as char).to_digit(10)?;
    let d2 = (bytes[1] as char).to_digit(10)?;
    Some(d1 * 10 + d2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_times() {
        assert_eq!(TransitTime::parse_hhmmss("00:00:00").unwrap().seconds(), 0);
        assert_eq!(
            TransitTime::parse_hhmmss("07:55:00").unwrap().seconds(),
            7 * 3600 + 55 * 60
        );
        assert_eq!(
            TransitTime::parse_hhmmss("23:59:59").unwrap().seconds(),
            86_399
        );
    }

    #[test]
    fn parse_past_midnight() {
        let t = TransitTime::parse_hhmmss("24:15:00").unwrap();
        assert_eq!(t.hour(), 24);
        assert_eq!(t.to_string(), "24:15:00");
        assert!(t > TransitTime::parse_hhmmss("23:59:59").unwrap());
    }

    #[test]
    fn reject_bad_format() {
        assert!(TransitTime::parse_hhmmss("").is_err());
        assert!(TransitTime::parse_hhmmss("08:00").is_err());
        assert!(TransitTime::parse_hhmmss("08-00-00").is_err());
        assert!(TransitTime::parse_hhmmss("0a:00:00").is_err());
        assert!(TransitTime::parse_hhmmss(" 8:00:00").is_err());
    }

    #[test]
    fn reject_out_of_range() {
        assert!(TransitTime::parse_hhmmss("48:00:00").is_err());
        assert!(TransitTime::parse_hhmmss("10:60:00").is_err());
        assert!(TransitTime::parse_hhmmss("10:00:60").is_err());
    }

    #[test]
    fn error_message() {
        let err = TransitTime::parse_hhmmss("10:60:00").unwrap_err();
        assert_eq!(err.to_string(), "invalid time: minute must be 0-59");
    }

    #[test]
    fn add_duration() {
        let t = TransitTime::parse_hhmmss("08:10:00").unwrap();
        assert_eq!((t + Duration::seconds(120)).to_string(), "08:12:00");
        assert_eq!(t + Duration::seconds(-100_000), TransitTime::MIDNIGHT);
    }

    #[test]
    fn elapsed_seconds() {
        let a = TransitTime::parse_hhmmss("07:55:00").unwrap();
        let b = TransitTime::parse_hhmmss("08:00:00").unwrap();
        assert_eq!(b.seconds_since(a), 300);
        assert_eq!(a.seconds_since(b), 0);
        assert_eq!(a.signed_duration_since(b), Duration::seconds(-300));
    }

    #[test]
    fn from_str_matches_parse() {
        let parsed: TransitTime = "17:40:00".parse().unwrap();
        assert_eq!(parsed, TransitTime::parse_hhmmss("17:40:00").unwrap());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    prop_compose! {
        fn valid_time()(hour in 0u32..48, minute in 0u32..60, second in 0u32..60) -> String {
            format!("{:02}:{:02}:{:02}", hour, minute, second)
        }
    }

    proptest! {
        /// Any valid HH:MM:SS string parses successfully
        #[test]
        fn valid_hhmmss_parses(time_str in valid_time()) {
            prop_assert!(TransitTime::parse_hhmmss(&time_str).is_ok());
        }

        /// Parse then display roundtrips
        #[test]
        fn parse_display_roundtrip(time_str in valid_time()) {
            let parsed = TransitTime::parse_hhmmss(&time_str).unwrap();
            prop_assert_eq!(parsed.to_string(), time_str);
        }

        /// Ordering follows the number of seconds
        #[test]
        fn ordering_matches_seconds(a in 0u32..172_800, b in 0u32..172_800) {
            let (ta, tb) = (TransitTime::from_seconds(a), TransitTime::from_seconds(b));
            prop_assert_eq!(ta.cmp(&tb), a.cmp(&b));
        }
    }
}
