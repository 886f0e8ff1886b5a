//! Fixed-format date/time parsing and calendar reprojection.
//!
//! Three formats only, no fallbacks:
//! - date: `yyyy-MM-dd`
//! - time: `HH:mm:ss`
//! - timestamp: `yyyy-MM-dd HH:mm:ss` with optional fractional seconds
//!
//! Wall-clock text is interpreted in the cursor's default calendar. Every
//! function here is pure; nothing is cached between calls.

use std::fmt;
use std::ops::Deref;

use chrono::{
    DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Timelike, Utc,
};
use rowset_api::CursorError;
use rowset_api::value::{DATE_FORMAT, TIME_FORMAT};

/// Parse pattern for timestamps; `%.f` also matches an absent fraction.
const TIMESTAMP_PARSE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// A calendar is reduced to its UTC offset: the zone whose wall-clock
/// fields a parsed instant is read through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calendar {
    offset: FixedOffset,
}

impl Calendar {
    pub fn utc() -> Self {
        Self { offset: Utc.fix() }
    }

    /// Offset east of UTC in seconds. `None` outside ±24h.
    pub fn east(seconds: i32) -> Option<Self> {
        FixedOffset::east_opt(seconds).map(|offset| Self { offset })
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Accepts `UTC`, `Z`, `+HH`, `+HHMM`, `+HH:MM` (and `-` forms).
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.eq_ignore_ascii_case("utc") || text == "Z" {
            return Some(Self::utc());
        }
        let offset = match text.as_bytes() {
            [sign @ (b'+' | b'-'), h1 @ b'0'..=b'9', h2 @ b'0'..=b'9'] => {
                let seconds = i32::from((h1 - b'0') * 10 + (h2 - b'0')) * 3600;
                FixedOffset::east_opt(if *sign == b'-' { -seconds } else { seconds })?
            }
            // chrono stops after the minutes and ignores what follows
            bytes if bytes.len() <= "+HH:MM".len() => text.parse::<FixedOffset>().ok()?,
            _ => return None,
        };
        Some(Self { offset })
    }
}

impl Default for Calendar {
    fn default() -> Self {
        Self::utc()
    }
}

impl From<FixedOffset> for Calendar {
    fn from(offset: FixedOffset) -> Self {
        Self { offset }
    }
}

impl fmt::Display for Calendar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.offset)
    }
}

macro_rules! instant_type {
    ($(#[$meta:meta])* $name:ident, $format:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(DateTime<FixedOffset>);

        impl $name {
            pub fn new(instant: DateTime<FixedOffset>) -> Self {
                Self(instant)
            }

            pub fn instant(&self) -> DateTime<FixedOffset> {
                self.0
            }

            /// Same instant, calendar fields read through `calendar`.
            pub fn reproject(self, calendar: Calendar) -> Self {
                Self(self.0.with_timezone(&calendar.offset()))
            }
        }

        impl Deref for $name {
            type Target = DateTime<FixedOffset>;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0.format($format))
            }
        }
    };
}

instant_type!(
    /// Calendar date; the instant is midnight in the calendar it was parsed in.
    SqlDate,
    DATE_FORMAT
);

instant_type!(
    /// Time of day anchored on 1970-01-01.
    SqlTime,
    TIME_FORMAT
);

instant_type!(
    /// Full date and time.
    SqlTimestamp,
    "%Y-%m-%d %H:%M:%S%.f"
);

/// Wall-clock fields in `calendar` → absolute instant.
pub fn localize(naive: NaiveDateTime, calendar: Calendar) -> Option<DateTime<FixedOffset>> {
    calendar.offset().from_local_datetime(&naive).single()
}

pub fn date_from_naive(date: NaiveDate, calendar: Calendar) -> Option<SqlDate> {
    localize(date.and_time(NaiveTime::MIN), calendar).map(SqlDate)
}

pub fn time_from_naive(time: NaiveTime, calendar: Calendar) -> Option<SqlTime> {
    localize(NaiveDate::default().and_time(time), calendar).map(SqlTime)
}

pub fn timestamp_from_naive(ts: NaiveDateTime, calendar: Calendar) -> Option<SqlTimestamp> {
    localize(ts, calendar).map(SqlTimestamp)
}

const DATE_SHAPE: &str = "dddd-dd-dd";
const TIME_SHAPE: &str = "dd:dd:dd";
const TIMESTAMP_SHAPE: &str = "dddd-dd-dd dd:dd:dd";

/// `d` in `pattern` matches one ASCII digit; every other byte matches itself.
fn has_shape(text: &str, pattern: &str) -> bool {
    text.len() == pattern.len()
        && text.bytes().zip(pattern.bytes()).all(|(c, p)| match p {
            b'd' => c.is_ascii_digit(),
            _ => c == p,
        })
}

/// Timestamp shape plus an optional `.` and 1 to 9 fraction digits.
fn has_timestamp_shape(text: &str) -> bool {
    let Some((head, fraction)) = text.split_at_checked(TIMESTAMP_SHAPE.len()) else {
        return false;
    };
    has_shape(head, TIMESTAMP_SHAPE)
        && (fraction.is_empty()
            || fraction.strip_prefix('.').is_some_and(|digits| {
                (1..=9).contains(&digits.len()) && digits.bytes().all(|b| b.is_ascii_digit())
            }))
}

/// chrono keeps a leap second as a nanosecond count past one second.
fn is_leap_second(t: &impl Timelike) -> bool {
    t.nanosecond() >= 1_000_000_000
}

pub fn parse_date(text: &str, calendar: Calendar) -> Result<SqlDate, CursorError> {
    Some(text)
        .filter(|text| has_shape(text, DATE_SHAPE))
        .and_then(|text| NaiveDate::parse_from_str(text, DATE_FORMAT).ok())
        .and_then(|date| date_from_naive(date, calendar))
        .ok_or_else(|| CursorError::coercion(text, "date"))
}

pub fn parse_time(text: &str, calendar: Calendar) -> Result<SqlTime, CursorError> {
    Some(text)
        .filter(|text| has_shape(text, TIME_SHAPE))
        .and_then(|text| NaiveTime::parse_from_str(text, TIME_FORMAT).ok())
        .filter(|time| !is_leap_second(time))
        .and_then(|time| time_from_naive(time, calendar))
        .ok_or_else(|| CursorError::coercion(text, "time"))
}

pub fn parse_timestamp(text: &str, calendar: Calendar) -> Result<SqlTimestamp, CursorError> {
    Some(text)
        .filter(|text| has_timestamp_shape(text))
        .and_then(|text| NaiveDateTime::parse_from_str(text, TIMESTAMP_PARSE_FORMAT).ok())
        .filter(|ts| !is_leap_second(ts))
        .and_then(|ts| timestamp_from_naive(ts, calendar))
        .ok_or_else(|| CursorError::coercion(text, "timestamp"))
}
