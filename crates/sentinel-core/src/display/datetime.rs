//! Time display utilities.
//!
//! Timestamps are stored in UTC and durations in milliseconds; only display
//! converts.

use std::fmt;

use jiff::{tz::TimeZone, Timestamp};

/// Formats a `Timestamp` in the system timezone as `YYYY-MM-DD HH:MM:SS TZ`.
pub struct LocalDateTime<'a>(pub &'a Timestamp);

impl fmt::Display for LocalDateTime<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            self.0
                .to_zoned(TimeZone::system())
                .strftime("%Y-%m-%d %H:%M:%S %Z")
        )
    }
}

/// Formats a millisecond duration for humans: `850ms`, `1.20s`, `2m 05s`.
///
/// ```rust
/// use sentinel_core::display::Elapsed;
///
/// assert_eq!(Elapsed(850).to_string(), "850ms");
/// assert_eq!(Elapsed(1_200).to_string(), "1.20s");
/// assert_eq!(Elapsed(125_000).to_string(), "2m 05s");
/// ```
pub struct Elapsed(pub i64);

impl fmt::Display for Elapsed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ms = self.0.max(0);
        match ms {
            0..=999 => write!(f, "{ms}ms"),
            1_000..=59_999 => write!(f, "{}.{:02}s", ms / 1_000, (ms % 1_000) / 10),
            _ => {
                let secs = ms / 1_000;
                write!(f, "{}m {:02}s", secs / 60, secs % 60)
            }
        }
    }
}
