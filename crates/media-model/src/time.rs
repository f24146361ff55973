//! Exact media time.
//!
//! Times are rationals (`value / timescale`) so that durations read from a
//! container can be copied into a composition without drifting through
//! floating point.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Microsecond timescale used for times parsed from decimal strings.
pub const MICROSECOND_TIMESCALE: i32 = 1_000_000;

/// A rational point in time, `value / timescale` seconds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MediaTime {
    pub value: i64,
    pub timescale: i32,
}

impl MediaTime {
    pub const ZERO: MediaTime = MediaTime {
        value: 0,
        timescale: 1,
    };

    /// Create a time. A non-positive timescale is treated as 1.
    pub fn new(value: i64, timescale: i32) -> Self {
        Self {
            value,
            timescale: timescale.max(1),
        }
    }

    /// Parse a decimal seconds string such as `"10.010000"`.
    ///
    /// Digits past microsecond precision are truncated. Returns `None` for
    /// anything that is not a plain decimal number (e.g. `"N/A"`).
    pub fn from_decimal_str(s: &str) -> Option<Self> {
        let s = s.trim();
        let (negative, digits) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, ""));
        if int_part.is_empty() && frac_part.is_empty() {
            return None;
        }
        if !int_part.chars().all(|c| c.is_ascii_digit())
            || !frac_part.chars().all(|c| c.is_ascii_digit())
        {
            return None;
        }

        let whole: i64 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().ok()?
        };
        let mut micros_str: String = frac_part.chars().take(6).collect();
        while micros_str.len() < 6 {
            micros_str.push('0');
        }
        let micros: i64 = micros_str.parse().ok()?;

        let value = whole
            .checked_mul(MICROSECOND_TIMESCALE as i64)?
            .checked_add(micros)?;
        Some(Self::new(
            if negative { -value } else { value },
            MICROSECOND_TIMESCALE,
        ))
    }

    pub fn seconds(&self) -> f64 {
        self.value as f64 / self.timescale as f64
    }

    pub fn is_zero(&self) -> bool {
        self.value == 0
    }

    /// Sum of two times, expressed in the finer of the two timescales when
    /// one divides the other, otherwise in their product.
    pub fn add(&self, other: &MediaTime) -> MediaTime {
        let (a, b, scale) = common_scale(self, other);
        MediaTime::new(a + b, scale)
    }
}

fn common_scale(x: &MediaTime, y: &MediaTime) -> (i64, i64, i32) {
    let (xs, ys) = (x.timescale, y.timescale);
    if xs == ys {
        (x.value, y.value, xs)
    } else if xs % ys == 0 {
        (x.value, y.value * (xs / ys) as i64, xs)
    } else if ys % xs == 0 {
        (x.value * (ys / xs) as i64, y.value, ys)
    } else {
        let scale = xs.saturating_mul(ys);
        (x.value * ys as i64, y.value * xs as i64, scale)
    }
}

impl PartialEq for MediaTime {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for MediaTime {}

impl PartialOrd for MediaTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MediaTime {
    fn cmp(&self, other: &Self) -> Ordering {
        let lhs = self.value as i128 * other.timescale as i128;
        let rhs = other.value as i128 * self.timescale as i128;
        lhs.cmp(&rhs)
    }
}

impl fmt::Display for MediaTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}", self.seconds())
    }
}

/// A half-open range `[start, start + duration)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: MediaTime,
    pub duration: MediaTime,
}

impl TimeRange {
    pub fn new(start: MediaTime, duration: MediaTime) -> Self {
        Self { start, duration }
    }

    /// `[0, duration)`.
    pub fn from_zero(duration: MediaTime) -> Self {
        Self::new(MediaTime::ZERO, duration)
    }

    pub fn end(&self) -> MediaTime {
        self.start.add(&self.duration)
    }

    /// True when the range covers no time or runs backwards.
    pub fn is_empty(&self) -> bool {
        self.duration <= MediaTime::ZERO
    }
}
