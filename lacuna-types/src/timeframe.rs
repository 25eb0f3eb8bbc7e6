//! Bar granularity parsed from compact labels such as `"5m"`, `"1h"`, `"1d"`.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::TimeDelta;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::LacunaError;

const MINUTE: i64 = 60;
const HOUR: i64 = 3_600;
const DAY: i64 = 86_400;
const WEEK: i64 = 604_800;
const MAX_BAR: i64 = 366 * DAY;

/// Unit suffix of a [`Timeframe`] label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimeframeUnit {
    /// `m`
    Minute,
    /// `h`
    Hour,
    /// `d`
    Day,
    /// `w`
    Week,
}

impl TimeframeUnit {
    const fn seconds(self) -> i64 {
        match self {
            Self::Minute => MINUTE,
            Self::Hour => HOUR,
            Self::Day => DAY,
            Self::Week => WEEK,
        }
    }

    const fn suffix(self) -> &'static str {
        match self {
            Self::Minute => "m",
            Self::Hour => "h",
            Self::Day => "d",
            Self::Week => "w",
        }
    }
}

/// Fixed bar granularity of a series.
///
/// Ordered by bar duration, so `"90m" > "1h"`. Serialized as its canonical label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Timeframe {
    amount: u32,
    unit: TimeframeUnit,
}

impl Timeframe {
    /// One minute.
    pub const M1: Self = Self::unchecked(1, TimeframeUnit::Minute);
    /// Five minutes.
    pub const M5: Self = Self::unchecked(5, TimeframeUnit::Minute);
    /// Fifteen minutes.
    pub const M15: Self = Self::unchecked(15, TimeframeUnit::Minute);
    /// Thirty minutes.
    pub const M30: Self = Self::unchecked(30, TimeframeUnit::Minute);
    /// One hour.
    pub const H1: Self = Self::unchecked(1, TimeframeUnit::Hour);
    /// Four hours.
    pub const H4: Self = Self::unchecked(4, TimeframeUnit::Hour);
    /// One day.
    pub const D1: Self = Self::unchecked(1, TimeframeUnit::Day);
    /// One week.
    pub const W1: Self = Self::unchecked(1, TimeframeUnit::Week);

    const fn unchecked(amount: u32, unit: TimeframeUnit) -> Self {
        Self { amount, unit }
    }

    /// Build a timeframe from an amount and unit.
    ///
    /// # Errors
    /// Returns `InvalidArg` when `amount` is zero or a bar would span more than 366 days.
    pub fn new(amount: u32, unit: TimeframeUnit) -> Result<Self, LacunaError> {
        if amount == 0 {
            return Err(LacunaError::invalid_arg("timeframe amount must be positive"));
        }
        if i64::from(amount) * unit.seconds() > MAX_BAR {
            return Err(LacunaError::invalid_arg(format!(
                "timeframe {amount}{} exceeds 366 days",
                unit.suffix()
            )));
        }
        Ok(Self { amount, unit })
    }

    /// Number of units per bar.
    #[must_use]
    pub const fn amount(self) -> u32 {
        self.amount
    }

    /// Unit of the label.
    #[must_use]
    pub const fn unit(self) -> TimeframeUnit {
        self.unit
    }

    /// Bar length in seconds.
    #[must_use]
    pub const fn seconds(self) -> i64 {
        self.amount as i64 * self.unit.seconds()
    }

    /// Bar length as a duration.
    #[must_use]
    pub fn bar_interval(self) -> TimeDelta {
        TimeDelta::seconds(self.seconds())
    }

    /// True when a bar is shorter than one day.
    #[must_use]
    pub const fn is_intraday(self) -> bool {
        self.seconds() < DAY
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.unit.suffix())
    }
}

impl FromStr for Timeframe {
    type Err = LacunaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim().to_ascii_lowercase();
        let split = label
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| LacunaError::invalid_arg(format!("timeframe '{s}' has no unit")))?;
        let (digits, suffix) = label.split_at(split);
        if digits.is_empty() {
            return Err(LacunaError::invalid_arg(format!(
                "timeframe '{s}' has no amount"
            )));
        }
        let amount: u32 = digits
            .parse()
            .map_err(|_| LacunaError::invalid_arg(format!("timeframe '{s}' amount overflows")))?;
        let unit = match suffix {
            "m" | "min" => TimeframeUnit::Minute,
            "h" => TimeframeUnit::Hour,
            "d" => TimeframeUnit::Day,
            "w" => TimeframeUnit::Week,
            other => {
                return Err(LacunaError::invalid_arg(format!(
                    "timeframe '{s}' has unknown unit '{other}'"
                )));
            }
        };
        Self::new(amount, unit)
    }
}

impl TryFrom<&str> for Timeframe {
    type Error = LacunaError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl PartialOrd for Timeframe {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Timeframe {
    fn cmp(&self, other: &Self) -> Ordering {
        self.seconds()
            .cmp(&other.seconds())
            .then(self.unit.cmp(&other.unit))
    }
}

impl Serialize for Timeframe {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Timeframe {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct LabelVisitor;

        impl Visitor<'_> for LabelVisitor {
            type Value = Timeframe;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a timeframe label such as \"5m\" or \"1d\"")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Timeframe, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_str(LabelVisitor)
    }
}
