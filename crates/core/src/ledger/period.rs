//! Reporting periods and their time windows.
//!
//! Windows are half-open `[start, end)` in UTC. "Today" starts at local
//! midnight in the configured business timezone.

use chrono::{DateTime, Duration, Months, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::LedgerError;

/// Supported aggregation periods.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    /// Local midnight to midnight + 24h.
    #[default]
    Today,
    /// The last seven days.
    Week,
    /// The last calendar month.
    Month,
}

/// A half-open time range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    /// Inclusive lower bound.
    pub start: DateTime<Utc>,
    /// Exclusive upper bound.
    pub end: DateTime<Utc>,
}

impl Window {
    /// Returns true if `ts` falls inside the window.
    #[must_use]
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        ts >= self.start && ts < self.end
    }
}

impl Period {
    /// Returns the string representation of the period.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::Week => "week",
            Self::Month => "month",
        }
    }

    /// Parses a period, rejecting unknown values.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for anything other than today, week or month.
    pub fn parse(s: &str) -> Result<Self, LedgerError> {
        match s.trim().to_lowercase().as_str() {
            "today" => Ok(Self::Today),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            other => Err(LedgerError::invalid_argument(format!(
                "unsupported period: {other}"
            ))),
        }
    }

    /// Parses a period, falling back to today for absent or unknown values.
    #[must_use]
    pub fn parse_or_today(s: Option<&str>) -> Self {
        s.and_then(|s| Self::parse(s).ok()).unwrap_or_default()
    }

    /// Computes the window for this period relative to `now`.
    #[must_use]
    pub fn window(&self, now: DateTime<Utc>, tz: Tz) -> Window {
        match self {
            Self::Today => {
                let start = local_midnight(now, tz);
                Window {
                    start,
                    end: start + Duration::hours(24),
                }
            }
            Self::Week => Window {
                start: now - Duration::days(7),
                end: now,
            },
            Self::Month => Window {
                start: now
                    .checked_sub_months(Months::new(1))
                    .unwrap_or_else(|| now - Duration::days(30)),
                end: now,
            },
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Start of the local calendar day containing `now`, as UTC.
///
/// When midnight does not exist locally (DST gap) the first valid instant of
/// the day is used.
#[must_use]
pub fn local_midnight(now: DateTime<Utc>, tz: Tz) -> DateTime<Utc> {
    let local_date = now.with_timezone(&tz).date_naive();
    (0..=2)
        .find_map(|h| {
            let naive = local_date.and_time(NaiveTime::MIN) + Duration::hours(h);
            tz.from_local_datetime(&naive).earliest()
        })
        .map_or_else(
            || local_date.and_time(NaiveTime::MIN).and_utc(),
            |dt| dt.with_timezone(&Utc),
        )
}
