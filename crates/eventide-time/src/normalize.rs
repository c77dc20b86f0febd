//! Conversion between zone-aware and zoneless instants.
//!
//! Range comparisons happen on zone-aware instants. Repeat-rule expansion
//! happens on zoneless instants in the deployment's zone. Everything that
//! crosses between the two goes through a [`TimeNormalizer`].

use chrono::{
    DateTime, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone, Utc,
};
use chrono_tz::Tz;
use eventide_core::config::EngineConfig;

use crate::error::{TimeError, TimeResult};

/// A zone-aware instant.
pub type Zoned = DateTime<Tz>;

/// Seconds from midnight to `23:59:59`.
const END_OF_DAY_SECONDS: i64 = 86_399;

/// A query bound or record attribute in any of the accepted forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeInput {
    /// A bare date, expanded to the start or end of the day.
    Date(NaiveDate),
    /// A wall-clock instant in the deployment's zone.
    Naive(NaiveDateTime),
    /// An instant that already carries its zone.
    Zoned(Zoned),
}

impl From<NaiveDate> for TimeInput {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<NaiveDateTime> for TimeInput {
    fn from(value: NaiveDateTime) -> Self {
        Self::Naive(value)
    }
}

impl From<Zoned> for TimeInput {
    fn from(value: Zoned) -> Self {
        Self::Zoned(value)
    }
}

impl From<DateTime<Utc>> for TimeInput {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Zoned(value.with_timezone(&Tz::UTC))
    }
}

/// ## Summary
/// Resolves an IANA zone name to a `chrono_tz::Tz`.
///
/// ## Errors
/// Returns `TimeError::UnknownTimezone` if the name is not in the zone database.
pub fn resolve_zone(name: &str) -> TimeResult<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_e| TimeError::UnknownTimezone(name.to_string()))
}

/// Converts instants between zone-aware and zoneless form.
///
/// With zone support disabled the normalizer is a pass-through: zoneless
/// values are labelled UTC without any offset arithmetic, and zoned values
/// give back their wall-clock reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeNormalizer {
    zone: Tz,
    use_tz: bool,
}

impl TimeNormalizer {
    /// Creates a normalizer that zones instants in `zone`.
    #[must_use]
    pub fn new(zone: Tz) -> Self {
        Self { zone, use_tz: true }
    }

    /// Creates a normalizer for deployments without zone support.
    #[must_use]
    pub fn pass_through() -> Self {
        Self {
            zone: Tz::UTC,
            use_tz: false,
        }
    }

    /// ## Summary
    /// Builds the normalizer described by the engine configuration.
    ///
    /// ## Errors
    /// Returns `TimeError::UnknownTimezone` if zone support is enabled and the
    /// configured zone cannot be resolved.
    pub fn from_config(config: &EngineConfig) -> TimeResult<Self> {
        if config.use_tz {
            Ok(Self::new(resolve_zone(&config.time_zone)?))
        } else {
            Ok(Self::pass_through())
        }
    }

    /// The zone instants are expressed in.
    #[must_use]
    pub fn zone(&self) -> Tz {
        self.zone
    }

    #[must_use]
    pub fn is_pass_through(&self) -> bool {
        !self.use_tz
    }

    /// ## Summary
    /// Makes a zoneless instant zone-aware.
    ///
    /// Wall-clock times inside a DST gap are shifted forward one hour; times
    /// inside a DST fold resolve to the earlier instant.
    #[must_use]
    pub fn to_zoned(&self, naive: NaiveDateTime) -> Zoned {
        if !self.use_tz {
            return Tz::UTC.from_utc_datetime(&naive);
        }

        match self.zone.from_local_datetime(&naive) {
            LocalResult::Single(dt) => dt,
            // RFC 5545 §3.3.5: take the first occurrence of a repeated wall-clock time
            LocalResult::Ambiguous(earliest, _latest) => earliest,
            LocalResult::None => {
                let shifted = naive + TimeDelta::hours(1);
                tracing::trace!(%naive, zone = %self.zone, "Shifting wall-clock time out of DST gap");
                self.zone
                    .from_local_datetime(&shifted)
                    .earliest()
                    .unwrap_or_else(|| self.zone.from_utc_datetime(&naive))
            }
        }
    }

    /// ## Summary
    /// Expresses an already zone-aware instant in this normalizer's zone.
    ///
    /// The instant itself is unchanged, so applying this twice is the same as
    /// applying it once.
    #[must_use]
    pub fn rezone(&self, dt: Zoned) -> Zoned {
        if self.use_tz {
            dt.with_timezone(&self.zone)
        } else {
            dt
        }
    }

    /// ## Summary
    /// Drops the zone from an instant, giving its wall-clock reading in this
    /// normalizer's zone.
    #[must_use]
    pub fn to_zoneless(&self, dt: &Zoned) -> NaiveDateTime {
        if self.use_tz {
            dt.with_timezone(&self.zone).naive_local()
        } else {
            dt.naive_local()
        }
    }

    /// ## Summary
    /// Normalizes a date, zoneless or zoned input to a zone-aware instant.
    ///
    /// A bare date becomes `00:00:00` on that day, or `23:59:59` when `end`
    /// is set.
    #[must_use]
    pub fn normalize_boundary(&self, input: impl Into<TimeInput>, end: bool) -> Zoned {
        match input.into() {
            TimeInput::Date(date) => self.to_zoned(day_boundary(date, end)),
            TimeInput::Naive(naive) => self.to_zoned(naive),
            TimeInput::Zoned(dt) => self.rezone(dt),
        }
    }

    /// ## Summary
    /// Returns the zone-aware end of the given day (`23:59:59`).
    #[must_use]
    pub fn end_of_day(&self, date: NaiveDate) -> Zoned {
        self.to_zoned(day_boundary(date, true))
    }
}

impl Default for TimeNormalizer {
    fn default() -> Self {
        Self::new(Tz::UTC)
    }
}

fn day_boundary(date: NaiveDate, end: bool) -> NaiveDateTime {
    let midnight = date.and_time(NaiveTime::MIN);
    if end {
        midnight
            .checked_add_signed(TimeDelta::seconds(END_OF_DAY_SECONDS))
            .unwrap_or(midnight)
    } else {
        midnight
    }
}
