//! Occurrence definitions and the occurrences derived from them.

use chrono::{NaiveDate, TimeDelta};
use eventide_core::types::RepeatChoices;
use eventide_time::{TimeNormalizer, Zoned};
use thiserror::Error;

/// Integrity problems in an [`OccurrenceDefinition`].
///
/// Reported by [`OccurrenceDefinition::validate`] at the store boundary. The
/// expander never raises these; it degrades to empty results instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DefinitionError {
    #[error("End time must be after start time (start={start}, end={end}); were they swapped?")]
    EndNotAfterStart { start: Zoned, end: Zoned },

    #[error(
        "A repeat-until date was given without a repeat rule; choose a repeat rule or drop the repeat-until date"
    )]
    RepeatUntilWithoutRule,

    #[error(
        "Repeat-until date {until} is before the first occurrence on {first}; the repetition would never occur"
    )]
    RepeatUntilBeforeStart { until: NaiveDate, first: NaiveDate },

    #[error("Unrecognised repeat rule: {0}")]
    UnrecognisedRule(String),
}

/// When something happens: once, or repeatedly from `start`.
#[derive(Clone, PartialEq, Eq)]
pub struct OccurrenceDefinition {
    pub start: Zoned,
    pub end: Option<Zoned>,
    /// Repeat rule; empty for a single occurrence.
    pub repeat: String,
    /// Last day on which a repetition may start.
    pub repeat_until: Option<NaiveDate>,
}

impl OccurrenceDefinition {
    /// Creates a single, open-ended occurrence at `start`.
    #[must_use]
    pub fn new(start: Zoned) -> Self {
        Self {
            start,
            end: None,
            repeat: String::new(),
            repeat_until: None,
        }
    }

    #[must_use]
    pub fn with_end(mut self, end: Zoned) -> Self {
        self.end = Some(end);
        self
    }

    #[must_use]
    pub fn with_repeat(mut self, rule: impl Into<String>) -> Self {
        self.repeat = rule.into();
        self
    }

    #[must_use]
    pub fn with_repeat_until(mut self, until: NaiveDate) -> Self {
        self.repeat_until = Some(until);
        self
    }

    #[must_use]
    pub fn is_repeating(&self) -> bool {
        !self.repeat.trim().is_empty()
    }

    /// ## Summary
    /// Returns `end - start`, or zero when there is no end.
    ///
    /// A reversed definition gives a negative duration, which is returned as is.
    #[must_use]
    pub fn duration(&self) -> TimeDelta {
        self.end
            .map_or_else(TimeDelta::zero, |end| end.signed_duration_since(self.start))
    }

    /// ## Summary
    /// Checks the definition's integrity rules.
    ///
    /// ## Errors
    /// Returns the first violated rule: an end not after the start, a
    /// repeat-until date without a rule or before the start's date in the
    /// normalizer's zone, or a rule outside the configured vocabulary.
    pub fn validate(
        &self,
        choices: &RepeatChoices,
        normalizer: &TimeNormalizer,
    ) -> Result<(), DefinitionError> {
        if let Some(end) = self.end
            && self.start >= end
        {
            return Err(DefinitionError::EndNotAfterStart {
                start: self.start,
                end,
            });
        }

        if self.repeat_until.is_some() && !self.is_repeating() {
            return Err(DefinitionError::RepeatUntilWithoutRule);
        }

        if let Some(until) = self.repeat_until {
            let first = normalizer.to_zoneless(&self.start).date();
            if until < first {
                return Err(DefinitionError::RepeatUntilBeforeStart { until, first });
            }
        }

        if !choices.is_recognised(&self.repeat) {
            return Err(DefinitionError::UnrecognisedRule(self.repeat.clone()));
        }

        Ok(())
    }
}

impl std::fmt::Display for OccurrenceDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.start)
    }
}

impl std::fmt::Debug for OccurrenceDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OccurrenceDefinition")
            .field("start", &self.start)
            .field("end", &self.end)
            .field("repeat", &self.repeat)
            .field("repeat_until", &self.repeat_until)
            .finish()
    }
}

/// One concrete time span derived from a definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrence<P> {
    pub start: Zoned,
    pub end: Option<Zoned>,
    /// Data attached by the originating record.
    pub source: P,
}
