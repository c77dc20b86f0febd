//! Narrowing record collections to a date window.
//!
//! Two policies: an approximate one that stores can evaluate on attributes
//! alone, and an exact one that expands every candidate once.

use chrono::{NaiveDate, NaiveTime, TimeDelta, Utc};
use eventide_time::{RuleEngine, TimeNormalizer, Zoned};

use crate::definition::OccurrenceDefinition;
use crate::engine::OccurrenceEngine;
use crate::error::{EngineError, EngineResult};
use crate::expand::Window;
use crate::source::Schedule;
use crate::store::{Keyed, RecordStore, STREAM_CHUNK_SIZE};

/// Days after a date's UTC midnight by which that date has ended in every zone.
const ANY_ZONE_DAY_END_DAYS: i64 = 2;

/// A predicate over definition attributes, evaluated by a record store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeFilter {
    /// `start <= instant`.
    StartAtMost(Zoned),
    /// `start >= instant`.
    StartAtLeast(Zoned),
    /// `end` is present and `end >= instant`.
    EndAtLeast(Zoned),
    /// The repeat rule is non-empty.
    Repeating,
    /// `repeat_until` is present and not before the date.
    RepeatUntilAtLeast(NaiveDate),
    RepeatUntilAbsent,
    /// `repeat_until` is present and a repetition starting on that day, in
    /// any zone, could still be running at the instant.
    RepeatSpanReaches(Zoned),
    Any(Vec<AttributeFilter>),
    All(Vec<AttributeFilter>),
    Not(Box<AttributeFilter>),
}

impl AttributeFilter {
    /// ## Summary
    /// Evaluates the predicate against one definition.
    #[must_use]
    pub fn matches(&self, definition: &OccurrenceDefinition) -> bool {
        match self {
            Self::StartAtMost(instant) => definition.start <= *instant,
            Self::StartAtLeast(instant) => definition.start >= *instant,
            Self::EndAtLeast(instant) => definition.end.is_some_and(|end| end >= *instant),
            Self::Repeating => definition.is_repeating(),
            Self::RepeatUntilAtLeast(date) => {
                definition.repeat_until.is_some_and(|until| until >= *date)
            }
            Self::RepeatUntilAbsent => definition.repeat_until.is_none(),
            Self::RepeatSpanReaches(instant) => definition.repeat_until.is_some_and(|until| {
                let Some(latest_end) = until
                    .and_time(NaiveTime::MIN)
                    .and_utc()
                    .checked_add_signed(TimeDelta::days(ANY_ZONE_DAY_END_DAYS))
                    .and_then(|day_end| {
                        day_end.checked_add_signed(definition.duration().max(TimeDelta::zero()))
                    })
                else {
                    return true;
                };
                latest_end >= instant.with_timezone(&Utc)
            }),
            Self::Any(filters) => filters.iter().any(|filter| filter.matches(definition)),
            Self::All(filters) => filters.iter().all(|filter| filter.matches(definition)),
            Self::Not(filter) => !filter.matches(definition),
        }
    }
}

/// ## Summary
/// Builds the approximate predicates for `window`, to be applied in turn.
///
/// The upper bound is exact. The lower bound keeps a record when its end or
/// start reaches the window, or when it repeats and its repeat-until date
/// does not rule the window out. The repeat case is loose because a rule's
/// last repetition is only known after expansion.
#[must_use]
pub fn approximate_predicates(normalizer: TimeNormalizer, window: &Window) -> Vec<AttributeFilter> {
    let mut predicates = Vec::with_capacity(2);

    if let Some(to) = window.to {
        predicates.push(AttributeFilter::StartAtMost(normalizer.rezone(to)));
    }

    if let Some(from) = window.from {
        let from = normalizer.rezone(from);
        let from_date = normalizer.to_zoneless(&from).date();
        predicates.push(AttributeFilter::Any(vec![
            AttributeFilter::EndAtLeast(from),
            AttributeFilter::StartAtLeast(from),
            AttributeFilter::All(vec![
                AttributeFilter::Repeating,
                AttributeFilter::Any(vec![
                    AttributeFilter::RepeatUntilAtLeast(from_date),
                    AttributeFilter::RepeatUntilAbsent,
                    // a span that starts on the last day can run past it
                    AttributeFilter::RepeatSpanReaches(from),
                ]),
            ]),
        ]));
    }

    predicates
}

/// ## Summary
/// Narrows `store` with the approximate predicates for `window`.
///
/// ## Errors
/// Returns an error if the store fails.
pub fn approximate<S: RecordStore>(
    normalizer: TimeNormalizer,
    store: S,
    window: &Window,
) -> EngineResult<S> {
    let mut store = store;
    for predicate in approximate_predicates(normalizer, window) {
        store = store.filter(predicate).map_err(EngineError::store)?;
    }
    Ok(store)
}

/// ## Summary
/// Excludes every record of `store` whose expansion within `window` is
/// empty.
///
/// Records are streamed in chunks and each is expanded with `max_count = 1`.
/// `progress` is called with `(processed, total)` after each record.
///
/// ## Errors
/// Returns an error if the store fails or the rule engine rejects a repeat
/// rule.
pub fn exact<S, R>(
    engine: &OccurrenceEngine<R>,
    store: S,
    window: &Window,
    mut progress: Option<&mut dyn FnMut(usize, usize)>,
) -> EngineResult<S>
where
    S: RecordStore,
    R: RuleEngine,
{
    let total = store.count().map_err(EngineError::store)?;
    let mut empty = Vec::new();

    for (index, record) in store.iter_chunked(STREAM_CHUNK_SIZE).enumerate() {
        let record = record.map_err(EngineError::store)?;
        if record.occurrences(engine, window, 1)?.next().is_none() {
            empty.push(record.key());
        }
        if let Some(report) = progress.as_deref_mut() {
            report(index + 1, total);
        }
    }

    tracing::debug!(
        candidates = total,
        excluded = empty.len(),
        "Exact range filter applied"
    );

    if empty.is_empty() {
        return Ok(store);
    }
    store.exclude(empty).map_err(EngineError::store)
}
