//! Lazy expansion of one definition into its occurrences.

use std::iter::FusedIterator;

use chrono::TimeDelta;
use eventide_time::{Repeats, RuleEngine, TimeNormalizer, Zoned};

use crate::definition::Occurrence;
use crate::engine::OccurrenceEngine;
use crate::error::EngineResult;
use crate::source::OccurrenceSource;

/// An inclusive query window. A missing side is unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Window {
    pub from: Option<Zoned>,
    pub to: Option<Zoned>,
}

impl Window {
    #[must_use]
    pub fn new(from: Option<Zoned>, to: Option<Zoned>) -> Self {
        Self { from, to }
    }

    #[must_use]
    pub fn unbounded() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn starting_at(from: Zoned) -> Self {
        Self::new(Some(from), None)
    }

    #[must_use]
    pub fn between(from: Zoned, to: Zoned) -> Self {
        Self::new(Some(from), Some(to))
    }

    /// ## Summary
    /// Checks whether the span `[start, end]` touches the window.
    ///
    /// The span's end, or its start when it has none, must not precede
    /// `from`, and its start must not follow `to`.
    #[must_use]
    pub fn intersects(&self, start: Zoned, end: Option<Zoned>) -> bool {
        let after_from = self
            .from
            .is_none_or(|from| start >= from || end.is_some_and(|end| end >= from));
        let before_to = self.to.is_none_or(|to| start <= to);
        after_from && before_to
    }
}

/// The occurrences of one definition, produced on demand.
///
/// Holds at most one pending rule instant; nothing further is requested from
/// the rule engine until the next occurrence is pulled.
pub struct Expansion<P> {
    state: State<P>,
}

enum State<P> {
    Done,
    Single(Occurrence<P>),
    Repeating {
        repeats: Repeats,
        duration: TimeDelta,
        payload: P,
        normalizer: TimeNormalizer,
        remaining: usize,
    },
}

impl<P> Expansion<P> {
    /// An expansion with no occurrences.
    #[must_use]
    pub fn empty() -> Self {
        Self { state: State::Done }
    }

    fn single(occurrence: Occurrence<P>) -> Self {
        Self {
            state: State::Single(occurrence),
        }
    }

    fn repeating(
        repeats: Repeats,
        duration: TimeDelta,
        payload: P,
        normalizer: TimeNormalizer,
        max_count: usize,
    ) -> Self {
        Self {
            state: State::Repeating {
                repeats,
                duration,
                payload,
                normalizer,
                remaining: max_count,
            },
        }
    }
}

impl<P: Clone> Iterator for Expansion<P> {
    type Item = Occurrence<P>;

    fn next(&mut self) -> Option<Self::Item> {
        match std::mem::replace(&mut self.state, State::Done) {
            State::Done => None,
            State::Single(occurrence) => Some(occurrence),
            State::Repeating {
                mut repeats,
                duration,
                payload,
                normalizer,
                remaining,
            } => {
                // max_count reached: stop without asking the rule engine again
                if remaining == 0 {
                    return None;
                }
                let repeat = repeats.next()?;
                let start = normalizer.to_zoned(repeat);
                let end = start.checked_add_signed(duration).unwrap_or(start);
                let occurrence = Occurrence {
                    start,
                    end: Some(end),
                    source: payload.clone(),
                };
                self.state = State::Repeating {
                    repeats,
                    duration,
                    payload,
                    normalizer,
                    remaining: remaining - 1,
                };
                Some(occurrence)
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match &self.state {
            State::Done => (0, Some(0)),
            State::Single(_) => (1, Some(1)),
            State::Repeating { remaining, .. } => (0, Some(*remaining)),
        }
    }
}

impl<P: Clone> FusedIterator for Expansion<P> {}

/// ## Summary
/// Expands one definition within `window`, yielding at most `max_count`
/// occurrences in ascending start order.
///
/// A definition without a repeat rule yields itself iff its span intersects
/// the window. A repeating definition is searched from `max(from, start)`,
/// pulled back by the definition's duration so that spans starting before
/// the window but ending inside it are found, up to the earliest of `to`,
/// the end of the repeat-until day, and the engine's far-future horizon.
///
/// A repeat-until date before the start's date yields nothing.
///
/// ## Errors
/// Returns an error if the rule engine rejects the repeat rule.
pub(crate) fn expand<S, R>(
    engine: &OccurrenceEngine<R>,
    source: &S,
    window: &Window,
    max_count: usize,
) -> EngineResult<Expansion<S::Payload>>
where
    S: OccurrenceSource + ?Sized,
    R: RuleEngine,
{
    let normalizer = engine.normalizer();
    let definition = source.definition();
    let window = Window::new(
        window.from.map(|from| normalizer.rezone(from)),
        window.to.map(|to| normalizer.rezone(to)),
    );
    let start = normalizer.rezone(definition.start);

    if !definition.is_repeating() {
        let end = definition.end.map(|end| normalizer.rezone(end));
        if max_count == 0 || !window.intersects(start, end) {
            return Ok(Expansion::empty());
        }
        return Ok(Expansion::single(Occurrence {
            start,
            end,
            source: source.to_payload(),
        }));
    }

    let first_day = normalizer.to_zoneless(&start).date();
    if let Some(until) = definition.repeat_until
        && until < first_day
    {
        tracing::warn!(
            %until,
            %first_day,
            "Repeat-until date precedes the first occurrence, expanding to nothing"
        );
        return Ok(Expansion::empty());
    }

    let duration = definition.duration();
    if duration < TimeDelta::zero() {
        tracing::debug!(
            duration_seconds = duration.num_seconds(),
            "Definition ends before it starts, using its duration as given"
        );
    }

    // occurrences never precede the definition's own start
    let lower = window.from.map_or(start, |from| from.max(start));

    let upper = match (definition.repeat_until, window.to) {
        (Some(until), to) => {
            let until = normalizer.end_of_day(until);
            to.map_or(until, |to| to.min(until))
        }
        (None, Some(to)) => to,
        (None, None) => engine.horizon(),
    };

    // the rule engine filters on repeat starts, so pull the lower bound back
    // far enough to catch spans that begin early but end inside the window
    let search_from = lower.checked_sub_signed(duration).unwrap_or(lower);

    let repeats = engine.rules().between(
        normalizer.to_zoneless(&start),
        &definition.repeat,
        normalizer.to_zoneless(&search_from),
        normalizer.to_zoneless(&upper),
    )?;

    tracing::trace!(
        rule = %definition.repeat,
        %lower,
        %upper,
        max_count,
        "Expanding repeating definition"
    );

    Ok(Expansion::repeating(
        repeats,
        duration,
        source.to_payload(),
        normalizer,
        max_count,
    ))
}
