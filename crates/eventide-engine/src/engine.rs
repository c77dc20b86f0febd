//! The occurrence engine facade.

use std::sync::Arc;

use chrono_tz::Tz;
use eventide_core::config::Settings;
use eventide_core::types::RepeatChoices;
use eventide_time::clock::far_future;
use eventide_time::{Clock, RRuleEngine, RuleEngine, SystemClock, TimeInput, TimeNormalizer, Zoned};

use crate::definition::{DefinitionError, Occurrence, OccurrenceDefinition};
use crate::error::{EngineError, EngineResult};
use crate::expand::{Expansion, Window};
use crate::filter;
use crate::merge::{Merge, merge};
use crate::source::{OccurrenceSource, Schedule};
use crate::store::{RecordStore, STREAM_CHUNK_SIZE};

/// Default ceiling on occurrences produced by one expansion.
pub const DEFAULT_MAX_COUNT: usize = 200;
/// Default offset, in years, of the far-future ceiling.
pub const DEFAULT_HORIZON_YEARS: i32 = 10;

/// The merged occurrences of every record in a store.
pub type CollectionOccurrences<S> = Merge<
    <<S as RecordStore>::Record as Schedule>::Payload,
    <<S as RecordStore>::Record as Schedule>::Occurrences,
>;

/// Expands, filters and merges occurrence definitions.
///
/// All configuration is held here and passed down explicitly; nothing is
/// read from global state once the engine is built.
#[derive(Debug, Clone)]
pub struct OccurrenceEngine<R = RRuleEngine> {
    normalizer: TimeNormalizer,
    rules: R,
    clock: Arc<dyn Clock>,
    max_count: usize,
    horizon_years: i32,
    choices: RepeatChoices,
}

impl OccurrenceEngine {
    /// ## Summary
    /// Builds an `rrule`-backed engine from loaded settings.
    ///
    /// ## Errors
    /// Returns an error if the settings fail validation or name an unknown
    /// time zone.
    pub fn from_settings(settings: &Settings) -> EngineResult<Self> {
        settings.validate()?;
        let normalizer = TimeNormalizer::from_config(&settings.engine)?;

        tracing::debug!(
            max_count = settings.engine.max_count,
            zone = %normalizer.zone(),
            pass_through = normalizer.is_pass_through(),
            "Building occurrence engine"
        );

        Ok(Self::new(normalizer, RRuleEngine)
            .with_max_count(settings.engine.max_count)
            .with_horizon_years(settings.engine.horizon_years)
            .with_choices(settings.repeat.vocabulary()))
    }
}

impl Default for OccurrenceEngine {
    fn default() -> Self {
        Self::new(TimeNormalizer::default(), RRuleEngine)
    }
}

impl<R: RuleEngine> OccurrenceEngine<R> {
    #[must_use]
    pub fn new(normalizer: TimeNormalizer, rules: R) -> Self {
        Self {
            normalizer,
            rules,
            clock: Arc::new(SystemClock),
            max_count: DEFAULT_MAX_COUNT,
            horizon_years: DEFAULT_HORIZON_YEARS,
            choices: RepeatChoices::default(),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    #[must_use]
    pub fn with_max_count(mut self, max_count: usize) -> Self {
        self.max_count = max_count;
        self
    }

    #[must_use]
    pub fn with_horizon_years(mut self, years: i32) -> Self {
        self.horizon_years = years;
        self
    }

    #[must_use]
    pub fn with_choices(mut self, choices: RepeatChoices) -> Self {
        self.choices = choices;
        self
    }

    #[must_use]
    pub fn normalizer(&self) -> TimeNormalizer {
        self.normalizer
    }

    #[must_use]
    pub fn rules(&self) -> &R {
        &self.rules
    }

    #[must_use]
    pub fn max_count(&self) -> usize {
        self.max_count
    }

    #[must_use]
    pub fn choices(&self) -> &RepeatChoices {
        &self.choices
    }

    /// The current instant in the engine's zone.
    #[must_use]
    pub fn now(&self) -> Zoned {
        self.normalizer
            .rezone(self.clock.now().with_timezone(&Tz::UTC))
    }

    /// ## Summary
    /// Returns the far-future ceiling for repetitions that nothing else
    /// bounds: midnight on January 1st, `horizon_years` after this year.
    #[must_use]
    pub fn horizon(&self) -> Zoned {
        self.normalizer
            .to_zoned(far_future(self.clock.as_ref(), self.horizon_years))
    }

    /// ## Summary
    /// Builds a query window from loosely typed bounds.
    ///
    /// A bare date as `to` covers the whole of that day.
    #[must_use]
    pub fn window(&self, from: Option<TimeInput>, to: Option<TimeInput>) -> Window {
        Window::new(
            from.map(|from| self.normalizer.normalize_boundary(from, false)),
            to.map(|to| self.normalizer.normalize_boundary(to, true)),
        )
    }

    /// ## Summary
    /// Checks a definition against the integrity rules and this engine's
    /// repeat vocabulary.
    ///
    /// ## Errors
    /// Returns the first rule the definition violates.
    pub fn validate(&self, definition: &OccurrenceDefinition) -> Result<(), DefinitionError> {
        definition.validate(&self.choices, &self.normalizer)
    }

    /// ## Summary
    /// Lazily expands one record's definition within `window`, yielding at
    /// most `max_count` occurrences.
    ///
    /// ## Errors
    /// Returns an error if the rule engine rejects the repeat rule.
    pub fn expand<S>(
        &self,
        source: &S,
        window: &Window,
        max_count: usize,
    ) -> EngineResult<Expansion<S::Payload>>
    where
        S: OccurrenceSource + ?Sized,
    {
        crate::expand::expand(self, source, window, max_count)
    }

    /// ## Summary
    /// Returns the occurrences of `item` within `window`, bounded by the
    /// configured `max_count`.
    ///
    /// ## Errors
    /// Returns an error if the rule engine rejects a repeat rule.
    pub fn occurrences<T: Schedule>(&self, item: &T, window: &Window) -> EngineResult<T::Occurrences> {
        item.occurrences(self, window, self.max_count)
    }

    /// ## Summary
    /// Returns the first occurrence of `item` within `[from, to]`, with
    /// `from` defaulting to now.
    ///
    /// ## Errors
    /// Returns an error if the rule engine rejects a repeat rule.
    pub fn next_occurrence<T: Schedule>(
        &self,
        item: &T,
        from: Option<TimeInput>,
        to: Option<TimeInput>,
    ) -> EngineResult<Option<Occurrence<T::Payload>>> {
        let window = self.window(Some(from.unwrap_or_else(|| self.now().into())), to);
        Ok(item.occurrences(self, &window, 1)?.next())
    }

    /// ## Summary
    /// Returns the earliest occurrence of `item`, optionally no later than `to`.
    ///
    /// ## Errors
    /// Returns an error if the rule engine rejects a repeat rule.
    pub fn first_occurrence<T: Schedule>(
        &self,
        item: &T,
        to: Option<TimeInput>,
    ) -> EngineResult<Option<Occurrence<T::Payload>>> {
        let window = self.window(None, to);
        Ok(item.occurrences(self, &window, 1)?.next())
    }

    /// ## Summary
    /// Narrows a store to records that could occur within `window`.
    ///
    /// May keep records with no occurrence in range, never drops one that has.
    ///
    /// ## Errors
    /// Returns an error if the store fails.
    pub fn approximate<S: RecordStore>(&self, store: S, window: &Window) -> EngineResult<S> {
        filter::approximate(self.normalizer, store, window)
    }

    /// ## Summary
    /// Drops every record with no occurrence within `window` by expanding
    /// each one once.
    ///
    /// This costs one bounded expansion per record; apply it after
    /// [`Self::approximate`] on narrow result sets. `progress` is called
    /// with `(processed, total)` after each record.
    ///
    /// ## Errors
    /// Returns an error if the store fails or the rule engine rejects a
    /// repeat rule.
    pub fn filter_exact<S: RecordStore>(
        &self,
        store: S,
        window: &Window,
        progress: Option<&mut dyn FnMut(usize, usize)>,
    ) -> EngineResult<S> {
        filter::exact(self, store, window, progress)
    }

    /// ## Summary
    /// Returns the records of `store` with occurrences within `window`.
    ///
    /// With `exact` set and a lower bound given, approximate candidates are
    /// refined by expansion; otherwise only the approximate policy applies.
    ///
    /// ## Errors
    /// Returns an error if the store fails or the rule engine rejects a
    /// repeat rule.
    pub fn for_period<S: RecordStore>(
        &self,
        store: S,
        window: &Window,
        exact: bool,
    ) -> EngineResult<S> {
        let candidates = self.approximate(store, window)?;
        if exact && window.from.is_some() {
            return self.filter_exact(candidates, window, None);
        }
        Ok(candidates)
    }

    /// ## Summary
    /// Merges the occurrences of every record in `store` within `window`
    /// into one chronological sequence, stopping after `limit` items.
    ///
    /// Records are narrowed with the approximate policy first. The working
    /// set holds one pending occurrence per surviving record.
    ///
    /// ## Errors
    /// Returns an error if the store fails or the rule engine rejects a
    /// repeat rule.
    pub fn all_occurrences<S: RecordStore>(
        &self,
        store: S,
        window: &Window,
        limit: Option<usize>,
    ) -> EngineResult<CollectionOccurrences<S>> {
        let candidates = self.approximate(store, window)?;
        let mut sequences = Vec::new();
        for record in candidates.iter_chunked(STREAM_CHUNK_SIZE) {
            let record = record.map_err(EngineError::store)?;
            sequences.push(record.occurrences(self, window, self.max_count)?);
        }

        tracing::debug!(sequences = sequences.len(), ?limit, "Merging record occurrences");
        Ok(merge(sequences, limit))
    }

    /// ## Summary
    /// Returns the first occurrence of any record in `store` within
    /// `[from, to]`, with `from` defaulting to now.
    ///
    /// ## Errors
    /// Returns an error if the store fails or the rule engine rejects a
    /// repeat rule.
    pub fn next_occurrence_in<S: RecordStore>(
        &self,
        store: S,
        from: Option<TimeInput>,
        to: Option<TimeInput>,
    ) -> EngineResult<Option<Occurrence<<S::Record as Schedule>::Payload>>> {
        let window = self.window(Some(from.unwrap_or_else(|| self.now().into())), to);
        Ok(self.all_occurrences(store, &window, Some(1))?.next())
    }

    /// ## Summary
    /// Returns the earliest occurrence of any record in `store`, optionally
    /// no later than `to`.
    ///
    /// ## Errors
    /// Returns an error if the store fails or the rule engine rejects a
    /// repeat rule.
    pub fn first_occurrence_in<S: RecordStore>(
        &self,
        store: S,
        to: Option<TimeInput>,
    ) -> EngineResult<Option<Occurrence<<S::Record as Schedule>::Payload>>> {
        let window = self.window(None, to);
        Ok(self.all_occurrences(store, &window, Some(1))?.next())
    }

    /// ## Summary
    /// Orders the records of `store` by their next occurrence from `from`
    /// (default now), dropping records that have none.
    ///
    /// Every record is loaded and expanded before anything is returned, so
    /// this gives up streaming entirely. Prefer [`Self::all_occurrences`].
    ///
    /// ## Errors
    /// Returns an error if the store fails or the rule engine rejects a
    /// repeat rule.
    pub fn sort_by_next<S: RecordStore>(
        &self,
        store: &S,
        from: Option<TimeInput>,
    ) -> EngineResult<Vec<S::Record>> {
        tracing::warn!(
            "sort_by_next loads and expands every record; use all_occurrences to stay lazy"
        );

        let from = from.unwrap_or_else(|| self.now().into());
        let mut keyed = Vec::new();
        for record in store.iter_chunked(STREAM_CHUNK_SIZE) {
            let record = record.map_err(EngineError::store)?;
            if let Some(next) = self.next_occurrence(&record, Some(from), None)? {
                keyed.push((next.start, record));
            }
        }

        keyed.sort_by_key(|(start, _)| *start);
        Ok(keyed.into_iter().map(|(_, record)| record).collect())
    }
}
