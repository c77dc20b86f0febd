//! Events that own several occurrence records.

use eventide_time::RuleEngine;
use uuid::Uuid;

use crate::definition::OccurrenceDefinition;
use crate::engine::OccurrenceEngine;
use crate::error::EngineResult;
use crate::expand::{Expansion, Window};
use crate::filter::AttributeFilter;
use crate::merge::{Merge, merge};
use crate::source::{Record, Schedule};
use crate::store::{Filterable, Keyed};

/// Something that happens at one or more times, each described by its own
/// record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event<P> {
    pub id: Uuid,
    records: Vec<Record<P>>,
}

impl<P> Event<P> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            records: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    /// Adds an occurrence record to the event.
    #[must_use]
    pub fn with_occurrence(mut self, definition: OccurrenceDefinition, payload: P) -> Self {
        self.records.push(Record::new(definition, payload));
        self
    }

    pub fn push(&mut self, record: Record<P>) {
        self.records.push(record);
    }

    #[must_use]
    pub fn records(&self) -> &[Record<P>] {
        &self.records
    }

    /// ## Summary
    /// Returns the event's records ordered by start, then end.
    #[must_use]
    pub fn related_occurrences(&self) -> Vec<&Record<P>> {
        let mut related: Vec<_> = self.records.iter().collect();
        related.sort_by_key(|record| (record.definition.start, record.definition.end));
        related
    }
}

impl<P> Default for Event<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Clone> Event<P> {
    /// ## Summary
    /// Merges the occurrences of every record within `window`, stopping
    /// after `limit` items when given.
    ///
    /// ## Errors
    /// Returns an error if the rule engine rejects a repeat rule.
    pub fn occurrences_limited<R: RuleEngine>(
        &self,
        engine: &OccurrenceEngine<R>,
        window: &Window,
        limit: Option<usize>,
    ) -> EngineResult<Merge<P, Expansion<P>>> {
        let sequences = self
            .records
            .iter()
            .map(|record| engine.expand(record, window, engine.max_count()))
            .collect::<EngineResult<Vec<_>>>()?;
        Ok(merge(sequences, limit))
    }
}

impl<P: Clone> Schedule for Event<P> {
    type Payload = P;
    type Occurrences = Merge<P, Expansion<P>>;

    fn occurrences<R: RuleEngine>(
        &self,
        engine: &OccurrenceEngine<R>,
        window: &Window,
        max_count: usize,
    ) -> EngineResult<Self::Occurrences> {
        let sequences = self
            .records
            .iter()
            .map(|record| engine.expand(record, window, max_count))
            .collect::<EngineResult<Vec<_>>>()?;
        Ok(merge(sequences, None))
    }
}

/// An event matches when any of its records does.
impl<P> Filterable for Event<P> {
    fn matches(&self, filter: &AttributeFilter) -> bool {
        self.records
            .iter()
            .any(|record| filter.matches(&record.definition))
    }
}

impl<P> Keyed for Event<P> {
    type Key = Uuid;

    fn key(&self) -> Uuid {
        self.id
    }
}
