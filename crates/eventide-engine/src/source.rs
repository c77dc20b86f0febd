//! Traits that let the engine work with any record shape.

use eventide_time::RuleEngine;
use uuid::Uuid;

use crate::definition::{Occurrence, OccurrenceDefinition};
use crate::engine::OccurrenceEngine;
use crate::error::EngineResult;
use crate::expand::{Expansion, Window};

/// A record that owns exactly one occurrence definition.
pub trait OccurrenceSource {
    /// Data attached to every occurrence of this record.
    type Payload: Clone;

    fn definition(&self) -> &OccurrenceDefinition;

    /// ## Summary
    /// Returns the data to attach to this record's occurrences.
    ///
    /// Called once per expansion; the result is cloned into each occurrence.
    fn to_payload(&self) -> Self::Payload;
}

/// Anything that can produce a chronologically ordered occurrence sequence.
///
/// Every [`OccurrenceSource`] is a `Schedule`; so is an
/// [`Event`](crate::event::Event), whose sequence merges those of its records.
pub trait Schedule {
    type Payload: Clone;
    type Occurrences: Iterator<Item = Occurrence<Self::Payload>>;

    /// ## Summary
    /// Lazily expands this item's occurrences within `window`, producing at
    /// most `max_count` occurrences per definition.
    ///
    /// ## Errors
    /// Returns an error if the rule engine rejects a repeat rule.
    fn occurrences<R: RuleEngine>(
        &self,
        engine: &OccurrenceEngine<R>,
        window: &Window,
        max_count: usize,
    ) -> EngineResult<Self::Occurrences>;
}

impl<S: OccurrenceSource> Schedule for S {
    type Payload = S::Payload;
    type Occurrences = Expansion<S::Payload>;

    fn occurrences<R: RuleEngine>(
        &self,
        engine: &OccurrenceEngine<R>,
        window: &Window,
        max_count: usize,
    ) -> EngineResult<Self::Occurrences> {
        engine.expand(self, window, max_count)
    }
}

impl OccurrenceSource for OccurrenceDefinition {
    type Payload = OccurrenceDefinition;

    fn definition(&self) -> &OccurrenceDefinition {
        self
    }

    fn to_payload(&self) -> Self::Payload {
        self.clone()
    }
}

/// A stored definition with an identity and attached data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record<P> {
    pub id: Uuid,
    pub definition: OccurrenceDefinition,
    pub payload: P,
}

impl<P> Record<P> {
    /// Creates a record with a fresh identity.
    #[must_use]
    pub fn new(definition: OccurrenceDefinition, payload: P) -> Self {
        Self {
            id: Uuid::new_v4(),
            definition,
            payload,
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }
}

impl<P: Clone> OccurrenceSource for Record<P> {
    type Payload = P;

    fn definition(&self) -> &OccurrenceDefinition {
        &self.definition
    }

    fn to_payload(&self) -> P {
        self.payload.clone()
    }
}
