//! The record store capability the engine consumes.

pub mod memory;

use std::fmt::Debug;
use std::hash::Hash;

use uuid::Uuid;

use crate::filter::AttributeFilter;
use crate::source::{OccurrenceSource, Record, Schedule};

/// Records fetched per round trip when the engine streams a store.
pub const STREAM_CHUNK_SIZE: usize = 100;

/// Records streamed from a store; each item may fail independently.
pub type RecordStream<'a, T, E> = Box<dyn Iterator<Item = Result<T, E>> + 'a>;

/// A record with a stable identity inside its store.
pub trait Keyed {
    type Key: Clone + Eq + Hash + Debug;

    fn key(&self) -> Self::Key;
}

impl<P> Keyed for Record<P> {
    type Key = Uuid;

    fn key(&self) -> Uuid {
        self.id
    }
}

/// A record that can be tested against an [`AttributeFilter`].
pub trait Filterable {
    fn matches(&self, filter: &AttributeFilter) -> bool;
}

impl<S: OccurrenceSource> Filterable for S {
    fn matches(&self, filter: &AttributeFilter) -> bool {
        filter.matches(self.definition())
    }
}

/// A queryable collection of records.
///
/// `filter` and `exclude` narrow the query and hand back a new store;
/// nothing needs to be evaluated until `count` or `iter_chunked` is called.
pub trait RecordStore: Sized {
    type Record: Schedule + Keyed + Filterable;
    type Error: std::error::Error + Send + Sync + 'static;

    /// ## Summary
    /// Keeps only records matching `filter`.
    ///
    /// ## Errors
    /// Returns the store's error if the predicate cannot be applied.
    fn filter(self, filter: AttributeFilter) -> Result<Self, Self::Error>;

    /// ## Summary
    /// Drops the records with the given keys.
    ///
    /// ## Errors
    /// Returns the store's error if the exclusion cannot be applied.
    fn exclude(self, keys: Vec<<Self::Record as Keyed>::Key>) -> Result<Self, Self::Error>;

    /// ## Summary
    /// Counts the records the current query selects.
    ///
    /// ## Errors
    /// Returns the store's error if the query fails.
    fn count(&self) -> Result<usize, Self::Error>;

    /// ## Summary
    /// Streams the selected records, fetching `chunk_size` at a time.
    fn iter_chunked(&self, chunk_size: usize) -> RecordStream<'_, Self::Record, Self::Error>;
}
