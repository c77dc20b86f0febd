//! An in-memory [`RecordStore`].

use std::collections::HashSet;
use std::convert::Infallible;
use std::sync::Arc;

use super::{Filterable, Keyed, RecordStore, RecordStream};
use crate::filter::AttributeFilter;
use crate::source::Schedule;

/// Records held in memory behind a lazy query.
///
/// Narrowing a store shares the underlying records and only extends the
/// query; records are tested against it a chunk at a time while streaming.
#[derive(Debug)]
pub struct MemoryStore<T: Keyed> {
    records: Arc<Vec<T>>,
    filters: Vec<AttributeFilter>,
    excluded: HashSet<T::Key>,
}

impl<T: Keyed> Clone for MemoryStore<T> {
    fn clone(&self) -> Self {
        Self {
            records: Arc::clone(&self.records),
            filters: self.filters.clone(),
            excluded: self.excluded.clone(),
        }
    }
}

impl<T: Keyed + Filterable> MemoryStore<T> {
    #[must_use]
    pub fn new(records: impl IntoIterator<Item = T>) -> Self {
        Self {
            records: Arc::new(records.into_iter().collect()),
            filters: Vec::new(),
            excluded: HashSet::new(),
        }
    }

    fn admits(&self, record: &T) -> bool {
        !self.excluded.contains(&record.key())
            && self.filters.iter().all(|filter| record.matches(filter))
    }
}

impl<T: Keyed + Filterable> FromIterator<T> for MemoryStore<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl<T> RecordStore for MemoryStore<T>
where
    T: Schedule + Keyed + Filterable + Clone,
{
    type Record = T;
    type Error = Infallible;

    fn filter(mut self, filter: AttributeFilter) -> Result<Self, Infallible> {
        self.filters.push(filter);
        Ok(self)
    }

    fn exclude(mut self, keys: Vec<T::Key>) -> Result<Self, Infallible> {
        self.excluded.extend(keys);
        Ok(self)
    }

    fn count(&self) -> Result<usize, Infallible> {
        Ok(self
            .records
            .iter()
            .filter(|record| self.admits(record))
            .count())
    }

    fn iter_chunked(&self, chunk_size: usize) -> RecordStream<'_, T, Infallible> {
        Box::new(
            self.records
                .chunks(chunk_size.max(1))
                .flat_map(move |chunk| {
                    let admitted: Vec<T> = chunk
                        .iter()
                        .filter(|record| self.admits(record))
                        .cloned()
                        .collect();
                    tracing::trace!(
                        chunk = chunk.len(),
                        admitted = admitted.len(),
                        "Evaluated store chunk"
                    );
                    admitted
                })
                .map(Ok),
        )
    }
}
