//! k-way merge of chronologically ordered occurrence sequences.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::iter::FusedIterator;

use eventide_time::Zoned;

use crate::definition::Occurrence;

/// The pending head of one input sequence.
struct Head<P> {
    start: Zoned,
    index: usize,
    occurrence: Occurrence<P>,
}

impl<P> PartialEq for Head<P> {
    fn eq(&self, other: &Self) -> bool {
        self.start == other.start && self.index == other.index
    }
}

impl<P> Eq for Head<P> {}

impl<P> PartialOrd for Head<P> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<P> Ord for Head<P> {
    fn cmp(&self, other: &Self) -> Ordering {
        // reversed: BinaryHeap is a max-heap and the earliest head must win
        other
            .start
            .cmp(&self.start)
            .then_with(|| other.index.cmp(&self.index))
    }
}

/// Lazily merges sequences that are each sorted by start into one sequence
/// sorted by start.
///
/// Holds at most one occurrence per input sequence. Equal starts are
/// yielded in input order, lowest index first. The sequence that supplied
/// the last yielded item is only advanced when the next item is requested,
/// so a limit never pulls past what it returns.
pub struct Merge<P, I> {
    sources: Vec<I>,
    heap: BinaryHeap<Head<P>>,
    primed: bool,
    pending: Option<usize>,
    remaining: Option<usize>,
}

/// ## Summary
/// Merges `sequences` by start, stopping after `limit` items when given.
#[must_use]
pub fn merge<P, I>(sequences: impl IntoIterator<Item = I>, limit: Option<usize>) -> Merge<P, I>
where
    I: Iterator<Item = Occurrence<P>>,
{
    let sources: Vec<I> = sequences.into_iter().collect();
    Merge {
        heap: BinaryHeap::with_capacity(sources.len()),
        sources,
        primed: false,
        pending: None,
        remaining: limit,
    }
}

impl<P, I> Merge<P, I>
where
    I: Iterator<Item = Occurrence<P>>,
{
    fn pull(&mut self, index: usize) {
        let Some(source) = self.sources.get_mut(index) else {
            return;
        };
        if let Some(occurrence) = source.next() {
            self.heap.push(Head {
                start: occurrence.start,
                index,
                occurrence,
            });
        }
    }
}

impl<P, I> Iterator for Merge<P, I>
where
    I: Iterator<Item = Occurrence<P>>,
{
    type Item = Occurrence<P>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == Some(0) {
            return None;
        }

        if !self.primed {
            self.primed = true;
            for index in 0..self.sources.len() {
                self.pull(index);
            }
        }
        if let Some(index) = self.pending.take() {
            self.pull(index);
        }

        let head = self.heap.pop()?;
        self.pending = Some(head.index);
        if let Some(remaining) = self.remaining.as_mut() {
            *remaining -= 1;
        }
        Some(head.occurrence)
    }
}

impl<P, I> FusedIterator for Merge<P, I> where I: FusedIterator<Item = Occurrence<P>> {}
