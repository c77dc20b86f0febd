//! Occurrence expansion, range filtering and merging.
//!
//! A record carries an [`OccurrenceDefinition`]: a start, an optional end,
//! and an optional repeat rule. The [`OccurrenceEngine`] expands
//! definitions into lazy, bounded [`Occurrence`] sequences, narrows record
//! collections to a date window, and merges many sequences into one
//! chronological stream.
//!
//! ```text
//! RecordStore ──approximate──▶ candidates ──exact (optional)──▶ survivors
//!                                                                  │
//!                                               expand per record  ▼
//!                                          Expansion, Expansion, ...
//!                                                                  │
//!                                                     k-way merge  ▼
//!                                                    Merge (sorted, limited)
//! ```

pub mod definition;
pub mod engine;
pub mod error;
pub mod event;
pub mod expand;
pub mod filter;
pub mod merge;
pub mod source;
pub mod store;

pub use definition::{DefinitionError, Occurrence, OccurrenceDefinition};
pub use engine::OccurrenceEngine;
pub use error::{EngineError, EngineResult};
pub use event::Event;
pub use expand::{Expansion, Window};
pub use filter::AttributeFilter;
pub use merge::{Merge, merge};
pub use source::{OccurrenceSource, Record, Schedule};
pub use store::{Filterable, Keyed, RecordStore, RecordStream, memory::MemoryStore};
