//! Time handling for occurrence expansion.
//!
//! Zone normalisation between zone-aware and zoneless instants, the clock
//! that supplies "now", and the rule-expansion capability that turns a
//! repeat rule into repeat instants.

pub mod clock;
pub mod error;
pub mod normalize;
pub mod rule;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{TimeError, TimeResult};
pub use normalize::{TimeInput, TimeNormalizer, Zoned};
pub use rule::{RRuleEngine, Repeats, RuleEngine};
