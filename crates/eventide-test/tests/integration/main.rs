//! Cross-crate integration tests for the occurrence engine.

mod expansion_cases;
mod helpers;
mod scenarios;
