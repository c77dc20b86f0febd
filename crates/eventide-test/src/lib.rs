//! Eventide occurrence engine - integration test support.
//!
//! This crate re-exports the workspace crates so integration tests can use
//! `eventide_test::component::` paths.

pub mod component {
    pub use eventide_engine::*;

    pub mod config {
        pub use eventide_core::config::*;
        pub use eventide_core::types::*;
    }

    pub mod time {
        pub use eventide_time::*;
    }
}
