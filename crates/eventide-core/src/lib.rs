//! Shared configuration, error and vocabulary types for the eventide workspace.

pub mod config;
pub mod error;
pub mod types;
