#![allow(clippy::expect_used, dead_code)]
//! Test helpers for integration tests.
//!
//! Provides utilities for:
//! - Building engines pinned to a fixed "now"
//! - Constructing zoned instants and dates tersely
//! - Seeding in-memory stores

use chrono::{NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;

use eventide_test::component::time::{FixedClock, Zoned};
use eventide_test::component::{MemoryStore, OccurrenceDefinition, OccurrenceEngine, Record};

/// ## Summary
/// Returns an `rrule`-backed engine in UTC whose clock is stopped at
/// midnight UTC on the given day.
pub fn engine_at(year: i32, month: u32, day: u32) -> OccurrenceEngine {
    OccurrenceEngine::default().with_clock(FixedClock(
        Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
            .single()
            .expect("valid clock instant"),
    ))
}

/// A UTC instant labelled with the `Tz::UTC` zone.
pub fn utc(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> Zoned {
    Tz::UTC
        .with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .expect("valid UTC instant")
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

/// ## Summary
/// Builds a store of records whose payload is their name.
pub fn named_store(
    definitions: Vec<(&'static str, OccurrenceDefinition)>,
) -> MemoryStore<Record<&'static str>> {
    definitions
        .into_iter()
        .map(|(name, definition)| Record::new(definition, name))
        .collect()
}

/// A spread of single, spanning, repeating and bounded definitions around
/// early 2024.
pub fn mixed_definitions() -> Vec<(&'static str, OccurrenceDefinition)> {
    vec![
        (
            "single_morning",
            OccurrenceDefinition::new(utc(2024, 1, 3, 9, 0)).with_end(utc(2024, 1, 3, 10, 0)),
        ),
        (
            "open_single",
            OccurrenceDefinition::new(utc(2024, 2, 14, 18, 0)),
        ),
        (
            "multi_day",
            OccurrenceDefinition::new(utc(2024, 1, 28, 12, 0)).with_end(utc(2024, 2, 3, 12, 0)),
        ),
        (
            "daily_standup",
            OccurrenceDefinition::new(utc(2024, 1, 1, 9, 30))
                .with_end(utc(2024, 1, 1, 9, 45))
                .with_repeat("RRULE:FREQ=DAILY")
                .with_repeat_until(date(2024, 1, 12)),
        ),
        (
            "weekly_overnight",
            OccurrenceDefinition::new(utc(2024, 1, 5, 23, 0))
                .with_end(utc(2024, 1, 6, 4, 0))
                .with_repeat("RRULE:FREQ=WEEKLY")
                .with_repeat_until(date(2024, 2, 9)),
        ),
        (
            "monthly_forever",
            OccurrenceDefinition::new(utc(2023, 11, 20, 15, 0))
                .with_end(utc(2023, 11, 20, 16, 0))
                .with_repeat("RRULE:FREQ=MONTHLY"),
        ),
        (
            "yearly",
            OccurrenceDefinition::new(utc(2022, 3, 1, 0, 0)).with_repeat("RRULE:FREQ=YEARLY"),
        ),
        (
            "until_before_start",
            OccurrenceDefinition::new(utc(2024, 1, 10, 8, 0))
                .with_repeat("RRULE:FREQ=DAILY")
                .with_repeat_until(date(2024, 1, 9)),
        ),
        (
            "reversed",
            OccurrenceDefinition::new(utc(2024, 1, 20, 10, 0)).with_end(utc(2024, 1, 20, 8, 0)),
        ),
    ]
}
