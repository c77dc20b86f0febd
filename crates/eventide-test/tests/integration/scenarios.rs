//! The reference scenarios for expansion and merging.

use eventide_test::component::config::WEEKLY;
use eventide_test::component::{OccurrenceDefinition, Window, merge};

use super::helpers::{date, engine_at, named_store, utc};

#[test_log::test]
fn single_occurrence_inside_window() -> anyhow::Result<()> {
    let engine = engine_at(2024, 1, 1);
    let definition =
        OccurrenceDefinition::new(utc(2024, 1, 1, 10, 0)).with_end(utc(2024, 1, 1, 11, 0));
    let window = engine.window(Some(date(2024, 1, 1).into()), Some(date(2024, 1, 2).into()));

    let occurrences: Vec<_> = engine.expand(&definition, &window, 200)?.collect();

    assert_eq!(occurrences.len(), 1);
    assert_eq!(occurrences[0].start, utc(2024, 1, 1, 10, 0));
    assert_eq!(occurrences[0].end, Some(utc(2024, 1, 1, 11, 0)));
    Ok(())
}

#[test_log::test]
fn weekly_repeat_truncated_by_max_count() -> anyhow::Result<()> {
    let engine = engine_at(2024, 1, 1);
    let definition = OccurrenceDefinition::new(utc(2024, 1, 1, 9, 0)).with_repeat(WEEKLY);
    let window = engine.window(Some(date(2024, 1, 1).into()), Some(date(2024, 3, 1).into()));

    let starts: Vec<_> = engine
        .expand(&definition, &window, 3)?
        .map(|occurrence| occurrence.start)
        .collect();

    assert_eq!(
        starts,
        vec![
            utc(2024, 1, 1, 9, 0),
            utc(2024, 1, 8, 9, 0),
            utc(2024, 1, 15, 9, 0),
        ]
    );
    Ok(())
}

#[test_log::test]
fn merge_interleaves_two_definitions() -> anyhow::Result<()> {
    let engine = engine_at(2024, 1, 1);
    let first_and_fifteenth = OccurrenceDefinition::new(utc(2024, 1, 1, 9, 0))
        .with_repeat("RRULE:FREQ=MONTHLY;BYMONTHDAY=1,15")
        .with_repeat_until(date(2024, 1, 31));
    let tenth = OccurrenceDefinition::new(utc(2024, 1, 10, 9, 0));
    let window = Window::unbounded();

    let days: Vec<_> = merge(
        vec![
            engine.expand(&first_and_fifteenth, &window, 200)?,
            engine.expand(&tenth, &window, 200)?,
        ],
        None,
    )
    .map(|occurrence| occurrence.start.format("%d").to_string())
    .collect();

    assert_eq!(days, vec!["01", "10", "15"]);

    // the same through a store
    let store = named_store(vec![("fifteenth", first_and_fifteenth), ("tenth", tenth)]);
    let sources: Vec<_> = engine
        .all_occurrences(store, &window, None)?
        .map(|occurrence| occurrence.source)
        .collect();
    assert_eq!(sources, vec!["fifteenth", "tenth", "fifteenth"]);
    Ok(())
}

#[test_log::test]
fn repeat_until_before_start_is_empty() -> anyhow::Result<()> {
    let engine = engine_at(2024, 1, 1);
    let definition = OccurrenceDefinition::new(utc(2024, 1, 10, 9, 0))
        .with_repeat("RRULE:FREQ=DAILY")
        .with_repeat_until(date(2024, 1, 9));

    let mut occurrences = engine.expand(&definition, &Window::unbounded(), 200)?;
    assert!(occurrences.next().is_none());

    assert!(engine.next_occurrence(&definition, None, None)?.is_none());
    assert!(engine.first_occurrence(&definition, None)?.is_none());
    Ok(())
}
