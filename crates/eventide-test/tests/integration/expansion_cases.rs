use chrono::{TimeZone, Utc};
use eventide_test::component::time::FixedClock;
use eventide_test::component::{OccurrenceDefinition, OccurrenceEngine, Window};

include!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../eventide-engine/tests/expansion_cases_data/mod.rs"
));

/// ## Summary
/// Integration-level validation of expansion behaviour using shared cases.
#[test_log::test]
fn expansion_cases_integration() {
    let engine = OccurrenceEngine::default().with_clock(FixedClock(
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0)
            .single()
            .expect("valid clock instant"),
    ));
    for case in expansion_cases() {
        assert_case(&engine, &case);
    }
}
