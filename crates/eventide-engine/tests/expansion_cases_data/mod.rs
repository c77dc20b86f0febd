use chrono::{DateTime, NaiveDate};

pub struct ExpansionCase {
    pub name: &'static str,
    pub start: &'static str,
    pub end: Option<&'static str>,
    pub repeat: &'static str,
    pub repeat_until: Option<&'static str>,
    pub from: Option<&'static str>,
    pub to: Option<&'static str>,
    pub max_count: usize,
    pub expected: &'static [&'static str],
}

#[expect(clippy::too_many_lines)]
pub fn expansion_cases() -> Vec<ExpansionCase> {
    vec![
        ExpansionCase {
            name: "single_in_window",
            start: "2024-01-01T10:00:00+00:00",
            end: Some("2024-01-01T11:00:00+00:00"),
            repeat: "",
            repeat_until: None,
            from: Some("2024-01-01T00:00:00+00:00"),
            to: Some("2024-01-02T23:59:59+00:00"),
            max_count: 200,
            expected: &["2024-01-01T10:00:00+00:00"],
        },
        ExpansionCase {
            name: "single_after_window",
            start: "2024-01-05T10:00:00+00:00",
            end: Some("2024-01-05T11:00:00+00:00"),
            repeat: "",
            repeat_until: None,
            from: Some("2024-01-01T00:00:00+00:00"),
            to: Some("2024-01-02T23:59:59+00:00"),
            max_count: 200,
            expected: &[],
        },
        ExpansionCase {
            name: "single_ended_before_window",
            start: "2023-12-30T10:00:00+00:00",
            end: Some("2023-12-31T10:00:00+00:00"),
            repeat: "",
            repeat_until: None,
            from: Some("2024-01-01T00:00:00+00:00"),
            to: None,
            max_count: 200,
            expected: &[],
        },
        ExpansionCase {
            name: "single_start_equals_to",
            start: "2024-01-02T23:59:59+00:00",
            end: None,
            repeat: "",
            repeat_until: None,
            from: Some("2024-01-01T00:00:00+00:00"),
            to: Some("2024-01-02T23:59:59+00:00"),
            max_count: 200,
            expected: &["2024-01-02T23:59:59+00:00"],
        },
        ExpansionCase {
            name: "single_end_equals_from",
            start: "2023-12-31T22:00:00+00:00",
            end: Some("2024-01-01T00:00:00+00:00"),
            repeat: "",
            repeat_until: None,
            from: Some("2024-01-01T00:00:00+00:00"),
            to: None,
            max_count: 200,
            expected: &["2023-12-31T22:00:00+00:00"],
        },
        ExpansionCase {
            name: "weekly_max_count",
            start: "2024-01-01T09:00:00+00:00",
            end: None,
            repeat: "RRULE:FREQ=WEEKLY",
            repeat_until: None,
            from: Some("2024-01-01T00:00:00+00:00"),
            to: Some("2024-03-01T23:59:59+00:00"),
            max_count: 3,
            expected: &[
                "2024-01-01T09:00:00+00:00",
                "2024-01-08T09:00:00+00:00",
                "2024-01-15T09:00:00+00:00",
            ],
        },
        ExpansionCase {
            name: "daily_until",
            start: "2024-01-01T09:00:00+00:00",
            end: Some("2024-01-01T10:00:00+00:00"),
            repeat: "RRULE:FREQ=DAILY",
            repeat_until: Some("2024-01-03"),
            from: None,
            to: None,
            max_count: 200,
            expected: &[
                "2024-01-01T09:00:00+00:00",
                "2024-01-02T09:00:00+00:00",
                "2024-01-03T09:00:00+00:00",
            ],
        },
        ExpansionCase {
            name: "until_before_start",
            start: "2024-01-10T09:00:00+00:00",
            end: None,
            repeat: "RRULE:FREQ=DAILY",
            repeat_until: Some("2024-01-09"),
            from: None,
            to: None,
            max_count: 200,
            expected: &[],
        },
        ExpansionCase {
            name: "window_before_start",
            start: "2024-06-01T09:00:00+00:00",
            end: None,
            repeat: "RRULE:FREQ=DAILY",
            repeat_until: None,
            from: Some("2024-01-01T00:00:00+00:00"),
            to: Some("2024-01-31T23:59:59+00:00"),
            max_count: 200,
            expected: &[],
        },
        ExpansionCase {
            name: "monthly_mid_window",
            start: "2024-01-15T12:00:00+00:00",
            end: None,
            repeat: "RRULE:FREQ=MONTHLY",
            repeat_until: None,
            from: Some("2024-03-01T00:00:00+00:00"),
            to: Some("2024-05-31T23:59:59+00:00"),
            max_count: 200,
            expected: &[
                "2024-03-15T12:00:00+00:00",
                "2024-04-15T12:00:00+00:00",
                "2024-05-15T12:00:00+00:00",
            ],
        },
        ExpansionCase {
            name: "interval_without_prefix",
            start: "2024-01-01T08:00:00+00:00",
            end: None,
            repeat: "FREQ=DAILY;INTERVAL=2",
            repeat_until: None,
            from: Some("2024-01-01T00:00:00+00:00"),
            to: Some("2024-01-07T23:59:59+00:00"),
            max_count: 200,
            expected: &[
                "2024-01-01T08:00:00+00:00",
                "2024-01-03T08:00:00+00:00",
                "2024-01-05T08:00:00+00:00",
                "2024-01-07T08:00:00+00:00",
            ],
        },
        ExpansionCase {
            name: "rule_count",
            start: "2012-02-01T09:30:00+00:00",
            end: None,
            repeat: "RRULE:FREQ=DAILY;COUNT=3",
            repeat_until: None,
            from: None,
            to: None,
            max_count: 200,
            expected: &[
                "2012-02-01T09:30:00+00:00",
                "2012-02-02T09:30:00+00:00",
                "2012-02-03T09:30:00+00:00",
            ],
        },
        ExpansionCase {
            name: "yearly_on_leap_day",
            start: "2020-02-29T00:00:00+00:00",
            end: None,
            repeat: "RRULE:FREQ=YEARLY",
            repeat_until: Some("2029-12-31"),
            from: None,
            to: None,
            max_count: 200,
            expected: &["2020-02-29T00:00:00+00:00", "2024-02-29T00:00:00+00:00", "2028-02-29T00:00:00+00:00"],
        },
    ]
}

pub fn assert_case(engine: &OccurrenceEngine, case: &ExpansionCase) {
    let mut definition = OccurrenceDefinition::new(parse_instant(case.start)).with_repeat(case.repeat);
    if let Some(end) = case.end {
        definition = definition.with_end(parse_instant(end));
    }
    if let Some(until) = case.repeat_until {
        let until = NaiveDate::parse_from_str(until, "%Y-%m-%d")
            .unwrap_or_else(|err| panic!("Failed to parse date {until}: {err}"));
        definition = definition.with_repeat_until(until);
    }

    let window = Window::new(case.from.map(parse_instant), case.to.map(parse_instant));

    let actual: Vec<i64> = engine
        .expand(&definition, &window, case.max_count)
        .unwrap_or_else(|err| panic!("Failed to expand {}: {}", case.name, err))
        .map(|occurrence| occurrence.start.timestamp())
        .collect();

    let expected: Vec<i64> = case
        .expected
        .iter()
        .map(|value| parse_instant(value).timestamp())
        .collect();

    assert_eq!(actual, expected, "Case {} did not match", case.name);
}

fn parse_instant(value: &str) -> DateTime<chrono_tz::Tz> {
    DateTime::parse_from_rfc3339(value)
        .unwrap_or_else(|err| panic!("Failed to parse rfc3339 value {value}: {err}"))
        .with_timezone(&chrono_tz::Tz::UTC)
}
