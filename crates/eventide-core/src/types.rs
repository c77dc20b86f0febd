//! Repeat-rule vocabulary shared by configuration and validation.

use serde::Deserialize;

/// Rule string for a daily repetition.
pub const DAILY: &str = "RRULE:FREQ=DAILY";
/// Rule string for a weekly repetition.
pub const WEEKLY: &str = "RRULE:FREQ=WEEKLY";
/// Rule string for a monthly repetition.
pub const MONTHLY: &str = "RRULE:FREQ=MONTHLY";
/// Rule string for a yearly repetition.
pub const YEARLY: &str = "RRULE:FREQ=YEARLY";

/// A recognised repeat rule and its display label.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RepeatChoice {
    pub rule: String,
    pub label: String,
}

impl RepeatChoice {
    #[must_use]
    pub fn new(rule: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            rule: rule.into(),
            label: label.into(),
        }
    }
}

/// The vocabulary of valid `repeat_rule` values.
///
/// `None` means the vocabulary is open: any rule string is accepted and no
/// labels are known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepeatChoices {
    choices: Option<Vec<RepeatChoice>>,
}

impl RepeatChoices {
    /// ## Summary
    /// Creates a closed vocabulary from the given choices.
    #[must_use]
    pub fn new(choices: Vec<RepeatChoice>) -> Self {
        Self {
            choices: Some(choices),
        }
    }

    /// ## Summary
    /// Creates an open vocabulary that accepts any rule string.
    #[must_use]
    pub fn free_text() -> Self {
        Self { choices: None }
    }

    /// Returns `true` when no fixed vocabulary is configured.
    #[must_use]
    pub fn is_free_text(&self) -> bool {
        self.choices.is_none()
    }

    /// ## Summary
    /// Returns the configured choices, or an empty slice for an open vocabulary.
    #[must_use]
    pub fn choices(&self) -> &[RepeatChoice] {
        self.choices.as_deref().unwrap_or_default()
    }

    /// ## Summary
    /// Returns the display label of a rule, if the rule is part of the vocabulary.
    #[must_use]
    pub fn label_for(&self, rule: &str) -> Option<&str> {
        self.choices()
            .iter()
            .find(|choice| choice.rule == rule)
            .map(|choice| choice.label.as_str())
    }

    /// ## Summary
    /// Checks whether a rule string may be stored on a definition.
    ///
    /// The empty or blank rule (no repetition) is always recognised, as is
    /// every rule when the vocabulary is open.
    #[must_use]
    pub fn is_recognised(&self, rule: &str) -> bool {
        rule.trim().is_empty() || self.is_free_text() || self.label_for(rule).is_some()
    }

    /// ## Summary
    /// Maps a legacy integer frequency code to its rule string.
    ///
    /// Older data stored the repetition as an integer frequency
    /// (`0` yearly, `1` monthly, `2` weekly, `3` daily). Any other code maps
    /// to the empty rule.
    #[must_use]
    pub fn migrate_legacy(code: i32) -> &'static str {
        match code {
            0 => YEARLY,
            1 => MONTHLY,
            2 => WEEKLY,
            3 => DAILY,
            _ => "",
        }
    }
}

impl Default for RepeatChoices {
    fn default() -> Self {
        Self::new(default_choices())
    }
}

/// The built-in daily, weekly, monthly and yearly vocabulary.
#[must_use]
pub fn default_choices() -> Vec<RepeatChoice> {
    vec![
        RepeatChoice::new(DAILY, "Daily"),
        RepeatChoice::new(WEEKLY, "Weekly"),
        RepeatChoice::new(MONTHLY, "Monthly"),
        RepeatChoice::new(YEARLY, "Yearly"),
    ]
}
