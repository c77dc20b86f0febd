//! Repeat-rule expansion capability.
//!
//! Rule engines work on zoneless instants only. Callers convert their
//! bounds with a [`crate::TimeNormalizer`] before asking for repeats and
//! re-zone every instant that comes back.

use std::collections::VecDeque;

use chrono::{DateTime, NaiveDateTime, TimeDelta};
use rrule::{RRule, RRuleSet, Tz, Unvalidated};

use crate::error::{TimeError, TimeResult};

/// Ascending zoneless repeat instants produced by a [`RuleEngine`].
pub type Repeats = Box<dyn Iterator<Item = NaiveDateTime>>;

/// Turns a start instant and a repeat rule into repeat instants.
pub trait RuleEngine {
    /// ## Summary
    /// Returns the repeat instants of `rule`, anchored at `dtstart`, that
    /// fall within `[after, before]` (both ends inclusive), in ascending
    /// order.
    ///
    /// Instants must be produced lazily: nothing past what the caller pulls
    /// may be requested from the underlying rule evaluation.
    ///
    /// ## Errors
    /// Returns `TimeError::InvalidRule` if the rule cannot be parsed or built.
    fn between(
        &self,
        dtstart: NaiveDateTime,
        rule: &str,
        after: NaiveDateTime,
        before: NaiveDateTime,
    ) -> TimeResult<Repeats>;
}

/// Smallest page requested from `rrule`.
const MIN_PAGE: u16 = 4;
/// Largest page requested from `rrule`.
const MAX_PAGE: u16 = 256;

/// [`RuleEngine`] backed by the `rrule` crate.
///
/// Rule strings are RFC 5545 `RRULE` values, with or without the `RRULE:`
/// prefix.
#[derive(Debug, Clone, Copy, Default)]
pub struct RRuleEngine;

impl RRuleEngine {
    /// ## Summary
    /// Parses and validates `rule` against a zoneless `dtstart`.
    ///
    /// ## Errors
    /// Returns `TimeError::InvalidRule` if `rrule` rejects the rule.
    pub fn build(dtstart: NaiveDateTime, rule: &str) -> TimeResult<RRuleSet> {
        let text = strip_rule_prefix(rule);
        let rrule = text
            .parse::<RRule<Unvalidated>>()
            .map_err(|err| invalid_rule(rule, &err))?;
        rrule
            .build(carrier(dtstart))
            .map_err(|err| invalid_rule(rule, &err))
    }
}

impl RuleEngine for RRuleEngine {
    fn between(
        &self,
        dtstart: NaiveDateTime,
        rule: &str,
        after: NaiveDateTime,
        before: NaiveDateTime,
    ) -> TimeResult<Repeats> {
        let set = Self::build(dtstart, rule)?;
        tracing::trace!(rule = %rule, %dtstart, %after, %before, "Expanding repeat rule");
        Ok(Box::new(RepeatPager::new(set, after, before)))
    }
}

/// Lazily walks an `RRuleSet` one page at a time.
///
/// `RRuleSet` only iterates by reference, so the pager owns the set and asks
/// for successive pages starting after the last instant it handed out. Pages
/// start small and double, so a caller that wants one instant costs one
/// small page.
struct RepeatPager {
    set: RRuleSet,
    after: NaiveDateTime,
    before: NaiveDateTime,
    cursor: Option<NaiveDateTime>,
    buffer: VecDeque<NaiveDateTime>,
    page: u16,
    exhausted: bool,
}

impl RepeatPager {
    fn new(set: RRuleSet, after: NaiveDateTime, before: NaiveDateTime) -> Self {
        // `before` is widened by a second so the bound is inclusive whichever
        // way `rrule` treats it; the overshoot is filtered below.
        let set = set.before(carrier(
            before
                .checked_add_signed(TimeDelta::seconds(1))
                .unwrap_or(before),
        ));
        Self {
            set,
            after,
            before,
            cursor: None,
            buffer: VecDeque::new(),
            page: MIN_PAGE,
            exhausted: before < after,
        }
    }

    fn fetch_page(&mut self) {
        let anchor = self
            .cursor
            .unwrap_or_else(|| {
                self.after
                    .checked_sub_signed(TimeDelta::seconds(1))
                    .unwrap_or(self.after)
            });
        let dates = self.set.clone().after(carrier(anchor)).all(self.page).dates;

        if dates.len() < usize::from(self.page) {
            self.exhausted = true;
        }

        for date in dates {
            let naive = date.naive_utc();
            if naive > self.before {
                self.exhausted = true;
                break;
            }
            let fresh = match self.cursor {
                Some(cursor) => naive > cursor,
                None => naive >= self.after,
            };
            if fresh {
                self.buffer.push_back(naive);
            }
        }

        self.page = self.page.saturating_mul(2).min(MAX_PAGE);
    }
}

impl Iterator for RepeatPager {
    type Item = NaiveDateTime;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(next) = self.buffer.pop_front() {
                self.cursor = Some(next);
                return Some(next);
            }
            if self.exhausted {
                return None;
            }
            self.fetch_page();
        }
    }
}

/// Labels a zoneless instant as UTC so `rrule` can work on it without any
/// offset arithmetic.
fn carrier(naive: NaiveDateTime) -> DateTime<Tz> {
    naive.and_utc().with_timezone(&Tz::UTC)
}

fn strip_rule_prefix(rule: &str) -> &str {
    let trimmed = rule.trim();
    match trimmed.get(..6) {
        Some(prefix) if prefix.eq_ignore_ascii_case("RRULE:") => &trimmed[6..],
        _ => trimmed,
    }
}

fn invalid_rule(rule: &str, err: &impl std::fmt::Display) -> TimeError {
    TimeError::InvalidRule {
        rule: rule.to_string(),
        reason: err.to_string(),
    }
}
