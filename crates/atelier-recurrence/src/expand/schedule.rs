//! Rule → recurrence-set construction.
//!
//! Renders a rule as a `DTSTART`/`RRULE` pair and parses it with the
//! `rrule` crate, anchoring the set so weekly/monthly phase alignment
//! follows the series start combined with the rule's start time.

use chrono::{DateTime, NaiveTime, Utc};
use rrule::RRuleSet;

use atelier_core::types::{Frequency, Weekday};

use crate::error::{RecurrenceError, RecurrenceResult};
use crate::model::rule::RecurrenceRule;

/// Weekday number → generator weekday token (RFC 5545 `BYDAY`).
#[must_use]
pub const fn weekday_token(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Sunday => "SU",
        Weekday::Monday => "MO",
        Weekday::Tuesday => "TU",
        Weekday::Wednesday => "WE",
        Weekday::Thursday => "TH",
        Weekday::Friday => "FR",
        Weekday::Saturday => "SA",
    }
}

/// ## Summary
/// Builds the validated recurrence set for a rule.
///
/// `DTSTART` is the series start at the rule's start time, `UNTIL` the
/// series end at end-of-day, so the series bounds clamp every expansion.
/// The week starts on Sunday to match the weekday numbering. For monthly
/// rules each `BYDAY` entry carries the nth-of-month prefix (`2MO`,
/// `-1FR`): "the nth occurrence of each selected weekday per month"
/// instead of "every matching weekday".
///
/// ## Errors
/// Returns `RecurrenceError::Build` if the `rrule` crate rejects the
/// combination; validated rules are not expected to be rejected.
pub fn build_rule_set(rule: &RecurrenceRule) -> RecurrenceResult<RRuleSet> {
    let dtstart = utc_instant(rule.series_start.and_time(rule.start_time));
    let until = utc_instant(rule.series_end.and_time(end_of_day()));

    let by_day: Vec<String> = if rule.frequency == Frequency::Monthly {
        let nth = rule.effective_nth_of_month().offset();
        rule.weekdays
            .iter()
            .map(|weekday| format!("{nth}{}", weekday_token(*weekday)))
            .collect()
    } else {
        rule.weekdays
            .iter()
            .map(|weekday| weekday_token(*weekday).to_string())
            .collect()
    };

    let rrule_set = format!(
        "DTSTART:{}\nRRULE:FREQ={};INTERVAL=1;WKST=SU;UNTIL={};BYDAY={}",
        dtstart.format("%Y%m%dT%H%M%SZ"),
        rule.frequency,
        until.format("%Y%m%dT%H%M%SZ"),
        by_day.join(","),
    );

    rrule_set
        .parse::<RRuleSet>()
        .map_err(|err| RecurrenceError::Build(err.to_string()))
}

fn utc_instant(naive: chrono::NaiveDateTime) -> DateTime<Utc> {
    DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc)
}

fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN)
}
