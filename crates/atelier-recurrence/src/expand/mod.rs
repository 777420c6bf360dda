//! Occurrence expansion: runs a rule's recurrence set over an instant
//! window, then materializes each generated instant into a full occurrence.

pub mod schedule;

use chrono::{DateTime, TimeDelta, Utc};
use rrule::Tz;

use crate::error::RecurrenceResult;
use crate::identity::OccurrenceId;
use crate::model::event::Occurrence;
use crate::model::rule::RecurrenceRule;

/// Default safety cap on occurrences generated per rule per query.
pub const DEFAULT_MAX_INSTANCES: u16 = 1000;

/// Cap for single-occurrence regeneration; the resolver window spans three
/// days at most.
const RESOLVE_MAX_INSTANCES: u16 = 32;

/// ## Summary
/// Generates the ordered, deduplicated instants at which a rule fires
/// within the inclusive `[after, before]` window.
///
/// The same rule and window always yield the same sequence; there is no
/// hidden cursor. A window in which the rule never fires produces an empty
/// result, not an error. Expansion past `max_instances` is truncated with a
/// warning.
///
/// ## Errors
/// Returns `RecurrenceError::Build` if the recurrence set cannot be
/// constructed from the rule.
pub fn expansion_instants(
    rule: &RecurrenceRule,
    after: DateTime<Utc>,
    before: DateTime<Utc>,
    max_instances: u16,
) -> RecurrenceResult<Vec<DateTime<Utc>>> {
    let set = schedule::build_rule_set(rule)?
        .after(after.with_timezone(&Tz::Tz(chrono_tz::UTC)))
        .before(before.with_timezone(&Tz::Tz(chrono_tz::UTC)));

    let result = set.all(max_instances);
    if result.limited {
        tracing::warn!(
            rule_id = %rule.id,
            max_instances,
            "expansion truncated at instance cap"
        );
    }

    let mut instants: Vec<DateTime<Utc>> = result
        .dates
        .into_iter()
        .map(|instant| instant.with_timezone(&Utc))
        .collect();
    instants.sort_unstable();
    instants.dedup();

    tracing::trace!(
        rule_id = %rule.id,
        %after,
        %before,
        count = instants.len(),
        "expanded rule window"
    );

    Ok(instants)
}

/// ## Summary
/// Materializes a generated instant into a full occurrence.
///
/// The occurrence id is assigned from the unmodified generator instant;
/// start and end are rebuilt from the rule's time-of-day window on the
/// occurrence's calendar date (same date, no overnight spans).
#[must_use]
pub fn materialize(rule: &RecurrenceRule, instant: DateTime<Utc>) -> Occurrence {
    let date = instant.date_naive();
    let start =
        DateTime::<Utc>::from_naive_utc_and_offset(date.and_time(rule.start_time), Utc);
    let end = DateTime::<Utc>::from_naive_utc_and_offset(date.and_time(rule.end_time), Utc);

    Occurrence {
        id: OccurrenceId::new(rule.id, instant),
        title: rule.title.clone(),
        start,
        end,
        workshop_ids: rule.workshop_ids.clone(),
        project_owner_id: rule.project_owner_id,
        facilitator_ids: rule.facilitator_ids.clone(),
        is_recurring: true,
        rule_id: rule.id,
    }
}

/// ## Summary
/// Expands and materializes every occurrence of a rule within the inclusive
/// `[after, before]` window.
///
/// ## Errors
/// Propagates recurrence-set construction failures.
pub fn occurrences_between(
    rule: &RecurrenceRule,
    after: DateTime<Utc>,
    before: DateTime<Utc>,
    max_instances: u16,
) -> RecurrenceResult<Vec<Occurrence>> {
    Ok(expansion_instants(rule, after, before, max_instances)?
        .into_iter()
        .map(|instant| materialize(rule, instant))
        .collect())
}

/// ## Summary
/// Regenerates the single occurrence a composite id addresses, if the rule
/// actually fires at the id's instant.
///
/// The window spans one day to each side of the target so the lookup does
/// not depend on bound inclusivity; the match requires the regenerated id
/// to equal the requested one exactly, which rejects stale or fabricated
/// ids (wrong date, wrong time-of-day, edited rule).
///
/// ## Errors
/// Propagates recurrence-set construction failures.
pub fn occurrence_at(
    rule: &RecurrenceRule,
    id: &OccurrenceId,
) -> RecurrenceResult<Option<Occurrence>> {
    let after = id.instant() - TimeDelta::days(1);
    let before = id.instant() + TimeDelta::days(1);

    Ok(
        occurrences_between(rule, after, before, RESOLVE_MAX_INSTANCES)?
            .into_iter()
            .find(|occurrence| occurrence.id == *id),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use atelier_core::types::{Frequency, NthOfMonth, Weekday};
    use chrono::{NaiveDate, NaiveTime};
    use uuid::Uuid;

    fn rule(
        frequency: Frequency,
        weekdays: &[Weekday],
        nth_of_month: Option<NthOfMonth>,
        series_start: &str,
        series_end: &str,
    ) -> RecurrenceRule {
        RecurrenceRule {
            id: Uuid::parse_str("a7f8c6a2-1b7d-4f7e-9c3a-2e8b5d4f6a01").unwrap(),
            title: "Traitement de texte".to_string(),
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(10, 30, 0).unwrap(),
            frequency,
            weekdays: weekdays.to_vec(),
            nth_of_month,
            series_start: series_start.parse::<NaiveDate>().unwrap(),
            series_end: series_end.parse::<NaiveDate>().unwrap(),
            workshop_ids: vec![Uuid::new_v4()],
            project_owner_id: Uuid::new_v4(),
            facilitator_ids: vec![Uuid::new_v4()],
        }
    }

    fn instant(text: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(text)
            .unwrap()
            .with_timezone(&Utc)
    }

    fn dates_of(instants: &[DateTime<Utc>]) -> Vec<String> {
        instants
            .iter()
            .map(|dt| dt.date_naive().to_string())
            .collect()
    }

    struct ExpansionCase {
        name: &'static str,
        frequency: Frequency,
        weekdays: &'static [Weekday],
        nth_of_month: Option<NthOfMonth>,
        series: (&'static str, &'static str),
        window: (&'static str, &'static str),
        expected_dates: &'static [&'static str],
    }

    #[expect(clippy::too_many_lines)]
    fn expansion_cases() -> Vec<ExpansionCase> {
        vec![
            ExpansionCase {
                name: "weekly_mon_wed_july",
                frequency: Frequency::Weekly,
                weekdays: &[Weekday::Monday, Weekday::Wednesday],
                nth_of_month: None,
                series: ("2025-07-01", "2025-07-31"),
                window: ("2025-07-01T00:00:00Z", "2025-07-31T23:59:59Z"),
                // July 2025 starts on a Tuesday; the series start itself is
                // not a firing date.
                expected_dates: &[
                    "2025-07-02",
                    "2025-07-07",
                    "2025-07-09",
                    "2025-07-14",
                    "2025-07-16",
                    "2025-07-21",
                    "2025-07-23",
                    "2025-07-28",
                    "2025-07-30",
                ],
            },
            ExpansionCase {
                name: "daily_business_days",
                frequency: Frequency::Daily,
                weekdays: &[
                    Weekday::Monday,
                    Weekday::Tuesday,
                    Weekday::Wednesday,
                    Weekday::Thursday,
                    Weekday::Friday,
                ],
                nth_of_month: None,
                series: ("2025-07-07", "2025-07-18"),
                window: ("2025-07-01T00:00:00Z", "2025-07-31T23:59:59Z"),
                expected_dates: &[
                    "2025-07-07",
                    "2025-07-08",
                    "2025-07-09",
                    "2025-07-10",
                    "2025-07-11",
                    "2025-07-14",
                    "2025-07-15",
                    "2025-07-16",
                    "2025-07-17",
                    "2025-07-18",
                ],
            },
            ExpansionCase {
                name: "monthly_second_monday",
                frequency: Frequency::Monthly,
                weekdays: &[Weekday::Monday],
                nth_of_month: Some(NthOfMonth::Second),
                series: ("2025-07-01", "2025-12-15"),
                window: ("2025-07-01T00:00:00Z", "2025-12-31T23:59:59Z"),
                // December's 2nd Monday (12-08) precedes the series end of
                // 12-15, so it is included.
                expected_dates: &[
                    "2025-07-14",
                    "2025-08-11",
                    "2025-09-08",
                    "2025-10-13",
                    "2025-11-10",
                    "2025-12-08",
                ],
            },
            ExpansionCase {
                name: "monthly_last_friday",
                frequency: Frequency::Monthly,
                weekdays: &[Weekday::Friday],
                nth_of_month: Some(NthOfMonth::Last),
                series: ("2025-02-01", "2025-02-28"),
                window: ("2025-02-01T00:00:00Z", "2025-02-28T23:59:59Z"),
                expected_dates: &["2025-02-28"],
            },
            ExpansionCase {
                name: "monthly_fifth_monday_never_fires",
                frequency: Frequency::Monthly,
                weekdays: &[Weekday::Monday],
                nth_of_month: Some(NthOfMonth::Fifth),
                series: ("2025-02-01", "2025-02-28"),
                window: ("2025-02-01T00:00:00Z", "2025-02-28T23:59:59Z"),
                // February 2025 has four Mondays; no occurrence, no error.
                expected_dates: &[],
            },
        ]
    }

    #[test_log::test]
    fn test_expansion_cases() {
        for case in expansion_cases() {
            let rule = rule(
                case.frequency,
                case.weekdays,
                case.nth_of_month,
                case.series.0,
                case.series.1,
            );
            let instants = expansion_instants(
                &rule,
                instant(case.window.0),
                instant(case.window.1),
                DEFAULT_MAX_INSTANCES,
            )
            .unwrap();

            assert_eq!(
                dates_of(&instants),
                case.expected_dates,
                "case {}",
                case.name
            );
        }
    }

    #[test_log::test]
    fn test_expansion_is_deterministic() {
        let rule = rule(
            Frequency::Weekly,
            &[Weekday::Monday, Weekday::Wednesday],
            None,
            "2025-07-01",
            "2025-07-31",
        );
        let after = instant("2025-07-01T00:00:00Z");
        let before = instant("2025-07-31T23:59:59Z");

        let first = expansion_instants(&rule, after, before, DEFAULT_MAX_INSTANCES).unwrap();
        let second = expansion_instants(&rule, after, before, DEFAULT_MAX_INSTANCES).unwrap();
        assert_eq!(first, second);
    }

    #[test_log::test]
    fn test_generated_instants_carry_the_start_time() {
        let rule = rule(
            Frequency::Weekly,
            &[Weekday::Monday],
            None,
            "2025-07-01",
            "2025-07-31",
        );
        let instants = expansion_instants(
            &rule,
            instant("2025-07-01T00:00:00Z"),
            instant("2025-07-31T23:59:59Z"),
            DEFAULT_MAX_INSTANCES,
        )
        .unwrap();

        assert_eq!(instants[0], instant("2025-07-07T09:00:00Z"));
    }

    #[test_log::test]
    fn test_window_containment() {
        let rule = rule(
            Frequency::Daily,
            &[
                Weekday::Sunday,
                Weekday::Monday,
                Weekday::Tuesday,
                Weekday::Wednesday,
                Weekday::Thursday,
                Weekday::Friday,
                Weekday::Saturday,
            ],
            None,
            "2025-07-01",
            "2025-07-31",
        );
        let after = instant("2025-07-10T00:00:00Z");
        let before = instant("2025-07-20T23:59:59Z");

        let instants =
            expansion_instants(&rule, after, before, DEFAULT_MAX_INSTANCES).unwrap();
        assert_eq!(instants.len(), 11);
        for dt in &instants {
            assert!(*dt >= after && *dt <= before);
            let date = dt.date_naive();
            assert!(date >= rule.series_start && date <= rule.series_end);
        }
    }

    #[test_log::test]
    fn test_boundary_date_requires_one_day_extension() {
        let rule = rule(
            Frequency::Daily,
            &[
                Weekday::Sunday,
                Weekday::Monday,
                Weekday::Tuesday,
                Weekday::Wednesday,
                Weekday::Thursday,
                Weekday::Friday,
                Weekday::Saturday,
            ],
            None,
            "2025-07-01",
            "2025-07-31",
        );
        let after = instant("2025-07-01T00:00:00Z");
        // A midnight cutover at the query end silently drops that date's
        // 09:00 firing; callers extend the window by one day.
        let cutover = instant("2025-07-15T00:00:00Z");

        let clipped =
            expansion_instants(&rule, after, cutover, DEFAULT_MAX_INSTANCES).unwrap();
        assert_eq!(dates_of(&clipped).last().map(String::as_str), Some("2025-07-14"));

        let extended = expansion_instants(
            &rule,
            after,
            cutover + TimeDelta::days(1),
            DEFAULT_MAX_INSTANCES,
        )
        .unwrap();
        assert_eq!(
            dates_of(&extended).last().map(String::as_str),
            Some("2025-07-15")
        );
    }

    #[test_log::test]
    fn test_expansion_respects_instance_cap() {
        let rule = rule(
            Frequency::Daily,
            &[
                Weekday::Sunday,
                Weekday::Monday,
                Weekday::Tuesday,
                Weekday::Wednesday,
                Weekday::Thursday,
                Weekday::Friday,
                Weekday::Saturday,
            ],
            None,
            "2025-01-01",
            "2025-12-31",
        );
        let instants = expansion_instants(
            &rule,
            instant("2025-01-01T00:00:00Z"),
            instant("2025-12-31T23:59:59Z"),
            5,
        )
        .unwrap();
        assert_eq!(instants.len(), 5);
    }

    #[test_log::test]
    fn test_materialize_builds_start_end_and_id() {
        let rule = rule(
            Frequency::Weekly,
            &[Weekday::Monday],
            None,
            "2025-07-01",
            "2025-07-31",
        );
        let generated = instant("2025-07-14T09:00:00Z");

        let occurrence = materialize(&rule, generated);
        assert_eq!(occurrence.start, instant("2025-07-14T09:00:00Z"));
        assert_eq!(occurrence.end, instant("2025-07-14T10:30:00Z"));
        assert!(occurrence.is_recurring);
        assert_eq!(occurrence.rule_id, rule.id);
        assert_eq!(
            occurrence.id.to_string(),
            format!("{}-2025-07-14T09:00:00.000Z", rule.id)
        );
    }

    #[test_log::test]
    fn test_occurrence_at_round_trips_generated_ids() {
        let rule = rule(
            Frequency::Monthly,
            &[Weekday::Monday],
            Some(NthOfMonth::Second),
            "2025-07-01",
            "2025-12-15",
        );
        let occurrences = occurrences_between(
            &rule,
            instant("2025-07-01T00:00:00Z"),
            instant("2025-12-31T23:59:59Z"),
            DEFAULT_MAX_INSTANCES,
        )
        .unwrap();
        assert_eq!(occurrences.len(), 6);

        for occurrence in &occurrences {
            let resolved = occurrence_at(&rule, &occurrence.id).unwrap();
            assert_eq!(resolved.as_ref(), Some(occurrence));
        }
    }

    #[test_log::test]
    fn test_occurrence_at_rejects_non_firing_instants() {
        let rule = rule(
            Frequency::Weekly,
            &[Weekday::Monday, Weekday::Wednesday],
            None,
            "2025-07-01",
            "2025-07-31",
        );

        // 2025-07-15 is a Tuesday; the rule never fires there.
        let stale = OccurrenceId::new(rule.id, instant("2025-07-15T09:00:00Z"));
        assert_eq!(occurrence_at(&rule, &stale).unwrap(), None);

        // Right date, wrong embedded time-of-day: still not this rule's id.
        let wrong_time = OccurrenceId::new(rule.id, instant("2025-07-14T00:00:00Z"));
        assert_eq!(occurrence_at(&rule, &wrong_time).unwrap(), None);
    }
}
