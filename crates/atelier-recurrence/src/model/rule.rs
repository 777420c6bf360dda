//! The recurrence rule ("series") model and its intake shape.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use atelier_core::types::{Frequency, NthOfMonth, Weekday};

use crate::error::{RecurrenceError, RecurrenceResult};

/// A persisted series definition.
///
/// Each occurrence of the series uses `start_time`/`end_time` as wall-clock
/// bounds on its own calendar date; `series_start`/`series_end` bound the
/// series itself (end-of-day implied for `series_end`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurrenceRule {
    pub id: Uuid,
    pub title: String,
    /// Time-of-day each occurrence starts, wire format `HH:MM`.
    #[serde(with = "hh_mm")]
    pub start_time: NaiveTime,
    /// Time-of-day each occurrence ends, same calendar date as the start.
    #[serde(with = "hh_mm")]
    pub end_time: NaiveTime,
    pub frequency: Frequency,
    /// Non-empty, deduplicated. `0 = Sunday`.
    pub weekdays: Vec<Weekday>,
    /// Meaningful only for monthly rules; absent values are normalized to
    /// `First` before the rule is persisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nth_of_month: Option<NthOfMonth>,
    pub series_start: NaiveDate,
    pub series_end: NaiveDate,
    /// Non-empty; the first entry is the primary workshop.
    pub workshop_ids: Vec<Uuid>,
    pub project_owner_id: Uuid,
    pub facilitator_ids: Vec<Uuid>,
}

impl RecurrenceRule {
    /// Backward-compatible single-workshop view for consumers that predate
    /// multi-workshop rules.
    #[must_use]
    pub fn primary_workshop_id(&self) -> Option<Uuid> {
        self.workshop_ids.first().copied()
    }

    /// The nth-of-month selector a monthly rule fires on. Rules persisted
    /// without one fall back to the first occurrence of each weekday.
    #[must_use]
    pub fn effective_nth_of_month(&self) -> NthOfMonth {
        self.nth_of_month.unwrap_or(NthOfMonth::First)
    }
}

/// Intake shape for creating or replacing a rule; no id yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRecurrenceRule {
    pub title: String,
    #[serde(with = "hh_mm")]
    pub start_time: NaiveTime,
    #[serde(with = "hh_mm")]
    pub end_time: NaiveTime,
    pub frequency: Frequency,
    pub weekdays: Vec<Weekday>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nth_of_month: Option<NthOfMonth>,
    pub series_start: NaiveDate,
    pub series_end: NaiveDate,
    pub workshop_ids: Vec<Uuid>,
    pub project_owner_id: Uuid,
    pub facilitator_ids: Vec<Uuid>,
}

impl NewRecurrenceRule {
    /// ## Summary
    /// Normalizes intake data: sorts and deduplicates the weekday set and
    /// defaults a monthly rule's missing `nth_of_month` to `First`.
    pub fn normalize(&mut self) {
        self.weekdays.sort_unstable();
        self.weekdays.dedup();
        if self.frequency == Frequency::Monthly && self.nth_of_month.is_none() {
            self.nth_of_month = Some(NthOfMonth::First);
        }
    }

    /// ## Summary
    /// Checks the rule invariants: series end after series start, end time
    /// after start time (no overnight spans), at least one weekday and one
    /// workshop.
    ///
    /// ## Errors
    /// Returns the first violated invariant.
    pub fn validate(&self) -> RecurrenceResult<()> {
        if self.series_end <= self.series_start {
            return Err(RecurrenceError::InvalidRuleWindow {
                start: self.series_start,
                end: self.series_end,
            });
        }
        if self.end_time <= self.start_time {
            return Err(RecurrenceError::InvalidTimeWindow {
                start: self.start_time,
                end: self.end_time,
            });
        }
        if self.weekdays.is_empty() {
            return Err(RecurrenceError::EmptyWeekdays);
        }
        if self.workshop_ids.is_empty() {
            return Err(RecurrenceError::MissingWorkshops);
        }
        Ok(())
    }

    /// Attaches an id, producing the persisted shape.
    #[must_use]
    pub fn into_rule(self, id: Uuid) -> RecurrenceRule {
        RecurrenceRule {
            id,
            title: self.title,
            start_time: self.start_time,
            end_time: self.end_time,
            frequency: self.frequency,
            weekdays: self.weekdays,
            nth_of_month: self.nth_of_month,
            series_start: self.series_start,
            series_end: self.series_end,
            workshop_ids: self.workshop_ids,
            project_owner_id: self.project_owner_id,
            facilitator_ids: self.facilitator_ids,
        }
    }
}

/// Serde adapter for the `HH:MM` wire format of time-of-day fields.
mod hh_mm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format("%H:%M"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let text = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&text, "%H:%M").map_err(serde::de::Error::custom)
    }
}
