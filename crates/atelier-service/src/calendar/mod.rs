//! Calendar queries: aggregation of one-off events with expanded
//! occurrences, and single-event resolution by id.

use std::sync::Arc;

use chrono::{DateTime, NaiveTime, TimeDelta, Utc};
use uuid::Uuid;

use atelier_recurrence::expand::{self, DEFAULT_MAX_INSTANCES};
use atelier_recurrence::identity::OccurrenceId;
use atelier_recurrence::model::{CalendarEvent, RecurrenceRule};
use atelier_store::store::EventStore;

use crate::error::{ServiceError, ServiceResult};

/// Read-only calendar facade over the storage collaborator.
pub struct CalendarService<S> {
    store: Arc<S>,
    max_instances: u16,
}

impl<S: EventStore> CalendarService<S> {
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            max_instances: DEFAULT_MAX_INSTANCES,
        }
    }

    /// Overrides the per-rule expansion cap (`expansion.max_instances` in
    /// the settings).
    #[must_use]
    pub fn with_max_instances(mut self, max_instances: u16) -> Self {
        self.max_instances = max_instances;
        self
    }

    /// ## Summary
    /// Answers "what events (one-off + recurring) fall in `[start, end]`?".
    ///
    /// One-off events are matched by interval overlap; candidate rules by
    /// series overlap, then expanded over the query window extended by one
    /// day (so a firing date equal to the query end survives a midnight
    /// cutover) and clamped to each rule's series bounds. Concatenation
    /// order is not guaranteed; see [`sort_events_by_start`].
    ///
    /// ## Side Effects
    /// None beyond read-only storage fetches.
    ///
    /// ## Errors
    /// Propagates storage failures and recurrence-set construction errors.
    pub async fn list_events(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ServiceResult<Vec<CalendarEvent>> {
        let one_offs = self.store.one_off_events_overlapping(start, end).await?;
        let rules = self.store.rules_overlapping(start, end).await?;
        tracing::debug!(
            %start,
            %end,
            one_offs = one_offs.len(),
            candidate_rules = rules.len(),
            "aggregating calendar window"
        );

        let extended_end = end + TimeDelta::days(1);

        let mut events: Vec<CalendarEvent> =
            one_offs.into_iter().map(CalendarEvent::OneOff).collect();
        for rule in &rules {
            let after = start.max(series_start_instant(rule));
            let before = extended_end.min(series_end_instant(rule));
            let occurrences =
                expand::occurrences_between(rule, after, before, self.max_instances)?;
            events.extend(occurrences.into_iter().map(CalendarEvent::Recurring));
        }

        Ok(events)
    }

    /// ## Summary
    /// Resolves a single event by its wire-visible id.
    ///
    /// Composite occurrence ids are tried first: the owning rule is fetched
    /// and the one addressed occurrence regenerated, with the produced id
    /// required to match the requested one exactly. Plain UUIDs fall back
    /// to one-off lookup.
    ///
    /// ## Errors
    /// `RuleNotFound` if a composite id references a missing rule;
    /// `OccurrenceNotFound` if the id parses but the rule does not fire
    /// there (stale or fabricated id); `EventNotFound` for unknown one-off
    /// ids or ids that are neither shape.
    pub async fn get_event_by_id(&self, id: &str) -> ServiceResult<CalendarEvent> {
        if let Ok(occurrence_id) = id.parse::<OccurrenceId>() {
            let rule = self
                .store
                .rule_by_id(occurrence_id.rule_id())
                .await?
                .ok_or(ServiceError::RuleNotFound(occurrence_id.rule_id()))?;

            let occurrence = expand::occurrence_at(&rule, &occurrence_id)?
                .ok_or_else(|| ServiceError::OccurrenceNotFound(id.to_string()))?;
            return Ok(CalendarEvent::Recurring(occurrence));
        }

        let event_id =
            Uuid::parse_str(id).map_err(|_| ServiceError::EventNotFound(id.to_string()))?;
        let event = self
            .store
            .one_off_event_by_id(event_id)
            .await?
            .ok_or_else(|| ServiceError::EventNotFound(id.to_string()))?;
        Ok(CalendarEvent::OneOff(event))
    }
}

/// Orders events by start time, for consumers (export) that need ordering.
pub fn sort_events_by_start(events: &mut [CalendarEvent]) {
    events.sort_by_key(CalendarEvent::start);
}

fn series_start_instant(rule: &RecurrenceRule) -> DateTime<Utc> {
    DateTime::<Utc>::from_naive_utc_and_offset(
        rule.series_start.and_time(NaiveTime::MIN),
        Utc,
    )
}

fn series_end_instant(rule: &RecurrenceRule) -> DateTime<Utc> {
    let end_of_day = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN);
    DateTime::<Utc>::from_naive_utc_and_offset(rule.series_end.and_time(end_of_day), Utc)
}
