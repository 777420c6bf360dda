//! One-off events and the ephemeral occurrences expanded from rules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{RecurrenceError, RecurrenceResult};
use crate::identity::OccurrenceId;

/// A single, independently persisted event with absolute timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OneOffEvent {
    pub id: Uuid,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Non-empty; the first entry is the primary workshop.
    pub workshop_ids: Vec<Uuid>,
    pub project_owner_id: Uuid,
    pub facilitator_ids: Vec<Uuid>,
}

impl OneOffEvent {
    #[must_use]
    pub fn primary_workshop_id(&self) -> Option<Uuid> {
        self.workshop_ids.first().copied()
    }
}

/// Intake shape for creating or replacing a one-off event; no id yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOneOffEvent {
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub workshop_ids: Vec<Uuid>,
    pub project_owner_id: Uuid,
    pub facilitator_ids: Vec<Uuid>,
}

impl NewOneOffEvent {
    /// ## Summary
    /// Checks the event invariants: end after start, at least one workshop.
    ///
    /// ## Errors
    /// Returns the first violated invariant.
    pub fn validate(&self) -> RecurrenceResult<()> {
        if self.end <= self.start {
            return Err(RecurrenceError::InvalidTimeWindow {
                start: self.start.time(),
                end: self.end.time(),
            });
        }
        if self.workshop_ids.is_empty() {
            return Err(RecurrenceError::MissingWorkshops);
        }
        Ok(())
    }

    /// Attaches an id, producing the persisted shape.
    #[must_use]
    pub fn into_event(self, id: Uuid) -> OneOffEvent {
        OneOffEvent {
            id,
            title: self.title,
            start: self.start,
            end: self.end,
            workshop_ids: self.workshop_ids,
            project_owner_id: self.project_owner_id,
            facilitator_ids: self.facilitator_ids,
        }
    }
}

/// One expanded firing of a recurrence rule.
///
/// Occurrences are never persisted: they are regenerated on demand from the
/// owning rule, and identical inputs always regenerate an identical
/// occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence {
    pub id: OccurrenceId,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub workshop_ids: Vec<Uuid>,
    pub project_owner_id: Uuid,
    pub facilitator_ids: Vec<Uuid>,
    /// Always `true`; kept on the wire so consumers can route edits to the
    /// owning rule without sniffing the id shape.
    pub is_recurring: bool,
    pub rule_id: Uuid,
}

/// The uniform shape handed to callers: a persisted one-off event or a
/// virtual occurrence of a series.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CalendarEvent {
    OneOff(OneOffEvent),
    Recurring(Occurrence),
}

impl CalendarEvent {
    /// Wire-visible identity: a plain UUID for one-off events, the composite
    /// `"<rule-id>-<iso-instant>"` for occurrences.
    #[must_use]
    pub fn id(&self) -> String {
        match self {
            Self::OneOff(event) => event.id.to_string(),
            Self::Recurring(occurrence) => occurrence.id.to_string(),
        }
    }

    #[must_use]
    pub fn title(&self) -> &str {
        match self {
            Self::OneOff(event) => &event.title,
            Self::Recurring(occurrence) => &occurrence.title,
        }
    }

    #[must_use]
    pub fn start(&self) -> DateTime<Utc> {
        match self {
            Self::OneOff(event) => event.start,
            Self::Recurring(occurrence) => occurrence.start,
        }
    }

    #[must_use]
    pub fn end(&self) -> DateTime<Utc> {
        match self {
            Self::OneOff(event) => event.end,
            Self::Recurring(occurrence) => occurrence.end,
        }
    }

    #[must_use]
    pub const fn is_recurring(&self) -> bool {
        matches!(self, Self::Recurring(_))
    }
}
