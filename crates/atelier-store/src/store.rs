//! The storage collaborator contract.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use atelier_recurrence::model::{NewOneOffEvent, NewRecurrenceRule, OneOffEvent, RecurrenceRule};

use crate::error::StoreResult;
use crate::model::{Agent, NewAgent, NewWorkshop, Workshop};

/// Storage operations the scheduling services consume.
///
/// Implementations must apply a rule or event together with its facilitator
/// links as one atomic operation: the links are join rows owned exclusively
/// by their parent, and a partial write (rule present, links missing) would
/// silently corrupt aggregation output. `delete_rule` and
/// `delete_one_off_event` cascade to those links in the same operation.
///
/// ## Errors
/// Every operation surfaces backend failures as `StoreError`; lookups by id
/// return `Ok(None)` for missing rows while mutations of missing rows fail
/// with the matching not-found variant.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Rules whose series interval overlaps `[start, end]`
    /// (`series_start <= end && series_end >= start`, end-of-day implied
    /// for `series_end`).
    async fn rules_overlapping(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> StoreResult<Vec<RecurrenceRule>>;

    async fn rule_by_id(&self, id: Uuid) -> StoreResult<Option<RecurrenceRule>>;

    /// Persists a new rule and its facilitator links atomically, assigning
    /// the id.
    async fn insert_rule(&self, rule: NewRecurrenceRule) -> StoreResult<RecurrenceRule>;

    /// Replaces a rule's fields and facilitator links atomically.
    async fn update_rule(
        &self,
        id: Uuid,
        rule: NewRecurrenceRule,
    ) -> StoreResult<RecurrenceRule>;

    /// Deletes a rule and every facilitator link it owns in one atomic
    /// operation.
    async fn delete_rule(&self, id: Uuid) -> StoreResult<()>;

    /// One-off events whose `[start, end]` interval overlaps the query
    /// window (`event.start <= end && event.end >= start`).
    async fn one_off_events_overlapping(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> StoreResult<Vec<OneOffEvent>>;

    async fn one_off_event_by_id(&self, id: Uuid) -> StoreResult<Option<OneOffEvent>>;

    /// Persists a new one-off event and its facilitator links atomically,
    /// assigning the id.
    async fn insert_one_off_event(&self, event: NewOneOffEvent) -> StoreResult<OneOffEvent>;

    /// Replaces a one-off event's fields and facilitator links atomically.
    async fn update_one_off_event(
        &self,
        id: Uuid,
        event: NewOneOffEvent,
    ) -> StoreResult<OneOffEvent>;

    /// Deletes a one-off event and its facilitator links in one atomic
    /// operation.
    async fn delete_one_off_event(&self, id: Uuid) -> StoreResult<()>;

    async fn insert_agent(&self, agent: NewAgent) -> StoreResult<Agent>;

    async fn agent_by_id(&self, id: Uuid) -> StoreResult<Option<Agent>>;

    async fn list_agents(&self) -> StoreResult<Vec<Agent>>;

    async fn delete_agent(&self, id: Uuid) -> StoreResult<()>;

    async fn insert_workshop(&self, workshop: NewWorkshop) -> StoreResult<Workshop>;

    async fn workshop_by_id(&self, id: Uuid) -> StoreResult<Option<Workshop>>;

    async fn list_workshops(&self) -> StoreResult<Vec<Workshop>>;

    async fn delete_workshop(&self, id: Uuid) -> StoreResult<()>;
}
