//! Rule and one-off event lifecycle: validated creation and update,
//! cascading deletion, and detaching a single occurrence into a one-off
//! event.

use std::sync::Arc;

use uuid::Uuid;

use atelier_recurrence::expand;
use atelier_recurrence::identity::OccurrenceId;
use atelier_recurrence::model::{NewOneOffEvent, NewRecurrenceRule, OneOffEvent, RecurrenceRule};
use atelier_store::store::EventStore;

use crate::error::{ServiceError, ServiceResult};

/// Mutating operations on series and one-off events.
pub struct RuleService<S> {
    store: Arc<S>,
}

impl<S: EventStore> RuleService<S> {
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// ## Summary
    /// Creates a series: normalizes the intake shape (weekday dedup, monthly
    /// nth-of-month default), checks the rule invariants, verifies the
    /// project owner exists, then persists the rule and its facilitator
    /// links in one atomic store operation.
    ///
    /// ## Errors
    /// Validation failures, a missing project owner, or storage failures.
    pub async fn create_rule(
        &self,
        mut draft: NewRecurrenceRule,
    ) -> ServiceResult<RecurrenceRule> {
        draft.normalize();
        draft.validate()?;
        self.ensure_owner_exists(draft.project_owner_id).await?;

        let rule = self.store.insert_rule(draft).await?;
        tracing::debug!(rule_id = %rule.id, title = %rule.title, "created recurrence rule");
        Ok(rule)
    }

    /// ## Summary
    /// Replaces a series definition; all future occurrences change.
    /// Facilitator links are replaced atomically with the rule fields.
    ///
    /// ## Errors
    /// Validation failures, a missing project owner, an unknown rule id, or
    /// storage failures.
    pub async fn update_rule(
        &self,
        id: Uuid,
        mut draft: NewRecurrenceRule,
    ) -> ServiceResult<RecurrenceRule> {
        draft.normalize();
        draft.validate()?;
        self.ensure_owner_exists(draft.project_owner_id).await?;

        let rule = self.store.update_rule(id, draft).await?;
        tracing::debug!(rule_id = %rule.id, "updated recurrence rule");
        Ok(rule)
    }

    /// ## Summary
    /// Deletes a series. Every occurrence disappears with it: occurrences
    /// have no rows of their own, and the rule's facilitator links are
    /// removed in the same atomic operation.
    ///
    /// ## Errors
    /// An unknown rule id or storage failures.
    pub async fn delete_rule(&self, id: Uuid) -> ServiceResult<()> {
        self.store.delete_rule(id).await?;
        tracing::debug!(rule_id = %id, "deleted recurrence rule");
        Ok(())
    }

    /// ## Summary
    /// Creates a one-off event after validating it and its project owner.
    ///
    /// ## Errors
    /// Validation failures, a missing project owner, or storage failures.
    pub async fn create_one_off(&self, event: NewOneOffEvent) -> ServiceResult<OneOffEvent> {
        event.validate()?;
        self.ensure_owner_exists(event.project_owner_id).await?;
        Ok(self.store.insert_one_off_event(event).await?)
    }

    /// ## Summary
    /// Replaces a one-off event.
    ///
    /// ## Errors
    /// Validation failures, a missing project owner, an unknown event id, or
    /// storage failures.
    pub async fn update_one_off(
        &self,
        id: Uuid,
        event: NewOneOffEvent,
    ) -> ServiceResult<OneOffEvent> {
        event.validate()?;
        self.ensure_owner_exists(event.project_owner_id).await?;
        Ok(self.store.update_one_off_event(id, event).await?)
    }

    /// ## Summary
    /// Deletes a one-off event and its facilitator links.
    ///
    /// ## Errors
    /// An unknown event id or storage failures.
    pub async fn delete_one_off(&self, id: Uuid) -> ServiceResult<()> {
        self.store.delete_one_off_event(id).await?;
        Ok(())
    }

    /// ## Summary
    /// Detaches one occurrence from its series: resolves the composite id,
    /// copies the materialized data into a new one-off event, and leaves
    /// the rule untouched. The detached date keeps firing from the rule on
    /// later queries; there is no exclusion-date mechanism.
    ///
    /// ## Errors
    /// An unparseable id, a missing rule, a non-firing instant
    /// (`OccurrenceNotFound`), or storage failures.
    pub async fn detach_occurrence(&self, id: &str) -> ServiceResult<OneOffEvent> {
        let occurrence_id: OccurrenceId = id.parse()?;
        let rule = self
            .store
            .rule_by_id(occurrence_id.rule_id())
            .await?
            .ok_or(ServiceError::RuleNotFound(occurrence_id.rule_id()))?;

        let occurrence = expand::occurrence_at(&rule, &occurrence_id)?
            .ok_or_else(|| ServiceError::OccurrenceNotFound(id.to_string()))?;

        let detached = self
            .store
            .insert_one_off_event(NewOneOffEvent {
                title: occurrence.title,
                start: occurrence.start,
                end: occurrence.end,
                workshop_ids: occurrence.workshop_ids,
                project_owner_id: occurrence.project_owner_id,
                facilitator_ids: occurrence.facilitator_ids,
            })
            .await?;
        tracing::debug!(
            rule_id = %rule.id,
            event_id = %detached.id,
            "detached occurrence into one-off event"
        );
        Ok(detached)
    }

    async fn ensure_owner_exists(&self, owner_id: Uuid) -> ServiceResult<()> {
        if self.store.agent_by_id(owner_id).await?.is_none() {
            return Err(ServiceError::ValidationError(format!(
                "project owner {owner_id} does not exist"
            )));
        }
        Ok(())
    }
}
