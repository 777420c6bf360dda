//! In-memory reference implementation of the storage contract.
//!
//! Tables live behind a single `RwLock`, so every mutation of a parent row
//! and its facilitator links happens under one write guard. This is the
//! atomicity a relational implementation must provide with a transaction.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use atelier_recurrence::model::{NewOneOffEvent, NewRecurrenceRule, OneOffEvent, RecurrenceRule};

use crate::error::{StoreError, StoreResult};
use crate::model::{Agent, NewAgent, NewWorkshop, Workshop};
use crate::store::EventStore;

#[derive(Debug, Default)]
struct Tables {
    agents: HashMap<Uuid, Agent>,
    workshops: HashMap<Uuid, Workshop>,
    /// Rules are stored without facilitators; the links are join rows.
    rules: HashMap<Uuid, RecurrenceRule>,
    rule_facilitators: HashMap<Uuid, Vec<Uuid>>,
    events: HashMap<Uuid, OneOffEvent>,
    event_facilitators: HashMap<Uuid, Vec<Uuid>>,
}

/// In-memory [`EventStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn assemble_rule(rule: &RecurrenceRule, links: &HashMap<Uuid, Vec<Uuid>>) -> RecurrenceRule {
    let mut rule = rule.clone();
    rule.facilitator_ids = links.get(&rule.id).cloned().unwrap_or_default();
    rule
}

fn assemble_event(event: &OneOffEvent, links: &HashMap<Uuid, Vec<Uuid>>) -> OneOffEvent {
    let mut event = event.clone();
    event.facilitator_ids = links.get(&event.id).cloned().unwrap_or_default();
    event
}

fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN)
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn rules_overlapping(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> StoreResult<Vec<RecurrenceRule>> {
        let tables = self.tables.read().await;
        let rules = tables
            .rules
            .values()
            .filter(|rule| {
                let series_start = DateTime::<Utc>::from_naive_utc_and_offset(
                    rule.series_start.and_time(NaiveTime::MIN),
                    Utc,
                );
                let series_end = DateTime::<Utc>::from_naive_utc_and_offset(
                    rule.series_end.and_time(end_of_day()),
                    Utc,
                );
                series_start <= end && series_end >= start
            })
            .map(|rule| assemble_rule(rule, &tables.rule_facilitators))
            .collect();
        Ok(rules)
    }

    async fn rule_by_id(&self, id: Uuid) -> StoreResult<Option<RecurrenceRule>> {
        let tables = self.tables.read().await;
        Ok(tables
            .rules
            .get(&id)
            .map(|rule| assemble_rule(rule, &tables.rule_facilitators)))
    }

    async fn insert_rule(&self, rule: NewRecurrenceRule) -> StoreResult<RecurrenceRule> {
        let mut stored = rule.into_rule(Uuid::new_v4());
        let facilitators = std::mem::take(&mut stored.facilitator_ids);

        let mut tables = self.tables.write().await;
        tables
            .rule_facilitators
            .insert(stored.id, facilitators.clone());
        tables.rules.insert(stored.id, stored.clone());
        tracing::debug!(rule_id = %stored.id, title = %stored.title, "inserted recurrence rule");

        stored.facilitator_ids = facilitators;
        Ok(stored)
    }

    async fn update_rule(
        &self,
        id: Uuid,
        rule: NewRecurrenceRule,
    ) -> StoreResult<RecurrenceRule> {
        let mut stored = rule.into_rule(id);
        let facilitators = std::mem::take(&mut stored.facilitator_ids);

        let mut tables = self.tables.write().await;
        if !tables.rules.contains_key(&id) {
            return Err(StoreError::RuleNotFound(id));
        }
        tables.rule_facilitators.insert(id, facilitators.clone());
        tables.rules.insert(id, stored.clone());
        tracing::debug!(rule_id = %id, "updated recurrence rule");

        stored.facilitator_ids = facilitators;
        Ok(stored)
    }

    async fn delete_rule(&self, id: Uuid) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables.rules.remove(&id).is_none() {
            return Err(StoreError::RuleNotFound(id));
        }
        tables.rule_facilitators.remove(&id);
        tracing::debug!(rule_id = %id, "deleted recurrence rule and its facilitator links");
        Ok(())
    }

    async fn one_off_events_overlapping(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> StoreResult<Vec<OneOffEvent>> {
        let tables = self.tables.read().await;
        let events = tables
            .events
            .values()
            .filter(|event| event.start <= end && event.end >= start)
            .map(|event| assemble_event(event, &tables.event_facilitators))
            .collect();
        Ok(events)
    }

    async fn one_off_event_by_id(&self, id: Uuid) -> StoreResult<Option<OneOffEvent>> {
        let tables = self.tables.read().await;
        Ok(tables
            .events
            .get(&id)
            .map(|event| assemble_event(event, &tables.event_facilitators)))
    }

    async fn insert_one_off_event(&self, event: NewOneOffEvent) -> StoreResult<OneOffEvent> {
        let mut stored = event.into_event(Uuid::new_v4());
        let facilitators = std::mem::take(&mut stored.facilitator_ids);

        let mut tables = self.tables.write().await;
        tables
            .event_facilitators
            .insert(stored.id, facilitators.clone());
        tables.events.insert(stored.id, stored.clone());
        tracing::debug!(event_id = %stored.id, title = %stored.title, "inserted one-off event");

        stored.facilitator_ids = facilitators;
        Ok(stored)
    }

    async fn update_one_off_event(
        &self,
        id: Uuid,
        event: NewOneOffEvent,
    ) -> StoreResult<OneOffEvent> {
        let mut stored = event.into_event(id);
        let facilitators = std::mem::take(&mut stored.facilitator_ids);

        let mut tables = self.tables.write().await;
        if !tables.events.contains_key(&id) {
            return Err(StoreError::EventNotFound(id));
        }
        tables.event_facilitators.insert(id, facilitators.clone());
        tables.events.insert(id, stored.clone());
        tracing::debug!(event_id = %id, "updated one-off event");

        stored.facilitator_ids = facilitators;
        Ok(stored)
    }

    async fn delete_one_off_event(&self, id: Uuid) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables.events.remove(&id).is_none() {
            return Err(StoreError::EventNotFound(id));
        }
        tables.event_facilitators.remove(&id);
        tracing::debug!(event_id = %id, "deleted one-off event and its facilitator links");
        Ok(())
    }

    async fn insert_agent(&self, agent: NewAgent) -> StoreResult<Agent> {
        let agent = agent.into_agent(Uuid::new_v4());
        let mut tables = self.tables.write().await;
        tables.agents.insert(agent.id, agent.clone());
        Ok(agent)
    }

    async fn agent_by_id(&self, id: Uuid) -> StoreResult<Option<Agent>> {
        Ok(self.tables.read().await.agents.get(&id).cloned())
    }

    async fn list_agents(&self) -> StoreResult<Vec<Agent>> {
        Ok(self.tables.read().await.agents.values().cloned().collect())
    }

    async fn delete_agent(&self, id: Uuid) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables.agents.remove(&id).is_none() {
            return Err(StoreError::AgentNotFound(id));
        }
        Ok(())
    }

    async fn insert_workshop(&self, workshop: NewWorkshop) -> StoreResult<Workshop> {
        let workshop = workshop.into_workshop(Uuid::new_v4());
        let mut tables = self.tables.write().await;
        tables.workshops.insert(workshop.id, workshop.clone());
        Ok(workshop)
    }

    async fn workshop_by_id(&self, id: Uuid) -> StoreResult<Option<Workshop>> {
        Ok(self.tables.read().await.workshops.get(&id).cloned())
    }

    async fn list_workshops(&self) -> StoreResult<Vec<Workshop>> {
        Ok(self
            .tables
            .read()
            .await
            .workshops
            .values()
            .cloned()
            .collect())
    }

    async fn delete_workshop(&self, id: Uuid) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables.workshops.remove(&id).is_none() {
            return Err(StoreError::WorkshopNotFound(id));
        }
        Ok(())
    }
}
