use thiserror::Error;
use uuid::Uuid;

/// Storage layer errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Rule not found: {0}")]
    RuleNotFound(Uuid),

    #[error("Event not found: {0}")]
    EventNotFound(Uuid),

    #[error("Agent not found: {0}")]
    AgentNotFound(Uuid),

    #[error("Workshop not found: {0}")]
    WorkshopNotFound(Uuid),

    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error(transparent)]
    CoreError(#[from] atelier_core::error::CoreError),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
