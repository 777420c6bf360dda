use thiserror::Error;
use uuid::Uuid;

/// Service layer errors - combines all error types
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    StoreError(#[from] atelier_store::error::StoreError),

    #[error(transparent)]
    RecurrenceError(#[from] atelier_recurrence::error::RecurrenceError),

    #[error(transparent)]
    CoreError(#[from] atelier_core::error::CoreError),

    #[error("Rule not found: {0}")]
    RuleNotFound(Uuid),

    #[error("Event not found: {0}")]
    EventNotFound(String),

    #[error("Occurrence not found: {0}")]
    OccurrenceNotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
