//! Business services over the recurrence engine and the storage
//! collaborator: event aggregation and resolution for the calendar, and the
//! rule/event lifecycle operations.

pub mod calendar;
pub mod error;
pub mod rules;
