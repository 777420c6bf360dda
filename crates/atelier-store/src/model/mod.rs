//! Directory entities referenced by rules and events.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What an agent does in the workshop program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AgentRole {
    Facilitator,
    ProjectOwner,
    Admin,
}

impl AgentRole {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Facilitator => "FACILITATOR",
            Self::ProjectOwner => "PROJECT_OWNER",
            Self::Admin => "ADMIN",
        }
    }
}

impl std::fmt::Display for AgentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A staff member who owns or co-runs series and events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: Uuid,
    pub last_name: String,
    pub first_name: String,
    pub email: String,
    pub role: AgentRole,
    /// Display color, `#rrggbb`.
    pub color: String,
}

/// New agent for insertion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAgent {
    pub last_name: String,
    pub first_name: String,
    pub email: String,
    pub role: AgentRole,
    pub color: String,
}

impl NewAgent {
    #[must_use]
    pub fn into_agent(self, id: Uuid) -> Agent {
        Agent {
            id,
            last_name: self.last_name,
            first_name: self.first_name,
            email: self.email,
            role: self.role,
            color: self.color,
        }
    }
}

/// A workshop offering that series and events schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workshop {
    pub id: Uuid,
    pub title: String,
    pub duration_minutes: u32,
    /// Display color, `#rrggbb`.
    pub color: String,
}

/// New workshop for insertion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewWorkshop {
    pub title: String,
    pub duration_minutes: u32,
    pub color: String,
}

impl NewWorkshop {
    #[must_use]
    pub fn into_workshop(self, id: Uuid) -> Workshop {
        Workshop {
            id,
            title: self.title,
            duration_minutes: self.duration_minutes,
            color: self.color,
        }
    }
}
