//! Transcript message types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who produced a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The scripted virtual agent
    Agent,
    /// The customer, auto-played or typed
    Customer,
    /// Call events (connected, ended)
    System,
}

impl Role {
    pub fn display_name(&self) -> &'static str {
        match self {
            Role::Agent => "Agent",
            Role::Customer => "Customer",
            Role::System => "System",
        }
    }
}

/// A single transcript entry. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Unique message ID
    pub id: Uuid,
    /// Speaker role
    pub role: Role,
    /// Message text
    pub text: String,
    /// When the message was appended
    pub timestamp: DateTime<Utc>,
    /// Optional label (stage name, "connected", "wrap-up", ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<String>,
}

impl Message {
    /// Create a new message
    pub fn new(role: Role, text: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            text: text.into(),
            timestamp,
            meta: None,
        }
    }

    /// Attach a meta label
    pub fn with_meta(mut self, meta: impl Into<String>) -> Self {
        self.meta = Some(meta.into());
        self
    }

    pub fn agent(text: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self::new(Role::Agent, text, timestamp)
    }

    pub fn customer(text: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self::new(Role::Customer, text, timestamp)
    }

    pub fn system(text: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self::new(Role::System, text, timestamp)
    }
}
