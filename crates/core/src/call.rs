//! Call lifecycle state

use serde::{Deserialize, Serialize};

/// Lifecycle state of a simulated call
///
/// Transitions only move forward (`Idle -> Dialing -> InProgress -> Completed`),
/// except for an explicit reset from `Completed` back to `Idle` and a fresh
/// start, which is accepted from any state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum CallState {
    #[default]
    Idle,
    Dialing,
    InProgress,
    Completed,
}

impl CallState {
    /// Get state display name
    pub fn display_name(&self) -> &'static str {
        match self {
            CallState::Idle => "Idle",
            CallState::Dialing => "Dialing",
            CallState::InProgress => "In progress",
            CallState::Completed => "Completed",
        }
    }

    /// Is a call underway (dialing or connected)?
    pub fn is_live(&self) -> bool {
        matches!(self, CallState::Dialing | CallState::InProgress)
    }
}

impl std::fmt::Display for CallState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}
