//! Scenario (persona and goal) configuration

use serde::{Deserialize, Serialize};

/// Name of the scripted virtual agent
pub const AGENT_NAME: &str = "Quin";

fn default_agent_name() -> String {
    AGENT_NAME.to_string()
}
fn default_customer_name() -> String {
    "Jordan Lee".to_string()
}
fn default_company_name() -> String {
    "Brightline Solar".to_string()
}
fn default_goal() -> String {
    "Verify output dips, offer diagnostic, and book a technician.".to_string()
}

/// User-editable persona and goal for one call
///
/// Edits made while a call is live only take effect on the next call; the
/// session snapshots the scenario when the call starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// Virtual agent name (constant)
    #[serde(default = "default_agent_name")]
    pub agent_name: String,

    /// Customer persona name
    #[serde(default = "default_customer_name")]
    pub customer_name: String,

    /// Company the agent represents
    #[serde(default = "default_company_name")]
    pub company_name: String,

    /// Free-text call goal
    #[serde(default = "default_goal")]
    pub goal: String,
}

impl Scenario {
    pub fn new(
        customer_name: impl Into<String>,
        company_name: impl Into<String>,
        goal: impl Into<String>,
    ) -> Self {
        Self {
            agent_name: default_agent_name(),
            customer_name: customer_name.into(),
            company_name: company_name.into(),
            goal: goal.into(),
        }
    }
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            agent_name: default_agent_name(),
            customer_name: default_customer_name(),
            company_name: default_company_name(),
            goal: default_goal(),
        }
    }
}
