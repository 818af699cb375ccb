//! Stage-Based Call Script
//!
//! The fixed seven-stage service call the virtual agent walks through.

use serde::{Deserialize, Serialize};

use call_sim_core::Scenario;

use crate::focus::{extract_focus_points, join_focus_points, lowercase_first};

/// Script stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScriptStage {
    /// Introduction and agenda
    Greeting,
    /// Confirming identity and that the issue is current
    Verification,
    /// Letting the customer describe the symptom
    Discovery,
    /// Sharing remote diagnostic results
    Diagnostic,
    /// Recommending a fix
    Offer,
    /// Securing a technician slot
    Booking,
    /// Recap and goodbye
    Farewell,
}

impl ScriptStage {
    /// All stages in delivery order
    pub const ALL: [ScriptStage; 7] = [
        ScriptStage::Greeting,
        ScriptStage::Verification,
        ScriptStage::Discovery,
        ScriptStage::Diagnostic,
        ScriptStage::Offer,
        ScriptStage::Booking,
        ScriptStage::Farewell,
    ];

    /// Get stage display name
    pub fn display_name(&self) -> &'static str {
        match self {
            ScriptStage::Greeting => "Greeting",
            ScriptStage::Verification => "Verification",
            ScriptStage::Discovery => "Discovery",
            ScriptStage::Diagnostic => "Diagnostic",
            ScriptStage::Offer => "Offer",
            ScriptStage::Booking => "Booking",
            ScriptStage::Farewell => "Farewell",
        }
    }

    /// Get coaching note for this stage
    pub fn coaching_note(&self) -> &'static str {
        match self {
            ScriptStage::Greeting =>
                "Open warmly, name the company, and preview the agenda so the customer knows what to expect.",
            ScriptStage::Verification =>
                "Confirm identity and that the issue is still happening before discussing account details.",
            ScriptStage::Discovery =>
                "Ask an open question and let the customer describe the symptom in their own words.",
            ScriptStage::Diagnostic =>
                "Share the diagnostic result plainly and tie it back to what the customer described.",
            ScriptStage::Offer =>
                "Lead with the recommended fix and remove cost concerns up front.",
            ScriptStage::Booking =>
                "Offer a concrete slot and get an explicit yes before booking.",
            ScriptStage::Farewell =>
                "Recap the outcome and next steps, then close warmly.",
        }
    }
}

impl std::fmt::Display for ScriptStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// One agent/customer turn pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptStep {
    pub stage: ScriptStage,
    /// Agent line, may contain placeholders
    pub agent_line: String,
    /// Expected customer reply; `None` ends the call after this line
    pub customer_line: Option<String>,
    pub coaching_note: String,
}

impl ScriptStep {
    pub fn new(stage: ScriptStage, agent_line: impl Into<String>, customer_line: Option<&str>) -> Self {
        Self {
            stage,
            agent_line: agent_line.into(),
            customer_line: customer_line.map(str::to_string),
            coaching_note: stage.coaching_note().to_string(),
        }
    }
}

/// Ordered script for one call. Not mutated once built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    steps: Vec<ScriptStep>,
}

impl Script {
    pub fn from_steps(steps: Vec<ScriptStep>) -> Self {
        Self { steps }
    }

    pub fn get(&self, index: usize) -> Option<&ScriptStep> {
        self.steps.get(index)
    }

    pub fn steps(&self) -> &[ScriptStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Builds the script for a scenario
pub type ScriptBuilder = fn(&Scenario) -> Script;

/// Closing line used when delivery runs past the last step
pub const DEFAULT_CLOSING_LINE: &str =
    "That covers everything on my side, {customer}. Thanks again for your time. Goodbye!";

/// Agent line for a manual wrap-up
pub const WRAP_UP_LINE: &str =
    "I'll let you go for now, {customer}. I'll send over a summary of what we covered. Thanks for your time!";

/// Build the standard service-call script
///
/// Only the opening line depends on the goal; the rest is fixed text with
/// placeholders filled at delivery time.
pub fn build_script(scenario: &Scenario) -> Script {
    let focus: Vec<String> = extract_focus_points(&scenario.goal)
        .iter()
        .map(|p| lowercase_first(p))
        .collect();

    let opening = format!(
        "Hi {{customer}}, this is {{agent}} calling from {{company}}. \
         On this call I'd like to {}. Is now still a good time?",
        join_focus_points(&focus)
    );

    Script::from_steps(vec![
        ScriptStep::new(
            ScriptStage::Greeting,
            opening,
            Some("Hi {agent}, yes, now works. Thanks for calling."),
        ),
        ScriptStep::new(
            ScriptStage::Verification,
            "Great. Before we dig in, can you confirm the account is under {customer} \
             and that you're still seeing the problem we flagged?",
            Some("Yes, that's me. And yes, it still acts up most afternoons."),
        ),
        ScriptStep::new(
            ScriptStage::Discovery,
            "Our monitoring shows your output dipping below forecast on several days this month. \
             When did you first notice it?",
            Some("Maybe two weeks ago. The app showed lower numbers even on sunny days."),
        ),
        ScriptStep::new(
            ScriptStage::Diagnostic,
            "Thanks, that helps. I just ran a remote check, and the readings show one inverter \
             string underperforming by about 30 percent, which lines up with what you've seen.",
            Some("Okay, that sounds like it needs fixing. What are my options?"),
        ),
        ScriptStep::new(
            ScriptStage::Offer,
            "The simplest fix is a technician visit to inspect that string and replace any faulty \
             connector. It's covered under your {company} service plan, so there's no charge.",
            Some("That works. When could someone come out?"),
        ),
        ScriptStep::new(
            ScriptStage::Booking,
            "I can get a technician out Thursday between 9 and 11 AM. Shall I lock that in?",
            Some("Yes, Thursday morning is perfect."),
        ),
        ScriptStep::new(
            ScriptStage::Farewell,
            "You're all set, {customer}. Your technician visit is booked for Thursday morning, \
             and {company} will text you a confirmation shortly. Thanks for your time, and have a great day!",
            None,
        ),
    ])
}
