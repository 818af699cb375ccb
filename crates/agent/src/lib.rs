//! Scripted Call Agent
//!
//! Features:
//! - Seven-stage service-call script with placeholder templating
//! - Goal-to-focus-point extraction for the opening line
//! - Regex-driven call highlights
//! - Call session state machine (pure reducer over inputs and effects)
//! - Tokio controller owning timers, speech and event fan-out

pub mod controller;
pub mod duration;
pub mod focus;
pub mod highlights;
pub mod pacing;
pub mod script;
pub mod session;
pub mod template;

pub use controller::{CallController, CallHandle, ControllerConfig};
pub use duration::{call_duration, format_duration};
pub use focus::{extract_focus_points, DEFAULT_FOCUS_POINTS};
pub use highlights::{derive_highlights, PLACEHOLDER_HIGHLIGHTS};
pub use script::{build_script, Script, ScriptBuilder, ScriptStage, ScriptStep};
pub use session::{
    CallEvent, CallInput, CallSession, Effect, EndReason, ScheduledAction, SessionSnapshot,
    TimerAction, TimerFire, TimerSlot,
};
pub use template::fill_placeholders;

use thiserror::Error;

/// Agent errors
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Call controller has shut down")]
    ChannelClosed,
}

impl From<AgentError> for call_sim_core::Error {
    fn from(err: AgentError) -> Self {
        call_sim_core::Error::Session(err.to_string())
    }
}
