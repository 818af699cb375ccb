//! Core types for the call simulator
//!
//! This crate provides the data model shared by every other crate:
//! - Call state and lifecycle
//! - Transcript messages and roles
//! - Scenario configuration
//! - Clock abstraction
//! - Error types

pub mod call;
pub mod clock;
pub mod error;
pub mod message;
pub mod scenario;
pub mod transcript;

pub use call::CallState;
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{Error, Result};
pub use message::{Message, Role};
pub use scenario::{Scenario, AGENT_NAME};
pub use transcript::Transcript;
