//! Speech output for the call simulator
//!
//! This crate provides the local speech collaborator:
//! - `SpeechOutput`: fire-and-forget speak/cancel contract used by the controller
//! - `Speaker`: drives a `SpeechBackend`, one utterance at a time
//! - Console, muted and recording backends

pub mod speech;

pub use speech::{
    ConsoleBackend, MutedBackend, RecordingSpeech, Speaker, SpeechBackend, SpeechCommand,
    SpeechOutput,
};

use thiserror::Error;

/// Speech errors
#[derive(Error, Debug, Clone)]
pub enum SpeechError {
    #[error("Utterance is empty")]
    EmptyUtterance,
}

impl From<SpeechError> for call_sim_core::Error {
    fn from(err: SpeechError) -> Self {
        call_sim_core::Error::Speech(err.to_string())
    }
}
