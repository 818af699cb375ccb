//! Local speech output
//!
//! Utterances are fire-and-forget: the controller never waits for one to
//! finish. Starting a new utterance or cancelling aborts the one in flight.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

use crate::SpeechError;

/// Speech collaborator contract used by the call controller
pub trait SpeechOutput: Send + Sync {
    /// Speak `text`, cutting off anything currently being spoken
    fn speak(&self, text: &str);

    /// Stop any in-progress utterance
    fn cancel(&self);
}

/// Backend that renders one utterance
#[async_trait::async_trait]
pub trait SpeechBackend: Send + Sync {
    /// Render text; resolves when the utterance has finished
    async fn say(&self, text: &str) -> Result<(), SpeechError>;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}

/// Speaks through the log at a fixed speaking rate
///
/// Utterance length is estimated from the word count so cancellation has
/// something to cut short.
#[derive(Debug, Clone)]
pub struct ConsoleBackend {
    words_per_minute: u32,
}

impl ConsoleBackend {
    pub fn new(words_per_minute: u32) -> Self {
        Self {
            words_per_minute: words_per_minute.max(1),
        }
    }

    /// Estimated time to speak `text`
    pub fn estimate(&self, text: &str) -> Duration {
        let words = text.split_whitespace().count() as u64;
        Duration::from_millis(words * 60_000 / self.words_per_minute as u64)
    }
}

impl Default for ConsoleBackend {
    fn default() -> Self {
        Self::new(165)
    }
}

#[async_trait::async_trait]
impl SpeechBackend for ConsoleBackend {
    async fn say(&self, text: &str) -> Result<(), SpeechError> {
        if text.trim().is_empty() {
            return Err(SpeechError::EmptyUtterance);
        }
        let duration = self.estimate(text);
        let ms = duration.as_millis() as u64;
        tracing::info!(target: "call_sim::speech", ms, "speaking: {}", text);
        tokio::time::sleep(duration).await;
        tracing::debug!(target: "call_sim::speech", "utterance finished");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "console"
    }
}

/// Backend that accepts everything and produces nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct MutedBackend;

#[async_trait::async_trait]
impl SpeechBackend for MutedBackend {
    async fn say(&self, _text: &str) -> Result<(), SpeechError> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "muted"
    }
}

/// Drives a backend with at most one live utterance
pub struct Speaker {
    backend: Arc<dyn SpeechBackend>,
    current: Mutex<Option<JoinHandle<()>>>,
}

impl Speaker {
    pub fn new(backend: Arc<dyn SpeechBackend>) -> Self {
        Self {
            backend,
            current: Mutex::new(None),
        }
    }

    pub fn muted() -> Self {
        Self::new(Arc::new(MutedBackend))
    }

    /// Is an utterance still playing?
    pub fn is_speaking(&self) -> bool {
        self.current
            .lock()
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    fn abort_current(current: &mut Option<JoinHandle<()>>) {
        if let Some(handle) = current.take() {
            if !handle.is_finished() {
                handle.abort();
                tracing::debug!(target: "call_sim::speech", "utterance cancelled");
            }
        }
    }
}

impl SpeechOutput for Speaker {
    fn speak(&self, text: &str) {
        let mut current = self.current.lock();
        Self::abort_current(&mut current);

        let backend = Arc::clone(&self.backend);
        let text = text.to_string();
        *current = Some(tokio::spawn(async move {
            if let Err(e) = backend.say(&text).await {
                tracing::warn!(target: "call_sim::speech", backend = backend.name(), "speech failed: {}", e);
            }
        }));
    }

    fn cancel(&self) {
        Self::abort_current(&mut self.current.lock());
    }
}

impl Drop for Speaker {
    fn drop(&mut self) {
        Self::abort_current(self.current.get_mut());
    }
}

/// Command observed by [`RecordingSpeech`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechCommand {
    Speak(String),
    Cancel,
}

/// Records speech commands instead of speaking; for tests and dry runs
#[derive(Debug, Clone, Default)]
pub struct RecordingSpeech {
    commands: Arc<Mutex<Vec<SpeechCommand>>>,
}

impl RecordingSpeech {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> Vec<SpeechCommand> {
        self.commands.lock().clone()
    }

    /// Texts passed to `speak`, in order
    pub fn spoken(&self) -> Vec<String> {
        self.commands
            .lock()
            .iter()
            .filter_map(|c| match c {
                SpeechCommand::Speak(text) => Some(text.clone()),
                SpeechCommand::Cancel => None,
            })
            .collect()
    }
}

impl SpeechOutput for RecordingSpeech {
    fn speak(&self, text: &str) {
        self.commands.lock().push(SpeechCommand::Speak(text.to_string()));
    }

    fn cancel(&self) {
        self.commands.lock().push(SpeechCommand::Cancel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_estimate() {
        let backend = ConsoleBackend::new(60);
        assert_eq!(backend.estimate("one two three"), Duration::from_secs(3));
        assert_eq!(backend.estimate(""), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_console_rejects_empty() {
        let backend = ConsoleBackend::default();
        assert!(matches!(backend.say("   ").await, Err(SpeechError::EmptyUtterance)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_utterance_cancels_previous() {
        let speaker = Speaker::new(Arc::new(ConsoleBackend::new(60)));

        speaker.speak("a fairly long sentence that takes a while");
        tokio::task::yield_now().await;
        assert!(speaker.is_speaking());

        speaker.speak("short");
        tokio::task::yield_now().await;
        assert!(speaker.is_speaking());

        speaker.cancel();
        assert!(!speaker.is_speaking());
    }

    #[tokio::test(start_paused = true)]
    async fn test_utterance_finishes() {
        let speaker = Speaker::new(Arc::new(ConsoleBackend::new(60)));
        speaker.speak("two words");
        tokio::time::sleep(Duration::from_secs(3)).await;
        tokio::task::yield_now().await;
        assert!(!speaker.is_speaking());
    }

    #[tokio::test]
    async fn test_muted_speaker() {
        let speaker = Speaker::muted();
        speaker.speak("nothing to hear");
        speaker.cancel();
        assert!(!speaker.is_speaking());
        assert!(MutedBackend.say("anything").await.is_ok());
    }

    #[test]
    fn test_recording_speech() {
        let speech = RecordingSpeech::new();
        speech.speak("Hello");
        speech.cancel();
        speech.speak("Again");

        assert_eq!(speech.spoken(), vec!["Hello".to_string(), "Again".to_string()]);
        assert_eq!(speech.commands()[1], SpeechCommand::Cancel);
    }
}
