//! Call Controller
//!
//! Runs a [`CallSession`] on a single tokio task. User actions arrive on a
//! command channel, timer fires on an internal channel; both are fed to the
//! session one at a time and the returned effects are executed here.
//!
//! Timers live in two slots (agent and customer). Scheduling into a slot
//! aborts whatever was pending there, and every exit path aborts both.

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;

use call_sim_core::{CallState, Clock, Scenario};
use call_sim_pipeline::SpeechOutput;

use crate::session::{
    CallEvent, CallInput, CallSession, Effect, ScheduledAction, SessionSnapshot, TimerFire, TimerSlot,
};
use crate::AgentError;

/// Controller configuration
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Broadcast capacity for call events
    pub event_capacity: usize,
    /// Duration refresh interval while in progress
    pub tick_interval: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            event_capacity: 100,
            tick_interval: Duration::from_secs(1),
        }
    }
}

enum Command {
    Input(CallInput),
    Shutdown,
}

/// One pending timer per slot
#[derive(Default)]
struct TimerSlots {
    agent: Option<JoinHandle<()>>,
    customer: Option<JoinHandle<()>>,
}

impl TimerSlots {
    fn slot_mut(&mut self, slot: TimerSlot) -> &mut Option<JoinHandle<()>> {
        match slot {
            TimerSlot::Agent => &mut self.agent,
            TimerSlot::Customer => &mut self.customer,
        }
    }

    fn schedule(&mut self, action: ScheduledAction, tx: mpsc::UnboundedSender<TimerFire>) {
        let slot = self.slot_mut(action.slot);
        if let Some(previous) = slot.take() {
            previous.abort();
        }
        *slot = Some(tokio::spawn(async move {
            tokio::time::sleep(action.delay).await;
            let _ = tx.send(action.fire);
        }));
    }

    fn cancel_all(&mut self) {
        for handle in [self.agent.take(), self.customer.take()].into_iter().flatten() {
            handle.abort();
        }
    }
}

impl Drop for TimerSlots {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

/// Cloneable handle to a running controller
#[derive(Clone)]
pub struct CallHandle {
    tx: mpsc::UnboundedSender<Command>,
    events: broadcast::Sender<CallEvent>,
    snapshot: watch::Receiver<SessionSnapshot>,
}

impl CallHandle {
    fn send(&self, input: CallInput) -> Result<(), AgentError> {
        self.tx
            .send(Command::Input(input))
            .map_err(|_| AgentError::ChannelClosed)
    }

    /// Launch or restart a call
    pub fn start(&self) -> Result<(), AgentError> {
        self.send(CallInput::Start)
    }

    /// Submit a manual customer reply
    pub fn reply(&self, text: impl Into<String>) -> Result<(), AgentError> {
        self.send(CallInput::Reply(text.into()))
    }

    pub fn wrap_up(&self) -> Result<(), AgentError> {
        self.send(CallInput::WrapUp)
    }

    pub fn hang_up(&self) -> Result<(), AgentError> {
        self.send(CallInput::HangUp)
    }

    pub fn reset(&self) -> Result<(), AgentError> {
        self.send(CallInput::Reset)
    }

    pub fn set_auto_pilot(&self, enabled: bool) -> Result<(), AgentError> {
        self.send(CallInput::SetAutoPilot(enabled))
    }

    pub fn set_voice(&self, enabled: bool) -> Result<(), AgentError> {
        self.send(CallInput::SetVoice(enabled))
    }

    pub fn update_scenario(&self, scenario: Scenario) -> Result<(), AgentError> {
        self.send(CallInput::UpdateScenario(scenario))
    }

    /// Subscribe to call events
    pub fn subscribe(&self) -> broadcast::Receiver<CallEvent> {
        self.events.subscribe()
    }

    /// Latest session snapshot
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Wait until the snapshot satisfies `predicate`
    pub async fn wait_for(
        &self,
        predicate: impl FnMut(&SessionSnapshot) -> bool,
    ) -> Result<SessionSnapshot, AgentError> {
        let mut rx = self.snapshot.clone();
        let snapshot = rx
            .wait_for(predicate)
            .await
            .map_err(|_| AgentError::ChannelClosed)?;
        Ok(snapshot.clone())
    }

    /// Wait until the call reaches `state`
    pub async fn wait_for_state(&self, state: CallState) -> Result<SessionSnapshot, AgentError> {
        self.wait_for(|s| s.state == state).await
    }

    /// Stop the controller task
    pub fn shutdown(&self) {
        let _ = self.tx.send(Command::Shutdown);
    }
}

/// Owns the session and its timer and speech resources
pub struct CallController {
    session: CallSession,
    speech: Arc<dyn SpeechOutput>,
    clock: Arc<dyn Clock>,
    rng: StdRng,
    timers: TimerSlots,
    fire_tx: mpsc::UnboundedSender<TimerFire>,
    events: broadcast::Sender<CallEvent>,
    snapshot_tx: watch::Sender<SessionSnapshot>,
}

impl CallController {
    /// Spawn the controller task and return a handle to it
    pub fn spawn(
        session: CallSession,
        speech: Arc<dyn SpeechOutput>,
        clock: Arc<dyn Clock>,
        rng: StdRng,
        config: ControllerConfig,
    ) -> (CallHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let (fire_tx, fire_rx) = mpsc::unbounded_channel();
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        let (snapshot_tx, snapshot_rx) = watch::channel(session.snapshot(clock.now()));

        let handle = CallHandle {
            tx,
            events: events.clone(),
            snapshot: snapshot_rx,
        };

        let controller = Self {
            session,
            speech,
            clock,
            rng,
            timers: TimerSlots::default(),
            fire_tx,
            events,
            snapshot_tx,
        };

        let task = tokio::spawn(controller.run(rx, fire_rx, config.tick_interval));
        (handle, task)
    }

    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Command>,
        mut fires: mpsc::UnboundedReceiver<TimerFire>,
        tick_interval: Duration,
    ) {
        let mut ticker = tokio::time::interval(tick_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        tracing::debug!("call controller started");

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::Input(input)) => self.apply(input),
                    Some(Command::Shutdown) | None => break,
                },
                Some(fire) = fires.recv() => self.apply(CallInput::Fire(fire)),
                _ = ticker.tick() => self.tick(),
            }
        }

        self.timers.cancel_all();
        self.speech.cancel();
        tracing::debug!("call controller stopped");
    }

    fn apply(&mut self, input: CallInput) {
        let now = self.clock.now();
        let effects = self.session.handle(input, now, &mut self.rng);
        for effect in effects {
            self.execute(effect);
        }
        self.publish();
    }

    fn execute(&mut self, effect: Effect) {
        match effect {
            Effect::Schedule(action) => self.timers.schedule(action, self.fire_tx.clone()),
            Effect::CancelTimers => self.timers.cancel_all(),
            Effect::Speak(text) => self.speech.speak(&text),
            Effect::CancelSpeech => self.speech.cancel(),
            Effect::Notify(event) => {
                let _ = self.events.send(event);
            }
        }
    }

    fn tick(&mut self) {
        if self.session.state() != CallState::InProgress {
            return;
        }
        let duration = self.session.duration(self.clock.now());
        let _ = self.events.send(CallEvent::DurationTick(duration));
        self.publish();
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(self.session.snapshot(self.clock.now()));
    }
}
