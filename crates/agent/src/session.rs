//! Call Session State Machine
//!
//! The session is a plain struct driven by [`CallSession::handle`]: every
//! user action and every timer fire goes in as a [`CallInput`], and what the
//! outside world should do comes back as a list of [`Effect`]s. The session
//! never sleeps, spawns or speaks by itself; the controller executes the
//! effects.
//!
//! Every scheduled action carries the epoch it was scheduled in. Starting or
//! resetting a call bumps the epoch, so a fire that outlives its call is
//! dropped on arrival.

use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;

use call_sim_config::PacingConfig;
use call_sim_core::{CallState, Message, Scenario, Transcript};

use crate::duration::{call_duration, format_duration};
use crate::highlights::derive_highlights;
use crate::pacing::sample_delay;
use crate::script::{build_script, Script, ScriptBuilder, ScriptStage, DEFAULT_CLOSING_LINE, WRAP_UP_LINE};
use crate::template::fill_placeholders;

/// Timer slot; each holds at most one pending action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerSlot {
    /// Connect, next-step and finish actions
    Agent,
    /// Auto-played customer lines
    Customer,
}

/// Deferred action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerAction {
    /// Dialing finished
    Connect,
    /// Play the scripted customer line for `step`
    CustomerLine { step: usize },
    /// Deliver the agent line of `step`
    Deliver { step: usize },
    /// Closing line done, end the call
    Finish,
}

/// A timer that has fired, tagged with the epoch it was scheduled in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerFire {
    pub epoch: u64,
    pub action: TimerAction,
}

/// Request to run `fire` after `delay`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledAction {
    pub slot: TimerSlot,
    pub delay: Duration,
    pub fire: TimerFire,
}

/// Why a call ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EndReason {
    /// The script ran out
    ScriptComplete,
    /// User wrapped the call up
    WrappedUp,
    /// User hung up
    HungUp,
}

impl EndReason {
    fn meta(&self) -> &'static str {
        match self {
            EndReason::ScriptComplete => "completed",
            EndReason::WrappedUp => "wrap-up",
            EndReason::HungUp => "hang-up",
        }
    }

    fn summary(&self) -> &'static str {
        match self {
            EndReason::ScriptComplete => "Call completed",
            EndReason::WrappedUp => "Call wrapped up",
            EndReason::HungUp => "Call disconnected",
        }
    }
}

/// Inputs accepted by the session
#[derive(Debug, Clone, PartialEq)]
pub enum CallInput {
    /// Launch or restart a call
    Start,
    /// A scheduled action is due
    Fire(TimerFire),
    /// Manual customer reply
    Reply(String),
    /// End the call with a closing line
    WrapUp,
    /// End the call immediately
    HangUp,
    /// Return a completed call to idle
    Reset,
    SetAutoPilot(bool),
    SetVoice(bool),
    /// Edit the scenario used by the next call
    UpdateScenario(Scenario),
}

/// Session notifications
#[derive(Debug, Clone, PartialEq)]
pub enum CallEvent {
    StateChanged { from: CallState, to: CallState },
    MessageAdded(Message),
    StepStarted { index: usize, stage: ScriptStage },
    AwaitingResponse(bool),
    Ended { reason: EndReason, duration: Duration },
    /// Once per second while in progress
    DurationTick(Duration),
}

/// Side effects for the controller to carry out
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Schedule(ScheduledAction),
    /// Abort every pending timer
    CancelTimers,
    Speak(String),
    CancelSpeech,
    Notify(CallEvent),
}

/// Point-in-time view of a session
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub state: CallState,
    pub step_index: usize,
    pub step_count: usize,
    pub stage: Option<ScriptStage>,
    pub coaching_note: Option<String>,
    pub awaiting_response: bool,
    pub auto_pilot: bool,
    pub voice_enabled: bool,
    pub scenario: Scenario,
    pub transcript: Transcript,
    pub highlights: Vec<String>,
    pub duration: Duration,
    pub end_reason: Option<EndReason>,
}

impl SessionSnapshot {
    pub fn duration_label(&self) -> String {
        format_duration(self.duration)
    }
}

/// Simulated call session
pub struct CallSession {
    state: CallState,
    /// Editable scenario for the next call
    scenario: Scenario,
    /// Scenario frozen at call start
    active_scenario: Scenario,
    script: Script,
    script_builder: ScriptBuilder,
    step_index: usize,
    awaiting_response: bool,
    auto_pilot: bool,
    voice_enabled: bool,
    transcript: Transcript,
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
    end_reason: Option<EndReason>,
    epoch: u64,
    pacing: PacingConfig,
}

impl CallSession {
    /// Create an idle session
    pub fn new(scenario: Scenario, pacing: PacingConfig) -> Self {
        Self {
            state: CallState::Idle,
            active_scenario: scenario.clone(),
            scenario,
            script: Script::default(),
            script_builder: build_script,
            step_index: 0,
            awaiting_response: false,
            auto_pilot: true,
            voice_enabled: false,
            transcript: Transcript::new(),
            started_at: None,
            ended_at: None,
            end_reason: None,
            epoch: 0,
            pacing,
        }
    }

    /// Use a different script for subsequent calls
    pub fn with_script_builder(mut self, builder: ScriptBuilder) -> Self {
        self.script_builder = builder;
        self
    }

    pub fn with_auto_pilot(mut self, enabled: bool) -> Self {
        self.auto_pilot = enabled;
        self
    }

    pub fn with_voice(mut self, enabled: bool) -> Self {
        self.voice_enabled = enabled;
        self
    }

    pub fn state(&self) -> CallState {
        self.state
    }

    pub fn step_index(&self) -> usize {
        self.step_index
    }

    pub fn awaiting_response(&self) -> bool {
        self.awaiting_response
    }

    pub fn auto_pilot(&self) -> bool {
        self.auto_pilot
    }

    pub fn voice_enabled(&self) -> bool {
        self.voice_enabled
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn script(&self) -> &Script {
        &self.script
    }

    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn duration(&self, now: DateTime<Utc>) -> Duration {
        call_duration(self.started_at, self.ended_at, now)
    }

    pub fn highlights(&self) -> Vec<String> {
        derive_highlights(&self.transcript)
    }

    pub fn snapshot(&self, now: DateTime<Utc>) -> SessionSnapshot {
        let step = if self.state == CallState::InProgress {
            self.script.get(self.step_index)
        } else {
            None
        };

        SessionSnapshot {
            state: self.state,
            step_index: self.step_index,
            step_count: self.script.len(),
            stage: step.map(|s| s.stage),
            coaching_note: step.map(|s| s.coaching_note.clone()),
            awaiting_response: self.awaiting_response,
            auto_pilot: self.auto_pilot,
            voice_enabled: self.voice_enabled,
            scenario: self.scenario.clone(),
            transcript: self.transcript.clone(),
            highlights: self.highlights(),
            duration: self.duration(now),
            end_reason: self.end_reason,
        }
    }

    /// Apply one input and return the effects to execute
    pub fn handle<R: Rng + ?Sized>(
        &mut self,
        input: CallInput,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Vec<Effect> {
        let mut fx = Vec::new();

        match input {
            CallInput::Start => self.start(now, rng, &mut fx),
            CallInput::Fire(fire) => self.on_fire(fire, now, rng, &mut fx),
            CallInput::Reply(text) => self.on_reply(text, now, rng, &mut fx),
            CallInput::WrapUp => {
                if self.state == CallState::InProgress {
                    self.end_call(EndReason::WrappedUp, Some(WRAP_UP_LINE), now, &mut fx);
                } else {
                    tracing::debug!(state = %self.state, "wrap-up ignored");
                }
            }
            CallInput::HangUp => {
                if self.state == CallState::InProgress {
                    self.end_call(EndReason::HungUp, None, now, &mut fx);
                } else {
                    tracing::debug!(state = %self.state, "hang-up ignored");
                }
            }
            CallInput::Reset => self.reset(&mut fx),
            CallInput::SetAutoPilot(enabled) => self.set_auto_pilot(enabled, rng, &mut fx),
            CallInput::SetVoice(enabled) => {
                self.voice_enabled = enabled;
                if !enabled {
                    fx.push(Effect::CancelSpeech);
                }
            }
            CallInput::UpdateScenario(scenario) => {
                if self.state.is_live() {
                    tracing::debug!("scenario updated; applies to the next call");
                }
                self.scenario = scenario;
            }
        }

        fx
    }

    fn transition(&mut self, to: CallState, fx: &mut Vec<Effect>) {
        let from = self.state;
        if from == to {
            return;
        }
        self.state = to;
        tracing::info!(from = %from, to = %to, epoch = self.epoch, "call state changed");
        fx.push(Effect::Notify(CallEvent::StateChanged { from, to }));
    }

    fn append(&mut self, message: Message, fx: &mut Vec<Effect>) {
        self.transcript.push(message.clone());
        fx.push(Effect::Notify(CallEvent::MessageAdded(message)));
    }

    fn schedule<R: Rng + ?Sized>(
        &self,
        slot: TimerSlot,
        action: TimerAction,
        range: &call_sim_config::DelayRange,
        rng: &mut R,
        fx: &mut Vec<Effect>,
    ) {
        let delay = sample_delay(range, rng);
        let ms = delay.as_millis() as u64;
        tracing::debug!(?slot, ?action, ms, "scheduled");
        fx.push(Effect::Schedule(ScheduledAction {
            slot,
            delay,
            fire: TimerFire {
                epoch: self.epoch,
                action,
            },
        }));
    }

    /// Drop everything from the previous call
    fn clear_call(&mut self, fx: &mut Vec<Effect>) {
        fx.push(Effect::CancelTimers);
        fx.push(Effect::CancelSpeech);
        self.epoch += 1;
        self.transcript.clear();
        self.started_at = None;
        self.ended_at = None;
        self.end_reason = None;
        self.step_index = 0;
        self.awaiting_response = false;
    }

    fn start<R: Rng + ?Sized>(&mut self, _now: DateTime<Utc>, rng: &mut R, fx: &mut Vec<Effect>) {
        self.clear_call(fx);

        self.active_scenario = self.scenario.clone();
        self.script = (self.script_builder)(&self.active_scenario);

        // Restarting while dialing still notifies
        let from = self.state;
        self.state = CallState::Dialing;
        tracing::info!(from = %from, epoch = self.epoch, "dialing");
        fx.push(Effect::Notify(CallEvent::StateChanged {
            from,
            to: CallState::Dialing,
        }));

        let dial = self.pacing.dial;
        self.schedule(TimerSlot::Agent, TimerAction::Connect, &dial, rng, fx);
    }

    fn reset(&mut self, fx: &mut Vec<Effect>) {
        if self.state != CallState::Completed {
            tracing::debug!(state = %self.state, "reset ignored");
            return;
        }
        self.clear_call(fx);
        self.transition(CallState::Idle, fx);
    }

    fn on_fire<R: Rng + ?Sized>(
        &mut self,
        fire: TimerFire,
        now: DateTime<Utc>,
        rng: &mut R,
        fx: &mut Vec<Effect>,
    ) {
        if fire.epoch != self.epoch {
            tracing::debug!(stale = fire.epoch, current = self.epoch, "dropped stale timer");
            return;
        }

        match (self.state, fire.action) {
            (CallState::Dialing, TimerAction::Connect) => self.connect(now, rng, fx),
            (CallState::InProgress, TimerAction::CustomerLine { step })
                if step == self.step_index && !self.awaiting_response =>
            {
                self.play_customer_line(step, now, rng, fx)
            }
            (CallState::InProgress, TimerAction::Deliver { step }) if step == self.step_index + 1 => {
                self.deliver_step(step, now, rng, fx)
            }
            (CallState::InProgress, TimerAction::Finish) => {
                self.end_call(EndReason::ScriptComplete, None, now, fx)
            }
            (state, action) => {
                tracing::debug!(state = %state, ?action, "timer ignored");
            }
        }
    }

    fn connect<R: Rng + ?Sized>(&mut self, now: DateTime<Utc>, rng: &mut R, fx: &mut Vec<Effect>) {
        self.started_at = Some(now);
        self.transition(CallState::InProgress, fx);

        let connected = Message::system(
            format!(
                "Connected to {} at {}",
                self.active_scenario.customer_name, self.active_scenario.company_name
            ),
            now,
        )
        .with_meta("connected");
        self.append(connected, fx);

        self.deliver_step(0, now, rng, fx);
    }

    fn deliver_step<R: Rng + ?Sized>(
        &mut self,
        index: usize,
        now: DateTime<Utc>,
        rng: &mut R,
        fx: &mut Vec<Effect>,
    ) {
        let Some(step) = self.script.get(index).cloned() else {
            self.step_index = self.script.len();
            self.end_call(EndReason::ScriptComplete, Some(DEFAULT_CLOSING_LINE), now, fx);
            return;
        };

        self.step_index = index;
        fx.push(Effect::Notify(CallEvent::StepStarted {
            index,
            stage: step.stage,
        }));

        let line = fill_placeholders(&step.agent_line, &self.active_scenario);
        self.append(
            Message::agent(line.clone(), now).with_meta(step.stage.display_name()),
            fx,
        );
        if self.voice_enabled {
            fx.push(Effect::Speak(line));
        }

        match step.customer_line {
            None => {
                let finish = self.pacing.final_step;
                self.schedule(TimerSlot::Agent, TimerAction::Finish, &finish, rng, fx);
            }
            Some(_) if self.auto_pilot => {
                let reply = self.pacing.customer_reply;
                self.schedule(
                    TimerSlot::Customer,
                    TimerAction::CustomerLine { step: index },
                    &reply,
                    rng,
                    fx,
                );
            }
            Some(_) => {
                self.awaiting_response = true;
                fx.push(Effect::Notify(CallEvent::AwaitingResponse(true)));
            }
        }
    }

    fn play_customer_line<R: Rng + ?Sized>(
        &mut self,
        step: usize,
        now: DateTime<Utc>,
        rng: &mut R,
        fx: &mut Vec<Effect>,
    ) {
        let Some(template) = self.script.get(step).and_then(|s| s.customer_line.clone()) else {
            return;
        };
        let line = fill_placeholders(&template, &self.active_scenario);
        self.append(Message::customer(line, now), fx);

        let advance = self.pacing.auto_advance;
        self.schedule(
            TimerSlot::Agent,
            TimerAction::Deliver { step: step + 1 },
            &advance,
            rng,
            fx,
        );
    }

    fn on_reply<R: Rng + ?Sized>(
        &mut self,
        text: String,
        now: DateTime<Utc>,
        rng: &mut R,
        fx: &mut Vec<Effect>,
    ) {
        if self.state != CallState::InProgress || !self.awaiting_response {
            tracing::debug!(state = %self.state, "reply ignored");
            return;
        }
        if text.trim().is_empty() {
            return;
        }

        self.append(Message::customer(text, now), fx);
        self.awaiting_response = false;
        fx.push(Effect::Notify(CallEvent::AwaitingResponse(false)));

        // Content never changes which step comes next
        let advance = self.pacing.manual_advance;
        self.schedule(
            TimerSlot::Agent,
            TimerAction::Deliver {
                step: self.step_index + 1,
            },
            &advance,
            rng,
            fx,
        );
    }

    fn set_auto_pilot<R: Rng + ?Sized>(&mut self, enabled: bool, rng: &mut R, fx: &mut Vec<Effect>) {
        self.auto_pilot = enabled;

        if enabled && self.state == CallState::InProgress && self.awaiting_response {
            self.awaiting_response = false;
            fx.push(Effect::Notify(CallEvent::AwaitingResponse(false)));
            let reply = self.pacing.customer_reply;
            self.schedule(
                TimerSlot::Customer,
                TimerAction::CustomerLine {
                    step: self.step_index,
                },
                &reply,
                rng,
                fx,
            );
        }
    }

    fn end_call(
        &mut self,
        reason: EndReason,
        closing: Option<&str>,
        now: DateTime<Utc>,
        fx: &mut Vec<Effect>,
    ) {
        fx.push(Effect::CancelTimers);
        fx.push(Effect::CancelSpeech);
        self.awaiting_response = false;

        if let Some(template) = closing {
            let line = fill_placeholders(template, &self.active_scenario);
            self.append(Message::agent(line.clone(), now).with_meta("closing"), fx);
            if self.voice_enabled {
                fx.push(Effect::Speak(line));
            }
        }

        self.ended_at = Some(now);
        self.end_reason = Some(reason);
        let duration = self.duration(now);

        self.append(
            Message::system(
                format!("{} after {}", reason.summary(), format_duration(duration)),
                now,
            )
            .with_meta(reason.meta()),
            fx,
        );

        self.transition(CallState::Completed, fx);
        fx.push(Effect::Notify(CallEvent::Ended { reason, duration }));
    }
}
