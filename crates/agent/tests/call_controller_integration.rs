//! Integration tests for the call controller (session -> timers -> speech)
//!
//! These run on a paused tokio clock, so the default pacing ranges elapse
//! instantly while keeping their relative order.

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::time::timeout;

use call_sim_agent::{
    CallController, CallEvent, CallHandle, CallSession, ControllerConfig, EndReason,
    PLACEHOLDER_HIGHLIGHTS,
};
use call_sim_config::PacingConfig;
use call_sim_core::{CallState, ManualClock, Role, Scenario, SystemClock};
use call_sim_pipeline::{RecordingSpeech, SpeechCommand};

const WAIT: Duration = Duration::from_secs(120);

fn spawn(auto_pilot: bool, voice: bool) -> (CallHandle, RecordingSpeech) {
    let session = CallSession::new(
        Scenario::new("Sam", "Acme", "Verify output dips, offer diagnostic, and book a technician."),
        PacingConfig::default(),
    )
    .with_auto_pilot(auto_pilot)
    .with_voice(voice);

    let speech = RecordingSpeech::new();
    let (handle, _task) = CallController::spawn(
        session,
        Arc::new(speech.clone()),
        Arc::new(SystemClock),
        StdRng::seed_from_u64(11),
        ControllerConfig::default(),
    );
    (handle, speech)
}

/// Initial snapshot reflects an idle session
#[tokio::test(start_paused = true)]
async fn test_idle_snapshot() {
    let (handle, _) = spawn(true, false);
    let snapshot = handle.snapshot();

    assert_eq!(snapshot.state, CallState::Idle);
    assert!(snapshot.transcript.is_empty());
    assert_eq!(snapshot.highlights, PLACEHOLDER_HIGHLIGHTS.map(String::from).to_vec());
}

/// Auto-pilot call runs from dialing to completion on its own
#[tokio::test(start_paused = true)]
async fn test_auto_pilot_call_completes() {
    let (handle, _) = spawn(true, false);
    let mut events = handle.subscribe();

    handle.start().unwrap();
    let snapshot = timeout(WAIT, handle.wait_for_state(CallState::Completed))
        .await
        .expect("call did not complete")
        .unwrap();

    assert_eq!(snapshot.end_reason, Some(EndReason::ScriptComplete));
    assert_eq!(snapshot.transcript.by_role(Role::Agent).count(), 7);
    assert_eq!(snapshot.transcript.by_role(Role::Customer).count(), 6);
    assert!(snapshot.highlights.contains(&"Technician visit booked".to_string()));
    assert!(snapshot.highlights.contains(&"Diagnostic results shared".to_string()));

    let mut states = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let CallEvent::StateChanged { to, .. } = event {
            states.push(to);
        }
    }
    assert_eq!(
        states,
        vec![CallState::Dialing, CallState::InProgress, CallState::Completed]
    );
}

/// Step index never goes backwards while the call is live
#[tokio::test(start_paused = true)]
async fn test_step_index_monotonic() {
    let (handle, _) = spawn(true, false);
    let mut events = handle.subscribe();

    handle.start().unwrap();
    timeout(WAIT, handle.wait_for_state(CallState::Completed))
        .await
        .unwrap()
        .unwrap();

    let mut steps = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let CallEvent::StepStarted { index, .. } = event {
            steps.push(index);
        }
    }
    assert_eq!(steps, (0..7).collect::<Vec<_>>());
}

/// Manual replies are recorded verbatim and advance the script
#[tokio::test(start_paused = true)]
async fn test_manual_reply_flow() {
    let (handle, _) = spawn(false, false);

    handle.start().unwrap();
    let waiting = timeout(WAIT, handle.wait_for(|s| s.awaiting_response))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(waiting.step_index, 0);

    handle.reply("Sounds urgent").unwrap();
    let next = timeout(WAIT, handle.wait_for(|s| s.step_index == 1 && s.awaiting_response))
        .await
        .unwrap()
        .unwrap();

    let customer: Vec<_> = next
        .transcript
        .by_role(Role::Customer)
        .map(|m| m.text.clone())
        .collect();
    assert_eq!(customer, vec!["Sounds urgent".to_string()]);

    handle.wrap_up().unwrap();
    let done = timeout(WAIT, handle.wait_for_state(CallState::Completed))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(done.end_reason, Some(EndReason::WrappedUp));
}

/// Hanging up cancels pending timers so nothing else is appended
#[tokio::test(start_paused = true)]
async fn test_hang_up_stops_delivery() {
    let (handle, speech) = spawn(true, true);

    handle.start().unwrap();
    timeout(WAIT, handle.wait_for(|s| s.state == CallState::InProgress))
        .await
        .unwrap()
        .unwrap();

    handle.hang_up().unwrap();
    let ended = timeout(WAIT, handle.wait_for_state(CallState::Completed))
        .await
        .unwrap()
        .unwrap();
    let len = ended.transcript.len();

    tokio::time::sleep(Duration::from_secs(30)).await;
    let later = handle.snapshot();
    assert_eq!(later.transcript.len(), len);
    assert_eq!(later.state, CallState::Completed);

    assert_eq!(speech.commands().last(), Some(&SpeechCommand::Cancel));
}

/// Restarting clears the old transcript and ignores the old call's timers
#[tokio::test(start_paused = true)]
async fn test_restart_mid_call() {
    let (handle, _) = spawn(true, false);

    handle.start().unwrap();
    timeout(WAIT, handle.wait_for(|s| s.transcript.len() >= 3))
        .await
        .unwrap()
        .unwrap();

    handle.start().unwrap();
    let dialing = timeout(WAIT, handle.wait_for(|s| s.state == CallState::Dialing))
        .await
        .unwrap()
        .unwrap();
    assert!(dialing.transcript.is_empty());

    let done = timeout(WAIT, handle.wait_for_state(CallState::Completed))
        .await
        .unwrap()
        .unwrap();
    let connected = done
        .transcript
        .iter()
        .filter(|m| m.meta.as_deref() == Some("connected"))
        .count();
    assert_eq!(connected, 1);
    assert_eq!(done.transcript.by_role(Role::Agent).count(), 7);
}

/// Voice-enabled calls speak agent lines in order
#[tokio::test(start_paused = true)]
async fn test_voice_speaks_agent_lines() {
    let (handle, speech) = spawn(true, true);

    handle.start().unwrap();
    let done = timeout(WAIT, handle.wait_for_state(CallState::Completed))
        .await
        .unwrap()
        .unwrap();

    let agent_lines: Vec<_> = done
        .transcript
        .by_role(Role::Agent)
        .map(|m| m.text.clone())
        .collect();
    assert_eq!(speech.spoken(), agent_lines);
}

/// Reset returns a completed call to idle
#[tokio::test(start_paused = true)]
async fn test_reset_after_completion() {
    let (handle, _) = spawn(true, false);

    handle.start().unwrap();
    timeout(WAIT, handle.wait_for_state(CallState::Completed))
        .await
        .unwrap()
        .unwrap();

    handle.reset().unwrap();
    let idle = timeout(WAIT, handle.wait_for_state(CallState::Idle))
        .await
        .unwrap()
        .unwrap();
    assert!(idle.transcript.is_empty());
    assert_eq!(idle.duration, Duration::ZERO);
}

/// Commands fail cleanly once the controller is gone
#[tokio::test(start_paused = true)]
async fn test_shutdown_closes_handle() {
    let session = CallSession::new(Scenario::default(), PacingConfig::default());
    let (handle, task) = CallController::spawn(
        session,
        Arc::new(RecordingSpeech::new()),
        Arc::new(SystemClock),
        StdRng::seed_from_u64(3),
        ControllerConfig::default(),
    );

    handle.shutdown();
    task.await.unwrap();
    assert!(handle.start().is_err());
}

/// Duration is measured on the injected clock from connect to end
#[tokio::test(start_paused = true)]
async fn test_duration_uses_clock() {
    let clock = ManualClock::default();
    let session = CallSession::new(Scenario::default(), PacingConfig::default()).with_auto_pilot(false);
    let (handle, _task) = CallController::spawn(
        session,
        Arc::new(RecordingSpeech::new()),
        Arc::new(clock.clone()),
        StdRng::seed_from_u64(5),
        ControllerConfig::default(),
    );

    handle.start().unwrap();
    timeout(WAIT, handle.wait_for(|s| s.awaiting_response))
        .await
        .unwrap()
        .unwrap();

    clock.advance(chrono::Duration::seconds(75));
    handle.hang_up().unwrap();
    let done = timeout(WAIT, handle.wait_for_state(CallState::Completed))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(done.duration, Duration::from_secs(75));
    assert_eq!(done.duration_label(), "01:15");
    assert_eq!(done.transcript.last().unwrap().text, "Call disconnected after 01:15");
}
