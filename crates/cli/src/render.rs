//! Terminal rendering of call events

use call_sim_agent::{format_duration, CallEvent, SessionSnapshot};
use call_sim_core::{Message, Role};

pub fn render_message(message: &Message) -> String {
    let time = message.timestamp.format("%H:%M:%S");
    match message.role {
        Role::System => format!("[{}] -- {} --", time, message.text),
        role => match &message.meta {
            Some(meta) if role == Role::Agent => {
                format!("[{}] {} ({}): {}", time, role.display_name(), meta, message.text)
            }
            _ => format!("[{}] {}: {}", time, role.display_name(), message.text),
        },
    }
}

/// Line to print for an event, if any
pub fn render_event(event: &CallEvent) -> Option<String> {
    match event {
        CallEvent::MessageAdded(message) => Some(render_message(message)),
        CallEvent::StateChanged { to, .. } => Some(format!("* {}", to)),
        CallEvent::AwaitingResponse(true) => Some("> your turn: type the customer's reply".to_string()),
        CallEvent::Ended { duration, .. } => Some(format!("* duration {}", format_duration(*duration))),
        CallEvent::AwaitingResponse(false)
        | CallEvent::StepStarted { .. }
        | CallEvent::DurationTick(_) => None,
    }
}

pub fn render_status(snapshot: &SessionSnapshot) -> String {
    let mut lines = vec![format!(
        "state: {}  duration: {}  auto-pilot: {}  voice: {}",
        snapshot.state,
        snapshot.duration_label(),
        on_off(snapshot.auto_pilot),
        on_off(snapshot.voice_enabled),
    )];

    if let Some(stage) = snapshot.stage {
        lines.push(format!(
            "step {}/{}: {}",
            snapshot.step_index + 1,
            snapshot.step_count,
            stage
        ));
    }
    if let Some(note) = &snapshot.coaching_note {
        lines.push(format!("coaching: {}", note));
    }
    lines.push(format!(
        "next call: {} at {} ({})",
        snapshot.scenario.customer_name, snapshot.scenario.company_name, snapshot.scenario.goal
    ));

    lines.join("\n")
}

pub fn render_highlights(snapshot: &SessionSnapshot) -> String {
    snapshot
        .highlights
        .iter()
        .map(|h| format!("  - {}", h))
        .collect::<Vec<_>>()
        .join("\n")
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}
