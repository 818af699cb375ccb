//! Call duration helpers

use std::time::Duration;

use chrono::{DateTime, Utc};

/// Format as `MM:SS`; minutes keep counting past 59
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Elapsed call time: end minus start, or now minus start while live
pub fn call_duration(
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Duration {
    match started_at {
        Some(start) => (ended_at.unwrap_or(now) - start).to_std().unwrap_or_default(),
        None => Duration::ZERO,
    }
}
