//! Call highlights
//!
//! Heuristic key moments pulled from the transcript with fixed regex checks.

use once_cell::sync::Lazy;
use regex::Regex;

use call_sim_core::{Role, Transcript};

/// Shown before any message exists, in this order
pub const PLACEHOLDER_HIGHLIGHTS: [&str; 3] = [
    "Waiting for the call to connect",
    "Diagnostic results will appear here",
    "Booking details will appear here",
];

pub const BOOKING_HIGHLIGHT: &str = "Technician visit booked";
pub const DIAGNOSTIC_HIGHLIGHT: &str = "Diagnostic results shared";
/// Shown once the call has messages but nothing has matched yet
pub const NO_HIGHLIGHTS_YET: &str = "Call underway, no key moments yet";

/// Customer quotes longer than this are cut and marked with an ellipsis
pub const CUSTOMER_QUOTE_MAX_CHARS: usize = 70;

static BOOKING_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(booked|scheduled|appointment is set|you're all set)\b").unwrap()
});

static DIAGNOSTIC_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(readings? show|diagnostic (shows|results?)|underperforming)\b").unwrap()
});

/// Cut `text` to `max` characters, appending "…" when anything was dropped
pub fn truncate_with_ellipsis(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max).collect();
    cut.truncate(cut.trim_end().len());
    cut.push('…');
    cut
}

fn push_unique(highlights: &mut Vec<String>, item: String) {
    if !highlights.contains(&item) {
        highlights.push(item);
    }
}

/// Derive highlights from a transcript
///
/// Checks run in a fixed order: booking wording in agent lines, diagnostic
/// wording in agent lines, then the latest customer message.
pub fn derive_highlights(transcript: &Transcript) -> Vec<String> {
    if transcript.is_empty() {
        return PLACEHOLDER_HIGHLIGHTS.iter().map(|s| s.to_string()).collect();
    }

    let mut highlights = Vec::with_capacity(3);

    if transcript
        .by_role(Role::Agent)
        .any(|m| BOOKING_PATTERN.is_match(&m.text))
    {
        push_unique(&mut highlights, BOOKING_HIGHLIGHT.to_string());
    }

    if transcript
        .by_role(Role::Agent)
        .any(|m| DIAGNOSTIC_PATTERN.is_match(&m.text))
    {
        push_unique(&mut highlights, DIAGNOSTIC_HIGHLIGHT.to_string());
    }

    if let Some(last) = transcript.last_by_role(Role::Customer) {
        let quote = truncate_with_ellipsis(last.text.trim(), CUSTOMER_QUOTE_MAX_CHARS);
        push_unique(&mut highlights, format!("Customer: \"{}\"", quote));
    }

    if highlights.is_empty() {
        highlights.push(NO_HIGHLIGHTS_YET.to_string());
    }

    highlights
}
