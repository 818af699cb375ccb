//! Goal-to-focus-point extraction
//!
//! Turns the free-text goal into up to three short agenda items for the
//! opening line. Always succeeds.

use once_cell::sync::Lazy;
use regex::Regex;

/// Fragments at or below this length are ignored
const MIN_FRAGMENT_CHARS: usize = 8;

/// Number of focus points the opening line wants
pub const FOCUS_POINT_COUNT: usize = 3;

/// Fallback agenda, used in order to pad short goals
pub const DEFAULT_FOCUS_POINTS: [&str; FOCUS_POINT_COUNT] = [
    "confirm the issue you're seeing",
    "walk through a quick diagnostic",
    "lock in next steps",
];

static SENTENCE_SPLIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]+").unwrap());

static CLAUSE_SPLIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)[,;]|\band\b").unwrap());

fn fragments(text: &str, splitter: &Regex) -> Vec<String> {
    splitter
        .split(text)
        .map(|f| f.trim().trim_end_matches(['.', '!', '?']).trim())
        .filter(|f| f.chars().count() > MIN_FRAGMENT_CHARS)
        .map(str::to_string)
        .collect()
}

/// Extract focus points from a goal
///
/// Sentence split first; two or more usable sentences give up to three
/// points. Otherwise the goal is split on commas, semicolons and "and",
/// and the result is padded with [`DEFAULT_FOCUS_POINTS`] up to three.
pub fn extract_focus_points(goal: &str) -> Vec<String> {
    let sentences = fragments(goal, &SENTENCE_SPLIT);
    if sentences.len() >= 2 {
        return sentences.into_iter().take(FOCUS_POINT_COUNT).collect();
    }

    let mut points: Vec<String> = fragments(goal, &CLAUSE_SPLIT)
        .into_iter()
        .take(FOCUS_POINT_COUNT)
        .collect();

    for default in DEFAULT_FOCUS_POINTS {
        if points.len() >= FOCUS_POINT_COUNT {
            break;
        }
        if !points.iter().any(|p| p.eq_ignore_ascii_case(default)) {
            points.push(default.to_string());
        }
    }

    points
}

/// Join focus points as prose: "a", "a and b", "a, b, and c"
pub fn join_focus_points(points: &[String]) -> String {
    match points {
        [] => String::new(),
        [one] => one.clone(),
        [a, b] => format!("{} and {}", a, b),
        [init @ .., last] => format!("{}, and {}", init.join(", "), last),
    }
}

/// Lowercase the first character so a point reads mid-sentence
pub fn lowercase_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
