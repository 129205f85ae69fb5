//! `[[Player Name]]` markup the prompts ask the model to emit.

use once_cell::sync::Lazy;
use regex::Regex;

static PLAYER_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\[(.*?)\]\]").expect("player tag pattern"));
static PARAGRAPH_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\n\\n|\r?\n\s*\r?\n").expect("paragraph break pattern"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Player(String),
}

pub fn paragraphs(text: &str) -> Vec<&str> {
    PARAGRAPH_BREAK
        .split(text)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}

/// Splits a paragraph into plain runs and player mentions, in order.
/// Empty runs between adjacent tags are skipped.
pub fn segments(paragraph: &str) -> Vec<Segment> {
    let mut out = Vec::new();
    let mut last = 0;
    for caps in PLAYER_TAG.captures_iter(paragraph) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        if whole.start() > last {
            out.push(Segment::Text(paragraph[last..whole.start()].to_string()));
        }
        let name = caps.get(1).map(|m| m.as_str().trim()).unwrap_or_default();
        if name.is_empty() {
            out.push(Segment::Text(whole.as_str().to_string()));
        } else {
            out.push(Segment::Player(name.to_string()));
        }
        last = whole.end();
    }
    if last < paragraph.len() {
        out.push(Segment::Text(paragraph[last..].to_string()));
    }
    out
}

pub fn mentioned_players(text: &str) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for caps in PLAYER_TAG.captures_iter(text) {
        let Some(name) = caps.get(1).map(|m| m.as_str().trim()) else {
            continue;
        };
        if name.is_empty() || seen.iter().any(|s| s == name) {
            continue;
        }
        seen.push(name.to_string());
    }
    seen
}

pub fn strip_markup(text: &str) -> String {
    PLAYER_TAG.replace_all(text, "$1").into_owned()
}
