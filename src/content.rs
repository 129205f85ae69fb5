use std::collections::BTreeMap;
use std::fmt;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const ODDS_NOTE: &str = "Odds are illustrative, AI-generated estimates for informational purposes only and are not real-time betting lines.";
pub const PREDICTIONS_NOTE: &str =
    "AI forecasts are experimental and for entertainment only. Always gamble responsibly.";
const MAX_SUGGESTIONS: usize = 6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fixture {
    pub date: String,
    #[serde(default)]
    pub competition: String,
    pub home_team: String,
    pub away_team: String,
    #[serde(default)]
    pub time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerProfile {
    pub name: String,
    #[serde(default)]
    pub club: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub recent_performance: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparedPlayer {
    #[serde(flatten)]
    pub profile: PlayerProfile,
    #[serde(default)]
    pub comparison_verdict: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerComparison {
    pub players: Vec<ComparedPlayer>,
    #[serde(default)]
    pub overall_analysis: String,
}

/// Pitch coordinates in percent: `x` left to right, `y` from the own goal line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerPosition {
    pub position: String,
    pub x: f32,
    pub y: f32,
}

impl PlayerPosition {
    pub fn is_goalkeeper(&self) -> bool {
        self.position.to_lowercase().contains("goalkeeper")
    }

    /// Maps onto a `cols` x `rows` grid with the own goal on the bottom row.
    pub fn grid_cell(&self, cols: u16, rows: u16) -> (u16, u16) {
        let scale = |pct: f32, cells: u16| -> u16 {
            if cells == 0 {
                return 0;
            }
            let max = f32::from(cells - 1);
            ((pct.clamp(0.0, 100.0) / 100.0) * max).round() as u16
        };
        let col = scale(self.x, cols);
        let row = scale(100.0 - self.y, rows);
        (col, row)
    }

    pub fn marker(&self) -> char {
        self.position
            .chars()
            .next()
            .map(|c| c.to_ascii_uppercase())
            .unwrap_or('?')
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TacticalData {
    pub formation_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub players: Vec<PlayerPosition>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    #[serde(rename = "Home Win", alias = "HomeWin", alias = "home")]
    HomeWin,
    #[serde(rename = "Draw", alias = "draw")]
    Draw,
    #[serde(rename = "Away Win", alias = "AwayWin", alias = "away")]
    AwayWin,
}

impl Outcome {
    pub fn label(self) -> &'static str {
        match self {
            Outcome::HomeWin => "Home Win",
            Outcome::Draw => "Draw",
            Outcome::AwayWin => "Away Win",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub home_team: String,
    pub away_team: String,
    pub predicted_outcome: Outcome,
    pub confidence_score: f32,
    #[serde(default)]
    pub reasoning: String,
    #[serde(default)]
    pub suggested_score: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceBand {
    High,
    Medium,
    Low,
}

pub fn confidence_band(score: f32) -> ConfidenceBand {
    if score >= 75.0 {
        ConfidenceBand::High
    } else if score >= 50.0 {
        ConfidenceBand::Medium
    } else {
        ConfidenceBand::Low
    }
}

/// Odds arrive either as numbers or as preformatted strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OddValue {
    Number(f64),
    Text(String),
}

impl fmt::Display for OddValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OddValue::Number(n) => write!(f, "{n:.2}"),
            OddValue::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OddsLine {
    #[serde(rename = "1")]
    pub home: OddValue,
    #[serde(rename = "X")]
    pub draw: OddValue,
    #[serde(rename = "2")]
    pub away: OddValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BettingOdd {
    pub home_team: String,
    pub away_team: String,
    pub odds: OddsLine,
    #[serde(default)]
    pub match_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BettingInfo {
    pub strategic_advice: String,
    #[serde(default)]
    pub odds: Vec<BettingOdd>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MatchStatus {
    FullTime,
    HalfTime,
    Live,
    Scheduled,
    Postponed,
    Cancelled,
    Other(String),
}

impl From<String> for MatchStatus {
    fn from(raw: String) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "ft" | "finished" | "full time" => MatchStatus::FullTime,
            "ht" | "half time" | "halftime" => MatchStatus::HalfTime,
            "live" | "in play" => MatchStatus::Live,
            "scheduled" | "upcoming" => MatchStatus::Scheduled,
            "postponed" => MatchStatus::Postponed,
            "cancelled" | "canceled" => MatchStatus::Cancelled,
            _ => MatchStatus::Other(raw.trim().to_string()),
        }
    }
}

impl From<MatchStatus> for String {
    fn from(status: MatchStatus) -> Self {
        match status {
            MatchStatus::FullTime => "FT".to_string(),
            MatchStatus::HalfTime => "HT".to_string(),
            MatchStatus::Live => "Live".to_string(),
            MatchStatus::Scheduled => "Scheduled".to_string(),
            MatchStatus::Postponed => "Postponed".to_string(),
            MatchStatus::Cancelled => "Cancelled".to_string(),
            MatchStatus::Other(raw) => raw,
        }
    }
}

impl MatchStatus {
    pub fn badge(&self) -> &str {
        match self {
            MatchStatus::Live => "LIVE",
            MatchStatus::HalfTime => "HT",
            MatchStatus::FullTime => "FT",
            MatchStatus::Scheduled => "UPCOMING",
            MatchStatus::Postponed => "PST",
            MatchStatus::Cancelled => "CANC",
            MatchStatus::Other(raw) => raw,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealtimeMatch {
    pub home_team: String,
    pub away_team: String,
    #[serde(default)]
    pub score: Option<String>,
    pub status: MatchStatus,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub competition: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingSource {
    pub title: String,
    pub uri: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GroundedMatchData {
    pub matches: Vec<RealtimeMatch>,
    pub sources: Vec<GroundingSource>,
}

/// Everything an analysis request needs to know about a match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchInfo {
    pub home_team: String,
    pub away_team: String,
    pub context: String,
    #[serde(default)]
    pub score: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    pub is_future: bool,
    pub entity_name: String,
}

impl MatchInfo {
    pub fn from_calendar(fixture: &Fixture, entity_name: &str) -> Self {
        Self {
            home_team: fixture.home_team.clone(),
            away_team: fixture.away_team.clone(),
            context: fixture.competition.clone(),
            score: None,
            date: Some(fixture.date.clone()),
            is_future: true,
            entity_name: entity_name.to_string(),
        }
    }

    pub fn from_realtime(m: &RealtimeMatch, title: &str) -> Self {
        let is_future = m.status == MatchStatus::Scheduled;
        Self {
            home_team: m.home_team.clone(),
            away_team: m.away_team.clone(),
            context: m.competition.clone(),
            score: m.score.clone(),
            date: if is_future { m.time.clone() } else { None },
            is_future,
            entity_name: title.to_string(),
        }
    }

    pub fn headline(&self) -> String {
        format!("{} vs {}", self.home_team, self.away_team)
    }

    pub fn subtitle(&self) -> String {
        match self.score.as_deref().filter(|s| !s.trim().is_empty()) {
            Some(score) => format!("{} - Final Score: {score}", self.context),
            None => self.context.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnalysisKind {
    PreMatch,
    Halftime,
    PostMatch,
}

impl AnalysisKind {
    pub const ALL: [AnalysisKind; 3] = [
        AnalysisKind::PreMatch,
        AnalysisKind::Halftime,
        AnalysisKind::PostMatch,
    ];

    pub fn label(self) -> &'static str {
        match self {
            AnalysisKind::PreMatch => "Pre-Match",
            AnalysisKind::Halftime => "Halftime",
            AnalysisKind::PostMatch => "Post-Match",
        }
    }

    pub fn initial_for(info: &MatchInfo) -> Self {
        if info.is_future {
            AnalysisKind::PreMatch
        } else {
            AnalysisKind::PostMatch
        }
    }

    /// A match that has not been played has no post-match analysis.
    pub fn is_available(self, info: &MatchInfo) -> bool {
        !(self == AnalysisKind::PostMatch && info.is_future)
    }

    pub fn next_available(self, info: &MatchInfo) -> Self {
        self.step(info, 1)
    }

    pub fn prev_available(self, info: &MatchInfo) -> Self {
        self.step(info, Self::ALL.len() - 1)
    }

    fn step(self, info: &MatchInfo, by: usize) -> Self {
        let start = Self::ALL.iter().position(|k| *k == self).unwrap_or(0);
        let mut idx = start;
        for _ in 0..Self::ALL.len() {
            idx = (idx + by) % Self::ALL.len();
            if Self::ALL[idx].is_available(info) {
                return Self::ALL[idx];
            }
        }
        self
    }
}

/// Removes a surrounding Markdown code fence (```json ... ```), if any.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

fn decode<T: serde::de::DeserializeOwned>(raw: &str, what: &'static str) -> Result<T> {
    serde_json::from_str(strip_code_fence(raw)).with_context(|| what)
}

pub fn parse_calendar_json(raw: &str) -> Result<Vec<Fixture>> {
    decode(raw, "Could not parse the calendar data.")
}

pub fn parse_player_profile_json(raw: &str) -> Result<PlayerProfile> {
    decode(raw, "Could not parse player profile.")
}

pub fn parse_comparison_json(raw: &str) -> Result<PlayerComparison> {
    decode(raw, "Could not parse player comparison data.")
}

pub fn parse_tactics_json(raw: &str) -> Result<TacticalData> {
    decode(raw, "Could not parse tactical data.")
}

pub fn parse_realtime_json(raw: &str) -> Result<Vec<RealtimeMatch>> {
    decode(raw, "Could not parse match data.")
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PredictionsPayload {
    List(Vec<Prediction>),
    Wrapped { predictions: Vec<Prediction> },
}

pub fn parse_predictions_json(raw: &str) -> Result<Vec<Prediction>> {
    let payload: PredictionsPayload = decode(raw, "Could not parse prediction data.")?;
    let mut predictions = match payload {
        PredictionsPayload::List(list) => list,
        PredictionsPayload::Wrapped { predictions } => predictions,
    };
    for p in &mut predictions {
        p.confidence_score = p.confidence_score.clamp(0.0, 100.0);
    }
    Ok(predictions)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SuggestionsPayload {
    List(Vec<String>),
    Wrapped { suggestions: Vec<String> },
}

pub fn parse_suggestions_json(raw: &str) -> Result<Vec<String>> {
    let payload: SuggestionsPayload = decode(raw, "Could not parse player suggestions.")?;
    let names = match payload {
        SuggestionsPayload::List(list) => list,
        SuggestionsPayload::Wrapped { suggestions } => suggestions,
    };
    let mut out: Vec<String> = Vec::with_capacity(names.len().min(MAX_SUGGESTIONS));
    for name in names {
        let name = name.trim();
        if name.is_empty() || out.iter().any(|n| n.eq_ignore_ascii_case(name)) {
            continue;
        }
        out.push(name.to_string());
        if out.len() == MAX_SUGGESTIONS {
            break;
        }
    }
    Ok(out)
}

/// Betting never fails: unparseable output is shown as advice without odds.
pub fn parse_betting_json(raw: &str) -> BettingInfo {
    serde_json::from_str::<BettingInfo>(strip_code_fence(raw)).unwrap_or_else(|_| BettingInfo {
        strategic_advice: raw.to_string(),
        odds: Vec::new(),
    })
}

pub fn parse_grounded_matches(raw: &str, sources: Vec<GroundingSource>) -> GroundedMatchData {
    let matches = serde_json::from_str::<Value>(strip_code_fence(raw))
        .ok()
        .and_then(|root| root.get("matches").cloned())
        .and_then(|v| serde_json::from_value::<Vec<RealtimeMatch>>(v).ok())
        .unwrap_or_default();
    GroundedMatchData { matches, sources }
}

pub fn advice_paragraphs(advice: &str) -> Vec<&str> {
    advice
        .lines()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}

/// Groups calendar fixtures by date. Parseable `YYYY-MM-DD` dates come first,
/// oldest first; anything else keeps its first-seen order at the end.
pub fn group_fixtures_by_date(fixtures: &[Fixture]) -> Vec<(String, Vec<&Fixture>)> {
    let mut dated: BTreeMap<NaiveDate, (String, Vec<&Fixture>)> = BTreeMap::new();
    let mut undated: Vec<(String, Vec<&Fixture>)> = Vec::new();
    for fixture in fixtures {
        let key = fixture.date.trim();
        match NaiveDate::parse_from_str(key, "%Y-%m-%d") {
            Ok(date) => dated
                .entry(date)
                .or_insert_with(|| (key.to_string(), Vec::new()))
                .1
                .push(fixture),
            Err(_) => match undated.iter_mut().find(|(k, _)| k == key) {
                Some((_, group)) => group.push(fixture),
                None => undated.push((key.to_string(), vec![fixture])),
            },
        }
    }
    dated.into_values().chain(undated).collect()
}

pub fn date_heading(date: &str) -> String {
    match NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d") {
        Ok(d) => d.format("%A, %B %-d").to_string(),
        Err(_) => date.to_string(),
    }
}

pub fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|part| part.chars().next())
        .collect()
}
