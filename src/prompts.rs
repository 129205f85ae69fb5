//! Prompt text for every kind of generated content.

use serde_json::{Value, json};

use crate::content::{AnalysisKind, MatchInfo};

pub const PLAYER_MARKUP_SUFFIX: &str = "Important: When you mention a specific football player, please wrap their full name in double square brackets, like this: [[Lionel Messi]].";

fn with_markup(body: String) -> String {
    format!("{body} {PLAYER_MARKUP_SUFFIX}")
}

pub fn review(focus: &str) -> String {
    with_markup(format!(
        "Provide a comprehensive football review for {focus}. Include narrative, top teams, key players, talking points, and outlook. Format in plain text."
    ))
}

/// Asks for headed plain text so the fixture parser can split the sections.
pub fn fixtures(focus: &str) -> String {
    format!(
        "List recent results and upcoming fixtures for {focus}. Format as plain text. \
         Start the results block with a line reading \"Recent:\" and write each result as \
         \"Home Team 2 - 1 Away Team (Competition, Date)\". Start the fixtures block with a line \
         reading \"Upcoming:\" and write each fixture as \"Home Team vs Away Team (Competition, Date)\". \
         One match per line."
    )
}

pub fn calendar(focus: &str) -> String {
    format!(
        "Provide upcoming fixtures for {focus} as a JSON array. Date YYYY-MM-DD, competition, homeTeam, awayTeam."
    )
}

pub fn highlights(focus: &str) -> String {
    with_markup(format!(
        "Provide concise summaries of 2-3 recent key match highlights for {focus}."
    ))
}

pub fn insights(focus: &str) -> String {
    with_markup(format!(
        "Offer deeper football insights for {focus}. Tactical trends, surprising performances, standout players."
    ))
}

pub fn performance(focus: &str) -> String {
    with_markup(format!(
        "Describe key performance statistics or trends for {focus}."
    ))
}

pub fn betting(focus: &str) -> String {
    format!(
        "For {focus}, provide betting analysis JSON: strategicAdvice and odds array. \
         Each odds entry has homeTeam, awayTeam, matchDate and odds with keys \"1\", \"X\" and \"2\". \
         Mandatory disclaimer."
    )
}

pub fn tactics(focus: &str) -> String {
    format!(
        "Analyze common tactics in {focus}. Prevailing formation JSON: formationName, description, players[{{position, x, y}}]. \
         x and y are percentages from 0 to 100, y measured from the team's own goal line."
    )
}

pub fn predictions(focus: &str) -> String {
    format!(
        "Predict the outcomes of the next 3-5 notable matches for {focus}. Return a JSON array; \
         each item has homeTeam, awayTeam, predictedOutcome (\"Home Win\", \"Draw\" or \"Away Win\"), \
         confidenceScore (0-100), reasoning and suggestedScore."
    )
}

pub fn player_profile(player: &str, context: &str) -> String {
    format!(
        "Provide player profile for {player} in {context}. JSON: name, club, position, strengths[], recentPerformance."
    )
}

pub fn player_comparison(players: &[String], context: &str) -> String {
    format!(
        "Compare the following players: {} in the context of {context}.\n\
         Return a JSON object with:\n\
         1. \"players\": An array of objects, each containing: name, club, position, strengths[], recentPerformance, and a \"comparisonVerdict\" (e.g., \"The more clinical finisher\").\n\
         2. \"overallAnalysis\": A paragraph summarizing how these players compare tactically and who might be the better fit for a specific role.",
        players.join(", ")
    )
}

pub fn player_comparison_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "players": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "name": { "type": "STRING" },
                        "club": { "type": "STRING" },
                        "position": { "type": "STRING" },
                        "strengths": { "type": "ARRAY", "items": { "type": "STRING" } },
                        "recentPerformance": { "type": "STRING" },
                        "comparisonVerdict": { "type": "STRING" }
                    },
                    "required": ["name", "club", "position", "strengths", "recentPerformance", "comparisonVerdict"]
                }
            },
            "overallAnalysis": { "type": "STRING" }
        },
        "required": ["players", "overallAnalysis"]
    })
}

pub fn player_suggestions(query: &str) -> String {
    format!(
        "Suggest up to 6 well-known professional football players whose names match or start with \"{query}\". \
         Return a JSON array of full player names only."
    )
}

pub fn realtime_matches(focus: &str) -> String {
    format!(
        "Provide list of {focus}. Major leagues/international. 5-10 matches. \
         Return a JSON array; each item has homeTeam, awayTeam, score, status (Live, HT, FT, Scheduled, Postponed or Cancelled), time and competition."
    )
}

pub fn grounded_realtime(focus: &str) -> String {
    format!(
        "Search for actual current football match information for: {focus}.\n\
         Provide a list of matches with home team, away team, current score (if live or finished), status (Live, HT, FT, or Scheduled), match time/date, and competition name.\n\
         Focus on major global leagues and international tournaments.\n\
         Return the data as a clean JSON array under a \"matches\" key."
    )
}

pub fn grounded_realtime_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "matches": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "homeTeam": { "type": "STRING" },
                        "awayTeam": { "type": "STRING" },
                        "score": { "type": "STRING" },
                        "status": { "type": "STRING", "description": "Live, HT, FT, Scheduled, Postponed, or Cancelled" },
                        "time": { "type": "STRING" },
                        "competition": { "type": "STRING" }
                    },
                    "required": ["homeTeam", "awayTeam", "status", "competition"]
                }
            }
        },
        "required": ["matches"]
    })
}

pub fn analysis(kind: AnalysisKind, info: &MatchInfo) -> String {
    let teams = info.headline();
    match kind {
        AnalysisKind::PreMatch => with_markup(format!("Detailed pre-match analysis for {teams}.")),
        AnalysisKind::Halftime => with_markup(format!("Halftime analysis for {teams}.")),
        AnalysisKind::PostMatch => {
            let score = info.score.as_deref().unwrap_or("unknown");
            with_markup(format!("Post-match analysis for {teams}. Score: {score}."))
        }
    }
}
