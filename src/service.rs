//! One function per kind of content: build the prompt, call the generator,
//! decode the answer.

use anyhow::Result;
use tracing::{info, warn};

use crate::catalog::{Entity, TabId};
use crate::content::{
    self, AnalysisKind, BettingInfo, Fixture, GroundedMatchData, MatchInfo, PlayerComparison,
    PlayerProfile, Prediction, RealtimeMatch, TacticalData,
};
use crate::fixtures::{self, FixtureTables};
use crate::gemini::{GenerateRequest, TextGenerator};
use crate::prompts;

pub const MIN_SUGGESTION_QUERY: usize = 2;
pub const MIN_COMPARE: usize = 2;

/// Decoded content for one tab.
#[derive(Debug, Clone, PartialEq)]
pub enum TabPayload {
    Text(String),
    Fixtures { raw: String, tables: FixtureTables },
    Calendar(Vec<Fixture>),
    Tactics(TacticalData),
    Predictions(Vec<Prediction>),
    Betting(BettingInfo),
}

fn text(generator: &dyn TextGenerator, prompt: String) -> Result<String> {
    Ok(generator.generate(&GenerateRequest::text(prompt))?.text)
}

fn json_text(generator: &dyn TextGenerator, prompt: String) -> Result<String> {
    Ok(generator.generate(&GenerateRequest::json(prompt))?.text)
}

pub fn fetch_review(generator: &dyn TextGenerator, focus: &str) -> Result<String> {
    text(generator, prompts::review(focus))
}

pub fn fetch_fixtures(generator: &dyn TextGenerator, focus: &str) -> Result<String> {
    text(generator, prompts::fixtures(focus))
}

pub fn fetch_highlights(generator: &dyn TextGenerator, focus: &str) -> Result<String> {
    text(generator, prompts::highlights(focus))
}

pub fn fetch_insights(generator: &dyn TextGenerator, focus: &str) -> Result<String> {
    text(generator, prompts::insights(focus))
}

pub fn fetch_performance(generator: &dyn TextGenerator, focus: &str) -> Result<String> {
    text(generator, prompts::performance(focus))
}

pub fn fetch_analysis(
    generator: &dyn TextGenerator,
    kind: AnalysisKind,
    info: &MatchInfo,
) -> Result<String> {
    text(generator, prompts::analysis(kind, info))
}

pub fn fetch_calendar(generator: &dyn TextGenerator, focus: &str) -> Result<Vec<Fixture>> {
    content::parse_calendar_json(&json_text(generator, prompts::calendar(focus))?)
}

pub fn fetch_betting(generator: &dyn TextGenerator, focus: &str) -> Result<BettingInfo> {
    Ok(content::parse_betting_json(&json_text(
        generator,
        prompts::betting(focus),
    )?))
}

pub fn fetch_tactics(generator: &dyn TextGenerator, focus: &str) -> Result<TacticalData> {
    content::parse_tactics_json(&json_text(generator, prompts::tactics(focus))?)
}

pub fn fetch_predictions(generator: &dyn TextGenerator, focus: &str) -> Result<Vec<Prediction>> {
    content::parse_predictions_json(&json_text(generator, prompts::predictions(focus))?)
}

pub fn fetch_player_profile(
    generator: &dyn TextGenerator,
    player: &str,
    context: &str,
) -> Result<PlayerProfile> {
    content::parse_player_profile_json(&json_text(
        generator,
        prompts::player_profile(player, context),
    )?)
}

pub fn fetch_player_comparison(
    generator: &dyn TextGenerator,
    players: &[String],
    context: &str,
) -> Result<PlayerComparison> {
    if players.len() < MIN_COMPARE {
        anyhow::bail!("Select at least {MIN_COMPARE} players to compare.");
    }
    let req = GenerateRequest::json(prompts::player_comparison(players, context))
        .with_schema(prompts::player_comparison_schema());
    content::parse_comparison_json(&generator.generate(&req)?.text)
}

/// Short queries never reach the generator.
pub fn fetch_player_suggestions(generator: &dyn TextGenerator, query: &str) -> Result<Vec<String>> {
    let query = query.trim();
    if query.chars().count() < MIN_SUGGESTION_QUERY {
        return Ok(Vec::new());
    }
    content::parse_suggestions_json(&json_text(generator, prompts::player_suggestions(query))?)
}

pub fn fetch_realtime_matches(
    generator: &dyn TextGenerator,
    focus: &str,
) -> Result<Vec<RealtimeMatch>> {
    content::parse_realtime_json(&json_text(generator, prompts::realtime_matches(focus))?)
}

pub fn fetch_grounded_realtime(
    generator: &dyn TextGenerator,
    focus: &str,
) -> Result<GroundedMatchData> {
    let req = GenerateRequest::json(prompts::grounded_realtime(focus))
        .with_schema(prompts::grounded_realtime_schema())
        .with_search();
    let generated = generator.generate(&req)?;
    Ok(content::parse_grounded_matches(
        &generated.text,
        generated.sources,
    ))
}

/// Match center data: search-grounded first, plain listing when grounding
/// fails or finds nothing. Sources from the grounded attempt are kept.
pub fn fetch_match_center(generator: &dyn TextGenerator, focus: &str) -> Result<GroundedMatchData> {
    let grounded = match fetch_grounded_realtime(generator, focus) {
        Ok(data) if !data.matches.is_empty() => return Ok(data),
        Ok(data) => {
            info!(focus, "grounded search returned no matches, using plain listing");
            data
        }
        Err(err) => {
            warn!(focus, error = %err, "grounded search failed, using plain listing");
            GroundedMatchData::default()
        }
    };
    let matches = fetch_realtime_matches(generator, focus)?;
    Ok(GroundedMatchData {
        matches,
        sources: grounded.sources,
    })
}

pub fn fetch_tab(generator: &dyn TextGenerator, tab: TabId, entity: &Entity) -> Result<TabPayload> {
    let focus = entity.prompt_focus();
    Ok(match tab {
        TabId::Review => TabPayload::Text(fetch_review(generator, focus)?),
        TabId::Fixtures => {
            let raw = fetch_fixtures(generator, focus)?;
            let tables = fixtures::parse_fixtures(&raw);
            TabPayload::Fixtures { raw, tables }
        }
        TabId::Calendar => TabPayload::Calendar(fetch_calendar(generator, focus)?),
        TabId::Highlights => TabPayload::Text(fetch_highlights(generator, focus)?),
        TabId::Insights => TabPayload::Text(fetch_insights(generator, focus)?),
        TabId::Tactics => TabPayload::Tactics(fetch_tactics(generator, focus)?),
        TabId::Predictions => TabPayload::Predictions(fetch_predictions(generator, focus)?),
        TabId::Performance => TabPayload::Text(fetch_performance(generator, focus)?),
        TabId::Betting => TabPayload::Betting(fetch_betting(generator, focus)?),
    })
}
