use std::collections::VecDeque;
use std::sync::Mutex;

use anyhow::{Result, anyhow};
use pretty_assertions::assert_eq;

use footy_hub::catalog::{TabId, find_entity};
use footy_hub::content::{GroundingSource, MatchStatus};
use footy_hub::gemini::{GenerateRequest, Generated, TextGenerator};
use footy_hub::provider::run_command;
use footy_hub::service::{
    TabPayload, fetch_match_center, fetch_player_comparison, fetch_player_suggestions, fetch_tab,
};
use footy_hub::state::{Delta, ProviderCommand};

/// Replays canned answers in order and records every request.
#[derive(Default)]
struct Canned {
    answers: Mutex<VecDeque<Result<Generated, String>>>,
    seen: Mutex<Vec<GenerateRequest>>,
}

impl Canned {
    fn new(answers: Vec<Result<Generated, String>>) -> Self {
        Self {
            answers: Mutex::new(answers.into()),
            seen: Mutex::new(Vec::new()),
        }
    }

    fn text(text: &str) -> Result<Generated, String> {
        Ok(Generated {
            text: text.to_string(),
            sources: Vec::new(),
        })
    }

    fn requests(&self) -> Vec<GenerateRequest> {
        self.seen.lock().unwrap().clone()
    }
}

impl TextGenerator for Canned {
    fn generate(&self, req: &GenerateRequest) -> Result<Generated> {
        self.seen.lock().unwrap().push(req.clone());
        match self.answers.lock().unwrap().pop_front() {
            Some(Ok(generated)) => Ok(generated),
            Some(Err(msg)) => Err(anyhow!(msg)),
            None => Err(anyhow!("no canned answer left")),
        }
    }
}

#[test]
fn fixtures_tab_is_parsed_into_tables() {
    let generator = Canned::new(vec![Canned::text(
        "Recent:\nInter 2-1 Milan (Derby)\nUpcoming:\nRoma vs Lazio",
    )]);
    let entity = find_entity("serie_a").unwrap();
    let payload = fetch_tab(&generator, TabId::Fixtures, &entity).unwrap();
    let TabPayload::Fixtures { raw, tables } = payload else {
        panic!("expected fixtures payload");
    };
    assert!(raw.starts_with("Recent:"));
    assert_eq!(tables.recent[0].context, "Derby");
    assert_eq!(tables.upcoming[0].away_team, "Lazio");

    let requests = generator.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].prompt.contains("Italy's Serie A"));
    assert_eq!(requests[0].response_mime_type, None);
}

#[test]
fn json_tabs_ask_for_json() {
    let generator = Canned::new(vec![Canned::text(
        r#"{"formationName":"3-5-2","description":"Wing backs push high.","players":[]}"#,
    )]);
    let entity = find_entity("ita").unwrap();
    let payload = fetch_tab(&generator, TabId::Tactics, &entity).unwrap();
    assert!(matches!(payload, TabPayload::Tactics(ref t) if t.formation_name == "3-5-2"));
    assert_eq!(
        generator.requests()[0].response_mime_type.as_deref(),
        Some("application/json")
    );
}

#[test]
fn short_suggestion_queries_skip_the_generator() {
    let generator = Canned::default();
    assert!(fetch_player_suggestions(&generator, " m ").unwrap().is_empty());
    assert!(generator.requests().is_empty());
}

#[test]
fn comparison_sends_a_schema_and_needs_two_players() {
    let generator = Canned::new(vec![Canned::text(
        r#"{"players":[{"name":"Saka","comparisonVerdict":"Creator"},{"name":"Foden","comparisonVerdict":"Finisher"}],"overallAnalysis":"Close."}"#,
    )]);
    let players = vec!["Saka".to_string()];
    assert!(fetch_player_comparison(&generator, &players, "Premier League").is_err());
    assert!(generator.requests().is_empty());

    let players = vec!["Saka".to_string(), "Foden".to_string()];
    let data = fetch_player_comparison(&generator, &players, "Premier League").unwrap();
    assert_eq!(data.players[1].comparison_verdict, "Finisher");
    let req = &generator.requests()[0];
    assert!(req.response_schema.is_some());
    assert!(req.prompt.contains("Saka") && req.prompt.contains("Foden"));
}

#[test]
fn match_center_prefers_grounded_results() {
    let grounded = Generated {
        text: r#"{"matches":[{"homeTeam":"Inter","awayTeam":"Napoli","status":"FT","score":"2-2"}]}"#
            .to_string(),
        sources: vec![GroundingSource {
            title: "Scores".to_string(),
            uri: "https://scores.example.test".to_string(),
        }],
    };
    let generator = Canned::new(vec![Ok(grounded)]);
    let data = fetch_match_center(&generator, "live matches").unwrap();
    assert_eq!(data.matches.len(), 1);
    assert_eq!(data.sources.len(), 1);

    let requests = generator.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].google_search);
    assert!(requests[0].response_schema.is_some());
}

#[test]
fn match_center_falls_back_to_plain_listing() {
    let empty_grounded = Generated {
        text: r#"{"matches":[]}"#.to_string(),
        sources: vec![GroundingSource {
            title: "Fixtures".to_string(),
            uri: "https://fixtures.example.test".to_string(),
        }],
    };
    let generator = Canned::new(vec![
        Ok(empty_grounded),
        Canned::text(r#"[{"homeTeam":"Ajax","awayTeam":"PSV","status":"Scheduled","time":"20:00"}]"#),
    ]);
    let data = fetch_match_center(&generator, "upcoming matches").unwrap();
    assert_eq!(data.matches[0].status, MatchStatus::Scheduled);
    assert_eq!(data.sources[0].title, "Fixtures");

    let requests = generator.requests();
    assert_eq!(requests.len(), 2);
    assert!(!requests[1].google_search);

    let failing = Canned::new(vec![
        Err("search unavailable".to_string()),
        Canned::text(r#"[{"homeTeam":"Porto","awayTeam":"Benfica","status":"FT","score":"0-2"}]"#),
    ]);
    let data = fetch_match_center(&failing, "previous matches").unwrap();
    assert_eq!(data.matches.len(), 1);
    assert!(data.sources.is_empty());
}

#[test]
fn provider_folds_errors_into_deltas() {
    let generator = Canned::new(vec![Err("quota exceeded".to_string())]);
    let entity = find_entity("epl").unwrap();
    let delta = run_command(
        &generator,
        ProviderCommand::FetchTab {
            entity,
            tab: TabId::Review,
        },
    );
    match delta {
        Delta::TabLoaded {
            entity_id,
            tab,
            result,
        } => {
            assert_eq!(entity_id, "epl");
            assert_eq!(tab, TabId::Review);
            assert_eq!(result, Err("quota exceeded".to_string()));
        }
        other => panic!("unexpected delta {other:?}"),
    }
}

#[test]
fn provider_reports_decode_failures_by_name() {
    let generator = Canned::new(vec![Canned::text("not json at all")]);
    let delta = run_command(
        &generator,
        ProviderCommand::FetchPlayerProfile {
            player: "Rodri".to_string(),
            context: "La Liga".to_string(),
        },
    );
    assert!(matches!(
        delta,
        Delta::ProfileLoaded { ref player, result: Err(ref msg) }
            if player == "Rodri" && msg == "Could not parse player profile."
    ));
}
