use std::fs;
use std::path::PathBuf;

use pretty_assertions::assert_eq;

use footy_hub::content::{
    AnalysisKind, ConfidenceBand, GroundingSource, MatchInfo, MatchStatus, OddValue, Outcome,
    advice_paragraphs, confidence_band, date_heading, group_fixtures_by_date, initials,
    parse_betting_json, parse_calendar_json, parse_comparison_json, parse_grounded_matches,
    parse_player_profile_json, parse_predictions_json, parse_realtime_json,
    parse_suggestions_json, parse_tactics_json, strip_code_fence,
};
use footy_hub::gemini::parse_generate_response;

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

#[test]
fn calendar_groups_by_date_with_undated_last() {
    let fixtures = parse_calendar_json(&read_fixture("calendar.json")).expect("calendar parses");
    assert_eq!(fixtures.len(), 4);
    assert_eq!(fixtures[0].time.as_deref(), Some("15:00"));

    let groups = group_fixtures_by_date(&fixtures);
    let keys: Vec<&str> = groups.iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(keys, vec!["2026-10-17", "2026-10-18", "TBC"]);
    let second: Vec<&str> = groups[1].1.iter().map(|f| f.home_team.as_str()).collect();
    assert_eq!(second, vec!["Arsenal", "Spurs"]);

    assert_eq!(date_heading("2026-10-17"), "Saturday, October 17");
    assert_eq!(date_heading("TBC"), "TBC");
}

#[test]
fn calendar_fixture_becomes_future_match() {
    let fixtures = parse_calendar_json(&read_fixture("calendar.json")).expect("calendar parses");
    let info = MatchInfo::from_calendar(&fixtures[1], "Premier League");
    assert!(info.is_future);
    assert_eq!(info.context, "Premier League");
    assert_eq!(info.date.as_deref(), Some("2026-10-17"));
    assert_eq!(AnalysisKind::initial_for(&info), AnalysisKind::PreMatch);
    assert!(!AnalysisKind::PostMatch.is_available(&info));
}

#[test]
fn invalid_json_reports_what_failed() {
    let cases: Vec<(&str, String)> = vec![
        (
            "Could not parse the calendar data.",
            parse_calendar_json("not json").unwrap_err().to_string(),
        ),
        (
            "Could not parse player profile.",
            parse_player_profile_json("{").unwrap_err().to_string(),
        ),
        (
            "Could not parse player comparison data.",
            parse_comparison_json("[]").unwrap_err().to_string(),
        ),
        (
            "Could not parse tactical data.",
            parse_tactics_json("No information could be generated at this time.")
                .unwrap_err()
                .to_string(),
        ),
        (
            "Could not parse match data.",
            parse_realtime_json("{}").unwrap_err().to_string(),
        ),
    ];
    for (expected, got) in cases {
        assert_eq!(got, expected);
    }
}

#[test]
fn comparison_flattens_profiles() {
    let data = parse_comparison_json(&read_fixture("comparison.json")).expect("comparison parses");
    assert_eq!(data.players.len(), 2);
    assert_eq!(data.players[0].profile.name, "Bukayo Saka");
    assert_eq!(data.players[1].comparison_verdict, "The more clinical finisher");
    assert_eq!(data.players[1].profile.strengths.len(), 2);
    assert!(data.overall_analysis.contains("[[Phil Foden]]"));
    assert_eq!(initials(&data.players[1].profile.name), "PF");
}

#[test]
fn tactics_tolerates_code_fence_and_maps_pitch() {
    let data = parse_tactics_json(&read_fixture("tactics.json")).expect("tactics parses");
    assert_eq!(data.formation_name, "4-3-3");
    assert_eq!(data.players.len(), 11);

    let keeper = &data.players[0];
    assert!(keeper.is_goalkeeper());
    // Own goal at the bottom of the grid.
    assert_eq!(keeper.grid_cell(21, 21), (10, 19));
    let striker = &data.players[9];
    assert!(!striker.is_goalkeeper());
    assert_eq!(striker.grid_cell(21, 21), (10, 2));
    assert_eq!(striker.marker(), 'S');
}

#[test]
fn betting_reads_mixed_odds_and_falls_back_on_prose() {
    let info = parse_betting_json(&read_fixture("betting.json"));
    assert_eq!(info.odds.len(), 2);
    assert_eq!(info.odds[0].odds.home, OddValue::Number(1.85));
    assert_eq!(info.odds[0].odds.away, OddValue::Text("4.20".to_string()));
    assert_eq!(info.odds[0].odds.draw.to_string(), "3.40");
    assert_eq!(info.odds[1].match_date, None);
    assert_eq!(
        advice_paragraphs(&info.strategic_advice),
        vec![
            "Home sides have won 60% of matches this season.",
            "Consider the draw in derbies.",
            "Odds are illustrative only; gamble responsibly."
        ]
    );

    let raw = "Back the home side at Anfield.";
    let fallback = parse_betting_json(raw);
    assert_eq!(fallback.strategic_advice, raw);
    assert!(fallback.odds.is_empty());
}

#[test]
fn predictions_accept_wrapped_list_and_clamp_confidence() {
    let list = parse_predictions_json(&read_fixture("predictions.json")).expect("predictions parse");
    assert_eq!(list.len(), 3);
    assert_eq!(list[0].predicted_outcome, Outcome::HomeWin);
    assert_eq!(list[1].suggested_score, None);
    assert_eq!(list[2].predicted_outcome.label(), "Away Win");
    assert_eq!(list[2].confidence_score, 100.0);

    let bare = r#"[{"homeTeam":"A","awayTeam":"B","predictedOutcome":"Draw","confidenceScore":40}]"#;
    assert_eq!(parse_predictions_json(bare).expect("bare list").len(), 1);
}

#[test]
fn confidence_bands_follow_thresholds() {
    assert_eq!(confidence_band(75.0), ConfidenceBand::High);
    assert_eq!(confidence_band(74.9), ConfidenceBand::Medium);
    assert_eq!(confidence_band(50.0), ConfidenceBand::Medium);
    assert_eq!(confidence_band(49.0), ConfidenceBand::Low);
}

#[test]
fn realtime_status_badges() {
    let matches = parse_realtime_json(&read_fixture("realtime.json")).expect("realtime parses");
    let badges: Vec<&str> = matches.iter().map(|m| m.status.badge()).collect();
    assert_eq!(badges, vec!["LIVE", "HT", "UPCOMING", "FT", "Abandoned"]);
    assert_eq!(matches[4].status, MatchStatus::Other("Abandoned".to_string()));
}

#[test]
fn realtime_match_info_is_future_only_when_scheduled() {
    let matches = parse_realtime_json(&read_fixture("realtime.json")).expect("realtime parses");
    let live = MatchInfo::from_realtime(&matches[0], "Live Matches");
    assert!(!live.is_future);
    assert_eq!(live.date, None);
    assert_eq!(live.subtitle(), "Bundesliga - Final Score: 2-1");

    let scheduled = MatchInfo::from_realtime(&matches[2], "Upcoming Matches");
    assert!(scheduled.is_future);
    assert_eq!(scheduled.date.as_deref(), Some("20:00"));
    assert_eq!(scheduled.headline(), "Ajax vs PSV");
    assert_eq!(scheduled.subtitle(), "Eredivisie");
}

#[test]
fn grounded_response_keeps_unique_sources() {
    let generated =
        parse_generate_response(&read_fixture("gemini_grounded.json")).expect("response parses");
    assert_eq!(generated.sources.len(), 2);
    assert_eq!(generated.sources[0].title, "Serie A scores");
    assert_eq!(generated.sources[1].title, "Match Source");

    let data = parse_grounded_matches(&generated.text, generated.sources);
    assert_eq!(data.matches.len(), 1);
    assert_eq!(data.matches[0].status, MatchStatus::FullTime);
    assert_eq!(data.sources.len(), 2);
}

#[test]
fn grounded_matches_degrade_to_empty() {
    let source = GroundingSource {
        title: "Scores".to_string(),
        uri: "https://scores.example.test".to_string(),
    };
    let data = parse_grounded_matches("I could not find anything.", vec![source.clone()]);
    assert!(data.matches.is_empty());
    assert_eq!(data.sources, vec![source]);

    assert!(parse_grounded_matches("{}", Vec::new()).matches.is_empty());
}

#[test]
fn suggestions_are_trimmed_deduped_and_capped() {
    let names = parse_suggestions_json(
        r#"{"suggestions":[" Erling Haaland ","erling haaland","","Kylian Mbappe","Harry Kane","Mohamed Salah","Son Heung-min","Vinicius Junior","Pedri"]}"#,
    )
    .expect("suggestions parse");
    assert_eq!(
        names,
        vec![
            "Erling Haaland",
            "Kylian Mbappe",
            "Harry Kane",
            "Mohamed Salah",
            "Son Heung-min",
            "Vinicius Junior"
        ]
    );
    assert_eq!(
        parse_suggestions_json(r#"["Lamine Yamal"]"#).expect("bare list"),
        vec!["Lamine Yamal"]
    );
}

#[test]
fn code_fence_without_language_is_stripped() {
    assert_eq!(strip_code_fence("```\n[1]\n```"), "[1]");
    assert_eq!(strip_code_fence("  [2]  "), "[2]");
}
