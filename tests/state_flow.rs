use std::time::{Duration, Instant};

use pretty_assertions::assert_eq;

use footy_hub::catalog::{Entity, TabId, ViewMode, find_entity};
use footy_hub::content::{
    AnalysisKind, Fixture, GroundedMatchData, MatchInfo, MatchStatus, PlayerProfile,
    RealtimeMatch,
};
use footy_hub::fixtures::parse_fixtures;
use footy_hub::service::TabPayload;
use footy_hub::state::{AppState, Delta, Focus, Load, ProviderCommand, apply_delta};

fn entity(id: &str) -> Entity {
    find_entity(id).expect("known entity")
}

fn selected(id: &str) -> AppState {
    let mut state = AppState::new();
    let cmds = state.select_entity(entity(id));
    assert_eq!(cmds.len(), 1);
    state
}

fn tab_loaded(id: &'static str, tab: TabId, payload: TabPayload) -> Delta {
    Delta::TabLoaded {
        entity_id: id,
        tab,
        result: Ok(payload),
    }
}

fn future_match() -> MatchInfo {
    MatchInfo {
        home_team: "Arsenal".to_string(),
        away_team: "Chelsea".to_string(),
        context: "Premier League".to_string(),
        score: None,
        date: Some("2026-10-18".to_string()),
        is_future: true,
        entity_name: "Premier League".to_string(),
    }
}

#[test]
fn selecting_a_league_requests_its_review() {
    let mut state = AppState::new();
    let cmds = state.select_entity(entity("epl"));
    assert!(matches!(
        cmds.as_slice(),
        [ProviderCommand::FetchTab { tab: TabId::Review, .. }]
    ));
    assert_eq!(state.focus, Focus::Content);
    assert!(state.tab_content(TabId::Review).is_loading());
    assert!(state.logs.back().is_some_and(|l| l.contains("Premier League")));

    assert!(state.select_entity(entity("epl")).is_empty(), "reselect is a no-op");
}

#[test]
fn selecting_a_realtime_category_requests_the_match_center() {
    let mut state = AppState::new();
    let cmds = state.select_entity(entity("live"));
    assert!(matches!(
        cmds.as_slice(),
        [ProviderCommand::FetchMatchCenter { .. }]
    ));
    assert!(state.match_center.is_loading());
    assert!(state.set_tab(TabId::Fixtures).is_none(), "no tabs in the match center");
}

#[test]
fn tabs_load_lazily_and_only_once() {
    let mut state = selected("laliga");
    assert!(state.set_tab(TabId::Highlights).is_some());
    assert!(state.set_tab(TabId::Highlights).is_none(), "already loading");

    apply_delta(
        &mut state,
        tab_loaded("laliga", TabId::Highlights, TabPayload::Text("Goals!".to_string())),
    );
    assert!(state.set_tab(TabId::Review).is_none(), "review is still loading");
    assert!(state.set_tab(TabId::Highlights).is_none(), "already loaded");
    assert_eq!(
        state.tab_content(TabId::Highlights).ready(),
        Some(&TabPayload::Text("Goals!".to_string()))
    );
}

#[test]
fn failed_tab_can_be_retried() {
    let mut state = selected("serie_a");
    assert!(state.retry().is_none(), "nothing failed yet");
    apply_delta(
        &mut state,
        Delta::TabLoaded {
            entity_id: "serie_a",
            tab: TabId::Review,
            result: Err("Gemini API Key is not configured.".to_string()),
        },
    );
    assert_eq!(
        state.tab_content(TabId::Review),
        &Load::Failed("Gemini API Key is not configured.".to_string())
    );
    assert!(matches!(
        state.retry(),
        Some(ProviderCommand::FetchTab { tab: TabId::Review, .. })
    ));
    assert!(state.tab_content(TabId::Review).is_loading());
}

#[test]
fn stale_tab_answers_are_dropped() {
    let mut state = selected("epl");
    state.select_entity(entity("bundesliga"));
    apply_delta(
        &mut state,
        tab_loaded("epl", TabId::Review, TabPayload::Text("old".to_string())),
    );
    assert!(state.tab_content(TabId::Review).is_loading());

    // Not requested, so not accepted.
    apply_delta(
        &mut state,
        tab_loaded("bundesliga", TabId::Insights, TabPayload::Text("x".to_string())),
    );
    assert!(state.tab_content(TabId::Insights).is_idle());
}

#[test]
fn match_center_answer_for_another_category_is_dropped() {
    let mut state = selected("upcoming");
    apply_delta(
        &mut state,
        Delta::MatchCenterLoaded {
            entity_id: "live",
            result: Ok(GroundedMatchData::default()),
        },
    );
    assert!(state.match_center.is_loading());

    let data = GroundedMatchData {
        matches: vec![RealtimeMatch {
            home_team: "Ajax".to_string(),
            away_team: "PSV".to_string(),
            score: None,
            status: MatchStatus::Scheduled,
            time: Some("20:00".to_string()),
            competition: "Eredivisie".to_string(),
        }],
        sources: Vec::new(),
    };
    apply_delta(
        &mut state,
        Delta::MatchCenterLoaded {
            entity_id: "upcoming",
            result: Ok(data),
        },
    );
    let matches = state.analyzable_matches();
    assert_eq!(matches.len(), 1);
    assert!(matches[0].is_future);
    assert_eq!(matches[0].entity_name, "Upcoming Matches");
    assert_eq!(
        state.logs.back().map(String::as_str),
        Some("[INFO] 1 matches, 0 sources")
    );
}

#[test]
fn fixture_rows_feed_the_analysis_cursor() {
    let mut state = selected("epl");
    state.set_tab(TabId::Fixtures);
    let raw = "Recent:\nArsenal 2-0 Spurs\nNo more results\nUpcoming:\nChelsea vs Fulham".to_string();
    let tables = parse_fixtures(&raw);
    apply_delta(
        &mut state,
        tab_loaded("epl", TabId::Fixtures, TabPayload::Fixtures { raw, tables }),
    );

    let matches = state.analyzable_matches();
    assert_eq!(matches.len(), 2);
    state.row_next();
    assert_eq!(state.row_cursor, 1);
    state.row_next();
    assert_eq!(state.row_cursor, 0);

    let cmd = state.open_analysis();
    assert!(matches!(
        cmd,
        Some(ProviderCommand::FetchAnalysis {
            kind: AnalysisKind::PostMatch,
            ..
        })
    ));
    assert_eq!(
        state.analysis.as_ref().map(|m| m.info.headline()),
        Some("Arsenal vs Spurs".to_string())
    );
}

#[test]
fn calendar_rows_follow_display_order() {
    let mut state = selected("epl");
    state.set_tab(TabId::Calendar);
    let fixture = |date: &str, home: &str| Fixture {
        date: date.to_string(),
        competition: "Premier League".to_string(),
        home_team: home.to_string(),
        away_team: "Away".to_string(),
        time: None,
    };
    let fixtures = vec![
        fixture("2026-10-20", "Late"),
        fixture("2026-10-16", "Early"),
    ];
    apply_delta(
        &mut state,
        tab_loaded("epl", TabId::Calendar, TabPayload::Calendar(fixtures)),
    );
    let homes: Vec<String> = state
        .analyzable_matches()
        .into_iter()
        .map(|m| m.home_team)
        .collect();
    assert_eq!(homes, vec!["Early", "Late"]);
}

#[test]
fn analysis_kinds_are_cached_and_post_match_waits_for_kickoff() {
    let mut state = AppState::new();
    let info = future_match();
    let first = state.open_analysis_for(info.clone());
    assert!(matches!(
        first,
        Some(ProviderCommand::FetchAnalysis {
            kind: AnalysisKind::PreMatch,
            ..
        })
    ));

    assert!(state.switch_analysis_kind(AnalysisKind::PostMatch).is_none());
    assert_eq!(
        state.analysis.as_ref().map(|m| m.kind),
        Some(AnalysisKind::PreMatch)
    );

    apply_delta(
        &mut state,
        Delta::AnalysisLoaded {
            info: info.clone(),
            kind: AnalysisKind::PreMatch,
            result: Ok("[[Bukayo Saka]] is key.".to_string()),
        },
    );
    assert!(state.switch_analysis_kind(AnalysisKind::Halftime).is_some());
    assert!(state.switch_analysis_kind(AnalysisKind::PreMatch).is_none(), "cached");
    assert_eq!(
        state.analysis.as_ref().map(|m| m.current().clone()),
        Some(Load::Ready("[[Bukayo Saka]] is key.".to_string()))
    );

    // Next from Halftime skips the unavailable post-match view.
    state.switch_analysis_kind(AnalysisKind::Halftime);
    assert!(state.next_analysis_kind().is_none());
    assert_eq!(
        state.analysis.as_ref().map(|m| m.kind),
        Some(AnalysisKind::PreMatch)
    );
}

#[test]
fn analysis_answer_for_a_closed_modal_is_dropped() {
    let mut state = AppState::new();
    state.open_analysis_for(future_match());
    assert!(state.close_top());
    apply_delta(
        &mut state,
        Delta::AnalysisLoaded {
            info: future_match(),
            kind: AnalysisKind::PreMatch,
            result: Ok("late".to_string()),
        },
    );
    assert!(state.analysis.is_none());
}

#[test]
fn picker_lists_players_from_visible_prose() {
    let mut state = selected("ligue1");
    apply_delta(
        &mut state,
        tab_loaded(
            "ligue1",
            TabId::Review,
            TabPayload::Text("[[Ousmane Dembele]] and [[Vitinha]] ran the game.".to_string()),
        ),
    );
    state.open_picker();
    let picker = state.picker.clone().expect("picker open");
    assert_eq!(picker.names, vec!["Ousmane Dembele", "Vitinha"]);

    state.picker_next();
    state.picker_toggle_compare();
    assert_eq!(state.compare, vec!["Vitinha"]);

    let cmd = state.picker_open_profile();
    assert!(matches!(
        cmd,
        Some(ProviderCommand::FetchPlayerProfile { ref player, ref context })
            if player == "Vitinha" && context == "Ligue 1"
    ));
    assert!(state.picker.is_none());
}

#[test]
fn comparison_needs_two_and_holds_at_most_three() {
    let mut state = AppState::new();
    assert!(state.add_compare("Saka"));
    assert!(!state.add_compare("Saka"), "duplicate");
    assert!(state.start_comparison().is_none(), "one player is not enough");
    assert!(state.add_compare("Foden"));
    assert!(state.add_compare("Palmer"));
    assert!(!state.add_compare("Bellingham"), "list is full");
    assert_eq!(state.compare.len(), 3);

    let cmd = state.start_comparison();
    assert!(matches!(
        cmd,
        Some(ProviderCommand::FetchComparison { ref players, ref context })
            if players.len() == 3 && context == "Global Football"
    ));

    state.remove_compare("Foden");
    state.toggle_compare("Palmer");
    assert_eq!(state.compare, vec!["Saka"]);
    state.clear_compare();
    assert!(!state.can_compare());
}

#[test]
fn profile_answers_match_on_player() {
    let mut state = AppState::new();
    state.open_profile("Pedri");
    let profile = |name: &str| PlayerProfile {
        name: name.to_string(),
        club: "Barcelona".to_string(),
        position: "Midfielder".to_string(),
        strengths: vec!["Vision".to_string()],
        recent_performance: String::new(),
    };
    apply_delta(
        &mut state,
        Delta::ProfileLoaded {
            player: "Gavi".to_string(),
            result: Ok(profile("Gavi")),
        },
    );
    assert!(state.profile.as_ref().is_some_and(|p| p.content.is_loading()));
    apply_delta(
        &mut state,
        Delta::ProfileLoaded {
            player: "Pedri".to_string(),
            result: Ok(profile("Pedri")),
        },
    );
    assert_eq!(
        state.profile.as_ref().and_then(|p| p.content.ready()).map(|p| p.name.as_str()),
        Some("Pedri")
    );
}

#[test]
fn search_waits_for_the_debounce_window() {
    let mut state = AppState::new();
    state.search_debounce = Duration::from_millis(300);
    let t0 = Instant::now();
    state.open_search();
    state.search_input('k', t0);
    assert!(state.search.deadline.is_none(), "one character is too short");
    assert!(state.search_tick(t0 + Duration::from_secs(1)).is_none());

    state.search_input('a', t0);
    state.search_input('n', t0 + Duration::from_millis(100));
    assert!(state.search_tick(t0 + Duration::from_millis(350)).is_none());
    let cmd = state.search_tick(t0 + Duration::from_millis(400));
    assert!(matches!(
        cmd,
        Some(ProviderCommand::FetchSuggestions { ref query }) if query == "kan"
    ));
    assert!(state.search.suggestions.is_loading());
    assert!(state.search_tick(t0 + Duration::from_secs(2)).is_none(), "fires once");

    apply_delta(
        &mut state,
        Delta::SuggestionsLoaded {
            query: "ka".to_string(),
            result: Ok(vec!["Kaka".to_string()]),
        },
    );
    assert!(state.search.suggestions.is_loading(), "stale query ignored");
    apply_delta(
        &mut state,
        Delta::SuggestionsLoaded {
            query: "kan".to_string(),
            result: Ok(vec!["Harry Kane".to_string(), "N'Golo Kante".to_string()]),
        },
    );
    assert_eq!(state.search_choices(), vec!["Harry Kane", "N'Golo Kante"]);
}

#[test]
fn short_query_shows_recent_players_and_selection_records_them() {
    let mut state = AppState::new();
    state.recent_players = vec!["Rodri".to_string()];
    state.open_search();
    assert_eq!(state.search_choices(), vec!["Rodri"]);

    let now = Instant::now();
    for c in "Pedri".chars() {
        state.search_input(c, now);
    }
    let cmd = state.search_select();
    assert!(matches!(
        cmd,
        Some(ProviderCommand::FetchPlayerProfile { ref player, .. }) if player == "Pedri"
    ));
    assert!(!state.search.active);
    assert_eq!(state.recent_players, vec!["Pedri", "Rodri"]);
    assert!(state.take_recents_dirty());
    assert!(!state.take_recents_dirty());
}

#[test]
fn log_keeps_the_latest_two_hundred_lines() {
    let mut state = AppState::new();
    for i in 0..250 {
        state.push_log(format!("[INFO] line {i}"));
    }
    assert_eq!(state.logs.len(), 200);
    assert_eq!(state.logs.front().map(String::as_str), Some("[INFO] line 50"));

    apply_delta(&mut state, Delta::Log("[WARN] Tab fetch error: boom".to_string()));
    assert_eq!(
        state.logs.back().map(String::as_str),
        Some("[WARN] Tab fetch error: boom")
    );
}

#[test]
fn changing_view_clears_the_selection() {
    let mut state = selected("epl");
    state.set_tab(TabId::Betting);
    state.cycle_view();
    assert_eq!(state.view, ViewMode::Nations);
    assert!(state.selected.is_none());
    assert!(state.tabs.is_empty());
    assert_eq!(state.active_tab, TabId::Review);
    assert_eq!(state.focus, Focus::Sidebar);
    assert_eq!(state.sidebar_entities().len(), 40);
}

#[test]
fn nation_filter_narrows_the_sidebar() {
    let mut state = AppState::new();
    state.set_view(ViewMode::Nations);
    state.sidebar_cursor = 30;
    for c in "ger".chars() {
        state.nation_filter_push(c);
    }
    let names: Vec<&str> = state.sidebar_entities().iter().map(|e| e.name()).collect();
    assert_eq!(names, vec!["Algeria", "Germany", "Nigeria"]);
    assert_eq!(state.sidebar_cursor, 2);

    let cmds = state.activate_sidebar();
    assert!(matches!(
        cmds.as_slice(),
        [ProviderCommand::FetchTab { tab: TabId::Review, .. }]
    ));
    assert_eq!(state.player_context(), "Nigeria");
}

#[test]
fn escape_closes_layers_from_the_top() {
    let mut state = AppState::new();
    state.help_overlay = true;
    state.open_profile("Rice");
    state.open_analysis_for(future_match());
    assert!(state.close_top());
    assert!(!state.help_overlay);
    assert!(state.close_top());
    assert!(state.profile.is_none());
    assert!(state.analysis.is_some());
    assert!(state.close_top());
    assert!(!state.close_top());
}
