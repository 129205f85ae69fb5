use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use crate::catalog::{
    self, Entity, GLOBAL_CONTEXT, NationSort, NationSortKey, TabId, ViewMode,
};
use crate::content::{
    self, AnalysisKind, GroundedMatchData, MatchInfo, PlayerComparison, PlayerProfile,
};
use crate::markup;
use crate::persist;
use crate::service::{MIN_COMPARE, MIN_SUGGESTION_QUERY, TabPayload};

pub const MAX_COMPARE: usize = 3;
const MAX_LOGS: usize = 200;
const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(400);

/// Remote content in flight or settled.
#[derive(Debug, Clone, PartialEq)]
pub enum Load<T> {
    Idle,
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> Default for Load<T> {
    fn default() -> Self {
        Load::Idle
    }
}

impl<T> Load<T> {
    pub fn is_idle(&self) -> bool {
        matches!(self, Load::Idle)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Load::Loading)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Load::Ready(value) => Some(value),
            _ => None,
        }
    }

    fn settle<E: ToString>(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Load::Ready(value),
            Err(err) => Load::Failed(err.to_string()),
        }
    }
}

pub type TabContent = Load<TabPayload>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Sidebar,
    Content,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisModal {
    pub info: MatchInfo,
    pub kind: AnalysisKind,
    pub cache: HashMap<AnalysisKind, Load<String>>,
    pub scroll: u16,
}

impl AnalysisModal {
    pub fn current(&self) -> &Load<String> {
        self.cache.get(&self.kind).unwrap_or(&Load::Idle)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProfileModal {
    pub player: String,
    pub content: Load<PlayerProfile>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonModal {
    pub players: Vec<String>,
    pub content: Load<PlayerComparison>,
    pub scroll: u16,
}

/// Players mentioned in the text currently on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerPicker {
    pub names: Vec<String>,
    pub cursor: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchBox {
    pub active: bool,
    pub query: String,
    pub deadline: Option<Instant>,
    pub requested: Option<String>,
    pub suggestions: Load<Vec<String>>,
    pub cursor: usize,
}

impl Default for SearchBox {
    fn default() -> Self {
        Self {
            active: false,
            query: String::new(),
            deadline: None,
            requested: None,
            suggestions: Load::Idle,
            cursor: 0,
        }
    }
}

/// Identifies what a response answers, so late answers can be recognised.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RequestKey {
    Tab { entity_id: &'static str, tab: TabId },
    MatchCenter { entity_id: &'static str },
    Analysis { info: MatchInfo, kind: AnalysisKind },
    Profile { player: String },
    Comparison { players: Vec<String> },
    Suggestions { query: String },
}

#[derive(Debug, Clone)]
pub enum ProviderCommand {
    FetchTab {
        entity: Entity,
        tab: TabId,
    },
    FetchMatchCenter {
        entity: Entity,
    },
    FetchAnalysis {
        info: MatchInfo,
        kind: AnalysisKind,
    },
    FetchPlayerProfile {
        player: String,
        context: String,
    },
    FetchComparison {
        players: Vec<String>,
        context: String,
    },
    FetchSuggestions {
        query: String,
    },
}

impl ProviderCommand {
    pub fn key(&self) -> RequestKey {
        match self {
            ProviderCommand::FetchTab { entity, tab } => RequestKey::Tab {
                entity_id: entity.id(),
                tab: *tab,
            },
            ProviderCommand::FetchMatchCenter { entity } => RequestKey::MatchCenter {
                entity_id: entity.id(),
            },
            ProviderCommand::FetchAnalysis { info, kind } => RequestKey::Analysis {
                info: info.clone(),
                kind: *kind,
            },
            ProviderCommand::FetchPlayerProfile { player, .. } => RequestKey::Profile {
                player: player.clone(),
            },
            ProviderCommand::FetchComparison { players, .. } => RequestKey::Comparison {
                players: players.clone(),
            },
            ProviderCommand::FetchSuggestions { query } => RequestKey::Suggestions {
                query: query.clone(),
            },
        }
    }
}

#[derive(Debug, Clone)]
pub enum Delta {
    TabLoaded {
        entity_id: &'static str,
        tab: TabId,
        result: Result<TabPayload, String>,
    },
    MatchCenterLoaded {
        entity_id: &'static str,
        result: Result<GroundedMatchData, String>,
    },
    AnalysisLoaded {
        info: MatchInfo,
        kind: AnalysisKind,
        result: Result<String, String>,
    },
    ProfileLoaded {
        player: String,
        result: Result<PlayerProfile, String>,
    },
    ComparisonLoaded {
        players: Vec<String>,
        result: Result<PlayerComparison, String>,
    },
    SuggestionsLoaded {
        query: String,
        result: Result<Vec<String>, String>,
    },
    Log(String),
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub view: ViewMode,
    pub sidebar_cursor: usize,
    pub nation_filter: String,
    pub nation_filter_active: bool,
    pub nation_sort: NationSort,
    pub selected: Option<Entity>,
    pub focus: Focus,
    pub active_tab: TabId,
    pub tabs: HashMap<TabId, TabContent>,
    pub match_center: Load<GroundedMatchData>,
    pub row_cursor: usize,
    pub content_scroll: u16,
    pub analysis: Option<AnalysisModal>,
    pub profile: Option<ProfileModal>,
    pub picker: Option<PlayerPicker>,
    pub compare: Vec<String>,
    pub comparison: Option<ComparisonModal>,
    pub search: SearchBox,
    pub search_debounce: Duration,
    pub recent_players: Vec<String>,
    pub recents_dirty: bool,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            view: ViewMode::Leagues,
            sidebar_cursor: 0,
            nation_filter: String::new(),
            nation_filter_active: false,
            nation_sort: NationSort::default(),
            selected: None,
            focus: Focus::Sidebar,
            active_tab: TabId::Review,
            tabs: HashMap::new(),
            match_center: Load::Idle,
            row_cursor: 0,
            content_scroll: 0,
            analysis: None,
            profile: None,
            picker: None,
            compare: Vec::new(),
            comparison: None,
            search: SearchBox::default(),
            search_debounce: DEFAULT_DEBOUNCE,
            recent_players: Vec::new(),
            recents_dirty: false,
            logs: VecDeque::new(),
            help_overlay: false,
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    /// Context string for player lookups.
    pub fn player_context(&self) -> String {
        self.selected
            .map(|e| e.name().to_string())
            .unwrap_or_else(|| GLOBAL_CONTEXT.to_string())
    }

    // Sidebar

    pub fn sidebar_entities(&self) -> Vec<Entity> {
        match self.view {
            ViewMode::Nations => catalog::filter_nations(&self.nation_filter, self.nation_sort)
                .into_iter()
                .map(Entity::Nation)
                .collect(),
            view => catalog::entities_for(view),
        }
    }

    pub fn cycle_view(&mut self) {
        self.set_view(self.view.next());
    }

    /// Switching view clears the selection along with everything loaded for it.
    pub fn set_view(&mut self, view: ViewMode) {
        self.view = view;
        self.sidebar_cursor = 0;
        self.nation_filter_active = false;
        self.selected = None;
        self.reset_entity_content();
        self.focus = Focus::Sidebar;
    }

    pub fn sidebar_next(&mut self) {
        let total = self.sidebar_entities().len();
        if total == 0 {
            self.sidebar_cursor = 0;
            return;
        }
        self.sidebar_cursor = (self.sidebar_cursor + 1) % total;
    }

    pub fn sidebar_prev(&mut self) {
        let total = self.sidebar_entities().len();
        if total == 0 {
            self.sidebar_cursor = 0;
            return;
        }
        self.sidebar_cursor = if self.sidebar_cursor == 0 {
            total - 1
        } else {
            self.sidebar_cursor - 1
        };
    }

    fn clamp_sidebar(&mut self) {
        let total = self.sidebar_entities().len();
        if self.sidebar_cursor >= total {
            self.sidebar_cursor = total.saturating_sub(1);
        }
    }

    pub fn nation_filter_push(&mut self, c: char) {
        self.nation_filter.push(c);
        self.clamp_sidebar();
    }

    pub fn nation_filter_pop(&mut self) {
        self.nation_filter.pop();
        self.clamp_sidebar();
    }

    pub fn toggle_nation_sort(&mut self, key: NationSortKey) {
        self.nation_sort = self.nation_sort.toggle(key);
        self.clamp_sidebar();
    }

    pub fn activate_sidebar(&mut self) -> Vec<ProviderCommand> {
        let Some(entity) = self.sidebar_entities().get(self.sidebar_cursor).copied() else {
            return Vec::new();
        };
        self.select_entity(entity)
    }

    /// Selects an entity and requests its first view. Reselecting is a no-op.
    pub fn select_entity(&mut self, entity: Entity) -> Vec<ProviderCommand> {
        self.focus = Focus::Content;
        if self.selected.map(|e| e.id()) == Some(entity.id()) {
            return Vec::new();
        }
        self.selected = Some(entity);
        self.reset_entity_content();
        self.push_log(format!("[INFO] Selected {}", entity.name()));

        if entity.is_realtime() {
            self.match_center = Load::Loading;
            return vec![ProviderCommand::FetchMatchCenter { entity }];
        }
        self.tabs.insert(TabId::Review, Load::Loading);
        vec![ProviderCommand::FetchTab {
            entity,
            tab: TabId::Review,
        }]
    }

    fn reset_entity_content(&mut self) {
        self.tabs.clear();
        self.match_center = Load::Idle;
        self.active_tab = TabId::Review;
        self.row_cursor = 0;
        self.content_scroll = 0;
        self.analysis = None;
        self.picker = None;
    }

    // Tabs

    pub fn tab_content(&self, tab: TabId) -> &TabContent {
        self.tabs.get(&tab).unwrap_or(&Load::Idle)
    }

    /// Activates a tab, requesting its content only if nothing is loaded or loading.
    pub fn set_tab(&mut self, tab: TabId) -> Option<ProviderCommand> {
        let entity = self.selected.filter(|e| !e.is_realtime())?;
        if self.active_tab != tab {
            self.active_tab = tab;
            self.row_cursor = 0;
            self.content_scroll = 0;
        }
        if !self.tab_content(tab).is_idle() {
            return None;
        }
        self.tabs.insert(tab, Load::Loading);
        Some(ProviderCommand::FetchTab { entity, tab })
    }

    pub fn next_tab(&mut self) -> Option<ProviderCommand> {
        self.set_tab(self.active_tab.next())
    }

    pub fn prev_tab(&mut self) -> Option<ProviderCommand> {
        self.set_tab(self.active_tab.prev())
    }

    /// Re-requests whatever failed on screen.
    pub fn retry(&mut self) -> Option<ProviderCommand> {
        let entity = self.selected?;
        if entity.is_realtime() {
            if !matches!(self.match_center, Load::Failed(_)) {
                return None;
            }
            self.match_center = Load::Loading;
            return Some(ProviderCommand::FetchMatchCenter { entity });
        }
        let tab = self.active_tab;
        if !matches!(self.tab_content(tab), Load::Failed(_)) {
            return None;
        }
        self.tabs.insert(tab, Load::Loading);
        Some(ProviderCommand::FetchTab { entity, tab })
    }

    // Content rows

    /// Matches the content pane can open an analysis for, in display order.
    pub fn analyzable_matches(&self) -> Vec<MatchInfo> {
        let Some(entity) = self.selected else {
            return Vec::new();
        };
        if entity.is_realtime() {
            return self
                .match_center
                .ready()
                .map(|data| {
                    data.matches
                        .iter()
                        .map(|m| MatchInfo::from_realtime(m, entity.name()))
                        .collect()
                })
                .unwrap_or_default();
        }
        match self.tab_content(self.active_tab).ready() {
            Some(TabPayload::Fixtures { tables, .. }) => tables
                .analyzable_rows()
                .into_iter()
                .filter_map(|(is_future, row)| row.to_match_info(is_future, entity.name()))
                .collect(),
            Some(TabPayload::Calendar(fixtures)) => content::group_fixtures_by_date(fixtures)
                .into_iter()
                .flat_map(|(_, group)| group)
                .map(|f| MatchInfo::from_calendar(f, entity.name()))
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn row_next(&mut self) {
        let total = self.analyzable_matches().len();
        if total == 0 {
            self.content_scroll = self.content_scroll.saturating_add(1);
            return;
        }
        self.row_cursor = (self.row_cursor + 1) % total;
    }

    pub fn row_prev(&mut self) {
        let total = self.analyzable_matches().len();
        if total == 0 {
            self.content_scroll = self.content_scroll.saturating_sub(1);
            return;
        }
        self.row_cursor = if self.row_cursor == 0 {
            total - 1
        } else {
            self.row_cursor - 1
        };
    }

    // Analysis modal

    pub fn open_analysis(&mut self) -> Option<ProviderCommand> {
        let Some(info) = self.analyzable_matches().get(self.row_cursor).cloned() else {
            self.push_log("[INFO] No match selected for analysis");
            return None;
        };
        self.open_analysis_for(info)
    }

    pub fn open_analysis_for(&mut self, info: MatchInfo) -> Option<ProviderCommand> {
        let kind = AnalysisKind::initial_for(&info);
        self.analysis = Some(AnalysisModal {
            info,
            kind,
            cache: HashMap::new(),
            scroll: 0,
        });
        self.request_analysis_kind(kind)
    }

    /// Switches the analysis kind; each kind is requested at most once per modal.
    pub fn switch_analysis_kind(&mut self, kind: AnalysisKind) -> Option<ProviderCommand> {
        let modal = self.analysis.as_mut()?;
        if !kind.is_available(&modal.info) {
            self.push_log(format!(
                "[INFO] {} analysis is not available before kickoff",
                kind.label()
            ));
            return None;
        }
        modal.kind = kind;
        modal.scroll = 0;
        self.request_analysis_kind(kind)
    }

    pub fn next_analysis_kind(&mut self) -> Option<ProviderCommand> {
        let modal = self.analysis.as_ref()?;
        let kind = modal.kind.next_available(&modal.info);
        self.switch_analysis_kind(kind)
    }

    pub fn prev_analysis_kind(&mut self) -> Option<ProviderCommand> {
        let modal = self.analysis.as_ref()?;
        let kind = modal.kind.prev_available(&modal.info);
        self.switch_analysis_kind(kind)
    }

    fn request_analysis_kind(&mut self, kind: AnalysisKind) -> Option<ProviderCommand> {
        let modal = self.analysis.as_mut()?;
        let entry = modal.cache.entry(kind).or_default();
        if !entry.is_idle() {
            return None;
        }
        *entry = Load::Loading;
        Some(ProviderCommand::FetchAnalysis {
            info: modal.info.clone(),
            kind,
        })
    }

    // Players

    /// Prose currently in front of the user, topmost layer first.
    pub fn visible_text(&self) -> Option<&str> {
        if let Some(modal) = &self.analysis {
            return modal.current().ready().map(String::as_str);
        }
        match self.tab_content(self.active_tab).ready() {
            Some(TabPayload::Text(text)) => Some(text.as_str()),
            Some(TabPayload::Betting(info)) => Some(info.strategic_advice.as_str()),
            Some(TabPayload::Tactics(data)) => Some(data.description.as_str()),
            _ => None,
        }
    }

    pub fn open_picker(&mut self) {
        let names = self
            .visible_text()
            .map(markup::mentioned_players)
            .unwrap_or_default();
        if names.is_empty() {
            self.push_log("[INFO] No players mentioned here");
            return;
        }
        self.picker = Some(PlayerPicker { names, cursor: 0 });
    }

    pub fn picker_next(&mut self) {
        if let Some(p) = self.picker.as_mut() {
            p.cursor = (p.cursor + 1) % p.names.len().max(1);
        }
    }

    pub fn picker_prev(&mut self) {
        if let Some(p) = self.picker.as_mut() {
            let total = p.names.len().max(1);
            p.cursor = (p.cursor + total - 1) % total;
        }
    }

    fn picker_selection(&self) -> Option<String> {
        let p = self.picker.as_ref()?;
        p.names.get(p.cursor).cloned()
    }

    pub fn picker_open_profile(&mut self) -> Option<ProviderCommand> {
        let name = self.picker_selection()?;
        self.picker = None;
        self.open_profile(&name)
    }

    pub fn picker_toggle_compare(&mut self) {
        if let Some(name) = self.picker_selection() {
            self.toggle_compare(&name);
        }
    }

    pub fn open_profile(&mut self, player: &str) -> Option<ProviderCommand> {
        let player = player.trim();
        if player.is_empty() {
            return None;
        }
        self.profile = Some(ProfileModal {
            player: player.to_string(),
            content: Load::Loading,
        });
        Some(ProviderCommand::FetchPlayerProfile {
            player: player.to_string(),
            context: self.player_context(),
        })
    }

    // Comparison

    /// Adds a player to the comparison list. Duplicates and a full list are refused.
    pub fn add_compare(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || self.compare.iter().any(|n| n == name) {
            return false;
        }
        if self.compare.len() >= MAX_COMPARE {
            self.push_log(format!(
                "[INFO] Comparison is limited to {MAX_COMPARE} players"
            ));
            return false;
        }
        self.compare.push(name.to_string());
        true
    }

    pub fn remove_compare(&mut self, name: &str) {
        self.compare.retain(|n| n != name);
    }

    pub fn toggle_compare(&mut self, name: &str) {
        if self.compare.iter().any(|n| n == name) {
            self.remove_compare(name);
        } else {
            self.add_compare(name);
        }
    }

    pub fn clear_compare(&mut self) {
        self.compare.clear();
    }

    pub fn can_compare(&self) -> bool {
        self.compare.len() >= MIN_COMPARE
    }

    pub fn start_comparison(&mut self) -> Option<ProviderCommand> {
        if !self.can_compare() {
            self.push_log(format!(
                "[INFO] Pick at least {MIN_COMPARE} players to compare"
            ));
            return None;
        }
        let players = self.compare.clone();
        self.comparison = Some(ComparisonModal {
            players: players.clone(),
            content: Load::Loading,
            scroll: 0,
        });
        Some(ProviderCommand::FetchComparison {
            players,
            context: self.player_context(),
        })
    }

    // Search

    pub fn open_search(&mut self) {
        self.search = SearchBox {
            active: true,
            ..SearchBox::default()
        };
    }

    pub fn close_search(&mut self) {
        self.search = SearchBox::default();
    }

    pub fn search_input(&mut self, c: char, now: Instant) {
        self.search.query.push(c);
        self.touch_search(now);
    }

    pub fn search_backspace(&mut self, now: Instant) {
        self.search.query.pop();
        self.touch_search(now);
    }

    fn touch_search(&mut self, now: Instant) {
        self.search.cursor = 0;
        if self.search.query.trim().chars().count() < MIN_SUGGESTION_QUERY {
            self.search.deadline = None;
            self.search.requested = None;
            self.search.suggestions = Load::Idle;
            return;
        }
        self.search.deadline = Some(now + self.search_debounce);
    }

    /// Fires the pending suggestion request once the debounce window has passed.
    pub fn search_tick(&mut self, now: Instant) -> Option<ProviderCommand> {
        let deadline = self.search.deadline?;
        if now < deadline {
            return None;
        }
        self.search.deadline = None;
        let query = self.search.query.trim().to_string();
        if query.chars().count() < MIN_SUGGESTION_QUERY
            || self.search.requested.as_deref() == Some(query.as_str())
        {
            return None;
        }
        self.search.requested = Some(query.clone());
        self.search.suggestions = Load::Loading;
        Some(ProviderCommand::FetchSuggestions { query })
    }

    /// Suggestions for a long enough query, recent players otherwise.
    pub fn search_choices(&self) -> Vec<String> {
        if self.search.query.trim().chars().count() < MIN_SUGGESTION_QUERY {
            return self.recent_players.clone();
        }
        self.search.suggestions.ready().cloned().unwrap_or_default()
    }

    pub fn search_next(&mut self) {
        let total = self.search_choices().len();
        if total > 0 {
            self.search.cursor = (self.search.cursor + 1) % total;
        }
    }

    pub fn search_prev(&mut self) {
        let total = self.search_choices().len();
        if total > 0 {
            self.search.cursor = (self.search.cursor + total - 1) % total;
        }
    }

    /// Picks the highlighted choice (or the typed query), records it and opens its profile.
    pub fn search_select(&mut self) -> Option<ProviderCommand> {
        let choice = self
            .search_choices()
            .get(self.search.cursor)
            .cloned()
            .or_else(|| Some(self.search.query.trim().to_string()))
            .filter(|name| !name.is_empty())?;
        self.close_search();
        persist::push_recent(&mut self.recent_players, &choice);
        self.recents_dirty = true;
        self.open_profile(&choice)
    }

    pub fn take_recents_dirty(&mut self) -> bool {
        std::mem::take(&mut self.recents_dirty)
    }

    /// Closes the topmost overlay. Returns false when nothing was open.
    pub fn close_top(&mut self) -> bool {
        if self.help_overlay {
            self.help_overlay = false;
        } else if self.search.active {
            self.close_search();
        } else if self.picker.is_some() {
            self.picker = None;
        } else if self.profile.is_some() {
            self.profile = None;
        } else if self.comparison.is_some() {
            self.comparison = None;
        } else if self.analysis.is_some() {
            self.analysis = None;
        } else if self.nation_filter_active {
            self.nation_filter_active = false;
        } else {
            return false;
        }
        true
    }
}

/// Folds a provider result into the state. Answers to questions the user is
/// no longer asking are dropped.
pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::TabLoaded {
            entity_id,
            tab,
            result,
        } => {
            if state.selected.map(|e| e.id()) != Some(entity_id)
                || !state.tab_content(tab).is_loading()
            {
                return;
            }
            state.tabs.insert(tab, Load::settle(result));
        }
        Delta::MatchCenterLoaded { entity_id, result } => {
            if state.selected.map(|e| e.id()) != Some(entity_id) {
                return;
            }
            if let Ok(data) = &result {
                state.push_log(format!(
                    "[INFO] {} matches, {} sources",
                    data.matches.len(),
                    data.sources.len()
                ));
            }
            state.row_cursor = 0;
            state.match_center = Load::settle(result);
        }
        Delta::AnalysisLoaded { info, kind, result } => {
            let Some(modal) = state.analysis.as_mut().filter(|m| m.info == info) else {
                return;
            };
            modal.cache.insert(kind, Load::settle(result));
        }
        Delta::ProfileLoaded { player, result } => {
            let Some(modal) = state.profile.as_mut().filter(|m| m.player == player) else {
                return;
            };
            modal.content = Load::settle(result);
        }
        Delta::ComparisonLoaded { players, result } => {
            let Some(modal) = state.comparison.as_mut().filter(|m| m.players == players) else {
                return;
            };
            modal.content = Load::settle(result);
        }
        Delta::SuggestionsLoaded { query, result } => {
            if !state.search.active || state.search.query.trim() != query {
                return;
            }
            state.search.cursor = 0;
            state.search.suggestions = Load::settle(result);
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}
