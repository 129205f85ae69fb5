use std::fs::OpenOptions;
use std::io;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Tabs, Wrap};
use tracing::info;
use tracing_subscriber::EnvFilter;

use footy_hub::catalog::{self, Entity, NationSortKey, TABS, TabId, ViewMode};
use footy_hub::config::Config;
use footy_hub::content::{
    self, AnalysisKind, BettingInfo, ConfidenceBand, Fixture, GroundedMatchData, Prediction,
    TacticalData,
};
use footy_hub::fixtures::{ParsedFixtureRow, UNPARSED_NOTICE};
use footy_hub::gemini::{GeminiClient, TextGenerator};
use footy_hub::markup::{self, Segment};
use footy_hub::persist;
use footy_hub::provider::spawn_provider;
use footy_hub::service::TabPayload;
use footy_hub::state::{AppState, Delta, Focus, Load, ProviderCommand, apply_delta};

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
}

impl App {
    fn new(state: AppState, cmd_tx: Option<mpsc::Sender<ProviderCommand>>) -> Self {
        Self {
            state,
            should_quit: false,
            cmd_tx,
        }
    }

    fn send(&mut self, cmd: Option<ProviderCommand>) {
        let Some(cmd) = cmd else {
            return;
        };
        let Some(tx) = &self.cmd_tx else {
            self.state.push_log("[INFO] AI requests unavailable");
            return;
        };
        if tx.send(cmd).is_err() {
            self.state.push_log("[WARN] AI request failed to queue");
        }
    }

    fn send_all(&mut self, cmds: Vec<ProviderCommand>) {
        for cmd in cmds {
            self.send(Some(cmd));
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }
        if self.state.help_overlay {
            self.state.help_overlay = false;
            return;
        }
        if self.state.search.active {
            self.on_search_key(key);
        } else if self.state.picker.is_some() {
            self.on_picker_key(key);
        } else if self.state.profile.is_some() {
            self.on_profile_key(key);
        } else if self.state.comparison.is_some() {
            self.on_comparison_key(key);
        } else if self.state.analysis.is_some() {
            self.on_analysis_key(key);
        } else if self.state.nation_filter_active {
            self.on_nation_filter_key(key);
        } else {
            self.on_main_key(key);
        }
        if self.state.take_recents_dirty() {
            persist::save_recent_players(&self.state.recent_players);
        }
    }

    fn on_main_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.state.help_overlay = true,
            KeyCode::Char('/') => self.state.open_search(),
            KeyCode::Char('v') => self.state.cycle_view(),
            KeyCode::Tab => {
                self.state.focus = match self.state.focus {
                    Focus::Sidebar if self.state.selected.is_some() => Focus::Content,
                    _ => Focus::Sidebar,
                };
            }
            KeyCode::Esc => {
                self.state.close_top();
                self.state.focus = Focus::Sidebar;
            }
            KeyCode::Char('C') => {
                let cmd = self.state.start_comparison();
                self.send(cmd);
            }
            KeyCode::Char('x') => self.state.clear_compare(),
            _ => match self.state.focus {
                Focus::Sidebar => self.on_sidebar_key(key),
                Focus::Content => self.on_content_key(key),
            },
        }
    }

    fn on_sidebar_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.state.sidebar_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.sidebar_prev(),
            KeyCode::Enter | KeyCode::Char('l') | KeyCode::Right => {
                let cmds = self.state.activate_sidebar();
                self.send_all(cmds);
            }
            KeyCode::Char('f') if self.state.view == ViewMode::Nations => {
                self.state.nation_filter_active = true;
            }
            KeyCode::Char('n') if self.state.view == ViewMode::Nations => {
                self.state.toggle_nation_sort(NationSortKey::Name);
            }
            KeyCode::Char('c') if self.state.view == ViewMode::Nations => {
                self.state.toggle_nation_sort(NationSortKey::Confederation);
            }
            _ => {}
        }
    }

    fn on_content_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.state.row_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.row_prev(),
            KeyCode::Char('l') | KeyCode::Right => {
                let cmd = self.state.next_tab();
                self.send(cmd);
            }
            KeyCode::Char('h') | KeyCode::Left => {
                let cmd = self.state.prev_tab();
                self.send(cmd);
            }
            KeyCode::Char(c @ '1'..='9') => {
                let idx = c as usize - '1' as usize;
                if let Some(tab) = TABS.get(idx).copied() {
                    let cmd = self.state.set_tab(tab);
                    self.send(cmd);
                }
            }
            KeyCode::Enter | KeyCode::Char('a') => {
                let cmd = self.state.open_analysis();
                self.send(cmd);
            }
            KeyCode::Char('p') => self.state.open_picker(),
            KeyCode::Char('r') => {
                let cmd = self.state.retry();
                self.send(cmd);
            }
            _ => {}
        }
    }

    fn on_nation_filter_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Enter => self.state.nation_filter_active = false,
            KeyCode::Backspace => self.state.nation_filter_pop(),
            KeyCode::Char(c) => self.state.nation_filter_push(c),
            _ => {}
        }
    }

    fn on_analysis_key(&mut self, key: KeyEvent) {
        let cmd = match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.state.analysis = None;
                None
            }
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Tab => self.state.next_analysis_kind(),
            KeyCode::Left | KeyCode::Char('h') => self.state.prev_analysis_kind(),
            KeyCode::Char(c @ '1'..='3') => {
                let idx = c as usize - '1' as usize;
                self.state.switch_analysis_kind(AnalysisKind::ALL[idx])
            }
            KeyCode::Char('j') | KeyCode::Down => {
                if let Some(m) = self.state.analysis.as_mut() {
                    m.scroll = m.scroll.saturating_add(1);
                }
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                if let Some(m) = self.state.analysis.as_mut() {
                    m.scroll = m.scroll.saturating_sub(1);
                }
                None
            }
            KeyCode::Char('p') => {
                self.state.open_picker();
                None
            }
            _ => None,
        };
        self.send(cmd);
    }

    fn on_picker_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.state.picker = None,
            KeyCode::Char('j') | KeyCode::Down => self.state.picker_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.picker_prev(),
            KeyCode::Char(' ') | KeyCode::Char('c') => self.state.picker_toggle_compare(),
            KeyCode::Enter => {
                let cmd = self.state.picker_open_profile();
                self.send(cmd);
            }
            _ => {}
        }
    }

    fn on_profile_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.state.profile = None,
            KeyCode::Char('c') => {
                if let Some(player) = self.state.profile.as_ref().map(|p| p.player.clone())
                    && self.state.add_compare(&player)
                {
                    self.state
                        .push_log(format!("[INFO] {player} added to comparison"));
                }
            }
            _ => {}
        }
    }

    fn on_comparison_key(&mut self, key: KeyEvent) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('q')) {
            self.state.comparison = None;
            return;
        }
        let Some(modal) = self.state.comparison.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => modal.scroll = modal.scroll.saturating_add(1),
            KeyCode::Char('k') | KeyCode::Up => modal.scroll = modal.scroll.saturating_sub(1),
            _ => {}
        }
    }

    fn on_search_key(&mut self, key: KeyEvent) {
        let now = Instant::now();
        match key.code {
            KeyCode::Esc => self.state.close_search(),
            KeyCode::Enter => {
                let cmd = self.state.search_select();
                self.send(cmd);
            }
            KeyCode::Down => self.state.search_next(),
            KeyCode::Up => self.state.search_prev(),
            KeyCode::Backspace => self.state.search_backspace(now),
            KeyCode::Char(c) => self.state.search_input(c, now),
            _ => {}
        }
    }

    fn on_tick(&mut self) {
        let cmd = self.state.search_tick(Instant::now());
        self.send(cmd);
    }
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let cfg = Config::from_env();
    init_tracing(&cfg)?;
    info!(model = %cfg.model, has_key = cfg.has_api_key(), "starting footy_hub");

    let mut state = AppState::new();
    state.search_debounce = cfg.search_debounce;
    state.recent_players = persist::load_recent_players();
    if !cfg.has_api_key() {
        state.push_log("[WARN] GEMINI_API_KEY not set; AI requests will fail");
    }

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let generator: Arc<dyn TextGenerator> = Arc::new(GeminiClient::new(cfg.clone()));
    spawn_provider(tx, cmd_rx, generator, cfg.fetch_threads);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let mut app = App::new(state, Some(cmd_tx));
    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

/// The terminal belongs to the UI, so structured logs only go to a file.
fn init_tracing(cfg: &Config) -> Result<()> {
    let Some(path) = cfg.log_file.as_ref() else {
        return Ok(());
    };
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file {}", path.display()))?;
    let filter = EnvFilter::try_new(&cfg.log_filter).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(100);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }

        terminal.draw(|f| ui(f, &app.state))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            app.on_key(key);
        }

        if last_tick.elapsed() >= tick_rate {
            app.on_tick();
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, state: &AppState) {
    let area = frame.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(1),
            Constraint::Length(5),
            Constraint::Length(1),
        ])
        .split(area);

    let header = Paragraph::new(header_text(state))
        .style(Style::default().fg(Color::Green))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(30), Constraint::Min(30)])
        .split(chunks[1]);
    render_sidebar(frame, body[0], state);
    render_main(frame, body[1], state);

    frame.render_widget(Paragraph::new(compare_tray_line(state)), chunks[2]);

    let console = Paragraph::new(console_text(state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[3]);

    let footer =
        Paragraph::new(footer_text(state)).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[4]);

    if let Some(modal) = &state.analysis {
        render_analysis_modal(frame, area, modal);
    }
    if let Some(modal) = &state.comparison {
        render_comparison_modal(frame, area, modal);
    }
    if let Some(modal) = &state.profile {
        render_profile_modal(frame, area, modal);
    }
    if state.picker.is_some() {
        render_picker(frame, area, state);
    }
    if state.search.active {
        render_search(frame, area, state);
    }
    if state.help_overlay {
        render_help_overlay(frame, area);
    }
}

fn header_text(state: &AppState) -> String {
    let entity = state.selected.map(|e| e.name()).unwrap_or("Nothing selected");
    let mut title = format!("FOOTBALL HUB | {} | {}", state.view.label(), entity);
    if let Some(e) = state.selected
        && !e.is_realtime()
    {
        title.push_str(&format!(" | {}", state.active_tab.label()));
    }
    let line1 = format!("  .-.  {title}");
    let line2 = " ( o )".to_string();
    let line3 = "  '-'".to_string();
    format!("{line1}\n{line2}\n{line3}")
}

fn footer_text(state: &AppState) -> String {
    if state.nation_filter_active {
        return "Type to filter nations | Backspace Delete | Enter/Esc Done".to_string();
    }
    match state.focus {
        Focus::Sidebar => {
            let mut text = "j/k Move | Enter Select | Tab Content | v View | / Search".to_string();
            if state.view == ViewMode::Nations {
                text.push_str(" | f Filter | n/c Sort");
            }
            text.push_str(" | ? Help | q Quit");
            text
        }
        Focus::Content => "h/l Tabs | j/k Rows | Enter Analyze | p Players | r Retry | C Compare | Tab Sidebar | ? Help | q Quit".to_string(),
    }
}

fn selected_style() -> Style {
    Style::default().fg(Color::White).bg(Color::DarkGray)
}

fn player_style() -> Style {
    Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
}

fn dim_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

fn render_sidebar(frame: &mut Frame, area: Rect, state: &AppState) {
    let focused = state.focus == Focus::Sidebar;
    let border = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let block = Block::default()
        .title(state.view.label())
        .borders(Borders::ALL)
        .border_style(border);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines: Vec<Line> = Vec::new();
    if state.view == ViewMode::Nations {
        let cursor = if state.nation_filter_active { "_" } else { "" };
        lines.push(Line::from(format!(
            "Filter: {}{cursor}",
            state.nation_filter
        )));
        lines.push(Line::styled(
            format!(
                "Name {}  Confed {}",
                state.nation_sort.indicator(NationSortKey::Name),
                state.nation_sort.indicator(NationSortKey::Confederation)
            ),
            dim_style(),
        ));
    }

    let entities = state.sidebar_entities();
    if entities.is_empty() {
        lines.push(Line::styled("No matches", dim_style()));
        frame.render_widget(Paragraph::new(lines), inner);
        return;
    }

    let visible = (inner.height as usize).saturating_sub(lines.len());
    let (start, end) = visible_range(state.sidebar_cursor, entities.len(), visible);
    let selected_id = state.selected.map(|e| e.id());
    for (idx, entity) in entities.iter().enumerate().take(end).skip(start) {
        let marker = if Some(entity.id()) == selected_id { "▶" } else { " " };
        let label = match entity {
            Entity::League(l) if l.is_popular => format!("{marker} {} ★", l.name),
            Entity::Nation(n) => format!(
                "{marker} {:<18} {}",
                n.name,
                catalog::confed_label(n.confederation)
            ),
            other => format!("{marker} {}", other.name()),
        };
        let style = if idx == state.sidebar_cursor && focused {
            selected_style()
        } else {
            Style::default()
        };
        lines.push(Line::styled(label, style));
    }
    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_main(frame: &mut Frame, area: Rect, state: &AppState) {
    let border = if state.focus == Focus::Content {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let Some(entity) = state.selected else {
        let block = Block::default()
            .title("Welcome")
            .borders(Borders::ALL)
            .border_style(border);
        frame.render_widget(Paragraph::new(welcome_lines()).block(block), area);
        return;
    };

    if entity.is_realtime() {
        let block = Block::default()
            .title(entity.name())
            .borders(Borders::ALL)
            .border_style(border);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        render_match_center(frame, inner, state);
        return;
    }

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(area);
    let titles: Vec<String> = TABS
        .iter()
        .enumerate()
        .map(|(i, t)| format!("{} {}", i + 1, t.label()))
        .collect();
    let tabs = Tabs::new(titles)
        .select(state.active_tab.index())
        .block(Block::default().borders(Borders::ALL).border_style(border))
        .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
    frame.render_widget(tabs, sections[0]);

    let block = Block::default()
        .title(state.active_tab.label())
        .borders(Borders::ALL)
        .border_style(border);
    let inner = block.inner(sections[1]);
    frame.render_widget(block, sections[1]);
    render_tab(frame, inner, state, state.active_tab);
}

fn welcome_lines() -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::styled(
            "Pick a league, nation or match center feed from the sidebar.",
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Line::from(""),
        Line::from("Popular leagues:"),
    ];
    for league in catalog::popular_leagues() {
        lines.push(Line::from(format!("  ★ {}", league.name)));
    }
    lines.push(Line::from(""));
    lines.push(Line::styled(
        "Press / to search any player, v to switch views.",
        dim_style(),
    ));
    lines
}

/// Shows the non-ready states of a load. `None` means the caller draws the content.
fn load_placeholder<T>(load: &Load<T>, what: &str) -> Option<Paragraph<'static>> {
    match load {
        Load::Ready(_) => None,
        Load::Idle => Some(Paragraph::new(format!("{what} not loaded")).style(dim_style())),
        Load::Loading => Some(Paragraph::new(format!("Loading {what}..."))),
        Load::Failed(msg) => Some(
            Paragraph::new(vec![
                Line::styled(msg.clone(), Style::default().fg(Color::Red)),
                Line::styled("Press r to retry.", dim_style()),
            ])
            .wrap(Wrap { trim: true }),
        ),
    }
}

fn render_tab(frame: &mut Frame, area: Rect, state: &AppState, tab: TabId) {
    let load = state.tab_content(tab);
    if let Some(placeholder) = load_placeholder(load, tab.label()) {
        frame.render_widget(placeholder, area);
        return;
    }
    let Some(payload) = load.ready() else {
        return;
    };
    match payload {
        TabPayload::Text(text) => {
            let para = Paragraph::new(markup_lines(text))
                .wrap(Wrap { trim: false })
                .scroll((state.content_scroll, 0));
            frame.render_widget(para, area);
        }
        TabPayload::Fixtures { raw, tables } => {
            if tables.is_empty() {
                let mut lines = vec![
                    Line::styled(UNPARSED_NOTICE, Style::default().add_modifier(Modifier::ITALIC)),
                    Line::from(""),
                ];
                lines.extend(
                    raw.lines()
                        .map(|l| Line::styled(l.to_string(), dim_style())),
                );
                frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), area);
                return;
            }
            let halves = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(area);
            let recent_structured = tables.recent.iter().filter(|r| !r.is_raw).count();
            render_fixture_table(
                frame,
                halves[0],
                "Recent Results",
                &tables.recent,
                0,
                state.row_cursor,
            );
            render_fixture_table(
                frame,
                halves[1],
                "Upcoming Fixtures",
                &tables.upcoming,
                recent_structured,
                state.row_cursor,
            );
        }
        TabPayload::Calendar(fixtures) => render_calendar(frame, area, fixtures, state),
        TabPayload::Tactics(data) => render_tactics(frame, area, data),
        TabPayload::Predictions(list) => render_predictions(frame, area, list, state),
        TabPayload::Betting(info) => render_betting(frame, area, info, state),
    }
}

/// `first_index` is the analyzable index of this table's first structured row.
fn render_fixture_table(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    rows: &[ParsedFixtureRow],
    first_index: usize,
    cursor: usize,
) {
    let block = Block::default().title(title.to_string()).borders(Borders::TOP);
    if rows.is_empty() {
        frame.render_widget(Paragraph::new("None listed").style(dim_style()).block(block), area);
        return;
    }
    let mut next_index = first_index;
    let table_rows: Vec<Row> = rows
        .iter()
        .map(|row| {
            if row.is_raw {
                return Row::new(vec![
                    Cell::from(row.home_team.clone()),
                    Cell::from(""),
                    Cell::from(""),
                    Cell::from(row.context.clone()),
                ])
                .style(dim_style().add_modifier(Modifier::ITALIC));
            }
            let style = if next_index == cursor {
                selected_style()
            } else {
                Style::default()
            };
            next_index += 1;
            Row::new(vec![
                Cell::from(row.home_team.clone()),
                Cell::from(row.score.clone().unwrap_or_else(|| "vs".to_string())),
                Cell::from(row.away_team.clone()),
                Cell::from(row.context.clone()),
            ])
            .style(style)
        })
        .collect();
    let widths = [
        Constraint::Percentage(30),
        Constraint::Length(7),
        Constraint::Percentage(30),
        Constraint::Min(10),
    ];
    let header = Row::new(vec!["Home", "", "Away", "Context"])
        .style(Style::default().add_modifier(Modifier::BOLD));
    let table = Table::new(table_rows, widths).header(header).block(block);
    frame.render_widget(table, area);
}

fn render_calendar(frame: &mut Frame, area: Rect, fixtures: &[Fixture], state: &AppState) {
    if fixtures.is_empty() {
        frame.render_widget(Paragraph::new("No upcoming fixtures").style(dim_style()), area);
        return;
    }
    let mut lines: Vec<Line> = Vec::new();
    let mut cursor_line = 0usize;
    let mut idx = 0usize;
    for (date, group) in content::group_fixtures_by_date(fixtures) {
        lines.push(Line::styled(
            content::date_heading(&date),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ));
        for f in group {
            let time = f.time.as_deref().unwrap_or("--:--");
            let text = format!(
                "  {time:>5}  {} vs {}  ({})",
                f.home_team, f.away_team, f.competition
            );
            let style = if idx == state.row_cursor {
                cursor_line = lines.len();
                selected_style()
            } else {
                Style::default()
            };
            lines.push(Line::styled(text, style));
            idx += 1;
        }
        lines.push(Line::from(""));
    }
    let visible = area.height as usize;
    let scroll = cursor_line.saturating_sub(visible.saturating_sub(2)) as u16;
    frame.render_widget(Paragraph::new(lines).scroll((scroll, 0)), area);
}

fn render_tactics(frame: &mut Frame, area: Rect, data: &TacticalData) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    let pitch_block = Block::default()
        .title(data.formation_name.clone())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));
    let inner = pitch_block.inner(cols[0]);
    frame.render_widget(pitch_block, cols[0]);
    frame.render_widget(
        Paragraph::new(pitch_lines(data, inner.width, inner.height)),
        inner,
    );

    let mut lines = markup_lines(&data.description);
    lines.push(Line::from(""));
    for p in &data.players {
        lines.push(Line::from(format!(
            "{} {:<24} x{:>3.0} y{:>3.0}",
            p.marker(),
            p.position,
            p.x,
            p.y
        )));
    }
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), cols[1]);
}

fn pitch_lines(data: &TacticalData, width: u16, height: u16) -> Vec<Line<'static>> {
    if width == 0 || height == 0 {
        return Vec::new();
    }
    let mut grid = vec![vec!['·'; width as usize]; height as usize];
    let half = (height / 2) as usize;
    for cell in grid[half].iter_mut() {
        *cell = '─';
    }
    let mut keepers = Vec::new();
    for p in &data.players {
        let (col, row) = p.grid_cell(width, height);
        grid[row as usize][col as usize] = p.marker();
        if p.is_goalkeeper() {
            keepers.push((col as usize, row as usize));
        }
    }
    grid.into_iter()
        .enumerate()
        .map(|(row, cells)| {
            let spans: Vec<Span> = cells
                .into_iter()
                .enumerate()
                .map(|(col, c)| {
                    let style = if keepers.contains(&(col, row)) {
                        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
                    } else if c.is_alphabetic() || c == '?' {
                        Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
                    } else {
                        Style::default().fg(Color::Green)
                    };
                    Span::styled(c.to_string(), style)
                })
                .collect();
            Line::from(spans)
        })
        .collect()
}

fn band_color(band: ConfidenceBand) -> Color {
    match band {
        ConfidenceBand::High => Color::Green,
        ConfidenceBand::Medium => Color::Yellow,
        ConfidenceBand::Low => Color::Red,
    }
}

fn render_predictions(frame: &mut Frame, area: Rect, list: &[Prediction], state: &AppState) {
    let mut lines: Vec<Line> = Vec::new();
    if list.is_empty() {
        lines.push(Line::styled("No predictions available", dim_style()));
    }
    for p in list {
        let band = content::confidence_band(p.confidence_score);
        let filled = (p.confidence_score / 5.0).round() as usize;
        lines.push(Line::styled(
            format!("{} vs {}", p.home_team, p.away_team),
            Style::default().add_modifier(Modifier::BOLD),
        ));
        let score = p
            .suggested_score
            .as_deref()
            .map(|s| format!("  Score: {s}"))
            .unwrap_or_default();
        lines.push(Line::from(format!(
            "  Outcome: {}{score}",
            p.predicted_outcome.label()
        )));
        lines.push(Line::from(vec![
            Span::raw("  Confidence: "),
            Span::styled(
                format!("{}{}", "█".repeat(filled), "░".repeat(20 - filled.min(20))),
                Style::default().fg(band_color(band)),
            ),
            Span::raw(format!(" {:.0}%", p.confidence_score)),
        ]));
        lines.push(Line::from(format!("  {}", markup::strip_markup(&p.reasoning))));
        lines.push(Line::from(""));
    }
    lines.push(Line::styled(content::PREDICTIONS_NOTE, dim_style()));
    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .scroll((state.content_scroll, 0)),
        area,
    );
}

fn render_betting(frame: &mut Frame, area: Rect, info: &BettingInfo, state: &AppState) {
    let odds_height = if info.odds.is_empty() {
        0
    } else {
        (info.odds.len() as u16 + 3).min(area.height / 2)
    };
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),
            Constraint::Length(odds_height),
            Constraint::Length(2),
        ])
        .split(area);

    let mut lines: Vec<Line> = Vec::new();
    for para in content::advice_paragraphs(&info.strategic_advice) {
        lines.extend(markup_lines(para));
        lines.push(Line::from(""));
    }
    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .scroll((state.content_scroll, 0)),
        sections[0],
    );

    if !info.odds.is_empty() {
        let rows: Vec<Row> = info
            .odds
            .iter()
            .map(|o| {
                Row::new(vec![
                    format!("{} vs {}", o.home_team, o.away_team),
                    o.match_date.clone().unwrap_or_default(),
                    o.odds.home.to_string(),
                    o.odds.draw.to_string(),
                    o.odds.away.to_string(),
                ])
            })
            .collect();
        let widths = [
            Constraint::Min(20),
            Constraint::Length(12),
            Constraint::Length(6),
            Constraint::Length(6),
            Constraint::Length(6),
        ];
        let table = Table::new(rows, widths)
            .header(
                Row::new(vec!["Match", "Date", "1", "X", "2"])
                    .style(Style::default().add_modifier(Modifier::BOLD)),
            )
            .block(Block::default().title("Odds").borders(Borders::TOP));
        frame.render_widget(table, sections[1]);
    }

    frame.render_widget(
        Paragraph::new(content::ODDS_NOTE)
            .style(dim_style())
            .wrap(Wrap { trim: true }),
        sections[2],
    );
}

fn render_match_center(frame: &mut Frame, area: Rect, state: &AppState) {
    if let Some(placeholder) = load_placeholder(&state.match_center, "matches") {
        frame.render_widget(placeholder, area);
        return;
    }
    let Some(data) = state.match_center.ready() else {
        return;
    };
    let source_height = if data.sources.is_empty() {
        0
    } else {
        (data.sources.len() as u16 + 1).min(6)
    };
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(source_height)])
        .split(area);
    render_match_list(frame, sections[0], data, state.row_cursor);

    if !data.sources.is_empty() {
        let mut lines = vec![Line::styled(
            "Sources",
            Style::default().add_modifier(Modifier::BOLD),
        )];
        for s in &data.sources {
            lines.push(Line::from(vec![
                Span::raw(format!("{}  ", s.title)),
                Span::styled(s.uri.clone(), dim_style()),
            ]));
        }
        frame.render_widget(Paragraph::new(lines), sections[1]);
    }
}

fn render_match_list(frame: &mut Frame, area: Rect, data: &GroundedMatchData, cursor: usize) {
    if data.matches.is_empty() {
        frame.render_widget(Paragraph::new("No matches found").style(dim_style()), area);
        return;
    }
    let rows: Vec<Row> = data
        .matches
        .iter()
        .enumerate()
        .map(|(idx, m)| {
            let badge_style = match m.status {
                content::MatchStatus::Live | content::MatchStatus::HalfTime => {
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
                }
                content::MatchStatus::Scheduled => Style::default().fg(Color::Cyan),
                _ => dim_style(),
            };
            let style = if idx == cursor {
                selected_style()
            } else {
                Style::default()
            };
            Row::new(vec![
                Cell::from(m.status.badge().to_string()).style(badge_style),
                Cell::from(m.home_team.clone()),
                Cell::from(m.score.clone().unwrap_or_else(|| "-".to_string())),
                Cell::from(m.away_team.clone()),
                Cell::from(m.time.clone().unwrap_or_default()),
                Cell::from(m.competition.clone()),
            ])
            .style(style)
        })
        .collect();
    let widths = [
        Constraint::Length(9),
        Constraint::Percentage(22),
        Constraint::Length(7),
        Constraint::Percentage(22),
        Constraint::Length(12),
        Constraint::Min(10),
    ];
    let header = Row::new(vec!["Status", "Home", "Score", "Away", "Time", "Competition"])
        .style(Style::default().add_modifier(Modifier::BOLD));
    frame.render_widget(Table::new(rows, widths).header(header), area);
}

/// Renders `[[Player]]` prose with player names highlighted.
fn markup_lines(text: &str) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for (i, para) in markup::paragraphs(text).into_iter().enumerate() {
        if i > 0 {
            lines.push(Line::from(""));
        }
        for raw_line in para.lines() {
            let spans: Vec<Span<'static>> = markup::segments(raw_line)
                .into_iter()
                .map(|seg| match seg {
                    Segment::Text(t) => Span::raw(t),
                    Segment::Player(name) => Span::styled(name, player_style()),
                })
                .collect();
            lines.push(Line::from(spans));
        }
    }
    lines
}

fn compare_tray_line(state: &AppState) -> Line<'static> {
    if state.compare.is_empty() {
        return Line::styled(" Compare: none (p then c to add players)", dim_style());
    }
    let mut spans = vec![Span::raw(" Compare: ")];
    for name in &state.compare {
        spans.push(Span::styled(
            format!("[{}]", content::initials(name)),
            player_style(),
        ));
        spans.push(Span::raw(format!(" {name}  ")));
    }
    let hint = if state.can_compare() {
        "C compare | x clear"
    } else {
        "add one more to compare | x clear"
    };
    spans.push(Span::styled(hint, dim_style()));
    Line::from(spans)
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No alerts yet".to_string();
    }
    let take = 3;
    let skip = state.logs.len().saturating_sub(take);
    state
        .logs
        .iter()
        .skip(skip)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_analysis_modal(frame: &mut Frame, area: Rect, modal: &footy_hub::state::AnalysisModal) {
    let popup = centered_rect(80, 80, area);
    frame.render_widget(Clear, popup);
    let block = Block::default()
        .title(format!("Match Analysis: {}", modal.info.headline()))
        .borders(Borders::ALL);
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(2),
            Constraint::Min(1),
        ])
        .split(inner);
    frame.render_widget(
        Paragraph::new(modal.info.subtitle()).style(dim_style()),
        sections[0],
    );

    let mut kind_spans = Vec::new();
    for (i, kind) in AnalysisKind::ALL.iter().enumerate() {
        let style = if !kind.is_available(&modal.info) {
            dim_style().add_modifier(Modifier::CROSSED_OUT)
        } else if *kind == modal.kind {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        kind_spans.push(Span::styled(format!(" {} {} ", i + 1, kind.label()), style));
    }
    frame.render_widget(Paragraph::new(Line::from(kind_spans)), sections[1]);

    let current = modal.current();
    if let Some(placeholder) = load_placeholder(current, modal.kind.label()) {
        frame.render_widget(placeholder, sections[2]);
        return;
    }
    if let Some(text) = current.ready() {
        frame.render_widget(
            Paragraph::new(markup_lines(text))
                .wrap(Wrap { trim: false })
                .scroll((modal.scroll, 0)),
            sections[2],
        );
    }
}

fn render_profile_modal(frame: &mut Frame, area: Rect, modal: &footy_hub::state::ProfileModal) {
    let popup = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup);
    let block = Block::default()
        .title(format!("Player: {}", modal.player))
        .borders(Borders::ALL);
    if let Some(placeholder) = load_placeholder(&modal.content, "profile") {
        frame.render_widget(placeholder.block(block), popup);
        return;
    }
    let Some(p) = modal.content.ready() else {
        return;
    };
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let mut lines = vec![
        Line::styled(p.name.clone(), bold.fg(Color::Cyan)),
        Line::from(format!("{} | {}", p.club, p.position)),
        Line::from(""),
        Line::styled("Strengths", bold),
    ];
    for s in &p.strengths {
        lines.push(Line::from(format!("  • {s}")));
    }
    lines.push(Line::from(""));
    lines.push(Line::styled("Recent performance", bold));
    lines.push(Line::from(markup::strip_markup(&p.recent_performance)));
    lines.push(Line::from(""));
    lines.push(Line::styled("c add to comparison | Esc close", dim_style()));
    frame.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: false }).block(block),
        popup,
    );
}

fn render_comparison_modal(
    frame: &mut Frame,
    area: Rect,
    modal: &footy_hub::state::ComparisonModal,
) {
    let popup = centered_rect(90, 80, area);
    frame.render_widget(Clear, popup);
    let block = Block::default()
        .title(format!("Compare: {}", modal.players.join(" / ")))
        .borders(Borders::ALL);
    let inner = block.inner(popup);
    frame.render_widget(block, popup);
    if let Some(placeholder) = load_placeholder(&modal.content, "comparison") {
        frame.render_widget(placeholder, inner);
        return;
    }
    let Some(data) = modal.content.ready() else {
        return;
    };

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(inner);
    let count = data.players.len().max(1) as u32;
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![Constraint::Ratio(1, count); count as usize])
        .split(sections[0]);
    let bold = Style::default().add_modifier(Modifier::BOLD);
    for (player, col) in data.players.iter().zip(columns.iter()) {
        let p = &player.profile;
        let mut lines = vec![
            Line::styled(p.name.clone(), bold.fg(Color::Cyan)),
            Line::from(format!("{} | {}", p.club, p.position)),
            Line::styled(player.comparison_verdict.clone(), Style::default().fg(Color::Yellow)),
            Line::from(""),
        ];
        for s in &p.strengths {
            lines.push(Line::from(format!("• {s}")));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(markup::strip_markup(&p.recent_performance)));
        frame.render_widget(
            Paragraph::new(lines)
                .wrap(Wrap { trim: false })
                .block(Block::default().borders(Borders::ALL)),
            *col,
        );
    }
    frame.render_widget(
        Paragraph::new(markup_lines(&data.overall_analysis))
            .wrap(Wrap { trim: false })
            .scroll((modal.scroll, 0))
            .block(Block::default().title("Overall").borders(Borders::TOP)),
        sections[1],
    );
}

fn render_picker(frame: &mut Frame, area: Rect, state: &AppState) {
    let Some(picker) = &state.picker else {
        return;
    };
    let popup = centered_rect(40, 50, area);
    frame.render_widget(Clear, popup);
    let mut lines: Vec<Line> = picker
        .names
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let mark = if state.compare.contains(name) { "[x]" } else { "[ ]" };
            let style = if idx == picker.cursor {
                selected_style()
            } else {
                Style::default()
            };
            Line::styled(format!("{mark} {name}"), style)
        })
        .collect();
    lines.push(Line::from(""));
    lines.push(Line::styled("Enter profile | c compare | Esc close", dim_style()));
    frame.render_widget(
        Paragraph::new(lines).block(Block::default().title("Players").borders(Borders::ALL)),
        popup,
    );
}

fn render_search(frame: &mut Frame, area: Rect, state: &AppState) {
    let popup = centered_rect(50, 50, area);
    frame.render_widget(Clear, popup);
    let search = &state.search;
    let mut lines = vec![
        Line::from(vec![
            Span::styled("> ", Style::default().fg(Color::Yellow)),
            Span::raw(search.query.clone()),
            Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
        ]),
        Line::from(""),
    ];
    let short = search.query.trim().chars().count() < footy_hub::service::MIN_SUGGESTION_QUERY;
    let heading = if short { "Recent searches" } else { "Suggestions" };
    lines.push(Line::styled(heading, Style::default().add_modifier(Modifier::BOLD)));
    if !short && search.suggestions.is_loading() {
        lines.push(Line::styled("Searching...", dim_style()));
    }
    if let Load::Failed(msg) = &search.suggestions {
        lines.push(Line::styled(msg.clone(), Style::default().fg(Color::Red)));
    }
    let choices = state.search_choices();
    if choices.is_empty() && !search.suggestions.is_loading() {
        lines.push(Line::styled("  nothing yet", dim_style()));
    }
    for (idx, name) in choices.iter().enumerate() {
        let style = if idx == search.cursor {
            selected_style()
        } else {
            Style::default()
        };
        lines.push(Line::styled(format!("  {name}"), style));
    }
    frame.render_widget(
        Paragraph::new(lines).block(Block::default().title("Player Search").borders(Borders::ALL)),
        popup,
    );
}

fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 {
        return (0, 0);
    }
    if total <= visible {
        return (0, total);
    }

    let mut start = selected.saturating_sub(visible / 2);
    if start + visible > total {
        start = total - visible;
    }
    (start, start + visible)
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 70, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Football Hub - Help",
        "",
        "Global:",
        "  Tab          Switch sidebar / content",
        "  v            Cycle Leagues / Nations / Match Center",
        "  /            Player search",
        "  C / x        Compare players / clear comparison",
        "  Esc          Close overlay",
        "  ?            Toggle help",
        "  q            Quit",
        "",
        "Sidebar:",
        "  j/k or ↑/↓   Move",
        "  Enter        Select",
        "  f n c        Nations: filter, sort by name, sort by confederation",
        "",
        "Content:",
        "  h/l or 1-9   Switch tab",
        "  j/k          Move row / scroll",
        "  Enter / a    Analyze selected match",
        "  p            Players mentioned on screen",
        "  r            Retry failed load",
        "",
        "Analysis: 1-3 or h/l switch kind, p players",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
