use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use pitchscout::fangraphs_fetch;
use pitchscout::fetch_cache;
use pitchscout::filters::SituationFilters;
use pitchscout::lookup_fetch::{self, ResolveError};
use pitchscout::metrics;
use pitchscout::pitch_mix::PitchMixRow;
use pitchscout::report_export;
use pitchscout::state::{AppState, FilterDim, Screen, SearchField, SituationSnapshot};
use pitchscout::statcast_fetch;

struct App {
    state: AppState,
    should_quit: bool,
}

impl App {
    fn new() -> Self {
        Self {
            state: AppState::new(),
            should_quit: false,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.state.editing.is_some() {
            self.on_edit_key(key);
            return;
        }
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('1') => self.state.screen = Screen::Overview,
            KeyCode::Char('2') => self.state.screen = Screen::Situational,
            KeyCode::Char('/') => self.state.editing = Some(SearchField::First),
            KeyCode::Char('[') => {
                self.state.season_down();
                self.reload_if_loaded();
            }
            KeyCode::Char(']') => {
                self.state.season_up();
                self.reload_if_loaded();
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                if self.state.identity.is_some() {
                    self.load_data();
                } else {
                    self.state.push_log("[INFO] Nothing to reload yet");
                }
            }
            KeyCode::Char('e') | KeyCode::Char('E') => self.export_report(),
            KeyCode::Char('c') | KeyCode::Char('C') => {
                if self.state.screen == Screen::Situational {
                    self.state.compare = !self.state.compare;
                    self.state.focus_b = false;
                }
            }
            KeyCode::Tab => {
                if self.state.screen == Screen::Situational && self.state.compare {
                    self.state.focus_b = !self.state.focus_b;
                }
            }
            KeyCode::Char('j') | KeyCode::Down => {
                if self.state.screen == Screen::Situational {
                    self.state.filter_dim = self.state.filter_dim.next();
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                if self.state.screen == Screen::Situational {
                    self.state.filter_dim = self.state.filter_dim.prev();
                }
            }
            KeyCode::Char('h') | KeyCode::Left => self.cycle_active_filter(false),
            KeyCode::Char('l') | KeyCode::Right => self.cycle_active_filter(true),
            KeyCode::Char('x') | KeyCode::Char('X') => {
                if self.state.screen == Screen::Situational {
                    *self.state.active_filters_mut() = SituationFilters::all();
                    self.state.recompute_situational();
                }
            }
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            KeyCode::Esc => self.state.help_overlay = false,
            _ => {}
        }
    }

    fn on_edit_key(&mut self, key: KeyEvent) {
        let Some(field) = self.state.editing else {
            return;
        };
        match key.code {
            KeyCode::Esc => self.state.editing = None,
            KeyCode::Tab => {
                self.state.editing = Some(match field {
                    SearchField::First => SearchField::Last,
                    SearchField::Last => SearchField::First,
                });
            }
            KeyCode::Enter => {
                self.state.editing = None;
                self.run_search();
            }
            KeyCode::Backspace => {
                let input = self.edit_buffer(field);
                input.pop();
            }
            KeyCode::Char(c) if !c.is_control() => {
                let input = self.edit_buffer(field);
                if input.len() < 40 {
                    input.push(c);
                }
            }
            _ => {}
        }
    }

    fn edit_buffer(&mut self, field: SearchField) -> &mut String {
        match field {
            SearchField::First => &mut self.state.first_input,
            SearchField::Last => &mut self.state.last_input,
        }
    }

    fn cycle_active_filter(&mut self, forward: bool) {
        if self.state.screen != Screen::Situational {
            return;
        }
        let dim = self.state.filter_dim;
        let filters = self.state.active_filters_mut();
        match dim {
            FilterDim::Handedness => filters.cycle_handedness(forward),
            FilterDim::Count => filters.cycle_count(forward),
            FilterDim::Outs => filters.cycle_outs(forward),
            FilterDim::BaseState => filters.cycle_base(forward),
        }
        self.state.recompute_situational();
    }

    /// New search = new session: the fetch cache is cleared before the
    /// resolve so nothing from the previous pitcher leaks through.
    fn run_search(&mut self) {
        let first = self.state.first_input.trim().to_string();
        let last = self.state.last_input.trim().to_string();
        if first.is_empty() || last.is_empty() {
            self.state
                .push_log("[INFO] Enter both a first and a last name");
            return;
        }

        fetch_cache::clear();
        self.state.clear_player_data();

        match lookup_fetch::resolve_player(&last, &first) {
            Ok(identity) => {
                let fg = identity
                    .fangraphs_id
                    .map(|id| format!(", FG {id}"))
                    .unwrap_or_default();
                self.state.push_log(format!(
                    "[INFO] Found {} (MLBAM {}{fg})",
                    identity.name, identity.mlbam_id
                ));
                self.state.identity = Some(identity);
                self.load_data();
            }
            Err(ResolveError::NotFound { .. }) => {
                self.state
                    .push_log("[INFO] No player found with that name");
            }
            Err(ResolveError::LookupFailed(err)) => {
                self.state.push_log(format!("[WARN] Lookup failed: {err}"));
            }
        }
    }

    fn reload_if_loaded(&mut self) {
        if self.state.identity.is_some() {
            self.load_data();
        }
    }

    /// One blocking fetch-then-compute pass for the resolved pitcher and
    /// the selected season. Provider failures become console lines, empty
    /// results become informational states; nothing here panics or crashes
    /// the interaction.
    fn load_data(&mut self) {
        let Some(identity) = self.state.identity.clone() else {
            return;
        };
        let season = self.state.season;

        let table = match statcast_fetch::fetch_pitch_events(season, identity.mlbam_id) {
            Ok(table) => table,
            Err(err) => {
                self.state
                    .push_log(format!("[WARN] Statcast fetch failed: {err}"));
                Default::default()
            }
        };
        if table.is_empty() {
            self.state.push_log(format!(
                "[INFO] No Statcast data found for {} in {season}",
                identity.name
            ));
        }

        let aggregates = match fangraphs_fetch::fetch_season_aggregates(season) {
            Ok(rows) => rows,
            Err(err) => {
                self.state
                    .push_log(format!("[WARN] FanGraphs fetch failed: {err}"));
                Vec::new()
            }
        };

        let aggregate =
            metrics::merge_season_aggregate(&aggregates, identity.fangraphs_id, &identity.name);
        self.state.fangraphs_missing = aggregate.is_none();
        if aggregate.is_none() {
            self.state.push_log(format!(
                "[INFO] No FanGraphs season row for {} in {season}; IP/ERA/WHIP unavailable",
                identity.name
            ));
        }

        let pa = metrics::compute_pa_rates(&table.rows);
        let pitch = metrics::compute_pitch_metrics(&table.rows);
        self.state.basic = Some(metrics::build_basic_stats(aggregate, &pa, &pitch));
        self.state.mix = table.mix();
        self.state.pitch_table = Some(table);
        self.state.recompute_situational();
        self.state
            .push_log(format!("[INFO] Loaded {} ({season})", identity.name));
    }

    fn export_report(&mut self) {
        let (Some(identity), Some(stats)) = (&self.state.identity, &self.state.basic) else {
            self.state.push_log("[INFO] Nothing to export yet");
            return;
        };
        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let slug: String = identity
            .name
            .to_lowercase()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        let path = PathBuf::from(format!("scouting_{slug}_{}_{stamp}.xlsx", self.state.season));

        match report_export::export_report(
            &path,
            identity,
            self.state.season,
            stats,
            &self.state.mix,
        ) {
            Ok(summary) => self.state.push_log(format!(
                "[INFO] Exported {} ({} stats, {} mix rows)",
                path.display(),
                summary.stat_rows,
                summary.mix_rows
            )),
            Err(err) => self.state.push_log(format!("[WARN] Export failed: {err}")),
        }
    }
}

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let mut app = App::new();
    app.state
        .push_log("[INFO] Press / to search for a pitcher");
    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(5),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header =
        Paragraph::new(header_text(&app.state)).block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    render_search_bar(frame, chunks[1], &app.state);

    match app.state.screen {
        Screen::Overview => render_overview(frame, chunks[2], &app.state),
        Screen::Situational => render_situational(frame, chunks[2], &app.state),
    }

    let console = Paragraph::new(console_text(&app.state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[3]);

    let footer = Paragraph::new(footer_text(&app.state)).style(Style::default().fg(Color::Gray));
    frame.render_widget(footer, chunks[4]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    let screen = match state.screen {
        Screen::Overview => "OVERVIEW",
        Screen::Situational => "SITUATIONAL",
    };
    let player = state
        .identity
        .as_ref()
        .map(|p| p.name.as_str())
        .unwrap_or("no pitcher");
    let title = format!(
        "PITCHSCOUT | {screen} | {player} | Season {}",
        state.season
    );
    let line1 = format!("  .-.   {title}");
    let line2 = " ( + )".to_string();
    let line3 = "  `-'".to_string();
    format!("{line1}\n{line2}\n{line3}")
}

fn render_search_bar(frame: &mut Frame, area: Rect, state: &AppState) {
    let first = field_text("First", &state.first_input, state.editing == Some(SearchField::First));
    let last = field_text("Last", &state.last_input, state.editing == Some(SearchField::Last));
    let text = format!("{first}   {last}   Season: {}", state.season);
    let style = if state.editing.is_some() {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let bar = Paragraph::new(text)
        .style(style)
        .block(Block::default().title("Pitcher Search").borders(Borders::ALL));
    frame.render_widget(bar, area);
}

fn field_text(label: &str, value: &str, active: bool) -> String {
    let shown = if value.is_empty() { "_" } else { value };
    if active {
        format!("{label}: [{shown}|]")
    } else {
        format!("{label}: {shown}")
    }
}

fn render_overview(frame: &mut Frame, area: Rect, state: &AppState) {
    if state.basic.is_none() {
        let hint = if state.identity.is_none() {
            "Press / and enter a pitcher's first and last name to begin."
        } else {
            "No data loaded for this pitcher and season."
        };
        let empty = Paragraph::new(hint).style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, area);
        return;
    }

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(40), Constraint::Min(34)])
        .split(area);

    render_stats_grid(frame, columns[0], state);
    render_mix_panel(frame, columns[1], "Pitch Mix", &state.mix, None);
}

const STATS_PER_ROW: usize = 4;

fn render_stats_grid(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default().title("Basic Stats").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(stats) = &state.basic else {
        return;
    };
    let cells = stats.grid_cells();
    let rows = cells.chunks(STATS_PER_ROW).count();
    if inner.height == 0 || rows == 0 {
        return;
    }

    let row_height = (inner.height / rows as u16).max(2);
    for (row_idx, chunk) in cells.chunks(STATS_PER_ROW).enumerate() {
        let y = inner.y + row_idx as u16 * row_height;
        if y >= inner.y + inner.height {
            break;
        }
        let row_area = Rect {
            x: inner.x,
            y,
            width: inner.width,
            height: row_height.min(inner.y + inner.height - y),
        };
        let constraints: Vec<Constraint> = chunk
            .iter()
            .map(|_| Constraint::Ratio(1, chunk.len() as u32))
            .collect();
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(constraints)
            .split(row_area);
        for ((label, value), col) in chunk.iter().zip(cols.iter()) {
            let value = value.clone().unwrap_or_else(|| "—".to_string());
            let text = format!("{label}\n{value}");
            let cell = Paragraph::new(text).style(Style::default().add_modifier(Modifier::BOLD));
            frame.render_widget(cell, *col);
        }
    }
}

fn render_mix_panel(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    mix: &[PitchMixRow],
    matching: Option<usize>,
) {
    let block = Block::default().title(title.to_string()).borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.height == 0 || inner.width == 0 {
        return;
    }

    let mut lines = Vec::new();
    if let Some(n) = matching {
        lines.push(format!("{n} pitches match"));
    }
    if mix.is_empty() {
        lines.push("No pitch-type data available".to_string());
    } else {
        let label_width = mix.iter().map(|r| r.label.len()).max().unwrap_or(0).min(18);
        let bar_width = inner.width.saturating_sub(label_width as u16 + 16).max(4) as usize;
        for row in mix {
            let filled = (row.usage_pct / 100.0 * bar_width as f64).round() as usize;
            let bar: String = "█".repeat(filled.min(bar_width));
            lines.push(format!(
                "{:<label_width$} {:>4} {:>5.1}% {bar}",
                truncate(&row.label, label_width),
                row.count,
                row.usage_pct,
            ));
        }
    }
    let panel = Paragraph::new(lines.join("\n"));
    frame.render_widget(panel, inner);
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        s.chars().take(max.saturating_sub(1)).collect::<String>() + "…"
    }
}

fn render_situational(frame: &mut Frame, area: Rect, state: &AppState) {
    if state.pitch_table.is_none() {
        let empty = Paragraph::new("Load a pitcher on the Overview screen first.")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, area);
        return;
    }

    if state.compare {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(area);
        render_situation(
            frame,
            cols[0],
            "Situation A",
            &state.filters_a,
            &state.situ_a,
            state,
            !state.focus_b,
        );
        render_situation(
            frame,
            cols[1],
            "Situation B",
            &state.filters_b,
            &state.situ_b,
            state,
            state.focus_b,
        );
    } else {
        render_situation(
            frame,
            area,
            "Situation",
            &state.filters_a,
            &state.situ_a,
            state,
            true,
        );
    }
}

fn render_situation(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    filters: &SituationFilters,
    snapshot: &SituationSnapshot,
    state: &AppState,
    focused: bool,
) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(1)])
        .split(area);

    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let block = Block::default()
        .title(title.to_string())
        .borders(Borders::ALL)
        .border_style(border_style);
    let inner = block.inner(sections[0]);
    frame.render_widget(block, sections[0]);

    let mut lines = Vec::new();
    for dim in FilterDim::ORDER {
        let marker = if focused && state.filter_dim == dim {
            "> "
        } else {
            "  "
        };
        let value = match dim {
            FilterDim::Handedness => filters.handedness.label().to_string(),
            FilterDim::Count => filters.count.clone(),
            FilterDim::Outs => filters.outs_label(),
            FilterDim::BaseState => filters.base.label().to_string(),
        };
        lines.push(format!("{marker}{}: {value}", dim.label()));
    }
    let panel = Paragraph::new(lines.join("\n"));
    frame.render_widget(panel, inner);

    render_mix_panel(
        frame,
        sections[1],
        "Filtered Pitch Mix",
        &snapshot.mix,
        Some(snapshot.matching),
    );
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No messages yet".to_string();
    }
    state
        .logs
        .iter()
        .rev()
        .take(3)
        .cloned()
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect::<Vec<_>>()
        .join("\n")
}

fn footer_text(state: &AppState) -> String {
    match state.screen {
        Screen::Overview => {
            "1 Overview | 2 Situational | / Search | [ ] Season | r Reload | e Export | ? Help | q Quit"
                .to_string()
        }
        Screen::Situational => {
            let compare = if state.compare { "on" } else { "off" };
            format!(
                "1 Overview | 2 Situational | j/k Dim | h/l Value | x Reset | c Compare ({compare}) | Tab A/B | ? Help | q Quit"
            )
        }
    }
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 70, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Pitchscout - Help",
        "",
        "Global:",
        "  1            Overview screen",
        "  2            Situational screen",
        "  /            Edit search (Tab first/last, Enter run)",
        "  [ / ]        Season down / up (2015-2025)",
        "  r            Reload data for the current pitcher",
        "  e            Export scouting report (.xlsx)",
        "  ?            Toggle help",
        "  q            Quit",
        "",
        "Situational:",
        "  j/k or vertical arrows    Select filter dimension",
        "  h/l or horizontal arrows  Cycle the selected value",
        "  x            Reset the focused situation to All",
        "  c            Toggle side-by-side compare",
        "  Tab          Switch focus between A and B",
        "",
        "A new search starts a new session and clears the fetch cache.",
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
