use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use chrono::DateTime;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use courtside::codec::describe;
use courtside::config::EngineConfig;
use courtside::demo_feed::spawn_demo_provider;
use courtside::multiplier::{breakdown, max_breakdown};
use courtside::paper::{PaperBook, PaperPowerUps, PaperWallet};
use courtside::parlay::{ParlayAggregator, StandardParlayPricer, parlay_stake};
use courtside::prediction::{MatchDetails, Side};
use courtside::score_grammar::display_name;
use courtside::session_store::{MemorySessionStore, PredictionSessionStore, SqliteSessionStore};
use courtside::slip::SafeSlip;
use courtside::state::{BettingState, Delta, apply_delta};
use courtside::state_machine::{
    Availability, Mutation, SectionId, clear_section, section_choices, section_value, set_winner_availability,
    stale_fields, visible_sections,
};
use courtside::submission::{
    PowerUpKind, PowerUpListener, PowerUps, SubmitContext, Wallet, submit_parlay, submit_singles,
};

const USER_ID: &str = "local";
const STAKE_STEP: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Matches,
    Builder,
    Slip,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Focus::Matches => Focus::Builder,
            Focus::Builder => Focus::Slip,
            Focus::Slip => Focus::Matches,
        }
    }
}

#[derive(Default)]
struct PowerUpRefresh {
    pending: bool,
}

impl PowerUpListener for PowerUpRefresh {
    fn power_ups_changed(&mut self, _user_id: &str) {
        self.pending = true;
    }
}

struct App {
    state: BettingState,
    store: Box<dyn PredictionSessionStore>,
    aggregator: ParlayAggregator<StandardParlayPricer>,
    book: PaperBook,
    wallet: PaperWallet,
    power_ups: PaperPowerUps,
    refresh: PowerUpRefresh,
    min_bet: f64,
    safe_slip_cost: f64,
    focus: Focus,
    field_cursor: usize,
    slip_cursor: usize,
    help_overlay: bool,
    should_quit: bool,
}

impl App {
    fn new(config: &EngineConfig) -> Self {
        let mut state = BettingState::new(config);
        let store: Box<dyn PredictionSessionStore> = match config.session_db.as_deref() {
            Some(path) => match SqliteSessionStore::open(path, config.session_namespace.clone()) {
                Ok(store) => Box::new(store),
                Err(err) => {
                    state.push_log(format!("[WARN] Session store unavailable, keeping sessions in memory: {err:#}"));
                    Box::new(MemorySessionStore::new(config.session_namespace.clone()))
                }
            },
            None => Box::new(MemorySessionStore::new(config.session_namespace.clone())),
        };
        state.restore_sessions(store.as_ref());

        let mut power_ups = PaperPowerUps::default();
        power_ups.grant(USER_ID, PowerUpKind::SafeSlip, 1);

        let mut app = Self {
            state,
            store,
            aggregator: ParlayAggregator::new(config.parlay_pricer()),
            book: PaperBook::new(),
            wallet: PaperWallet::new(config.demo_balance),
            power_ups,
            refresh: PowerUpRefresh::default(),
            min_bet: config.min_bet,
            safe_slip_cost: config.safe_slip_cost,
            focus: Focus::Matches,
            field_cursor: 0,
            slip_cursor: 0,
            help_overlay: false,
            should_quit: false,
        };
        app.apply(Delta::SetStreak(config.demo_streak));
        app.sync_wallet();
        app
    }

    fn apply(&mut self, delta: Delta) {
        apply_delta(&mut self.state, self.store.as_mut(), delta);
    }

    fn sync_wallet(&mut self) {
        self.apply(Delta::SetBalance(self.wallet.balance()));
        let owned = self.power_ups.has_power_up(USER_ID, PowerUpKind::SafeSlip);
        self.apply(Delta::SetSafeSlipOwned(owned));
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.help_overlay {
            if matches!(key.code, KeyCode::Char('?') | KeyCode::Esc) {
                self.help_overlay = false;
            }
            return;
        }
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.help_overlay = true,
            KeyCode::Tab => self.focus = self.focus.next(),
            KeyCode::Char('j') | KeyCode::Down => self.move_cursor(1),
            KeyCode::Char('k') | KeyCode::Up => self.move_cursor(-1),
            KeyCode::Char('a') => self.mutate_selected(Mutation::SelectWinner(Side::A)),
            KeyCode::Char('b') => self.mutate_selected(Mutation::SelectWinner(Side::B)),
            KeyCode::Char('l') | KeyCode::Right => self.cycle_field(true),
            KeyCode::Char('h') | KeyCode::Left => self.cycle_field(false),
            KeyCode::Backspace | KeyCode::Delete => self.clear_field(),
            KeyCode::Char('x') => {
                if let Some(match_id) = self.state.selected_match_id() {
                    self.apply(Delta::ClearPrediction { match_id });
                    self.field_cursor = 0;
                }
            }
            KeyCode::Char('+') | KeyCode::Enter => {
                if let Some(match_id) = self.state.selected_match_id() {
                    let stake = self
                        .state
                        .slip
                        .get(&match_id)
                        .map(|item| item.bet_amount)
                        .unwrap_or(self.state.default_stake);
                    self.apply(Delta::AddToSlip { match_id, stake });
                }
            }
            KeyCode::Char('-') => {
                if let Some(match_id) = self.focused_slip_match() {
                    self.apply(Delta::RemoveFromSlip { match_id });
                    self.clamp_slip_cursor();
                }
            }
            KeyCode::Char(']') => self.nudge_stake(STAKE_STEP),
            KeyCode::Char('[') => self.nudge_stake(-STAKE_STEP),
            KeyCode::Char('p') => {
                let on = !self.state.slip.parlay_mode();
                self.apply(Delta::SetParlayMode(on));
            }
            KeyCode::Char('s') => self.apply(Delta::ToggleSafeSlip),
            KeyCode::Char('P') => self.place_slip(),
            _ => {}
        }
    }

    fn move_cursor(&mut self, step: isize) {
        match self.focus {
            Focus::Matches => {
                if step > 0 {
                    self.state.select_next();
                } else {
                    self.state.select_prev();
                }
                self.field_cursor = 0;
            }
            Focus::Builder => {
                let count = self.visible_fields().len();
                self.field_cursor = step_index(self.field_cursor, step, count);
            }
            Focus::Slip => {
                self.slip_cursor = step_index(self.slip_cursor, step, self.state.slip.len());
            }
        }
    }

    fn visible_fields(&self) -> Vec<SectionId> {
        self.state
            .selected_match()
            .map(|details| {
                let p = self.state.prediction(&details.id);
                visible_sections(&p, details.format).into_iter().collect()
            })
            .unwrap_or_default()
    }

    fn focused_section(&self) -> Option<SectionId> {
        let fields = self.visible_fields();
        fields.get(self.field_cursor.min(fields.len().saturating_sub(1))).copied()
    }

    fn mutate_selected(&mut self, mutation: Mutation) {
        if let Some(match_id) = self.state.selected_match_id() {
            self.apply(Delta::Mutate { match_id, mutation });
        }
    }

    // Steps the focused field through its legal values.
    fn cycle_field(&mut self, forward: bool) {
        if self.focus != Focus::Builder {
            return;
        }
        let Some(details) = self.state.selected_match().cloned() else {
            return;
        };
        let Some(section) = self.focused_section() else {
            return;
        };
        let p = self.state.prediction(&details.id);
        let choices = section_choices(&p, details.format, section);
        if choices.is_empty() {
            return;
        }
        let current = section_value(&p, details.format, section);
        let pos = choices.iter().position(|m| m.value_label() == current);
        let len = choices.len();
        let idx = match (pos, forward) {
            (Some(i), true) => (i + 1) % len,
            (Some(i), false) => (i + len - 1) % len,
            (None, true) => 0,
            (None, false) => len - 1,
        };
        // Re-selecting the current value would toggle it off.
        if Some(idx) == pos {
            return;
        }
        self.mutate_selected(choices[idx].clone());
    }

    fn clear_field(&mut self) {
        if self.focus != Focus::Builder {
            return;
        }
        let Some(section) = self.focused_section() else {
            return;
        };
        let Some(match_id) = self.state.selected_match_id() else {
            return;
        };
        let p = self.state.prediction(&match_id);
        if let Some(mutation) = clear_section(&p, section) {
            self.apply(Delta::Mutate { match_id, mutation });
        }
    }

    fn focused_slip_match(&self) -> Option<String> {
        match self.focus {
            Focus::Slip => self
                .state
                .slip
                .items()
                .get(self.slip_cursor)
                .map(|item| item.match_id.clone()),
            _ => self.state.selected_match_id(),
        }
    }

    fn clamp_slip_cursor(&mut self) {
        self.slip_cursor = self.slip_cursor.min(self.state.slip.len().saturating_sub(1));
    }

    fn nudge_stake(&mut self, delta: f64) {
        let Some(match_id) = self.focused_slip_match() else {
            return;
        };
        let Some(current) = self.state.slip.get(&match_id).map(|item| item.bet_amount) else {
            self.apply(Delta::Log(format!("[WARN] {match_id} is not on the slip")));
            return;
        };
        let stake = (current + delta).max(0.0);
        self.apply(Delta::SetStake { match_id, stake });
    }

    fn place_slip(&mut self) {
        if self.state.slip.is_empty() {
            self.apply(Delta::Log("[WARN] Slip is empty".to_string()));
            return;
        }
        let result = {
            let mut ctx = SubmitContext {
                user_id: USER_ID,
                bets: &mut self.book,
                wallet: &mut self.wallet,
                power_ups: &mut self.power_ups,
                listener: Some(&mut self.refresh),
                min_bet: self.min_bet,
                safe_slip_cost: self.safe_slip_cost,
            };
            if self.state.slip.parlay_mode() {
                submit_parlay(&self.state.slip, &self.aggregator, self.state.user_streak, &mut ctx)
            } else {
                submit_singles(&self.state.slip, &mut ctx)
            }
        };
        match result {
            Ok(receipt) => self.apply(Delta::Submitted(receipt)),
            Err(err) => self.apply(Delta::Log(format!("[WARN] Placement failed: {err:#}"))),
        }
        self.clamp_slip_cursor();
        self.sync_wallet();
    }

    fn on_tick(&mut self) {
        if self.refresh.pending {
            self.refresh.pending = false;
            self.sync_wallet();
        }
    }
}

fn step_index(current: usize, step: isize, count: usize) -> usize {
    if count == 0 {
        return 0;
    }
    current.saturating_add_signed(step).min(count - 1)
}

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    let config = EngineConfig::global();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    spawn_demo_provider(tx);

    let mut app = App::new(config);
    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            app.apply(delta);
        }

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
            app.on_tick();
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
            Constraint::Length(2),
            Constraint::Min(10),
            Constraint::Length(6),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(&app.state))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(38),
            Constraint::Min(40),
            Constraint::Length(40),
        ])
        .split(chunks[1]);

    render_matches(frame, columns[0], app);
    render_builder(frame, columns[1], app);
    render_slip(frame, columns[2], app);
    render_logs(frame, chunks[2], &app.state);

    let footer = Paragraph::new(
        "Tab focus  j/k move  a/b winner  h/l pick  Del clear  + add  [ ] stake  p parlay  s safe  P place  ? help  q quit",
    )
    .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[3]);

    if app.help_overlay {
        let area = frame.size();
        render_help_overlay(frame, area);
    }
}

fn header_text(state: &BettingState) -> String {
    let mode = if state.slip.parlay_mode() { "Parlay" } else { "Singles" };
    let safe = match state.slip.safe_slip() {
        SafeSlip::Off if state.safe_slip_owned => "available",
        SafeSlip::Off => "none",
        SafeSlip::Singles | SafeSlip::Parlay => "armed",
    };
    format!(
        "COURTSIDE | Balance {:.2} | Streak {} | Slip {} ({mode}) | Safe slip {safe}",
        state.balance,
        state.user_streak,
        state.slip.len()
    )
}

fn pane_block(title: &str, focused: bool) -> Block<'_> {
    let style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    Block::default().title(title).borders(Borders::ALL).border_style(style)
}

fn short_names(details: &MatchDetails) -> (String, String) {
    (
        display_name(&details.side_a.name, details.is_doubles),
        display_name(&details.side_b.name, details.is_doubles),
    )
}

fn render_matches(frame: &mut Frame, area: Rect, app: &App) {
    let state = &app.state;
    let block = pane_block("Matches", app.focus == Focus::Matches);
    let inner_height = area.height.saturating_sub(2) as usize;
    let rows_per_match = 2;
    let visible = (inner_height / rows_per_match).max(1);
    let (start, end) = visible_range(state.selected, state.matches.len(), visible);

    let mut lines: Vec<Line> = Vec::new();
    if state.matches.is_empty() {
        lines.push(Line::from("Waiting for schedule..."));
    }
    for (idx, details) in state.matches.iter().enumerate().take(end).skip(start) {
        let (a, b) = short_names(details);
        let marker = if state.slip.get(&details.id).is_some() {
            "$"
        } else if state.predictions.contains_key(&details.id) {
            "~"
        } else {
            " "
        };
        let style = if idx == state.selected {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        };
        lines.push(Line::styled(format!("{marker} {a} v {b}"), style));
        lines.push(Line::styled(
            format!(
                "  {:.2} / {:.2}  {}",
                details.side_a.base_odds,
                details.side_b.base_odds,
                details.format.label()
            ),
            style.fg(Color::DarkGray),
        ));
    }

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_builder(frame: &mut Frame, area: Rect, app: &App) {
    let block = pane_block("Prediction", app.focus == Focus::Builder);
    let Some(details) = app.state.selected_match() else {
        frame.render_widget(Paragraph::new("No match selected").block(block), area);
        return;
    };
    let p = app.state.prediction(&details.id);
    let format = details.format;
    let (a, b) = short_names(details);

    let mut lines: Vec<Line> = Vec::new();
    let when = details
        .scheduled_at
        .as_deref()
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|at| at.format("%a %d %b %H:%M").to_string())
        .unwrap_or_else(|| "TBD".to_string());
    lines.push(Line::from(format!(
        "{} | {} | {} | {when}",
        details.round,
        details.surface,
        format.label()
    )));
    lines.push(Line::from(""));

    let pick = |side: Side, name: &str, odds: f64| {
        let text = format!("[{}] {name} {odds:.2}", side.label());
        if p.winner == Some(side) {
            Span::styled(text, Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
        } else {
            Span::raw(text)
        }
    };
    lines.push(Line::from(vec![
        Span::raw("Winner  "),
        pick(Side::A, &a, details.side_a.base_odds),
        Span::raw("   "),
        pick(Side::B, &b, details.side_b.base_odds),
    ]));

    let stale = stale_fields(&p, format);
    let fields: Vec<SectionId> = visible_sections(&p, format).into_iter().collect();
    let cursor = app.field_cursor.min(fields.len().saturating_sub(1));
    for (idx, section) in fields.iter().enumerate() {
        let value = section_value(&p, format, *section).unwrap_or_else(|| "-".to_string());
        let mut note = String::new();
        if let SectionId::SetWinner(set) = section {
            let avail_a = set_winner_availability(&p, format, *set, Side::A);
            let avail_b = set_winner_availability(&p, format, *set, Side::B);
            match (avail_a, avail_b) {
                (Availability::Locked, _) | (_, Availability::Locked) => note.push_str(" (auto)"),
                (Availability::MaxReached, _) => note.push_str(" (A max reached)"),
                (_, Availability::MaxReached) => note.push_str(" (B max reached)"),
                _ => {}
            }
        }
        if stale.contains(section) {
            note.push_str(" (stale)");
        }
        let focused = app.focus == Focus::Builder && idx == cursor;
        let style = if focused {
            Style::default().add_modifier(Modifier::REVERSED)
        } else if stale.contains(section) {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };
        lines.push(Line::styled(format!("{:<18}{value}{note}", section.label()), style));
    }

    lines.push(Line::from(""));
    let odds = p.winner.map(|side| details.base_odds(side)).unwrap_or(0.0);
    let now = breakdown(&p, format, odds);
    let max = max_breakdown(&p, format, odds);
    lines.push(Line::from(vec![
        Span::raw("Multiplier "),
        Span::styled(format!("{:.2}x", now.total()), Style::default().fg(Color::Cyan)),
        Span::raw(format!("  max {:.2}x  bonus +{:.1}", max.total(), now.bonus())),
    ]));
    lines.push(Line::from(describe(&p, details)));
    if let Some(msg) = app.state.rejections.get(&details.id) {
        lines.push(Line::styled(msg.clone(), Style::default().fg(Color::Red)));
    }

    let widget = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(widget, area);
}

fn render_slip(frame: &mut Frame, area: Rect, app: &App) {
    let state = &app.state;
    let block = pane_block("Slip", app.focus == Focus::Slip);
    let mut lines: Vec<Line> = Vec::new();

    if state.slip.is_empty() {
        lines.push(Line::from("Empty. Press + on a prediction."));
    }
    for (idx, item) in state.slip.items().iter().enumerate() {
        let (a, b) = short_names(&item.match_details);
        let style = if app.focus == Focus::Slip && idx == app.slip_cursor {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        };
        lines.push(Line::styled(format!("{a} v {b}"), style));
        lines.push(Line::styled(
            format!(
                "  {:.2}x  stake {:.2}  win {:.2}",
                item.multiplier, item.bet_amount, item.potential_winnings
            ),
            style.fg(Color::DarkGray),
        ));
    }

    lines.push(Line::from(""));
    match state.parlay_calculation(&app.aggregator) {
        Some(calc) => {
            lines.push(Line::from(format!(
                "Parlay {:.2} x {:.2} x {:.2}",
                calc.base_odds, calc.bonus_multiplier, calc.streak_booster
            )));
            lines.push(Line::from(format!(
                "Final {:.2}  stake {:.2}  win {:.2}",
                calc.final_odds,
                parlay_stake(&state.slip.parlay_legs()),
                calc.potential_winnings
            )));
        }
        None => {
            lines.push(Line::from(format!(
                "Stake {:.2}  win {:.2}",
                state.slip.total_stake(),
                state.slip.individual_winnings()
            )));
        }
    }
    match state.slip_validation(&app.aggregator) {
        Ok(()) => lines.push(Line::styled("Ready (P to place)", Style::default().fg(Color::Green))),
        Err(err) => lines.push(Line::styled(err.to_string(), Style::default().fg(Color::Red))),
    }
    if let Some(receipt) = &state.last_receipt {
        lines.push(Line::styled(
            format!("Last: {} bet(s) at {}", receipt.bet_ids.len(), receipt.placed_at),
            Style::default().fg(Color::DarkGray),
        ));
    }

    let widget = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(widget, area);
}

fn render_logs(frame: &mut Frame, area: Rect, state: &BettingState) {
    let visible = area.height.saturating_sub(2) as usize;
    let lines: Vec<Line> = state
        .logs
        .iter()
        .rev()
        .take(visible)
        .rev()
        .map(|msg| {
            let style = if msg.starts_with("[WARN]") {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };
            Line::styled(msg.clone(), style)
        })
        .collect();
    let widget = Paragraph::new(lines).block(Block::default().title("Log").borders(Borders::ALL));
    frame.render_widget(widget, area);
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
        "Courtside - Help",
        "",
        "Global:",
        "  Tab          Cycle focus",
        "  j/k or ↑/↓   Move in focused pane",
        "  ?            Toggle help",
        "  q            Quit",
        "",
        "Prediction:",
        "  a / b        Pick winner (again to clear)",
        "  h/l or ←/→   Step through values",
        "  Del          Clear focused field",
        "  x            Clear prediction",
        "",
        "Slip:",
        "  + / Enter    Add or refresh selection",
        "  -            Remove selection",
        "  [ / ]        Stake down / up",
        "  p            Toggle parlay",
        "  s            Toggle safe slip",
        "  P            Place bets",
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
