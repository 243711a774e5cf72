use color_eyre::eyre::Result;
use crossterm::{
    event::{
        self,
        Event,
        KeyCode,
        KeyEvent,
        KeyEventKind,
        KeyModifiers,
    },
    terminal::{
        disable_raw_mode,
        enable_raw_mode,
    },
};
use cup_shuffle::{
    GameView,
    Phase,
    Presenter,
    bet_slip::{
        BetSlip,
        Preset,
        QUICK_ADD,
    },
    game::CupView,
    round::SLOT_COUNT,
};
use itertools::Itertools;
use ratatui::{
    prelude::*,
    widgets::*,
};
use std::io::stdout;
use tokio::sync::mpsc;
use tracing::error;
use unicode_width::UnicodeWidthStr;

const QUICK_ADD_KEYS: [char; 4] = ['z', 'x', 'c', 'v'];

pub enum UserEvent {
    Quit,
    Redraw,
    PlaceBet(String),
    Choose(usize),
}

#[derive(Default)]
pub struct UiState {
    mode: Mode,
    slip: BetSlip,
    cursor: usize,
    last_view: Option<GameView>,
    terminal: Option<Terminal<CrosstermBackend<std::io::Stdout>>>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
enum Mode {
    #[default]
    Normal,
    QuitModal,
}

impl UiState {
    pub fn slip_mut(&mut self) -> &mut BetSlip {
        &mut self.slip
    }

    pub fn redraw(&mut self) {
        if let Err(e) = self.draw() {
            error!(error = %e, "failed to draw frame");
        }
    }

    fn draw(&mut self) -> Result<()> {
        let Some(view) = self.last_view.clone() else {
            return Ok(());
        };
        if let Some(mut term) = self.terminal.take() {
            let res = term.draw(|f| ui(f, self, &view)).map(|_| ());
            self.terminal = Some(term);
            res?;
        }
        Ok(())
    }
}

impl Presenter for UiState {
    fn present(&mut self, view: &GameView) {
        let new_round = self
            .last_view
            .as_ref()
            .is_none_or(|prev| prev.round_number != view.round_number);
        if new_round {
            self.slip.clear();
            self.cursor = 0;
        }
        self.last_view = Some(view.clone());
        self.redraw();
    }
}

pub fn terminal_enter(state: &mut UiState) -> Result<()> {
    enable_raw_mode()?;
    crossterm::execute!(std::io::stdout(), crossterm::terminal::EnterAlternateScreen)?;
    // Create a single persistent Terminal to preserve buffers across draws
    let backend = CrosstermBackend::new(stdout());
    let terminal = Terminal::new(backend)?;
    state.terminal = Some(terminal);
    Ok(())
}

pub fn terminal_exit() -> Result<()> {
    disable_raw_mode()?;
    crossterm::execute!(std::io::stdout(), crossterm::terminal::LeaveAlternateScreen)?;
    Ok(())
}

/// Reads terminal events on a dedicated thread so the round timers never wait
/// on the keyboard.
pub fn spawn_input_reader() -> mpsc::UnboundedReceiver<Event> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        loop {
            match event::read() {
                Ok(ev) => {
                    if tx.send(ev).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    error!(error = %e, "terminal input failed");
                    break;
                }
            }
        }
    });
    rx
}

pub fn handle_event(state: &mut UiState, ev: Event) -> Option<UserEvent> {
    match ev {
        Event::Key(k) if k.kind == KeyEventKind::Press => handle_key(state, k),
        Event::Resize(..) => Some(UserEvent::Redraw),
        _ => None,
    }
}

fn handle_key(state: &mut UiState, k: KeyEvent) -> Option<UserEvent> {
    if k.modifiers.contains(KeyModifiers::CONTROL) && k.code == KeyCode::Char('c') {
        return Some(UserEvent::Quit);
    }
    if state.mode == Mode::QuitModal {
        return match k.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => Some(UserEvent::Quit),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                state.mode = Mode::Normal;
                Some(UserEvent::Redraw)
            }
            _ => None,
        };
    }
    if matches!(k.code, KeyCode::Char('q') | KeyCode::Esc) {
        state.mode = Mode::QuitModal;
        return Some(UserEvent::Redraw);
    }
    let view = state.last_view.as_ref()?;
    if view.can_choose {
        return match k.code {
            KeyCode::Char(c @ '1'..='3') => c
                .to_digit(10)
                .map(|d| UserEvent::Choose(d as usize - 1)),
            KeyCode::Left => {
                state.cursor = state.cursor.saturating_sub(1);
                Some(UserEvent::Redraw)
            }
            KeyCode::Right => {
                state.cursor = (state.cursor + 1).min(SLOT_COUNT - 1);
                Some(UserEvent::Redraw)
            }
            KeyCode::Enter | KeyCode::Char(' ') => Some(UserEvent::Choose(state.cursor)),
            _ => None,
        };
    }
    if !view.bet_input_enabled {
        return None;
    }
    let balance = view.balance;
    match k.code {
        KeyCode::Enter => Some(UserEvent::PlaceBet(state.slip.text().to_string())),
        KeyCode::Backspace => {
            state.slip.backspace();
            Some(UserEvent::Redraw)
        }
        KeyCode::Char(c) if c.is_ascii_digit() => {
            state.slip.push_digit(c);
            Some(UserEvent::Redraw)
        }
        KeyCode::Char('h') => {
            state.slip.apply(Preset::Half, balance);
            Some(UserEvent::Redraw)
        }
        KeyCode::Char('m') => {
            state.slip.apply(Preset::Max, balance);
            Some(UserEvent::Redraw)
        }
        KeyCode::Char(c) => {
            let idx = QUICK_ADD_KEYS.iter().position(|k| *k == c)?;
            state.slip.apply(Preset::Add(QUICK_ADD[idx]), balance);
            Some(UserEvent::Redraw)
        }
        _ => None,
    }
}

fn ui(f: &mut Frame, state: &UiState, view: &GameView) {
    // Clear the whole frame to avoid leftover fragments
    f.render_widget(Clear, f.area());
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),  // status + message
            Constraint::Length(11), // cups
            Constraint::Length(7),  // bet slip + history
            Constraint::Length(3),  // help
        ])
        .split(f.area());

    draw_top(f, chunks[0], view);
    draw_cups(f, state, chunks[1], view);
    draw_lower(f, state, chunks[2], view);
    draw_help(f, chunks[3], view);
    draw_modals(f, state);
}

fn draw_top(f: &mut Frame, area: Rect, view: &GameView) {
    let timer = match view.countdown {
        Some(secs) => format!("{secs}s"),
        None => String::from("--"),
    };
    let timer_style = match view.countdown {
        Some(secs) if secs <= 3 => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        _ => Style::default(),
    };
    let lines = vec![
        Line::from(vec![
            Span::raw(format!("Wallet: {} | Time: ", view.balance_label)),
            Span::styled(timer, timer_style),
            Span::raw(format!(" | {:?}", view.phase)),
        ]),
        Line::styled(
            view.message.clone(),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
    ];
    let status = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Find the Ball"));
    f.render_widget(status, area);
}

fn draw_cups(f: &mut Frame, state: &UiState, area: Rect, view: &GameView) {
    let cols = view.cups.len().max(1) as u16;
    let col_w = area.width / cols;
    for cup in &view.cups {
        let rect = Rect::new(
            area.x + cup.position as u16 * col_w,
            area.y,
            col_w,
            area.height,
        );
        let swapping = view.phase == Phase::Shuffling
            && view
                .last_swap
                .is_some_and(|s| s.a == cup.position || s.b == cup.position);
        let focused = view.can_choose && state.cursor == cup.position;
        let border = if cup.selected {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else if focused {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else if swapping {
            Style::default().fg(Color::Magenta)
        } else {
            Style::default()
        };
        let title = if swapping {
            format!("[{}] <->", cup.position + 1)
        } else {
            format!("[{}]", cup.position + 1)
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(Span::styled(title, border));
        let inner = block.inner(rect);
        f.render_widget(&block, rect);
        let art: Vec<Line> = cup_art(cup)
            .into_iter()
            .map(|row| Line::from(center(row, inner.width)))
            .collect();
        f.render_widget(Paragraph::new(art), inner);
    }
}

fn cup_art(cup: &CupView) -> Vec<&'static str> {
    let ball = if cup.revealed { "●" } else { " " };
    if cup.lifted {
        vec!["  ___  ", " /   \\ ", "/_____\\", "       ", "       ", ball]
    } else {
        vec!["       ", "       ", "  ___  ", " /   \\ ", "/_____\\", " "]
    }
}

fn center(text: &str, width: u16) -> String {
    let pad = (width as usize).saturating_sub(text.width()) / 2;
    format!("{}{}", " ".repeat(pad), text)
}

fn draw_lower(f: &mut Frame, state: &UiState, area: Rect, view: &GameView) {
    let lower = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    // Bet slip on the left
    let slip_style = if view.bet_input_enabled {
        Style::default()
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let cursor = if view.bet_input_enabled { "_" } else { "" };
    let presets = QUICK_ADD
        .iter()
        .zip(QUICK_ADD_KEYS)
        .map(|(amount, key)| format!("{key}:+{amount}"))
        .join(" ");
    let slip_lines = vec![
        Line::styled(format!("Amount: {}{}", state.slip.text(), cursor), slip_style),
        Line::from(""),
        Line::styled(format!("{presets} h:half m:max"), slip_style),
        Line::styled("Enter=place bet", slip_style),
    ];
    let slip = Paragraph::new(slip_lines)
        .block(Block::default().borders(Borders::ALL).title("Your Bet"));
    f.render_widget(slip, lower[0]);

    // History on the right, newest at the bottom
    let mut rows = Vec::new();
    if view.history.is_empty() {
        rows.push(Line::styled("None", Style::default().fg(Color::DarkGray)));
    } else {
        for row in &view.history {
            let color = if row.signed_amount.starts_with('+') {
                Color::Green
            } else {
                Color::Red
            };
            rows.push(Line::styled(
                format!("{:<5} {}", row.label, row.signed_amount),
                Style::default().fg(color),
            ));
        }
    }
    let history = Paragraph::new(rows)
        .block(Block::default().borders(Borders::ALL).title("History"));
    f.render_widget(history, lower[1]);
}

fn draw_help(f: &mut Frame, area: Rect, view: &GameView) {
    let text = if view.can_choose {
        "1/2/3 pick cup | ←/→ move, Enter pick | q/Esc quit"
    } else {
        "digits type bet | Backspace edit | Enter place bet | q/Esc quit"
    };
    let help = Paragraph::new(text).block(Block::default().borders(Borders::ALL).title("Help"));
    f.render_widget(help, area);
}

fn draw_modals(f: &mut Frame, state: &UiState) {
    match &state.mode {
        Mode::QuitModal => {
            let area = centered_rect(40, 20, f.area());
            let block = Block::default().borders(Borders::ALL).title("Confirm Quit");
            let p = Paragraph::new("Quit the game? (Y/N)");
            f.render_widget(Clear, area);
            f.render_widget(block.clone(), area);
            f.render_widget(p, block.inner(area));
        }
        Mode::Normal => {}
    }
}

fn centered_rect(w_percent: u16, h_percent: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - h_percent) / 2),
            Constraint::Percentage(h_percent),
            Constraint::Percentage((100 - h_percent) / 2),
        ])
        .split(r);

    let vertical = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - w_percent) / 2),
            Constraint::Percentage(w_percent),
            Constraint::Percentage((100 - w_percent) / 2),
        ])
        .split(popup_layout[1]);

    vertical[1]
}
