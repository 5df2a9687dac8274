use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use std::time::SystemTime;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Terminal;

use deepview_core::config::ViewConfig;
use deepview_core::todos::group_todos;
use deepview_core::todos::TodoItem;
use deepview_core::Transcript;
use deepview_core::TranscriptView;

use crate::render::build_todo_lines;
use crate::render::build_turn_lines;
use crate::render::RenderOptions;
use crate::render::UiPalette;

const PAGE: u16 = 10;

struct TuiGuard;

impl Drop for TuiGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, crossterm::cursor::Show);
    }
}

pub fn run(path: PathBuf, config: &ViewConfig) -> anyhow::Result<()> {
    let mut state = ViewerState::new(path);
    state.reload();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, crossterm::cursor::Hide)?;
    let _guard = TuiGuard;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let options = RenderOptions {
        show_tool_args: config.show_tool_args,
    };
    let poll = Duration::from_millis(config.poll_interval_ms.max(16));
    run_app(&mut terminal, &mut state, options, poll)?;
    Ok(())
}

struct ViewerState {
    path: PathBuf,
    view: TranscriptView,
    todos: Vec<TodoItem>,
    last_mod: Option<SystemTime>,
    scroll: u16,
    follow: bool,
    status: Option<String>,
}

impl ViewerState {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            view: TranscriptView::default(),
            todos: Vec::new(),
            last_mod: None,
            scroll: 0,
            follow: true,
            status: None,
        }
    }

    fn modified(&self) -> Option<SystemTime> {
        fs::metadata(&self.path).and_then(|m| m.modified()).ok()
    }

    /// A snapshot that fails to load keeps the previous view on screen.
    fn reload(&mut self) {
        let modified = self.modified();
        match Transcript::load(&self.path) {
            Ok(transcript) => {
                self.view = TranscriptView::build(&transcript);
                self.todos = transcript.todos;
                self.status = None;
                tracing::debug!(turns = self.view.turns.len(), "transcript reloaded");
            }
            Err(err) => {
                self.status = Some(format!("reload failed: {err}"));
                tracing::debug!(error = %err, "transcript reload failed");
            }
        }
        self.last_mod = modified;
    }

    fn reload_if_changed(&mut self) {
        let modified = self.modified();
        if modified.is_some() && modified != self.last_mod {
            self.reload();
        }
    }

    fn scroll_by(&mut self, delta: i32, max: u16) {
        let next = (i32::from(self.scroll) + delta).clamp(0, i32::from(max));
        self.scroll = u16::try_from(next).unwrap_or(max);
        self.follow = self.scroll == max;
    }
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    state: &mut ViewerState,
    options: RenderOptions,
    poll: Duration,
) -> io::Result<()> {
    let palette = UiPalette::default();
    loop {
        state.reload_if_changed();

        let lines = build_turn_lines(&state.view, options, palette);
        let height = terminal.size()?.height.saturating_sub(4);
        let max_scroll = u16::try_from(lines.len())
            .unwrap_or(u16::MAX)
            .saturating_sub(height);
        if state.follow || state.scroll > max_scroll {
            state.scroll = max_scroll;
        }

        terminal.draw(|f| ui(f, state, lines, palette))?;

        if !event::poll(poll)? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return Ok(()),
            KeyCode::Char('j') | KeyCode::Down => state.scroll_by(1, max_scroll),
            KeyCode::Char('k') | KeyCode::Up => state.scroll_by(-1, max_scroll),
            KeyCode::PageDown => state.scroll_by(i32::from(PAGE), max_scroll),
            KeyCode::PageUp => state.scroll_by(-i32::from(PAGE), max_scroll),
            KeyCode::Char('g') | KeyCode::Home => state.scroll_by(-i32::from(max_scroll), max_scroll),
            KeyCode::Char('G') | KeyCode::End => state.scroll_by(i32::from(max_scroll), max_scroll),
            KeyCode::Char('r') => state.reload(),
            _ => {}
        }
    }
}

fn header_line(state: &ViewerState, palette: UiPalette) -> Line<'static> {
    let mut spans = vec![
        Span::styled(
            "deepview ".to_string(),
            Style::default().fg(palette.accent).add_modifier(Modifier::BOLD),
        ),
        Span::raw(state.path.display().to_string()),
        Span::styled(
            format!("  {} turns", state.view.turns.len()),
            Style::default().fg(palette.muted),
        ),
    ];
    if state.view.interrupted {
        spans.push(Span::styled(
            "  awaiting review".to_string(),
            Style::default()
                .fg(palette.warning)
                .add_modifier(Modifier::BOLD),
        ));
    }
    Line::from(spans)
}

fn footer_line(state: &ViewerState, palette: UiPalette) -> Line<'static> {
    match &state.status {
        Some(status) => Line::from(Span::styled(
            status.clone(),
            Style::default().fg(palette.danger),
        )),
        None => Line::from(Span::styled(
            "j/k scroll  g/G top/bottom  r reload  q quit".to_string(),
            Style::default().fg(palette.muted),
        )),
    }
}

fn ui(f: &mut ratatui::Frame, state: &ViewerState, lines: Vec<Line<'static>>, palette: UiPalette) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(f.area());

    f.render_widget(Paragraph::new(header_line(state, palette)), rows[0]);

    let groups = group_todos(&state.todos);
    let todo_lines = build_todo_lines(&groups, palette);
    let body = if todo_lines.is_empty() {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(100)])
            .split(rows[1])
    } else {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
            .split(rows[1])
    };

    let border = Style::default().fg(palette.border);
    let transcript = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border)
                .title(" Transcript "),
        )
        .wrap(Wrap { trim: false })
        .scroll((state.scroll, 0));
    f.render_widget(transcript, body[0]);

    if !todo_lines.is_empty() {
        let todos = Paragraph::new(todo_lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(border)
                    .title(" Todos "),
            )
            .wrap(Wrap { trim: false });
        f.render_widget(todos, body[1]);
    }

    f.render_widget(Paragraph::new(footer_line(state, palette)), rows[2]);
}
