//! Interactive terminal front end.

use std::io::stdout;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Terminal;
use tracing::info;

use crate::controls::Marker;
use crate::error::Result;
use crate::highlight::{EdgeRole, NodeId};
use crate::narration::Tone;
use crate::steps::{Phase, LAST_STEP, STEPS};
use crate::text::{HEADING, SUBHEADING};
use crate::walkthrough::{Command, NodeView, Snapshot, Walkthrough};

const INPUT_POLL: Duration = Duration::from_millis(100);

const CYAN: Color = Color::Rgb(0x22, 0xd3, 0xee);
const PURPLE: Color = Color::Rgb(0xa7, 0x8b, 0xfa);
const PINK: Color = Color::Rgb(0xf4, 0x72, 0xb6);
const GREEN: Color = Color::Rgb(0x34, 0xd3, 0x99);
const ORANGE: Color = Color::Rgb(0xfb, 0x92, 0x3c);
const RED: Color = Color::Rgb(0xef, 0x44, 0x44);
const INDIGO: Color = Color::Rgb(0x63, 0x66, 0xf1);
const YELLOW: Color = Color::Rgb(0xfb, 0xbf, 0x24);
const TEXT: Color = Color::Rgb(0xe2, 0xe8, 0xf0);
const MUTED: Color = Color::Rgb(0x94, 0xa3, 0xb8);
const DIM: Color = Color::Rgb(0x47, 0x55, 0x69);
const BORDER: Color = Color::Rgb(0x1e, 0x29, 0x3b);

/// What a key or click asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    Apply(Command),
}

pub fn action_for_key(key: KeyEvent) -> Option<Action> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    let action = match key.code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Action::Quit,
        KeyCode::Char('r') => Action::Apply(Command::Reset),
        KeyCode::Left | KeyCode::Char('h') => Action::Apply(Command::Back),
        KeyCode::Right | KeyCode::Char('l') => Action::Apply(Command::Forward),
        KeyCode::Char(' ') | KeyCode::Char('p') => Action::Apply(Command::TogglePlay),
        KeyCode::Char(c @ '1'..='9') => Action::Apply(Command::JumpTo(c as usize - '1' as usize)),
        _ => return None,
    };
    Some(action)
}

/// Maps a left click on the progress strip to the marker under it.
pub fn action_for_click(mouse: MouseEvent, strip: Rect) -> Option<Action> {
    if mouse.kind != MouseEventKind::Down(MouseButton::Left) || strip.width == 0 {
        return None;
    }
    let inside = mouse.row == strip.y && mouse.column >= strip.x && mouse.column < strip.x + strip.width;
    if !inside {
        return None;
    }
    let offset = usize::from(mouse.column - strip.x);
    let index = (offset / marker_cell(strip.width)).min(LAST_STEP);
    Some(Action::Apply(Command::JumpTo(index)))
}

/// Columns per progress marker. Drawing and click mapping both use this.
fn marker_cell(width: u16) -> usize {
    (usize::from(width) / STEPS.len()).max(1)
}

pub fn run(mut walkthrough: Walkthrough) -> Result<()> {
    enable_raw_mode()?;
    info!(delay = ?walkthrough.autoplay_delay(), "walkthrough started");

    let result = guarded(enter_screen, || run_inner(&mut walkthrough), restore_screen);
    walkthrough.teardown();
    info!("walkthrough closed");

    result
}

/// Runs `body` after `enter`, and `restore` no matter which of them failed.
fn guarded<T>(
    enter: impl FnOnce() -> Result<()>,
    body: impl FnOnce() -> Result<T>,
    restore: impl FnOnce(),
) -> Result<T> {
    let result = enter().and_then(|()| body());
    restore();
    result
}

fn enter_screen() -> Result<()> {
    stdout().execute(EnterAlternateScreen)?;
    stdout().execute(EnableMouseCapture)?;
    Ok(())
}

fn restore_screen() {
    let _ = stdout().execute(DisableMouseCapture);
    let _ = disable_raw_mode();
    let _ = stdout().execute(LeaveAlternateScreen);
}

fn run_inner(walkthrough: &mut Walkthrough) -> Result<()> {
    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;
    let mut strip = Rect::default();

    loop {
        terminal.draw(|f| strip = draw_ui(f, walkthrough.snapshot()))?;

        let timeout = walkthrough
            .next_deadline()
            .map(|d| d.saturating_duration_since(Instant::now()).min(INPUT_POLL))
            .unwrap_or(INPUT_POLL);

        if event::poll(timeout)? {
            let action = match event::read()? {
                Event::Key(key) => action_for_key(key),
                Event::Mouse(mouse) => action_for_click(mouse, strip),
                _ => None,
            };
            match action {
                Some(Action::Quit) => break,
                Some(Action::Apply(command)) => {
                    walkthrough.apply(command, Instant::now());
                }
                None => {}
            }
        }
        walkthrough.poll(Instant::now());
    }

    Ok(())
}

fn node_color(id: NodeId) -> Color {
    match id {
        NodeId::Ai => CYAN,
        NodeId::Wij => INDIGO,
        NodeId::Zj => PURPLE,
        NodeId::Aj => GREEN,
        NodeId::L => RED,
    }
}

fn tone_color(tone: Tone) -> Color {
    match tone {
        Tone::Input | Tone::DzDw => CYAN,
        Tone::Weight | Tone::Gradient => INDIGO,
        Tone::Muted => DIM,
        Tone::Target => PINK,
        Tone::WeightedSum => PURPLE,
        Tone::Activation | Tone::Update => GREEN,
        Tone::Loss => RED,
        Tone::DlDa => ORANGE,
        Tone::DaDz => YELLOW,
    }
}

fn edge_style(role: EdgeRole) -> Style {
    match role {
        EdgeRole::Forward => Style::default().fg(GREEN).add_modifier(Modifier::BOLD),
        EdgeRole::Backward => Style::default().fg(ORANGE).add_modifier(Modifier::BOLD),
        EdgeRole::Neutral => Style::default().fg(MUTED),
        EdgeRole::Dim => Style::default().fg(BORDER),
    }
}

fn node_span(node: &NodeView) -> Span<'static> {
    let style = if node.active {
        Style::default()
            .fg(node_color(node.id))
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DIM)
    };
    Span::styled(format!("( {} {} )", node.label, node.value), style)
}

// Horizontal connector, arrowhead pointing the way values flow.
fn edge_span(snapshot: &Snapshot, index: usize) -> Span<'static> {
    let role = snapshot.graph.edge_role(index);
    let label = snapshot.graph.edge_label(index).unwrap_or("");
    let text = match role {
        EdgeRole::Backward => format!(" ◀──{label}── "),
        _ => format!(" ──{label}──▶ "),
    };
    Span::styled(text, edge_style(role))
}

fn graph_lines(snapshot: &Snapshot) -> Vec<Line<'static>> {
    let nodes = &snapshot.nodes;
    let ai = node_span(&nodes[0]);
    // indent the weight node so it sits over z_j
    let indent = ai.content.chars().count() + 4;
    let w_role = snapshot.graph.edge_role(1);
    let w_arrow = if w_role == EdgeRole::Backward { "▲" } else { "▼" };

    let mut lines = vec![
        Line::from(vec![Span::raw(" ".repeat(indent)), node_span(&nodes[1])]),
        Line::from(vec![
            Span::raw(" ".repeat(indent + 4)),
            Span::styled(w_arrow, edge_style(w_role)),
        ]),
        Line::from(vec![
            ai,
            edge_span(snapshot, 0),
            node_span(&nodes[2]),
            edge_span(snapshot, 2),
            node_span(&nodes[3]),
            edge_span(snapshot, 3),
            node_span(&nodes[4]),
        ]),
        Line::default(),
    ];
    if let Some(banner) = snapshot.banner {
        let color = if snapshot.step.phase() == Phase::Forward {
            GREEN
        } else {
            ORANGE
        };
        lines.push(Line::styled(banner, Style::default().fg(color)));
    }
    lines
}

fn narration_lines(snapshot: &Snapshot) -> Vec<Line<'static>> {
    let n = &snapshot.narration;
    let accent = tone_color(n.tone);
    let mut lines = vec![Line::styled(n.lead.clone(), Style::default().fg(MUTED)), Line::default()];
    if let Some(formula) = &n.formula {
        lines.push(Line::styled(format!("  {formula}"), Style::default().fg(MUTED)));
    }
    if let Some(computation) = &n.computation {
        lines.push(Line::styled(
            format!("  {computation}"),
            Style::default().fg(accent).add_modifier(Modifier::BOLD),
        ));
    }
    if !n.figures.is_empty() {
        let mut spans = vec![Span::raw("  ")];
        for figure in &n.figures {
            spans.push(Span::styled(format!("{} ", figure.label), Style::default().fg(DIM)));
            spans.push(Span::styled(
                format!("[{}]   ", figure.value),
                Style::default()
                    .fg(tone_color(figure.tone))
                    .add_modifier(Modifier::BOLD),
            ));
        }
        lines.push(Line::from(spans));
    }
    lines.push(Line::default());
    lines.push(Line::styled(n.note.clone(), Style::default().fg(DIM)));
    lines
}

fn controls_line(snapshot: &Snapshot) -> Line<'static> {
    let c = &snapshot.controls;
    let button = |text: &str, key: &str, enabled: bool, color: Color| {
        let style = if enabled {
            Style::default().fg(Color::White).bg(color)
        } else {
            Style::default().fg(DIM).bg(BORDER)
        };
        Span::styled(format!(" {text} ({key}) "), style)
    };
    let play_color = if snapshot.state.is_playing {
        Color::Rgb(0xdc, 0x26, 0x26)
    } else {
        Color::Rgb(0x05, 0x96, 0x69)
    };
    Line::from(vec![
        button("↺ Reset", "r", true, Color::Rgb(0x33, 0x41, 0x55)),
        Span::raw("  "),
        button("← Back", "←", c.back_enabled, DIM),
        Span::raw("  "),
        button(c.play.text(), "space", true, play_color),
        Span::raw("  "),
        button("Next →", "→", c.next_enabled, Color::Rgb(0x4f, 0x46, 0xe5)),
    ])
}

fn progress_line(snapshot: &Snapshot, width: u16) -> Line<'static> {
    let cell = marker_cell(width);
    let spans = snapshot
        .progress
        .iter()
        .map(|marker| {
            let color = match marker {
                Marker::Pending => BORDER,
                Marker::Visited => GREEN,
                Marker::Current => TEXT,
                Marker::Backward => ORANGE,
                Marker::Update => GREEN,
            };
            let bar = "━".repeat(cell.saturating_sub(1));
            Span::styled(format!("{bar} "), Style::default().fg(color))
        })
        .collect::<Vec<_>>();
    Line::from(spans)
}

/// Draws one frame. Returns where the progress strip landed, for clicks.
fn draw_ui(f: &mut ratatui::Frame<'_>, snapshot: &Snapshot) -> Rect {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Header
            Constraint::Length(8), // Graph
            Constraint::Min(10),   // Narration
            Constraint::Length(1), // Controls
            Constraint::Length(1), // Progress
            Constraint::Length(3), // Summary
            Constraint::Length(1), // Status bar
        ])
        .split(f.area());

    let header = Paragraph::new(vec![
        Line::styled(
            HEADING,
            Style::default().fg(ORANGE).add_modifier(Modifier::BOLD),
        ),
        Line::styled(SUBHEADING, Style::default().fg(MUTED)),
    ])
    .alignment(Alignment::Center);
    f.render_widget(header, chunks[0]);

    let graph = Paragraph::new(graph_lines(snapshot))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(BORDER)),
        );
    f.render_widget(graph, chunks[1]);

    let title_color = match snapshot.step.phase() {
        Phase::Backward => ORANGE,
        Phase::Update => GREEN,
        _ => TEXT,
    };
    let narration = Paragraph::new(narration_lines(snapshot))
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .title(Span::styled(
                    format!(" {} ", snapshot.step.title),
                    Style::default().fg(title_color).add_modifier(Modifier::BOLD),
                ))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(BORDER)),
        );
    f.render_widget(narration, chunks[2]);

    f.render_widget(
        Paragraph::new(controls_line(snapshot)).alignment(Alignment::Center),
        chunks[3],
    );

    let strip = chunks[4];
    f.render_widget(Paragraph::new(progress_line(snapshot, strip.width)), strip);

    let summary = Paragraph::new(Line::styled(
        snapshot.summary.clone(),
        Style::default().fg(MUTED),
    ))
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(BORDER)),
    );
    f.render_widget(summary, chunks[5]);

    let status = Paragraph::new(" ←/→: step | space: play/pause | 1-9: jump | r: reset | q: quit ")
        .style(Style::default().fg(Color::Black).bg(CYAN));
    f.render_widget(status, chunks[6]);

    strip
}
