//! TUI rendering — orchestrates all panes.

pub mod overview;
pub mod people;
pub mod records;

use chrono::{DateTime, Local, Utc};
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Paragraph},
};

use crate::app::{App, Tab};

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw(f: &mut Frame, app: &App) {
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Min(0),    // body
      Constraint::Length(1), // status bar
    ])
    .split(f.area());

  draw_header(f, rows[0], app);
  match app.tab {
    Tab::Dashboard => overview::draw(f, rows[1], app),
    Tab::Attendance => records::draw_attendance(f, rows[1], app),
    Tab::Leaves => records::draw_leaves(f, rows[1], app),
    Tab::Employees => people::draw_directory(f, rows[1], app),
    Tab::Profile => people::draw_profile(f, rows[1], app),
  }
  draw_status(f, rows[2], app);
}

pub(crate) fn dim() -> Style { Style::default().fg(Color::DarkGray) }

pub(crate) fn label() -> Style { Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD) }

/// Local wall-clock time of an instant, or a dash.
pub(crate) fn clock(at: Option<DateTime<Utc>>) -> String {
  at.map(|t| t.with_timezone(&Local).format("%H:%M").to_string()).unwrap_or_else(|| "-".into())
}

pub(crate) fn highlight() -> Style {
  Style::default().bg(Color::Blue).fg(Color::White).add_modifier(Modifier::BOLD)
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
  let mut spans = vec![Span::styled(
    " hris ",
    Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
  )];
  for (i, tab) in Tab::ALL.iter().enumerate() {
    let style = if *tab == app.tab {
      Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
      Style::default().fg(Color::Gray)
    };
    spans.push(Span::styled(format!(" {} {} ", i + 1, tab.title()), style));
  }

  let right = format!(
    "{} ({})  {} ",
    app.account.profile.name,
    app.account.role.as_str(),
    Local::now().format("%Y-%m-%d")
  );
  let used: usize = spans.iter().map(|s| s.content.chars().count()).sum();
  let pad = (area.width as usize).saturating_sub(used + right.chars().count());
  spans.push(Span::raw(" ".repeat(pad)));
  spans.push(Span::styled(right, Style::default().fg(Color::Gray)));

  let block = Block::default().style(Style::default().bg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(Paragraph::new(Line::from(spans)), inner);
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn hints(app: &App) -> &'static str {
  match app.tab {
    Tab::Dashboard => "i check in  o check out  r refresh  Tab switch  q quit",
    Tab::Attendance => "↑↓/jk navigate  i check in  o check out  r refresh  q quit",
    Tab::Leaves if app.is_admin() => "↑↓/jk navigate  n request  a approve  x reject  q quit",
    Tab::Leaves => "↑↓/jk navigate  n request leave  r refresh  q quit",
    Tab::Employees if app.is_admin() => "/ search  i/o mark selected in/out  r refresh  q quit",
    Tab::Employees => "↑↓/jk navigate  / search  r refresh  q quit",
    Tab::Profile => "n name  p position  d department  r refresh  q quit",
  }
}

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
  let (mode, text, style) = if let Some(prompt) = app.prompt {
    ("INPUT", format!("{}: {}_", prompt.label(), app.input), Style::default().fg(Color::Yellow))
  } else if app.filter_active {
    ("SEARCH", "Type to filter  Esc cancel  Enter keep".to_owned(), dim())
  } else if !app.status_msg.is_empty() {
    let style = if app.status_is_error { Style::default().fg(Color::Red) } else { dim() };
    ("NORMAL", app.status_msg.clone(), style)
  } else {
    ("NORMAL", hints(app).to_owned(), dim())
  };

  let line = Line::from(vec![
    Span::styled(
      format!(" {mode} "),
      Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD),
    ),
    Span::styled(format!("  {text}"), style),
  ]);
  f.render_widget(Paragraph::new(line).style(Style::default().bg(Color::Black)), area);
}
