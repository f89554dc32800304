//! Dashboard tab: today's status, headline counts and the activity feed.

use hris_core::attendance::TodayStatus;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, Paragraph},
};

use super::{clock, dim, label};
use crate::app::App;

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([Constraint::Length(7), Constraint::Min(0)])
    .split(area);
  let top = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
    .split(rows[0]);

  draw_today(f, top[0], app);
  draw_stats(f, top[1], app);
  draw_activity(f, rows[1], app);
}

fn pane(title: &str) -> Block<'_> {
  Block::default().title(format!(" {title} ")).borders(Borders::ALL).border_style(dim())
}

fn draw_today(f: &mut Frame, area: Rect, app: &App) {
  let (state, color, detail) = match app.today {
    TodayStatus::Absent => ("Not checked in", Color::Yellow, "Press i to check in".to_owned()),
    TodayStatus::CheckedIn { at } => {
      ("Checked in", Color::Green, format!("since {}", clock(Some(at))))
    }
    TodayStatus::Completed { check_in, check_out } => (
      "Done for today",
      Color::Cyan,
      format!("{} - {}", clock(Some(check_in)), clock(Some(check_out))),
    ),
  };

  let lines = vec![
    Line::from(Span::styled(state, Style::default().fg(color))),
    Line::from(Span::styled(detail, dim())),
  ];
  f.render_widget(Paragraph::new(lines).block(pane("Today")), area);
}

fn draw_stats(f: &mut Frame, area: Rect, app: &App) {
  let Some(dashboard) = &app.dashboard else {
    f.render_widget(Paragraph::new("Loading…").style(dim()).block(pane("Overview")), area);
    return;
  };
  let stats = dashboard.stats;
  let row = |name: &str, value: u64| {
    Line::from(vec![Span::styled(format!("{name:<20}"), label()), Span::raw(value.to_string())])
  };
  let lines = vec![
    row("Employees", stats.total_employees),
    row("Pending leaves", stats.pending_leaves),
    row("Attendance today", stats.today_attendance),
  ];
  f.render_widget(Paragraph::new(lines).block(pane("Overview")), area);
}

fn draw_activity(f: &mut Frame, area: Rect, app: &App) {
  let entries = app.dashboard.as_ref().map(|d| d.recent_activity.as_slice()).unwrap_or_default();
  if entries.is_empty() {
    f.render_widget(Paragraph::new("No activity yet.").style(dim()).block(pane("Activity")), area);
    return;
  }

  let items: Vec<ListItem> = entries
    .iter()
    .map(|row| {
      let when = row.entry.created_at.with_timezone(&chrono::Local).format("%m-%d %H:%M");
      ListItem::new(Line::from(vec![
        Span::styled(format!("{when}  "), dim()),
        Span::styled(format!("{:<12}", row.entry.action.as_str()), label()),
        Span::raw(format!("{}  ", row.actor_name)),
        Span::raw(row.entry.description.clone()),
      ]))
    })
    .collect();
  f.render_widget(List::new(items).block(pane("Activity")), area);
}
