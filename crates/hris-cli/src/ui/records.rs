//! Attendance and leave tabs.

use hris_core::leave::{LeaveRow, LeaveStatus};
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
};

use super::{clock, dim, highlight, label};
use crate::app::App;

fn pane(title: String) -> Block<'static> {
  Block::default().title(title).borders(Borders::ALL).border_style(dim())
}

fn selection(len: usize, cursor: usize) -> TableState {
  TableState::default().with_selected((len > 0).then_some(cursor))
}

// ─── Attendance ───────────────────────────────────────────────────────────────

pub fn draw_attendance(f: &mut Frame, area: Rect, app: &App) {
  let title = if app.is_admin() {
    format!(" Attendance, everyone ({}) ", app.attendance.len())
  } else {
    format!(" My attendance ({}) ", app.attendance.len())
  };

  let rows: Vec<Row> = app
    .attendance
    .iter()
    .map(|row| {
      let r = &row.record;
      let hours = r.hours_worked().map(|h| format!("{h:.2}")).unwrap_or_else(|| "-".into());
      Row::new(vec![
        Cell::from(r.date.to_string()),
        Cell::from(row.employee_name.clone()),
        Cell::from(clock(r.check_in)),
        Cell::from(clock(r.check_out)),
        Cell::from(hours),
      ])
    })
    .collect();

  let table = Table::new(rows, [
    Constraint::Length(12),
    Constraint::Min(16),
    Constraint::Length(8),
    Constraint::Length(8),
    Constraint::Length(7),
  ])
  .header(Row::new(["Date", "Employee", "In", "Out", "Hours"]).style(label()))
  .row_highlight_style(highlight())
  .block(pane(title));

  let mut state = selection(app.attendance.len(), app.cursor);
  f.render_stateful_widget(table, area, &mut state);
}

// ─── Leaves ───────────────────────────────────────────────────────────────────

fn status_style(status: LeaveStatus) -> Style {
  match status {
    LeaveStatus::Pending => Style::default().fg(Color::Yellow),
    LeaveStatus::Approved => Style::default().fg(Color::Green),
    LeaveStatus::Rejected => Style::default().fg(Color::Red),
  }
}

pub fn draw_leaves(f: &mut Frame, area: Rect, app: &App) {
  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
    .split(area);

  let rows: Vec<Row> = app
    .leaves
    .iter()
    .map(|row| {
      let r = &row.request;
      Row::new(vec![
        Cell::from(row.employee_name.clone()),
        Cell::from(r.leave_type.as_str()),
        Cell::from(format!("{} .. {}", r.start_date, r.end_date)),
        Cell::from(Span::styled(r.status.as_str(), status_style(r.status))),
      ])
    })
    .collect();

  let table = Table::new(rows, [
    Constraint::Min(14),
    Constraint::Length(9),
    Constraint::Length(24),
    Constraint::Length(9),
  ])
  .header(Row::new(["Employee", "Type", "Dates", "Status"]).style(label()))
  .row_highlight_style(highlight())
  .block(pane(format!(" Leave requests ({}) ", app.leaves.len())));

  let mut state = selection(app.leaves.len(), app.cursor);
  f.render_stateful_widget(table, cols[0], &mut state);

  draw_leave_detail(f, cols[1], app.cursor_leave());
}

fn draw_leave_detail(f: &mut Frame, area: Rect, row: Option<&LeaveRow>) {
  let block = pane(" Detail ".into());
  let Some(row) = row else {
    let hint = Paragraph::new("No leave requests. Press n to add one.").style(dim());
    f.render_widget(hint.block(block), area);
    return;
  };

  let r = &row.request;
  let field = |name: &str, value: String| {
    Line::from(vec![Span::styled(format!("{name:<10}"), label()), Span::raw(value)])
  };
  let mut lines = vec![
    field("Employee", row.employee_name.clone()),
    field("Type", r.leave_type.to_string()),
    field("Dates", format!("{} .. {} ({} days)", r.start_date, r.end_date, r.days())),
    Line::from(vec![
      Span::styled(format!("{:<10}", "Status"), label()),
      Span::styled(r.status.as_str(), status_style(r.status)),
    ]),
    field("Reason", r.reason.clone()),
  ];
  if let Some(at) = r.reviewed_at {
    let local = at.with_timezone(&chrono::Local);
    lines.push(field("Reviewed", local.format("%Y-%m-%d %H:%M").to_string()));
  }
  if let Some(notes) = &r.review_notes {
    lines.push(field("Notes", notes.clone()));
  }

  f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }).block(block), area);
}
