//! Employee directory and the signed-in profile.

use hris_core::identity::{Profile, Role};
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use super::{dim, highlight, label};
use crate::app::App;

fn pane(title: String) -> Block<'static> {
  Block::default().title(title).borders(Borders::ALL).border_style(dim())
}

fn profile_lines(profile: &Profile, role: Role) -> Vec<Line<'static>> {
  let field = |name: &str, value: Option<String>| {
    Line::from(vec![
      Span::styled(format!("{name:<12}"), label()),
      match value {
        Some(v) if !v.is_empty() => Span::raw(v),
        _ => Span::styled("-", dim()),
      },
    ])
  };
  vec![
    field("Name", Some(profile.name.clone())),
    field("Email", Some(profile.email.clone())),
    field("Position", profile.position.clone()),
    field("Department", profile.department.clone()),
    field("Hired", profile.hire_date.map(|d| d.to_string())),
    field("Role", Some(role.as_str().to_owned())),
  ]
}

// ─── Directory ────────────────────────────────────────────────────────────────

pub fn draw_directory(f: &mut Frame, area: Rect, app: &App) {
  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
    .split(area);

  let filtered = app.filtered_employees();
  let title = if app.filter_active || !app.filter.is_empty() {
    format!(" Employees ({}/{}) ", filtered.len(), app.employees.len())
  } else {
    format!(" Employees ({}) ", app.employees.len())
  };

  let block = pane(title);
  let mut list_area = block.inner(cols[0]);
  f.render_widget(block, cols[0]);

  if (app.filter_active || !app.filter.is_empty()) && list_area.height > 2 {
    let filter_area = Rect { y: list_area.y + list_area.height - 1, height: 1, ..list_area };
    list_area.height -= 1;
    let text =
      if app.filter_active { format!("/{}_", app.filter) } else { format!("/{}", app.filter) };
    f.render_widget(Paragraph::new(text).style(Style::default().fg(Color::Yellow)), filter_area);
  }

  let items: Vec<ListItem> = filtered
    .iter()
    .map(|e| {
      let badge = if e.role.is_admin() { " *" } else { "" };
      ListItem::new(Line::from(vec![
        Span::raw(e.profile.name.clone()),
        Span::styled(badge, Style::default().fg(Color::Yellow)),
      ]))
    })
    .collect();

  let mut state = ListState::default();
  state.select((!filtered.is_empty()).then_some(app.cursor));
  f.render_stateful_widget(List::new(items).highlight_style(highlight()), list_area, &mut state);

  let detail = pane(" Detail ".into());
  let body = match app.cursor_employee() {
    Some(entry) => Paragraph::new(profile_lines(&entry.profile, entry.role)),
    None => Paragraph::new("No matching employees.").style(dim()),
  };
  f.render_widget(body.block(detail), cols[1]);
}

// ─── Profile ──────────────────────────────────────────────────────────────────

pub fn draw_profile(f: &mut Frame, area: Rect, app: &App) {
  let lines = profile_lines(&app.account.profile, app.account.role);
  f.render_widget(Paragraph::new(lines).block(pane(" My profile ".into())), area);
}
