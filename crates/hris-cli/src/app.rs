//! Application state machine and event dispatcher.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use hris_core::{
  attendance::{AttendanceRecord, AttendanceRow, TodayStatus},
  dashboard::Dashboard,
  identity::{Account, EmployeeEntry, ProfileUpdate},
  leave::{Decision, LeaveRow},
};
use uuid::Uuid;

use crate::{
  client::{ApiClient, ClientError},
  reconcile,
};

// ─── Tabs ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
  Dashboard,
  Attendance,
  Leaves,
  Employees,
  Profile,
}

impl Tab {
  pub const ALL: [Tab; 5] =
    [Tab::Dashboard, Tab::Attendance, Tab::Leaves, Tab::Employees, Tab::Profile];

  pub fn title(self) -> &'static str {
    match self {
      Self::Dashboard => "Dashboard",
      Self::Attendance => "Attendance",
      Self::Leaves => "Leaves",
      Self::Employees => "Employees",
      Self::Profile => "Profile",
    }
  }

  fn index(self) -> usize { Self::ALL.iter().position(|t| *t == self).unwrap_or(0) }

  fn next(self) -> Self { Self::ALL[(self.index() + 1) % Self::ALL.len()] }

  fn prev(self) -> Self { Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()] }
}

// ─── Prompt ───────────────────────────────────────────────────────────────────

/// A one-line text prompt shown in the status bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
  NewLeave,
  ReviewNotes(Decision, Uuid),
  EditName,
  EditPosition,
  EditDepartment,
}

impl Prompt {
  pub fn label(self) -> &'static str {
    match self {
      Self::NewLeave => "type start end reason",
      Self::ReviewNotes(Decision::Approve, _) => "approval notes (optional)",
      Self::ReviewNotes(Decision::Reject, _) => "rejection notes (optional)",
      Self::EditName => "name",
      Self::EditPosition => "position (blank clears)",
      Self::EditDepartment => "department (blank clears)",
    }
  }
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App<'a> {
  pub tab: Tab,

  /// The signed-in account.
  pub account: Account,

  pub dashboard:  Option<Dashboard>,
  pub today:      TodayStatus,
  pub attendance: Vec<AttendanceRow>,
  pub leaves:     Vec<LeaveRow>,
  pub employees:  Vec<EmployeeEntry>,

  /// Cursor within the list of the current tab (filtered, on Employees).
  pub cursor: usize,

  /// Fuzzy filter over the employee list.
  pub filter:        String,
  pub filter_active: bool,

  /// Active prompt and what has been typed into it.
  pub prompt: Option<Prompt>,
  pub input:  String,

  /// One-line message shown in the status bar.
  pub status_msg:      String,
  pub status_is_error: bool,

  client: &'a ApiClient,
}

impl<'a> App<'a> {
  pub fn new(client: &'a ApiClient, account: Account) -> Self {
    Self {
      tab: Tab::Dashboard,
      account,
      dashboard: None,
      today: TodayStatus::Absent,
      attendance: Vec::new(),
      leaves: Vec::new(),
      employees: Vec::new(),
      cursor: 0,
      filter: String::new(),
      filter_active: false,
      prompt: None,
      input: String::new(),
      status_msg: String::new(),
      status_is_error: false,
      client,
    }
  }

  pub fn is_admin(&self) -> bool { self.account.role.is_admin() }

  fn notify(&mut self, msg: impl Into<String>) {
    self.status_msg = msg.into();
    self.status_is_error = false;
  }

  fn fail(&mut self, err: &ClientError) {
    tracing::debug!(error = %err, "request failed");
    self.status_msg = err.user_message();
    self.status_is_error = true;
  }

  // ── Data loading ──────────────────────────────────────────────────────────

  /// Fetch every tab's data. Failures land in the status bar.
  pub async fn load_all(&mut self) {
    for tab in Tab::ALL {
      self.refresh(tab).await;
      if self.status_is_error {
        return;
      }
    }
    self.notify(format!("Signed in as {}", self.account.profile.name));
  }

  async fn refresh(&mut self, tab: Tab) {
    let client = self.client;
    let result = match tab {
      Tab::Dashboard => match client.dashboard().await {
        Ok(d) => {
          self.dashboard = Some(d);
          client.today().await.map(|t| self.today = t)
        }
        Err(e) => Err(e),
      },
      Tab::Attendance => client.attendance().await.map(|rows| self.attendance = rows),
      Tab::Leaves => client.leaves().await.map(|rows| self.leaves = rows),
      Tab::Employees => client.employees(None).await.map(|rows| self.employees = rows),
      Tab::Profile => client.me().await.map(|account| self.account = account),
    };
    match result {
      Ok(()) => self.clamp_cursor(),
      Err(e) => self.fail(&e),
    }
  }

  // ── Lists ─────────────────────────────────────────────────────────────────

  pub fn filtered_employees(&self) -> Vec<&EmployeeEntry> {
    reconcile::filter_employees(&self.employees, &self.filter)
  }

  pub fn cursor_employee(&self) -> Option<&EmployeeEntry> {
    self.filtered_employees().get(self.cursor).copied()
  }

  pub fn cursor_leave(&self) -> Option<&LeaveRow> { self.leaves.get(self.cursor) }

  fn list_len(&self) -> usize {
    match self.tab {
      Tab::Attendance => self.attendance.len(),
      Tab::Leaves => self.leaves.len(),
      Tab::Employees => self.filtered_employees().len(),
      Tab::Dashboard | Tab::Profile => 0,
    }
  }

  fn clamp_cursor(&mut self) { self.cursor = self.cursor.min(self.list_len().saturating_sub(1)); }

  async fn switch_to(&mut self, tab: Tab) {
    self.tab = tab;
    self.cursor = 0;
    if tab == Tab::Dashboard {
      self.refresh(tab).await;
    }
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub async fn handle_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return Ok(false);
    }
    self.status_msg.clear();
    self.status_is_error = false;

    if let Some(prompt) = self.prompt {
      self.handle_prompt_key(prompt, key).await;
      return Ok(true);
    }
    if self.filter_active {
      self.handle_filter_key(key);
      return Ok(true);
    }

    match key.code {
      KeyCode::Char('q') => return Ok(false),
      KeyCode::Tab | KeyCode::Right => self.switch_to(self.tab.next()).await,
      KeyCode::BackTab | KeyCode::Left => self.switch_to(self.tab.prev()).await,
      KeyCode::Char(c @ '1'..='5') => {
        let idx = c as usize - '1' as usize;
        self.switch_to(Tab::ALL[idx]).await;
      }
      KeyCode::Char('r') => {
        self.refresh(self.tab).await;
        if !self.status_is_error {
          self.notify("Refreshed");
        }
      }
      KeyCode::Down | KeyCode::Char('j') => {
        if self.cursor + 1 < self.list_len() {
          self.cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => self.cursor = self.cursor.saturating_sub(1),
      _ => self.handle_tab_key(key).await,
    }
    Ok(true)
  }

  async fn handle_tab_key(&mut self, key: KeyEvent) {
    match (self.tab, key.code) {
      (Tab::Dashboard | Tab::Attendance, KeyCode::Char('i')) => self.mark(None, true).await,
      (Tab::Dashboard | Tab::Attendance, KeyCode::Char('o')) => self.mark(None, false).await,

      (Tab::Leaves, KeyCode::Char('n')) => self.open_prompt(Prompt::NewLeave, String::new()),
      (Tab::Leaves, KeyCode::Char('a')) => self.open_review(Decision::Approve),
      (Tab::Leaves, KeyCode::Char('x')) => self.open_review(Decision::Reject),

      (Tab::Employees, KeyCode::Char('/')) => {
        self.filter_active = true;
        self.filter.clear();
        self.cursor = 0;
      }
      (Tab::Employees, KeyCode::Char(c @ ('i' | 'o'))) => {
        if let Some(id) = self.cursor_employee().map(|e| e.profile.id) {
          self.mark(Some(id), c == 'i').await;
        }
      }

      (Tab::Profile, KeyCode::Char('n')) => {
        let name = self.account.profile.name.clone();
        self.open_prompt(Prompt::EditName, name);
      }
      (Tab::Profile, KeyCode::Char('p')) => {
        let current = self.account.profile.position.clone().unwrap_or_default();
        self.open_prompt(Prompt::EditPosition, current);
      }
      (Tab::Profile, KeyCode::Char('d')) => {
        let current = self.account.profile.department.clone().unwrap_or_default();
        self.open_prompt(Prompt::EditDepartment, current);
      }
      _ => {}
    }
  }

  fn handle_filter_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Esc => {
        self.filter_active = false;
        self.filter.clear();
      }
      KeyCode::Enter => self.filter_active = false,
      KeyCode::Backspace => {
        self.filter.pop();
      }
      KeyCode::Char(c) => self.filter.push(c),
      _ => {}
    }
    self.cursor = 0;
  }

  fn open_prompt(&mut self, prompt: Prompt, initial: String) {
    self.prompt = Some(prompt);
    self.input = initial;
  }

  fn open_review(&mut self, decision: Decision) {
    if !self.is_admin() {
      self.status_msg = "Only administrators can do that".into();
      self.status_is_error = true;
      return;
    }
    if let Some(id) = self.cursor_leave().map(|row| row.request.id) {
      self.open_prompt(Prompt::ReviewNotes(decision, id), String::new());
    }
  }

  async fn handle_prompt_key(&mut self, prompt: Prompt, key: KeyEvent) {
    match key.code {
      KeyCode::Esc => {
        self.prompt = None;
        self.input.clear();
      }
      KeyCode::Backspace => {
        self.input.pop();
      }
      KeyCode::Char(c) => self.input.push(c),
      KeyCode::Enter => {
        self.prompt = None;
        let input = std::mem::take(&mut self.input);
        self.submit_prompt(prompt, input).await;
      }
      _ => {}
    }
  }

  // ── Mutations ─────────────────────────────────────────────────────────────

  async fn submit_prompt(&mut self, prompt: Prompt, input: String) {
    match prompt {
      Prompt::NewLeave => self.submit_leave(&input).await,
      Prompt::ReviewNotes(decision, id) => {
        let notes = Some(input.trim().to_owned()).filter(|n| !n.is_empty());
        self.review(id, decision, notes).await;
      }
      Prompt::EditName => {
        self.update_profile(ProfileUpdate { name: Some(input), ..Default::default() }).await
      }
      Prompt::EditPosition => {
        self.update_profile(ProfileUpdate { position: Some(input), ..Default::default() }).await
      }
      Prompt::EditDepartment => {
        self.update_profile(ProfileUpdate { department: Some(input), ..Default::default() }).await
      }
    }
  }

  /// Check `target` (or the signed-in user) in or out.
  async fn mark(&mut self, target: Option<Uuid>, check_in: bool) {
    let result = if check_in {
      self.client.check_in(target).await
    } else {
      self.client.check_out(target).await
    };
    match result {
      Ok(record) => {
        self.notify(if check_in { "Checked in" } else { "Checked out" });
        self.apply_attendance(record);
      }
      Err(e) => self.fail(&e),
    }
  }

  fn apply_attendance(&mut self, record: AttendanceRecord) {
    if record.user_id == self.account.identity.id {
      self.today = record.status();
    }
    let name = self
      .employees
      .iter()
      .find(|e| e.profile.id == record.user_id)
      .map(|e| e.profile.name.clone())
      .unwrap_or_else(|| self.account.profile.name.clone());
    reconcile::upsert_attendance(&mut self.attendance, record, || name);
  }

  async fn submit_leave(&mut self, input: &str) {
    let application = match reconcile::parse_leave(input) {
      Ok(a) => a,
      Err(msg) => {
        self.status_msg = msg;
        self.status_is_error = true;
        return;
      }
    };
    match self.client.submit_leave(&application).await {
      Ok(request) => {
        self.notify(format!("Requested {} days of {} leave", request.days(), request.leave_type));
        let employee_name = self.account.profile.name.clone();
        self.leaves.insert(0, LeaveRow { request, employee_name });
        self.cursor = 0;
      }
      Err(e) => self.fail(&e),
    }
  }

  async fn review(&mut self, id: Uuid, decision: Decision, notes: Option<String>) {
    match self.client.review_leave(id, decision, notes).await {
      Ok(request) => {
        self.notify(format!("Leave request {}", request.status));
        if !reconcile::replace_leave(&mut self.leaves, request) {
          self.refresh(Tab::Leaves).await;
        }
      }
      Err(e) => self.fail(&e),
    }
  }

  async fn update_profile(&mut self, update: ProfileUpdate) {
    let id = self.account.identity.id;
    match self.client.update_profile(id, &update).await {
      Ok(profile) => {
        self.notify("Profile updated");
        reconcile::replace_profile(&mut self.employees, &profile);
        self.account.profile = profile;
      }
      Err(e) => self.fail(&e),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn tabs_wrap_around() {
    assert_eq!(Tab::Dashboard.prev(), Tab::Profile);
    assert_eq!(Tab::Profile.next(), Tab::Dashboard);
    assert_eq!(Tab::Leaves.next(), Tab::Employees);
  }
}
