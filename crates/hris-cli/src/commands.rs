//! One-shot subcommands: call the API once and print the result.

use anyhow::Result;
use chrono::NaiveDate;
use clap::Subcommand;
use hris_core::{
  attendance::{AttendanceRecord, TodayStatus},
  identity::{Profile, ProfileUpdate},
  leave::{Decision, LeaveApplication, LeaveRequest, LeaveType},
};
use uuid::Uuid;

use crate::client::ApiClient;

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Register a new account with the --email and --password given.
  SignUp {
    #[arg(long)]
    name:       String,
    #[arg(long)]
    position:   String,
    #[arg(long)]
    department: String,
  },
  /// Show the signed-in account.
  Whoami,
  /// Headline counts and recent activity.
  Dashboard,
  /// Check in for today.
  CheckIn {
    /// Mark another employee (admins only).
    #[arg(long = "for", value_name = "ID")]
    target: Option<Uuid>,
  },
  /// Check out for today.
  CheckOut {
    #[arg(long = "for", value_name = "ID")]
    target: Option<Uuid>,
  },
  /// Today's attendance status.
  Today,
  /// Attendance history (everyone's, for admins).
  Attendance,
  /// Leave requests.
  #[command(subcommand)]
  Leave(LeaveCommand),
  /// The employee directory.
  Employees {
    #[arg(long)]
    search: Option<String>,
  },
  /// Show or edit your profile.
  Profile {
    #[command(subcommand)]
    action: Option<ProfileCommand>,
  },
  /// Interactive terminal UI (the default).
  Tui,
}

#[derive(Subcommand, Debug)]
pub enum LeaveCommand {
  /// Ask for leave.
  Request {
    #[arg(long = "type")]
    leave_type: LeaveType,
    #[arg(long)]
    start:      NaiveDate,
    #[arg(long)]
    end:        NaiveDate,
    #[arg(long)]
    reason:     String,
  },
  List,
  Approve {
    id:    Uuid,
    #[arg(long)]
    notes: Option<String>,
  },
  Reject {
    id:    Uuid,
    #[arg(long)]
    notes: Option<String>,
  },
}

#[derive(Subcommand, Debug)]
pub enum ProfileCommand {
  Show,
  /// Change name, position or department. An empty value clears the field.
  Update {
    #[arg(long)]
    name:       Option<String>,
    #[arg(long)]
    position:   Option<String>,
    #[arg(long)]
    department: Option<String>,
  },
}

// ─── Output ───────────────────────────────────────────────────────────────────

fn print_profile(p: &Profile) {
  println!("{:<12}{}", "name", p.name);
  println!("{:<12}{}", "email", p.email);
  println!("{:<12}{}", "position", p.position.as_deref().unwrap_or("-"));
  println!("{:<12}{}", "department", p.department.as_deref().unwrap_or("-"));
  if let Some(hired) = p.hire_date {
    println!("{:<12}{hired}", "hired");
  }
}

fn print_record(verb: &str, r: &AttendanceRecord) {
  let at = match verb {
    "checked out" => r.check_out,
    _ => r.check_in,
  };
  let at = at.map(|t| t.format("%H:%M:%S UTC").to_string()).unwrap_or_default();
  println!("{} {verb} on {} at {at}", r.user_id, r.date);
}

fn print_leave(r: &LeaveRequest) {
  println!("{}  {}  {} .. {}  {}", r.id, r.leave_type, r.start_date, r.end_date, r.status);
}

// ─── Dispatch ─────────────────────────────────────────────────────────────────

/// Run `command` against a signed-in client.
pub async fn run(client: &ApiClient, command: Command) -> Result<()> {
  match command {
    Command::SignUp { .. } | Command::Tui => {}

    Command::Whoami => {
      let account = client.me().await?;
      println!("{:<12}{}", "id", account.identity.id);
      println!("{:<12}{}", "role", account.role.as_str());
      print_profile(&account.profile);
    }

    Command::Dashboard => {
      let dashboard = client.dashboard().await?;
      let stats = dashboard.stats;
      println!("employees         {}", stats.total_employees);
      println!("pending leaves    {}", stats.pending_leaves);
      println!("attendance today  {}", stats.today_attendance);
      for row in dashboard.recent_activity {
        println!(
          "{}  {:<11} {}: {}",
          row.entry.created_at.format("%Y-%m-%d %H:%M"),
          row.entry.action.as_str(),
          row.actor_name,
          row.entry.description,
        );
      }
    }

    Command::CheckIn { target } => print_record("checked in", &client.check_in(target).await?),
    Command::CheckOut { target } => print_record("checked out", &client.check_out(target).await?),

    Command::Today => match client.today().await? {
      TodayStatus::Absent => println!("not checked in"),
      TodayStatus::CheckedIn { at } => println!("checked in at {}", at.format("%H:%M UTC")),
      TodayStatus::Completed { check_in, check_out } => println!(
        "checked in at {}, out at {}",
        check_in.format("%H:%M UTC"),
        check_out.format("%H:%M UTC")
      ),
    },

    Command::Attendance => {
      for row in client.attendance().await? {
        let r = &row.record;
        let hours = r.hours_worked().map(|h| format!("{h:.2}h")).unwrap_or_default();
        println!("{}  {:<24} {hours}", r.date, row.employee_name);
      }
    }

    Command::Leave(LeaveCommand::Request { leave_type, start, end, reason }) => {
      let application = LeaveApplication { leave_type, start_date: start, end_date: end, reason };
      application.check()?;
      print_leave(&client.submit_leave(&application).await?);
    }
    Command::Leave(LeaveCommand::List) => {
      for row in client.leaves().await? {
        print!("{:<20} ", row.employee_name);
        print_leave(&row.request);
      }
    }
    Command::Leave(LeaveCommand::Approve { id, notes }) => {
      print_leave(&client.review_leave(id, Decision::Approve, notes).await?)
    }
    Command::Leave(LeaveCommand::Reject { id, notes }) => {
      print_leave(&client.review_leave(id, Decision::Reject, notes).await?)
    }

    Command::Employees { search } => {
      for entry in client.employees(search.as_deref()).await? {
        let p = &entry.profile;
        println!(
          "{}  {:<24} {:<20} {:<16} {}",
          p.id,
          p.name,
          p.position.as_deref().unwrap_or("-"),
          p.department.as_deref().unwrap_or("-"),
          entry.role.as_str(),
        );
      }
    }

    Command::Profile { action: None | Some(ProfileCommand::Show) } => {
      print_profile(&client.me().await?.profile);
    }
    Command::Profile { action: Some(ProfileCommand::Update { name, position, department }) } => {
      let update = ProfileUpdate { name, position, department };
      if update.is_empty() {
        anyhow::bail!("nothing to update; pass --name, --position or --department");
      }
      let id = client.me().await?.identity.id;
      print_profile(&client.update_profile(id, &update).await?);
    }
  }
  Ok(())
}
