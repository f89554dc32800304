//! Dashboard — read-only counts and the recent-activity feed.

use serde::{Deserialize, Serialize};

use crate::{
  Hris, Result,
  activity::{ActivityRow, RECENT_ACTIVITY_LIMIT},
  leave::LeaveStatus,
  store::HrStore,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DashboardStats {
  pub total_employees:  u64,
  pub pending_leaves:   u64,
  pub today_attendance: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dashboard {
  pub stats:           DashboardStats,
  pub recent_activity: Vec<ActivityRow>,
}

pub struct DashboardView<'a, S> {
  hris: &'a Hris<S>,
}

impl<'a, S: HrStore> DashboardView<'a, S> {
  pub(crate) fn new(hris: &'a Hris<S>) -> Self { Self { hris } }

  pub async fn summary(&self) -> Result<Dashboard> {
    let store = &self.hris.store;
    let today = self.hris.clock.today();

    let total_employees = self.hris.call("count_profiles", store.count_profiles()).await?;
    let pending_leaves = self
      .hris
      .call("count_leaves", store.count_leaves(Some(LeaveStatus::Pending)))
      .await?;
    let today_attendance = self.hris.call("count_attendance", store.count_attendance(today)).await?;
    let recent_activity = self
      .hris
      .call("recent_activity", store.recent_activity(RECENT_ACTIVITY_LIMIT))
      .await?;

    Ok(Dashboard {
      stats: DashboardStats { total_employees, pending_leaves, today_attendance },
      recent_activity,
    })
  }
}
