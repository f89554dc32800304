//! Employee directory and profile editing.

use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::{
  Error, Hris, Result,
  activity::ActivityAction,
  identity::{Account, EmployeeEntry, Identity, Profile, ProfileUpdate},
  store::HrStore,
};

pub struct DirectoryView<'a, S> {
  hris: &'a Hris<S>,
}

impl<'a, S: HrStore> DirectoryView<'a, S> {
  pub(crate) fn new(hris: &'a Hris<S>) -> Self { Self { hris } }

  /// All employees ordered by name, optionally narrowed by a case-insensitive
  /// search over name, email, department and position.
  pub async fn list_employees(&self, search: Option<&str>) -> Result<Vec<EmployeeEntry>> {
    let mut entries = self
      .hris
      .call("list_profiles", self.hris.store.list_profiles())
      .await?;

    if let Some(needle) = search.map(str::trim).filter(|s| !s.is_empty()) {
      let needle = needle.to_lowercase();
      entries.retain(|e| e.matches(&needle));
    }
    Ok(entries)
  }

  pub async fn get_profile(&self, id: Uuid) -> Result<Profile> {
    self
      .hris
      .call("get_profile", self.hris.store.get_profile(id))
      .await?
      .ok_or(Error::NotFound { entity: "profile", id })
  }

  /// The caller's own profile and role.
  pub async fn account(&self, actor: &Identity) -> Result<Account> {
    let profile = self.get_profile(actor.id).await?;
    let role = self.hris.role_of(actor).await?;
    Ok(Account { identity: actor.clone(), profile, role })
  }

  /// Edit name, position or department. Allowed on one's own profile, or on
  /// anyone's for an admin.
  pub async fn update_profile(
    &self,
    actor: &Identity,
    id: Uuid,
    update: ProfileUpdate,
  ) -> Result<Profile> {
    let update = update.normalized();
    update.validate()?;
    if update.is_empty() {
      return Err(Error::Validation("Nothing to update".into()));
    }

    if actor.id != id && !self.hris.role_of(actor).await?.is_admin() {
      return Err(Error::NotOwner { action: "updating a profile" });
    }

    let profile = self
      .hris
      .call("update_profile", self.hris.store.update_profile(id, update))
      .await?
      .ok_or(Error::NotFound { entity: "profile", id })?;

    info!(actor = %actor.id, profile = %id, "profile updated");
    let description = if actor.id == id {
      "Updated profile".to_owned()
    } else {
      format!("Updated profile of {}", profile.name)
    };
    self.hris.log_activity(actor.id, ActivityAction::Profile, description).await;
    Ok(profile)
  }
}
