//! Role resolution with an explicit invalidation hook.
//!
//! The resolver caches the [`Role`] of each identity it has looked up. An entry
//! lives until its TTL elapses or until [`RoleResolver::invalidate`] is called
//! for that identity, whichever comes first. Expired entries are swept out
//! whenever a fresh role is cached. A zero TTL disables caching so every
//! check goes to the store.

use std::{
  collections::HashMap,
  sync::{Arc, PoisonError, RwLock},
  time::{Duration, Instant},
};

use tracing::debug;
use uuid::Uuid;

use crate::{Result, identity::Role, remote, store::HrStore};

struct Cached {
  role:       Role,
  fetched_at: Instant,
}

impl Cached {
  fn is_fresh(&self, ttl: Option<Duration>) -> bool {
    ttl.is_none_or(|ttl| self.fetched_at.elapsed() < ttl)
  }
}

struct Inner<S> {
  store:        Arc<S>,
  ttl:          Option<Duration>,
  call_timeout: Duration,
  cache:        RwLock<HashMap<Uuid, Cached>>,
}

/// Resolves whether an identity holds the admin capability.
///
/// Cloning is cheap; clones share the same cache, so an invalidation through
/// one handle is seen by all of them.
pub struct RoleResolver<S> {
  inner: Arc<Inner<S>>,
}

impl<S> Clone for RoleResolver<S> {
  fn clone(&self) -> Self { Self { inner: Arc::clone(&self.inner) } }
}

impl<S: HrStore> RoleResolver<S> {
  /// A resolver whose entries expire after `ttl`; `None` keeps them until
  /// invalidated.
  pub fn new(store: Arc<S>, ttl: Option<Duration>, call_timeout: Duration) -> Self {
    Self {
      inner: Arc::new(Inner { store, ttl, call_timeout, cache: RwLock::new(HashMap::new()) }),
    }
  }

  /// The role of `user_id`, from cache when fresh.
  pub async fn resolve(&self, user_id: Uuid) -> Result<Role> {
    if let Some(role) = self.cached(user_id) {
      debug!(%user_id, role = role.as_str(), "role cache hit");
      return Ok(role);
    }

    let role = remote::call(
      "role_of",
      self.inner.call_timeout,
      self.inner.store.role_of(user_id),
    )
    .await?;

    if self.caching_enabled() {
      let ttl = self.inner.ttl;
      let mut cache = self.inner.cache.write().unwrap_or_else(PoisonError::into_inner);
      cache.retain(|_, entry| entry.is_fresh(ttl));
      cache.insert(user_id, Cached { role, fetched_at: Instant::now() });
    }
    Ok(role)
  }

  pub async fn is_admin(&self, user_id: Uuid) -> Result<bool> {
    Ok(self.resolve(user_id).await?.is_admin())
  }

  /// Drop the cached role of `user_id`; the next check re-reads the store.
  pub fn invalidate(&self, user_id: Uuid) {
    let mut cache = self.inner.cache.write().unwrap_or_else(PoisonError::into_inner);
    if cache.remove(&user_id).is_some() {
      debug!(%user_id, "role cache entry invalidated");
    }
  }

  pub fn invalidate_all(&self) {
    self.inner.cache.write().unwrap_or_else(PoisonError::into_inner).clear();
  }

  /// Number of entries currently held, fresh or not.
  pub fn cached_len(&self) -> usize {
    self.inner.cache.read().unwrap_or_else(PoisonError::into_inner).len()
  }

  fn caching_enabled(&self) -> bool { self.inner.ttl.is_none_or(|ttl| !ttl.is_zero()) }

  fn cached(&self, user_id: Uuid) -> Option<Role> {
    let cache = self.inner.cache.read().unwrap_or_else(PoisonError::into_inner);
    let entry = cache.get(&user_id)?;
    entry.is_fresh(self.inner.ttl).then_some(entry.role)
  }
}
