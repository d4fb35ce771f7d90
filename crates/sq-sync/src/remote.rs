//! Remote store and auth provider capability traits
//!
//! The remote persistent store exposes two collections (`projects`, plus
//! an append-only `sessions` log) and is never the source of truth: the
//! local session store is. Implementations must be safe to call
//! best-effort from sync paths.

use std::sync::Mutex;

use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An authenticated identity as the auth provider reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Writable fields of a remote project record. Phases travel inside the
/// opaque `metadata` blob and are overwritten whole on update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteProjectRecord {
    pub name: String,
    pub owner_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facility_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facility_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_cost: Option<f64>,
    #[serde(default)]
    pub systems: Vec<String>,
    pub status: String,
    pub metadata: serde_json::Value,
}

/// A remote project row as returned by listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteProject {
    pub id: String,
    #[serde(flatten)]
    pub record: RemoteProjectRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// One row of the append-only cross-tool correlation log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteSessionEvent {
    pub session_id: String,
    pub tool: String,
    /// Auth-provider id when resolvable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Local identity id for anonymous visitors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guest_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_context: Option<String>,
    pub session_data: serde_json::Value,
    pub status: String,
}

#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Insert a new project record and return its remote id.
    async fn insert_project(&self, record: &RemoteProjectRecord) -> Result<String>;

    /// Full overwrite of an existing record, metadata blob included.
    async fn update_project(&self, remote_id: &str, record: &RemoteProjectRecord) -> Result<()>;

    async fn list_projects(&self, owner_id: &str) -> Result<Vec<RemoteProject>>;

    /// Always an insert, never an update.
    async fn insert_session_event(&self, event: &RemoteSessionEvent) -> Result<()>;
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// The currently authenticated identity, or `None`.
    async fn current_user(&self) -> Result<Option<AuthUser>>;
}

#[async_trait]
impl<T: RemoteStore + ?Sized> RemoteStore for std::sync::Arc<T> {
    async fn insert_project(&self, record: &RemoteProjectRecord) -> Result<String> {
        (**self).insert_project(record).await
    }

    async fn update_project(&self, remote_id: &str, record: &RemoteProjectRecord) -> Result<()> {
        (**self).update_project(remote_id, record).await
    }

    async fn list_projects(&self, owner_id: &str) -> Result<Vec<RemoteProject>> {
        (**self).list_projects(owner_id).await
    }

    async fn insert_session_event(&self, event: &RemoteSessionEvent) -> Result<()> {
        (**self).insert_session_event(event).await
    }
}

#[async_trait]
impl<T: AuthProvider + ?Sized> AuthProvider for std::sync::Arc<T> {
    async fn current_user(&self) -> Result<Option<AuthUser>> {
        (**self).current_user().await
    }
}

/// Auth provider with no signed-in identity.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopAuthProvider;

#[async_trait]
impl AuthProvider for NoopAuthProvider {
    async fn current_user(&self) -> Result<Option<AuthUser>> {
        Ok(None)
    }
}

/// Auth provider pinned to a fixed identity.
#[derive(Debug, Clone)]
pub struct StaticAuthProvider {
    user: AuthUser,
}

impl StaticAuthProvider {
    pub fn new(user: AuthUser) -> Self {
        Self { user }
    }
}

#[async_trait]
impl AuthProvider for StaticAuthProvider {
    async fn current_user(&self) -> Result<Option<AuthUser>> {
        Ok(Some(self.user.clone()))
    }
}

/// In-process remote store used by tests and offline development.
/// Counts inserts/updates and can fail on demand to exercise retry paths.
#[derive(Debug, Default)]
pub struct MemoryRemoteStore {
    state: Mutex<MemoryRemoteState>,
}

#[derive(Debug, Default)]
struct MemoryRemoteState {
    projects: Vec<(String, RemoteProjectRecord)>,
    events: Vec<RemoteSessionEvent>,
    insert_count: u32,
    update_count: u32,
    fail_remaining: u32,
    next_id: u64,
}

impl MemoryRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `count` operations fail.
    pub fn inject_failures(&self, count: u32) {
        self.lock().fail_remaining = count;
    }

    pub fn insert_count(&self) -> u32 {
        self.lock().insert_count
    }

    pub fn update_count(&self) -> u32 {
        self.lock().update_count
    }

    pub fn event_count(&self) -> usize {
        self.lock().events.len()
    }

    pub fn events(&self) -> Vec<RemoteSessionEvent> {
        self.lock().events.clone()
    }

    pub fn project(&self, remote_id: &str) -> Option<RemoteProjectRecord> {
        self.lock()
            .projects
            .iter()
            .find(|(id, _)| id == remote_id)
            .map(|(_, record)| record.clone())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryRemoteState> {
        // A poisoned test double is unrecoverable anyway.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn take_failure(state: &mut MemoryRemoteState) -> Result<()> {
        if state.fail_remaining > 0 {
            state.fail_remaining -= 1;
            bail!("injected remote failure");
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for MemoryRemoteStore {
    async fn insert_project(&self, record: &RemoteProjectRecord) -> Result<String> {
        let mut state = self.lock();
        Self::take_failure(&mut state)?;
        state.next_id += 1;
        let remote_id = format!("rp_{}", state.next_id);
        state.projects.push((remote_id.clone(), record.clone()));
        state.insert_count += 1;
        Ok(remote_id)
    }

    async fn update_project(&self, remote_id: &str, record: &RemoteProjectRecord) -> Result<()> {
        let mut state = self.lock();
        Self::take_failure(&mut state)?;
        let row = state
            .projects
            .iter_mut()
            .find(|(id, _)| id == remote_id)
            .ok_or_else(|| anyhow!("no remote project with id '{remote_id}'"))?;
        row.1 = record.clone();
        state.update_count += 1;
        Ok(())
    }

    async fn list_projects(&self, owner_id: &str) -> Result<Vec<RemoteProject>> {
        let mut state = self.lock();
        Self::take_failure(&mut state)?;
        Ok(state
            .projects
            .iter()
            .filter(|(_, record)| record.owner_id == owner_id)
            .map(|(id, record)| RemoteProject {
                id: id.clone(),
                record: record.clone(),
                created_at: Some(Utc::now()),
            })
            .collect())
    }

    async fn insert_session_event(&self, event: &RemoteSessionEvent) -> Result<()> {
        let mut state = self.lock();
        Self::take_failure(&mut state)?;
        state.events.push(event.clone());
        Ok(())
    }
}
