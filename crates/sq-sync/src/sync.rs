//! Best-effort synchronization of local session state to the remote store
//!
//! Local state is always authoritative. Every operation here catches its
//! own failures: the caller gets a [`SyncOutcome`], never an error, and
//! UI code paths are never blocked on remote availability.

use serde_json::json;
use sq_core::Tool;
use sq_session::{Project, SessionStore};
use tracing::{debug, warn};

use crate::remote::{AuthProvider, RemoteProject, RemoteProjectRecord, RemoteSessionEvent, RemoteStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The remote store now reflects local state.
    Synced,
    /// Nothing to do (no identity, anonymous, or no project).
    Skipped,
    /// The operation failed and should be retried on the next sync.
    Deferred,
}

pub struct Synchronizer<R, A> {
    remote: R,
    auth: A,
    store: SessionStore,
}

impl<R: RemoteStore, A: AuthProvider> Synchronizer<R, A> {
    pub fn new(remote: R, auth: A, store: SessionStore) -> Self {
        Self { remote, auth, store }
    }

    /// Resolve the authoritative remote identity id and record it locally.
    /// No-op for anonymous identities: promotion happens in the identity
    /// store, never here.
    pub async fn sync_identity(&self) -> SyncOutcome {
        let Some(identity) = self.store.load_identity() else {
            return SyncOutcome::Skipped;
        };
        if !identity.kind.is_authenticated() {
            return SyncOutcome::Skipped;
        }

        match self.auth.current_user().await {
            Ok(Some(user)) => {
                // Re-read before writing so a mutation that landed while
                // we awaited the auth provider is not clobbered.
                let Some(mut identity) = self.store.load_identity() else {
                    return SyncOutcome::Skipped;
                };
                identity.remote_id = Some(user.id);
                if let Err(error) = self.store.save_identity(&identity) {
                    warn!(identity_id = %identity.id, %error, "failed to persist remote identity id");
                }
                SyncOutcome::Synced
            }
            Ok(None) => {
                debug!("auth provider has no current user; identity sync skipped");
                SyncOutcome::Skipped
            }
            Err(error) => {
                warn!(%error, "identity sync failed; will retry on next sync");
                SyncOutcome::Deferred
            }
        }
    }

    /// Push the current project to the remote store under the given owner.
    ///
    /// First successful push is an insert whose returned id is captured
    /// into `project.remote_id`; later pushes update that record with a
    /// full overwrite of the metadata blob (last-write-wins; the local
    /// project is the source of truth for structure).
    pub async fn sync_current_project(&self, remote_owner_id: &str) -> SyncOutcome {
        let Some(project) = self.store.load_project() else {
            return SyncOutcome::Skipped;
        };
        let record = project_record(&project, remote_owner_id);

        match project.remote_id.as_deref() {
            None => match self.remote.insert_project(&record).await {
                Ok(remote_id) => {
                    self.persist_remote_id(&remote_id);
                    SyncOutcome::Synced
                }
                Err(error) => {
                    warn!(
                        project_id = %project.id,
                        %error,
                        "project insert failed; local state remains authoritative"
                    );
                    SyncOutcome::Deferred
                }
            },
            Some(remote_id) => match self.remote.update_project(remote_id, &record).await {
                Ok(()) => SyncOutcome::Synced,
                Err(error) => {
                    warn!(
                        project_id = %project.id,
                        remote_id,
                        %error,
                        "project update failed; local state remains authoritative"
                    );
                    SyncOutcome::Deferred
                }
            },
        }
    }

    /// Sync the current project under whatever remote owner is resolvable.
    /// Skipped for anonymous visitors.
    pub async fn sync_current_project_auto(&self) -> SyncOutcome {
        let Some(owner) = self.remote_owner().await else {
            return SyncOutcome::Skipped;
        };
        self.sync_current_project(&owner).await
    }

    /// Opportunistic full sync: identity first, then the current project.
    pub async fn sync(&self) -> SyncOutcome {
        match self.sync_identity().await {
            SyncOutcome::Synced => {}
            other => return other,
        }
        self.sync_current_project_auto().await
    }

    /// Append a correlation event to the remote sessions log. Always an
    /// insert, independent of project sync.
    pub async fn log_remote_event(
        &self,
        tool: Tool,
        session_id: &str,
        data: serde_json::Value,
    ) -> SyncOutcome {
        let auth_user = match self.auth.current_user().await {
            Ok(user) => user,
            Err(error) => {
                debug!(%error, "auth lookup failed while logging event; recording as guest");
                None
            }
        };

        let guest_id = if auth_user.is_none() {
            self.store.load_identity().map(|identity| identity.id)
        } else {
            None
        };

        let event = RemoteSessionEvent {
            session_id: session_id.to_string(),
            tool: tool.to_string(),
            user_id: auth_user.map(|user| user.id),
            guest_id,
            project_context: self.store.load_project().map(|project| project.id),
            session_data: data,
            status: "active".to_string(),
        };

        match self.remote.insert_session_event(&event).await {
            Ok(()) => SyncOutcome::Synced,
            Err(error) => {
                warn!(session_id, %error, "session event insert failed");
                SyncOutcome::Deferred
            }
        }
    }

    /// Remote projects for the resolved owner. Anonymous identities get an
    /// empty listing by design, and so does any remote failure.
    pub async fn list_remote_projects(&self) -> Vec<RemoteProject> {
        let Some(owner) = self.remote_owner().await else {
            return Vec::new();
        };

        match self.remote.list_projects(&owner).await {
            Ok(projects) => projects,
            Err(error) => {
                warn!(%error, "remote project listing failed");
                Vec::new()
            }
        }
    }

    /// The remote owner id for the current identity: a previously captured
    /// `remote_id`, or a fresh auth-provider lookup for authenticated
    /// identities that have not synced yet.
    async fn remote_owner(&self) -> Option<String> {
        let identity = self.store.load_identity()?;
        if let Some(remote_id) = identity.remote_id {
            return Some(remote_id);
        }
        if !identity.kind.is_authenticated() {
            return None;
        }

        match self.auth.current_user().await {
            Ok(Some(user)) => Some(user.id),
            Ok(None) => None,
            Err(error) => {
                warn!(%error, "auth lookup failed while resolving remote owner");
                None
            }
        }
    }

    fn persist_remote_id(&self, remote_id: &str) {
        // Re-read: a phase may have been appended while the insert ran.
        let Some(mut project) = self.store.load_project() else {
            return;
        };
        project.remote_id = Some(remote_id.to_string());
        if let Err(error) = self.store.save_project(&project) {
            warn!(project_id = %project.id, %error, "failed to persist remote project id");
        }
        if let Err(error) = self.store.upsert_history(&project) {
            warn!(project_id = %project.id, %error, "failed to upsert history after sync");
        }
    }
}

fn project_record(project: &Project, remote_owner_id: &str) -> RemoteProjectRecord {
    RemoteProjectRecord {
        name: project.name.clone(),
        owner_id: remote_owner_id.to_string(),
        facility_size: project.facility_size,
        facility_type: project.facility_type.clone(),
        estimated_cost: project.estimated_cost,
        systems: project.systems.clone(),
        status: project.status.to_string(),
        metadata: json!({
            "local_project_id": project.id,
            "phases": project.phases,
        }),
    }
}
