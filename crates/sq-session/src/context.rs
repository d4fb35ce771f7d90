//! Explicit per-session ownership of the tracker components
//!
//! One `SessionContext` per active user session, instead of module-level
//! singleton state. All components share the same durable store, so every
//! mutating call re-reads-then-writes and nothing is cached in-process.

use anyhow::Result;

use crate::activity::ActivityEmitter;
use crate::identity::{Identity, IdentityStore};
use crate::project::{Project, ProjectJournal};
use crate::store::SessionStore;

pub struct SessionContext {
    store: SessionStore,
    identities: IdentityStore,
    projects: ProjectJournal,
    activity: ActivityEmitter,
}

/// Snapshot of the session for debugging and admin views.
#[derive(Debug, Clone)]
pub struct SessionSummary {
    pub identity: Option<Identity>,
    pub project: Option<Project>,
    pub project_count: usize,
}

impl SessionContext {
    pub fn new(store: SessionStore) -> Self {
        Self {
            identities: IdentityStore::new(store.clone()),
            projects: ProjectJournal::new(store.clone()),
            activity: ActivityEmitter::new(store.clone()),
            store,
        }
    }

    /// Open a context over the platform default store location.
    pub fn open_default() -> Result<Self> {
        Ok(Self::new(SessionStore::open_default()?))
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn identities(&self) -> &IdentityStore {
        &self.identities
    }

    pub fn projects(&self) -> &ProjectJournal {
        &self.projects
    }

    pub fn activity(&mut self) -> &mut ActivityEmitter {
        &mut self.activity
    }

    /// Abandon the current project key; the next journal update starts a
    /// fresh engagement. History and identity are untouched.
    pub fn start_new_project(&self) {
        if let Err(error) = self.store.clear_current_project() {
            tracing::warn!(%error, "failed to clear current project");
        }
    }

    /// The explicit reset: clears identity, current project, and history.
    pub fn reset(&self) -> Result<()> {
        self.store.clear_all()
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            identity: self.identities.current(),
            project: self.projects.current(),
            project_count: self.store.load_history().len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{IdentityDraft, IdentityKind};
    use crate::payload::PhasePayload;
    use crate::project::ProjectUpdate;
    use serde_json::json;
    use sq_core::Tool;
    use tempfile::tempdir;

    fn context_in(dir: &std::path::Path) -> SessionContext {
        SessionContext::new(SessionStore::new(dir.to_path_buf()))
    }

    #[test]
    fn test_summary_reflects_session_progress() {
        let td = tempdir().unwrap();
        let ctx = context_in(td.path());

        let empty = ctx.summary();
        assert!(empty.identity.is_none());
        assert!(empty.project.is_none());
        assert_eq!(empty.project_count, 0);

        ctx.projects().create_or_update(ProjectUpdate::new(
            Tool::QuickEstimate,
            PhasePayload::Opaque(json!({})),
        ));

        let summary = ctx.summary();
        assert!(summary.identity.is_some());
        assert!(summary.project.is_some());
        assert_eq!(summary.project_count, 1);
    }

    #[test]
    fn test_start_new_project_keeps_identity_and_history() {
        let td = tempdir().unwrap();
        let ctx = context_in(td.path());

        ctx.projects().create_or_update(ProjectUpdate::new(
            Tool::QuickEstimate,
            PhasePayload::Opaque(json!({})),
        ));
        ctx.start_new_project();

        let summary = ctx.summary();
        assert!(summary.identity.is_some());
        assert!(summary.project.is_none());
        assert_eq!(summary.project_count, 1);
    }

    #[test]
    fn test_reset_clears_everything() {
        let td = tempdir().unwrap();
        let ctx = context_in(td.path());

        ctx.identities().get_or_create(&IdentityDraft {
            email: Some("a@b.com".to_string()),
            ..Default::default()
        });
        ctx.projects().create_or_update(ProjectUpdate::new(
            Tool::QuickEstimate,
            PhasePayload::Opaque(json!({})),
        ));

        ctx.reset().unwrap();

        let summary = ctx.summary();
        assert!(summary.identity.is_none());
        assert!(summary.project.is_none());
        assert_eq!(summary.project_count, 0);

        // A fresh anonymous identity is created only after the reset.
        let identity = ctx.identities().get_or_create(&IdentityDraft::default());
        assert_eq!(identity.kind, IdentityKind::Anonymous);
    }
}
