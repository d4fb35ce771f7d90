//! Project journal: summary fields plus an append-only phase history
//!
//! The phase list is the ground truth for progress; summary fields are
//! denormalized conveniences and may lag the latest phase's payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sq_core::{Tool, new_entity_id};
use tracing::warn;

use crate::identity::{IdentityDraft, IdentityStore};
use crate::payload::PhasePayload;
use crate::store::SessionStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    #[default]
    Active,
    Completed,
    Abandoned,
}

impl std::fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProjectStatus::Active => write!(f, "active"),
            ProjectStatus::Completed => write!(f, "completed"),
            ProjectStatus::Abandoned => write!(f, "abandoned"),
        }
    }
}

/// One completed step within a project. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Phase {
    pub id: String,
    /// Display label derived from `tool`.
    pub name: String,
    pub tool: Tool,
    pub payload: PhasePayload,
    pub completed_at: DateTime<Utc>,
}

/// One customer engagement, owned by an identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    /// Identity id at creation time.
    pub owner_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facility_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facility_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_cost: Option<f64>,
    #[serde(default)]
    pub systems: Vec<String>,
    #[serde(default)]
    pub status: ProjectStatus,
    /// Append-only: never truncated, edited, or reordered.
    #[serde(default)]
    pub phases: Vec<Phase>,
    /// Remote store record id, set after the first successful sync.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The phase a tool just completed.
#[derive(Debug, Clone)]
pub struct PhaseDraft {
    pub tool: Tool,
    pub payload: PhasePayload,
}

/// Summary overwrites plus exactly one new phase.
///
/// `None` means "not provided, leave untouched"; a supplied value always
/// overwrites, even when empty or zero.
#[derive(Debug, Clone)]
pub struct ProjectUpdate {
    pub name: Option<String>,
    pub facility_size: Option<u32>,
    pub facility_type: Option<String>,
    pub estimated_cost: Option<f64>,
    pub systems: Option<Vec<String>>,
    pub status: Option<ProjectStatus>,
    pub phase: PhaseDraft,
}

impl ProjectUpdate {
    pub fn new(tool: Tool, payload: PhasePayload) -> Self {
        Self {
            name: None,
            facility_size: None,
            facility_type: None,
            estimated_cost: None,
            systems: None,
            status: None,
            phase: PhaseDraft { tool, payload },
        }
    }
}

/// Owns the current project record and the project history.
#[derive(Debug, Clone)]
pub struct ProjectJournal {
    store: SessionStore,
}

impl ProjectJournal {
    pub fn new(store: SessionStore) -> Self {
        Self { store }
    }

    /// Non-mutating read of the current project.
    pub fn current(&self) -> Option<Project> {
        self.store.load_project()
    }

    /// Create the current project if absent, apply summary overwrites,
    /// append the new phase, and persist (current key + history upsert).
    ///
    /// Storage faults are logged, never raised; the in-memory value is
    /// returned and the next successful persist catches up.
    pub fn create_or_update(&self, update: ProjectUpdate) -> Project {
        let owner =
            IdentityStore::new(self.store.clone()).get_or_create(&IdentityDraft::default());
        let now = Utc::now();

        let mut project = self.store.load_project().unwrap_or_else(|| Project {
            id: new_entity_id(),
            owner_id: owner.id.clone(),
            name: default_project_name(now),
            facility_size: None,
            facility_type: None,
            estimated_cost: None,
            systems: Vec::new(),
            status: ProjectStatus::Active,
            phases: Vec::new(),
            remote_id: None,
            created_at: now,
            updated_at: now,
        });

        if let Some(name) = update.name {
            project.name = name;
        }
        if let Some(size) = update.facility_size {
            project.facility_size = Some(size);
        }
        if let Some(facility_type) = update.facility_type {
            project.facility_type = Some(facility_type);
        }
        if let Some(cost) = update.estimated_cost {
            project.estimated_cost = Some(cost);
        }
        if let Some(systems) = update.systems {
            project.systems = systems;
        }
        if let Some(status) = update.status {
            project.status = status;
        }
        project.updated_at = now;

        project.phases.push(Phase {
            id: new_entity_id(),
            name: update.phase.tool.display_name().to_string(),
            tool: update.phase.tool,
            payload: update.phase.payload,
            completed_at: now,
        });

        if let Err(error) = self.store.save_project(&project) {
            warn!(project_id = %project.id, %error, "failed to persist current project; continuing with in-memory value");
        }
        if let Err(error) = self.store.upsert_history(&project) {
            warn!(project_id = %project.id, %error, "failed to upsert project history");
        }

        project
    }

    /// Projects in the history owned by the given identity.
    pub fn list_for_owner(&self, owner_id: &str) -> Vec<Project> {
        self.store
            .load_history()
            .into_iter()
            .filter(|project| project.owner_id == owner_id)
            .collect()
    }
}

fn default_project_name(now: DateTime<Utc>) -> String {
    format!("Project {}", now.format("%Y-%m-%d"))
}
