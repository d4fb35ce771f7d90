pub mod activity;
pub mod context;
pub mod identity;
pub mod payload;
pub mod project;
pub mod store;

pub use activity::{Activity, ActivityEmitter, ActivityLog, ActivityLogStats};
pub use context::{SessionContext, SessionSummary};
pub use identity::{Identity, IdentityDraft, IdentityKind, IdentityStore};
pub use payload::{
    AssessmentPayload, ContactPayload, PhasePayload, QuickEstimatePayload, RefinementPayload,
};
pub use project::{Phase, PhaseDraft, Project, ProjectJournal, ProjectStatus, ProjectUpdate};
pub use store::SessionStore;
