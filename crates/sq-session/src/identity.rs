//! Visitor identity with one-way anonymous -> authenticated promotion

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sq_core::new_entity_id;
use tracing::warn;

use crate::store::SessionStore;

/// Whether the visitor has been tied to a real account yet.
///
/// The only transition is [`IdentityKind::promote`], which is monotonic:
/// no API yields `Anonymous` from `Authenticated`, so the "never downgrade"
/// invariant holds by construction rather than by runtime check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityKind {
    Anonymous,
    Authenticated,
}

impl IdentityKind {
    /// The single allowed transition: anonymous -> authenticated.
    /// Promoting an already-authenticated identity is a no-op.
    pub fn promote(self) -> IdentityKind {
        IdentityKind::Authenticated
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, IdentityKind::Authenticated)
    }
}

impl std::fmt::Display for IdentityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdentityKind::Anonymous => write!(f, "anonymous"),
            IdentityKind::Authenticated => write!(f, "authenticated"),
        }
    }
}

/// One tracked visitor. Exactly one identity is current at a time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    /// Locally generated ULID, stable for the lifetime of the store entry.
    pub id: String,

    pub kind: IdentityKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,

    /// Auth-provider identity, set only after promotion sync.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_id: Option<String>,

    pub created_at: DateTime<Utc>,

    /// Bumped on every tracked activity.
    pub last_active_at: DateTime<Utc>,
}

/// Partial identity fields collected by a tool.
///
/// Empty or absent fields never erase previously known values.
#[derive(Debug, Clone, Default)]
pub struct IdentityDraft {
    pub email: Option<String>,
    pub name: Option<String>,
    pub organization: Option<String>,
}

impl IdentityDraft {
    fn has_email(&self) -> bool {
        self.email.as_deref().is_some_and(|email| !email.is_empty())
    }
}

/// Owns the current identity record in the durable store.
#[derive(Debug, Clone)]
pub struct IdentityStore {
    store: SessionStore,
}

impl IdentityStore {
    pub fn new(store: SessionStore) -> Self {
        Self { store }
    }

    /// Non-mutating read. Absence is a valid state, not a failure.
    pub fn current(&self) -> Option<Identity> {
        self.store.load_identity()
    }

    /// Create the identity if none exists, otherwise merge non-empty draft
    /// fields into it and bump `last_active_at`. An email in the draft
    /// promotes an anonymous identity in place; the promotion is final.
    ///
    /// Persistence failure is logged and the in-memory value returned --
    /// the next successful persist catches up.
    pub fn get_or_create(&self, draft: &IdentityDraft) -> Identity {
        let now = Utc::now();

        let identity = match self.store.load_identity() {
            None => {
                let kind = if draft.has_email() {
                    IdentityKind::Authenticated
                } else {
                    IdentityKind::Anonymous
                };
                Identity {
                    id: new_entity_id(),
                    kind,
                    email: non_empty(&draft.email),
                    name: non_empty(&draft.name),
                    organization: non_empty(&draft.organization),
                    remote_id: None,
                    created_at: now,
                    last_active_at: now,
                }
            }
            Some(mut existing) => {
                merge_field(&mut existing.email, &draft.email);
                merge_field(&mut existing.name, &draft.name);
                merge_field(&mut existing.organization, &draft.organization);
                if draft.has_email() {
                    existing.kind = existing.kind.promote();
                }
                existing.last_active_at = now;
                existing
            }
        };

        if let Err(error) = self.store.save_identity(&identity) {
            warn!(identity_id = %identity.id, %error, "failed to persist identity; continuing with in-memory value");
        }

        identity
    }

    /// Bump `last_active_at` on the current identity, if any.
    pub(crate) fn touch(&self) -> Option<Identity> {
        let mut identity = self.store.load_identity()?;
        identity.last_active_at = Utc::now();
        if let Err(error) = self.store.save_identity(&identity) {
            warn!(identity_id = %identity.id, %error, "failed to persist activity timestamp");
        }
        Some(identity)
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_deref().filter(|v| !v.is_empty()).map(str::to_string)
}

fn merge_field(current: &mut Option<String>, incoming: &Option<String>) {
    if let Some(value) = non_empty(incoming) {
        *current = Some(value);
    }
}
