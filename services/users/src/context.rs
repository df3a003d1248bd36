//! Per-request context.

use crate::domain::types::User;

/// Per-request handle carrying the authenticated actor and the session-level
/// accounting the serializers need (anonymous sessions still accrue disk
/// usage against their active, ownerless session).
///
/// Passed explicitly through every operation — there is no ambient "current
/// user" singleton.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    actor: Option<User>,
    session_disk_usage: u64,
    quota_bytes: Option<u64>,
}

impl RequestContext {
    /// Context for an unauthenticated request.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Context bound to an authenticated actor.
    pub fn authenticated(actor: User) -> Self {
        Self {
            actor: Some(actor),
            ..Self::default()
        }
    }

    /// Attach the configured quota, in bytes. Absent means "no quota".
    pub fn with_quota_bytes(mut self, bytes: u64) -> Self {
        self.quota_bytes = Some(bytes);
        self
    }

    /// Attach the active session's disk usage, used when serializing an
    /// anonymous actor.
    pub fn with_session_disk_usage(mut self, bytes: u64) -> Self {
        self.session_disk_usage = bytes;
        self
    }

    /// The actor this context was constructed with, if any. Never re-derived
    /// from the store.
    pub fn current_actor(&self) -> Option<&User> {
        self.actor.as_ref()
    }

    pub fn session_disk_usage(&self) -> u64 {
        self.session_disk_usage
    }

    pub fn quota_bytes(&self) -> Option<u64> {
        self.quota_bytes
    }
}
