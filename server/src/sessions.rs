//! In-memory admin session registry.

use std::collections::HashMap;
use std::sync::Mutex;

use plenum_roster::AdminSession;
use plenum_types::{AdminPermissions, Timestamp};

/// Sessions live only in this process; a restart logs every admin out,
/// which is the safe direction to fail.
#[derive(Default)]
pub struct AdminSessions {
    inner: Mutex<HashMap<String, AdminSession>>,
}

impl AdminSessions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session, returning its bearer token.
    pub fn insert(&self, session: AdminSession) -> String {
        let token = session.token.clone();
        self.lock().insert(token.clone(), session);
        token
    }

    /// Look up a token's permission set. Expired sessions are evicted on
    /// access and read as absent.
    pub fn permissions_for(&self, token: &str, now: Timestamp) -> Option<AdminPermissions> {
        let mut sessions = self.lock();
        match sessions.get(token) {
            Some(session) if session.is_expired(now) => {
                sessions.remove(token);
                None
            }
            Some(session) => Some(session.permissions),
            None => None,
        }
    }

    /// Explicit logout.
    pub fn revoke(&self, token: &str) {
        self.lock().remove(token);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, AdminSession>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
