//! Admin sessions and the per-device audit token.

use plenum_types::{AdminPermissions, Timestamp};
use serde::{Deserialize, Serialize};

/// Admin sessions expire one hour after authentication.
pub const ADMIN_SESSION_TTL_MILLIS: u64 = 60 * 60 * 1000;

/// A granted admin session with its cached permission set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminSession {
    pub token: String,
    pub permissions: AdminPermissions,
    pub granted_at: Timestamp,
}

impl AdminSession {
    pub fn new(permissions: AdminPermissions, now: Timestamp) -> Self {
        Self {
            token: plenum_utils::fresh_token(),
            permissions,
            granted_at: now,
        }
    }

    /// Expiry is measured from the authentication moment and checked on
    /// every access.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.granted_at.has_expired(ADMIN_SESSION_TTL_MILLIS, now)
    }
}

/// Opaque per-device pseudo-identity, generated once and reused for every
/// ballot from that device. An audit aid only — never an authentication or
/// security mechanism.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceToken(String);

impl DeviceToken {
    pub fn generate() -> Self {
        Self(format!("device_{}", plenum_utils::fresh_token()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for DeviceToken {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}
