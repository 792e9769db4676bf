//! Admin permission set.

use serde::{Deserialize, Serialize};

/// What an authenticated administrator is allowed to manage.
///
/// Provisioned admin accounts may omit the set entirely, in which case
/// authentication treats it as all-true.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminPermissions {
    pub manage_voting: bool,
    pub manage_proposals: bool,
    pub manage_users: bool,
    pub manage_config: bool,
}

impl AdminPermissions {
    /// Every permission granted — the master-secret grant and the default
    /// for accounts without an explicit set.
    pub fn all() -> Self {
        Self {
            manage_voting: true,
            manage_proposals: true,
            manage_users: true,
            manage_config: true,
        }
    }

    /// No permission granted.
    pub fn none() -> Self {
        Self {
            manage_voting: false,
            manage_proposals: false,
            manage_users: false,
            manage_config: false,
        }
    }
}

impl Default for AdminPermissions {
    fn default() -> Self {
        Self::all()
    }
}
