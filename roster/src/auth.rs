//! Voter and admin authentication.
//!
//! A voter authenticates by a single secret value: manually provisioned
//! accounts are checked first (exact match), then the external roster (match
//! on the configured secret column). An admin authenticates with the master
//! secret (all permissions) or a provisioned username+secret pair (that
//! account's permission set, all-true when unset).
//!
//! None of this is strong authentication — secrets are plain shared codes
//! handed out at the event — so there is nothing to hash or sign here.

use plenum_records::{AdminAccountRecord, RosterConfigRecord, VoterAccountRecord};
use plenum_types::AdminPermissions;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::csv::{cell, column_index, parse_rows};
use crate::error::RosterError;
use crate::sheets::SheetClient;

/// Fallback display name for a roster row with a blank name cell.
const FALLBACK_DISPLAY_NAME: &str = "Authenticated voter";

/// What authentication learns about a voter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterProfile {
    pub display_name: String,
    pub segment: Option<String>,
    pub representative: Option<String>,
    pub axis: Option<String>,
}

/// Check the provisioned accounts for an exact secret match.
fn find_local_voter(secret: &str, accounts: &[VoterAccountRecord]) -> Option<VoterProfile> {
    accounts.iter().find(|a| a.secret == secret).map(|a| VoterProfile {
        display_name: a.display_name.clone(),
        segment: a.segment.clone(),
        representative: a.representative.clone(),
        axis: a.axis.clone(),
    })
}

/// Scan roster CSV rows for a secret match on the configured column.
fn roster_lookup(
    csv_text: &str,
    config: &RosterConfigRecord,
    secret: &str,
) -> Result<Option<VoterProfile>, RosterError> {
    let name_idx = column_index(&config.name_column)?;
    let secret_idx = column_index(&config.secret_column)?;
    let segment_idx = config.segment_column.as_deref().map(column_index).transpose()?;
    let representative_idx = config
        .representative_column
        .as_deref()
        .map(column_index)
        .transpose()?;
    let axis_idx = config.axis_column.as_deref().map(column_index).transpose()?;

    for row in parse_rows(csv_text) {
        if cell(&row, secret_idx) != Some(secret) {
            continue;
        }
        return Ok(Some(VoterProfile {
            display_name: cell(&row, name_idx)
                .unwrap_or(FALLBACK_DISPLAY_NAME)
                .to_string(),
            segment: segment_idx.and_then(|i| cell(&row, i)).map(str::to_string),
            representative: representative_idx
                .and_then(|i| cell(&row, i))
                .map(str::to_string),
            axis: axis_idx.and_then(|i| cell(&row, i)).map(str::to_string),
        }));
    }
    Ok(None)
}

/// Authenticate a voter by secret: provisioned accounts first, then the
/// external roster when one is configured.
pub async fn authenticate_voter(
    client: &SheetClient,
    secret: &str,
    accounts: &[VoterAccountRecord],
    config: Option<&RosterConfigRecord>,
) -> Result<VoterProfile, RosterError> {
    let secret = secret.trim();

    if let Some(profile) = find_local_voter(secret, accounts) {
        info!(voter = %profile.display_name, "voter authenticated against provisioned accounts");
        return Ok(profile);
    }

    let config = config.ok_or(RosterError::NotConfigured)?;
    let csv_text = client.fetch_csv(&config.sheet_url, &config.sheet_name).await?;
    match roster_lookup(&csv_text, config, secret)? {
        Some(profile) => {
            info!(voter = %profile.display_name, "voter authenticated against roster");
            Ok(profile)
        }
        None => Err(RosterError::InvalidCredentials),
    }
}

/// Authenticate an administrator.
///
/// The master secret grants every permission; a provisioned account grants
/// its stored permission set, defaulting to all-true when the account has
/// none. A blank username means "master secret only".
pub fn authenticate_admin(
    username: Option<&str>,
    secret: &str,
    master_secret: &str,
    accounts: &[AdminAccountRecord],
) -> Result<AdminPermissions, RosterError> {
    if !master_secret.is_empty() && secret == master_secret {
        return Ok(AdminPermissions::all());
    }

    let username = username.map(str::trim).filter(|u| !u.is_empty());
    if let Some(username) = username {
        if let Some(account) = accounts
            .iter()
            .find(|a| a.display_name == username && a.secret == secret)
        {
            return Ok(account.permissions.unwrap_or_else(AdminPermissions::all));
        }
    }
    Err(RosterError::InvalidCredentials)
}
