//! The validation gate between stored bytes and trusted records.
//!
//! [`is_valid`] is a pure predicate over a raw JSON value: it checks the
//! `kind` tag and the presence and primitive type of every required field,
//! rejects unknown tags, and never panics. [`decode_log`] applies it to a
//! whole stored log, quarantining invalid entries (they stay in storage,
//! they just never reach a projection) and treating a non-array payload as
//! an empty store rather than an error.

use serde_json::Value;
use tracing::warn;

use crate::record::Record;

const CHOICES: [&str; 3] = ["yes", "no", "abstain"];
const STATUSES: [&str; 5] = [
    "not_started",
    "started",
    "closed",
    "reset",
    "new_voting_created",
];
const RULE_ACTIONS: [&str; 2] = ["none", "promote_to_final"];

/// Whether a raw log entry is a well-formed record of a known kind.
pub fn is_valid(raw: &Value) -> bool {
    let Some(kind) = raw.get("kind").and_then(Value::as_str) else {
        return false;
    };

    match kind {
        "vote" => {
            has_str(raw, "id")
                && has_str(raw, "voter_id")
                && has_str(raw, "proposal_id")
                && str_in(raw, "choice", &CHOICES)
                && has_num(raw, "cast_at")
                && has_str(raw, "device_token")
        }
        "proposal" => {
            has_str(raw, "id")
                && has_str(raw, "title")
                && has_str(raw, "axis")
                && has_str(raw, "scope")
                && has_str(raw, "region")
                && has_str(raw, "municipality")
                && has_str(raw, "description")
                && has_num(raw, "created_at")
        }
        "control" => {
            has_str(raw, "id") && str_in(raw, "status", &STATUSES) && has_num(raw, "recorded_at")
        }
        "active_proposal" => {
            has_str(raw, "id")
                && has_str(raw, "proposal_id")
                && has_str(raw, "title")
                && has_str(raw, "axis")
                && has_str(raw, "body")
                && has_num(raw, "recorded_at")
        }
        "roster_config" => {
            has_str(raw, "id")
                && has_str(raw, "sheet_url")
                && has_str(raw, "sheet_name")
                && has_str(raw, "name_column")
                && has_str(raw, "secret_column")
                && has_num(raw, "recorded_at")
        }
        "proposal_import_config" => {
            has_str(raw, "id")
                && has_str(raw, "sheet_url")
                && has_str(raw, "sheet_name")
                && has_str(raw, "title_column")
                && has_str(raw, "axis_column")
                && has_str(raw, "scope_column")
                && has_str(raw, "region_column")
                && has_str(raw, "municipality_column")
                && has_str(raw, "description_column")
                && has_num(raw, "recorded_at")
        }
        "voter_account" => {
            has_str(raw, "id")
                && has_str(raw, "display_name")
                && has_str(raw, "secret")
                && has_num(raw, "recorded_at")
        }
        "admin_account" => {
            has_str(raw, "id")
                && has_str(raw, "display_name")
                && has_str(raw, "secret")
                && has_num(raw, "recorded_at")
        }
        "classification_rule" => {
            has_str(raw, "id")
                && has_num(raw, "min_percent")
                && has_num(raw, "max_percent")
                && has_str(raw, "label")
                && str_in(raw, "action", &RULE_ACTIONS)
                && has_str(raw, "color")
                && has_num(raw, "recorded_at")
        }
        _ => false,
    }
}

/// Decode one raw entry into a typed record, or `None` if it fails the
/// validation gate (or any residual decode mismatch the field checks cannot
/// express, e.g. a negative timestamp).
pub fn decode_value(raw: &Value) -> Option<Record> {
    if !is_valid(raw) {
        return None;
    }
    serde_json::from_value(raw.clone()).ok()
}

/// Decode a serialized log into the trusted record sequence.
///
/// Fails soft on every axis: non-JSON or non-array input reads as an empty
/// store, and individual invalid entries are skipped with a warning. Nothing
/// here ever deletes or rewrites the underlying bytes.
pub fn decode_log(text: &str) -> Vec<Record> {
    let parsed: Value = match serde_json::from_str(text) {
        Ok(v) => v,
        Err(e) => {
            warn!("record log is not valid JSON, treating as empty: {e}");
            return Vec::new();
        }
    };
    let Value::Array(entries) = parsed else {
        warn!("record log is not a JSON array, treating as empty");
        return Vec::new();
    };

    let total = entries.len();
    let records: Vec<Record> = entries.iter().filter_map(decode_value).collect();
    if records.len() < total {
        warn!(
            invalid = total - records.len(),
            total, "quarantined invalid record log entries"
        );
    }
    records
}

fn has_str(raw: &Value, key: &str) -> bool {
    raw.get(key).map(Value::is_string).unwrap_or(false)
}

fn has_num(raw: &Value, key: &str) -> bool {
    raw.get(key).map(Value::is_number).unwrap_or(false)
}

fn str_in(raw: &Value, key: &str, allowed: &[&str]) -> bool {
    raw.get(key)
        .and_then(Value::as_str)
        .map(|s| allowed.contains(&s))
        .unwrap_or(false)
}
