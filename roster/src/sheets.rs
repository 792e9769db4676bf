//! Published-spreadsheet CSV transport.

use std::time::Duration;

use plenum_types::Timestamp;
use tracing::debug;

use crate::error::RosterError;

/// Finite request timeout — a hung spreadsheet endpoint must surface as a
/// failure, never as an indefinitely pending operation.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const FETCH_RANGE: &str = "A1:Z1000";

/// Extract the document id from a spreadsheet URL
/// (`…/spreadsheets/d/<id>/…`).
pub fn extract_sheet_id(url: &str) -> Option<String> {
    let marker = "/spreadsheets/d/";
    let start = url.find(marker)? + marker.len();
    let id: String = url[start..]
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    if id.is_empty() {
        None
    } else {
        Some(id)
    }
}

/// Build the CSV export URL for one sheet of a published document. The final
/// parameter busts caches so every device sees the current roster.
pub fn csv_export_url(sheet_id: &str, sheet_name: &str) -> String {
    format!(
        "https://docs.google.com/spreadsheets/d/{}/gviz/tq?tqx=out:csv&sheet={}&range={}&_={}",
        sheet_id,
        urlencoding::encode(sheet_name),
        urlencoding::encode(FETCH_RANGE),
        Timestamp::now().as_millis(),
    )
}

/// HTTP client for spreadsheet CSV fetches.
pub struct SheetClient {
    http: reqwest::Client,
}

impl SheetClient {
    pub fn new() -> Result<Self, RosterError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { http })
    }

    /// Fetch one sheet as CSV text.
    ///
    /// Non-OK statuses are surfaced with the status code — the usual cause
    /// is a sheet that was never published publicly.
    pub async fn fetch_csv(&self, sheet_url: &str, sheet_name: &str) -> Result<String, RosterError> {
        let sheet_id = extract_sheet_id(sheet_url).ok_or(RosterError::InvalidSheetUrl)?;
        let url = csv_export_url(&sheet_id, sheet_name);
        debug!(%sheet_id, sheet_name, "fetching roster CSV");

        let response = self.http.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(RosterError::HttpStatus(response.status().as_u16()));
        }
        Ok(response.text().await?)
    }
}
