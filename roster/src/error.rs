use thiserror::Error;

#[derive(Debug, Error)]
pub enum RosterError {
    #[error("no roster source is configured")]
    NotConfigured,

    #[error("spreadsheet URL does not contain a document id")]
    InvalidSheetUrl,

    #[error("'{0}' is not a valid column letter (expected A-Z)")]
    InvalidColumn(String),

    #[error("credentials did not match any account or roster row")]
    InvalidCredentials,

    /// Non-OK response from the spreadsheet endpoint — usually a private or
    /// deleted sheet. Surfaced with the status so the admin can act on it.
    #[error("spreadsheet endpoint returned HTTP {0}; check that the sheet is public")]
    HttpStatus(u16),

    #[error("network error: {0}")]
    Http(#[from] reqwest::Error),
}
