//! Proposal import from the configured spreadsheet.

use plenum_records::ProposalImportConfigRecord;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::csv::{cell, column_index, parse_rows};
use crate::error::RosterError;

/// One imported row, ready to be registered as a pending proposal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalDraft {
    pub title: String,
    pub axis: String,
    pub scope: String,
    pub region: String,
    pub municipality: String,
    pub description: String,
}

/// Map the configured columns over every data row. Rows without a title are
/// skipped — a spreadsheet's trailing half-filled rows are not proposals.
pub fn parse_proposals(
    csv_text: &str,
    config: &ProposalImportConfigRecord,
) -> Result<Vec<ProposalDraft>, RosterError> {
    let title_idx = column_index(&config.title_column)?;
    let axis_idx = column_index(&config.axis_column)?;
    let scope_idx = column_index(&config.scope_column)?;
    let region_idx = column_index(&config.region_column)?;
    let municipality_idx = column_index(&config.municipality_column)?;
    let description_idx = column_index(&config.description_column)?;

    let rows = parse_rows(csv_text);
    let total = rows.len();
    let drafts: Vec<ProposalDraft> = rows
        .into_iter()
        .filter_map(|row| {
            let title = cell(&row, title_idx)?;
            Some(ProposalDraft {
                title: title.to_string(),
                axis: cell(&row, axis_idx).unwrap_or_default().to_string(),
                scope: cell(&row, scope_idx).unwrap_or_default().to_string(),
                region: cell(&row, region_idx).unwrap_or_default().to_string(),
                municipality: cell(&row, municipality_idx).unwrap_or_default().to_string(),
                description: cell(&row, description_idx).unwrap_or_default().to_string(),
            })
        })
        .collect();

    if drafts.len() < total {
        warn!(skipped = total - drafts.len(), total, "skipped import rows without a title");
    }
    Ok(drafts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use plenum_types::{RecordId, Timestamp};

    fn config() -> ProposalImportConfigRecord {
        ProposalImportConfigRecord {
            id: RecordId::from("import_1"),
            sheet_url: "https://docs.google.com/spreadsheets/d/doc/edit".into(),
            sheet_name: "Proposals".into(),
            title_column: "A".into(),
            axis_column: "B".into(),
            scope_column: "C".into(),
            region_column: "D".into(),
            municipality_column: "E".into(),
            description_column: "F".into(),
            recorded_at: Timestamp::new(1),
        }
    }

    #[test]
    fn maps_configured_columns_onto_drafts() {
        let csv = "\
Title,Axis,Scope,Region,Municipality,Description
Expand clinics,Axis I,Municipal,North,Springfield,\"Open three, maybe four\"
,Axis II,State,,,half-filled row
More beds,Axis II,State,South,Shelbyville,More hospital beds
";
        let drafts = parse_proposals(csv, &config()).unwrap();
        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0].title, "Expand clinics");
        assert_eq!(drafts[0].description, "Open three, maybe four");
        assert_eq!(drafts[1].axis, "Axis II");
        assert_eq!(drafts[1].municipality, "Shelbyville");
    }

    #[test]
    fn bad_column_configuration_is_an_error() {
        let mut broken = config();
        broken.axis_column = "42".into();
        assert!(parse_proposals("Title\nX", &broken).is_err());
    }
}
