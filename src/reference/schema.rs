//! The columns the uploaded CSV and the EN export must provide.

use crate::{Error, table::Table};

pub const CAMPAIGN_DATE: &str = "Campaign Date";
pub const TRANSACTION_ID: &str = "EN Transaction ID";
pub const CAMPAIGN_TYPE: &str = "Campaign Type";
pub const CAMPAIGN_DATA_9: &str = "Campaign Data 9";
pub const CAMPAIGN_DATA_11: &str = "Campaign Data 11";
pub const REFERENCE: &str = "Reference";

/// Required columns of the user's CSV, in the order they are checked.
pub const UPLOAD_SCHEMA: &[&str] = &[CAMPAIGN_DATE, TRANSACTION_ID];

/// Required columns of the EN export.
pub const EXPORT_SCHEMA: &[&str] = &[
    CAMPAIGN_TYPE,
    CAMPAIGN_DATA_9,
    CAMPAIGN_DATA_11,
    TRANSACTION_ID,
];

/// Where a table came from, which decides the required columns and the error
/// reported when one is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Upload,
    Export,
}

impl TableKind {
    fn required_columns(self) -> &'static [&'static str] {
        match self {
            TableKind::Upload => UPLOAD_SCHEMA,
            TableKind::Export => EXPORT_SCHEMA,
        }
    }
}

/// Check that `table` has every column required for `kind`.
///
/// # Errors
///
/// Returns the error for the first missing column:
/// - [Error::MissingCampaignDate] if the upload has no "Campaign Date" column.
/// - [Error::MissingTransactionId] if either table has no "EN Transaction ID" column.
/// - [Error::MissingExportColumn] for any other column missing from the export.
pub fn check_schema(table: &Table, kind: TableKind) -> Result<(), Error> {
    for column in kind.required_columns() {
        require_column(table, kind, column)?;
    }

    Ok(())
}

/// The index of `column` in `table`, or the error [check_schema] would report for it.
pub fn require_column(table: &Table, kind: TableKind, column: &str) -> Result<usize, Error> {
    table
        .column_index(column)
        .ok_or_else(|| missing_column_error(kind, column))
}

fn missing_column_error(kind: TableKind, column: &str) -> Error {
    match (kind, column) {
        (_, TRANSACTION_ID) => Error::MissingTransactionId,
        (TableKind::Upload, CAMPAIGN_DATE) => Error::MissingCampaignDate,
        (_, column) => Error::MissingExportColumn(column.to_owned()),
    }
}

/// Whether `header` is an artifact of a spreadsheet or dataframe index column,
/// e.g. an empty header or "Unnamed: 0".
pub fn is_unnamed_column(header: &str) -> bool {
    header.trim().is_empty() || header.starts_with("Unnamed")
}
