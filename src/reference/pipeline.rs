//! The steps from an uploaded CSV to a merged table, in order.

use crate::{
    Error,
    export::ExportClient,
    reference::{
        dates::{DateRange, parse_campaign_date},
        merge::merge_references,
        schema::{CAMPAIGN_DATE, TableKind, check_schema, is_unnamed_column, require_column},
    },
    table::Table,
};

/// An uploaded table that has passed validation, with the span of its campaign dates.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedUpload {
    pub table: Table,
    pub date_range: DateRange,
}

/// The outcome of merging references into an upload.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeResult {
    pub table: Table,
    pub date_range: DateRange,
    pub matched_rows: usize,
}

/// Parse and validate an uploaded CSV without contacting EN.
///
/// Index-column artifacts are dropped. Campaign dates that cannot be parsed
/// are ignored for the date range and left as they are in the table.
///
/// # Errors
///
/// - [Error::InvalidCSV] if `bytes` is not a CSV file.
/// - [Error::MissingCampaignDate] or [Error::MissingTransactionId] if a required column is missing.
/// - [Error::NoValidDates] if no campaign date could be parsed.
pub fn prepare_upload(bytes: &[u8]) -> Result<PreparedUpload, Error> {
    let mut table = Table::from_csv(bytes)?;
    table.retain_columns(|header| !is_unnamed_column(header));

    check_schema(&table, TableKind::Upload)?;

    let date_index = require_column(&table, TableKind::Upload, CAMPAIGN_DATE)?;
    let date_range = DateRange::spanning(table.column_values(date_index).filter_map(parse_campaign_date))
        .ok_or(Error::NoValidDates)?;

    tracing::debug!(
        "Upload has {} rows with campaign dates spanning {date_range}",
        table.row_count()
    );

    Ok(PreparedUpload { table, date_range })
}

/// Fetch the EN export for the upload's date range and merge its references into the upload.
///
/// # Errors
///
/// Returns the fetch error if the export could not be downloaded, or a
/// missing column error if the export lacks a required column.
pub async fn fetch_and_merge(
    upload: PreparedUpload,
    client: &ExportClient,
) -> Result<MergeResult, Error> {
    let PreparedUpload { table, date_range } = upload;

    let export = client.fetch(&date_range).await?;
    check_schema(&export, TableKind::Export)?;

    let outcome = merge_references(table, &export)?;

    tracing::info!(
        "Matched {} of {} uploaded rows to an EN reference",
        outcome.matched_rows,
        outcome.table.row_count()
    );

    Ok(MergeResult {
        table: outcome.table,
        date_range,
        matched_rows: outcome.matched_rows,
    })
}

/// Run every step, from the uploaded bytes to the merged table.
///
/// The upload is fully validated before EN is contacted.
pub async fn build_references(bytes: &[u8], client: &ExportClient) -> Result<MergeResult, Error> {
    let upload = prepare_upload(bytes)?;

    fetch_and_merge(upload, client).await
}
