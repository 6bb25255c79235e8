//! Deriving honor/memorial references from the EN export and joining them
//! onto the uploaded transactions.

use std::collections::HashMap;

use crate::{
    Error,
    reference::schema::{
        CAMPAIGN_DATA_9, CAMPAIGN_DATA_11, CAMPAIGN_TYPE, REFERENCE, TRANSACTION_ID, TableKind,
        require_column,
    },
    table::Table,
};

/// Campaign types whose transactions carry an honoree name and code.
pub const REFERENCE_CAMPAIGN_TYPES: [&str; 2] = ["FIM", "PFIM"];

/// Header given to a pre-existing "Reference" column in the upload.
const UPLOADED_REFERENCE: &str = "Reference_x";
/// Header given to the joined column when the upload already has a "Reference" column.
const JOINED_REFERENCE: &str = "Reference_y";

/// The uploaded table with references joined on, and how many rows received a
/// non-empty reference.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    pub table: Table,
    pub matched_rows: usize,
}

/// Build the reference label for an honoree name and code.
///
/// The name is lowercased and joined to the code with a single space; both are
/// otherwise kept exactly as exported. Returns `None` when there is no name.
pub fn derive_reference(name: &str, code: &str) -> Option<String> {
    if name.is_empty() {
        return None;
    }

    Some(format!("{} {}", name.to_lowercase(), code))
}

/// Normalize a transaction ID for matching.
///
/// Surrounding whitespace is removed, and an integral ID written with a zero
/// fraction (e.g. "1001.0", as spreadsheet tools tend to do) is written as an integer.
pub fn normalize_transaction_id(id: &str) -> String {
    let id = id.trim();

    if let Some((integer, fraction)) = id.split_once('.')
        && !integer.is_empty()
        && integer.bytes().all(|byte| byte.is_ascii_digit())
        && !fraction.is_empty()
        && fraction.bytes().all(|byte| byte == b'0')
    {
        return integer.to_owned();
    }

    id.to_owned()
}

/// Map each FIM/PFIM transaction ID in `export` to its reference.
///
/// Rows with any other campaign type are ignored. When an ID appears more than
/// once, the last row wins. An ID whose row has no honoree name maps to an empty
/// reference.
///
/// # Errors
///
/// Returns an error if `export` is missing any of the export columns.
pub fn collect_references(export: &Table) -> Result<HashMap<String, String>, Error> {
    let type_index = require_column(export, TableKind::Export, CAMPAIGN_TYPE)?;
    let name_index = require_column(export, TableKind::Export, CAMPAIGN_DATA_9)?;
    let code_index = require_column(export, TableKind::Export, CAMPAIGN_DATA_11)?;
    let id_index = require_column(export, TableKind::Export, TRANSACTION_ID)?;

    let mut filtered = export.clone();
    filtered.retain_rows(|row| REFERENCE_CAMPAIGN_TYPES.contains(&row[type_index].as_str()));

    tracing::debug!(
        "{} of {} exported rows have a reference campaign type",
        filtered.row_count(),
        export.row_count()
    );

    let references = filtered
        .rows()
        .iter()
        .map(|row| {
            let reference =
                derive_reference(&row[name_index], &row[code_index]).unwrap_or_default();
            (normalize_transaction_id(&row[id_index]), reference)
        })
        .collect();

    Ok(references)
}

/// Left join the references derived from `export` onto `upload` by transaction ID.
///
/// The transaction ID column of the upload is normalized in the output. Every
/// uploaded row is kept, in order; rows without a match get an empty reference.
///
/// # Errors
///
/// Returns an error if either table lacks a column the join reads. The full
/// schemas are checked once, when the upload is prepared and when the export
/// is fetched.
pub fn merge_references(mut upload: Table, export: &Table) -> Result<MergeOutcome, Error> {
    let references = collect_references(export)?;

    let id_index = require_column(&upload, TableKind::Upload, TRANSACTION_ID)?;
    upload.map_column(id_index, normalize_transaction_id);

    let mut matched_rows = 0;
    let joined: Vec<String> = upload
        .column_values(id_index)
        .map(|id| match references.get(id) {
            Some(reference) if !reference.is_empty() => {
                matched_rows += 1;
                reference.clone()
            }
            _ => String::new(),
        })
        .collect();

    match upload.column_index(REFERENCE) {
        Some(existing_index) => {
            tracing::info!(
                "Upload already has a \"{REFERENCE}\" column, keeping it as \"{UPLOADED_REFERENCE}\""
            );
            upload.rename_column(existing_index, UPLOADED_REFERENCE);
            upload.push_column(JOINED_REFERENCE, joined)?;
        }
        None => upload.push_column(REFERENCE, joined)?,
    }

    Ok(MergeOutcome {
        table: upload,
        matched_rows,
    })
}

#[cfg(test)]
mod merge_tests {
    use crate::{
        Error,
        reference::merge::{
            collect_references, derive_reference, merge_references, normalize_transaction_id,
        },
        table::Table,
    };

    fn table(csv: &str) -> Table {
        Table::from_csv(csv.as_bytes()).unwrap()
    }

    fn column<'a>(table: &'a Table, name: &str) -> Vec<&'a str> {
        let index = table
            .column_index(name)
            .unwrap_or_else(|| panic!("no column named {name}"));
        table.column_values(index).collect()
    }

    const EXPORT_HEADER: &str = "EN Transaction ID,Campaign Type,Campaign Data 9,Campaign Data 11\n";

    #[test]
    fn derives_lowercase_name_and_code() {
        assert_eq!(derive_reference("Smith", "42"), Some("smith 42".to_owned()));
        assert_eq!(
            derive_reference("Ana MARÍA", "7"),
            Some("ana maría 7".to_owned())
        );
    }

    #[test]
    fn no_reference_without_a_name() {
        assert_eq!(derive_reference("", "42"), None);
    }

    #[test]
    fn reference_without_a_code_keeps_the_separator() {
        assert_eq!(derive_reference("Smith", ""), Some("smith ".to_owned()));
    }

    #[test]
    fn reference_keeps_padding_from_the_export() {
        assert_eq!(derive_reference("Smith ", "42"), Some("smith  42".to_owned()));
        assert_eq!(derive_reference("Smith", " 42"), Some("smith  42".to_owned()));
    }

    #[test]
    fn normalizes_whitespace_and_zero_fractions() {
        assert_eq!(normalize_transaction_id(" 1001 "), "1001");
        assert_eq!(normalize_transaction_id("1001.0"), "1001");
        assert_eq!(normalize_transaction_id("1001.00"), "1001");
        assert_eq!(normalize_transaction_id("1001.5"), "1001.5");
        assert_eq!(normalize_transaction_id("A-1001"), "A-1001");
        assert_eq!(normalize_transaction_id(".0"), ".0");
        assert_eq!(normalize_transaction_id("abc"), "abc");
    }

    #[test]
    fn only_fim_and_pfim_rows_contribute() {
        let export = table(&format!(
            "{EXPORT_HEADER}1,FIM,Smith,42\n2,PFIM,Jones,7\n3,DON,Brown,9\n4,fim,Lower,1\n"
        ));

        let references = collect_references(&export).unwrap();

        assert_eq!(references.len(), 2);
        assert_eq!(references["1"], "smith 42");
        assert_eq!(references["2"], "jones 7");
    }

    #[test]
    fn last_duplicate_wins() {
        let export = table(&format!(
            "{EXPORT_HEADER}1001,FIM,First,1\n1001,DON,Ignored,2\n1001,PFIM,Last,3\n"
        ));

        let references = collect_references(&export).unwrap();

        assert_eq!(references["1001"], "last 3");
    }

    #[test]
    fn merges_matching_reference_and_leaves_others_empty() {
        let upload = table(
            "EN Transaction ID,Campaign Date,Amount\n1001,2024-01-02,10\n1002,2024-01-03,20\n",
        );
        let export = table(&format!("{EXPORT_HEADER}1001,FIM,Smith,42\n"));

        let outcome = merge_references(upload, &export).unwrap();

        assert_eq!(
            outcome.table.headers(),
            ["EN Transaction ID", "Campaign Date", "Amount", "Reference"]
        );
        assert_eq!(column(&outcome.table, "Reference"), ["smith 42", ""]);
        assert_eq!(outcome.matched_rows, 1);
    }

    #[test]
    fn preserves_row_count_and_order() {
        let upload = table(
            "EN Transaction ID,Campaign Date\n3,2024-01-01\n1,2024-01-01\n3,2024-01-02\n9,\n2,x\n",
        );
        let export = table(&format!(
            "{EXPORT_HEADER}1,FIM,One,1\n2,FIM,Two,2\n3,PFIM,Three,3\n3,FIM,Three,33\n"
        ));

        let outcome = merge_references(upload, &export).unwrap();

        assert_eq!(outcome.table.row_count(), 5);
        assert_eq!(
            column(&outcome.table, "EN Transaction ID"),
            ["3", "1", "3", "9", "2"]
        );
        assert_eq!(
            column(&outcome.table, "Reference"),
            ["three 33", "one 1", "three 33", "", "two 2"]
        );
        assert_eq!(outcome.matched_rows, 4);
    }

    #[test]
    fn matches_ids_despite_whitespace_and_numeric_formatting() {
        let upload = table("EN Transaction ID,Campaign Date\n\" 123 \",2024-01-01\n456.0,2024-01-01\n");
        let export = table(&format!("{EXPORT_HEADER}123,FIM,A,1\n 456,FIM,B,2\n"));

        let outcome = merge_references(upload, &export).unwrap();

        assert_eq!(column(&outcome.table, "EN Transaction ID"), ["123", "456"]);
        assert_eq!(column(&outcome.table, "Reference"), ["a 1", "b 2"]);
    }

    #[test]
    fn matching_is_case_sensitive() {
        let upload = table("EN Transaction ID,Campaign Date\nabc,2024-01-01\n");
        let export = table(&format!("{EXPORT_HEADER}ABC,FIM,A,1\n"));

        let outcome = merge_references(upload, &export).unwrap();

        assert_eq!(column(&outcome.table, "Reference"), [""]);
        assert_eq!(outcome.matched_rows, 0);
    }

    #[test]
    fn existing_reference_column_is_not_overwritten() {
        let upload = table(
            "EN Transaction ID,Campaign Date,Reference\n1001,2024-01-02,smith 42\n1002,2024-01-03,\n",
        );
        let export = table(&format!("{EXPORT_HEADER}1002,FIM,Jones,7\n"));

        let outcome = merge_references(upload, &export).unwrap();

        assert_eq!(column(&outcome.table, "Reference_x"), ["smith 42", ""]);
        assert_eq!(column(&outcome.table, "Reference_y"), ["", "jones 7"]);
        assert_eq!(outcome.table.column_index("Reference"), None);
    }

    #[test]
    fn empty_export_leaves_every_reference_empty() {
        let upload = table("EN Transaction ID,Campaign Date\n1,2024-01-01\n2,2024-01-01\n");
        let export = table(EXPORT_HEADER);

        let outcome = merge_references(upload, &export).unwrap();

        assert_eq!(column(&outcome.table, "Reference"), ["", ""]);
    }

    #[test]
    fn export_without_transaction_id_is_rejected() {
        let upload = table("EN Transaction ID,Campaign Date\n1,2024-01-01\n");
        let export = table("Campaign Type,Campaign Data 9,Campaign Data 11\nFIM,Smith,42\n");

        let result = merge_references(upload, &export);

        assert_eq!(result, Err(Error::MissingTransactionId));
    }

    #[test]
    fn join_only_reads_the_transaction_id_of_the_upload() {
        let upload = table("EN Transaction ID,Amount\n1001,10\n");
        let export = table(&format!("{EXPORT_HEADER}1001,FIM,Smith,42\n"));

        let outcome = merge_references(upload, &export).unwrap();

        assert_eq!(column(&outcome.table, "Reference"), ["smith 42"]);
    }

    #[test]
    fn upload_without_transaction_id_is_rejected() {
        let upload = table("Campaign Date\n2024-01-01\n");
        let export = table(&format!("{EXPORT_HEADER}1001,FIM,Smith,42\n"));

        let result = merge_references(upload, &export);

        assert_eq!(result, Err(Error::MissingTransactionId));
    }
}
