//! Route handlers for the merge page and its upload endpoints.

use axum::{
    Extension,
    extract::{FromRef, Multipart, State, multipart::Field},
    http::{
        StatusCode,
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    },
    response::{IntoResponse, Response},
};

use crate::{
    AppState, Error,
    auth::Session,
    export::ExportClient,
    reference::{
        build_references,
        page::{DOWNLOAD_FILE_NAME, date_range_view, merge_result_view, merge_view},
        prepare_upload,
    },
};

/// The name of the multipart field holding the uploaded CSV.
const FILE_FIELD: &str = "file";

/// Content types browsers send for CSV files.
const CSV_CONTENT_TYPES: [&str; 2] = ["text/csv", "application/vnd.ms-excel"];

/// The state needed for merging EN references into an upload.
#[derive(Debug, Clone)]
pub struct MergeState {
    pub export_client: ExportClient,
}

impl FromRef<AppState> for MergeState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            export_client: state.export_client.clone(),
        }
    }
}

/// Route handler for the upload page.
pub async fn get_merge_page() -> Response {
    merge_view(None).into_response()
}

/// Route handler that reports the campaign date range of an uploaded CSV.
///
/// Used to check an upload as soon as it is chosen, before anything is fetched from EN.
pub async fn post_date_range(multipart: Multipart) -> Response {
    let upload = match read_uploaded_csv(multipart).await {
        Ok(bytes) => prepare_upload(&bytes),
        Err(error) => Err(error),
    };

    match upload {
        Ok(upload) => date_range_view(&upload.date_range, upload.table.row_count()).into_response(),
        Err(error) => error.into_alert_response(),
    }
}

/// Route handler that merges EN references into the upload and renders a preview.
pub async fn post_merge_preview(
    State(state): State<MergeState>,
    Extension(session): Extension<Session>,
    multipart: Multipart,
) -> Response {
    tracing::debug!("Merge preview requested by session started {}", session.started_at);

    let bytes = match read_uploaded_csv(multipart).await {
        Ok(bytes) => bytes,
        Err(error) => return error.into_alert_response(),
    };

    match build_references(&bytes, &state.export_client).await {
        Ok(result) => merge_result_view(&result).into_response(),
        Err(error) => error.into_alert_response(),
    }
}

/// Route handler that merges EN references into the upload and responds with the merged CSV.
///
/// On failure the upload page is rendered again with an alert describing the error.
pub async fn post_merge_download(
    State(state): State<MergeState>,
    Extension(session): Extension<Session>,
    multipart: Multipart,
) -> Response {
    tracing::debug!("Merge download requested by session started {}", session.started_at);

    let csv = match read_uploaded_csv(multipart).await {
        Ok(bytes) => build_references(&bytes, &state.export_client)
            .await
            .and_then(|result| result.table.to_csv()),
        Err(error) => Err(error),
    };

    match csv {
        Ok(csv) => (
            StatusCode::OK,
            [
                (CONTENT_TYPE, "text/csv; charset=utf-8".to_owned()),
                (
                    CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{DOWNLOAD_FILE_NAME}\""),
                ),
            ],
            csv,
        )
            .into_response(),
        Err(error) => {
            let (status_code, alert) = error.into_alert();

            (status_code, merge_view(Some(alert.into_markup()))).into_response()
        }
    }
}

/// Read the bytes of the CSV file in the `file` field of `multipart`.
///
/// # Errors
///
/// - [Error::MultipartError] if the form could not be read.
/// - [Error::MissingFile] if no file was chosen.
/// - [Error::NotCSV] if the file is not a CSV file.
async fn read_uploaded_csv(mut multipart: Multipart) -> Result<Vec<u8>, Error> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|error| Error::MultipartError(error.body_text()))?
    {
        if field.name() == Some(FILE_FIELD) {
            return read_csv_field(field).await;
        }
    }

    Err(Error::MissingFile)
}

async fn read_csv_field(field: Field<'_>) -> Result<Vec<u8>, Error> {
    let file_name = field.file_name().unwrap_or_default().to_owned();

    if file_name.is_empty() {
        return Err(Error::MissingFile);
    }

    let is_csv = field
        .content_type()
        .is_some_and(|content_type| CSV_CONTENT_TYPES.contains(&content_type))
        || file_name.to_lowercase().ends_with(".csv");

    if !is_csv {
        tracing::debug!(
            "Rejected upload '{file_name}' with content type {:?}",
            field.content_type()
        );
        return Err(Error::NotCSV);
    }

    let data = field.bytes().await.map_err(|error| {
        tracing::error!("Could not read data from multipart form field: {error}");
        Error::MultipartError("Could not read data from multipart form field.".to_owned())
    })?;

    tracing::debug!("Received file '{}' that is {} bytes", file_name, data.len());

    Ok(data.to_vec())
}
