//! Defines the app level error type and conversions to rendered HTML pages and alerts.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{alert::Alert, internal_server_error::InternalServerError};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The session cookie is missing from the cookie jar in the request.
    #[error("no cookies in the cookie jar :(")]
    CookieMissing,

    /// The session cookie was present but its session has ended.
    #[error("the session has expired")]
    SessionExpired,

    /// There was an error formatting or parsing a date.
    ///
    /// Callers should pass in the original error as a string and the date
    /// string that caused the error.
    #[error("could not format date-time string \"{1}\": {0}")]
    InvalidDateFormat(String, String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// An error occurred while serializing or deserializing a struct as JSON.
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),

    /// The multipart form could not be parsed.
    #[error("Could not parse multipart form: {0}")]
    MultipartError(String),

    /// The uploaded file is not a CSV file.
    #[error("File is not a CSV")]
    NotCSV,

    /// The multipart form did not contain a file.
    #[error("No file was uploaded")]
    MissingFile,

    /// The uploaded CSV had issues that prevented it from being parsed.
    #[error("Could not parse the CSV file: {0}")]
    InvalidCSV(String),

    /// The merged table could not be written as CSV.
    #[error("Could not write the CSV file: {0}")]
    CsvWriteError(String),

    /// The uploaded CSV has no "Campaign Date" column.
    #[error("The uploaded CSV must include a 'Campaign Date' column.")]
    MissingCampaignDate,

    /// None of the values in the "Campaign Date" column could be parsed as a date.
    #[error("No valid dates found in 'Campaign Date' column.")]
    NoValidDates,

    /// The uploaded CSV or the EN export has no "EN Transaction ID" column.
    #[error("Both datasets must include an 'EN Transaction ID' column.")]
    MissingTransactionId,

    /// The EN export is missing a column needed to derive references.
    #[error("The EN export must include a '{0}' column.")]
    MissingExportColumn(String),

    /// The request to the EN export service could not be completed.
    #[error("Could not reach the EN export service: {0}")]
    ExportRequest(String),

    /// The EN export service responded with an unsuccessful status code.
    #[error("The EN export service responded with HTTP {0}")]
    ExportStatus(u16),

    /// The EN export service responded with a body that is not valid CSV.
    #[error("The EN export service sent an invalid CSV: {0}")]
    InvalidExport(String),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // Full page errors are not intended to show the details to the client.
        tracing::error!("An unexpected error occurred: {}", self);
        InternalServerError::default().into_response()
    }
}

impl Error {
    /// The status code and alert to show the user for this error.
    ///
    /// Internal errors are logged and replaced with a generic alert.
    pub fn into_alert(self) -> (StatusCode, Alert) {
        match self {
            Error::MissingCampaignDate
            | Error::NoValidDates
            | Error::MissingTransactionId
            | Error::MissingExportColumn(_) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Missing data".to_owned(),
                    details: self.to_string(),
                },
            ),
            Error::MissingFile => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "No file selected".to_owned(),
                    details: "Choose a CSV file to upload and try again.".to_owned(),
                },
            ),
            Error::NotCSV => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "File is not a CSV".to_owned(),
                    details: "Only CSV files (.csv) can be uploaded.".to_owned(),
                },
            ),
            Error::InvalidCSV(reason) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Could not read the CSV file".to_owned(),
                    details: reason,
                },
            ),
            Error::MultipartError(reason) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Could not read the upload".to_owned(),
                    details: reason,
                },
            ),
            Error::ExportRequest(_) | Error::ExportStatus(_) | Error::InvalidExport(_) => {
                tracing::error!("Fetching the EN export failed: {self}");

                (
                    StatusCode::BAD_GATEWAY,
                    Alert::Error {
                        message: "Error fetching EN data".to_owned(),
                        details: self.to_string(),
                    },
                )
            }
            error => {
                tracing::error!("An unexpected error occurred: {error}");

                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Alert::Error {
                        message: "Something went wrong".to_owned(),
                        details:
                            "An unexpected error occurred, check the server logs for more details."
                                .to_owned(),
                    },
                )
            }
        }
    }

    /// Convert the error into an HTTP response with an HTML alert.
    pub fn into_alert_response(self) -> Response {
        let (status_code, alert) = self.into_alert();

        (status_code, alert.into_html()).into_response()
    }
}
