use std::fmt::Debug;

use reqwest::{Client, Url, header::ACCEPT};

use crate::{Error, reference::DateRange, table::Table};

/// The EN data service export endpoint for US-hosted accounts.
pub const DEFAULT_EXPORT_URL: &str = "https://us.engagingnetworks.app/ea-dataservice/export.service";

/// The content types the export service may respond with.
const EXPORT_ACCEPT: &str =
    "text/html; charset=UTF-8, text/xml; charset=UTF-8, text/csv; charset=UTF-8";

/// A client for the EN data service export endpoint.
///
/// Each fetch is a single request for the whole date range. There is no retry
/// and no pagination.
#[derive(Clone)]
pub struct ExportClient {
    http: Client,
    endpoint: Url,
    token: String,
}

impl ExportClient {
    /// Create a client that sends `token` to the export service at `endpoint`.
    pub fn new(endpoint: Url, token: String) -> Self {
        Self {
            http: Client::new(),
            endpoint,
            token,
        }
    }

    /// Download the transactions between the start and end of `range`, inclusive.
    ///
    /// # Errors
    ///
    /// - [Error::ExportRequest] if the request could not be sent or the body could not be read.
    /// - [Error::ExportStatus] if the service responded with a non-2xx status.
    /// - [Error::InvalidExport] if the body is not valid CSV.
    pub async fn fetch(&self, range: &DateRange) -> Result<Table, Error> {
        let start_date = range.start_param()?;
        let end_date = range.end_param()?;

        tracing::info!("Fetching EN export from {} for {range}", self.endpoint);

        let response = self
            .http
            .get(self.endpoint.clone())
            .query(&[
                ("token", self.token.as_str()),
                ("startDate", start_date.as_str()),
                ("endDate", end_date.as_str()),
            ])
            .header(ACCEPT, EXPORT_ACCEPT)
            .send()
            .await
            .map_err(|error| Error::ExportRequest(describe_request_error(error)))?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!("EN export service responded with {status}");
            return Err(Error::ExportStatus(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|error| Error::ExportRequest(describe_request_error(error)))?;

        tracing::debug!("Received {} bytes from the EN export service", body.len());

        let table = Table::from_csv(&body).map_err(|error| match error {
            Error::InvalidCSV(reason) => Error::InvalidExport(reason),
            error => error,
        })?;

        tracing::info!("EN export contains {} rows", table.row_count());

        Ok(table)
    }
}

/// Describe a request error without the request URL, which contains the API token.
fn describe_request_error(error: reqwest::Error) -> String {
    error.without_url().to_string()
}

impl Debug for ExportClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("token", &"********")
            .finish()
    }
}
