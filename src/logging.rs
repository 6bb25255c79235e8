//! Middleware for logging requests and responses.
//!
//! Uploaded CSV files, merge previews and merged downloads hold donor data,
//! so only the size of those bodies is logged.

use axum::{
    body::{Body, Bytes},
    extract::Request,
    http::{HeaderMap, StatusCode, header::CONTENT_LENGTH, header::CONTENT_TYPE},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::endpoints;

/// Bodies longer than this many characters are truncated at the `info` level.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// The largest form body that will be buffered for logging.
const FORM_BODY_BYTE_LIMIT: usize = 64 * 1024;

/// Routes whose responses render uploaded rows, whatever their content type.
const PRIVATE_RESPONSE_PATHS: [&str; 2] = [endpoints::MERGE_PREVIEW, endpoints::MERGE_DOWNLOAD];

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If a logged body is longer than [LOG_BODY_LENGTH_LIMIT] characters, it is
/// truncated and the full body is logged at the `debug` level.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_owned();

    let request = match body_kind(request.headers()) {
        BodyKind::Form => {
            let (parts, body) = request.into_parts();
            let bytes = match axum::body::to_bytes(body, FORM_BODY_BYTE_LIMIT).await {
                Ok(bytes) => bytes,
                Err(error) => {
                    tracing::warn!("Could not read form body for {}: {error}", parts.uri);
                    return StatusCode::PAYLOAD_TOO_LARGE.into_response();
                }
            };

            let body_text = String::from_utf8_lossy(&bytes);
            let display_text = redact_field(&body_text, "password");
            log_body("Received request", &format!("{parts:#?}"), &display_text);

            Request::from_parts(parts, Body::from(bytes))
        }
        BodyKind::Text => {
            let (parts, body) = request.into_parts();
            let bytes = match axum::body::to_bytes(body, FORM_BODY_BYTE_LIMIT).await {
                Ok(bytes) => bytes,
                Err(error) => {
                    tracing::warn!("Could not read request body for {}: {error}", parts.uri);
                    return StatusCode::PAYLOAD_TOO_LARGE.into_response();
                }
            };

            log_body(
                "Received request",
                &format!("{parts:#?}"),
                &String::from_utf8_lossy(&bytes),
            );

            Request::from_parts(parts, Body::from(bytes))
        }
        BodyKind::Private => {
            tracing::info!(
                "Received request: {} {} with a {} body",
                request.method(),
                request.uri(),
                describe_size(request.headers())
            );
            request
        }
    };

    let response = next.run(request).await;

    match response_body_kind(&path, response.headers()) {
        BodyKind::Private => {
            tracing::info!(
                "Sending response: {} with a {} body",
                response.status(),
                describe_size(response.headers())
            );
            response
        }
        BodyKind::Form | BodyKind::Text => {
            let (parts, body) = response.into_parts();
            let bytes = match axum::body::to_bytes(body, usize::MAX).await {
                Ok(bytes) => bytes,
                Err(error) => {
                    tracing::error!("Could not read response body: {error}");
                    Bytes::new()
                }
            };

            log_body(
                "Sending response",
                &format!("{parts:#?}"),
                &String::from_utf8_lossy(&bytes),
            );

            Response::from_parts(parts, Body::from(bytes))
        }
    }
}

#[derive(Debug, PartialEq)]
enum BodyKind {
    /// URL encoded form data, which may contain the app password.
    Form,
    /// HTML, JSON or plain text that is safe to log.
    Text,
    /// Multipart uploads, CSV files and anything else that may hold donor data.
    Private,
}

fn body_kind(headers: &HeaderMap) -> BodyKind {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();

    if content_type.is_empty() {
        BodyKind::Text
    } else if content_type.starts_with("application/x-www-form-urlencoded") {
        BodyKind::Form
    } else if content_type.starts_with("text/html")
        || content_type.starts_with("text/plain")
        || content_type.starts_with("application/json")
    {
        BodyKind::Text
    } else {
        BodyKind::Private
    }
}

fn response_body_kind(request_path: &str, headers: &HeaderMap) -> BodyKind {
    if PRIVATE_RESPONSE_PATHS.iter().any(|path| *path == request_path) {
        BodyKind::Private
    } else {
        body_kind(headers)
    }
}

fn describe_size(headers: &HeaderMap) -> String {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .map_or_else(|| "streamed".to_owned(), |length| format!("{length} byte"))
}

fn redact_field(form_text: &str, field_name: &str) -> String {
    form_text
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((name, _)) if name == field_name => format!("{name}=********"),
            _ => pair.to_owned(),
        })
        .collect::<Vec<_>>()
        .join("&")
}

fn log_body(message: &str, head: &str, body: &str) {
    if body.chars().count() > LOG_BODY_LENGTH_LIMIT {
        let truncated: String = body.chars().take(LOG_BODY_LENGTH_LIMIT).collect();
        tracing::info!("{message}: {head}\nbody: {truncated}...");
        tracing::debug!("Full body: {body:?}");
    } else {
        tracing::info!("{message}: {head}\nbody: {body:?}");
    }
}
