//! EN Reference Builder is a small web app that adds honor/memorial
//! references from Engaging Networks to a transaction report.
//!
//! A user uploads a CSV export of transactions, the app downloads the
//! matching Engaging Networks transactions for the same Campaign Date range,
//! builds a `Reference` for each tribute gift and joins it back onto the
//! upload by transaction ID. The pages are served as HTML with htmx.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod alert;
mod app_state;
mod auth;
mod endpoints;
mod error;
mod export;
mod html;
mod internal_server_error;
mod logging;
mod navigation;
mod not_found;
mod reference;
mod routing;
mod table;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use auth::PasswordHash;
pub use error::Error;
pub use export::{DEFAULT_EXPORT_URL, ExportClient};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::error!("Failed to install terminate signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}
