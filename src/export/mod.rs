//! Fetching transaction exports from the Engaging Networks data service.

mod client;

pub use client::{DEFAULT_EXPORT_URL, ExportClient};
