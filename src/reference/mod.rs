//! Adding EN honor/memorial references to an uploaded transactions CSV.
//!
//! The pipeline validates the upload, works out the span of its campaign
//! dates, downloads the EN export for that span and left joins a `Reference`
//! column onto the upload by transaction ID.

mod dates;
mod endpoint;
mod merge;
mod page;
mod pipeline;
mod schema;

pub use dates::DateRange;
pub use endpoint::{get_merge_page, post_date_range, post_merge_download, post_merge_preview};
pub use pipeline::{MergeResult, build_references, prepare_upload};
