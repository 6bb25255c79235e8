//! The route URIs for the pages and the API.

/// The root route which redirects to the merge page or log in page.
pub const ROOT: &str = "/";
/// The page with the upload form for adding references to a CSV.
pub const MERGE_VIEW: &str = "/merge";
/// The route for getting the log in page.
pub const LOG_IN_VIEW: &str = "/log_in";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";

/// The route to request a cup of coffee (experimental).
pub const COFFEE: &str = "/api/coffee";
/// The route for logging in with the app password.
pub const LOG_IN_API: &str = "/api/log_in";
/// The route for the client to end the current session.
pub const LOG_OUT: &str = "/api/log_out";
/// The route that reports the Campaign Date range of an uploaded CSV.
pub const MERGE_DATE_RANGE: &str = "/api/merge/date_range";
/// The route that runs the merge and returns a preview of the result.
pub const MERGE_PREVIEW: &str = "/api/merge/preview";
/// The route that runs the merge and returns the result as a CSV download.
pub const MERGE_DOWNLOAD: &str = "/api/merge/download";
