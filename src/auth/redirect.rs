//! Helpers for the page to return to after logging in.

use axum::{extract::Request, http::Uri};

use crate::endpoints;

/// Only paths on this site are followed, and never back to the log-in page.
fn is_safe_redirect_url(redirect_url: &str) -> bool {
    if !redirect_url.starts_with('/') || redirect_url.starts_with("//") {
        return false;
    }

    let path = redirect_url
        .split_once('?')
        .map_or(redirect_url, |(path, _)| path);

    path != endpoints::LOG_IN_VIEW
}

/// The path and query of `raw_url` if it is a safe place to send the user after logging in.
///
/// Absolute URLs are rejected unless `allow_absolute` is set, in which case
/// only their path and query are kept.
fn normalize(raw_url: &str, allow_absolute: bool) -> Option<String> {
    let uri = raw_url.parse::<Uri>().ok()?;
    if !allow_absolute && (uri.scheme().is_some() || uri.authority().is_some()) {
        return None;
    }
    let path_and_query = uri.path_and_query()?.as_str();

    is_safe_redirect_url(path_and_query).then(|| path_and_query.to_owned())
}

/// Validate a redirect URL submitted by the client.
pub fn normalize_redirect_url(raw_url: &str) -> Option<String> {
    normalize(raw_url, false)
}

/// The log-in page URL that returns to the page `request` was made from.
///
/// For htmx requests to the API the page is taken from the `HX-Current-URL`
/// header, otherwise it is the request URI.
pub fn build_log_in_redirect_url(request: &Request) -> Option<String> {
    let redirect_target = if request.uri().path().starts_with("/api") {
        redirect_target_from_hx_request(request)?
    } else {
        normalize_redirect_url(request.uri().path_and_query()?.as_str())?
    };

    build_log_in_redirect_url_from_target(&redirect_target)
}

pub fn build_log_in_redirect_url_from_target(redirect_target: &str) -> Option<String> {
    match serde_urlencoded::to_string([("redirect_url", redirect_target)]) {
        Ok(param) => Some(format!("{}?{}", endpoints::LOG_IN_VIEW, param)),
        Err(error) => {
            tracing::error!("Could not encode redirect URL {redirect_target}: {error}");
            None
        }
    }
}

fn redirect_target_from_hx_request(request: &Request) -> Option<String> {
    let headers = request.headers();
    let is_hx_request = headers
        .get("hx-request")
        .and_then(|header| header.to_str().ok())
        .is_some_and(|header| header.eq_ignore_ascii_case("true"));

    if !is_hx_request {
        return None;
    }

    let current_url = headers
        .get("hx-current-url")
        .and_then(|header| header.to_str().ok())?;

    let redirect_url = normalize(current_url, true);
    if redirect_url.is_none() {
        tracing::warn!("Invalid HX-Current-URL header value: {current_url}");
    }

    redirect_url
}

#[cfg(test)]
mod redirect_tests {
    use axum::{body::Body, extract::Request};

    use crate::{
        auth::redirect::{build_log_in_redirect_url, normalize_redirect_url},
        endpoints,
    };

    #[test]
    fn accepts_local_paths() {
        assert_eq!(
            normalize_redirect_url("/merge?x=1"),
            Some("/merge?x=1".to_owned())
        );
    }

    #[test]
    fn rejects_external_and_log_in_urls() {
        assert_eq!(normalize_redirect_url("https://example.com/merge"), None);
        assert_eq!(normalize_redirect_url("//example.com"), None);
        assert_eq!(normalize_redirect_url(endpoints::LOG_IN_VIEW), None);
        assert_eq!(normalize_redirect_url("merge"), None);
    }

    #[test]
    fn hx_request_returns_to_current_page() {
        let request = Request::builder()
            .uri(endpoints::MERGE_PREVIEW)
            .header("HX-Request", "true")
            .header("HX-Current-URL", "https://refs.example.org/merge")
            .body(Body::empty())
            .unwrap();

        let url = build_log_in_redirect_url(&request);

        assert_eq!(url, Some(format!("{}?redirect_url=%2Fmerge", endpoints::LOG_IN_VIEW)));
    }

    #[test]
    fn plain_api_request_has_no_redirect_target() {
        let request = Request::builder()
            .method("POST")
            .uri(endpoints::MERGE_DOWNLOAD)
            .body(Body::empty())
            .unwrap();

        assert_eq!(build_log_in_redirect_url(&request), None);
    }
}
