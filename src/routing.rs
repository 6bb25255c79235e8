//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::StatusCode,
    middleware,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};

use crate::{
    AppState,
    auth::{auth_guard, auth_guard_hx, get_log_in_page, get_log_out, post_log_in},
    endpoints,
    internal_server_error::get_internal_server_error_page,
    not_found::get_404_not_found,
    reference::{get_merge_page, post_date_range, post_merge_download, post_merge_preview},
};

/// The largest CSV upload accepted by the merge routes.
pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::COFFEE, get(get_coffee))
        .route(endpoints::LOG_IN_VIEW, get(get_log_in_page))
        .route(endpoints::LOG_IN_API, post(post_log_in))
        .route(endpoints::LOG_OUT, get(get_log_out))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    // The download is a plain form submission, so it needs a normal redirect.
    let protected_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::MERGE_VIEW, get(get_merge_page))
        .route(endpoints::MERGE_DOWNLOAD, post(post_merge_download))
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    // These POST routes need to use the HX-REDIRECT header for auth redirects to work properly for HTMX requests.
    let protected_routes = protected_routes.merge(
        Router::new()
            .route(endpoints::MERGE_DATE_RANGE, post(post_date_range))
            .route(endpoints::MERGE_PREVIEW, post(post_merge_preview))
            .layer(middleware::from_fn_with_state(state.clone(), auth_guard_hx)),
    );

    protected_routes
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .merge(unprotected_routes)
        .fallback(get_404_not_found)
        .with_state(state)
}

/// Attempt to get a cup of coffee from the server.
async fn get_coffee() -> Response {
    (StatusCode::IM_A_TEAPOT, Html("I'm a teapot")).into_response()
}

/// The root path '/' redirects to the merge page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::MERGE_VIEW)
}

#[cfg(test)]
mod routing_tests {
    use axum::{http::StatusCode, response::IntoResponse};
    use axum_test::TestServer;

    use crate::{
        AppState, PasswordHash, build_router, endpoints, export::ExportClient,
        routing::get_index_page,
    };

    fn get_test_server() -> TestServer {
        let export_client = ExportClient::new(
            "http://127.0.0.1:9/export".parse().unwrap(),
            "token".to_owned(),
        );
        let state = AppState::new(
            "routing test secret",
            PasswordHash::new("letmein", 4).unwrap(),
            export_client,
        );

        TestServer::try_new(build_router(state)).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn root_redirects_to_merge_page() {
        let response = get_index_page().await.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let location = response.headers().get("location").unwrap();
        assert_eq!(location, endpoints::MERGE_VIEW);
    }

    #[tokio::test]
    async fn merge_page_requires_log_in() {
        let server = get_test_server();

        let response = server.get(endpoints::MERGE_VIEW).await;

        response.assert_status_see_other();
        assert_eq!(
            response.header("location"),
            format!("{}?redirect_url=%2Fmerge", endpoints::LOG_IN_VIEW)
        );
    }

    #[tokio::test]
    async fn log_in_unlocks_merge_page() {
        let server = get_test_server();

        let response = server
            .post(endpoints::LOG_IN_API)
            .form(&[("password", "letmein")])
            .await;
        response.assert_status_see_other();
        let session_cookie = response.cookie("session");

        let response = server
            .get(endpoints::MERGE_VIEW)
            .add_cookie(session_cookie)
            .await;

        response.assert_status_ok();
        response.assert_text_contains("merge-form");
    }

    #[tokio::test]
    async fn log_in_page_is_public() {
        let server = get_test_server();

        server.get(endpoints::LOG_IN_VIEW).await.assert_status_ok();
    }

    #[tokio::test]
    async fn coffee_is_a_teapot() {
        let server = get_test_server();

        server
            .get(endpoints::COFFEE)
            .await
            .assert_status(StatusCode::IM_A_TEAPOT);
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let server = get_test_server();

        server
            .get("/does/not/exist")
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn preview_without_session_sends_hx_redirect() {
        let server = get_test_server();

        let response = server
            .post(endpoints::MERGE_PREVIEW)
            .add_header("HX-Request", "true")
            .add_header("HX-Current-URL", "/merge")
            .await;

        response.assert_status_ok();
        assert_eq!(
            response.header("hx-redirect"),
            format!("{}?redirect_url=%2Fmerge", endpoints::LOG_IN_VIEW)
        );
    }
}
