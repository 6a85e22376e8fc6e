//! API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Routes are nested under `/api/`.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::mailer::MailTransport;

/// Build the API router around a database connection and mail transport.
pub fn api_router(conn: rusqlite::Connection, mailer: Arc<dyn MailTransport>) -> Router {
    build_router(ApiContext::new(conn, mailer))
}

/// Build router from a pre-constructed `ApiContext`. Used by integration
/// tests that need to reach into the shared context.
#[cfg(test)]
pub(crate) fn api_router_with_ctx(ctx: ApiContext) -> Router {
    build_router(ctx)
}

fn build_router(ctx: ApiContext) -> Router {
    // Protected routes — bearer token required.
    //
    // Layers apply bottom (innermost) to top (outermost):
    //   Extension (outermost) → Auth → Handler
    //
    // Extension must be outermost so the auth middleware can extract
    // ApiContext; handlers take it via `State` through .with_state().
    //
    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let protected = Router::new()
        .route(
            "/patients",
            get(endpoints::patients::list).post(endpoints::patients::create),
        )
        .route(
            "/patients/:id",
            get(endpoints::patients::get)
                .put(endpoints::patients::update)
                .delete(endpoints::patients::delete),
        )
        .route(
            "/patients/:id/send-results",
            post(endpoints::patients::send_results),
        )
        .route(
            "/tests",
            get(endpoints::lab_tests::list).post(endpoints::lab_tests::create),
        )
        .route(
            "/tests/:id",
            get(endpoints::lab_tests::get)
                .put(endpoints::lab_tests::update)
                .delete(endpoints::lab_tests::delete),
        )
        .route(
            "/tests/:id/send-to-doctor",
            post(endpoints::lab_tests::send_to_doctor),
        )
        .route(
            "/tests/:id/assign-to-doctor",
            post(endpoints::lab_tests::assign_to_doctor),
        )
        .route(
            "/test-results",
            get(endpoints::test_results::list).post(endpoints::test_results::create),
        )
        .route(
            "/test-results/:id",
            get(endpoints::test_results::get)
                .put(endpoints::test_results::update)
                .delete(endpoints::test_results::delete),
        )
        .route("/doctor/inbox", get(endpoints::doctor::get_inbox))
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::auth::require_auth))
        // Extension must be outermost so middleware can extract ApiContext
        .layer(axum::Extension(ctx.clone()));

    // Unprotected routes (no token required)
    let unprotected = Router::new()
        .route("/health", get(endpoints::health::health))
        .route("/auth/register", post(endpoints::auth::register))
        .route("/auth/login", post(endpoints::auth::login))
        .with_state(ctx.clone())
        .layer(axum::Extension(ctx));

    Router::new()
        .nest("/api", protected)
        .nest("/api", unprotected)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
