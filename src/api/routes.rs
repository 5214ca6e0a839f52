//! Router configuration for the API.
//!
//! Centralized route registration and middleware wiring. Route groups carry
//! their own role guards; this module decides which groups sit behind the
//! authentication middleware and stacks the cross-cutting layers.

use axum::{Router, extract::DefaultBodyLimit, middleware};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::doc::ApiDoc;
use crate::api::handlers;
use crate::api::middleware::{
    auth_middleware, error_response_middleware, logging_middleware, request_id_middleware,
};
use crate::state::AppState;

/// Creates the main application router with all routes and middleware.
///
/// Route groups:
/// - `/api/auth`   - Registration, login, token refresh (public)
/// - `/api/users`  - Account management (authenticated; role guards per group)
/// - `/health`     - Probes, outside the versioned API surface
/// - `/swagger-ui` - Interactive documentation backed by the OpenAPI document
///
/// Middleware runs outermost-first: request ID, request logging, CORS,
/// compression, then error-body shaping right above the routes so it sees
/// uncompressed responses.
pub fn create_router(state: AppState) -> Router {
    let protected = OpenApiRouter::new()
        .nest("/api/users", handlers::me::me_routes())
        .nest("/api/users", handlers::users::user_routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let (api_router, api_doc) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .nest("/api/auth", handlers::auth::auth_routes())
        .merge(protected)
        .split_for_parts();

    // Multipart framing adds overhead on top of the blob itself.
    let upload_limit = state.services.files.max_upload_size() as usize + 64 * 1024;

    Router::new()
        .merge(api_router)
        .merge(handlers::health::health_routes())
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api_doc))
        .layer(DefaultBodyLimit::max(upload_limit))
        .layer(middleware::from_fn(error_response_middleware))
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel_async::AsyncPgConnection;
    use diesel_async::pooled_connection::AsyncDieselConnectionManager;
    use diesel_async::pooled_connection::bb8::Pool;

    use crate::config::{JwtConfig, StorageConfig};

    /// Builds a state around a pool that never connects; wiring the router
    /// does not touch the database.
    async fn unconnected_state() -> AppState {
        let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(
            "postgres://localhost/warden_router_test",
        );
        let pool = Pool::builder().build_unchecked(manager);
        AppState::new(pool, JwtConfig::default(), &StorageConfig::default())
    }

    #[tokio::test]
    async fn test_create_router_builds() {
        // Route merging and guard layering panic at construction time if
        // wired wrong, so building the full router is the assertion.
        let _router = create_router(unconnected_state().await);
    }
}
