//! Health check endpoint handlers.
//!
//! Probes for monitoring and load balancers. The readiness path goes
//! straight to the connection pool instead of through the service layer,
//! so it reports on the dependency itself.

use std::collections::HashMap;
use std::time::Instant;

use axum::{Router, extract::State, http::StatusCode, response::Json, routing::get};
use diesel_async::RunQueryDsl;

use crate::api::doc::HEALTH_TAG;
use crate::api::dto::{ComponentHealth, HealthResponse, HealthStatus};
use crate::state::AppState;

/// Creates the health check routes.
///
/// Routes:
/// - GET /health       - Aggregate health report
/// - GET /health/ready - Readiness probe
/// - GET /health/live  - Liveness probe
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/health/ready", get(readiness_check))
        .route("/health/live", get(liveness_check))
}

/// GET /health - Aggregate health report
///
/// Returns the component breakdown with an overall status; an unhealthy
/// dependency turns the response into a 503 while keeping the report body.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Service is unhealthy", body = HealthResponse)
    ),
    tag = HEALTH_TAG
)]
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let mut components = HashMap::new();

    let db_check = check_database(&state).await;
    let overall_status = db_check.status;
    components.insert("database".to_string(), db_check);

    let response = HealthResponse {
        status: overall_status,
        timestamp: jiff::Timestamp::now().to_string(),
        version: crate::pkg_version().to_string(),
        components,
    };

    (status_code_for(response.status), Json(response))
}

/// Degraded still serves traffic; only unhealthy answers 503.
fn status_code_for(status: HealthStatus) -> StatusCode {
    match status {
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// GET /health/ready - Readiness probe
///
/// Answers 200 only when the database is reachable.
#[utoipa::path(
    get,
    path = "/health/ready",
    responses(
        (status = 200, description = "Service is ready"),
        (status = 503, description = "Service is not ready")
    ),
    tag = HEALTH_TAG
)]
pub async fn readiness_check(State(state): State<AppState>) -> StatusCode {
    match check_database(&state).await.status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Degraded | HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// GET /health/live - Liveness probe
///
/// Answering at all is the check; no dependencies are touched.
#[utoipa::path(
    get,
    path = "/health/live",
    responses(
        (status = 200, description = "Service is alive")
    ),
    tag = HEALTH_TAG
)]
pub async fn liveness_check() -> StatusCode {
    StatusCode::OK
}

/// Checks database connectivity directly against the connection pool.
async fn check_database(state: &AppState) -> ComponentHealth {
    let start = Instant::now();

    match state.db_pool.get().await {
        Ok(mut conn) => match diesel::sql_query("SELECT 1").execute(&mut conn).await {
            Ok(_) => ComponentHealth::healthy(start.elapsed().as_millis() as u64),
            Err(e) => ComponentHealth::unhealthy(format!("Query failed: {}", e)),
        },
        Err(e) => ComponentHealth::unhealthy(format!("Connection failed: {}", e)),
    }
}
