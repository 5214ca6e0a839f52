//! Current user (me) endpoint.
//!
//! Lets the authenticated caller fetch their own account without knowing
//! their numeric ID.

use axum::{Extension, Json, extract::State};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::USER_TAG;
use crate::api::dto::{ApiResponse, UserResponse};
use crate::api::middleware::AuthUser;
use crate::error::AppResult;
use crate::state::AppState;

/// Creates the "me" route for the current authenticated user.
///
/// Routes:
/// - GET /me - The caller's own account
///
/// Registered before the `/{id}` routes; the static segment wins the match.
pub fn me_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(get_me))
}

/// GET /api/users/me - Get the caller's account
///
/// Resolves the account by the email claim carried in the caller identity,
/// so the answer tracks the live record rather than the token contents.
#[utoipa::path(
    get,
    path = "/me",
    tag = USER_TAG,
    responses(
        (status = 200, description = "The caller's account", body = ApiResponse<UserResponse>),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearerAuth" = []))
)]
async fn get_me(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<ApiResponse<UserResponse>>> {
    let user = state
        .services
        .users
        .get_user_by_email(&auth_user.email)
        .await?;
    Ok(Json(ApiResponse::ok(UserResponse::from(user))))
}
