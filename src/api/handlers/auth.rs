//! Authentication handlers for registration, login and token refresh.

use axum::{Json, extract::State, http::StatusCode};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::AUTH_TAG;
use crate::api::dto::{
    LoginRequest, LoginResponse, RefreshTokenRequest, RefreshTokenResponse, RegisterRequest,
    RegisterResponse,
};
use crate::error::{AppError, AppResult};
use crate::models::User;
use crate::state::AppState;
use crate::utils::jwt::{generate_token_pair, validate_refresh_token};
use crate::utils::validate::ValidatedJson;

/// Creates the authentication routes.
///
/// Routes:
/// - POST /register - Register a new account and get tokens
/// - POST /login    - Authenticate with email and password
/// - POST /refresh  - Exchange a refresh token for a new pair
pub fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(register))
        .routes(routes!(login))
        .routes(routes!(refresh_token))
}

/// POST /api/auth/register - Register a new account
///
/// Creates the account with the plain user role and returns a token pair so
/// the client is signed in immediately.
#[utoipa::path(
    post,
    path = "/register",
    tag = AUTH_TAG,
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = RegisterResponse),
        (status = 400, description = "Invalid request payload"),
        (status = 409, description = "Email already registered")
    )
)]
async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<RegisterResponse>)> {
    // The service hashes the password before it reaches the repository.
    let user = state
        .services
        .users
        .create_user(payload.into_new_user())
        .await?;

    let (access_token, refresh_token) = issue_token_pair(&state, &user)?;

    let response = RegisterResponse {
        user: user.into(),
        access_token,
        refresh_token,
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/auth/login - Authenticate
///
/// Verifies the credentials against the stored hash and returns a token pair.
#[utoipa::path(
    post,
    path = "/login",
    tag = AUTH_TAG,
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 403, description = "Account is disabled")
    )
)]
async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let user = state
        .services
        .users
        .authenticate(&payload.email, &payload.password)
        .await?;

    let (access_token, refresh_token) = issue_token_pair(&state, &user)?;

    Ok(Json(LoginResponse {
        user: user.into(),
        access_token,
        refresh_token,
    }))
}

/// POST /api/auth/refresh - Refresh the token pair
///
/// Accepts only refresh-type tokens and re-checks the live account, so a
/// deleted or disabled account cannot keep minting access tokens.
#[utoipa::path(
    post,
    path = "/refresh",
    tag = AUTH_TAG,
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "Tokens refreshed", body = RefreshTokenResponse),
        (status = 401, description = "Invalid or expired refresh token"),
        (status = 403, description = "Account is disabled")
    )
)]
async fn refresh_token(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RefreshTokenRequest>,
) -> AppResult<Json<RefreshTokenResponse>> {
    let claims = validate_refresh_token(&payload.refresh_token, &state.jwt_config.secret)?;
    let user_id = claims.user_id()?;

    let user = match state.services.users.get_user(user_id).await {
        Ok(user) => user,
        Err(AppError::NotFound { .. }) => {
            return Err(AppError::Unauthorized {
                message: "Account no longer exists".to_string(),
            });
        }
        Err(e) => return Err(e),
    };

    if !user.enabled {
        return Err(AppError::Forbidden {
            message: "User account is disabled".to_string(),
        });
    }

    let (access_token, refresh_token) = issue_token_pair(&state, &user)?;

    Ok(Json(RefreshTokenResponse {
        access_token,
        refresh_token,
    }))
}

fn issue_token_pair(state: &AppState, user: &User) -> AppResult<(String, String)> {
    generate_token_pair(
        user.id,
        user.email.clone(),
        &state.jwt_config.secret,
        state.jwt_config.access_token_expiration,
        state.jwt_config.refresh_token_expiration,
    )
}
