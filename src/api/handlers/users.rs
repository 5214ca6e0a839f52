//! User account API handlers.
//!
//! Provides HTTP handlers for listing, fetching, updating and deleting user
//! accounts, plus the multipart profile-picture endpoint. Role requirements
//! are attached per route group as [`RoleGuard`] data, so what each group
//! demands is visible at registration instead of being buried in handlers.

use crate::api::doc::USER_TAG;
use crate::api::dto::{
    ApiResponse, AvatarAction, PictureFile, PictureForm, UpdatePasswordRequest, UpdateUserRequest,
    UserResponse,
};
use crate::api::middleware::{RoleGuard, require_roles};
use crate::error::{AppError, AppResult, ValidationFieldError};
use crate::models::Role;
use crate::services::FileStorageService;
use crate::state::AppState;
use crate::utils::validate::ValidatedJson;
use axum::{
    Extension, Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
    middleware,
};
use tracing::warn;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

/// Creates the user account routes with their role guards attached.
///
/// Routes:
/// - GET    /               - List all users (admin)
/// - DELETE /{id}           - Delete user (admin)
/// - GET    /{id}           - Get user by ID (admin or user)
/// - PUT    /{id}           - Update user profile (admin or user)
/// - PUT    /{id}/password  - Change password (admin or user)
/// - POST   /{id}/picture   - Upload or delete the profile picture (any authenticated)
///
/// The surrounding router applies the authentication middleware to the whole
/// group, so every handler here can rely on a verified caller identity.
pub fn user_routes() -> OpenApiRouter<AppState> {
    let admin = OpenApiRouter::new()
        .routes(routes!(list_users))
        .routes(routes!(delete_user))
        .layer(middleware::from_fn(require_roles))
        .layer(Extension(RoleGuard::admin()));

    let member = OpenApiRouter::new()
        .routes(routes!(get_user, update_user))
        .routes(routes!(update_password))
        .layer(middleware::from_fn(require_roles))
        .layer(Extension(RoleGuard::new(&[Role::Admin, Role::User])));

    // Authentication only; the picture endpoint has no role requirement.
    let picture = OpenApiRouter::new().routes(routes!(upload_or_delete_picture));

    admin.merge(member).merge(picture)
}

// ============================================================================
// Account Handlers
// ============================================================================

/// GET /api/users - List all users
///
/// Returns every user account. Restricted to administrators.
#[utoipa::path(
    get,
    path = "/",
    tag = USER_TAG,
    responses(
        (status = 200, description = "All user accounts", body = ApiResponse<Vec<UserResponse>>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Caller is not an administrator")
    ),
    security(("bearerAuth" = []))
)]
async fn list_users(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<UserResponse>>>> {
    let users = state.services.users.list_users().await?;
    let users: Vec<UserResponse> = users.into_iter().map(UserResponse::from).collect();
    Ok(Json(ApiResponse::ok(users)))
}

/// GET /api/users/{id} - Get user by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = USER_TAG,
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "The requested user", body = ApiResponse<UserResponse>),
        (status = 404, description = "User not found")
    ),
    security(("bearerAuth" = []))
)]
async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<UserResponse>>> {
    let user = state.services.users.get_user(id).await?;
    Ok(Json(ApiResponse::ok(UserResponse::from(user))))
}

/// PUT /api/users/{id} - Update user profile
///
/// Applies a partial update; absent fields keep their stored values.
#[utoipa::path(
    put,
    path = "/{id}",
    tag = USER_TAG,
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "The updated user", body = ApiResponse<UserResponse>),
        (status = 400, description = "Invalid request payload"),
        (status = 404, description = "User not found")
    ),
    security(("bearerAuth" = []))
)]
async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<UpdateUserRequest>,
) -> AppResult<Json<ApiResponse<UserResponse>>> {
    let user = state
        .services
        .users
        .update_user(id, payload.into_update_user())
        .await?;
    Ok(Json(ApiResponse::ok(UserResponse::from(user))))
}

/// PUT /api/users/{id}/password - Change password
///
/// Verifies the current password before storing the new one. A wrong current
/// password comes back as a dedicated `PASSWORD_MISMATCH` error rather than a
/// generic validation failure.
#[utoipa::path(
    put,
    path = "/{id}/password",
    tag = USER_TAG,
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    request_body = UpdatePasswordRequest,
    responses(
        (status = 200, description = "The user after the password change", body = ApiResponse<UserResponse>),
        (status = 400, description = "Invalid payload or current password mismatch"),
        (status = 404, description = "User not found")
    ),
    security(("bearerAuth" = []))
)]
async fn update_password(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<UpdatePasswordRequest>,
) -> AppResult<Json<ApiResponse<UserResponse>>> {
    let user = state
        .services
        .users
        .update_password(id, &payload.current_password, &payload.new_password)
        .await?;
    Ok(Json(ApiResponse::ok(UserResponse::from(user))))
}

/// DELETE /api/users/{id} - Delete user
///
/// Removes the account. Restricted to administrators.
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = USER_TAG,
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 204, description = "User deleted"),
        (status = 403, description = "Caller is not an administrator"),
        (status = 404, description = "User not found")
    ),
    security(("bearerAuth" = []))
)]
async fn delete_user(State(state): State<AppState>, Path(id): Path<i32>) -> AppResult<StatusCode> {
    state.services.users.delete_user(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Profile Picture Handler
// ============================================================================

/// POST /api/users/{id}/picture - Upload or delete the profile picture
///
/// Multipart endpoint driven by the `action` field: `u` stores the attached
/// `file` part and points the user's avatar at the new blob, `d` removes the
/// stored blob and clears the avatar. Deleting when no picture is set is a
/// no-op that still returns the user.
#[utoipa::path(
    post,
    path = "/{id}/picture",
    tag = USER_TAG,
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    request_body(content = PictureForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "The user after the picture change", body = ApiResponse<UserResponse>),
        (status = 400, description = "Unknown action or missing file part"),
        (status = 404, description = "User not found")
    ),
    security(("bearerAuth" = []))
)]
async fn upload_or_delete_picture(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> AppResult<Json<ApiResponse<UserResponse>>> {
    let form = read_picture_form(multipart).await?;
    let action = form.validated_action()?;

    let user = match action {
        AvatarAction::Upload => {
            let Some(file) = form.file else {
                return Err(missing_file_error());
            };
            let key = state
                .services
                .files
                .store(&file.bytes, &file.filename)
                .await?;
            state.services.users.update_avatar(id, Some(key)).await?
        }
        AvatarAction::Delete => {
            let user = state.services.users.get_user(id).await?;
            match user.avatar.as_deref() {
                Some(key) => {
                    if remove_avatar_blob(&state.services.files, key).await {
                        state.services.users.update_avatar(id, None).await?
                    } else {
                        // Blob still exists, keep the reference pointing at it.
                        user
                    }
                }
                None => user,
            }
        }
    };

    Ok(Json(ApiResponse::ok(UserResponse::from(user))))
}

/// Pulls the `action` and `file` parts out of the multipart stream.
///
/// Unknown parts are skipped so clients may send extra metadata fields; a
/// repeated part keeps its last occurrence, matching form semantics.
async fn read_picture_form(mut multipart: Multipart) -> AppResult<PictureForm> {
    let mut action: Option<String> = None;
    let mut file: Option<PictureFile> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        match field.name() {
            Some("action") => {
                action = Some(field.text().await.map_err(multipart_error)?);
            }
            Some("file") => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let bytes = field.bytes().await.map_err(multipart_error)?;
                file = Some(PictureFile { filename, bytes });
            }
            _ => {}
        }
    }

    Ok(PictureForm {
        // An absent action fails the form's length rule downstream.
        action: action.unwrap_or_default(),
        file,
    })
}

/// Deletes the blob behind an avatar key, reporting whether it is gone.
///
/// A failed deletion is logged and reported as `false` so the caller keeps
/// the stored reference instead of orphaning a still-existing blob.
async fn remove_avatar_blob(files: &FileStorageService, key: &str) -> bool {
    match files.delete(key).await {
        Ok(()) => true,
        Err(e) => {
            warn!(key = %key, error = %e, "Failed to delete stored avatar, keeping reference");
            false
        }
    }
}

fn multipart_error(error: axum::extract::multipart::MultipartError) -> AppError {
    AppError::BadRequest {
        message: format!("Malformed multipart request: {}", error.body_text()),
    }
}

fn missing_file_error() -> AppError {
    AppError::ValidationErrors {
        errors: vec![ValidationFieldError {
            field: "file".to_string(),
            message: "A file part is required when action is 'u'".to_string(),
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::extract::FromRequest;
    use axum::http::{Method, Request, header};
    use tempfile::tempdir;

    const BOUNDARY: &str = "picture-test-boundary";

    fn text_part(name: &str, value: &str) -> String {
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        )
    }

    fn file_part(name: &str, filename: &str, content: &str) -> String {
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n{content}\r\n"
        )
    }

    async fn parse_form(parts: &[String]) -> AppResult<PictureForm> {
        let body = format!("{}--{BOUNDARY}--\r\n", parts.concat());
        let request = Request::builder()
            .method(Method::POST)
            .uri("/users/1/picture")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();

        let multipart = Multipart::from_request(request, &()).await.unwrap();
        read_picture_form(multipart).await
    }

    #[tokio::test]
    async fn test_read_picture_form_upload() {
        let parts = [
            text_part("action", "u"),
            file_part("file", "avatar.png", "fake image bytes"),
        ];

        let form = parse_form(&parts).await.unwrap();

        assert_eq!(form.action, "u");
        let file = form.file.as_ref().expect("file part should be captured");
        assert_eq!(file.filename, "avatar.png");
        assert_eq!(file.bytes.as_ref(), b"fake image bytes");
        assert_eq!(form.validated_action().unwrap(), AvatarAction::Upload);
    }

    #[tokio::test]
    async fn test_read_picture_form_delete_without_file() {
        let parts = [text_part("action", "d")];

        let form = parse_form(&parts).await.unwrap();

        assert_eq!(form.action, "d");
        assert!(form.file.is_none());
        assert_eq!(form.validated_action().unwrap(), AvatarAction::Delete);
    }

    #[tokio::test]
    async fn test_read_picture_form_skips_unknown_parts() {
        let parts = [text_part("comment", "ignore me"), text_part("action", "d")];

        let form = parse_form(&parts).await.unwrap();
        assert_eq!(form.action, "d");
    }

    #[tokio::test]
    async fn test_missing_action_fails_validation() {
        let parts = [file_part("file", "avatar.png", "bytes")];

        let form = parse_form(&parts).await.unwrap();

        match form.validated_action().unwrap_err() {
            AppError::ValidationErrors { errors } => {
                assert!(errors.iter().any(|e| e.field == "action"));
            }
            other => panic!("expected ValidationErrors, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unknown_action_fails_validation() {
        let parts = [text_part("action", "x")];

        let form = parse_form(&parts).await.unwrap();
        assert!(form.validated_action().is_err());
    }

    #[test]
    fn test_missing_file_error_names_the_field() {
        match missing_file_error() {
            AppError::ValidationErrors { errors } => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].field, "file");
            }
            other => panic!("expected ValidationErrors, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_remove_avatar_blob_reports_success() {
        let dir = tempdir().unwrap();
        let files = FileStorageService::new(dir.path(), 1024);

        let key = files.store(b"blob", "pic.png").await.unwrap();
        assert!(remove_avatar_blob(&files, &key).await);
        assert!(files.resolve(&key).await.is_err());
    }

    #[tokio::test]
    async fn test_remove_avatar_blob_swallows_missing_blob() {
        let dir = tempdir().unwrap();
        let files = FileStorageService::new(dir.path(), 1024);

        // No blob behind the key; failure is reported, not propagated.
        assert!(!remove_avatar_blob(&files, "ghost.png").await);
    }

    #[test]
    fn test_user_routes_builds() {
        // Guard layering and route merging panic at construction time if
        // they are wired wrong, so building the router is the assertion.
        let _router = user_routes();
    }
}
