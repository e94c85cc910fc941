//! Handlers for the `/auth` resource (register, login, refresh, logout).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use eventify_core::error::CoreError;
use eventify_core::roles::is_valid_role;
use eventify_db::models::session::CreateSession;
use eventify_db::models::user::{CreateUser, User, UserResponse};
use eventify_db::repositories::{RoleRepo, SessionRepo, UserRepo};

use crate::auth::jwt::{hash_refresh_token, issue_token_pair};
use crate::auth::password::{hash_password, validate_password_strength, verify_password};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /api/auth/register`.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(
        min = 1,
        max = 255,
        message = "The name must be between 1 and 255 characters."
    ))]
    pub name: String,
    #[validate(
        email(message = "The email must be a valid email address."),
        length(max = 255, message = "The email may not be greater than 255 characters.")
    )]
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
    /// Desired role, `"admin"` or `"student"`.
    pub role: String,
}

/// Request body for `POST /api/auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    /// Role the client is logging into. A valid password with the wrong role
    /// is rejected with 403.
    pub role: String,
}

/// Request body for `POST /api/auth/refresh` and `POST /api/auth/logout`.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Successful authentication response returned by register, login, and refresh.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
    pub user: UserResponse,
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/auth/register
///
/// Create a new account and log it in immediately.
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    input.validate()?;

    validate_password_strength(&input.password)
        .map_err(|msg| AppError::field_error("password", msg))?;
    if input.password != input.password_confirmation {
        return Err(AppError::field_error(
            "password",
            "The password confirmation does not match.",
        ));
    }
    if !is_valid_role(&input.role) {
        return Err(AppError::field_error("role", "The selected role is invalid."));
    }

    // Friendly duplicate check; the uq_users_email constraint still backstops races.
    if UserRepo::find_by_email(&state.pool, &input.email)
        .await?
        .is_some()
    {
        return Err(AppError::Core(CoreError::Duplicate {
            field: "email",
            message: "This email is already taken.".to_string(),
        }));
    }

    let role = RoleRepo::find_by_name(&state.pool, &input.role)
        .await?
        .ok_or_else(|| AppError::Internal(format!("Role not seeded: {}", input.role)))?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::Internal(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            name: input.name.clone(),
            email: input.email.clone(),
            password_hash,
            role_id: role.id,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, role = %role.name, "User registered");

    let response =
        create_auth_response(&state, &user, &role.name, "Registration successful").await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/auth/login
///
/// Authenticate with email + password + role. Returns access and refresh tokens.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    if !is_valid_role(&input.role) {
        return Err(AppError::field_error("role", "The selected role is invalid."));
    }

    let user = UserRepo::find_by_email(&state.pool, &input.email)
        .await?
        .ok_or_else(invalid_credentials)?;

    if !user.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::Internal(format!("Password verification error: {e}")))?;
    if !password_valid {
        return Err(invalid_credentials());
    }

    // The role gate comes after the password check so the response does not
    // reveal whether an email exists under a different role.
    let role_name = RoleRepo::resolve_name(&state.pool, user.role_id).await?;
    if role_name != input.role {
        return Err(AppError::Core(CoreError::Forbidden(
            "Access denied for this role".into(),
        )));
    }

    UserRepo::record_successful_login(&state.pool, user.id).await?;

    let response = create_auth_response(&state, &user, &role_name, "Login successful").await?;
    Ok(Json(response))
}

/// POST /api/auth/refresh
///
/// Exchange a valid refresh token for new access + refresh tokens.
/// The old refresh token is revoked (rotation).
pub async fn refresh(
    State(state): State<AppState>,
    Json(input): Json<RefreshRequest>,
) -> AppResult<Json<AuthResponse>> {
    let token_hash = hash_refresh_token(&input.refresh_token);

    let session = SessionRepo::find_by_refresh_token_hash(&state.pool, &token_hash)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid or expired refresh token".into(),
            ))
        })?;

    SessionRepo::revoke(&state.pool, session.id).await?;

    let user = UserRepo::find_by_id(&state.pool, session.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))?;

    if !user.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }

    let role_name = RoleRepo::resolve_name(&state.pool, user.role_id).await?;

    let response = create_auth_response(&state, &user, &role_name, "Token refreshed").await?;
    Ok(Json(response))
}

/// POST /api/auth/logout
///
/// Revoke the session matching the provided refresh token. Idempotent: an
/// unknown or already-revoked token still returns success.
pub async fn logout(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(input): Json<RefreshRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    let token_hash = hash_refresh_token(&input.refresh_token);

    if let Some(session) = SessionRepo::find_by_refresh_token_hash(&state.pool, &token_hash).await?
    {
        if session.user_id == auth_user.user_id {
            SessionRepo::revoke(&state.pool, session.id).await?;
        }
    }

    Ok(Json(ApiResponse::new((), "Logged out successfully")))
}

/// POST /api/auth/logout-all
///
/// Revoke every active session for the authenticated user.
pub async fn logout_all(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<ApiResponse<()>>> {
    let revoked = SessionRepo::revoke_all_for_user(&state.pool, auth_user.user_id).await?;
    tracing::info!(user_id = auth_user.user_id, revoked, "Revoked all sessions");

    Ok(Json(ApiResponse::new((), "Logged out from all devices")))
}

/// GET /api/auth/user
///
/// Return the authenticated user's profile.
pub async fn me(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<ApiResponse<UserResponse>>> {
    let user = UserRepo::find_by_id(&state.pool, auth_user.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth_user.user_id,
        }))?;

    let role_name = RoleRepo::resolve_name(&state.pool, user.role_id).await?;

    Ok(Json(ApiResponse::new(
        UserResponse::from_user(&user, &role_name),
        "User retrieved successfully",
    )))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn invalid_credentials() -> AppError {
    AppError::field_error("email", "The provided credentials are incorrect.")
}

/// Issue a token pair, persist the session row, and build the response body.
async fn create_auth_response(
    state: &AppState,
    user: &User,
    role: &str,
    message: &str,
) -> AppResult<AuthResponse> {
    let pair = issue_token_pair(user.id, role, &state.config.jwt)
        .map_err(|e| AppError::Internal(format!("Token generation error: {e}")))?;

    SessionRepo::create(
        &state.pool,
        &CreateSession {
            user_id: user.id,
            refresh_token_hash: pair.refresh_token_hash,
            expires_at: pair.refresh_expires_at,
        },
    )
    .await?;

    Ok(AuthResponse {
        success: true,
        message: message.to_string(),
        user: UserResponse::from_user(user, role),
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
        token_type: "Bearer".to_string(),
        expires_in: pair.expires_in_secs,
    })
}
