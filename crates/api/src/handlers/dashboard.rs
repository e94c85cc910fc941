//! Handler for the role-aware `/dashboard` endpoint.
//!
//! The counts needed by any role are gathered up front into a
//! [`DashboardContext`]; the per-role payload is then produced by a pure
//! view-builder function selected from [`VIEW_BUILDERS`]. Adding a role means
//! adding a builder to the table, not another branch in the handler.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use eventify_core::error::CoreError;
use eventify_core::roles::{ROLE_ADMIN, ROLE_STUDENT};
use eventify_db::models::user::UserResponse;
use eventify_db::repositories::{EventRepo, RegistrationRepo, RoleRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Everything a view builder may need, gathered before dispatch.
pub struct DashboardContext {
    pub user: UserResponse,
    pub total_events: i64,
    pub total_registrations: i64,
    pub total_users: i64,
    pub total_admins: i64,
    pub total_students: i64,
}

/// Pure function from gathered context to a role's view model.
type ViewBuilder = fn(&DashboardContext) -> serde_json::Value;

/// Role name -> view builder. Unknown roles fall through to 403.
const VIEW_BUILDERS: &[(&str, ViewBuilder)] = &[
    (ROLE_ADMIN, admin_view),
    (ROLE_STUDENT, student_view),
];

fn admin_view(ctx: &DashboardContext) -> serde_json::Value {
    serde_json::json!({
        "total_events": ctx.total_events,
        "total_registrations": ctx.total_registrations,
        "total_users": ctx.total_users,
        "total_admins": ctx.total_admins,
        "total_students": ctx.total_students,
    })
}

fn student_view(ctx: &DashboardContext) -> serde_json::Value {
    serde_json::json!({
        "total_events": ctx.total_events,
        "welcome": format!("Welcome back, {}!", ctx.user.name),
    })
}

/// Payload returned by `GET /api/dashboard`.
#[derive(Debug, Serialize)]
pub struct DashboardPayload {
    pub user: UserResponse,
    pub role: String,
    pub data: serde_json::Value,
}

/// GET /api/dashboard
///
/// Returns the view model for the authenticated user's role.
pub async fn show(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<ApiResponse<DashboardPayload>>> {
    let user = UserRepo::find_by_id(&state.pool, auth_user.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth_user.user_id,
        }))?;
    let role_name = RoleRepo::resolve_name(&state.pool, user.role_id).await?;

    let builder = VIEW_BUILDERS
        .iter()
        .find(|(role, _)| *role == role_name)
        .map(|(_, builder)| builder)
        .ok_or_else(|| {
            AppError::Core(CoreError::Forbidden(format!(
                "No dashboard for role '{role_name}'"
            )))
        })?;

    let ctx = DashboardContext {
        user: UserResponse::from_user(&user, &role_name),
        total_events: EventRepo::count_all(&state.pool).await?,
        total_registrations: RegistrationRepo::count_all(&state.pool).await?,
        total_users: UserRepo::count_all(&state.pool).await?,
        total_admins: UserRepo::count_by_role(&state.pool, ROLE_ADMIN).await?,
        total_students: UserRepo::count_by_role(&state.pool, ROLE_STUDENT).await?,
    };

    let data = builder(&ctx);
    Ok(Json(ApiResponse::new(
        DashboardPayload {
            role: role_name,
            data,
            user: ctx.user,
        },
        "Dashboard retrieved successfully",
    )))
}
