//! Role-based access control extractors.
//!
//! Wrap [`AuthUser`] and reject requests whose role does not meet the
//! requirement, enforcing authorization at the type level. An unauthenticated
//! request rejects with 401; an authenticated request with the wrong role
//! rejects with 403.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use eventify_core::error::CoreError;
use eventify_core::roles::ROLE_ADMIN;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires the `admin` role.
///
/// ```ignore
/// async fn create_event(RequireAdmin(user): RequireAdmin, ...) -> AppResult<...> {
///     // user is guaranteed to be an admin here
/// }
/// ```
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ROLE_ADMIN {
            return Err(AppError::Core(CoreError::Forbidden(
                "Admin role required".into(),
            )));
        }
        Ok(RequireAdmin(user))
    }
}
