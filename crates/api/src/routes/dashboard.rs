//! Route definition for the role-aware dashboard.

use axum::routing::get;
use axum::Router;

use crate::handlers::dashboard;
use crate::state::AppState;

/// `GET /dashboard` -> role-specific view model (requires auth).
pub fn router() -> Router<AppState> {
    Router::new().route("/dashboard", get(dashboard::show))
}
