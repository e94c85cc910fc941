//! Route definitions for the `/registrations` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::registrations;
use crate::state::AppState;

/// Routes mounted at `/registrations`.
///
/// Registering, unregistering, and status checks are public so students can
/// act without an account; per-record access is admin-only.
///
/// ```text
/// POST   /             -> register (public)
/// POST   /check        -> check (public)
/// POST   /unregister   -> unregister (public)
/// GET    /{id}         -> get_by_id (admin)
/// PUT    /{id}         -> update (admin)
/// DELETE /{id}         -> delete (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(registrations::register))
        .route("/check", post(registrations::check))
        .route("/unregister", post(registrations::unregister))
        .route(
            "/{id}",
            get(registrations::get_by_id)
                .put(registrations::update)
                .delete(registrations::delete),
        )
}
