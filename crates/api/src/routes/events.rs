//! Route definitions for the `/events` resource.

use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;

use eventify_core::storage::MAX_IMAGE_BYTES;

use crate::handlers::{events, registrations};
use crate::state::AppState;

/// Headroom for multipart boundaries and text parts on top of the image limit.
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

/// Routes mounted at `/events`.
///
/// `GET /available` is public; everything else requires the admin role
/// (enforced by the `RequireAdmin` extractor in the handlers).
///
/// ```text
/// GET    /                     -> list (admin)
/// POST   /                     -> create (admin, multipart)
/// GET    /available            -> available (public)
/// GET    /{id}                 -> get_by_id (admin)
/// PUT    /{id}                 -> update (admin, multipart)
/// DELETE /{id}                 -> delete (admin)
/// GET    /{id}/registrations   -> list_for_event (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(events::list).post(events::create))
        .route("/available", get(events::available))
        .route(
            "/{id}",
            get(events::get_by_id)
                .put(events::update)
                .delete(events::delete),
        )
        .route("/{id}/registrations", get(registrations::list_for_event))
        .layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES + FORM_OVERHEAD_BYTES))
}
