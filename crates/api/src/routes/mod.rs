//! Route definitions, one module per resource.

pub mod auth;
pub mod dashboard;
pub mod events;
pub mod health;
pub mod registrations;

use axum::Router;

use crate::state::AppState;

/// All API routes, to be nested under `/api`.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/events", events::router())
        .nest("/registrations", registrations::router())
        .merge(dashboard::router())
}
