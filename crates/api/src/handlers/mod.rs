//! HTTP handlers, grouped by resource.

pub mod auth;
pub mod dashboard;
pub mod events;
pub mod registrations;
