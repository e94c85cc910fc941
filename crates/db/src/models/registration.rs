//! Event registration entity model and DTOs.

use eventify_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `event_registrations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Registration {
    pub id: DbId,
    pub event_id: DbId,
    pub name: String,
    pub email: String,
    pub student_id: String,
    pub phone_number: String,
    pub department: String,
    pub semester: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new registration.
pub struct CreateRegistration {
    pub event_id: DbId,
    pub name: String,
    pub email: String,
    pub student_id: String,
    pub phone_number: String,
    pub department: String,
    pub semester: String,
}

/// DTO for updating an existing registration. Only non-`None` fields are
/// applied. `event_id` is intentionally absent: a registration cannot be
/// moved between events.
#[derive(Default)]
pub struct UpdateRegistration {
    pub name: Option<String>,
    pub email: Option<String>,
    pub student_id: Option<String>,
    pub phone_number: Option<String>,
    pub department: Option<String>,
    pub semester: Option<String>,
}
