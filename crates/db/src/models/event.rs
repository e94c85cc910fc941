//! Event entity model and DTOs.

use chrono::{NaiveDate, NaiveTime};
use eventify_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `events` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Event {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub event_time: NaiveTime,
    /// `"offline"` or `"virtual"` (CHECK-constrained).
    pub location_type: String,
    pub location: String,
    pub category: String,
    pub capacity: i32,
    pub organizer: String,
    /// Stored image filename (not a URL); `None` when no image was uploaded.
    pub event_image: Option<String>,
    /// JSON array of feature strings.
    pub event_features: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// An event row joined with its live registration count.
///
/// The count is always computed by the query, never stored, so it cannot
/// drift from the `event_registrations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EventWithCount {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub event: Event,
    pub registration_count: i64,
}

/// DTO for creating a new event. Fields are already parsed and validated
/// by the API layer.
#[derive(Debug)]
pub struct CreateEvent {
    pub title: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub event_time: NaiveTime,
    pub location_type: String,
    pub location: String,
    pub category: String,
    pub capacity: i32,
    pub organizer: String,
    pub event_image: Option<String>,
    pub event_features: Vec<String>,
}

/// DTO for updating an existing event. Only non-`None` fields are applied.
#[derive(Default)]
pub struct UpdateEvent {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub event_time: Option<NaiveTime>,
    pub location_type: Option<String>,
    pub location: Option<String>,
    pub category: Option<String>,
    pub capacity: Option<i32>,
    pub organizer: Option<String>,
    pub event_image: Option<String>,
    pub event_features: Option<Vec<String>>,
}
