//! Repository for the `events` table.

use eventify_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::event::{CreateEvent, Event, EventWithCount, UpdateEvent};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, description, start_date, end_date, event_time, \
                        location_type, location, category, capacity, organizer, \
                        event_image, event_features, created_at, updated_at";

/// Same columns qualified with the `e` alias, for joined queries.
const QUALIFIED_COLUMNS: &str =
    "e.id, e.title, e.description, e.start_date, e.end_date, e.event_time, \
     e.location_type, e.location, e.category, e.capacity, e.organizer, \
     e.event_image, e.event_features, e.created_at, e.updated_at";

/// Provides CRUD operations for events.
pub struct EventRepo;

impl EventRepo {
    /// Insert a new event, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateEvent) -> Result<Event, sqlx::Error> {
        let query = format!(
            "INSERT INTO events
                (title, description, start_date, end_date, event_time, location_type,
                 location, category, capacity, organizer, event_image, event_features)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(input.event_time)
            .bind(&input.location_type)
            .bind(&input.location)
            .bind(&input.category)
            .bind(input.capacity)
            .bind(&input.organizer)
            .bind(&input.event_image)
            .bind(serde_json::json!(input.event_features))
            .fetch_one(pool)
            .await
    }

    /// Find an event by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Event>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM events WHERE id = $1");
        sqlx::query_as::<_, Event>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an event by ID with a row lock, inside a caller-owned transaction.
    ///
    /// Used by the registration path so the capacity check and the insert
    /// observe a consistent count.
    pub async fn find_by_id_for_update(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<Event>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM events WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Event>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// List all events newest-first, each joined with its live registration count.
    pub async fn list_with_counts(pool: &PgPool) -> Result<Vec<EventWithCount>, sqlx::Error> {
        let query = format!(
            "SELECT {QUALIFIED_COLUMNS}, COUNT(r.id) AS registration_count
             FROM events e
             LEFT JOIN event_registrations r ON r.event_id = e.id
             GROUP BY e.id
             ORDER BY e.created_at DESC"
        );
        sqlx::query_as::<_, EventWithCount>(&query)
            .fetch_all(pool)
            .await
    }

    /// Update an event. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateEvent,
    ) -> Result<Option<Event>, sqlx::Error> {
        let query = format!(
            "UPDATE events SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                start_date = COALESCE($4, start_date),
                end_date = COALESCE($5, end_date),
                event_time = COALESCE($6, event_time),
                location_type = COALESCE($7, location_type),
                location = COALESCE($8, location),
                category = COALESCE($9, category),
                capacity = COALESCE($10, capacity),
                organizer = COALESCE($11, organizer),
                event_image = COALESCE($12, event_image),
                event_features = COALESCE($13, event_features),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(input.event_time)
            .bind(&input.location_type)
            .bind(&input.location)
            .bind(&input.category)
            .bind(input.capacity)
            .bind(&input.organizer)
            .bind(&input.event_image)
            .bind(input.event_features.as_ref().map(|f| serde_json::json!(f)))
            .fetch_optional(pool)
            .await
    }

    /// Hard-delete an event. Registrations go with it via `ON DELETE CASCADE`.
    ///
    /// Returns `true` if the row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Total number of events.
    pub async fn count_all(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM events")
            .fetch_one(pool)
            .await
    }
}
