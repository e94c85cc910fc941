//! Repository for the `event_registrations` table.
//!
//! The unique constraints `uq_registrations_event_email` and
//! `uq_registrations_event_student` are the authoritative duplicate guard;
//! the lookup helpers here only exist so handlers can produce
//! field-attributed error messages before hitting the constraint.

use eventify_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::registration::{CreateRegistration, Registration, UpdateRegistration};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, event_id, name, email, student_id, phone_number, \
                        department, semester, created_at, updated_at";

/// Provides CRUD operations for event registrations.
pub struct RegistrationRepo;

impl RegistrationRepo {
    /// Insert a new registration inside a caller-owned transaction.
    ///
    /// The registration path wraps the capacity check and this insert in one
    /// transaction, so the pool-based variant is intentionally absent.
    pub async fn create_in(
        conn: &mut PgConnection,
        input: &CreateRegistration,
    ) -> Result<Registration, sqlx::Error> {
        let query = format!(
            "INSERT INTO event_registrations
                (event_id, name, email, student_id, phone_number, department, semester)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Registration>(&query)
            .bind(input.event_id)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.student_id)
            .bind(&input.phone_number)
            .bind(&input.department)
            .bind(&input.semester)
            .fetch_one(conn)
            .await
    }

    /// Find a registration by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Registration>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM event_registrations WHERE id = $1");
        sqlx::query_as::<_, Registration>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all registrations for one event, newest first.
    pub async fn list_by_event(
        pool: &PgPool,
        event_id: DbId,
    ) -> Result<Vec<Registration>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM event_registrations
             WHERE event_id = $1
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Registration>(&query)
            .bind(event_id)
            .fetch_all(pool)
            .await
    }

    /// Live registration count for one event.
    pub async fn count_by_event(pool: &PgPool, event_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM event_registrations WHERE event_id = $1")
            .bind(event_id)
            .fetch_one(pool)
            .await
    }

    /// Live registration count inside a caller-owned transaction.
    pub async fn count_by_event_in(
        conn: &mut PgConnection,
        event_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM event_registrations WHERE event_id = $1")
            .bind(event_id)
            .fetch_one(conn)
            .await
    }

    /// Find the registration matching (event, student_id), if any.
    pub async fn find_by_event_and_student(
        pool: &PgPool,
        event_id: DbId,
        student_id: &str,
    ) -> Result<Option<Registration>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM event_registrations
             WHERE event_id = $1 AND student_id = $2"
        );
        sqlx::query_as::<_, Registration>(&query)
            .bind(event_id)
            .bind(student_id)
            .fetch_optional(pool)
            .await
    }

    /// Whether another registration on this event already uses `email`.
    ///
    /// `exclude_id` skips one row (the record being updated).
    pub async fn email_taken(
        pool: &PgPool,
        event_id: DbId,
        email: &str,
        exclude_id: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS (
                SELECT 1 FROM event_registrations
                WHERE event_id = $1 AND email = $2 AND ($3::BIGINT IS NULL OR id <> $3)
            )",
        )
        .bind(event_id)
        .bind(email)
        .bind(exclude_id)
        .fetch_one(pool)
        .await?;
        Ok(taken)
    }

    /// Whether another registration on this event already uses `student_id`.
    pub async fn student_taken(
        pool: &PgPool,
        event_id: DbId,
        student_id: &str,
        exclude_id: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS (
                SELECT 1 FROM event_registrations
                WHERE event_id = $1 AND student_id = $2 AND ($3::BIGINT IS NULL OR id <> $3)
            )",
        )
        .bind(event_id)
        .bind(student_id)
        .bind(exclude_id)
        .fetch_one(pool)
        .await?;
        Ok(taken)
    }

    /// Update a registration. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateRegistration,
    ) -> Result<Option<Registration>, sqlx::Error> {
        let query = format!(
            "UPDATE event_registrations SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                student_id = COALESCE($4, student_id),
                phone_number = COALESCE($5, phone_number),
                department = COALESCE($6, department),
                semester = COALESCE($7, semester),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Registration>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.student_id)
            .bind(&input.phone_number)
            .bind(&input.department)
            .bind(&input.semester)
            .fetch_optional(pool)
            .await
    }

    /// Hard-delete a registration by ID. Returns `true` if the row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM event_registrations WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Self-service unregister: delete the row matching (event, student_id).
    ///
    /// Returns `true` if a row was deleted.
    pub async fn delete_by_event_and_student(
        pool: &PgPool,
        event_id: DbId,
        student_id: &str,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM event_registrations WHERE event_id = $1 AND student_id = $2")
                .bind(event_id)
                .bind(student_id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Total number of registrations across all events.
    pub async fn count_all(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM event_registrations")
            .fetch_one(pool)
            .await
    }
}
