//! Handlers for the `/registrations` resource.
//!
//! Registering is public (no login needed). The capacity check and the
//! insert run inside one transaction holding a row lock on the event, so
//! two concurrent submissions for the last spot cannot both succeed.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use eventify_core::error::CoreError;
use eventify_core::event::has_capacity;
use eventify_core::types::DbId;
use eventify_db::models::event::Event;
use eventify_db::models::registration::{CreateRegistration, Registration, UpdateRegistration};
use eventify_db::repositories::{EventRepo, RegistrationRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::ApiResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /api/registrations`.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    pub event_id: DbId,
    #[validate(length(min = 1, max = 255, message = "The name field is required."))]
    pub name: String,
    #[validate(
        email(message = "The email must be a valid email address."),
        length(max = 255, message = "The email may not be greater than 255 characters.")
    )]
    pub email: String,
    #[validate(length(
        min = 1,
        max = 50,
        message = "The student ID must be between 1 and 50 characters."
    ))]
    pub student_id: String,
    #[validate(length(
        min = 1,
        max = 20,
        message = "The phone number must be between 1 and 20 characters."
    ))]
    pub phone_number: String,
    #[validate(length(
        min = 1,
        max = 100,
        message = "The department must be between 1 and 100 characters."
    ))]
    pub department: String,
    #[validate(length(
        min = 1,
        max = 20,
        message = "The semester must be between 1 and 20 characters."
    ))]
    pub semester: String,
}

/// Request body for `PUT /api/registrations/{id}` (admin correction).
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateRegistrationRequest {
    #[validate(length(min = 1, max = 255, message = "The name field is required."))]
    pub name: Option<String>,
    #[validate(email(message = "The email must be a valid email address."))]
    pub email: Option<String>,
    #[validate(length(
        min = 1,
        max = 50,
        message = "The student ID must be between 1 and 50 characters."
    ))]
    pub student_id: Option<String>,
    #[validate(length(
        min = 1,
        max = 20,
        message = "The phone number must be between 1 and 20 characters."
    ))]
    pub phone_number: Option<String>,
    #[validate(length(
        min = 1,
        max = 100,
        message = "The department must be between 1 and 100 characters."
    ))]
    pub department: Option<String>,
    #[validate(length(
        min = 1,
        max = 20,
        message = "The semester must be between 1 and 20 characters."
    ))]
    pub semester: Option<String>,
}

/// Request body for `POST /api/registrations/unregister` and
/// `POST /api/registrations/check`.
#[derive(Debug, Deserialize, Validate)]
pub struct StudentEventRequest {
    pub event_id: DbId,
    #[validate(length(min = 1, max = 50, message = "The student ID field is required."))]
    pub student_id: String,
}

/// A registration with its parent event embedded, as returned to clients.
#[derive(Debug, Serialize)]
pub struct RegistrationWithEvent {
    #[serde(flatten)]
    pub registration: Registration,
    pub event: Event,
}

/// Payload for the admin per-event listing.
#[derive(Debug, Serialize)]
pub struct EventRegistrations {
    pub event: Event,
    pub registrations: Vec<Registration>,
    pub total_registrations: i64,
}

/// Payload for the registration status check.
#[derive(Debug, Serialize)]
pub struct RegistrationStatus {
    pub is_registered: bool,
    pub registration: Option<Registration>,
}

// ---------------------------------------------------------------------------
// Public handlers
// ---------------------------------------------------------------------------

/// POST /api/registrations
///
/// Register a student for an event. Duplicate email / student ID on the same
/// event and full events are rejected; the same student may register for any
/// number of different events.
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<RegistrationWithEvent>>)> {
    input.validate()?;

    let event = EventRepo::find_by_id(&state.pool, input.event_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Event",
            id: input.event_id,
        }))?;

    // Friendly duplicate checks; the unique constraints backstop races.
    if RegistrationRepo::email_taken(&state.pool, event.id, &input.email, None).await? {
        return Err(AppError::Core(CoreError::Duplicate {
            field: "email",
            message: "This email is already registered for this event.".to_string(),
        }));
    }
    if RegistrationRepo::student_taken(&state.pool, event.id, &input.student_id, None).await? {
        return Err(AppError::Core(CoreError::Duplicate {
            field: "student_id",
            message: "This student ID is already registered for this event.".to_string(),
        }));
    }

    // Capacity check and insert under a row lock so the count cannot move
    // between the read and the write.
    let mut tx = state.pool.begin().await?;

    let locked = EventRepo::find_by_id_for_update(&mut tx, input.event_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Event",
            id: input.event_id,
        }))?;

    let registered = RegistrationRepo::count_by_event_in(&mut tx, locked.id).await?;
    if !has_capacity(registered, locked.capacity) {
        tx.rollback().await?;
        return Err(AppError::Core(CoreError::CapacityExceeded {
            capacity: locked.capacity,
        }));
    }

    let registration = RegistrationRepo::create_in(
        &mut tx,
        &CreateRegistration {
            event_id: locked.id,
            name: input.name,
            email: input.email,
            student_id: input.student_id,
            phone_number: input.phone_number,
            department: input.department,
            semester: input.semester,
        },
    )
    .await?;

    tx.commit().await?;

    tracing::info!(
        registration_id = registration.id,
        event_id = locked.id,
        "Registration created"
    );

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            RegistrationWithEvent {
                registration,
                event: locked,
            },
            "Successfully registered for the event",
        )),
    ))
}

/// POST /api/registrations/unregister
///
/// Self-service removal, keyed by (event, student ID). 404 when no matching
/// registration exists.
pub async fn unregister(
    State(state): State<AppState>,
    Json(input): Json<StudentEventRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    input.validate()?;

    let deleted =
        RegistrationRepo::delete_by_event_and_student(&state.pool, input.event_id, &input.student_id)
            .await?;
    if !deleted {
        return Err(AppError::NotFound(
            "No registration found for this event and student ID".to_string(),
        ));
    }

    tracing::info!(
        event_id = input.event_id,
        "Registration removed by student"
    );

    Ok(Json(ApiResponse::new(
        (),
        "Successfully unregistered from the event",
    )))
}

/// POST /api/registrations/check
///
/// Report whether a student is registered for an event. Read-only and
/// idempotent; the client uses it to decide between offering "register"
/// and "unregister".
pub async fn check(
    State(state): State<AppState>,
    Json(input): Json<StudentEventRequest>,
) -> AppResult<Json<ApiResponse<RegistrationStatus>>> {
    input.validate()?;

    // Distinguish "event missing" from "not registered".
    EventRepo::find_by_id(&state.pool, input.event_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Event",
            id: input.event_id,
        }))?;

    let registration =
        RegistrationRepo::find_by_event_and_student(&state.pool, input.event_id, &input.student_id)
            .await?;

    Ok(Json(ApiResponse::new(
        RegistrationStatus {
            is_registered: registration.is_some(),
            registration,
        },
        "Registration status retrieved",
    )))
}

// ---------------------------------------------------------------------------
// Admin handlers
// ---------------------------------------------------------------------------

/// GET /api/events/{event_id}/registrations
pub async fn list_for_event(
    State(state): State<AppState>,
    RequireAdmin(_user): RequireAdmin,
    Path(event_id): Path<DbId>,
) -> AppResult<Json<ApiResponse<EventRegistrations>>> {
    let event = EventRepo::find_by_id(&state.pool, event_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Event",
            id: event_id,
        }))?;

    let registrations = RegistrationRepo::list_by_event(&state.pool, event_id).await?;
    let total_registrations = registrations.len() as i64;

    Ok(Json(ApiResponse::new(
        EventRegistrations {
            event,
            registrations,
            total_registrations,
        },
        "Registrations retrieved successfully",
    )))
}

/// GET /api/registrations/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    RequireAdmin(_user): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<RegistrationWithEvent>>> {
    let (registration, event) = load_with_event(&state, id).await?;
    Ok(Json(ApiResponse::new(
        RegistrationWithEvent {
            registration,
            event,
        },
        "Registration retrieved successfully",
    )))
}

/// PUT /api/registrations/{id}
///
/// Admin correction of a registration's contact details. Changing the email
/// or student ID re-checks per-event uniqueness, excluding the row itself.
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateRegistrationRequest>,
) -> AppResult<Json<ApiResponse<RegistrationWithEvent>>> {
    input.validate()?;

    let (existing, _) = load_with_event(&state, id).await?;

    if let Some(email) = &input.email {
        if RegistrationRepo::email_taken(&state.pool, existing.event_id, email, Some(id)).await? {
            return Err(AppError::Core(CoreError::Duplicate {
                field: "email",
                message: "This email is already registered for this event.".to_string(),
            }));
        }
    }
    if let Some(student_id) = &input.student_id {
        if RegistrationRepo::student_taken(&state.pool, existing.event_id, student_id, Some(id))
            .await?
        {
            return Err(AppError::Core(CoreError::Duplicate {
                field: "student_id",
                message: "This student ID is already registered for this event.".to_string(),
            }));
        }
    }

    let updated = RegistrationRepo::update(
        &state.pool,
        id,
        &UpdateRegistration {
            name: input.name,
            email: input.email,
            student_id: input.student_id,
            phone_number: input.phone_number,
            department: input.department,
            semester: input.semester,
        },
    )
    .await?
    .ok_or(AppError::Core(CoreError::NotFound {
        entity: "Registration",
        id,
    }))?;

    tracing::info!(registration_id = id, admin_id = user.user_id, "Registration updated");

    let event = EventRepo::find_by_id(&state.pool, updated.event_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Event",
            id: updated.event_id,
        }))?;

    Ok(Json(ApiResponse::new(
        RegistrationWithEvent {
            registration: updated,
            event,
        },
        "Registration updated successfully",
    )))
}

/// DELETE /api/registrations/{id}
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<()>>> {
    if !RegistrationRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Registration",
            id,
        }));
    }

    tracing::info!(registration_id = id, admin_id = user.user_id, "Registration deleted");

    Ok(Json(ApiResponse::new((), "Registration deleted successfully")))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Load a registration and its parent event, 404 if either is missing.
async fn load_with_event(state: &AppState, id: DbId) -> AppResult<(Registration, Event)> {
    let registration = RegistrationRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Registration",
            id,
        }))?;

    let event = EventRepo::find_by_id(&state.pool, registration.event_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Event",
            id: registration.event_id,
        }))?;

    Ok((registration, event))
}
