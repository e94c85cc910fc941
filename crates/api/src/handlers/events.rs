//! Handlers for the `/events` resource.
//!
//! Create and update accept `multipart/form-data` so the event poster image
//! can travel with the rest of the form. Text parts are collected into a map
//! first, then parsed and validated as a whole so error responses can name
//! the offending field.

use std::collections::BTreeMap;

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{NaiveDate, NaiveTime, Utc};
use serde::Serialize;

use eventify_core::error::CoreError;
use eventify_core::event::{
    validate_capacity, validate_features, validate_schedule, LocationType, MAX_CATEGORY_LEN,
    MAX_NAME_LEN,
};
use eventify_core::storage::{
    delete_event_image, generate_image_filename, save_event_image, validate_image_upload,
};
use eventify_core::types::DbId;
use eventify_db::models::event::{CreateEvent, Event, UpdateEvent};
use eventify_db::repositories::{EventRepo, RegistrationRepo};

use crate::error::{AppError, AppResult, FieldErrorMap, PushField};
use crate::middleware::rbac::RequireAdmin;
use crate::response::ApiResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// A single event in a listing, with its public image URL and live
/// registration count.
#[derive(Debug, Serialize)]
pub struct EventListItem {
    #[serde(flatten)]
    pub event: Event,
    pub image_url: Option<String>,
    pub registration_count: i64,
}

/// Detail payload for a single event.
#[derive(Debug, Serialize)]
pub struct EventDetail {
    pub event: Event,
    pub image_url: Option<String>,
    pub registration_count: i64,
}

/// Build the public URL for a stored image filename.
fn image_url(state: &AppState, filename: Option<&str>) -> Option<String> {
    filename.map(|f| format!("{}/storage/events/{f}", state.config.public_base_url))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/events
///
/// Admin listing of all events, newest first, with registration counts.
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_user): RequireAdmin,
) -> AppResult<Json<ApiResponse<Vec<EventListItem>>>> {
    let items = list_items(&state).await?;
    Ok(Json(ApiResponse::new(items, "Events retrieved successfully")))
}

/// GET /api/events/available
///
/// Public listing used by the registration page. Counts are included so the
/// client can render remaining capacity.
pub async fn available(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<EventListItem>>>> {
    let items = list_items(&state).await?;
    Ok(Json(ApiResponse::new(
        items,
        "Available events retrieved successfully",
    )))
}

async fn list_items(state: &AppState) -> AppResult<Vec<EventListItem>> {
    let rows = EventRepo::list_with_counts(&state.pool).await?;
    Ok(rows
        .into_iter()
        .map(|row| {
            let url = image_url(state, row.event.event_image.as_deref());
            EventListItem {
                event: row.event,
                image_url: url,
                registration_count: row.registration_count,
            }
        })
        .collect())
}

/// GET /api/events/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    RequireAdmin(_user): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<EventDetail>>> {
    let event = EventRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Event", id }))?;
    let registration_count = RegistrationRepo::count_by_event(&state.pool, id).await?;

    let url = image_url(&state, event.event_image.as_deref());
    Ok(Json(ApiResponse::new(
        EventDetail {
            event,
            image_url: url,
            registration_count,
        },
        "Event retrieved successfully",
    )))
}

/// POST /api/events
///
/// Create an event from a multipart form. The optional `event_image` part is
/// stored on disk before the row is inserted; on insert failure the stored
/// file is removed again.
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<ApiResponse<EventDetail>>)> {
    let form = parse_event_form(&mut multipart).await?;
    let input = build_create_input(&form)?;

    let stored_image = match &form.image {
        Some((filename, data)) => {
            let ext = validate_image_upload(filename, data)?;
            let stored = generate_image_filename(&ext);
            save_event_image(&state.config.upload_dir, &stored, data).await?;
            Some(stored)
        }
        None => None,
    };

    let input = CreateEvent {
        event_image: stored_image.clone(),
        ..input
    };

    let event = match EventRepo::create(&state.pool, &input).await {
        Ok(event) => event,
        Err(e) => {
            if let Some(filename) = &stored_image {
                // Best effort: the insert already failed, don't mask its error.
                let _ = delete_event_image(&state.config.upload_dir, filename).await;
            }
            return Err(e.into());
        }
    };

    tracing::info!(event_id = event.id, admin_id = user.user_id, "Event created");

    let url = image_url(&state, event.event_image.as_deref());
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            EventDetail {
                event,
                image_url: url,
                registration_count: 0,
            },
            "Event created successfully",
        )),
    ))
}

/// PUT /api/events/{id}
///
/// Partial update: only the fields present in the form change. Supplying a
/// new `event_image` replaces the stored file; the old file is deleted after
/// the row update succeeds.
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    Path(id): Path<DbId>,
    mut multipart: Multipart,
) -> AppResult<Json<ApiResponse<EventDetail>>> {
    let existing = EventRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Event", id }))?;

    let form = parse_event_form(&mut multipart).await?;
    let mut input = build_update_input(&form, &existing)?;

    let new_image = match &form.image {
        Some((filename, data)) => {
            let ext = validate_image_upload(filename, data)?;
            let stored = generate_image_filename(&ext);
            save_event_image(&state.config.upload_dir, &stored, data).await?;
            input.event_image = Some(stored.clone());
            Some(stored)
        }
        None => None,
    };

    let updated = match EventRepo::update(&state.pool, id, &input).await {
        Ok(Some(event)) => event,
        Ok(None) => {
            if let Some(filename) = &new_image {
                let _ = delete_event_image(&state.config.upload_dir, filename).await;
            }
            return Err(AppError::Core(CoreError::NotFound { entity: "Event", id }));
        }
        Err(e) => {
            if let Some(filename) = &new_image {
                let _ = delete_event_image(&state.config.upload_dir, filename).await;
            }
            return Err(e.into());
        }
    };

    // The old image is orphaned once the row points at the new one.
    if new_image.is_some() {
        if let Some(old) = &existing.event_image {
            delete_event_image(&state.config.upload_dir, old).await?;
        }
    }

    tracing::info!(event_id = id, admin_id = user.user_id, "Event updated");

    let registration_count = RegistrationRepo::count_by_event(&state.pool, id).await?;
    let url = image_url(&state, updated.event_image.as_deref());
    Ok(Json(ApiResponse::new(
        EventDetail {
            event: updated,
            image_url: url,
            registration_count,
        },
        "Event updated successfully",
    )))
}

/// DELETE /api/events/{id}
///
/// Deletes the stored image first; if that fails the event row is left
/// untouched. Registrations are removed by `ON DELETE CASCADE`.
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<()>>> {
    let event = EventRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Event", id }))?;

    if let Some(filename) = &event.event_image {
        delete_event_image(&state.config.upload_dir, filename).await?;
    }

    if !EventRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound { entity: "Event", id }));
    }

    tracing::info!(event_id = id, admin_id = user.user_id, "Event deleted");

    Ok(Json(ApiResponse::new((), "Event deleted successfully")))
}

// ---------------------------------------------------------------------------
// Multipart form parsing
// ---------------------------------------------------------------------------

/// Raw multipart form contents, before typed parsing.
struct EventForm {
    text: BTreeMap<String, String>,
    features: Vec<String>,
    /// `(original_filename, bytes)` of the uploaded image, if any.
    image: Option<(String, Vec<u8>)>,
}

impl EventForm {
    fn text(&self, field: &str) -> Option<&str> {
        self.text.get(field).map(String::as_str).filter(|s| !s.is_empty())
    }
}

/// Collect all multipart parts into an [`EventForm`].
///
/// Repeated `event_features` parts (with or without the `[]` suffix) append
/// to the feature list; unknown parts are ignored.
async fn parse_event_form(multipart: &mut Multipart) -> Result<EventForm, AppError> {
    let mut form = EventForm {
        text: BTreeMap::new(),
        features: Vec::new(),
        image: None,
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "event_image" => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                form.image = Some((filename, data.to_vec()));
            }
            "event_features" | "event_features[]" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                form.features.push(text);
            }
            "" => {} // ignore unnamed parts
            _ => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                form.text.insert(name, text);
            }
        }
    }

    Ok(form)
}

/// Text fields required when creating an event.
const REQUIRED_FIELDS: &[&str] = &[
    "title",
    "description",
    "start_date",
    "end_date",
    "event_time",
    "location_type",
    "location",
    "category",
    "capacity",
    "organizer",
];

/// Parse and validate a full create form.
fn build_create_input(form: &EventForm) -> Result<CreateEvent, AppError> {
    let mut errors = FieldErrorMap::new();
    for &field in REQUIRED_FIELDS {
        if form.text(field).is_none() {
            errors.push_field(field, format!("The {field} field is required."));
        }
    }
    if form.features.is_empty() {
        errors.push_field("event_features", "The event features field is required.");
    }
    if !errors.is_empty() {
        return Err(AppError::FieldErrors {
            message: "The given data was invalid".to_string(),
            errors,
        });
    }

    check_text_lengths(form)?;

    // All required fields verified present above.
    let title = form.text("title").unwrap_or_default().to_string();
    let description = form.text("description").unwrap_or_default().to_string();
    let location = form.text("location").unwrap_or_default().to_string();
    let category = form.text("category").unwrap_or_default().to_string();
    let organizer = form.text("organizer").unwrap_or_default().to_string();

    let start_date = parse_date_field(form, "start_date")?.unwrap_or_default();
    let end_date = parse_date_field(form, "end_date")?.unwrap_or_default();
    let event_time = parse_time_field(form, "event_time")?.unwrap_or_default();
    let capacity = parse_capacity_field(form)?.unwrap_or_default();
    let location_type =
        LocationType::from_name(form.text("location_type").unwrap_or_default())?;

    validate_schedule(start_date, end_date, Utc::now().date_naive(), true)?;
    validate_capacity(capacity)?;
    validate_features(&form.features)?;

    Ok(CreateEvent {
        title,
        description,
        start_date,
        end_date,
        event_time,
        location_type: location_type.name().to_string(),
        location,
        category,
        capacity,
        organizer,
        event_image: None,
        event_features: form.features.clone(),
    })
}

/// Parse and validate a partial update form against the existing row.
///
/// Schedule invariants are checked against the merged values: a form that
/// only moves `end_date` still cannot place it before the current start.
/// The not-in-the-past rule applies only when `start_date` itself changes.
fn build_update_input(form: &EventForm, existing: &Event) -> Result<UpdateEvent, AppError> {
    check_text_lengths(form)?;

    let start_date = parse_date_field(form, "start_date")?;
    let end_date = parse_date_field(form, "end_date")?;
    let event_time = parse_time_field(form, "event_time")?;
    let capacity = parse_capacity_field(form)?;

    let location_type = form
        .text("location_type")
        .map(LocationType::from_name)
        .transpose()?;

    if start_date.is_some() || end_date.is_some() {
        let effective_start = start_date.unwrap_or(existing.start_date);
        let effective_end = end_date.unwrap_or(existing.end_date);
        validate_schedule(
            effective_start,
            effective_end,
            Utc::now().date_naive(),
            start_date.is_some(),
        )?;
    }
    if let Some(capacity) = capacity {
        validate_capacity(capacity)?;
    }
    if !form.features.is_empty() {
        validate_features(&form.features)?;
    }

    Ok(UpdateEvent {
        title: form.text("title").map(str::to_string),
        description: form.text("description").map(str::to_string),
        start_date,
        end_date,
        event_time,
        location_type: location_type.map(|t| t.name().to_string()),
        location: form.text("location").map(str::to_string),
        category: form.text("category").map(str::to_string),
        capacity,
        organizer: form.text("organizer").map(str::to_string),
        event_image: None,
        event_features: (!form.features.is_empty()).then(|| form.features.clone()),
    })
}

/// Length ceilings for the free-text fields, applied to whichever are present.
fn check_text_lengths(form: &EventForm) -> Result<(), AppError> {
    let limits: &[(&'static str, usize)] = &[
        ("title", MAX_NAME_LEN),
        ("location", MAX_NAME_LEN),
        ("organizer", MAX_NAME_LEN),
        ("category", MAX_CATEGORY_LEN),
    ];

    let mut errors = FieldErrorMap::new();
    for &(field, max) in limits {
        if let Some(value) = form.text(field) {
            if value.chars().count() > max {
                errors.push_field(
                    field,
                    format!("The {field} may not be greater than {max} characters."),
                );
            }
        }
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::FieldErrors {
            message: "The given data was invalid".to_string(),
            errors,
        })
    }
}

fn parse_date_field(form: &EventForm, field: &'static str) -> Result<Option<NaiveDate>, AppError> {
    form.text(field)
        .map(|value| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
                AppError::field_error(field, format!("The {field} is not a valid date."))
            })
        })
        .transpose()
}

fn parse_time_field(form: &EventForm, field: &'static str) -> Result<Option<NaiveTime>, AppError> {
    form.text(field)
        .map(|value| {
            NaiveTime::parse_from_str(value, "%H:%M")
                .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
                .map_err(|_| {
                    AppError::field_error(field, format!("The {field} is not a valid time."))
                })
        })
        .transpose()
}

fn parse_capacity_field(form: &EventForm) -> Result<Option<i32>, AppError> {
    form.text("capacity")
        .map(|value| {
            value.parse::<i32>().map_err(|_| {
                AppError::field_error("capacity", "The capacity must be an integer.")
            })
        })
        .transpose()
}
