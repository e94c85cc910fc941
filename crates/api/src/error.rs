use std::collections::BTreeMap;
use std::sync::OnceLock;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use eventify_core::error::CoreError;

/// Field name -> list of human-readable messages, rendered as the `errors`
/// object in 422/409 responses.
pub type FieldErrorMap = BTreeMap<&'static str, Vec<String>>;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses
/// in the `{ "success": false, "message": ..., "errors": ... }` envelope.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `eventify_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Request body failed declarative validation.
    #[error("Validation failed")]
    Validation(#[from] validator::ValidationErrors),

    /// Request was well-formed but semantically unprocessable, with
    /// per-field messages (e.g. bad credentials, unparseable dates).
    #[error("{message}")]
    FieldErrors {
        message: String,
        errors: FieldErrorMap,
    },

    /// The requested resource does not exist.
    #[error("{0}")]
    NotFound(String),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Shorthand for a 422 response carrying a single field message.
    pub fn field_error(field: &'static str, message: impl Into<String>) -> Self {
        let message = message.into();
        let mut errors = FieldErrorMap::new();
        errors.push_field(field, message.clone());
        AppError::FieldErrors { message, errors }
    }
}

/// Helper trait so handlers can accumulate field messages without
/// spelling out the entry/push dance every time.
pub trait PushField {
    fn push_field(&mut self, field: &'static str, message: impl Into<String>);
}

impl PushField for FieldErrorMap {
    fn push_field(&mut self, field: &'static str, message: impl Into<String>) {
        self.entry(field).or_default().push(message.into());
    }
}

static EXPOSE_ERROR_DETAIL: OnceLock<bool> = OnceLock::new();

/// Enable/disable raw error detail in 500 responses. Called once at startup
/// from the configured `EXPOSE_ERROR_DETAIL` flag; defaults to off.
pub fn set_expose_error_detail(enabled: bool) {
    let _ = EXPOSE_ERROR_DETAIL.set(enabled);
}

fn expose_detail() -> bool {
    *EXPOSE_ERROR_DETAIL.get().unwrap_or(&false)
}

/// What a classified error renders as: HTTP status, message, optional
/// per-field errors, optional raw detail (gated behind `expose_detail`).
struct ErrorParts {
    status: StatusCode,
    message: String,
    errors: Option<serde_json::Value>,
    detail: Option<String>,
}

impl ErrorParts {
    fn plain(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            errors: None,
            detail: None,
        }
    }

    fn with_fields(status: StatusCode, message: impl Into<String>, errors: &FieldErrorMap) -> Self {
        Self {
            status,
            message: message.into(),
            errors: serde_json::to_value(errors).ok(),
            detail: None,
        }
    }

    fn internal(detail: String) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "An internal error occurred".to_string(),
            errors: None,
            detail: Some(detail),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let parts = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => ErrorParts::plain(
                    StatusCode::NOT_FOUND,
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    ErrorParts::plain(StatusCode::UNPROCESSABLE_ENTITY, msg.clone())
                }
                CoreError::Duplicate { field, message } => {
                    let mut errors = FieldErrorMap::new();
                    errors.push_field(field, message.clone());
                    ErrorParts::with_fields(StatusCode::UNPROCESSABLE_ENTITY, message.clone(), &errors)
                }
                CoreError::CapacityExceeded { capacity } => ErrorParts::plain(
                    StatusCode::CONFLICT,
                    format!("This event is full ({capacity} spots taken)"),
                ),
                CoreError::Unauthorized(msg) => {
                    ErrorParts::plain(StatusCode::UNAUTHORIZED, msg.clone())
                }
                CoreError::Forbidden(msg) => ErrorParts::plain(StatusCode::FORBIDDEN, msg.clone()),
                CoreError::Storage(msg) => {
                    tracing::error!(error = %msg, "File storage error");
                    ErrorParts::internal(msg.clone())
                }
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    ErrorParts::internal(msg.clone())
                }
            },

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

            // --- Declarative validation failures ---
            AppError::Validation(errs) => ErrorParts {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                message: "The given data was invalid".to_string(),
                errors: Some(render_validation_errors(errs)),
                detail: None,
            },

            // --- HTTP-specific errors ---
            AppError::FieldErrors { message, errors } => {
                ErrorParts::with_fields(StatusCode::UNPROCESSABLE_ENTITY, message.clone(), errors)
            }
            AppError::NotFound(msg) => ErrorParts::plain(StatusCode::NOT_FOUND, msg.clone()),
            AppError::BadRequest(msg) => ErrorParts::plain(StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                ErrorParts::internal(msg.clone())
            }
        };

        let mut body = json!({
            "success": false,
            "message": parts.message,
        });
        if let Some(errors) = parts.errors {
            body["errors"] = errors;
        }
        if expose_detail() {
            if let Some(detail) = parts.detail {
                body["error"] = json!(detail);
            }
        }

        (parts.status, axum::Json(body)).into_response()
    }
}

/// Flatten `validator`'s nested error structure into
/// `{ "field": ["message", ...] }`.
fn render_validation_errors(errs: &validator::ValidationErrors) -> serde_json::Value {
    let map: BTreeMap<String, Vec<String>> = errs
        .field_errors()
        .iter()
        .map(|(field, errors)| {
            let messages = errors
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("The {field} field is invalid"))
                })
                .collect();
            (field.to_string(), messages)
        })
        .collect();
    json!(map)
}

/// Classify a sqlx error into response parts.
///
/// - `RowNotFound` maps to 404.
/// - Unique constraint violations (constraint name starting with `uq_`) map
///   to 422 with a field-attributed message, so a race that slips past the
///   handler's own duplicate pre-checks still renders the same way.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> ErrorParts {
    match err {
        sqlx::Error::RowNotFound => {
            ErrorParts::plain(StatusCode::NOT_FOUND, "Resource not found")
        }
        sqlx::Error::Database(db_err) => {
            // PostgreSQL unique constraint violation: error code 23505
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unknown");
                if let Some((field, message)) = unique_constraint_message(constraint) {
                    let mut errors = FieldErrorMap::new();
                    errors.push_field(field, message);
                    return ErrorParts::with_fields(
                        StatusCode::UNPROCESSABLE_ENTITY,
                        message,
                        &errors,
                    );
                }
                if constraint.starts_with("uq_") {
                    return ErrorParts::plain(
                        StatusCode::CONFLICT,
                        format!("Duplicate value violates unique constraint: {constraint}"),
                    );
                }
            }
            tracing::error!(error = %db_err, "Database error");
            ErrorParts::internal(db_err.to_string())
        }
        other => {
            tracing::error!(error = %other, "Database error");
            ErrorParts::internal(other.to_string())
        }
    }
}

/// Map known unique constraints to the field and message the client expects.
fn unique_constraint_message(constraint: &str) -> Option<(&'static str, &'static str)> {
    match constraint {
        "uq_users_email" => Some(("email", "This email is already taken.")),
        "uq_registrations_event_email" => Some((
            "email",
            "This email is already registered for this event.",
        )),
        "uq_registrations_event_student" => Some((
            "student_id",
            "This student ID is already registered for this event.",
        )),
        _ => None,
    }
}
