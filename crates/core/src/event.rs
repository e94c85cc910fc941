//! Event invariant checks and the capacity guard.
//!
//! Provides location-type validation, schedule/feature-list invariants,
//! and the pure capacity check consulted before accepting a registration.

use chrono::NaiveDate;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum length for title, location, and organizer fields.
pub const MAX_NAME_LEN: usize = 255;

/// Maximum length for the category field and each feature entry.
pub const MAX_CATEGORY_LEN: usize = 100;

// ---------------------------------------------------------------------------
// Location type
// ---------------------------------------------------------------------------

/// Event location type matching the `events.location_type` CHECK constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationType {
    Offline,
    Virtual,
}

impl LocationType {
    /// Parse from the database `location_type` column.
    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        match name {
            "offline" => Ok(Self::Offline),
            "virtual" => Ok(Self::Virtual),
            other => Err(CoreError::Validation(format!(
                "Location type must be either offline or virtual, got '{other}'"
            ))),
        }
    }

    /// Database name value.
    pub fn name(self) -> &'static str {
        match self {
            Self::Offline => "offline",
            Self::Virtual => "virtual",
        }
    }
}

// ---------------------------------------------------------------------------
// Invariant checks
// ---------------------------------------------------------------------------

/// Validate the schedule invariants for an event.
///
/// - `end_date >= start_date` always.
/// - `start_date >= today` only when `check_start_not_past` is set
///   (creation-time rule; not re-checked when reading or patching other fields).
pub fn validate_schedule(
    start_date: NaiveDate,
    end_date: NaiveDate,
    today: NaiveDate,
    check_start_not_past: bool,
) -> Result<(), CoreError> {
    if check_start_not_past && start_date < today {
        return Err(CoreError::Validation(
            "Start date must be today or a future date".into(),
        ));
    }
    if end_date < start_date {
        return Err(CoreError::Validation(
            "End date must be on or after the start date".into(),
        ));
    }
    Ok(())
}

/// Validate that `capacity` is at least 1.
pub fn validate_capacity(capacity: i32) -> Result<(), CoreError> {
    if capacity < 1 {
        return Err(CoreError::Validation("Capacity must be at least 1".into()));
    }
    Ok(())
}

/// Validate the event feature list: at least one entry, each non-empty
/// and at most [`MAX_CATEGORY_LEN`] characters.
pub fn validate_features(features: &[String]) -> Result<(), CoreError> {
    if features.is_empty() {
        return Err(CoreError::Validation(
            "At least one event feature is required".into(),
        ));
    }
    for feature in features {
        if feature.trim().is_empty() {
            return Err(CoreError::Validation("Event feature cannot be empty".into()));
        }
        if feature.len() > MAX_CATEGORY_LEN {
            return Err(CoreError::Validation(format!(
                "Event feature must be at most {MAX_CATEGORY_LEN} characters"
            )));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Capacity guard
// ---------------------------------------------------------------------------

/// Whether an event with `capacity` slots can accept another registration
/// given `registered` current registrations.
pub fn has_capacity(registered: i64, capacity: i32) -> bool {
    registered < i64::from(capacity)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
