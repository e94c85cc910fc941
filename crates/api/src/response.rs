//! Shared response envelope for API handlers.
//!
//! All API responses use the `{ "success": ..., "data": ..., "message": ... }`
//! envelope the frontend expects. Use [`ApiResponse`] instead of ad-hoc
//! `serde_json::json!` blocks to get compile-time type safety and consistent
//! serialization.

use serde::Serialize;

/// Standard success envelope: `{ "success": true, "data": T, "message": ... }`.
///
/// # Example
///
/// ```ignore
/// Ok(Json(ApiResponse::new(events, "Events retrieved successfully")))
/// ```
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
    pub message: String,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            message: message.into(),
        }
    }
}
