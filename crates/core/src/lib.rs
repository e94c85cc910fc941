//! Domain layer for the Eventify backend.
//!
//! Holds the pieces that do not depend on HTTP or the database driver:
//! error taxonomy, shared type aliases, role constants, event invariant
//! checks (dates, capacity, features), and the uploaded-image store.

pub mod error;
pub mod event;
pub mod roles;
pub mod storage;
pub mod types;
