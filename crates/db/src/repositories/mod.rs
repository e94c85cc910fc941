//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Methods that must run
//! inside a caller-owned transaction take `&mut PgConnection` instead
//! and carry an `_in` suffix.

pub mod event_repo;
pub mod registration_repo;
pub mod role_repo;
pub mod session_repo;
pub mod user_repo;

pub use event_repo::EventRepo;
pub use registration_repo::RegistrationRepo;
pub use role_repo::RoleRepo;
pub use session_repo::SessionRepo;
pub use user_repo::UserRepo;
