//! Well-known role name constants.
//!
//! These must match the seed data in `20250825000001_create_roles_and_users.sql`.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_STUDENT: &str = "student";

/// The closed set of valid roles.
pub const ALL_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_STUDENT];

/// Check whether `role` is one of the known role names.
pub fn is_valid_role(role: &str) -> bool {
    ALL_ROLES.contains(&role)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_roles_are_valid() {
        assert!(is_valid_role("admin"));
        assert!(is_valid_role("student"));
    }

    #[test]
    fn unknown_roles_are_rejected() {
        assert!(!is_valid_role("user"));
        assert!(!is_valid_role(""));
        assert!(!is_valid_role("Admin"));
    }
}
