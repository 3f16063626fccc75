/// Role-based access checks
///
/// Accounts carry a single [`UserRole`]. Routes declare the roles they allow
/// and [`require_roles`] enforces the list.
///
/// # Example
///
/// ```
/// use techclub_shared::auth::authorization::{require_roles, REVIEWERS};
/// use techclub_shared::models::user::UserRole;
///
/// assert!(require_roles(Some(UserRole::Board), REVIEWERS).is_ok());
/// assert!(require_roles(Some(UserRole::Member), REVIEWERS).is_err());
/// assert!(require_roles(None, REVIEWERS).is_err());
/// ```

use crate::models::user::UserRole;

/// Roles that may review applications and read club-internal data
pub const REVIEWERS: &[UserRole] = &[UserRole::Board, UserRole::Admin];

/// Admin-only operations
pub const ADMINS: &[UserRole] = &[UserRole::Admin];

/// Error type for authorization checks
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthzError {
    /// No authenticated user
    #[error("Authentication required")]
    Unauthenticated,

    /// Role not in the allow-list
    #[error("Insufficient permissions")]
    InsufficientRole {
        required: Vec<UserRole>,
        actual: UserRole,
    },
}

/// Checks `role` against an allow-list
///
/// # Errors
///
/// `Unauthenticated` when there is no user, `InsufficientRole` when the role
/// isn't listed.
pub fn require_roles(role: Option<UserRole>, allowed: &[UserRole]) -> Result<(), AuthzError> {
    let actual = role.ok_or(AuthzError::Unauthenticated)?;

    if !allowed.contains(&actual) {
        return Err(AuthzError::InsufficientRole {
            required: allowed.to_vec(),
            actual,
        });
    }

    Ok(())
}
