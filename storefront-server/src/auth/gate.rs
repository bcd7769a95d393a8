//! Access policy gate
//!
//! Privileged handlers call [`authorize`] explicitly at the top,
//! before any work touches the stores.

use shared::models::UserRole;

use crate::auth::CurrentUser;
use crate::utils::AppError;

/// Check that the actor holds one of the required roles
pub fn authorize(actor: &CurrentUser, required: &[UserRole]) -> Result<(), AppError> {
    if required.contains(&actor.role) {
        Ok(())
    } else {
        Err(AppError::forbidden(
            "You do not have permission to perform this action",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(role: UserRole) -> CurrentUser {
        CurrentUser {
            id: "user:ada".to_string(),
            name: "Ada".to_string(),
            role,
        }
    }

    #[test]
    fn admin_passes_admin_gate() {
        assert!(authorize(&actor(UserRole::Admin), &[UserRole::Admin]).is_ok());
    }

    #[test]
    fn customer_fails_admin_gate() {
        let err = authorize(&actor(UserRole::Customer), &[UserRole::Admin]).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[test]
    fn multi_role_gates_accept_any_listed_role() {
        assert!(
            authorize(
                &actor(UserRole::Customer),
                &[UserRole::Admin, UserRole::Customer]
            )
            .is_ok()
        );
    }
}
