//! RBAC helpers for role-based route guarding.

use supplyhub_core::error::AppError;

use crate::extractors::AuthUser;

/// Checks that the authenticated user has the Admin role.
pub fn require_admin(auth: &AuthUser) -> Result<(), AppError> {
    if !auth.is_admin() {
        return Err(AppError::authorization("Admin access required"));
    }
    Ok(())
}

/// Checks that the caller may use the notification inbox endpoints.
pub fn require_inbox_access(auth: &AuthUser) -> Result<(), AppError> {
    if !auth.role.can_read_notifications() {
        return Err(AppError::authorization("Admin or Vendor access required"));
    }
    Ok(())
}
