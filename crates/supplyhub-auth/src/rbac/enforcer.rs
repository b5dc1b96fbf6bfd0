//! RBAC enforcement: which role may do what, and on whose records.

use uuid::Uuid;

use supplyhub_core::error::AppError;
use supplyhub_entity::user::UserRole;

/// Operations guarded by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationPermission {
    /// List, fetch, and view stats.
    Read,
    /// Mark as read and delete.
    Manage,
    /// Trigger template notifications for arbitrary recipients.
    Send,
}

/// Enforces the role policy for the notification endpoints.
#[derive(Debug, Clone, Default)]
pub struct RbacEnforcer;

impl RbacEnforcer {
    pub fn new() -> Self {
        Self
    }

    /// Whether `role` holds `permission`.
    pub fn has_permission(&self, role: UserRole, permission: NotificationPermission) -> bool {
        match role {
            UserRole::Admin => true,
            UserRole::Vendor => matches!(
                permission,
                NotificationPermission::Read | NotificationPermission::Manage
            ),
            UserRole::Supplier => false,
        }
    }

    pub fn require_permission(
        &self,
        role: UserRole,
        permission: NotificationPermission,
    ) -> Result<(), AppError> {
        if self.has_permission(role, permission) {
            Ok(())
        } else {
            Err(AppError::authorization(format!(
                "Role '{role}' does not have permission '{permission:?}'"
            )))
        }
    }

    /// Non-admins may only act on notifications addressed to them.
    pub fn require_owner_or_admin(
        &self,
        role: UserRole,
        caller: Uuid,
        owner: Uuid,
    ) -> Result<(), AppError> {
        if role.is_admin() || caller == owner {
            Ok(())
        } else {
            Err(AppError::authorization(
                "Not allowed to access another user's notification",
            ))
        }
    }
}
