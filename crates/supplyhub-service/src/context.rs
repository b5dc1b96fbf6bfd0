//! Request context carrying the authenticated caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use supplyhub_entity::user::UserRole;

/// Who is acting on the current request.
///
/// Built from the bearer token by the API layer and passed into service
/// methods that scope results to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    pub user_id: Uuid,
    pub role: UserRole,
    /// Vendor or supplier the caller belongs to.
    pub tenant_id: Option<Uuid>,
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    pub fn new(user_id: Uuid, role: UserRole, tenant_id: Option<Uuid>) -> Self {
        Self {
            user_id,
            role,
            tenant_id,
            request_time: Utc::now(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}
