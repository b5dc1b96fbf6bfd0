//! User role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Roles issued by the platform's identity service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Platform administrator.
    Admin,
    /// A vendor account.
    Vendor,
    /// A supplier account.
    Supplier,
}

impl UserRole {
    /// Check if this role is an admin.
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Roles allowed to use the notification endpoints.
    pub fn can_read_notifications(&self) -> bool {
        matches!(self, Self::Admin | Self::Vendor)
    }

    /// Return the role as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Vendor => "vendor",
            Self::Supplier => "supplier",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = supplyhub_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "vendor" => Ok(Self::Vendor),
            "supplier" => Ok(Self::Supplier),
            _ => Err(supplyhub_core::AppError::validation(format!(
                "Invalid user role: '{s}'. Expected one of: admin, vendor, supplier"
            ))),
        }
    }
}
