//! User entity - staff accounts of a shop.
//!
//! The role is reflected by the client only; the server enforces it.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Staff role. `SuperAdmin` sees purchase prices, financial aggregates and user management.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Shop owner.
    SuperAdmin,
    /// Staff member.
    Admin,
}

impl Role {
    /// Wire and display name of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SuperAdmin => "SuperAdmin",
            Self::Admin => "Admin",
        }
    }

    /// Whether the role sees the owner-only affordances.
    #[must_use]
    pub const fn is_super_admin(self) -> bool {
        matches!(self, Self::SuperAdmin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "SuperAdmin" => Ok(Self::SuperAdmin),
            "Admin" => Ok(Self::Admin),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

/// User record as returned by `/login`, `/register`, `/me` and `/users`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Server id.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Access level.
    pub role: Role,
    /// Shop the account belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shop_id: Option<i64>,
}
