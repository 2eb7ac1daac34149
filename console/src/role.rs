//! Staff role hierarchy.
//!
//! DESIGN
//! ======
//! Roles form a total order used only for access checks:
//! `admin > pasteur > media > user`. The rank lives in one place
//! ([`Role::rank`]) and `Ord` is derived from it, so call sites compare roles
//! directly instead of juggling numbers.

#[cfg(test)]
#[path = "role_test.rs"]
mod role_test;

use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;

/// A staff role as reported by the backend.
///
/// Unrecognised role strings deserialize to [`Role::User`], the lowest rank.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Role {
    Admin,
    Pasteur,
    Media,
    User,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::Pasteur, Role::Media, Role::User];

    /// Numeric rank used for comparisons. Higher means more privileged.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Admin => 3,
            Self::Pasteur => 2,
            Self::Media => 1,
            Self::User => 0,
        }
    }

    /// True when this role satisfies a `required` minimum.
    #[must_use]
    pub fn at_least(self, required: Role) -> bool {
        self.rank() >= required.rank()
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Pasteur => "pasteur",
            Self::Media => "media",
            Self::User => "user",
        }
    }

    /// Parse a role name. Returns `None` for names outside the closed set.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "admin" => Some(Self::Admin),
            "pasteur" => Some(Self::Pasteur),
            "media" => Some(Self::Media),
            "user" => Some(Self::User),
            _ => None,
        }
    }

    /// Human label shown next to the signed-in user.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Admin => "Administrator",
            Self::Pasteur => "Pastor",
            Self::Media => "Media team",
            Self::User => "User",
        }
    }
}

impl From<String> for Role {
    fn from(raw: String) -> Self {
        Self::parse(&raw).unwrap_or_else(|| {
            tracing::debug!(role = %raw, "unknown role; ranking as user");
            Self::User
        })
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown role `{s}` (expected admin, pasteur, media or user)"))
    }
}

impl PartialOrd for Role {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Role {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
