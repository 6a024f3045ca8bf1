//! Domain types shared by the persistence, service and API layers.
//!
//! Every service call takes the caller's identity explicitly; nothing reads
//! a "current user" from ambient state.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a User in the system.
///
/// This newtype wrapper keeps owner ids from being mixed up with record ids
/// (favorite id, playlist id, ...).
///
/// # Examples
///
/// ```rust
/// use sonora::domain::UserId;
///
/// let id = UserId::new(42);
/// assert_eq!(id.value(), 42);
/// assert_eq!(id.to_string(), "42");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct UserId(i32);

impl UserId {
    #[must_use]
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    /// Returns the underlying i32 value.
    #[must_use]
    pub const fn value(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<UserId> for i32 {
    fn from(id: UserId) -> Self {
        id.0
    }
}

impl From<i32> for UserId {
    fn from(id: i32) -> Self {
        Self::new(id)
    }
}

impl Serialize for UserId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_i32(self.0)
    }
}

impl<'de> Deserialize<'de> for UserId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let id = i32::deserialize(deserializer)?;
        Ok(Self::new(id))
    }
}

/// Identity of the caller, resolved per request by the auth middleware.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub is_admin: bool,
}

/// Authorization tier required by an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessTier {
    /// Operations scoped to the caller's own records.
    Owner,
    /// Global operations over every user's records.
    Admin,
}

impl CurrentUser {
    #[must_use]
    pub const fn has_tier(&self, tier: AccessTier) -> bool {
        match tier {
            AccessTier::Owner => true,
            AccessTier::Admin => self.is_admin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_serializes_as_number() {
        let json = serde_json::to_string(&UserId::new(7)).unwrap();
        assert_eq!(json, "7");
        let back: UserId = serde_json::from_str("7").unwrap();
        assert_eq!(back, UserId::new(7));
    }

    #[test]
    fn admin_tier_requires_flag() {
        let mut user = CurrentUser {
            id: UserId::new(1),
            username: "ana".to_string(),
            email: "ana@example.com".to_string(),
            is_admin: false,
        };
        assert!(user.has_tier(AccessTier::Owner));
        assert!(!user.has_tier(AccessTier::Admin));
        user.is_admin = true;
        assert!(user.has_tier(AccessTier::Admin));
    }
}
