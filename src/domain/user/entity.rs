//! User entity and related types

use serde::{Deserialize, Serialize};

/// Numeric user identifier, used as the token subject
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(u64);

impl UserId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the inner numeric value
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl From<u64> for UserId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Role of a user account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[default]
    User,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

/// User identity record owned by a user directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    email: String,
    /// Display name
    name: String,
    role: UserRole,
    /// Credential secret - only the directory reads it, never serialized
    #[serde(skip_serializing, default)]
    password: String,
}

impl User {
    /// Create a new user
    pub fn new(
        id: UserId,
        email: impl Into<String>,
        name: impl Into<String>,
        role: UserRole,
        password: impl Into<String>,
    ) -> Self {
        Self {
            id,
            email: email.into(),
            name: name.into(),
            role,
            password: password.into(),
        }
    }

    // Getters

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> UserRole {
        self.role
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}
