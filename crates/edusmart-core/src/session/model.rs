//! Session domain model.
//!
//! A `Session` is the authenticated identity returned by the login endpoint.
//! It is owned by the session store; other components only read it.

use crate::academic::Campus;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of the signed-in user as reported by the backend.
///
/// Unknown role strings are kept verbatim in `Other` so that a new backend
/// role does not break login; such roles pass no allow-list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    SuperAdmin,
    Admin,
    ClassTeacher,
    Teacher,
    Accountant,
    Other(String),
}

impl Role {
    /// Every role known to the client, in display order.
    pub const KNOWN: [Role; 5] = [
        Role::SuperAdmin,
        Role::Admin,
        Role::ClassTeacher,
        Role::Teacher,
        Role::Accountant,
    ];

    /// Wire identifier (`SUPER_ADMIN`, `ADMIN`, ...).
    pub fn as_str(&self) -> &str {
        match self {
            Role::SuperAdmin => "SUPER_ADMIN",
            Role::Admin => "ADMIN",
            Role::ClassTeacher => "CLASS_TEACHER",
            Role::Teacher => "TEACHER",
            Role::Accountant => "ACCOUNTANT",
            Role::Other(raw) => raw,
        }
    }

    /// Human readable label used in menus and user management.
    pub fn label(&self) -> &str {
        match self {
            Role::SuperAdmin => "Super Admin",
            Role::Admin => "Campus Admin",
            Role::ClassTeacher => "Class Teacher",
            Role::Teacher => "Subject Teacher",
            Role::Accountant => "Accountant",
            Role::Other(raw) => raw,
        }
    }

    /// The top-level administrative role sees every campus.
    pub fn is_top_level(&self) -> bool {
        matches!(self, Role::SuperAdmin)
    }

    pub fn is_teacher(&self) -> bool {
        matches!(self, Role::Teacher | Role::ClassTeacher)
    }
}

impl From<String> for Role {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "SUPER_ADMIN" => Role::SuperAdmin,
            "ADMIN" => Role::Admin,
            "CLASS_TEACHER" => Role::ClassTeacher,
            "TEACHER" => Role::Teacher,
            "ACCOUNTANT" => Role::Accountant,
            _ => Role::Other(raw),
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authenticated user identity.
///
/// The login response is stored as-is, so the field names follow the
/// backend payload (`_id`, `campuses`).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// User id
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    /// Display name
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub role: Role,
    /// Opaque bearer credential
    pub token: String,
    /// Campuses this user is scoped to (ignored for the top-level role)
    #[serde(default)]
    pub campuses: Vec<Campus>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("role", &self.role)
            .field("token", &"***")
            .field("campuses", &self.campuses)
            .finish()
    }
}

/// Login form payload.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

/// Lifecycle of the session as observed by the rest of the client.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// The persisted credential has not been read yet.
    #[default]
    Checking,
    SignedOut,
    SignedIn(Session),
}

impl SessionPhase {
    pub fn session(&self) -> Option<&Session> {
        match self {
            SessionPhase::SignedIn(session) => Some(session),
            _ => None,
        }
    }

    pub fn is_settled(&self) -> bool {
        !matches!(self, SessionPhase::Checking)
    }
}
