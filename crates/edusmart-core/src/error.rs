//! Error types for the EduSmart client.

use serde::Serialize;
use thiserror::Error;

/// A shared error type for every EduSmart crate.
///
/// Variants follow the failure taxonomy of the client: authentication and
/// authorization outcomes, context resolution failures, local validation
/// failures, and transport-level errors from the backend.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
pub enum EduError {
    /// No valid session (missing, expired or rejected credential)
    #[error("Not authenticated")]
    Unauthenticated,

    /// Valid session, but the role is not allowed to access the location
    #[error("Role '{role}' is not authorized for '{location}'")]
    Unauthorized { role: String, location: String },

    /// Fetching years or campuses failed while resolving the academic context
    #[error("Failed to sync academic session: {0}")]
    ContextResolution(String),

    /// An id passed to a change operation is not in the available list
    #[error("Invalid selection: {entity_type} '{id}' is not available")]
    Validation {
        entity_type: &'static str,
        id: String,
    },

    /// The backend answered with a non-success status
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The request did not complete within the configured timeout
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Connection-level failure (DNS, refused, reset)
    #[error("Network error: {0}")]
    Network(String),

    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl EduError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    pub fn unauthorized(role: impl Into<String>, location: impl Into<String>) -> Self {
        Self::Unauthorized {
            role: role.into(),
            location: location.into(),
        }
    }

    pub fn context_resolution(message: impl Into<String>) -> Self {
        Self::ContextResolution(message.into())
    }

    /// Creates a Validation error for an id missing from an available list
    pub fn invalid_selection(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::Validation {
            entity_type,
            id: id.into(),
        }
    }

    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, Self::Unauthenticated)
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this error came from the transport rather than from local logic.
    ///
    /// Returns true for HTTP status failures, timeouts and connection errors.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Http { .. } | Self::Timeout(_) | Self::Network(_)
        )
    }

    /// Message suitable for a user-facing notification.
    ///
    /// Server-provided messages are shown verbatim; everything else falls
    /// back to the generic text the dashboards use.
    pub fn user_message(&self) -> String {
        match self {
            Self::Http { message, .. } if !message.is_empty() => message.clone(),
            Self::Validation { .. } | Self::ContextResolution(_) => self.to_string(),
            Self::Unauthenticated => "Your session has expired. Please sign in again.".to_string(),
            _ => "Something went wrong".to_string(),
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for EduError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for EduError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for EduError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for EduError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<anyhow::Error> for EduError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A type alias for `Result<T, EduError>`.
pub type Result<T> = std::result::Result<T, EduError>;
