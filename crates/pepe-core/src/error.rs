//! Error types for the Pepe application.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the entire Pepe application.
///
/// This provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum PepeError {
    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Data access error (repository/storage layer)
    #[error("Data access error: {0}")]
    DataAccess(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A session cannot start (no plan selected, plan without sets).
    #[error("Cannot start session: {0}")]
    Precondition(String),

    /// The requested runner operation is not legal in the current phase.
    #[error("Cannot {action} while in phase '{phase}'")]
    InvalidTransition { phase: String, action: String },

    /// There is no stored draft to resume.
    #[error("No session draft to resume")]
    NoDraft,

    /// A stored draft references a plan that no longer exists.
    #[error("Session draft references missing plan '{plan_id}'")]
    StaleDraft { plan_id: String },

    /// An operation requires a running session but none is active.
    #[error("No active session")]
    NoActiveSession,

    /// A new session was requested while another one is still active.
    #[error("A session is already active")]
    SessionAlreadyActive,

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PepeError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a DataAccess error
    pub fn data_access(message: impl Into<String>) -> Self {
        Self::DataAccess(message.into())
    }

    /// Creates a Precondition error
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition(message.into())
    }

    /// Creates an InvalidTransition error
    pub fn invalid_transition(phase: impl Into<String>, action: impl Into<String>) -> Self {
        Self::InvalidTransition {
            phase: phase.into(),
            action: action.into(),
        }
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a Precondition error
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::Precondition(_))
    }

    /// Check if this is an InvalidTransition error
    pub fn is_invalid_transition(&self) -> bool {
        matches!(self, Self::InvalidTransition { .. })
    }

    /// Check if a resume failed because the draft's plan is gone.
    ///
    /// Callers use this to offer discard-only recovery, which is different
    /// from the "nothing to resume" case reported by [`PepeError::NoDraft`].
    pub fn is_stale_draft(&self) -> bool {
        matches!(self, Self::StaleDraft { .. })
    }

    /// Check if this is a NoDraft error
    pub fn is_no_draft(&self) -> bool {
        matches!(self, Self::NoDraft)
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for PepeError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for PepeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for PepeError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for PepeError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, PepeError>`.
pub type Result<T> = std::result::Result<T, PepeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = PepeError::not_found("workout_plan", "plan-1");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Entity not found: workout_plan 'plan-1'");
    }

    #[test]
    fn test_stale_draft_is_distinct_from_no_draft() {
        let stale = PepeError::StaleDraft {
            plan_id: "gone".to_string(),
        };
        assert!(stale.is_stale_draft());
        assert!(!stale.is_no_draft());
        assert!(PepeError::NoDraft.is_no_draft());
        assert!(!PepeError::NoDraft.is_stale_draft());
    }

    #[test]
    fn test_invalid_transition_message() {
        let err = PepeError::invalid_transition("rest", "complete set");
        assert!(err.is_invalid_transition());
        assert_eq!(err.to_string(), "Cannot complete set while in phase 'rest'");
    }

    #[test]
    fn test_from_json_error() {
        let err: PepeError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, PepeError::Serialization { ref format, .. } if format == "JSON"));
    }
}
