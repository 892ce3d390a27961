//! Unified error system for the badge permission engine
//!
//! A single error type covers malformed input. Permission denials are not
//! errors: validators report them as a verdict so callers can explain them.

use serde::{Deserialize, Serialize};

/// Unified error type for all engine operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum BadgesError {
    /// Invalid input or configuration
    #[error("Invalid: {message}")]
    Invalid {
        /// Error message describing the invalid input
        message: String,
    },

    /// The current (old) value handed to a validator is malformed
    #[error("InvalidOldValue: {message}")]
    InvalidOldValue {
        /// Error message describing the broken invariant
        message: String,
    },

    /// The proposed (new) value handed to a validator is malformed
    #[error("InvalidNewValue: {message}")]
    InvalidNewValue {
        /// Error message describing the broken invariant
        message: String,
    },

    /// Referenced address list or value does not exist
    #[error("Not found: {message}")]
    NotFound {
        /// Error message describing what was not found
        message: String,
    },

    /// Permission denied
    #[error("Permission denied: {message}")]
    PermissionDenied {
        /// Error message describing the permission issue
        message: String,
    },

    /// Internal system error
    #[error("Internal error: {message}")]
    Internal {
        /// Error message describing the internal error
        message: String,
    },
}

impl BadgesError {
    /// Create an invalid input error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    /// Create an invalid old value error
    pub fn invalid_old_value(message: impl Into<String>) -> Self {
        Self::InvalidOldValue {
            message: message.into(),
        }
    }

    /// Create an invalid new value error
    pub fn invalid_new_value(message: impl Into<String>) -> Self {
        Self::InvalidNewValue {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a permission denied error
    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::PermissionDenied {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Re-label an input error as belonging to the old side of an update.
    pub fn into_old_value(self) -> Self {
        match self {
            Self::Invalid { message } | Self::NotFound { message } => {
                Self::invalid_old_value(message)
            }
            other => other,
        }
    }

    /// Re-label an input error as belonging to the new side of an update.
    pub fn into_new_value(self) -> Self {
        match self {
            Self::Invalid { message } | Self::NotFound { message } => {
                Self::invalid_new_value(message)
            }
            other => other,
        }
    }

    /// True for the soft, recoverable denial class.
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::PermissionDenied { .. })
    }
}

/// Standard Result type for engine operations
pub type Result<T> = std::result::Result<T, BadgesError>;

impl From<std::io::Error> for BadgesError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::not_found(err.to_string()),
            std::io::ErrorKind::PermissionDenied => Self::permission_denied(err.to_string()),
            _ => Self::internal(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for BadgesError {
    fn from(err: serde_json::Error) -> Self {
        Self::invalid(format!("Invalid JSON: {err}"))
    }
}

impl From<toml::de::Error> for BadgesError {
    fn from(err: toml::de::Error) -> Self {
        Self::invalid(format!("Invalid TOML: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = BadgesError::invalid("test message");
        assert!(matches!(err, BadgesError::Invalid { .. }));
        assert_eq!(err.to_string(), "Invalid: test message");
    }

    #[test]
    fn test_side_relabelling() {
        let err = BadgesError::invalid("overlapping timeline").into_old_value();
        assert_eq!(err.to_string(), "InvalidOldValue: overlapping timeline");

        let err = BadgesError::not_found("list xyz").into_new_value();
        assert!(matches!(err, BadgesError::InvalidNewValue { .. }));

        let denied = BadgesError::permission_denied("nope").into_new_value();
        assert!(denied.is_permission_denied());
    }

    #[test]
    fn test_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = BadgesError::from(io_err);
        assert!(matches!(err, BadgesError::NotFound { .. }));
    }
}
