use thiserror::Error;

/// Errors returned by [`crate::PortalClientV1`] implementations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PortalError {
    /// The request never produced a usable HTTP response.
    #[error("transport error: {message}")]
    Transport { message: String },

    /// The backend answered with `success: false` or a non-2xx status.
    #[error("{message}")]
    Application { message: String },

    /// The backend rejected the session token. The session has been cleared.
    #[error("unauthorized: {message}")]
    Unauthorized { message: String },

    /// The response body did not match the expected shape.
    #[error("failed to decode response: {message}")]
    Decode { message: String },

    #[error("not found: {message}")]
    NotFound { message: String },

    /// The operation is not offered for this collection.
    #[error("unsupported operation: {operation}")]
    Unsupported { operation: &'static str },

    #[error("invalid input: {message}")]
    Validation { message: String },
}

impl PortalError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn application(message: impl Into<String>) -> Self {
        Self::Application {
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn unsupported(operation: &'static str) -> Self {
        Self::Unsupported { operation }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn application_error_displays_backend_message() {
        let err = PortalError::application("Intern not found");
        assert_eq!(err.to_string(), "Intern not found");
    }

    #[test]
    fn unsupported_names_operation() {
        let err = PortalError::unsupported("delete");
        assert_eq!(err.to_string(), "unsupported operation: delete");
        assert!(!err.is_unauthorized());
        assert!(PortalError::unauthorized("expired").is_unauthorized());
    }
}
