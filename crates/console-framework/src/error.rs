//! # Console Errors
//!
//! This module defines the error taxonomy shared by the router, the readiness
//! registry and every resource manager. Errors are `Clone` so a single
//! failure can be handed to every waiter of a module handle.

/// Errors that can occur within the console core.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConsoleError {
    /// Navigation to a section that was never declared.
    #[error("Unknown section: {0}")]
    UnknownSection(String),

    /// A module id with no registered factory.
    #[error("Unknown module: {0}")]
    UnknownModule(String),

    /// The readiness poll ceiling was reached before the module announced itself.
    #[error("Module '{module}' was not ready after {attempts} checks")]
    ModuleInitTimeout { module: String, attempts: u32 },

    /// The module factory reported an error while constructing the module.
    #[error("Module '{module}' failed to initialize: {reason}")]
    ModuleInitFailed { module: String, reason: String },

    /// The registry was shut down while the module was being constructed.
    #[error("Module '{0}' is unavailable")]
    ModuleUnavailable(String),

    /// Transport-level failure (network error, non-2xx status).
    #[error("Request to {endpoint} failed: {reason}")]
    Fetch { endpoint: String, reason: String },

    /// The endpoint answered with `success: false`.
    #[error("{0}")]
    Api(String),

    /// The envelope payload did not match any known listing shape.
    #[error("Unexpected payload: {0}")]
    UnexpectedPayload(String),

    /// A document element required by the caller was never declared.
    #[error("Missing element: {0}")]
    MissingElement(String),

    /// The current session is not an authenticated administrator.
    #[error("Administrator session required")]
    Unauthorized,

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ConsoleError {
    /// Whether the failed operation can be offered again to the user.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ConsoleError::ModuleInitTimeout { .. }
                | ConsoleError::ModuleInitFailed { .. }
                | ConsoleError::ModuleUnavailable(_)
                | ConsoleError::Fetch { .. }
                | ConsoleError::Api(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_is_retryable_but_navigation_errors_are_not() {
        let timeout = ConsoleError::ModuleInitTimeout {
            module: "users".into(),
            attempts: 50,
        };
        assert!(timeout.is_retryable());
        assert_eq!(timeout.to_string(), "Module 'users' was not ready after 50 checks");
        assert!(!ConsoleError::UnknownSection("nope".into()).is_retryable());
        assert!(!ConsoleError::Unauthorized.is_retryable());
    }
}
