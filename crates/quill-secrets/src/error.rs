use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during secret storage and validation
#[derive(Debug, Error)]
pub enum SecretError {
    /// No secret stored for the provider in any tier
    #[error("Secret not found: {0}")]
    NotFound(String),

    /// Backend runtime error (keyring unavailable, entry creation failed, ...)
    #[error("{backend} error: {message}")]
    BackendError { backend: String, message: String },

    /// Permission/access denied by the platform secret service
    #[error("Access denied to secret storage: {0}")]
    AccessDenied(String),

    /// Fallback-file IO error
    #[error("Failed to access '{path}': {message}")]
    Io { path: PathBuf, message: String },

    /// Key validation could not reach the provider API
    #[error("Could not reach {provider} API: {message}")]
    Network { provider: String, message: String },

    /// Every storage tier failed for a single operation
    #[error("All storage tiers failed: {0}")]
    AllTiersFailed(String),
}

impl SecretError {
    /// Create a backend error
    pub fn backend(backend: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BackendError {
            backend: backend.into(),
            message: message.into(),
        }
    }

    /// Create a fallback-file IO error
    pub fn io(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Io {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a validation network error
    pub fn network(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Network {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Whether this error means "no secret stored" rather than a real failure
    pub fn is_not_found(&self) -> bool {
        matches!(self, SecretError::NotFound(_))
    }
}
