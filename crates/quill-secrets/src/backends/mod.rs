//! Storage tier implementations

use crate::error::SecretError;

#[cfg(feature = "keychain")]
pub mod keychain;

pub mod file;

/// One storage tier the secret store can write to and read from.
///
/// Tiers are tried in priority order by [`SecretStore`](crate::SecretStore);
/// each implementation only answers for itself and never falls through to
/// another tier.
pub trait SecretBackend {
    /// Short tier name for logging and error messages
    fn name(&self) -> &'static str;

    /// Store or overwrite the secret for a canonical provider name
    fn set(&self, provider: &str, secret: &str) -> Result<(), SecretError>;

    /// Retrieve the secret for a canonical provider name
    fn get(&self, provider: &str) -> Result<String, SecretError>;

    /// Remove the secret for a canonical provider name.
    ///
    /// Deleting an absent record is success, not an error.
    fn delete(&self, provider: &str) -> Result<(), SecretError>;
}
