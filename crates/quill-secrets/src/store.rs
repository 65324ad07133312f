//! Tiered secret store
//!
//! The only storage entry point the rest of Quill uses. Writes and reads go
//! through an ordered list of tiers (OS keychain first, obfuscated fallback
//! file second); a tier failure falls through to the next tier, so callers
//! never learn or care which backend actually holds a secret.

use crate::alias::AliasTable;
use crate::backends::file::FileBackend;
#[cfg(feature = "keychain")]
use crate::backends::keychain::KeychainBackend;
use crate::backends::SecretBackend;
use crate::error::SecretError;

/// Service name under which all Quill keychain entries live
pub const SERVICE_NAME: &str = "quill";

/// Fixed store key for the GitHub access token.
///
/// Same store, dedicated namespace; not an AI provider, so it never goes
/// through alias resolution.
pub const GITHUB_TOKEN_KEY: &str = "github-token";

/// Tiered secret store with provider-name resolution
pub struct SecretStore {
    aliases: AliasTable,
    backends: Vec<Box<dyn SecretBackend>>,
}

impl SecretStore {
    /// Store with the default tiers and the default alias table
    pub fn new() -> Self {
        Self::with_aliases(AliasTable::load())
    }

    /// Store with the default tiers and a caller-built alias table
    pub fn with_aliases(aliases: AliasTable) -> Self {
        Self::with_backends(aliases, default_backends())
    }

    /// Store over an explicit tier list, highest priority first
    pub fn with_backends(aliases: AliasTable, backends: Vec<Box<dyn SecretBackend>>) -> Self {
        Self { aliases, backends }
    }

    /// Resolve a raw provider spelling to its canonical name
    pub fn normalize(&self, provider_raw: &str) -> String {
        self.aliases.normalize(provider_raw)
    }

    /// The alias table this store resolves provider names through.
    ///
    /// Shared with other components (the key validator) so the table is
    /// built once per process, not once per consumer.
    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    /// Store a provider's API key, overwriting any previous value
    pub fn store(&self, provider_raw: &str, secret: &str) -> Result<(), SecretError> {
        let provider = self.aliases.normalize(provider_raw);
        self.store_key(&provider, secret)
    }

    /// Retrieve a provider's API key.
    ///
    /// An earlier tier's value always shadows a later one; the tiers are
    /// never merged or reconciled.
    pub fn get(&self, provider_raw: &str) -> Result<String, SecretError> {
        let provider = self.aliases.normalize(provider_raw);
        self.get_key(&provider)
    }

    /// Delete a provider's API key from every tier. Idempotent.
    pub fn delete(&self, provider_raw: &str) -> Result<(), SecretError> {
        let provider = self.aliases.normalize(provider_raw);
        self.delete_key(&provider)
    }

    /// Store the GitHub access token
    pub fn store_github_token(&self, token: &str) -> Result<(), SecretError> {
        self.store_key(GITHUB_TOKEN_KEY, token)
    }

    /// Retrieve the GitHub access token
    pub fn github_token(&self) -> Result<String, SecretError> {
        self.get_key(GITHUB_TOKEN_KEY)
    }

    /// Delete the GitHub access token
    pub fn delete_github_token(&self) -> Result<(), SecretError> {
        self.delete_key(GITHUB_TOKEN_KEY)
    }

    fn store_key(&self, provider: &str, secret: &str) -> Result<(), SecretError> {
        let last = self.backends.len().saturating_sub(1);
        for (i, backend) in self.backends.iter().enumerate() {
            match backend.set(provider, secret) {
                Ok(()) => {
                    tracing::debug!(provider, tier = backend.name(), "Stored secret");
                    return Ok(());
                }
                Err(e) if i < last => {
                    tracing::debug!(provider, tier = backend.name(), error = %e, "Tier rejected write, falling through");
                }
                Err(e) => return Err(e),
            }
        }
        Err(SecretError::AllTiersFailed(format!(
            "no storage tier accepted '{}'",
            provider
        )))
    }

    fn get_key(&self, provider: &str) -> Result<String, SecretError> {
        let last = self.backends.len().saturating_sub(1);
        let mut outcome = SecretError::NotFound(format!("No stored key for '{}'", provider));

        for (i, backend) in self.backends.iter().enumerate() {
            match backend.get(provider) {
                Ok(value) if !value.is_empty() => {
                    tracing::debug!(provider, tier = backend.name(), "Resolved secret");
                    return Ok(value);
                }
                Ok(_) => {
                    outcome = SecretError::NotFound(format!("No stored key for '{}'", provider));
                }
                Err(e) => {
                    if i < last && !e.is_not_found() {
                        tracing::debug!(provider, tier = backend.name(), error = %e, "Tier read failed, falling through");
                    }
                    outcome = e;
                }
            }
        }

        Err(outcome)
    }

    fn delete_key(&self, provider: &str) -> Result<(), SecretError> {
        let mut failures = Vec::new();
        let mut any_ok = false;

        // Every tier is attempted so a secret cannot linger in a lower one.
        for backend in &self.backends {
            match backend.delete(provider) {
                Ok(()) => any_ok = true,
                Err(e) => {
                    tracing::debug!(provider, tier = backend.name(), error = %e, "Tier delete failed");
                    failures.push(format!("{}: {}", backend.name(), e));
                }
            }
        }

        if any_ok || failures.is_empty() {
            Ok(())
        } else {
            Err(SecretError::AllTiersFailed(failures.join("; ")))
        }
    }
}

impl Default for SecretStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Default tier list: keychain first, fallback file second
fn default_backends() -> Vec<Box<dyn SecretBackend>> {
    let mut tiers: Vec<Box<dyn SecretBackend>> = Vec::new();
    #[cfg(feature = "keychain")]
    tiers.push(Box::new(KeychainBackend::new(SERVICE_NAME)));
    tiers.push(Box::new(FileBackend::new()));
    tiers
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    /// In-memory tier for facade tests
    #[derive(Debug, Default)]
    pub struct MemoryBackend {
        pub entries: Mutex<HashMap<String, String>>,
    }

    impl SecretBackend for MemoryBackend {
        fn name(&self) -> &'static str {
            "memory"
        }

        fn set(&self, provider: &str, secret: &str) -> Result<(), SecretError> {
            self.entries
                .lock()
                .unwrap()
                .insert(provider.to_string(), secret.to_string());
            Ok(())
        }

        fn get(&self, provider: &str) -> Result<String, SecretError> {
            self.entries
                .lock()
                .unwrap()
                .get(provider)
                .cloned()
                .ok_or_else(|| SecretError::NotFound(format!("No entry for '{}'", provider)))
        }

        fn delete(&self, provider: &str) -> Result<(), SecretError> {
            self.entries.lock().unwrap().remove(provider);
            Ok(())
        }
    }

    /// Tier that fails every operation, standing in for a dead keyring
    #[derive(Debug, Default)]
    pub struct BrokenBackend;

    impl SecretBackend for BrokenBackend {
        fn name(&self) -> &'static str {
            "broken"
        }

        fn set(&self, _provider: &str, _secret: &str) -> Result<(), SecretError> {
            Err(SecretError::backend("broken", "no secret service"))
        }

        fn get(&self, _provider: &str) -> Result<String, SecretError> {
            Err(SecretError::backend("broken", "no secret service"))
        }

        fn delete(&self, _provider: &str) -> Result<(), SecretError> {
            Err(SecretError::backend("broken", "no secret service"))
        }
    }
}
