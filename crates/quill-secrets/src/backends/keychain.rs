//! OS Keychain tier
//!
//! Supports:
//! - macOS Keychain
//! - Windows Credential Manager
//! - Linux Secret Service (via libsecret)

use crate::error::SecretError;

use super::SecretBackend;

/// Native keychain tier, scoped to one service name.
///
/// Accounts within the service are canonical provider names.
#[derive(Debug, Clone)]
pub struct KeychainBackend {
    service: String,
}

impl KeychainBackend {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, provider: &str) -> Result<keyring::Entry, SecretError> {
        keyring::Entry::new(&self.service, provider)
            .map_err(|e| SecretError::backend("keychain", e.to_string()))
    }
}

impl SecretBackend for KeychainBackend {
    fn name(&self) -> &'static str {
        "keychain"
    }

    fn set(&self, provider: &str, secret: &str) -> Result<(), SecretError> {
        self.entry(provider)?
            .set_password(secret)
            .map_err(|e| match e {
                keyring::Error::NoStorageAccess(inner) => {
                    SecretError::AccessDenied(format!("Cannot access keychain storage: {}", inner))
                }
                _ => SecretError::backend("keychain", e.to_string()),
            })
    }

    fn get(&self, provider: &str) -> Result<String, SecretError> {
        self.entry(provider)?.get_password().map_err(|e| match e {
            keyring::Error::NoEntry => {
                SecretError::NotFound(format!("No keychain entry for {}/{}", self.service, provider))
            }
            keyring::Error::Ambiguous(creds) => SecretError::backend(
                "keychain",
                format!("Ambiguous entry: {} credentials found", creds.len()),
            ),
            keyring::Error::NoStorageAccess(inner) => {
                SecretError::AccessDenied(format!("Cannot access keychain storage: {}", inner))
            }
            _ => SecretError::backend("keychain", e.to_string()),
        })
    }

    fn delete(&self, provider: &str) -> Result<(), SecretError> {
        match self.entry(provider)?.delete_credential() {
            Ok(()) => Ok(()),
            // Nothing stored means nothing to do.
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(SecretError::backend("keychain", e.to_string())),
        }
    }
}
