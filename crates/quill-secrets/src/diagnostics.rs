//! Secure-storage diagnostics
//!
//! Backs the CLI's `config` status output: reports whether the native
//! keyring actually works on this machine (probed with a throwaway entry)
//! and whether the fallback directory exists. Every failure mode becomes a
//! status value; this module never returns an error.

use std::fmt;
use std::path::Path;

use serde::Serialize;

use crate::backends::SecretBackend;
#[cfg(feature = "keychain")]
use crate::backends::keychain::KeychainBackend;
#[cfg(feature = "keychain")]
use crate::store::SERVICE_NAME;

/// Throwaway entry name used for the keyring probe
const PROBE_KEY: &str = "__quill_storage_probe__";
const PROBE_VALUE: &str = "probe";

/// Outcome of the native keyring probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum KeyringStatus {
    /// Write, read-back, and delete all succeeded
    Available,
    /// The keyring rejected the probe write
    Unavailable,
    /// The write succeeded but the read-back failed or mismatched
    RetrievalFailed,
}

impl fmt::Display for KeyringStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            KeyringStatus::Available => "available",
            KeyringStatus::Unavailable => "unavailable",
            KeyringStatus::RetrievalFailed => "retrieval-failed",
        };
        f.write_str(s)
    }
}

/// State of the fallback store directory (informational; absence just means
/// the fallback tier has never been written)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FallbackStatus {
    DirectoryExists,
    DirectoryNotExists,
    DirectoryError,
    HomedirError,
}

impl fmt::Display for FallbackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FallbackStatus::DirectoryExists => "directory-exists",
            FallbackStatus::DirectoryNotExists => "directory-not-exists",
            FallbackStatus::DirectoryError => "directory-error",
            FallbackStatus::HomedirError => "homedir-error",
        };
        f.write_str(s)
    }
}

/// Combined secure-storage status report
#[derive(Debug, Clone, Serialize)]
pub struct StorageStatus {
    pub keyring: KeyringStatus,
    pub fallback: FallbackStatus,
    pub platform: &'static str,
}

/// Probe both storage tiers and report their state. Never fails.
pub fn storage_status() -> StorageStatus {
    StorageStatus {
        keyring: probe_keyring(),
        fallback: inspect_fallback_dir(),
        platform: std::env::consts::OS,
    }
}

#[cfg(feature = "keychain")]
fn probe_keyring() -> KeyringStatus {
    probe_backend(&KeychainBackend::new(SERVICE_NAME))
}

#[cfg(not(feature = "keychain"))]
fn probe_keyring() -> KeyringStatus {
    KeyringStatus::Unavailable
}

/// Write a throwaway entry, read it back, and always clean it up.
///
/// The delete runs even when the read-back fails so no probe residue is
/// left in the user's keyring.
fn probe_backend(backend: &dyn SecretBackend) -> KeyringStatus {
    if let Err(e) = backend.set(PROBE_KEY, PROBE_VALUE) {
        tracing::debug!(error = %e, "Keyring probe write failed");
        return KeyringStatus::Unavailable;
    }

    let read_back = backend.get(PROBE_KEY);

    if let Err(e) = backend.delete(PROBE_KEY) {
        tracing::debug!(error = %e, "Keyring probe cleanup failed");
    }

    match read_back {
        Ok(value) if value == PROBE_VALUE => KeyringStatus::Available,
        Ok(_) => KeyringStatus::RetrievalFailed,
        Err(e) => {
            tracing::debug!(error = %e, "Keyring probe read failed");
            KeyringStatus::RetrievalFailed
        }
    }
}

fn inspect_fallback_dir() -> FallbackStatus {
    match crate::quill_dir() {
        Some(dir) => inspect_dir(&dir),
        None => FallbackStatus::HomedirError,
    }
}

fn inspect_dir(dir: &Path) -> FallbackStatus {
    match std::fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => FallbackStatus::DirectoryExists,
        // Something else squats on the path.
        Ok(_) => FallbackStatus::DirectoryError,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => FallbackStatus::DirectoryNotExists,
        Err(_) => FallbackStatus::DirectoryError,
    }
}
