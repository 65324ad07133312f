//! Provider API key storage for the Quill git assistant
//!
//! Quill talks to several AI backends and to GitHub; their keys must never
//! land in plaintext config files. This crate stores them in tiers:
//!
//! - **OS Keychain**: macOS Keychain, Windows Credential Manager, Linux Secret Service
//! - **Fallback file**: obfuscated `~/.quill/keyring.enc`, used whenever the keychain errors
//!
//! Provider names are normalized through an alias table (`gpt` -> `openai`,
//! `grok` -> `xai`, ...) that users can extend via
//! `~/.quill/provider_aliases.json`. Candidate keys can be checked against
//! the provider's real API before they are persisted.
//!
//! # Example
//!
//! ```rust,ignore
//! use quill_secrets::{KeyValidator, SecretStore};
//!
//! let store = SecretStore::new();
//! let validator = KeyValidator::for_store(&store); // shares the alias table
//!
//! if validator.validate("gpt", "sk-candidate")? {
//!     store.store("gpt", "sk-candidate")?; // lands under "openai"
//! }
//! let key = store.get("openai")?;
//! ```
//!
//! # Features
//!
//! - `keychain` (default): OS keychain tier via the `keyring` crate; without
//!   it the store runs on the fallback file alone

use std::path::PathBuf;

mod alias;
mod backends;
mod diagnostics;
mod error;
mod store;
mod validator;

pub use alias::{AliasTable, ALIAS_FILE_NAME};
pub use backends::file::{FileBackend, FALLBACK_FILE_NAME};
#[cfg(feature = "keychain")]
pub use backends::keychain::KeychainBackend;
pub use backends::SecretBackend;
pub use diagnostics::{storage_status, FallbackStatus, KeyringStatus, StorageStatus};
pub use error::SecretError;
pub use store::{SecretStore, GITHUB_TOKEN_KEY, SERVICE_NAME};
pub use validator::KeyValidator;

/// Directory holding the fallback store and the alias override file
pub fn quill_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".quill"))
}
