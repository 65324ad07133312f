//! Flat-file fallback tier
//!
//! Used when the OS keychain is absent or refuses service (headless Linux,
//! locked-down sessions). Secrets live in one `provider=hexvalue` file under
//! the Quill directory; values are XOR-masked against an embedded key before
//! hex encoding. The masking only defeats casual plaintext inspection; the
//! real protection is the owner-only file permissions, and this tier makes
//! no confidentiality claim beyond that.
//!
//! Every write re-serializes the complete table through a temp-file rename,
//! so a successful write always leaves a consistent snapshot. The
//! read-modify-rewrite cycle is not safe against concurrent processes; two
//! simultaneous invocations can lose one writer's change. Acceptable for a
//! single-user CLI.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::SecretError;

use super::SecretBackend;

/// File name of the fallback store, under the Quill directory
pub const FALLBACK_FILE_NAME: &str = "keyring.enc";

/// Fixed masking key; reversible by design, not a cryptographic secret
const MASK_KEY: &[u8] = b"quill-fallback-mask-v1";

/// Apply the symmetric XOR mask
fn mask(bytes: &[u8]) -> Vec<u8> {
    bytes
        .iter()
        .zip(MASK_KEY.iter().cycle())
        .map(|(b, k)| b ^ k)
        .collect()
}

/// Obfuscate a secret for storage
fn obfuscate(secret: &str) -> String {
    hex::encode(mask(secret.as_bytes()))
}

/// Reverse [`obfuscate`]; `None` when the stored value is corrupt
fn deobfuscate(stored: &str) -> Option<String> {
    let bytes = hex::decode(stored.trim()).ok()?;
    String::from_utf8(mask(&bytes)).ok()
}

/// Fallback tier storing all providers in one obfuscated flat file
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// Fallback store rooted at the default Quill directory
    pub fn new() -> Self {
        Self {
            dir: crate::quill_dir().unwrap_or_else(|| PathBuf::from(".").join(".quill")),
        }
    }

    /// Fallback store rooted at a specific directory
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn file_path(&self) -> PathBuf {
        self.dir.join(FALLBACK_FILE_NAME)
    }

    /// Read the whole table, skipping lines that do not parse
    fn load(&self) -> Result<BTreeMap<String, String>, SecretError> {
        let path = self.file_path();
        if !path.exists() {
            return Ok(BTreeMap::new());
        }

        let content =
            fs::read_to_string(&path).map_err(|e| SecretError::io(&path, e.to_string()))?;

        let mut table = BTreeMap::new();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let Some((provider, stored)) = line.split_once('=') else {
                tracing::warn!(path = %path.display(), "Skipping malformed fallback line");
                continue;
            };
            let Some(secret) = deobfuscate(stored) else {
                tracing::warn!(provider, "Skipping undecodable fallback entry");
                continue;
            };
            table.insert(provider.to_string(), secret);
        }

        Ok(table)
    }

    /// Rewrite the whole table atomically with owner-only permissions
    fn persist(&self, table: &BTreeMap<String, String>) -> Result<(), SecretError> {
        fs::create_dir_all(&self.dir).map_err(|e| SecretError::io(&self.dir, e.to_string()))?;
        restrict_dir_permissions(&self.dir)?;

        let mut content = String::new();
        for (provider, secret) in table {
            content.push_str(provider);
            content.push('=');
            content.push_str(&obfuscate(secret));
            content.push('\n');
        }

        let path = self.file_path();
        let tmp = self.dir.join(format!("{}.tmp", FALLBACK_FILE_NAME));
        fs::write(&tmp, content).map_err(|e| SecretError::io(&tmp, e.to_string()))?;
        restrict_file_permissions(&tmp)?;
        fs::rename(&tmp, &path).map_err(|e| SecretError::io(&path, e.to_string()))?;

        Ok(())
    }
}

impl Default for FileBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl SecretBackend for FileBackend {
    fn name(&self) -> &'static str {
        "fallback-file"
    }

    fn set(&self, provider: &str, secret: &str) -> Result<(), SecretError> {
        let mut table = self.load()?;
        table.insert(provider.to_string(), secret.to_string());
        self.persist(&table)
    }

    fn get(&self, provider: &str) -> Result<String, SecretError> {
        self.load()?
            .remove(provider)
            .ok_or_else(|| SecretError::NotFound(format!("No fallback entry for '{}'", provider)))
    }

    fn delete(&self, provider: &str) -> Result<(), SecretError> {
        if !self.file_path().exists() {
            return Ok(());
        }

        let mut table = self.load()?;
        if table.remove(provider).is_some() {
            self.persist(&table)?;
        }
        Ok(())
    }
}

#[cfg(unix)]
fn restrict_dir_permissions(dir: &Path) -> Result<(), SecretError> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(dir, fs::Permissions::from_mode(0o700))
        .map_err(|e| SecretError::io(dir, e.to_string()))
}

#[cfg(not(unix))]
fn restrict_dir_permissions(_dir: &Path) -> Result<(), SecretError> {
    Ok(())
}

#[cfg(unix)]
fn restrict_file_permissions(path: &Path) -> Result<(), SecretError> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
        .map_err(|e| SecretError::io(path, e.to_string()))
}

#[cfg(not(unix))]
fn restrict_file_permissions(_path: &Path) -> Result<(), SecretError> {
    Ok(())
}
