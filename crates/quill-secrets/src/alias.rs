//! Provider name normalization
//!
//! Users spell provider names however they like (`GPT`, `grok`, `claude`);
//! storage and validation key on one canonical name per provider. The
//! mapping is a builtin table optionally extended by a user-editable JSON
//! override file under the Quill directory.

use std::collections::HashMap;
use std::path::Path;

use crate::error::SecretError;

/// File name of the user alias override, under the Quill directory
pub const ALIAS_FILE_NAME: &str = "provider_aliases.json";

/// Template written on first run so users have something to edit
const ALIAS_TEMPLATE: &str = r#"{
  "your-provider-name": ["alias-one", "alias-two"],
  "openai": ["my-favorite-model"]
}
"#;

/// Builtin canonical names and their known aliases, in declaration order
const BUILTIN_ALIASES: &[(&str, &[&str])] = &[
    ("openai", &["gpt", "chatgpt", "oai", "open-ai"]),
    ("xai", &["grok", "x-ai", "x"]),
    ("deepseek", &["deep-seek", "ds"]),
    ("anthropic", &["claude", "claude-ai"]),
    ("mistral", &["mistralai", "mistral-ai", "codestral"]),
];

/// Maps arbitrary provider spellings to canonical names.
///
/// Built once (builtin defaults plus optional user overrides) and read-only
/// afterwards; callers own the instance and pass it where resolution is
/// needed rather than relying on process-global state.
#[derive(Debug, Clone)]
pub struct AliasTable {
    /// alias (lowercase) -> canonical name; canonical names map to themselves
    reverse: HashMap<String, String>,
}

impl AliasTable {
    /// Build from builtin defaults only
    pub fn builtin() -> Self {
        let mut reverse = HashMap::new();
        index_builtin(&mut reverse);
        Self { reverse }
    }

    /// Build from builtin defaults merged with the default override file.
    ///
    /// Creates a template override file on first run. Neither a missing,
    /// malformed, nor uncreatable file ever fails construction; resolution
    /// degrades to the builtin table.
    pub fn load() -> Self {
        match crate::quill_dir() {
            Some(dir) => Self::load_from(&dir.join(ALIAS_FILE_NAME)),
            None => {
                tracing::debug!("No home directory; using builtin aliases only");
                Self::builtin()
            }
        }
    }

    /// Build from builtin defaults merged with a specific override file
    pub fn load_from(path: &Path) -> Self {
        let mut reverse = HashMap::new();
        // Builtin entries are indexed before any override entry is looked
        // at, so an override can never re-point an alias the builtin table
        // already claims.
        index_builtin(&mut reverse);

        match read_overrides(path) {
            Ok(Some(overrides)) => index_table(&mut reverse, &overrides),
            Ok(None) => write_template(path),
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "Ignoring alias override file");
            }
        }

        Self { reverse }
    }

    /// Resolve any spelling of a provider name to its canonical form.
    ///
    /// Unknown providers pass through lowercased so the store stays usable
    /// for providers the table has never heard of.
    pub fn normalize(&self, raw: &str) -> String {
        let needle = raw.trim().to_lowercase();
        match self.reverse.get(&needle) {
            Some(canonical) => canonical.clone(),
            None => needle,
        }
    }

    /// All canonical provider names known to this table
    pub fn canonical_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .reverse
            .iter()
            .filter(|(alias, canonical)| alias == canonical)
            .map(|(_, canonical)| canonical.clone())
            .collect();
        names.sort();
        names
    }
}

/// Read and parse the override file. `Ok(None)` means the file is absent.
fn read_overrides(path: &Path) -> Result<Option<HashMap<String, Vec<String>>>, SecretError> {
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| SecretError::io(path, e.to_string()))?;
    let overrides: HashMap<String, Vec<String>> = serde_json::from_str(&content)
        .map_err(|e| SecretError::io(path, format!("invalid alias JSON: {}", e)))?;

    Ok(Some(overrides))
}

/// Index the builtin entries in their declaration order, so which builtin
/// claims a name never depends on map iteration
fn index_builtin(reverse: &mut HashMap<String, String>) {
    for (canonical, _) in BUILTIN_ALIASES {
        reverse.insert(canonical.to_string(), canonical.to_string());
    }

    for (canonical, aliases) in BUILTIN_ALIASES {
        for alias in *aliases {
            reverse
                .entry(alias.to_string())
                .or_insert_with(|| canonical.to_string());
        }
    }
}

/// Index one canonical-name -> aliases table into the reverse map.
///
/// Entries already present in `reverse` win every collision, so the order
/// tables are indexed in decides precedence: aliases for a known name are
/// appended, unknown names are added wholesale, and nothing an earlier
/// table claimed is ever re-pointed.
fn index_table(reverse: &mut HashMap<String, String>, table: &HashMap<String, Vec<String>>) {
    // Canonical names first so no alias within this table shadows one.
    for canonical in table.keys() {
        let canonical = canonical.to_lowercase();
        reverse.entry(canonical.clone()).or_insert(canonical);
    }

    for (canonical, aliases) in table {
        // A declared name that already resolves elsewhere (say an override
        // section for "gpt") extends the name it resolves to, keeping
        // normalization idempotent.
        let canonical = canonical.to_lowercase();
        let target = reverse
            .get(&canonical)
            .cloned()
            .unwrap_or_else(|| canonical.clone());
        for alias in aliases {
            reverse
                .entry(alias.to_lowercase())
                .or_insert_with(|| target.clone());
        }
    }
}

/// Best-effort first-run template creation; failure never surfaces
fn write_template(path: &Path) {
    let result = path
        .parent()
        .map(std::fs::create_dir_all)
        .unwrap_or(Ok(()))
        .and_then(|_| std::fs::write(path, ALIAS_TEMPLATE));

    match result {
        Ok(()) => tracing::debug!(path = %path.display(), "Created alias template file"),
        Err(e) => tracing::debug!(path = %path.display(), error = %e, "Could not create alias template"),
    }
}
