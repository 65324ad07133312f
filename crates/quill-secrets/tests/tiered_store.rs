//! Cross-tier behavior of the secret store over a real fallback directory

use quill_secrets::{AliasTable, FileBackend, SecretBackend, SecretError, SecretStore};

/// Stand-in for a keyring that is absent on this machine
struct DeadKeyring;

impl SecretBackend for DeadKeyring {
    fn name(&self) -> &'static str {
        "dead-keyring"
    }

    fn set(&self, _provider: &str, _secret: &str) -> Result<(), SecretError> {
        Err(SecretError::backend("dead-keyring", "no secret service"))
    }

    fn get(&self, _provider: &str) -> Result<String, SecretError> {
        Err(SecretError::backend("dead-keyring", "no secret service"))
    }

    fn delete(&self, _provider: &str) -> Result<(), SecretError> {
        Err(SecretError::backend("dead-keyring", "no secret service"))
    }
}

fn file_only_store(dir: &std::path::Path) -> SecretStore {
    SecretStore::with_backends(
        AliasTable::builtin(),
        vec![
            Box::new(DeadKeyring),
            Box::new(FileBackend::with_dir(dir.join(".quill"))),
        ],
    )
}

#[test]
fn stored_keys_survive_a_store_rebuild() {
    let tmp = tempfile::tempdir().unwrap();

    let store = file_only_store(tmp.path());
    store.store("openai", "sk-abc").unwrap();
    store.store("mistral", "mi-xyz").unwrap();
    drop(store);

    // A fresh store over the same directory sees the same keys, the way a
    // new CLI invocation would.
    let reopened = file_only_store(tmp.path());
    assert_eq!(reopened.get("openai").unwrap(), "sk-abc");
    assert_eq!(reopened.get("mistral").unwrap(), "mi-xyz");
}

#[test]
fn aliases_route_to_the_same_record() {
    let tmp = tempfile::tempdir().unwrap();
    let store = file_only_store(tmp.path());

    store.store("openai", "sk-abc").unwrap();

    assert_eq!(store.get("gpt").unwrap(), "sk-abc");
    assert_eq!(store.get("ChatGPT").unwrap(), "sk-abc");

    // Overwriting through an alias replaces the canonical record.
    store.store("gpt", "sk-new").unwrap();
    assert_eq!(store.get("openai").unwrap(), "sk-new");
}

#[test]
fn sibling_providers_survive_rewrites() {
    let tmp = tempfile::tempdir().unwrap();
    let store = file_only_store(tmp.path());

    store.store("openai", "sk-abc").unwrap();
    store.store("anthropic", "sk-ant").unwrap();
    store.store("deepseek", "ds-123").unwrap();
    store.delete("anthropic").unwrap();

    assert_eq!(store.get("openai").unwrap(), "sk-abc");
    assert_eq!(store.get("deepseek").unwrap(), "ds-123");
    assert!(store.get("claude").unwrap_err().is_not_found());
}

#[test]
fn delete_is_idempotent_across_invocations() {
    let tmp = tempfile::tempdir().unwrap();

    let store = file_only_store(tmp.path());
    store.store("xai", "xai-key").unwrap();
    store.delete("grok").unwrap();

    let reopened = file_only_store(tmp.path());
    reopened.delete("xai").unwrap();
    assert!(reopened.get("xai").unwrap_err().is_not_found());
}

#[test]
fn github_token_shares_the_store() {
    let tmp = tempfile::tempdir().unwrap();

    let store = file_only_store(tmp.path());
    store.store_github_token("ghp_secret").unwrap();
    drop(store);

    let reopened = file_only_store(tmp.path());
    assert_eq!(reopened.github_token().unwrap(), "ghp_secret");

    reopened.delete_github_token().unwrap();
    reopened.delete_github_token().unwrap();
    assert!(reopened.github_token().unwrap_err().is_not_found());
}

#[test]
fn non_ascii_secrets_round_trip_through_the_file_tier() {
    let tmp = tempfile::tempdir().unwrap();
    let store = file_only_store(tmp.path());

    let secret = "clé-secrète-日本語-🗝";
    store.store("my-custom-provider", secret).unwrap();

    let reopened = file_only_store(tmp.path());
    assert_eq!(reopened.get("My-Custom-Provider").unwrap(), secret);
}
