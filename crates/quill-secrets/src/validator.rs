//! Remote API key validation
//!
//! Before a key is persisted, a cheap authenticated GET against the
//! provider's model-listing endpoint checks whether the provider accepts the
//! credential at all. Only an auth-specific rejection (401/403) marks a key
//! invalid; any other status means the server understood the credential well
//! enough to fail for some other reason, which is deliberately counted as
//! valid to avoid false negatives on quota or transient errors.

use std::time::Duration;

use reqwest::StatusCode;

use crate::alias::AliasTable;
use crate::error::SecretError;
use crate::store::{SecretStore, GITHUB_TOKEN_KEY};

/// Per-request timeout so a dead network cannot hang the CLI
const VALIDATION_TIMEOUT: Duration = Duration::from_secs(5);

/// Probe endpoint for providers the table has never heard of
const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/models";

/// List-models endpoint per canonical provider; metadata endpoints are free
/// and side-effect-free, so probing them never bills the user
fn endpoint_for(provider: &str) -> &'static str {
    match provider {
        "openai" => "https://api.openai.com/v1/models",
        "xai" => "https://api.x.ai/v1/models",
        "deepseek" => "https://api.deepseek.com/models",
        "anthropic" => "https://api.anthropic.com/v1/models",
        "mistral" => "https://api.mistral.ai/v1/models",
        GITHUB_TOKEN_KEY => "https://api.github.com/user",
        _ => DEFAULT_ENDPOINT,
    }
}

/// Validates candidate API keys against the provider's real API
#[derive(Debug, Clone)]
pub struct KeyValidator {
    aliases: AliasTable,
}

impl KeyValidator {
    /// Validator sharing a store's already-built alias table.
    ///
    /// The table is loaded once by the store; constructing a validator from
    /// it never re-reads the override file.
    pub fn for_store(store: &SecretStore) -> Self {
        Self::with_aliases(store.aliases().clone())
    }

    /// Validator over a caller-built alias table
    pub fn with_aliases(aliases: AliasTable) -> Self {
        Self { aliases }
    }

    /// Check whether the provider accepts `candidate` as a credential.
    ///
    /// `Ok(false)` means the provider rejected the key as unauthorized;
    /// `Err` means the check itself could not run (network, DNS, TLS) and
    /// says nothing about the key.
    pub fn validate(&self, provider_raw: &str, candidate: &str) -> Result<bool, SecretError> {
        let provider = self.aliases.normalize(provider_raw);
        let url = endpoint_for(&provider);
        probe(&provider, url, candidate)
    }
}

/// One authenticated GET; the connection lives only for this call
fn probe(provider: &str, url: &str, candidate: &str) -> Result<bool, SecretError> {
    tracing::debug!(provider, url, "Probing provider API");

    let client = reqwest::blocking::Client::builder()
        .timeout(VALIDATION_TIMEOUT)
        .user_agent(concat!("quill/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| SecretError::network(provider, e.to_string()))?;

    let response = client
        .get(url)
        .bearer_auth(candidate)
        .send()
        .map_err(|e| SecretError::network(provider, e.to_string()))?;

    let status = response.status();
    let valid = !matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN);
    tracing::debug!(provider, status = status.as_u16(), valid, "Provider responded");

    Ok(valid)
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::net::TcpListener;

    use super::*;

    /// Minimal one-shot HTTP server answering with a fixed status line
    fn stub_server(status: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        std::thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                // Drain the request headers before answering.
                let mut buf = [0u8; 2048];
                let mut seen = Vec::new();
                while let Ok(n) = stream.read(&mut buf) {
                    if n == 0 {
                        break;
                    }
                    seen.extend_from_slice(&buf[..n]);
                    if seen.windows(4).any(|w| w == b"\r\n\r\n") {
                        break;
                    }
                }
                let response = format!(
                    "HTTP/1.1 {}\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
                    status
                );
                let _ = stream.write_all(response.as_bytes());
            }
        });

        format!("http://{}", addr)
    }

    #[test]
    fn test_unauthorized_means_invalid() {
        let url = stub_server("401 Unauthorized");
        assert!(!probe("openai", &url, "sk-bad").unwrap());
    }

    #[test]
    fn test_forbidden_means_invalid() {
        let url = stub_server("403 Forbidden");
        assert!(!probe("openai", &url, "sk-bad").unwrap());
    }

    #[test]
    fn test_ok_means_valid() {
        let url = stub_server("200 OK");
        assert!(probe("openai", &url, "sk-good").unwrap());
    }

    #[test]
    fn test_non_auth_failure_still_means_valid() {
        for status in ["404 Not Found", "500 Internal Server Error", "429 Too Many Requests"] {
            let url = stub_server(status);
            assert!(probe("openai", &url, "sk-good").unwrap(), "{}", status);
        }
    }

    #[test]
    fn test_connection_refused_is_a_network_error() {
        // Bind then drop so the port is known-dead.
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result = probe("openai", &format!("http://{}", addr), "sk-abc");
        assert!(matches!(result, Err(SecretError::Network { .. })));
    }

    #[test]
    fn test_known_providers_have_distinct_endpoints() {
        let providers = ["openai", "xai", "deepseek", "anthropic", "mistral"];
        for p in providers {
            assert!(endpoint_for(p).starts_with("https://"), "{}", p);
            assert_ne!(endpoint_for(p), endpoint_for(GITHUB_TOKEN_KEY));
        }
    }

    #[test]
    fn test_unknown_provider_uses_default_endpoint() {
        assert_eq!(endpoint_for("my-custom-provider"), DEFAULT_ENDPOINT);
    }

    #[test]
    fn test_validator_resolves_aliases_to_endpoints() {
        let validator = KeyValidator::with_aliases(AliasTable::builtin());
        assert_eq!(validator.aliases.normalize("grok"), "xai");
        assert_eq!(endpoint_for("xai"), "https://api.x.ai/v1/models");
    }

    #[test]
    fn test_for_store_shares_the_store_table() {
        let store = SecretStore::with_backends(AliasTable::builtin(), vec![]);
        let validator = KeyValidator::for_store(&store);
        assert_eq!(validator.aliases.normalize("grok"), "xai");
    }
}
