//! Profile resolution over HTTP.
//!
//! A registrant's zone file points at a token file through a URI record.
//! The token file is either a bare profile object or an array of signed
//! tokens whose first entry carries the profile as
//! `decodedToken.payload.claim`.

use super::chain_http::{malformed, transport_error, unexpected_status};
use crate::container::config::ChainSettings;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use shared_types::{ChainError, Profile, ProfileResolver, ProofCheck};
use tracing::debug;

/// First quoted `http(s)` target of a URI record in `zonefile`.
pub fn token_file_url(zonefile: &str) -> Option<&str> {
    zonefile
        .lines()
        .filter(|line| line.split_whitespace().any(|field| field == "URI"))
        .find_map(|line| {
            let start = line.find('"')? + 1;
            let end = start + line[start..].find('"')?;
            let target = &line[start..end];
            (target.starts_with("https://") || target.starts_with("http://")).then_some(target)
        })
}

/// Unwrap a token file into the profile it carries.
pub fn extract_profile(token_file: Value) -> Profile {
    match token_file {
        Value::Array(mut tokens) if !tokens.is_empty() => {
            let first = tokens.swap_remove(0);
            first
                .pointer("/decodedToken/payload/claim")
                .cloned()
                .unwrap_or(first)
        }
        other => other,
    }
}

/// Social accounts listed in a profile that carry a proof URL.
fn proof_claims(profile: &Profile) -> Vec<(String, String, String)> {
    profile
        .get("account")
        .and_then(Value::as_array)
        .map(|accounts| {
            accounts
                .iter()
                .filter_map(|account| {
                    let field = |key: &str| account.get(key)?.as_str().map(str::to_string);
                    Some((field("service")?, field("identifier")?, field("proofUrl")?))
                })
                .collect()
        })
        .unwrap_or_default()
}

pub struct HttpProfileResolver {
    client: Client,
}

impl HttpProfileResolver {
    pub fn new(settings: &ChainSettings) -> Result<Self, ChainError> {
        let client = Client::builder()
            .timeout(settings.call_timeout)
            .connect_timeout(settings.connect_timeout)
            .build()
            .map_err(|e| transport_error("build_client", e))?;
        Ok(Self { client })
    }

    async fn proof_mentions_owner(&self, proof_url: &str, owner: &str) -> bool {
        let response = match self.client.get(proof_url).send().await {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                debug!(url = %proof_url, status = %response.status(), "Proof fetch failed");
                return false;
            }
            Err(e) => {
                debug!(url = %proof_url, error = %e, "Proof fetch failed");
                return false;
            }
        };
        response
            .text()
            .await
            .map(|body| body.contains(owner))
            .unwrap_or(false)
    }
}

#[async_trait]
impl ProfileResolver for HttpProfileResolver {
    async fn resolve_profile(&self, zonefile: &str, owner: &str) -> Result<Profile, ChainError> {
        let url = token_file_url(zonefile).ok_or_else(|| ChainError::Malformed {
            reason: "no token file url in zone file".to_string(),
        })?;
        debug!(%owner, %url, "Resolving profile");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| transport_error("resolve_profile", e))?;
        if !response.status().is_success() {
            return Err(unexpected_status(url, response.status()));
        }

        let token_file: Value = response.json().await.map_err(malformed)?;
        Ok(extract_profile(token_file))
    }

    async fn validate_proofs(
        &self,
        profile: &Profile,
        owner: &str,
    ) -> Result<Vec<ProofCheck>, ChainError> {
        let mut checks = Vec::new();
        for (service, identifier, proof_url) in proof_claims(profile) {
            let valid = self.proof_mentions_owner(&proof_url, owner).await;
            checks.push(ProofCheck {
                service,
                identifier,
                valid,
            });
        }
        Ok(checks)
    }
}
