//! HTTP chain client against a naming node API.
//!
//! | Port method | Request |
//! |-------------|---------|
//! | `get_name_info` | `GET {api}/v1/names/{name}` |
//! | `get_chain_info` | `GET {api}/v1/info` |
//! | `get_tx_inclusion_height` | `GET {api}/v1/transactions/{tx_id}` |
//! | `submit_update_transaction` | `POST {broadcast_url}` |
//! | `publish_zonefile` | `POST {api}/v1/zonefile` |

use crate::container::config::ChainSettings;
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use shared_types::{ChainClient, ChainError, ChainInfo, NameInfo, TxId, UpdateRequest};
use tracing::debug;

/// Map a reqwest failure onto the chain error taxonomy.
pub(crate) fn transport_error(operation: &str, e: reqwest::Error) -> ChainError {
    if e.is_timeout() {
        ChainError::Timeout {
            operation: operation.to_string(),
        }
    } else {
        ChainError::Transport {
            reason: e.to_string(),
        }
    }
}

pub(crate) fn malformed(e: reqwest::Error) -> ChainError {
    ChainError::Malformed {
        reason: e.to_string(),
    }
}

/// Non-success status other than the ones a caller handles itself.
pub(crate) fn unexpected_status(url: &str, status: StatusCode) -> ChainError {
    if status == StatusCode::TOO_MANY_REQUESTS {
        ChainError::RateLimited {
            endpoint: url.to_string(),
        }
    } else {
        ChainError::Transport {
            reason: format!("{} returned {}", url, status),
        }
    }
}

#[derive(Deserialize)]
struct NameResponse {
    address: Option<String>,
    status: Option<String>,
}

#[derive(Deserialize)]
struct InfoResponse {
    last_block_seen: u64,
    last_block_processed: u64,
}

#[derive(Deserialize)]
struct TransactionResponse {
    block_height: Option<u64>,
}

#[derive(Serialize)]
struct BroadcastRequest<'a> {
    domain: &'a str,
    zonefile: &'a str,
    owner_key: &'a str,
    payment_key: &'a str,
}

#[derive(Deserialize)]
struct BroadcastResponse {
    txid: TxId,
}

#[derive(Serialize)]
struct ZonefileRequest<'a> {
    zonefile: &'a str,
}

pub struct HttpChainClient {
    client: Client,
    api_url: String,
    broadcast_url: String,
}

impl HttpChainClient {
    pub fn new(settings: &ChainSettings) -> Result<Self, ChainError> {
        let client = Client::builder()
            .timeout(settings.call_timeout)
            .connect_timeout(settings.connect_timeout)
            .build()
            .map_err(|e| transport_error("build_client", e))?;

        Ok(Self {
            client,
            api_url: settings.api_url.trim_end_matches('/').to_string(),
            broadcast_url: settings.broadcast_url.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    async fn get(&self, operation: &str, url: &str) -> Result<Response, ChainError> {
        self.client
            .get(url)
            .send()
            .await
            .map_err(|e| transport_error(operation, e))
    }
}

#[async_trait]
impl ChainClient for HttpChainClient {
    async fn get_name_info(&self, fq_name: &str) -> Result<Option<NameInfo>, ChainError> {
        let url = self.url(&format!("/v1/names/{}", fq_name));
        let response = self.get("get_name_info", &url).await?;

        match response.status() {
            StatusCode::NOT_FOUND => return Ok(None),
            // The naming API answers 500 for subdomains it cannot resolve.
            StatusCode::INTERNAL_SERVER_ERROR => {
                debug!(name = %fq_name, "Name lookup returned 500, treating as absent");
                return Ok(None);
            }
            status if !status.is_success() => return Err(unexpected_status(&url, status)),
            _ => {}
        }

        let body: NameResponse = response.json().await.map_err(malformed)?;
        Ok(Some(NameInfo {
            address: body.address,
            status: body.status,
        }))
    }

    async fn get_chain_info(&self) -> Result<ChainInfo, ChainError> {
        let url = self.url("/v1/info");
        let response = self.get("get_chain_info", &url).await?;
        if !response.status().is_success() {
            return Err(unexpected_status(&url, response.status()));
        }

        let body: InfoResponse = response.json().await.map_err(malformed)?;
        Ok(ChainInfo {
            tip_height: body.last_block_seen,
            indexed_height: body.last_block_processed,
        })
    }

    async fn get_tx_inclusion_height(&self, tx_id: &str) -> Result<Option<u64>, ChainError> {
        let url = self.url(&format!("/v1/transactions/{}", tx_id));
        let response = self.get("get_tx_inclusion_height", &url).await?;

        match response.status() {
            StatusCode::NOT_FOUND => return Ok(None),
            status if !status.is_success() => return Err(unexpected_status(&url, status)),
            _ => {}
        }

        let body: TransactionResponse = response.json().await.map_err(malformed)?;
        Ok(body.block_height.filter(|height| *height > 0))
    }

    async fn submit_update_transaction(
        &self,
        request: &UpdateRequest,
    ) -> Result<TxId, ChainError> {
        let payload = BroadcastRequest {
            domain: &request.domain_name,
            zonefile: &request.zonefile,
            owner_key: &request.owner_key,
            payment_key: &request.payment_key,
        };
        let response = self
            .client
            .post(&self.broadcast_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| transport_error("submit_update_transaction", e))?;

        let status = response.status();
        if !status.is_success() {
            let reason = response
                .text()
                .await
                .unwrap_or_else(|_| status.to_string());
            return Err(ChainError::Rejected { reason });
        }

        let body: BroadcastResponse = response.json().await.map_err(malformed)?;
        Ok(body.txid)
    }

    async fn publish_zonefile(&self, zonefile: &str) -> Result<(), ChainError> {
        let url = self.url("/v1/zonefile");
        let response = self
            .client
            .post(&url)
            .json(&ZonefileRequest { zonefile })
            .send()
            .await
            .map_err(|e| transport_error("publish_zonefile", e))?;

        if !response.status().is_success() {
            return Err(unexpected_status(&url, response.status()));
        }
        Ok(())
    }
}
