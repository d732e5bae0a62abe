//! Status Resolver Service
//!
//! Chain state wins over local state: a name live on chain is `Propagated`
//! whatever its queue record says. Reads bypass the queue lock.

use crate::domain::{SubdomainInfo, SubdomainStatus};
use crate::ports::inbound::StatusApi;
use async_trait::async_trait;
use shared_types::{
    bounded, ChainClient, InvalidReason, QueueIndex, QueueRecord, QueueStatus, RegistrarError,
    RegistrarResult, TimeSource,
};
use sr_02_queue_store::QueueStore;
use sr_03_admission::is_valid_name;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Records per `list` page.
pub const LIST_PAGE_SIZE: usize = 100;

/// Records older than this are not listed.
pub const LIST_WINDOW: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Status configuration
#[derive(Clone, Debug)]
pub struct StatusConfig {
    pub domain_name: String,
    pub page_size: usize,
    pub list_window: Duration,
    pub chain_call_timeout: Duration,
    /// Labels shorter than this are rejected by `subdomain_info`.
    pub name_min_length: Option<usize>,
}

impl StatusConfig {
    pub fn new(domain_name: impl Into<String>) -> Self {
        Self {
            domain_name: domain_name.into(),
            page_size: LIST_PAGE_SIZE,
            list_window: LIST_WINDOW,
            chain_call_timeout: Duration::from_secs(10),
            name_min_length: None,
        }
    }
}

pub struct StatusResolver {
    config: StatusConfig,
    store: Arc<dyn QueueStore>,
    chain: Arc<dyn ChainClient>,
    time: Arc<dyn TimeSource>,
}

impl StatusResolver {
    pub fn new(
        config: StatusConfig,
        store: Arc<dyn QueueStore>,
        chain: Arc<dyn ChainClient>,
        time: Arc<dyn TimeSource>,
    ) -> Self {
        Self {
            config,
            store,
            chain,
            time,
        }
    }

    /// Whether the name is live on chain. Absent names are not live; lookup
    /// failures propagate.
    async fn is_propagated(&self, fq_name: &str) -> RegistrarResult<bool> {
        let info = bounded(
            "get_name_info",
            self.config.chain_call_timeout,
            self.chain.get_name_info(fq_name),
        )
        .await
        .map_err(|e| {
            warn!(name = %fq_name, error = %e, "Chain lookup failed");
            RegistrarError::Chain(e)
        })?;
        Ok(info.is_some_and(|info| info.is_registered_subdomain()))
    }

    /// Label of `fq_name` when it belongs to the configured domain.
    fn subdomain_label<'a>(&self, fq_name: &'a str) -> RegistrarResult<&'a str> {
        let label = fq_name
            .strip_suffix(self.config.domain_name.as_str())
            .and_then(|rest| rest.strip_suffix('.'))
            .filter(|label| is_valid_name(label))
            .ok_or_else(|| RegistrarError::invalid(fq_name, InvalidReason::NameSyntax))?;
        match self.config.name_min_length {
            Some(min) if label.len() < min => Err(RegistrarError::invalid(
                fq_name,
                InvalidReason::NameLength { min },
            )),
            _ => Ok(label),
        }
    }
}

#[async_trait]
impl StatusApi for StatusResolver {
    async fn status(&self, subdomain_name: &str) -> RegistrarResult<SubdomainStatus> {
        // Nothing outside the name alphabet was ever admitted.
        if !is_valid_name(subdomain_name) {
            return Ok(SubdomainStatus::NotFound);
        }

        let fq_name = format!("{}.{}", subdomain_name, self.config.domain_name);
        if self.is_propagated(&fq_name).await? {
            return Ok(SubdomainStatus::Propagated);
        }

        let status = match self.store.latest_for_name(subdomain_name)? {
            Some(record) => SubdomainStatus::from_queue_status(&record.status),
            None => SubdomainStatus::NotFound,
        };
        debug!(name = %subdomain_name, ?status, "Resolved status");
        Ok(status)
    }

    async fn list(&self, from_index: QueueIndex) -> RegistrarResult<Vec<QueueRecord>> {
        let window_ms = self.config.list_window.as_millis() as u64;
        let since = self.time.now().saturating_sub(window_ms);
        Ok(self.store.list(from_index, since, self.config.page_size)?)
    }

    async fn subdomain_info(&self, fq_name: &str) -> RegistrarResult<Option<SubdomainInfo>> {
        let label = self.subdomain_label(fq_name)?;

        let info = self
            .store
            .latest_for_name(label)?
            .and_then(|record| match record.status {
                QueueStatus::Submitted { tx_id } => {
                    Some(SubdomainInfo::submitted(record.operation.owner, tx_id))
                }
                _ => None,
            });
        Ok(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::testing::{MockChainClient, MockTimeSource, TEST_ADDRESSES};
    use shared_types::{ChainError, SubdomainOperation};
    use sr_02_queue_store::InMemoryQueueStore;

    const DOMAIN: &str = "foo.id";
    const DAY_MS: u64 = 24 * 60 * 60 * 1000;

    struct Harness {
        resolver: StatusResolver,
        store: Arc<InMemoryQueueStore>,
        chain: Arc<MockChainClient>,
        time: Arc<MockTimeSource>,
    }

    fn harness() -> Harness {
        let store = Arc::new(InMemoryQueueStore::new());
        let chain = Arc::new(MockChainClient::new());
        let time = Arc::new(MockTimeSource::new(30 * DAY_MS));
        let resolver = StatusResolver::new(
            StatusConfig::new(DOMAIN),
            store.clone(),
            chain.clone(),
            time.clone(),
        );
        Harness {
            resolver,
            store,
            chain,
            time,
        }
    }

    fn enqueue(store: &InMemoryQueueStore, name: &str, at: u64) -> QueueIndex {
        let op = SubdomainOperation::new_registration(name, TEST_ADDRESSES[0], "hello-world");
        store.enqueue(&op, at).unwrap()
    }

    #[tokio::test]
    async fn test_status_lifecycle() {
        let h = harness();
        enqueue(&h.store, "bar", h.time.now());

        assert_eq!(h.resolver.status("bar").await.unwrap(), SubdomainStatus::Queued);

        h.store
            .update_status(
                &["bar".to_string()],
                &QueueStatus::Submitted {
                    tx_id: "txhash".into(),
                },
            )
            .unwrap();
        assert_eq!(
            h.resolver.status("bar").await.unwrap(),
            SubdomainStatus::Submitted {
                tx_id: "txhash".into()
            }
        );

        h.chain.register_subdomain("bar.foo.id", TEST_ADDRESSES[0]);
        assert_eq!(
            h.resolver.status("bar").await.unwrap(),
            SubdomainStatus::Propagated
        );
    }

    #[tokio::test]
    async fn test_chain_overrides_received() {
        let h = harness();
        enqueue(&h.store, "bar", h.time.now());
        h.chain.register_subdomain("bar.foo.id", TEST_ADDRESSES[0]);

        assert_eq!(
            h.resolver.status("bar").await.unwrap(),
            SubdomainStatus::Propagated
        );
    }

    #[tokio::test]
    async fn test_name_without_subdomain_status_is_not_propagated() {
        let h = harness();
        h.chain.set_name(
            "bar.foo.id",
            shared_types::NameInfo {
                address: Some(TEST_ADDRESSES[0].into()),
                status: Some("pending".into()),
            },
        );
        assert_eq!(
            h.resolver.status("bar").await.unwrap(),
            SubdomainStatus::NotFound
        );
    }

    #[tokio::test]
    async fn test_chain_failure_is_surfaced() {
        let h = harness();
        enqueue(&h.store, "bar", h.time.now());
        h.chain.fail_name_lookups(ChainError::Transport {
            reason: "down".into(),
        });

        let err = h.resolver.status("bar").await.unwrap_err();
        assert!(matches!(
            err,
            RegistrarError::Chain(ChainError::Transport { .. })
        ));
    }

    #[tokio::test]
    async fn test_status_of_malformed_name_skips_chain() {
        let h = harness();
        h.chain.fail_name_lookups(ChainError::Transport {
            reason: "down".into(),
        });

        for name in ["bar?x=1", "bar#frag", "ba/r", "Bar", ""] {
            assert_eq!(
                h.resolver.status(name).await.unwrap(),
                SubdomainStatus::NotFound,
                "{name}"
            );
        }
    }

    #[tokio::test]
    async fn test_error_status_passes_through() {
        let h = harness();
        let index = enqueue(&h.store, "bar", h.time.now());
        h.store
            .set_status(
                index,
                &QueueStatus::Error {
                    detail: "submitter log failed".into(),
                },
            )
            .unwrap();

        let status = h.resolver.status("bar").await.unwrap();
        assert_eq!(status.message(), "error: submitter log failed");
    }

    #[tokio::test]
    async fn test_list_window_and_page() {
        let h = harness();
        let now = h.time.now();
        enqueue(&h.store, "old", now - 8 * DAY_MS);
        let first_recent = enqueue(&h.store, "recent0", now - DAY_MS);
        for i in 1..150 {
            enqueue(&h.store, &format!("recent{}", i), now);
        }

        let page = h.resolver.list(0).await.unwrap();
        assert_eq!(page.len(), LIST_PAGE_SIZE);
        assert_eq!(page[0].queue_index, first_recent);
        assert!(page.iter().all(|r| r.name() != "old"));

        let next_from = page[LIST_PAGE_SIZE - 1].queue_index + 1;
        let rest = h.resolver.list(next_from).await.unwrap();
        assert_eq!(rest.len(), 50);
        assert!(rest.windows(2).all(|w| w[0].queue_index < w[1].queue_index));
    }

    #[tokio::test]
    async fn test_subdomain_info() {
        let h = harness();
        enqueue(&h.store, "bar", h.time.now());
        assert_eq!(h.resolver.subdomain_info("bar.foo.id").await.unwrap(), None);

        h.store
            .update_status(
                &["bar".to_string()],
                &QueueStatus::Submitted {
                    tx_id: "tx-9".into(),
                },
            )
            .unwrap();
        let info = h.resolver.subdomain_info("bar.foo.id").await.unwrap().unwrap();
        assert_eq!(info.status, "submitted_subdomain");
        assert_eq!(info.address, TEST_ADDRESSES[0]);
        assert_eq!(info.last_txid, "tx-9");

        assert_eq!(h.resolver.subdomain_info("nobody.foo.id").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_subdomain_info_rejects_foreign_names() {
        let h = harness();
        for name in ["bar.other.id", "foo.id", "Bad!.foo.id", "barfoo.id"] {
            let err = h.resolver.subdomain_info(name).await.unwrap_err();
            assert!(
                matches!(err, RegistrarError::InvalidOperation { .. }),
                "{name}: {err:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_subdomain_info_enforces_min_length() {
        let store = Arc::new(InMemoryQueueStore::new());
        let mut config = StatusConfig::new(DOMAIN);
        config.name_min_length = Some(3);
        let resolver = StatusResolver::new(
            config,
            store.clone(),
            Arc::new(MockChainClient::new()),
            Arc::new(MockTimeSource::new(DAY_MS)),
        );
        enqueue(&store, "ba", DAY_MS);
        enqueue(&store, "bar", DAY_MS);
        store
            .update_status(
                &["ba".to_string(), "bar".to_string()],
                &QueueStatus::Submitted {
                    tx_id: "tx-1".into(),
                },
            )
            .unwrap();

        let err = resolver.subdomain_info("ba.foo.id").await.unwrap_err();
        assert!(err.is_name_length(), "{err:?}");
        assert!(resolver.subdomain_info("bar.foo.id").await.unwrap().is_some());
    }
}
