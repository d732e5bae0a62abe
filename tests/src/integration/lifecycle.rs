//! # Registration Lifecycle
//!
//! ```text
//! admit ──→ received ──batch──→ submitted ──7 blocks──→ finalized ──→ propagated
//! ```

use super::harness::{base_config, occurrences, Registrar, DOMAIN};
use shared_types::testing::TEST_ADDRESSES;
use shared_types::{ChainError, QueueStatus, RegistrarError};
use sr_01_zonefile::build_zonefile;
use sr_02_queue_store::QueueStore;
use sr_05_confirmation::ConfirmationApi;
use sr_04_batch_engine::BatchApi;
use sr_06_status::{StatusApi, SubdomainStatus};
use std::sync::Arc;

#[tokio::test]
async fn test_full_lifecycle() {
    let r = Registrar::new();
    for (i, name) in ["bar", "baz", "qux"].iter().enumerate() {
        r.register(name, TEST_ADDRESSES[i]).await.unwrap();
    }
    assert_eq!(
        r.container.status.status("bar").await.unwrap(),
        SubdomainStatus::Queued
    );

    let tx_ids = r.drain().await;
    assert_eq!(tx_ids, vec!["tx-1".to_string()]);
    assert_eq!(r.store.zonefile_backups().unwrap().len(), 1);
    for name in ["bar", "baz", "qux"] {
        assert_eq!(
            r.container.status.status(name).await.unwrap(),
            SubdomainStatus::Submitted {
                tx_id: "tx-1".into()
            }
        );
    }

    let submitted = r.chain.submitted();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].domain_name, DOMAIN);
    assert_eq!(submitted[0].owner_key, "owner-key");
    assert_eq!(submitted[0].payment_key, "payment-key");

    // Not yet in a block.
    let report = r.container.confirmation.check_zonefiles().await.unwrap();
    assert_eq!(report.pending, vec!["tx-1".to_string()]);

    // In a block, not deep enough.
    r.chain.include_tx("tx-1", 101);
    r.set_height(103);
    let report = r.container.confirmation.check_zonefiles().await.unwrap();
    assert_eq!(report.unconfirmed, vec!["tx-1".to_string()]);
    assert_eq!(
        r.store.tracked_transactions().unwrap()[0].block_height,
        Some(101)
    );
    assert!(r.chain.published().is_empty());

    r.set_height(108);
    let report = r.container.confirmation.check_zonefiles().await.unwrap();
    assert_eq!(report.finalized, vec!["tx-1".to_string()]);
    assert!(r.store.tracked_transactions().unwrap().is_empty());

    let published = r.chain.published();
    assert_eq!(published.len(), 2);
    assert_eq!(published[0], submitted[0].zonefile);

    for (i, name) in ["bar", "baz", "qux"].iter().enumerate() {
        r.chain
            .register_subdomain(&format!("{}.{}", name, DOMAIN), TEST_ADDRESSES[i]);
    }
    assert_eq!(
        r.container.status.status("baz").await.unwrap(),
        SubdomainStatus::Propagated
    );

    let listed = r.container.status.list(0).await.unwrap();
    assert_eq!(listed.len(), 3);
    assert!(listed
        .iter()
        .all(|record| record.status.tx_id() == Some("tx-1")));
}

#[tokio::test]
async fn test_oversized_queue_spans_batches() {
    let mut config = base_config();
    config.zonefile_max_bytes = 300;
    let r = Registrar::with_config(config);

    let names = ["aa1", "aa2", "aa3", "aa4", "aa5"];
    for (i, name) in names.iter().enumerate() {
        r.register(name, TEST_ADDRESSES[i]).await.unwrap();
    }

    let queued: Vec<_> = r
        .store
        .fetch_received()
        .unwrap()
        .into_iter()
        .map(|record| record.operation)
        .collect();
    let first = build_zonefile(DOMAIN, &[], &queued, 300).unwrap();
    assert!(first.included_names.len() < names.len());

    let tx_ids = r.drain().await;
    assert!(tx_ids.len() > 1);

    let zonefiles: Vec<String> = r
        .chain
        .submitted()
        .into_iter()
        .map(|request| request.zonefile)
        .collect();
    assert_eq!(zonefiles[0], first.zonefile);
    assert!(zonefiles.iter().all(|zf| zf.len() < 300));
    for name in names {
        assert_eq!(occurrences(&zonefiles, name), 1, "{name}");
    }

    // Queue order is preserved across batches.
    let order: Vec<String> = names
        .iter()
        .map(|name| {
            r.store
                .latest_for_name(name)
                .unwrap()
                .unwrap()
                .status
                .tx_id()
                .unwrap()
                .to_string()
        })
        .collect();
    let mut sorted = order.clone();
    sorted.sort_by_key(|tx| tx.trim_start_matches("tx-").parse::<u32>().unwrap());
    assert_eq!(order, sorted);
}

#[tokio::test]
async fn test_stale_source_defers_batch() {
    let r = Registrar::new();
    r.register("bar", TEST_ADDRESSES[0]).await.unwrap();

    r.chain.set_chain_info(120, 100);
    let err = r.container.batch.submit_batch().await.unwrap_err();
    assert!(matches!(
        err,
        RegistrarError::Chain(ChainError::StaleSource { .. })
    ));
    assert!(r.chain.submitted().is_empty());
    assert_eq!(
        r.store.latest_for_name("bar").unwrap().unwrap().status,
        QueueStatus::Received
    );

    r.chain.set_chain_info(120, 115);
    assert_eq!(r.drain().await, vec!["tx-1".to_string()]);
}

#[tokio::test]
async fn test_rejected_broadcast_keeps_names_queued() {
    let r = Registrar::new();
    r.register("bar", TEST_ADDRESSES[0]).await.unwrap();
    r.chain.reject_submissions("Insufficient funds for fee");

    let err = r.container.batch.submit_batch().await.unwrap_err();
    assert_eq!(err.to_string(), "Insufficient funds for fee");
    assert!(!err.is_retryable());
    assert_eq!(
        r.container.status.status("bar").await.unwrap(),
        SubdomainStatus::Queued
    );
    assert!(r.store.tracked_transactions().unwrap().is_empty());
}

#[tokio::test]
async fn test_name_taken_on_chain_after_admission_is_dropped() {
    let r = Registrar::new();
    r.register("bar", TEST_ADDRESSES[0]).await.unwrap();
    r.register("baz", TEST_ADDRESSES[1]).await.unwrap();
    r.chain.register_subdomain("bar.foo.id", TEST_ADDRESSES[5]);

    assert_eq!(r.drain().await, vec!["tx-1".to_string()]);
    let zonefiles = vec![r.chain.submitted()[0].zonefile.clone()];
    assert_eq!(occurrences(&zonefiles, "bar"), 0);
    assert_eq!(occurrences(&zonefiles, "baz"), 1);
    assert_eq!(
        r.store.latest_for_name("bar").unwrap().unwrap().status,
        QueueStatus::Received
    );
}

#[tokio::test]
async fn test_resubmission_after_finalization_is_rejected() {
    let r = Registrar::new();
    r.register("bar", TEST_ADDRESSES[0]).await.unwrap();
    r.drain().await;

    let err = r.register("bar", TEST_ADDRESSES[1]).await.unwrap_err();
    assert!(matches!(err, RegistrarError::AlreadyQueued { .. }));

    let err = r.register("other", TEST_ADDRESSES[0]).await.unwrap_err();
    assert!(matches!(err, RegistrarError::SpamRejected(_)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_admission_and_batching() {
    let r = Arc::new(Registrar::new());
    let names: Vec<String> = (0..TEST_ADDRESSES.len()).map(|i| format!("user{}", i)).collect();

    let mut tasks = Vec::new();
    for (i, name) in names.iter().cloned().enumerate() {
        let reg = r.clone();
        tasks.push(tokio::spawn(async move {
            reg.register(&name, TEST_ADDRESSES[i]).await.map(|_| ())
        }));
        if i % 3 == 0 {
            let r = r.clone();
            tasks.push(tokio::spawn(async move {
                r.container.batch.submit_batch().await.map(|_| ())
            }));
        }
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }
    r.drain().await;

    let zonefiles: Vec<String> = r
        .chain
        .submitted()
        .into_iter()
        .map(|request| request.zonefile)
        .collect();
    for name in &names {
        assert_eq!(occurrences(&zonefiles, name), 1, "{name}");
        assert!(r
            .store
            .latest_for_name(name)
            .unwrap()
            .unwrap()
            .status
            .tx_id()
            .is_some());
    }
    assert_eq!(
        r.store.tracked_transactions().unwrap().len(),
        zonefiles.len()
    );
}
