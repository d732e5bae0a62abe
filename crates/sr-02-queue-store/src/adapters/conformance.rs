//! Behaviour every `QueueStore` adapter must share.

use crate::ports::store::QueueStore;
use shared_types::{QueueStatus, SubdomainOperation, SubmitterRecord, TrackedTransaction};

const OWNER: &str = "SP000000000000000000002Q6VF78";

fn op(name: &str) -> SubdomainOperation {
    SubdomainOperation::new_registration(name, OWNER, format!("zonefile for {}", name))
}

fn submitted(tx: &str) -> QueueStatus {
    QueueStatus::Submitted { tx_id: tx.into() }
}

pub fn enqueue_assigns_monotonic_indexes(store: &dyn QueueStore) {
    let a = store.enqueue(&op("a"), 1_000).unwrap();
    let b = store.enqueue(&op("b"), 1_000).unwrap();
    let c = store.enqueue(&op("c"), 999).unwrap();
    assert!(a < b && b < c);

    let record = store.latest_for_name("b").unwrap().unwrap();
    assert_eq!(record.queue_index, b);
    assert_eq!(record.status, QueueStatus::Received);
    assert_eq!(record.operation, op("b"));
    assert!(store.latest_for_name("missing").unwrap().is_none());
}

pub fn status_updates_latest_only(store: &dyn QueueStore) {
    let first = store.enqueue(&op("bar"), 1).unwrap();
    store
        .set_status(
            first,
            &QueueStatus::Error {
                detail: "log failed".into(),
            },
        )
        .unwrap();
    let second = store.enqueue(&op("bar"), 2).unwrap();

    store
        .update_status(&["bar".to_string(), "ghost".to_string()], &submitted("txhash"))
        .unwrap();

    let latest = store.latest_for_name("bar").unwrap().unwrap();
    assert_eq!(latest.queue_index, second);
    assert_eq!(latest.status.tx_id(), Some("txhash"));

    // The older record keeps its error status
    let history = store.list(0, 0, 10).unwrap();
    let older = history.iter().find(|r| r.queue_index == first).unwrap();
    assert!(matches!(older.status, QueueStatus::Error { .. }));
}

pub fn fetch_received_oldest_first(store: &dyn QueueStore) {
    store.enqueue(&op("a"), 1).unwrap();
    store.enqueue(&op("b"), 2).unwrap();
    store.enqueue(&op("c"), 3).unwrap();
    store
        .update_status(&["b".to_string()], &submitted("tx-1"))
        .unwrap();

    let names: Vec<String> = store
        .fetch_received()
        .unwrap()
        .into_iter()
        .map(|r| r.operation.subdomain_name)
        .collect();
    assert_eq!(names, vec!["a", "c"]);
}

pub fn list_window_and_cursor(store: &dyn QueueStore) {
    for (i, at) in [100u64, 200, 300, 400, 500].iter().enumerate() {
        store.enqueue(&op(&format!("n{}", i)), *at).unwrap();
    }

    let recent = store.list(0, 250, 100).unwrap();
    assert_eq!(recent.len(), 3);
    assert!(recent.windows(2).all(|w| w[0].queue_index < w[1].queue_index));

    let from_cursor = store.list(recent[1].queue_index, 0, 100).unwrap();
    assert_eq!(from_cursor.len(), 2);
    assert_eq!(from_cursor[0].queue_index, recent[1].queue_index);

    let limited = store.list(0, 0, 2).unwrap();
    assert_eq!(limited.len(), 2);
}

pub fn submitter_counts(store: &dyn QueueStore) {
    let log = |owner: &str, ip: Option<&str>, index| SubmitterRecord {
        ip_address: ip.map(str::to_string),
        owner: owner.to_string(),
        queue_index: index,
    };
    store.log_submitter(&log("SP1", Some("10.0.0.1"), 1)).unwrap();
    store.log_submitter(&log("SP2", Some("10.0.0.1"), 2)).unwrap();
    store.log_submitter(&log("SP3", None, 3)).unwrap();

    assert_eq!(store.count_by_owner("SP1").unwrap(), 1);
    assert_eq!(store.count_by_owner("SP9").unwrap(), 0);
    assert_eq!(store.count_by_ip("10.0.0.1").unwrap(), 2);
    assert_eq!(store.count_by_ip("10.0.0.2").unwrap(), 0);
}

pub fn tracked_transaction_lifecycle(store: &dyn QueueStore) {
    store
        .track_transaction(&TrackedTransaction::new("tx-a", "zf-a"))
        .unwrap();
    store
        .track_transaction(&TrackedTransaction::new("tx-b", "zf-b"))
        .unwrap();

    let mut tracked = store.tracked_transactions().unwrap();
    assert_eq!(tracked.len(), 2);
    assert!(tracked.iter().all(|t| t.block_height.is_none()));

    for tx in tracked.iter_mut() {
        tx.block_height = Some(50);
    }
    store.update_block_heights(&tracked).unwrap();
    assert!(store
        .tracked_transactions()
        .unwrap()
        .iter()
        .all(|t| t.block_height == Some(50)));

    store.remove_tracked(&["tx-a".to_string()]).unwrap();
    let remaining = store.tracked_transactions().unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].tx_id, "tx-b");
    assert_eq!(remaining[0].zonefile, "zf-b");
}

pub fn backups_append_only(store: &dyn QueueStore) {
    store.backup_zonefile("first", 10).unwrap();
    store.backup_zonefile("second", 10).unwrap();
    let backups = store.zonefile_backups().unwrap();
    let zonefiles: Vec<&str> = backups.iter().map(|b| b.zonefile.as_str()).collect();
    assert_eq!(zonefiles, vec!["first", "second"]);
}
