mod test_support;

use tempfile::tempdir;
use test_support::{open_row, payload, payload_with, sem_item, synchronizer, wait_until, FakeGateway};

use studyflow::SyncPhase;

#[tokio::test]
async fn superseded_response_never_clobbers_the_newer_one() {
    let gateway = FakeGateway::new();
    gateway.serve_dashboard(
        1,
        payload_with(
            1,
            "2024-1",
            Vec::new(),
            vec![sem_item(1, "2024-1", false)],
            vec![open_row(100, "Old homework", "2024-03-04", None)],
            Vec::new(),
        ),
    );
    gateway.serve_dashboard(2, payload(2, "2024-2"));

    let dir = tempdir().expect("tempdir");
    let sync = synchronizer(&gateway, dir.path()).await;

    // first selection parks at the gateway; a second one overtakes it
    gateway.hold_dashboard(1);
    let first = {
        let sync = sync.clone();
        tokio::spawn(async move { sync.select_semester(1).await })
    };
    wait_until("first load to reach the gateway", || {
        gateway.dashboard_fetches() == 1
    })
    .await;

    sync.select_semester(2).await.expect("second load");
    assert_eq!(sync.snapshot().await.expect("snapshot").sem_id, 2);

    // the older response lands last and must be discarded
    gateway.release_dashboard(1);
    first
        .await
        .expect("join")
        .expect("superseded load still reports ok");

    let snapshot = sync.snapshot().await.expect("snapshot");
    assert_eq!(snapshot.sem_id, 2);
    assert!(snapshot.incomplete.is_empty());
    assert_eq!(sync.active_semester().await, Some(2));
    assert_eq!(sync.phase(), SyncPhase::Ready);
    assert_eq!(sync.session().last_semester(), Some(2));
}

#[tokio::test]
async fn superseded_failure_is_swallowed() {
    let gateway = FakeGateway::new();
    gateway.fail_dashboard(1, 500, "slow shard");
    gateway.serve_dashboard(2, payload(2, "2024-2"));

    let dir = tempdir().expect("tempdir");
    let sync = synchronizer(&gateway, dir.path()).await;

    gateway.hold_dashboard(1);
    let first = {
        let sync = sync.clone();
        tokio::spawn(async move { sync.select_semester(1).await })
    };
    wait_until("first load to reach the gateway", || {
        gateway.dashboard_fetches() == 1
    })
    .await;

    sync.select_semester(2).await.expect("second load");
    gateway.release_dashboard(1);
    first
        .await
        .expect("join")
        .expect("stale failure must not surface");

    // the late failure neither errors the phase nor touches the snapshot
    assert_eq!(sync.phase(), SyncPhase::Ready);
    assert_eq!(sync.snapshot().await.expect("snapshot").sem_id, 2);
}
