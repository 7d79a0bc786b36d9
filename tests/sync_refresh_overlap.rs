mod test_support;

use tempfile::tempdir;
use test_support::{payload, synchronizer, wait_until, FakeGateway};

use studyflow::SyncPhase;

#[tokio::test]
async fn overlapping_refresh_is_dropped_not_queued() {
    let gateway = FakeGateway::new();
    gateway.serve_dashboard(3, payload(3, "2025-1"));

    let dir = tempdir().expect("tempdir");
    let sync = synchronizer(&gateway, dir.path()).await;
    sync.select_semester(3).await.expect("first load");
    assert_eq!(gateway.dashboard_fetches(), 1);

    gateway.hold_dashboard(3);
    let held = {
        let sync = sync.clone();
        tokio::spawn(async move { sync.refresh().await })
    };
    wait_until("held refresh to reach the gateway", || {
        gateway.dashboard_fetches() == 2
    })
    .await;

    // second refresh arrives while the first is parked; it must not fetch
    sync.refresh().await.expect("overlapping refresh");
    assert_eq!(gateway.dashboard_fetches(), 2);

    gateway.release_dashboard(3);
    held.await.expect("join").expect("held refresh completes");
    assert_eq!(sync.phase(), SyncPhase::Ready);

    // the guard is released once the in-flight refresh lands
    sync.refresh().await.expect("follow-up refresh");
    assert_eq!(gateway.dashboard_fetches(), 3);
}

#[tokio::test]
async fn refresh_without_active_semester_is_a_noop() {
    let gateway = FakeGateway::new();
    let dir = tempdir().expect("tempdir");
    let sync = synchronizer(&gateway, dir.path()).await;

    sync.refresh().await.expect("refresh with nothing loaded");
    assert_eq!(gateway.dashboard_fetches(), 0);
    assert_eq!(sync.phase(), SyncPhase::Empty);
}
