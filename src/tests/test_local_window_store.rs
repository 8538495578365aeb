use std::{sync::Arc, time::Duration};

use crate::{LocalWindowStore, Timestamp, WindowStore};

const T0: Timestamp = 1_000_000_000;
const ONE_SECOND: i64 = 1_000_000;

#[tokio::test]
async fn records_the_candidate_as_the_last_element() {
    let store = LocalWindowStore::new();

    let first = store.evict_and_record("k", T0, ONE_SECOND).await.unwrap();
    assert_eq!(first, vec![T0]);

    let second = store
        .evict_and_record("k", T0 + 1000, ONE_SECOND)
        .await
        .unwrap();
    assert_eq!(second, vec![T0, T0 + 1000]);
}

#[tokio::test]
async fn evicts_entries_at_the_exact_window_boundary() {
    let store = LocalWindowStore::new();

    store.evict_and_record("k", T0, ONE_SECOND).await.unwrap();

    // Exactly one interval later the first entry is no longer strictly
    // inside the window.
    let survivors = store
        .evict_and_record("k", T0 + ONE_SECOND, ONE_SECOND)
        .await
        .unwrap();

    assert_eq!(survivors, vec![T0 + ONE_SECOND]);
}

#[tokio::test]
async fn keeps_entries_strictly_inside_the_window() {
    let store = LocalWindowStore::new();

    store.evict_and_record("k", T0, ONE_SECOND).await.unwrap();

    let survivors = store
        .evict_and_record("k", T0 + ONE_SECOND - 1, ONE_SECOND)
        .await
        .unwrap();

    assert_eq!(survivors, vec![T0, T0 + ONE_SECOND - 1]);
}

#[tokio::test]
async fn duplicate_timestamps_are_all_kept() {
    let store = LocalWindowStore::new();

    store.evict_and_record("k", T0, ONE_SECOND).await.unwrap();
    store.evict_and_record("k", T0, ONE_SECOND).await.unwrap();
    let survivors = store.evict_and_record("k", T0, ONE_SECOND).await.unwrap();

    assert_eq!(survivors, vec![T0, T0, T0]);
}

#[tokio::test]
async fn identifiers_do_not_share_state() {
    let store = LocalWindowStore::new();

    store.evict_and_record("a", T0, ONE_SECOND).await.unwrap();
    store.evict_and_record("a", T0 + 1, ONE_SECOND).await.unwrap();

    let survivors = store.evict_and_record("b", T0 + 2, ONE_SECOND).await.unwrap();

    assert_eq!(survivors, vec![T0 + 2]);
}

#[tokio::test]
async fn reaps_idle_records_after_one_interval() {
    let store = LocalWindowStore::new();
    let interval = 50_000; // 50ms

    store.evict_and_record("k", T0, interval).await.unwrap();
    assert_eq!(store.record_count(), 1);

    tokio::time::sleep(Duration::from_millis(200)).await;

    assert_eq!(store.record_count(), 0);
}

#[tokio::test]
async fn activity_defers_the_reaper() {
    let store = LocalWindowStore::new();
    let interval = 300_000; // 300ms

    store.evict_and_record("k", T0, interval).await.unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;

    // Recording again must cancel the pending reaper and start a new one.
    store.evict_and_record("k", T0 + 200_000, interval).await.unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;

    // 400ms after the first record, 200ms after the second: still present.
    assert_eq!(store.record_count(), 1);

    tokio::time::sleep(Duration::from_millis(200)).await;

    // 400ms after the second record: reaped.
    assert_eq!(store.record_count(), 0);
}

#[tokio::test]
async fn pending_reapers_do_not_keep_the_records_alive() {
    let store = LocalWindowStore::new();

    store
        .evict_and_record("k", T0, 60 * ONE_SECOND)
        .await
        .unwrap();
    store
        .evict_and_record("j", T0, 60 * ONE_SECOND)
        .await
        .unwrap();

    // Both reapers are still pending; each holds only a weak handle, so the
    // store owns the sole strong reference to the record map.
    assert_eq!(store.records_strong_count(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_checks_for_one_identifier_lose_no_records() {
    let store = Arc::new(LocalWindowStore::new());

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let store = Arc::clone(&store);

            tokio::spawn(async move {
                for _ in 0..25 {
                    store.evict_and_record("k", T0, ONE_SECOND).await.unwrap();
                }
            })
        })
        .collect();

    for task in tasks {
        task.await.expect("task panicked");
    }

    // Every one of the 200 same-microsecond records survived, plus the
    // read-back call's own record.
    let survivors = store.evict_and_record("k", T0, ONE_SECOND).await.unwrap();
    assert_eq!(survivors.len(), 201);
}
