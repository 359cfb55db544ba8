use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use scriptgate::lock::{resolve_strategy, LockToken, WorkspaceLock};
use scriptgate::types::LockStrategy;
use scriptgate_test_utils::with_timeout;

/// Holds the lock in `strategy` for a while, tracking overlap.
async fn hold(
    lock: WorkspaceLock,
    strategy: LockStrategy,
    active: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
) {
    let _token = lock.acquire(strategy).await;
    let now = active.fetch_add(1, Ordering::SeqCst) + 1;
    peak.fetch_max(now, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(30)).await;
    active.fetch_sub(1, Ordering::SeqCst);
}

async fn peak_overlap(strategies: &[LockStrategy]) -> usize {
    let lock = WorkspaceLock::new();
    let active = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = strategies
        .iter()
        .map(|s| {
            tokio::spawn(hold(
                lock.clone(),
                *s,
                Arc::clone(&active),
                Arc::clone(&peak),
            ))
        })
        .collect();

    for handle in handles {
        with_timeout(handle).await.unwrap();
    }
    peak.load(Ordering::SeqCst)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn writers_are_exclusive() {
    let peak = peak_overlap(&[LockStrategy::Write, LockStrategy::Write, LockStrategy::Write]).await;
    assert_eq!(peak, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn readers_and_writers_never_overlap() {
    let peak = peak_overlap(&[LockStrategy::Write, LockStrategy::Read, LockStrategy::Write]).await;
    assert_eq!(peak, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn readers_share_the_lock() {
    let lock = WorkspaceLock::new();
    let first = lock.acquire(LockStrategy::Read).await;
    let second = with_timeout(lock.acquire(LockStrategy::Read)).await;

    assert!(matches!(first, LockToken::Read(_)));
    assert!(matches!(second, LockToken::Read(_)));
}

#[tokio::test]
async fn writer_waits_for_readers_to_drain() {
    let lock = WorkspaceLock::new();
    let reader = lock.acquire(LockStrategy::Read).await;

    let blocked =
        tokio::time::timeout(Duration::from_millis(50), lock.acquire(LockStrategy::Write)).await;
    assert!(blocked.is_err(), "writer must wait while a reader holds the lock");

    drop(reader);
    let writer = with_timeout(lock.acquire(LockStrategy::Write)).await;
    assert_eq!(writer.strategy(), LockStrategy::Write);
}

#[tokio::test]
async fn none_strategy_never_blocks() {
    let lock = WorkspaceLock::new();
    let _writer = lock.acquire(LockStrategy::Write).await;

    let token = with_timeout(lock.acquire(LockStrategy::None)).await;
    assert!(matches!(token, LockToken::Unlocked));
}

#[test]
fn explicit_override_wins_over_the_goal_default() {
    let mut overrides = BTreeMap::new();
    overrides.insert("Lint".to_string(), LockStrategy::None);

    assert_eq!(
        resolve_strategy("lint", &overrides, Some(LockStrategy::Read)),
        LockStrategy::None
    );
    assert_eq!(
        resolve_strategy("install", &overrides, Some(LockStrategy::Write)),
        LockStrategy::Write
    );
    assert_eq!(resolve_strategy("my-script", &overrides, None), LockStrategy::None);
}

#[tokio::test]
async fn global_handles_share_one_lock() {
    let a = WorkspaceLock::global();
    let b = WorkspaceLock::global();

    let _writer = a.acquire(LockStrategy::Write).await;
    let blocked =
        tokio::time::timeout(Duration::from_millis(50), b.acquire(LockStrategy::Read)).await;
    assert!(blocked.is_err());
}
