use std::sync::Arc;
use std::time::{Duration, Instant};

use super::*;
use crate::testing::{FakeManager, LogCapture};
use crate::{PoolError, RetryError, RetryPolicy};

const FAST_RETRY: RetryPolicy = RetryPolicy::fixed(Duration::from_millis(10));

fn pool_with(manager: FakeManager, size: usize) -> ResourcePool<FakeManager> {
    ResourcePool::new(
        PoolConfig::new(PoolRole::Default, "test_pool", size),
        Arc::new(manager),
        FAST_RETRY,
    )
}

#[tokio::test]
async fn test_acquire_before_create_is_fatal() {
    let pool = pool_with(FakeManager::default(), 2);
    assert_eq!(pool.state(), PoolState::Uninitialized);

    let err = pool.acquire().await.unwrap_err();

    assert!(matches!(err, PoolError::NotInitialized(ref name) if name == "test_pool"));
    assert!(err.is_programmer_error());
    assert_eq!(pool.manager().connect_attempts(), 0);
}

#[tokio::test]
async fn test_create_retries_until_backend_answers() {
    let (logs, _guard) = LogCapture::start();
    let delay = Duration::from_millis(20);
    let pool = ResourcePool::new(
        PoolConfig::new(PoolRole::Write, "writer", 3),
        Arc::new(FakeManager::failing(3)),
        RetryPolicy::fixed(delay),
    );

    let start = Instant::now();
    pool.create().await.unwrap();

    assert!(start.elapsed() >= delay * 3);
    assert_eq!(pool.state(), PoolState::Ready);
    assert_eq!(pool.manager().connect_attempts(), 4);

    let status = pool.status();
    assert_eq!(status.failed_attempts, 3);
    assert_eq!(status.idle, 1);
    assert_eq!(status.in_use, 0);

    let retries = logs.matching("ERROR", &["operation=\"create_pool\"", "Retrying in 0.02 seconds"]);
    assert_eq!(retries.len(), 3, "{:#?}", logs.lines());
    assert!(retries.iter().all(|line| line.contains("error=backend unreachable")));
    assert_eq!(logs.matching("INFO", &["Connection pool 'writer' created with size 3"]).len(), 1);
}

#[tokio::test]
async fn test_create_reports_creating_state() {
    let pool = Arc::new(pool_with(FakeManager::failing(u32::MAX), 1));

    let creating = {
        let pool = Arc::clone(&pool);
        tokio::spawn(async move { pool.create().await })
    };
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(pool.state(), PoolState::Creating);

    pool.manager().fail_next(0);
    tokio::time::timeout(Duration::from_secs(1), creating)
        .await
        .expect("creation should finish once the backend answers")
        .unwrap()
        .unwrap();
    assert_eq!(pool.state(), PoolState::Ready);
}

#[tokio::test]
async fn test_concurrent_create_runs_once() {
    let pool = pool_with(FakeManager::default(), 2);

    let (a, b) = futures::join!(pool.create(), pool.create());
    a.unwrap();
    b.unwrap();
    pool.create().await.unwrap();

    assert_eq!(pool.manager().opened(), 1);
}

#[tokio::test]
async fn test_create_with_deadline_can_fail_and_be_retried() {
    let pool = ResourcePool::new(
        PoolConfig::new(PoolRole::Default, "bounded", 1),
        Arc::new(FakeManager::failing(u32::MAX)),
        RetryPolicy::fixed(Duration::from_millis(5)).with_deadline(Duration::from_millis(20)),
    );

    let err = pool.create().await.unwrap_err();
    assert!(matches!(
        err,
        PoolError::Retry(RetryError::DeadlineExceeded { ref operation, .. }) if operation == "create_pool"
    ));
    assert_eq!(pool.state(), PoolState::Uninitialized);

    pool.manager().fail_next(0);
    pool.create().await.unwrap();
    assert_eq!(pool.state(), PoolState::Ready);
}

#[tokio::test]
async fn test_third_acquire_waits_for_release() {
    let pool = pool_with(FakeManager::default(), 2);
    pool.create().await.unwrap();

    let first = pool.acquire().await.unwrap();
    let mut second = pool.acquire().await.unwrap();
    assert_eq!(pool.status().in_use, 2);

    let third = pool.acquire();
    tokio::pin!(third);
    assert!(
        tokio::time::timeout(Duration::from_millis(50), &mut third)
            .await
            .is_err(),
        "third acquire must wait while both slots are held"
    );
    assert_eq!(pool.status().waiting, 1);

    let second_id = second.id;
    assert!(second.release());

    let third = tokio::time::timeout(Duration::from_secs(1), third)
        .await
        .expect("third acquire should be granted after a release")
        .unwrap();

    assert_eq!(third.id, second_id, "released connection is reused");
    assert_eq!(pool.status().waiting, 0);
    assert_eq!(pool.status().in_use, 2);
    drop(first);
    drop(third);
    assert_eq!(pool.status().in_use, 0);
}

#[tokio::test]
async fn test_acquire_retries_connect_errors() {
    let pool = pool_with(FakeManager::default(), 2);
    pool.create().await.unwrap();

    let _first = pool.acquire().await.unwrap();
    pool.manager().fail_next(2);
    let second = pool.acquire().await.unwrap();

    assert_eq!(second.id, 2);
    assert_eq!(pool.status().failed_attempts, 2);
    assert_eq!(pool.status().in_use, 2);
}

#[tokio::test]
async fn test_acquire_deadline_frees_slot() {
    let pool = ResourcePool::new(
        PoolConfig::new(PoolRole::Read, "bounded_reader", 2),
        Arc::new(FakeManager::default()),
        RetryPolicy::fixed(Duration::from_millis(5)).with_deadline(Duration::from_millis(20)),
    );
    pool.create().await.unwrap();
    let _held = pool.acquire().await.unwrap();

    pool.manager().fail_next(u32::MAX);
    let err = pool.acquire().await.unwrap_err();

    assert!(matches!(err, PoolError::Retry(RetryError::DeadlineExceeded { .. })));
    assert_eq!(pool.status().in_use, 1);
}

#[tokio::test]
async fn test_release_twice_warns_and_is_noop() {
    let pool = pool_with(FakeManager::default(), 1);
    pool.create().await.unwrap();

    let (logs, _guard) = LogCapture::start();
    let mut conn = pool.acquire().await.unwrap();
    assert!(conn.release());
    assert!(conn.is_released());
    assert!(logs.matching("WARN", &[]).is_empty());
    assert!(!conn.release());
    let warnings = logs.matching("WARN", &[]);
    assert_eq!(warnings.len(), 1, "{warnings:#?}");
    assert!(warnings[0].contains("Attempted to close an invalid or already closed connection"));
    assert!(warnings[0].contains("pool=test_pool"));
    assert!(conn.get().is_none());

    let status = pool.status();
    assert_eq!(status.idle, 1);
    assert_eq!(status.in_use, 0);
}

#[tokio::test]
#[should_panic(expected = "connection used after release")]
async fn test_deref_after_release_panics() {
    let pool = pool_with(FakeManager::default(), 1);
    pool.create().await.unwrap();

    let mut conn = pool.acquire().await.unwrap();
    conn.release();
    let _ = conn.id;
}

#[tokio::test]
async fn test_pool_release_rejects_foreign_connection() {
    let pool = pool_with(FakeManager::default(), 1);
    let other = pool_with(FakeManager::default(), 1);
    pool.create().await.unwrap();
    other.create().await.unwrap();

    let mut conn = pool.acquire().await.unwrap();
    assert!(!other.release(&mut conn));
    assert!(!conn.is_released());
    assert!(pool.release(&mut conn));
}

#[tokio::test]
async fn test_drop_returns_connection() {
    let pool = pool_with(FakeManager::default(), 1);
    pool.create().await.unwrap();

    {
        let conn = pool.acquire().await.unwrap();
        assert_eq!(conn.id, 1);
        assert_eq!(pool.status().available(), 0);
    }

    let status = pool.status();
    assert_eq!(status.idle, 1);
    assert_eq!(status.in_use, 0);
    assert_eq!(pool.acquire().await.unwrap().id, 1);
}

#[tokio::test]
async fn test_broken_connection_is_discarded() {
    let pool = pool_with(FakeManager::default(), 1);
    pool.create().await.unwrap();

    let mut conn = pool.acquire().await.unwrap();
    conn.broken = true;
    assert!(conn.release());

    let status = pool.status();
    assert_eq!(status.idle, 0);
    assert_eq!(status.in_use, 0);

    let fresh = pool.acquire().await.unwrap();
    assert_eq!(fresh.id, 2);
}

#[tokio::test]
async fn test_invalid_idle_connection_is_replaced() {
    let pool = pool_with(FakeManager::default(), 1);
    pool.create().await.unwrap();
    pool.manager().reject_idle(true);

    let conn = pool.acquire().await.unwrap();

    assert_eq!(conn.id, 2);
    assert_eq!(pool.manager().opened(), 2);
}

#[tokio::test]
async fn test_no_leak_after_many_cycles() {
    let pool = Arc::new(pool_with(FakeManager::default(), 3));
    pool.create().await.unwrap();

    let mut tasks = Vec::new();
    for _ in 0..20 {
        let pool = Arc::clone(&pool);
        tasks.push(tokio::spawn(async move {
            let conn = pool.acquire().await.unwrap();
            tokio::time::sleep(Duration::from_millis(2)).await;
            drop(conn);
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    let status = pool.status();
    assert_eq!(status.in_use, 0);
    assert!(status.idle <= 3);
    assert!(pool.manager().opened() <= 3);

    let held: Vec<_> = futures::future::join_all((0..3).map(|_| pool.acquire()))
        .await
        .into_iter()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(held.len(), 3);
}
