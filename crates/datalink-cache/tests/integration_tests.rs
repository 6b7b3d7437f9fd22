//! Integration tests for datalink-cache
//!
//! These tests require a running Redis server and are skipped unless
//! `REDIS_HOST` is set:
//!
//! ```bash
//! export REDIS_HOST=localhost
//! cargo test -p datalink-cache --test integration_tests
//! ```

use std::time::Duration;

use datalink_cache::CacheClient;
use datalink_common::AppConfig;
use serde::{Deserialize, Serialize};

fn live_client() -> Option<CacheClient> {
    std::env::var("REDIS_HOST").ok()?;
    let config = AppConfig::from_env().ok()?;
    CacheClient::from_config(&config.cache).ok()
}

fn unique_key(name: &str) -> String {
    format!("datalink:it:{}:{name}", std::process::id())
}

#[tokio::test]
async fn test_set_then_get() {
    let Some(cache) = live_client() else {
        return;
    };
    let key = unique_key("set_then_get");

    cache.set(&key, "v", Some(5)).await.unwrap();
    assert_eq!(cache.get(&key).await.unwrap().as_deref(), Some("v"));

    let ttl = cache.ttl(&key).await.unwrap().unwrap();
    assert!((1..=5).contains(&ttl));

    assert!(cache.delete(&key).await.unwrap());
    assert_eq!(cache.get(&key).await.unwrap(), None);
}

#[tokio::test]
async fn test_value_expires() {
    let Some(cache) = live_client() else {
        return;
    };
    let key = unique_key("expires");

    cache.set(&key, "short-lived", Some(1)).await.unwrap();
    assert!(cache.exists(&key).await.unwrap());

    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(cache.get(&key).await.unwrap(), None);
    assert_eq!(cache.ttl(&key).await.unwrap(), None);
}

#[tokio::test]
async fn test_set_without_expiry() {
    let Some(cache) = live_client() else {
        return;
    };
    let key = unique_key("no_expiry");

    cache.set(&key, "kept", None).await.unwrap();
    assert_eq!(cache.ttl(&key).await.unwrap(), Some(-1));
    cache.delete(&key).await.unwrap();
}

#[tokio::test]
async fn test_delete_missing_key() {
    let Some(cache) = live_client() else {
        return;
    };
    assert!(!cache.delete(&unique_key("never_set")).await.unwrap());
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Session {
    user_id: i64,
    active: bool,
}

#[tokio::test]
async fn test_json_round_trip() {
    let Some(cache) = live_client() else {
        return;
    };
    let key = unique_key("json");
    let session = Session {
        user_id: 42,
        active: true,
    };

    cache.set_json(&key, &session, Some(30)).await.unwrap();
    let loaded: Option<Session> = cache.get_json(&key).await.unwrap();
    assert_eq!(loaded, Some(session));
    cache.delete(&key).await.unwrap();
}

#[tokio::test]
async fn test_health_check() {
    let Some(cache) = live_client() else {
        return;
    };
    cache.health_check().await.unwrap();
}
