//! Tests du magasin TTL SQLite

use std::time::Duration;

use serde_json::json;
use tempfile::TempDir;

use muzcache::{normalize, Namespace, SqliteStore, TtlStore};

fn setup_store(max_entries: usize) -> (SqliteStore, TempDir) {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let store = SqliteStore::open(dir.path(), max_entries).expect("Failed to open store");
    (store, dir)
}

#[tokio::test]
async fn test_set_then_get_roundtrip() {
    let (store, _dir) = setup_store(100);

    let key = normalize(Namespace::Song, "Shape of You");
    let value = json!({"title": "Shape of You", "durationSeconds": 233, "artist": "Ed Sheeran"});

    store
        .set(&key, value.clone(), Duration::from_secs(300))
        .await
        .unwrap();

    let fetched = store.get(&key).await.unwrap();
    assert_eq!(fetched, Some(value));
}

#[tokio::test]
async fn test_get_missing_key_is_none() {
    let (store, _dir) = setup_store(100);

    let key = normalize(Namespace::Song, "never stored");
    assert_eq!(store.get(&key).await.unwrap(), None);
}

#[tokio::test]
async fn test_zero_ttl_expires_immediately() {
    let (store, _dir) = setup_store(100);

    let key = normalize(Namespace::Stream, "ephemeral");
    store
        .set(&key, json!("https://example.com/a.m4a"), Duration::ZERO)
        .await
        .unwrap();

    assert_eq!(store.get(&key).await.unwrap(), None);
    assert_eq!(store.size().await.unwrap(), 0);
}

#[tokio::test]
async fn test_overwrite_replaces_value_and_ttl() {
    let (store, _dir) = setup_store(100);

    let key = normalize(Namespace::Song, "perfect");
    store
        .set(&key, json!({"v": 1}), Duration::from_secs(300))
        .await
        .unwrap();
    store
        .set(&key, json!({"v": 2}), Duration::from_secs(600))
        .await
        .unwrap();

    assert_eq!(store.get(&key).await.unwrap(), Some(json!({"v": 2})));
    assert_eq!(store.size().await.unwrap(), 1);
}

#[tokio::test]
async fn test_eviction_above_capacity_removes_earliest_expiring() {
    let (store, _dir) = setup_store(3);

    // Plus le TTL est court, plus l'entrée est candidate à l'éviction
    for (i, ttl) in [60u64, 120, 180, 240].iter().enumerate() {
        let key = normalize(Namespace::Song, &format!("query {}", i));
        store
            .set(&key, json!(i), Duration::from_secs(*ttl))
            .await
            .unwrap();
    }

    assert_eq!(store.size().await.unwrap(), 3);

    // L'entrée au TTL le plus court a été évincée
    let evicted = normalize(Namespace::Song, "query 0");
    assert_eq!(store.get(&evicted).await.unwrap(), None);

    let kept = normalize(Namespace::Song, "query 3");
    assert_eq!(store.get(&kept).await.unwrap(), Some(json!(3)));
}

#[tokio::test]
async fn test_keys_with_prefix_separates_namespaces() {
    let (store, _dir) = setup_store(100);

    let song = normalize(Namespace::Song, "halo");
    let stream = normalize(Namespace::Stream, "halo");
    store
        .set(&song, json!({}), Duration::from_secs(300))
        .await
        .unwrap();
    store
        .set(&stream, json!("url"), Duration::from_secs(600))
        .await
        .unwrap();

    let songs = store
        .keys_with_prefix(Namespace::Song.prefix())
        .await
        .unwrap();
    assert_eq!(songs, vec![song]);

    let streams = store
        .keys_with_prefix(Namespace::Stream.prefix())
        .await
        .unwrap();
    assert_eq!(streams, vec![stream]);
}

#[tokio::test]
async fn test_flush_all_empties_the_store() {
    let (store, _dir) = setup_store(100);

    for i in 0..5 {
        let key = normalize(Namespace::Song, &format!("query {}", i));
        store
            .set(&key, json!(i), Duration::from_secs(300))
            .await
            .unwrap();
    }
    assert_eq!(store.size().await.unwrap(), 5);

    store.flush_all().await.unwrap();
    assert_eq!(store.size().await.unwrap(), 0);
}

#[tokio::test]
async fn test_status_counts_per_namespace() {
    let (store, _dir) = setup_store(100);

    for i in 0..3 {
        let key = normalize(Namespace::Song, &format!("song {}", i));
        store
            .set(&key, json!(i), Duration::from_secs(300))
            .await
            .unwrap();
    }
    let key = normalize(Namespace::Stream, "song 0");
    store
        .set(&key, json!("url"), Duration::from_secs(600))
        .await
        .unwrap();

    let status = store.status().await.unwrap();
    assert_eq!(status.db_size, 4);
    assert_eq!(status.song_entries, 3);
    assert_eq!(status.stream_entries, 1);
    assert!(status.memory_usage > 0);
}

#[tokio::test]
async fn test_store_persists_across_reopen() {
    let dir = TempDir::new().unwrap();
    let key = normalize(Namespace::Song, "persistent");

    {
        let store = SqliteStore::open(dir.path(), 100).unwrap();
        store
            .set(&key, json!({"title": "t"}), Duration::from_secs(300))
            .await
            .unwrap();
    }

    let store = SqliteStore::open(dir.path(), 100).unwrap();
    assert_eq!(
        store.get(&key).await.unwrap(),
        Some(json!({"title": "t"}))
    );
}
