//! Cache contract tests against the in-memory store.

use chrono::{TimeZone, Utc};
use imagestore_core::{CacheMetadata, ObjectStore, stream};
use imagestore_provider::{InMemoryObjectStore, ObjectCache};
use std::sync::Arc;
use std::time::Duration;

fn png_metadata(len: u64) -> CacheMetadata {
    CacheMetadata::new(
        Utc.with_ymd_and_hms(2024, 2, 29, 10, 15, 0).unwrap(),
        Utc.timestamp_opt(1_709_201_700, 987_654_321).unwrap(),
        "image/png",
        Duration::from_secs(365 * 24 * 3600),
        len,
    )
}

async fn read_entry(cache: &ObjectCache, key: &str) -> (Vec<u8>, CacheMetadata) {
    let handle = cache.get(key).await.unwrap().expect("cache hit");
    let metadata = handle.metadata().await.unwrap();
    let body = stream::collect(handle.open_read().await.unwrap()).await.unwrap();
    (body.to_vec(), metadata)
}

#[tokio::test]
async fn test_round_trip_preserves_bytes_and_metadata() {
    let cache = ObjectCache::new(Arc::new(InMemoryObjectStore::new()), "image-cache");
    let bytes = vec![0x89, b'P', b'N', b'G', 0, 1, 2, 3];
    let metadata = png_metadata(bytes.len() as u64);

    cache
        .set("a/b.png", stream::once(bytes.clone()), &metadata)
        .await
        .unwrap();

    let (body, read_back) = read_entry(&cache, "a/b.png").await;
    assert_eq!(body, bytes);
    assert_eq!(read_back.content_type, "image/png");
    assert_eq!(read_back, metadata);
}

#[tokio::test]
async fn test_stored_dictionary_matches_each_key() {
    let store = Arc::new(InMemoryObjectStore::new());
    let cache = ObjectCache::new(store.clone(), "image-cache");
    let metadata = png_metadata(3);

    cache.set("k.png", stream::once(&b"abc"[..]), &metadata).await.unwrap();

    let head = store.head("image-cache", "k.png").await.unwrap().unwrap();
    assert_eq!(head.user_metadata, metadata.to_map());
    assert_eq!(head.content_type.as_deref(), Some("image/png"));
}

#[tokio::test]
async fn test_set_twice_is_idempotent() {
    let store = Arc::new(InMemoryObjectStore::new());
    let cache = ObjectCache::new(store.clone(), "image-cache");
    let metadata = png_metadata(5);

    cache.set("x.png", stream::once(&b"hello"[..]), &metadata).await.unwrap();
    let first = read_entry(&cache, "x.png").await;

    cache.set("x.png", stream::once(&b"hello"[..]), &metadata).await.unwrap();
    let second = read_entry(&cache, "x.png").await;

    assert_eq!(first, second);
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn test_cache_is_scoped_to_its_container() {
    let store = Arc::new(InMemoryObjectStore::new());
    let cache = ObjectCache::new(store.clone(), "image-cache");
    let other = ObjectCache::new(store, "other-cache");

    cache.set("a.png", stream::once(&b"a"[..]), &png_metadata(1)).await.unwrap();

    assert!(cache.get("a.png").await.unwrap().is_some());
    assert!(other.get("a.png").await.unwrap().is_none());
}

#[tokio::test]
async fn test_multi_chunk_body() {
    let cache = ObjectCache::new(Arc::new(InMemoryObjectStore::new()), "image-cache");
    let chunks = vec![
        bytes::Bytes::from_static(b"chunk-1;"),
        bytes::Bytes::from_static(b"chunk-2;"),
        bytes::Bytes::from_static(b"chunk-3"),
    ];

    cache
        .set("big.webp", stream::from_chunks(chunks), &png_metadata(23))
        .await
        .unwrap();

    let (body, _) = read_entry(&cache, "big.webp").await;
    assert_eq!(body, b"chunk-1;chunk-2;chunk-3".to_vec());
}

#[tokio::test]
async fn test_entry_without_cache_metadata_fails_to_parse() {
    let store = Arc::new(InMemoryObjectStore::new());
    store
        .upload(
            "image-cache",
            "foreign.png",
            stream::once(&b"x"[..]),
            Default::default(),
        )
        .await
        .unwrap();
    let cache = ObjectCache::new(store, "image-cache");

    let handle = cache.get("foreign.png").await.unwrap().unwrap();
    let err = handle.metadata().await.unwrap_err();
    assert!(matches!(err, imagestore_core::Error::InvalidMetadata(_)));
}
