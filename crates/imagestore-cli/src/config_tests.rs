use crate::commands::{CacheCommands, Commands, ConfigCommands};
use crate::config::Settings;
use crate::handlers::guess_content_type;
use crate::runtime::Runtime;
use chrono::Utc;
use imagestore_core::{CacheMetadata, Error, ObjectStore, UploadOptions, stream};
use imagestore_provider::InMemoryObjectStore;
use imagestore_s3::S3ClientOptions;
use pretty_assertions::assert_eq;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

const SAMPLE: &str = r#"
containers:
  - name: images
    endpoint: nyc3.digitaloceanspaces.com
    access_key_id: DO00KEY
    secret_access_key: secret-one
  - bucket_name: images-archive
    endpoint: http://localhost:9000
    access_key_id: minio
    secret_access_key: minio123
    region: eu-west-1
cache:
  bucket_name: image-cache
  endpoint: nyc3.digitaloceanspaces.com
  access_key_id: DO00KEY
  secret_access_key: secret-one
  public_read: true
operation_timeout_ms: 2500
"#;

fn memory_runtime(settings: &Settings) -> (Result<Runtime, Error>, Arc<InMemoryObjectStore>) {
    let store = Arc::new(InMemoryObjectStore::new());
    let shared = store.clone();
    let factory = move |_: &S3ClientOptions| -> Arc<dyn ObjectStore> { shared.clone() };
    (Runtime::build(settings, &factory), store)
}

#[test]
fn test_parse_sample() {
    let settings = Settings::from_yaml(SAMPLE).unwrap();

    assert_eq!(settings.containers.len(), 2);
    assert_eq!(settings.containers[0].name, "images");
    assert_eq!(settings.containers[0].client.region, "us-east-1");
    assert_eq!(settings.containers[1].name, "images-archive");
    assert_eq!(settings.containers[1].client.region, "eu-west-1");

    let cache = settings.cache.as_ref().unwrap();
    assert_eq!(cache.bucket_name, "image-cache");
    assert!(cache.client.public_read);

    assert_eq!(settings.operation_timeout(), Some(Duration::from_millis(2500)));
    assert!(settings.formats.iter().any(|f| f == "webp"));
}

#[test]
fn test_defaults_when_empty() {
    let settings = Settings::from_yaml("{}").unwrap();
    assert!(settings.containers.is_empty());
    assert!(settings.cache.is_none());
    assert_eq!(settings.operation_timeout(), None);
}

#[test]
fn test_load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, SAMPLE).unwrap();

    let settings = Settings::load(Some(path.as_path())).unwrap();
    assert_eq!(settings.containers.len(), 2);

    let missing = Settings::load(Some(Path::new("/nonexistent/imagestore.yaml")));
    assert!(matches!(missing, Err(Error::Config(_))));
}

#[test]
fn test_expand_env() {
    // SAFETY: variable names are unique to this test.
    unsafe { std::env::set_var("IMAGESTORE_TEST_SPACES_KEY", "DO00ABC") };

    let settings = Settings::from_yaml(
        r#"
containers:
  - name: images
    endpoint: ${IMAGESTORE_TEST_SPACES_KEY}.example.com
    access_key_id: ${ IMAGESTORE_TEST_SPACES_KEY }
    secret_access_key: literal $HOME stays
"#,
    )
    .unwrap();

    let client = &settings.containers[0].client;
    assert_eq!(client.endpoint, "DO00ABC.example.com");
    assert_eq!(client.access_key_id, "DO00ABC");
    assert_eq!(client.secret_access_key, "literal $HOME stays");
}

#[test]
fn test_expanded_secret_is_taken_verbatim() {
    // SAFETY: variable names are unique to this test.
    unsafe { std::env::set_var("IMAGESTORE_TEST_HASH_SECRET", "abc #def: *x") };

    let settings = Settings::from_yaml(
        r#"
containers:
  - name: images
    endpoint: nyc3.digitaloceanspaces.com
    access_key_id: DO00KEY
    secret_access_key: ${IMAGESTORE_TEST_HASH_SECRET}
"#,
    )
    .unwrap();

    assert_eq!(settings.containers[0].client.secret_access_key, "abc #def: *x");
}

#[test]
fn test_commented_reference_is_ignored() {
    let settings = Settings::from_yaml(
        r#"
containers:
  - name: images
    endpoint: nyc3.digitaloceanspaces.com
    access_key_id: DO00KEY
    # secret_access_key: ${IMAGESTORE_TEST_COMMENTED_UNSET}
    secret_access_key: literal-secret
"#,
    )
    .unwrap();

    assert_eq!(settings.containers[0].client.secret_access_key, "literal-secret");
}

#[test]
fn test_unset_reference_in_value_fails() {
    let err = Settings::from_yaml(
        r#"
cache:
  bucket_name: image-cache
  endpoint: nyc3.digitaloceanspaces.com
  access_key_id: ${IMAGESTORE_TEST_CACHE_UNSET}
  secret_access_key: s
"#,
    )
    .unwrap_err();

    assert!(matches!(err, Error::Config(_)));
    assert!(err.to_string().contains("IMAGESTORE_TEST_CACHE_UNSET"));
}

#[test]
fn test_duplicate_container_fails_at_startup() {
    let settings = Settings::from_yaml(
        r#"
containers:
  - name: images
    endpoint: a.example.com
    access_key_id: k
    secret_access_key: s
  - name: Images
    endpoint: b.example.com
    access_key_id: k
    secret_access_key: s
"#,
    )
    .unwrap();

    let (runtime, _) = memory_runtime(&settings);
    assert!(matches!(runtime, Err(Error::DuplicateContainer(_))));
}

#[tokio::test]
async fn test_runtime_serves_provider_and_cache() {
    let settings = Settings::from_yaml(SAMPLE).unwrap();
    let (runtime, store) = memory_runtime(&settings);
    let runtime = runtime.unwrap();

    store
        .upload(
            "images-archive",
            "2019/beach.jpg",
            stream::once(&b"jpeg"[..]),
            UploadOptions::default(),
        )
        .await
        .unwrap();

    let handle = runtime
        .provider
        .get("/Images-Archive/2019/beach.jpg")
        .await
        .unwrap()
        .expect("source image");
    assert_eq!(handle.object().container, "images-archive");
    assert!(runtime.provider.get("/images/2019/beach.jpg").await.unwrap().is_none());

    let cache = runtime.cache.as_ref().unwrap();
    assert_eq!(cache.container(), "image-cache");

    let metadata = CacheMetadata::new(
        Utc::now(),
        Utc::now(),
        "image/webp",
        Duration::from_secs(60),
        4,
    );
    cache
        .set("2019/beach-w200.webp", stream::once(&b"webp"[..]), &metadata)
        .await
        .unwrap();
    let cached = cache.get("2019/beach-w200.webp").await.unwrap().unwrap();
    assert_eq!(cached.metadata().await.unwrap(), metadata);
}

#[test]
fn test_guess_content_type() {
    assert_eq!(guess_content_type(Path::new("a/photo.JPG")), Some("image/jpeg"));
    assert_eq!(guess_content_type(Path::new("icon.webp")), Some("image/webp"));
    assert_eq!(guess_content_type(Path::new("notes.txt")), None);
    assert_eq!(guess_content_type(Path::new("noext")), None);
}

#[test]
fn test_config_path_skips_settings() {
    let path = Commands::Config {
        command: ConfigCommands::Path,
    };
    assert!(!path.needs_settings());

    let show = Commands::Config {
        command: ConfigCommands::Show,
    };
    assert!(show.needs_settings());

    let get = Commands::Cache {
        command: CacheCommands::Get {
            key: "a.png".to_string(),
            output: None,
        },
    };
    assert!(get.needs_settings());
    assert!(Commands::Route { path: "/images/a.png".to_string() }.needs_settings());
}
