//! Command handlers.

use crate::config::Settings;
use crate::runtime::Runtime;
use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use console::style;
use futures::StreamExt;
use imagestore_core::{ByteStream, CacheMetadata, stream};
use std::path::Path;
use std::time::Duration;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Show routing for a path.
pub fn route(runtime: &Runtime, path: &str) -> Result<()> {
    let router = runtime.provider.router();

    if !runtime.provider.matches(path) {
        println!("{} {} matches no container", style("✗").red(), path);
        return Ok(());
    }

    match router.match_path(path) {
        Some(object) => {
            println!("{} {}", style("✓").green(), path);
            println!("  container: {}", object.container);
            println!("  key:       {}", object.key);
        }
        None => println!(
            "{} {} is a candidate but resolves to no object key",
            style("✗").yellow(),
            path
        ),
    }
    Ok(())
}

/// Print source image metadata as JSON.
pub async fn stat(runtime: &Runtime, path: &str) -> Result<()> {
    let handle = runtime
        .provider
        .get(path)
        .await?
        .with_context(|| format!("Image not found: {}", path))?;

    let metadata = handle.metadata().await?;
    println!("{}", serde_json::to_string_pretty(&metadata)?);
    Ok(())
}

/// Download a source image.
pub async fn fetch(runtime: &Runtime, path: &str, output: Option<&Path>) -> Result<()> {
    let handle = runtime
        .provider
        .get(path)
        .await?
        .with_context(|| format!("Image not found: {}", path))?;

    let written = write_body(handle.open_read().await?, output).await?;
    eprintln!("{} {} ({} bytes)", style("✓").green(), handle.object(), written);
    Ok(())
}

/// Read a cache entry.
pub async fn cache_get(runtime: &Runtime, key: &str, output: Option<&Path>) -> Result<()> {
    let cache = require_cache(runtime)?;
    let Some(handle) = cache.get(key).await? else {
        bail!("Cache miss: {}", key);
    };

    let metadata = handle.metadata().await?;
    let written = write_body(handle.open_read().await?, output).await?;
    eprintln!(
        "{} {} ({}, {} bytes, cached {})",
        style("✓").green(),
        handle.object(),
        metadata.content_type,
        written,
        metadata.cache_last_write_utc.to_rfc3339()
    );
    Ok(())
}

/// Store a file in the cache.
pub async fn cache_put(
    runtime: &Runtime,
    key: &str,
    file: &Path,
    content_type: Option<String>,
    max_age: u64,
) -> Result<()> {
    let cache = require_cache(runtime)?;

    let data = tokio::fs::read(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let modified: DateTime<Utc> = tokio::fs::metadata(file).await?.modified()?.into();

    let content_type = match content_type.or_else(|| guess_content_type(file).map(str::to_string)) {
        Some(content_type) => content_type,
        None => bail!("Cannot guess content type for {}; pass --content-type", file.display()),
    };

    let metadata = CacheMetadata::new(
        modified,
        Utc::now(),
        content_type,
        Duration::from_secs(max_age),
        data.len() as u64,
    );

    cache.set(key, stream::once(data), &metadata).await?;
    eprintln!(
        "{} Cached {} as {}",
        style("✓").green(),
        style(key).bold(),
        metadata.content_type
    );
    Ok(())
}

/// Show configuration.
pub fn show_config(settings: &Settings) -> Result<()> {
    println!("Current configuration:");
    println!("  containers:");
    if settings.containers.is_empty() {
        println!("    (none)");
    }
    for container in &settings.containers {
        println!(
            "    - {} @ {} (key {}, secret ***)",
            container.name,
            container.client.endpoint_url(),
            container.client.access_key_id
        );
    }
    match &settings.cache {
        Some(cache) => println!(
            "  cache: {} @ {}",
            cache.bucket_name,
            cache.client.endpoint_url()
        ),
        None => println!("  cache: (not set)"),
    }
    match settings.operation_timeout_ms {
        Some(ms) => println!("  operation_timeout_ms: {}", ms),
        None => println!("  operation_timeout_ms: (not set)"),
    }
    println!("  formats: {}", settings.formats.join(", "));
    Ok(())
}

/// Print the default configuration path.
pub fn config_path() -> Result<()> {
    let path = Settings::config_path().context("Could not determine config directory")?;
    println!("{}", path.display());
    Ok(())
}

fn require_cache(runtime: &Runtime) -> Result<&imagestore_provider::ObjectCache> {
    runtime
        .cache
        .as_ref()
        .context("No cache configured; add a `cache` section to the configuration")
}

async fn write_body(mut body: ByteStream, output: Option<&Path>) -> Result<u64> {
    let mut writer: Box<dyn AsyncWrite + Unpin + Send> = match output {
        Some(path) => Box::new(
            tokio::fs::File::create(path)
                .await
                .with_context(|| format!("Failed to create {}", path.display()))?,
        ),
        None => Box::new(tokio::io::stdout()),
    };

    let mut written = 0u64;
    while let Some(chunk) = body.next().await {
        let chunk = chunk?;
        writer.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    writer.flush().await?;
    Ok(written)
}

pub(crate) fn guess_content_type(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let content_type = match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "tga" => "image/x-tga",
        "avif" => "image/avif",
        _ => return None,
    };
    Some(content_type)
}
