//! Object and cache metadata.

use crate::{Error, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Metadata as reported by a single store round-trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectHead {
    /// Last modification time of the stored object.
    pub last_modified: DateTime<Utc>,
    /// Size of the object in bytes.
    pub content_length: u64,
    /// Content type recorded by the store, if any.
    pub content_type: Option<String>,
    /// User-defined metadata attached at upload time.
    #[serde(default)]
    pub user_metadata: BTreeMap<String, String>,
}

/// Metadata exposed to the pipeline for a source image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMetadata {
    pub last_modified_utc: DateTime<Utc>,
    pub content_length: u64,
    /// Cache-control max age. `None` means unset.
    pub max_age: Option<Duration>,
    pub content_type: Option<String>,
}

impl From<ObjectHead> for ObjectMetadata {
    fn from(head: ObjectHead) -> Self {
        Self {
            last_modified_utc: head.last_modified,
            content_length: head.content_length,
            max_age: None,
            content_type: head.content_type,
        }
    }
}

/// Metadata stored alongside a cached artifact.
///
/// Serialized into the object's user metadata on `set` and parsed back on
/// `get`. [`CacheMetadata::to_map`] and [`CacheMetadata::from_map`] are
/// inverse operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheMetadata {
    /// When the source image was last written.
    pub source_last_write_utc: DateTime<Utc>,
    /// When the cached artifact was written.
    pub cache_last_write_utc: DateTime<Utc>,
    /// Content type of the cached artifact.
    pub content_type: String,
    /// Max age to advertise to clients.
    pub cache_control_max_age: Duration,
    /// Size of the cached artifact in bytes.
    pub content_length: u64,
}

impl CacheMetadata {
    pub const SOURCE_LAST_WRITE_KEY: &'static str = "SourceLastWriteTimeUtc";
    pub const CACHE_LAST_WRITE_KEY: &'static str = "CacheLastWriteTimeUtc";
    pub const CONTENT_TYPE_KEY: &'static str = "ContentType";
    pub const MAX_AGE_KEY: &'static str = "CacheControlMaxAge";
    pub const CONTENT_LENGTH_KEY: &'static str = "ContentLength";

    pub fn new(
        source_last_write_utc: DateTime<Utc>,
        cache_last_write_utc: DateTime<Utc>,
        content_type: impl Into<String>,
        cache_control_max_age: Duration,
        content_length: u64,
    ) -> Self {
        Self {
            source_last_write_utc,
            cache_last_write_utc,
            content_type: content_type.into(),
            cache_control_max_age,
            content_length,
        }
    }

    /// Convert to a string dictionary suitable for object user metadata.
    pub fn to_map(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        map.insert(
            Self::SOURCE_LAST_WRITE_KEY.to_string(),
            format_timestamp(&self.source_last_write_utc),
        );
        map.insert(
            Self::CACHE_LAST_WRITE_KEY.to_string(),
            format_timestamp(&self.cache_last_write_utc),
        );
        map.insert(Self::CONTENT_TYPE_KEY.to_string(), self.content_type.clone());
        map.insert(
            Self::MAX_AGE_KEY.to_string(),
            format_duration(&self.cache_control_max_age),
        );
        map.insert(
            Self::CONTENT_LENGTH_KEY.to_string(),
            self.content_length.to_string(),
        );
        map
    }

    /// Parse from a string dictionary.
    ///
    /// Keys are matched case-insensitively since S3-compatible stores
    /// lower-case user metadata names on the wire.
    pub fn from_map(map: &BTreeMap<String, String>) -> Result<Self> {
        let source_last_write_utc = parse_timestamp(lookup(map, Self::SOURCE_LAST_WRITE_KEY)?)?;
        let cache_last_write_utc = parse_timestamp(lookup(map, Self::CACHE_LAST_WRITE_KEY)?)?;
        let content_type = lookup(map, Self::CONTENT_TYPE_KEY)?.to_string();
        let cache_control_max_age = parse_duration(lookup(map, Self::MAX_AGE_KEY)?)?;
        let content_length = lookup(map, Self::CONTENT_LENGTH_KEY)?
            .parse::<u64>()
            .map_err(|e| Error::InvalidMetadata(format!("{}: {}", Self::CONTENT_LENGTH_KEY, e)))?;

        Ok(Self {
            source_last_write_utc,
            cache_last_write_utc,
            content_type,
            cache_control_max_age,
            content_length,
        })
    }
}

fn lookup<'a>(map: &'a BTreeMap<String, String>, key: &str) -> Result<&'a str> {
    map.get(key)
        .or_else(|| {
            map.iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(key))
                .map(|(_, v)| v)
        })
        .map(String::as_str)
        .ok_or_else(|| Error::InvalidMetadata(format!("missing {}", key)))
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::InvalidMetadata(format!("bad timestamp {:?}: {}", value, e)))
}

// Seconds with a nine-digit fraction, e.g. "3600.000000000".
fn format_duration(d: &Duration) -> String {
    format!("{}.{:09}", d.as_secs(), d.subsec_nanos())
}

fn parse_duration(value: &str) -> Result<Duration> {
    let bad = || Error::InvalidMetadata(format!("bad duration {:?}", value));
    let (secs, nanos) = match value.split_once('.') {
        Some((secs, frac)) => {
            if frac.is_empty() || frac.len() > 9 || !frac.bytes().all(|b| b.is_ascii_digit()) {
                return Err(bad());
            }
            let scale = 10u32.pow(9 - frac.len() as u32);
            let nanos = frac.parse::<u32>().map_err(|_| bad())? * scale;
            (secs, nanos)
        }
        None => (value, 0),
    };
    let secs = secs.parse::<u64>().map_err(|_| bad())?;
    Ok(Duration::new(secs, nanos))
}
