//! Helpers for working with [`ByteStream`] bodies.

use crate::Result;
use crate::ports::ByteStream;
use bytes::{Bytes, BytesMut};
use futures::{StreamExt, stream};

/// Wrap an in-memory buffer as a single-chunk stream.
pub fn once(data: impl Into<Bytes>) -> ByteStream {
    let data = data.into();
    Box::pin(stream::once(async move { Ok(data) }))
}

/// Wrap a list of chunks as a stream.
pub fn from_chunks(chunks: Vec<Bytes>) -> ByteStream {
    Box::pin(stream::iter(chunks.into_iter().map(Ok)))
}

/// Drain a stream into a contiguous buffer.
///
/// The first chunk error aborts the read and is returned as-is.
pub async fn collect(mut body: ByteStream) -> Result<Bytes> {
    let mut buf = BytesMut::new();
    while let Some(chunk) = body.next().await {
        buf.extend_from_slice(&chunk?);
    }
    Ok(buf.freeze())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_collect_concatenates_chunks() {
        let body = from_chunks(vec![Bytes::from_static(b"ab"), Bytes::from_static(b"cd")]);
        assert_eq!(collect(body).await.unwrap(), Bytes::from_static(b"abcd"));
    }

    #[tokio::test]
    async fn test_collect_propagates_error() {
        let body: ByteStream = Box::pin(stream::iter(vec![
            Ok(Bytes::from_static(b"ab")),
            Err(crate::Error::StoreUnavailable("reset".to_string())),
        ]));
        let err = collect(body).await.unwrap_err();
        assert!(matches!(err, crate::Error::StoreUnavailable(_)));
    }
}
