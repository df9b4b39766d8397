//! Per-operation deadlines for store round-trips.

use imagestore_core::{Error, Result};
use std::future::Future;
use std::time::Duration;

/// Await `fut`, failing with [`Error::Timeout`] if `limit` elapses first.
///
/// On expiry the in-flight future is dropped, which cancels the store call.
pub(crate) async fn bounded<T>(
    limit: Option<Duration>,
    operation: &str,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    let Some(limit) = limit else {
        return fut.await;
    };

    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| Error::Timeout {
            operation: operation.to_string(),
            millis: limit.as_millis() as u64,
        })?
}
