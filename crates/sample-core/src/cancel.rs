//! Cooperative cancellation for long-running operations.

use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::error::AppError;
use crate::result::AppResult;

/// Run `fut` until it completes or `token` is cancelled.
///
/// On cancellation the future is dropped and `ErrorKind::Cancelled` is
/// returned. A token that is already cancelled never polls `fut`.
pub async fn cancellable<F, T>(token: &CancellationToken, fut: F) -> AppResult<T>
where
    F: Future<Output = AppResult<T>>,
{
    tokio::select! {
        biased;
        _ = token.cancelled() => Err(AppError::cancelled("Operation cancelled")),
        result = fut => result,
    }
}
