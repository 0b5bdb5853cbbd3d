// nc_loader/src/retry.rs
// Exponential backoff for connection bootstrap. Batch writes are never retried.

use std::future::Future;
use std::time::Duration;

use backoff::ExponentialBackoff;
use backoff::future::retry;
use tracing::warn;

use crate::error::{LoaderError, Result};

const MAX_ELAPSED: Duration = Duration::from_secs(30,);

pub async fn execute_with_retry<F, Fut, T,>(operation: F,) -> Result<T,>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, backoff::Error<LoaderError,>,>,>,
{
    let backoff = ExponentialBackoff {
        max_elapsed_time: Some(MAX_ELAPSED,),
        ..ExponentialBackoff::default()
    };

    retry(backoff, operation,).await
}

pub fn transient_error(err: LoaderError,) -> backoff::Error<LoaderError,> {
    warn!("Transient error encountered, retrying: {}", err);
    backoff::Error::transient(err,)
}

pub fn permanent_error(err: LoaderError,) -> backoff::Error<LoaderError,> {
    backoff::Error::permanent(err,)
}

pub fn wrap_error(err: LoaderError,) -> backoff::Error<LoaderError,> {
    if err.is_transient() {
        transient_error(err,)
    } else {
        permanent_error(err,)
    }
}
