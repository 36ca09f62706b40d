//! Bounded-concurrency mapping over a slice.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures::future::try_join_all;

use assetdupe_core::{ScanError, ScanState};

/// Apply `f` to every item with at most `limit` calls in flight.
///
/// A fixed pool of workers repeatedly claims the next unclaimed index until
/// the input is exhausted. The output has one slot per input, so
/// `result[i]` always belongs to `items[i]` regardless of completion order.
///
/// An item whose call fails yields `None` and its siblings keep going. A
/// fatal error (see [`ScanError::is_fatal`]), or a cancellation observed
/// when a worker claims its next index, aborts every worker and is
/// returned.
pub async fn map_with_concurrency<T, R, F, Fut>(
    items: &[T],
    limit: usize,
    state: &ScanState,
    f: F,
) -> Result<Vec<Option<R>>, ScanError>
where
    T: Clone,
    F: Fn(T, usize) -> Fut,
    Fut: Future<Output = Result<R, ScanError>>,
{
    state.check()?;
    if items.is_empty() {
        return Ok(Vec::new());
    }

    let next_index = AtomicUsize::new(0);
    let worker_count = limit.max(1).min(items.len());

    let next_index = &next_index;
    let f = &f;
    let workers = (0..worker_count).map(|_| async move {
        let mut produced = Vec::new();
        loop {
            state.check()?;
            let index = next_index.fetch_add(1, Ordering::Relaxed);
            let Some(item) = items.get(index) else {
                break;
            };

            match f(item.clone(), index).await {
                Ok(value) => produced.push((index, value)),
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => tracing::trace!(index, error = %err, "item dropped"),
            }
        }
        Ok::<_, ScanError>(produced)
    });

    let batches = try_join_all(workers).await?;

    let mut results: Vec<Option<R>> = std::iter::repeat_with(|| None).take(items.len()).collect();
    for (index, value) in batches.into_iter().flatten() {
        results[index] = Some(value);
    }
    Ok(results)
}
