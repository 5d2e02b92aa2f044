use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Scatter/gather with strict re-ordering: run `count` tasks with at most
/// `concurrency` in flight, collect results into a dense index-keyed
/// array, and return only once every slot holds a terminal result.
/// Completion order is irrelevant to the caller — slot `i` always holds
/// task `i`'s result. A slot is `None` only if its task panicked.
pub async fn scatter_ordered<R, F, Fut>(count: usize, concurrency: usize, make: F) -> Vec<Option<R>>
where
    R: Send + 'static,
    F: Fn(usize) -> Fut,
    Fut: Future<Output = R> + Send + 'static,
{
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut tasks = JoinSet::new();
    for index in 0..count {
        let semaphore = semaphore.clone();
        let work = make(index);
        tasks.spawn(async move {
            // Never closed, so acquire only fails if the runtime is
            // tearing down; run unthrottled in that case rather than hang.
            let _permit = semaphore.acquire_owned().await.ok();
            (index, work.await)
        });
    }

    let mut slots: Vec<Option<R>> = (0..count).map(|_| None).collect();
    while let Some(joined) = tasks.join_next().await {
        if let Ok((index, result)) = joined {
            slots[index] = Some(result);
        }
    }
    slots
}
