//! Bounded-concurrency task runner.
//!
//! Fans a sequence of inputs out to at most `limit` concurrent workers while
//! preserving input order in the output. Workers cooperatively pull from a
//! shared queue; the queue lives behind a mutex so the cursor advance stays
//! race-free on a multi-threaded runtime.

use crate::error::{Result, RunnerError};
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use tokio::task::JoinSet;

/// Run `handler` over `inputs` with at most `limit` concurrent invocations.
///
/// `output[i] == handler(inputs[i])` regardless of completion order. An empty
/// input short-circuits without invoking the handler. If any invocation
/// fails, remaining workers stop pulling new work, every spawned worker is
/// joined, and the first failure propagates; no partial results are returned.
pub async fn run_bounded<I, T, F, Fut>(inputs: Vec<I>, limit: usize, handler: F) -> Result<Vec<T>>
where
    I: Send + 'static,
    T: Send + 'static,
    F: Fn(I) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T>> + Send,
{
    if limit == 0 {
        return Err(RunnerError::ZeroConcurrency.into());
    }
    if inputs.is_empty() {
        return Ok(Vec::new());
    }

    let total = inputs.len();
    let worker_count = limit.min(total);
    let queue = Arc::new(Mutex::new(inputs.into_iter().enumerate()));
    let failed = Arc::new(AtomicBool::new(false));
    let handler = Arc::new(handler);

    let mut join_set = JoinSet::new();
    for _ in 0..worker_count {
        let queue = Arc::clone(&queue);
        let failed = Arc::clone(&failed);
        let handler = Arc::clone(&handler);

        join_set.spawn(async move {
            let mut outputs = Vec::new();
            loop {
                if failed.load(Ordering::Acquire) {
                    break;
                }
                let next = { queue.lock().await.next() };
                let Some((index, input)) = next else {
                    break;
                };
                match handler(input).await {
                    Ok(output) => outputs.push((index, output)),
                    Err(error) => {
                        failed.store(true, Ordering::Release);
                        return Err(error);
                    }
                }
            }
            Ok(outputs)
        });
    }

    // Join every worker before surfacing any failure so no spawned work is
    // left orphaned behind the caller's back.
    let mut slots: Vec<Option<T>> = Vec::with_capacity(total);
    slots.resize_with(total, || None);
    let mut first_error = None;

    while let Some(joined) = join_set.join_next().await {
        match joined {
            Ok(Ok(outputs)) => {
                for (index, output) in outputs {
                    slots[index] = Some(output);
                }
            }
            Ok(Err(error)) => {
                if first_error.is_none() {
                    first_error = Some(error);
                }
            }
            Err(join_error) => {
                if first_error.is_none() {
                    first_error = Some(RunnerError::Join(join_error.to_string()).into());
                }
            }
        }
    }

    if let Some(error) = first_error {
        return Err(error);
    }

    let mut results = Vec::with_capacity(total);
    for (index, slot) in slots.into_iter().enumerate() {
        match slot {
            Some(output) => results.push(output),
            None => {
                return Err(RunnerError::Join(format!("worker dropped output for input {index}"))
                    .into());
            }
        }
    }

    Ok(results)
}
