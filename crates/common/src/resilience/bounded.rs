//! Bounded fan-out for limiting concurrent operations
//!
//! Maps an async worker over a list of inputs with at most `max_concurrent`
//! invocations outstanding. Results keep the input order no matter which
//! worker finishes first. All work is polled from the calling task, so the
//! fan-out is cooperative interleaving of I/O, not extra threads.
//!
//! Failure handling: the first error stops new items from being started.
//! Workers that are already running are allowed to settle (they are never
//! aborted mid-flight) and the first error is returned once they have.

use std::fmt;
use std::future::Future;
use std::num::NonZeroUsize;

use futures::stream::{FuturesUnordered, StreamExt};
use tracing::{debug, instrument, warn};

/// Rejected limiter configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimiterConfigError;

impl fmt::Display for LimiterConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("max_concurrent must be greater than 0")
    }
}

impl std::error::Error for LimiterConfigError {}

/// Runs a worker over many inputs with a ceiling on concurrency.
///
/// # Examples
///
/// ```rust
/// use ravenfleet_common::resilience::ConcurrencyLimiter;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let limiter = ConcurrencyLimiter::new(2)?;
///
/// let doubled = limiter
///     .run(vec![1, 2, 3], |n| async move { Ok::<_, std::io::Error>(n * 2) })
///     .await?;
///
/// assert_eq!(doubled, vec![2, 4, 6]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConcurrencyLimiter {
    max_concurrent: NonZeroUsize,
}

impl ConcurrencyLimiter {
    /// # Errors
    /// Returns [`LimiterConfigError`] when `max_concurrent` is zero.
    pub fn new(max_concurrent: usize) -> Result<Self, LimiterConfigError> {
        NonZeroUsize::new(max_concurrent)
            .map(|max_concurrent| Self { max_concurrent })
            .ok_or(LimiterConfigError)
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent.get()
    }

    /// Apply `worker` to every item, at most `max_concurrent` at a time.
    ///
    /// The returned vector has one result per item, in item order. An empty
    /// input resolves immediately without calling `worker`.
    ///
    /// # Errors
    /// Returns the first worker error, after all started workers settled.
    #[instrument(skip_all, fields(max_concurrent = self.max_concurrent.get()))]
    pub async fn run<T, R, E, F, Fut>(&self, items: Vec<T>, worker: F) -> Result<Vec<R>, E>
    where
        F: Fn(T) -> Fut,
        Fut: Future<Output = Result<R, E>>,
    {
        let total = items.len();
        if total == 0 {
            return Ok(Vec::new());
        }

        let limit = self.max_concurrent.get();
        let worker = &worker;
        let mut pending = items.into_iter().enumerate();
        let mut in_flight = FuturesUnordered::new();
        let mut slots: Vec<Option<R>> = std::iter::repeat_with(|| None).take(total).collect();
        let mut first_error: Option<(usize, E)> = None;

        loop {
            while first_error.is_none() && in_flight.len() < limit {
                let Some((index, item)) = pending.next() else { break };
                in_flight.push(async move { (index, worker(item).await) });
            }

            let Some((index, outcome)) = in_flight.next().await else { break };
            match outcome {
                Ok(value) => slots[index] = Some(value),
                Err(error) => {
                    if first_error.is_none() {
                        debug!(index, in_flight = in_flight.len(), "worker failed; draining in-flight work");
                        first_error = Some((index, error));
                    } else {
                        debug!(index, "additional worker failure while draining");
                    }
                }
            }
        }

        if let Some((index, error)) = first_error {
            warn!(index, total, "bounded run aborted by worker failure");
            return Err(error);
        }

        Ok(slots.into_iter().flatten().collect())
    }
}

/// Shorthand for [`ConcurrencyLimiter::run`] with a one-off limit.
///
/// # Errors
/// Returns the first worker error. A zero `max_concurrent` is treated as 1.
pub async fn run_bounded<T, R, E, F, Fut>(
    items: Vec<T>,
    max_concurrent: usize,
    worker: F,
) -> Result<Vec<R>, E>
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = Result<R, E>>,
{
    let limiter = ConcurrencyLimiter {
        max_concurrent: NonZeroUsize::new(max_concurrent).unwrap_or(NonZeroUsize::MIN),
    };
    limiter.run(items, worker).await
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::time::Duration;

    use super::*;
    use crate::testing::ConcurrencyProbe;

    #[test]
    fn rejects_zero_limit() {
        assert_eq!(ConcurrencyLimiter::new(0), Err(LimiterConfigError));
        assert_eq!(ConcurrencyLimiter::new(3).map(|l| l.max_concurrent()), Ok(3));
    }

    #[tokio::test]
    async fn empty_input_never_calls_worker() {
        let calls = RefCell::new(0usize);
        let limiter = ConcurrencyLimiter::new(4).unwrap();

        let out: Vec<u32> = limiter
            .run(Vec::<u32>::new(), |n| {
                *calls.borrow_mut() += 1;
                async move { Ok::<_, String>(n) }
            })
            .await
            .unwrap();

        assert!(out.is_empty());
        assert_eq!(*calls.borrow(), 0);
    }

    #[tokio::test]
    async fn keeps_input_order_when_completion_is_reversed() {
        let limiter = ConcurrencyLimiter::new(5).unwrap();
        let items: Vec<u64> = (0..5).collect();

        let out = limiter
            .run(items, |n| async move {
                tokio::time::sleep(Duration::from_millis((5 - n) * 10)).await;
                Ok::<_, String>(n * 10)
            })
            .await
            .unwrap();

        assert_eq!(out, vec![0, 10, 20, 30, 40]);
    }

    #[tokio::test]
    async fn limit_of_one_is_sequential() {
        let order = RefCell::new(Vec::new());
        let probe = ConcurrencyProbe::new();
        let limiter = ConcurrencyLimiter::new(1).unwrap();

        limiter
            .run(vec!['a', 'b', 'c', 'd'], |c| {
                let probe = &probe;
                let order = &order;
                async move {
                    let _guard = probe.enter();
                    order.borrow_mut().push(c);
                    tokio::task::yield_now().await;
                    Ok::<_, String>(())
                }
            })
            .await
            .unwrap();

        assert_eq!(*order.borrow(), vec!['a', 'b', 'c', 'd']);
        assert_eq!(probe.peak(), 1);
    }

    #[tokio::test]
    async fn run_bounded_treats_zero_as_one() {
        let probe = ConcurrencyProbe::new();
        let out = run_bounded(vec![1, 2, 3], 0, |n| {
            let probe = &probe;
            async move {
                let _guard = probe.enter();
                tokio::task::yield_now().await;
                Ok::<_, String>(n)
            }
        })
        .await
        .unwrap();

        assert_eq!(out, vec![1, 2, 3]);
        assert_eq!(probe.peak(), 1);
    }
}
