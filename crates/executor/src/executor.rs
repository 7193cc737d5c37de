//! Bounded executor
//!
//! Runs independent tasks with at most `max_concurrent` in flight and hands
//! back their outcomes in submission or completion order.
//!
//! # How a run proceeds
//!
//! 1. The configuration is validated. Nothing is invoked if it is rejected.
//! 2. Tasks are admitted by ascending index into a sliding window. Each
//!    admitted task is invoked and its future spawned onto the ambient Tokio
//!    runtime.
//! 3. Settlements are observed one at a time through a single `JoinSet`. Each
//!    one frees a slot that is refilled before the outcome is delivered.
//! 4. Outcomes pass through [`Delivery`]: buffered until their index is next
//!    (`preserve_order`) or released immediately.
//! 5. Under `fast_fail`, the first rejection observed ends the run. Tasks that
//!    have not started are never invoked and in-flight tasks are detached.
//!
//! All bookkeeping lives in the future driving the run, so no locks are taken
//! even on a multi-thread runtime.

use std::any::Any;
use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};

use futures::Stream;
use tokio::task::{Id, JoinError, JoinSet};
use tracing::{debug, instrument, warn, Span};

use crate::config::ExecutorConfig;
use crate::error::ExecutorError;
use crate::outcome::{Outcome, Settled};
use crate::reorder::Delivery;
use crate::window::AdmissionWindow;

/// Runs lists of tasks under one [`ExecutorConfig`]
///
/// The executor itself holds only configuration. Every call to
/// [`run`](Self::run) builds fresh bookkeeping and drops it when the call
/// returns, so one executor can serve any number of concurrent runs.
///
/// Runs must be driven from inside a Tokio runtime.
///
/// # Example
///
/// ```
/// use fanout_executor::{BoundedExecutor, ExecutorConfig};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let executor = BoundedExecutor::new(ExecutorConfig::default().with_max_concurrent(2));
///
/// let tasks = (1..=4u64).map(|n| move || async move { Ok::<_, String>(n * n) });
/// let squares = executor.try_run(tasks).await.unwrap();
///
/// assert_eq!(squares, vec![1, 4, 9, 16]);
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct BoundedExecutor {
    config: ExecutorConfig,
}

impl BoundedExecutor {
    /// Create an executor; the configuration is validated at the start of each run
    pub fn new(config: ExecutorConfig) -> Self {
        Self { config }
    }

    /// Get the current configuration
    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Run every task and collect the outcomes.
    ///
    /// On success the result holds exactly one [`Settled`] entry per task.
    /// Under `fast_fail = false` rejected tasks appear as
    /// [`Outcome::Rejected`] in their slot; under `fast_fail = true` every
    /// entry is fulfilled and the first rejection fails the call instead.
    #[instrument(
        skip_all,
        fields(
            tasks = tracing::field::Empty,
            max_concurrent = ?self.config.max_concurrent,
            preserve_order = self.config.preserve_order,
            fast_fail = self.config.fast_fail,
        )
    )]
    pub async fn run<I, F, Fut, T, E>(
        &self,
        tasks: I,
    ) -> Result<Vec<Settled<T, E>>, ExecutorError<E>>
    where
        I: IntoIterator<Item = F>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: Send + 'static,
    {
        let mut run: Run<F, T, E> = Run::start(&self.config, tasks)?;
        Span::current().record("tasks", run.window.total());

        let mut settled = Vec::with_capacity(run.window.total());
        while let Some(next) = run.next().await {
            settled.push(next?);
        }

        debug!(settled = settled.len(), "Run complete");
        Ok(settled)
    }

    /// Run every task and collect the fulfilled values.
    ///
    /// Under `fast_fail = false` all tasks still settle before a rejection is
    /// reported; the lowest-indexed rejection is returned.
    pub async fn try_run<I, F, Fut, T, E>(&self, tasks: I) -> Result<Vec<T>, ExecutorError<E>>
    where
        I: IntoIterator<Item = F>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: Send + 'static,
    {
        let settled = self.run(tasks).await?;

        let mut values = Vec::with_capacity(settled.len());
        let mut first_rejection: Option<(usize, E)> = None;
        for Settled { index, outcome } in settled {
            match outcome {
                Outcome::Fulfilled(value) => values.push(value),
                Outcome::Rejected(reason) => {
                    if first_rejection.as_ref().map_or(true, |(lowest, _)| index < *lowest) {
                        first_rejection = Some((index, reason));
                    }
                }
            }
        }

        match first_rejection {
            Some((index, reason)) => Err(ExecutorError::task_failed(index, reason)),
            None => Ok(values),
        }
    }

    /// Run every task, yielding outcomes as they become deliverable.
    ///
    /// Items arrive in the same order [`run`](Self::run) would return them.
    /// A run-ending error is yielded once, after which the stream ends.
    /// Settlements are only observed while the stream is being polled.
    pub fn stream<I, F, Fut, T, E>(
        &self,
        tasks: I,
    ) -> impl Stream<Item = Result<Settled<T, E>, ExecutorError<E>>>
    where
        I: IntoIterator<Item = F>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: Send + 'static,
    {
        let start: Result<Run<F, T, E>, _> = Run::start(&self.config, tasks);
        futures::stream::unfold(Some(start), |state| async move {
            match state? {
                Ok(mut run) => {
                    let next = run.next().await?;
                    Some((next, Some(Ok(run))))
                }
                Err(err) => Some((Err(err), None)),
            }
        })
    }
}

/// Run `tasks` once under `config`
///
/// Shorthand for `BoundedExecutor::new(config).run(tasks)`.
pub async fn concurrent<I, F, Fut, T, E>(
    tasks: I,
    config: ExecutorConfig,
) -> Result<Vec<Settled<T, E>>, ExecutorError<E>>
where
    I: IntoIterator<Item = F>,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    BoundedExecutor::new(config).run(tasks).await
}

/// Per-call bookkeeping
struct Run<F, T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    window: AdmissionWindow<F>,
    in_flight: JoinSet<Result<T, E>>,
    indices: HashMap<Id, usize>,
    delivery: Delivery<Settled<T, E>>,
    ready: VecDeque<Settled<T, E>>,
    fast_fail: bool,
    finished: bool,
}

impl<F, Fut, T, E> Run<F, T, E>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    fn start<I>(config: &ExecutorConfig, tasks: I) -> Result<Self, ExecutorError<E>>
    where
        I: IntoIterator<Item = F>,
    {
        config.validate()?;

        let tasks: Vec<F> = tasks.into_iter().collect();
        let slots = config.slots_for(tasks.len());

        Ok(Self {
            window: AdmissionWindow::new(tasks, slots),
            in_flight: JoinSet::new(),
            indices: HashMap::new(),
            delivery: Delivery::new(config.preserve_order),
            ready: VecDeque::new(),
            fast_fail: config.fast_fail,
            finished: false,
        })
    }

    /// Launch tasks until the window is full
    ///
    /// A task that panics while being invoked ends the run the same way as
    /// one that panics while running.
    fn fill(&mut self) -> Result<(), ExecutorError<E>> {
        while let Some((index, task)) = self.window.admit() {
            let future = match panic::catch_unwind(AssertUnwindSafe(task)) {
                Ok(future) => future,
                Err(payload) => {
                    self.window.settle();
                    let message = payload_message(payload.as_ref());
                    let (skipped, detached) = self.abandon();
                    warn!(index, skipped, detached, %message, "Task panicked on invocation");
                    return Err(ExecutorError::TaskPanicked { index, message });
                }
            };

            let handle = self.in_flight.spawn(future);
            self.indices.insert(handle.id(), index);
            debug!(index, in_flight = self.window.in_flight(), "Task admitted");
        }
        Ok(())
    }

    /// Next deliverable outcome, a run-ending error, or `None` once finished
    async fn next(&mut self) -> Option<Result<Settled<T, E>, ExecutorError<E>>> {
        loop {
            if let Some(settled) = self.ready.pop_front() {
                return Some(Ok(settled));
            }
            if self.finished {
                return None;
            }

            if let Err(err) = self.fill() {
                return Some(Err(err));
            }

            let Some(joined) = self.in_flight.join_next_with_id().await else {
                debug_assert!(self.window.is_drained());
                self.finished = true;
                continue;
            };

            match joined {
                Ok((id, result)) => {
                    let index = self.take_index(id);
                    self.window.settle();

                    match result {
                        Err(reason) if self.fast_fail => {
                            let (skipped, detached) = self.abandon();
                            warn!(index, skipped, detached, "Task rejected, failing fast");
                            return Some(Err(ExecutorError::task_failed(index, reason)));
                        }
                        result => {
                            debug!(index, fulfilled = result.is_ok(), "Task settled");
                            if let Err(err) = self.settle(index, result) {
                                return Some(Err(err));
                            }
                        }
                    }
                }
                Err(err) => {
                    let index = self.take_index(err.id());
                    self.window.settle();
                    let message = panic_message(err);
                    let (skipped, detached) = self.abandon();
                    warn!(index, skipped, detached, %message, "Task panicked");
                    return Some(Err(ExecutorError::TaskPanicked { index, message }));
                }
            }
        }
    }

    fn settle(&mut self, index: usize, result: Result<T, E>) -> Result<(), ExecutorError<E>> {
        // Refill the freed slot before the outcome is handed out
        self.fill()?;
        self.delivery
            .accept(index, Settled::new(index, result), &mut self.ready);
        Ok(())
    }
}

impl<F, T, E> Run<F, T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    fn take_index(&mut self, id: Id) -> usize {
        // Every spawned task is registered before it can be joined
        let index = self.indices.remove(&id);
        debug_assert!(index.is_some(), "joined task {id} was never registered");
        index.unwrap_or_default()
    }

    /// Stop delivering: drop unstarted tasks and let in-flight ones run unobserved
    fn abandon(&mut self) -> (usize, usize) {
        self.finished = true;
        self.ready.clear();
        let skipped = self.window.close();
        let detached = self.in_flight.len();
        self.in_flight.detach_all();
        self.indices.clear();
        (skipped, detached)
    }
}

impl<F, T, E> Drop for Run<F, T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    fn drop(&mut self) {
        // Started tasks are never cancelled, even when the caller stops listening
        self.in_flight.detach_all();
    }
}

fn panic_message(err: JoinError) -> String {
    if err.is_cancelled() {
        return "task was cancelled".to_string();
    }
    match err.try_into_panic() {
        Ok(payload) => payload_message(payload.as_ref()),
        Err(err) => err.to_string(),
    }
}

fn payload_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
