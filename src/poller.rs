//! Long-running polling with retry, exponential backoff, and cooperative
//! cancellation.
//!
//! A [`Poller`] owns an async operation and invokes it repeatedly: after a
//! success it waits the configured interval, after a failure it waits a
//! retry delay (optionally growing exponentially) and counts consecutive
//! failures. Reaching the attempt budget deactivates the poller silently;
//! operation failures never propagate to the caller of [`Poller::start`].
//!
//! The rescheduling logic is an explicit async loop with exactly two
//! suspension points: awaiting the operation and awaiting the next delay.
//! The delay is raced against a [`CancellationToken`], so [`Poller::stop`]
//! cancels a pending wake-up outright. An operation already in flight when
//! `stop()` is called runs to completion; the loop re-checks the token
//! after the await and never schedules another cycle.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use futures::{FutureExt, TryFutureExt};
use parking_lot::Mutex;
use tokio::sync::Mutex as AsyncMutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::backoff::exponential_delay;
use crate::error::{BoxedError, ConfigError, ConfigResult};

type PollOperation = Box<dyn FnMut() -> BoxFuture<'static, Result<(), BoxedError>> + Send>;
type ErrorCallback = Box<dyn FnMut(&BoxedError, u32) + Send>;

/// Configuration for a [`Poller`].
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Delay between a successful completion and the next invocation.
    ///
    /// `Duration::ZERO` is legal and means "run again as soon as the
    /// previous invocation has fully resolved"; runs are never overlapped.
    pub interval: Duration,

    /// Number of consecutive failures tolerated before the poller
    /// deactivates itself. `None` means unbounded. A value of `1` stops on
    /// the first failure with no retry.
    pub max_attempts: Option<u32>,

    /// Whether the failure-to-failure delay grows exponentially.
    pub use_backoff: bool,

    /// Upper bound on any computed retry delay.
    pub max_backoff_delay: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_attempts: None,
            use_backoff: false,
            max_backoff_delay: Duration::from_secs(30),
        }
    }
}

impl PollerConfig {
    /// Create a configuration builder.
    pub fn builder() -> PollerConfigBuilder {
        PollerConfigBuilder::new()
    }

    /// Validate the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_attempts == Some(0) {
            return Err(ConfigError::invalid("max_attempts must be at least 1"));
        }
        Ok(())
    }

    /// Delay before the next invocation after the given consecutive-failure
    /// count. Computed fresh on every failure from the current count:
    /// the first failure retries after one base interval, each further
    /// consecutive failure doubles the wait up to `max_backoff_delay`.
    fn retry_delay(&self, consecutive_failures: u32) -> Duration {
        if self.use_backoff {
            exponential_delay(
                self.interval,
                2.0,
                consecutive_failures.saturating_sub(1),
                self.max_backoff_delay,
            )
        } else {
            self.interval
        }
    }
}

/// Builder for [`PollerConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct PollerConfigBuilder {
    config: PollerConfig,
}

impl PollerConfigBuilder {
    pub fn new() -> Self {
        Self { config: PollerConfig::default() }
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.config.interval = interval;
        self
    }

    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.config.max_attempts = Some(attempts);
        self
    }

    pub fn unbounded_attempts(mut self) -> Self {
        self.config.max_attempts = None;
        self
    }

    pub fn use_backoff(mut self, enabled: bool) -> Self {
        self.config.use_backoff = enabled;
        self
    }

    pub fn max_backoff_delay(mut self, cap: Duration) -> Self {
        self.config.max_backoff_delay = cap;
        self
    }

    pub fn build(self) -> ConfigResult<PollerConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Activation state, transitioned atomically under a lock.
///
/// The epoch ties a running loop to the activation that spawned it: a loop
/// from a previous activation can neither deactivate nor reschedule a
/// newer one.
struct Lifecycle {
    epoch: u64,
    cancel: Option<CancellationToken>,
}

/// The stored operation and error callback.
///
/// Locked for the full duration of each invocation, which serializes
/// operation calls even across stop/start boundaries: a loop from a new
/// activation waits for an in-flight invocation from the previous one.
struct PollTask {
    operation: PollOperation,
    on_error: Option<ErrorCallback>,
}

/// Repeatedly invokes an async operation with retry and backoff.
///
/// Failures are counted consecutively and reset by any success. All
/// failures are routed to the error callback (or logged when none is set);
/// exhausting the attempt budget is a normal, non-exceptional termination
/// observable only through [`Poller::is_active`] or a side effect in the
/// callback.
///
/// `start()` and `stop()` are both idempotent and safe to call from inside
/// the operation or the error callback.
pub struct Poller {
    config: PollerConfig,
    task: Arc<AsyncMutex<PollTask>>,
    lifecycle: Arc<Mutex<Lifecycle>>,
}

impl Poller {
    /// Create a poller whose failures are logged via `tracing`.
    pub fn new<F, Fut, E>(config: PollerConfig, operation: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
        E: Into<BoxedError> + 'static,
    {
        Self::build(config, operation, None)
    }

    /// Create a poller that forwards each failure to `on_error` together
    /// with the current consecutive-failure count. The callback does not
    /// affect control flow.
    pub fn with_error_handler<F, Fut, E, C>(config: PollerConfig, operation: F, on_error: C) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
        E: Into<BoxedError> + 'static,
        C: FnMut(&BoxedError, u32) + Send + 'static,
    {
        Self::build(config, operation, Some(Box::new(on_error)))
    }

    fn build<F, Fut, E>(config: PollerConfig, mut operation: F, on_error: Option<ErrorCallback>) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
        E: Into<BoxedError> + 'static,
    {
        let operation: PollOperation = Box::new(move || operation().map_err(Into::into).boxed());
        Self {
            config,
            task: Arc::new(AsyncMutex::new(PollTask { operation, on_error })),
            lifecycle: Arc::new(Mutex::new(Lifecycle { epoch: 0, cancel: None })),
        }
    }

    /// Start polling. No-op if already active.
    ///
    /// The first invocation begins immediately (no initial interval wait);
    /// this returns once the cycle is spawned, without blocking for its
    /// completion. Restarting after exhaustion or `stop()` resets the
    /// consecutive-failure counter.
    pub fn start(&self) {
        let mut lifecycle = self.lifecycle.lock();
        if lifecycle.cancel.is_some() {
            debug!("poller already active; start ignored");
            return;
        }

        lifecycle.epoch += 1;
        let epoch = lifecycle.epoch;
        let cancel = CancellationToken::new();
        lifecycle.cancel = Some(cancel.clone());
        drop(lifecycle);

        debug!(epoch, "poller started");
        tokio::spawn(run_loop(
            self.config.clone(),
            Arc::clone(&self.task),
            Arc::clone(&self.lifecycle),
            cancel,
            epoch,
        ));
    }

    /// Stop polling. No-op if already inactive.
    ///
    /// Cancels any pending delay outright; the next invocation never fires.
    /// An operation already in flight is not aborted, but once it resolves
    /// the loop observes the cancellation and schedules nothing further
    /// (a failing in-flight operation still reaches the error callback).
    pub fn stop(&self) {
        let mut lifecycle = self.lifecycle.lock();
        if let Some(cancel) = lifecycle.cancel.take() {
            debug!(epoch = lifecycle.epoch, "poller stopped");
            cancel.cancel();
        }
    }

    /// True between `start()` and a terminal `stop()` or attempt
    /// exhaustion.
    pub fn is_active(&self) -> bool {
        self.lifecycle.lock().cancel.is_some()
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run_loop(
    config: PollerConfig,
    task: Arc<AsyncMutex<PollTask>>,
    lifecycle: Arc<Mutex<Lifecycle>>,
    cancel: CancellationToken,
    epoch: u64,
) {
    let mut consecutive_failures: u32 = 0;

    loop {
        let failed = {
            let mut task = task.lock().await;
            // A stop() racing the lock acquisition cancels the invocation
            // before it begins.
            if cancel.is_cancelled() {
                return;
            }

            match (task.operation)().await {
                Ok(()) => {
                    consecutive_failures = 0;
                    false
                }
                Err(error) => {
                    consecutive_failures = consecutive_failures.saturating_add(1);
                    match task.on_error.as_mut() {
                        Some(on_error) => on_error(&error, consecutive_failures),
                        None => {
                            warn!(failures = consecutive_failures, error = %error, "poll operation failed")
                        }
                    }
                    true
                }
            }
        };

        // The schedule-next decision is gated on re-checking activation
        // *after* the operation await resolves: a stop() issued while the
        // operation was in flight prevents any further cycle.
        if cancel.is_cancelled() {
            return;
        }

        if failed {
            if let Some(max) = config.max_attempts {
                if consecutive_failures >= max {
                    warn!(attempts = consecutive_failures, "attempt budget exhausted; poller deactivating");
                    deactivate(&lifecycle, epoch);
                    return;
                }
            }
        }

        let delay =
            if failed { config.retry_delay(consecutive_failures) } else { config.interval };
        debug!(?delay, failed, "poll cycle complete; scheduling next invocation");

        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(delay) => {}
        }
    }
}

/// Mark the poller inactive from inside its own loop. Gated on the epoch
/// so a stale loop cannot deactivate a newer activation.
fn deactivate(lifecycle: &Mutex<Lifecycle>, epoch: u64) {
    let mut lifecycle = lifecycle.lock();
    if lifecycle.epoch == epoch {
        if let Some(cancel) = lifecycle.cancel.take() {
            cancel.cancel();
        }
    }
}
