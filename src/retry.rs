//! Bounded one-shot retry with exponential backoff.
//!
//! Unlike the [`crate::poller::Poller`], which polls indefinitely and
//! swallows failures, a [`Retrier`] executes a single logical operation up
//! to `max_retries + 1` times and resolves to the final value or, once the
//! budget is exhausted, to the last error. Both contracts exist side by
//! side on purpose: conflating them would overload one API with
//! terminal-with-error and terminal-with-silence semantics.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

use crate::backoff::exponential_delay;
use crate::error::{ConfigError, ConfigResult};

/// Errors surfaced by [`Retrier::execute`].
#[derive(Debug, Error)]
pub enum RetryError<E> {
    /// Every attempt failed; carries the last operation error.
    #[error("all {attempts} attempts failed")]
    Exhausted {
        attempts: u32,
        #[source]
        source: E,
    },
}

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Number of retries after the initial attempt.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Growth factor applied per attempt: the delay before retry `k`
    /// (0-based) is `initial_delay * backoff_multiplier^k`.
    pub backoff_multiplier: f64,
    /// Upper bound on any computed delay.
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_secs(1),
            backoff_multiplier: 2.0,
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryConfig {
    /// Create a configuration builder.
    pub fn builder() -> RetryConfigBuilder {
        RetryConfigBuilder::new()
    }

    /// Validate the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.backoff_multiplier <= 0.0 {
            return Err(ConfigError::invalid("backoff_multiplier must be greater than 0"));
        }
        Ok(())
    }
}

/// Builder for [`RetryConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct RetryConfigBuilder {
    config: RetryConfig,
}

impl RetryConfigBuilder {
    pub fn new() -> Self {
        Self { config: RetryConfig::default() }
    }

    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.max_retries = retries;
        self
    }

    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.config.initial_delay = delay;
        self
    }

    pub fn backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.config.backoff_multiplier = multiplier;
        self
    }

    pub fn max_delay(mut self, cap: Duration) -> Self {
        self.config.max_delay = cap;
        self
    }

    pub fn build(self) -> ConfigResult<RetryConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Executes an operation with bounded retries.
pub struct Retrier {
    config: RetryConfig,
}

impl Retrier {
    /// Create a retrier with the given configuration.
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Execute an operation, retrying on failure until it succeeds or the
    /// attempt budget runs out.
    ///
    /// Attempts are strictly serialized: the operation is fully awaited and
    /// the computed delay elapsed before the next attempt begins.
    pub async fn execute<F, Fut, T, E>(&self, mut operation: F) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Debug,
    {
        let mut attempt: u32 = 0;
        loop {
            match operation().await {
                Ok(value) => {
                    if attempt > 0 {
                        debug!(retries = attempt, "operation succeeded after retries");
                    }
                    return Ok(value);
                }
                Err(error) => {
                    if attempt >= self.config.max_retries {
                        warn!(
                            attempts = attempt + 1,
                            error = ?error,
                            "all retry attempts exhausted"
                        );
                        return Err(RetryError::Exhausted { attempts: attempt + 1, source: error });
                    }

                    let delay = exponential_delay(
                        self.config.initial_delay,
                        self.config.backoff_multiplier,
                        attempt,
                        self.config.max_delay,
                    );
                    warn!(
                        attempt = attempt + 1,
                        max_retries = self.config.max_retries,
                        ?delay,
                        error = ?error,
                        "operation failed; retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

/// Convenience function to execute an operation with the given retry
/// configuration.
pub async fn retry<F, Fut, T, E>(config: RetryConfig, operation: F) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: fmt::Debug,
{
    Retrier::new(config).execute(operation).await
}
