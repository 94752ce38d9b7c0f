//! Async pacing primitives.
//!
//! This crate provides small, composable scheduling building blocks for
//! best-effort background work:
//! - **[`poller`]**: a long-running [`Poller`] that invokes an async
//!   operation on an interval, retries with optional exponential backoff,
//!   and stops after a bounded number of consecutive failures or on
//!   explicit cancellation
//! - **[`retry`]**: a bounded one-shot [`Retrier`] that returns the final
//!   value or the last error once its attempt budget is exhausted
//! - **[`backoff`]**: the shared exponential delay arithmetic
//! - **[`debounce`]** / **[`throttle`]**: trailing-edge and leading-edge
//!   rate control for callbacks
//!
//! The poller and the retrier are related but deliberately separate
//! contracts: the poller never surfaces operation failures to its caller
//! (exhaustion is a silent terminal state), while the retrier resolves to
//! the last error.
//!
//! ## Usage
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use pacer::{Poller, PollerConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = PollerConfig::builder()
//!         .interval(Duration::from_secs(2))
//!         .max_attempts(5)
//!         .use_backoff(true)
//!         .build()
//!         .expect("valid poller config");
//!
//!     let poller = Poller::new(config, || async {
//!         // e.g. hit a status endpoint
//!         Ok::<_, std::io::Error>(())
//!     });
//!
//!     poller.start();
//!     tokio::time::sleep(Duration::from_secs(30)).await;
//!     poller.stop();
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod backoff;
pub mod debounce;
pub mod error;
pub mod poller;
pub mod retry;
pub mod throttle;

// Re-export commonly used types for convenience
// ------------------------------
pub use backoff::exponential_delay;
pub use debounce::Debouncer;
pub use error::{BoxedError, ConfigError, ConfigResult};
pub use poller::{Poller, PollerConfig, PollerConfigBuilder};
pub use retry::{retry, Retrier, RetryConfig, RetryConfigBuilder, RetryError};
pub use throttle::Throttler;
