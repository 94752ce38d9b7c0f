//! Leading-edge throttling for callbacks.

use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;

/// Rate-limits a callback to at most one invocation per window.
///
/// The first [`Throttler::call`] fires immediately and opens a window of
/// the configured limit; calls arriving inside an open window are dropped.
/// This is leading-edge throttling: dropped values are not replayed when
/// the window closes.
pub struct Throttler<T> {
    limit: Duration,
    callback: Mutex<Box<dyn FnMut(T) + Send>>,
    window_started: Mutex<Option<Instant>>,
}

impl<T> Throttler<T> {
    /// Create a throttler allowing one invocation per `limit`.
    pub fn new<C>(limit: Duration, callback: C) -> Self
    where
        C: FnMut(T) + Send + 'static,
    {
        Self {
            limit,
            callback: Mutex::new(Box::new(callback)),
            window_started: Mutex::new(None),
        }
    }

    /// Invoke the callback with `value` unless a window is open.
    ///
    /// Returns `true` when the callback ran, `false` when the call was
    /// dropped.
    pub fn call(&self, value: T) -> bool {
        let now = Instant::now();
        {
            let mut window = self.window_started.lock();
            if let Some(started) = *window {
                if now.duration_since(started) < self.limit {
                    return false;
                }
            }
            *window = Some(now);
        }

        // Window lock is released before the callback runs so a callback
        // may call reset() without deadlocking.
        let mut callback = self.callback.lock();
        (*callback)(value);
        true
    }

    /// Close the current window so the next call fires immediately.
    pub fn reset(&self) {
        *self.window_started.lock() = None;
    }
}
