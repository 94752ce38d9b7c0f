//! Trailing-edge debouncing for callbacks.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

type DebouncedCallback<T> = Arc<Mutex<Box<dyn FnMut(T) + Send>>>;

/// Delays invocation of a callback until a quiet period has elapsed.
///
/// Each [`Debouncer::call`] supersedes any pending delivery and restarts
/// the quiet-period timer with the latest value, so a rapid burst of calls
/// collapses into a single invocation carrying the last value. At most one
/// delivery is pending at any time.
///
/// ```no_run
/// use std::time::Duration;
///
/// use pacer::Debouncer;
///
/// # async fn demo() {
/// let search = Debouncer::new(Duration::from_millis(300), |query: String| {
///     println!("searching for {query}");
/// });
///
/// for text in ["h", "he", "hel", "hello"] {
///     search.call(text.to_string());
/// }
/// // only "hello" is ever searched
/// # }
/// ```
pub struct Debouncer<T> {
    delay: Duration,
    callback: DebouncedCallback<T>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Create a debouncer that fires `callback` after `delay` of quiet.
    pub fn new<C>(delay: Duration, callback: C) -> Self
    where
        C: FnMut(T) + Send + 'static,
    {
        Self {
            delay,
            callback: Arc::new(Mutex::new(Box::new(callback))),
            pending: Mutex::new(None),
        }
    }

    /// Schedule the callback with `value`, superseding any pending
    /// delivery.
    pub fn call(&self, value: T) {
        let mut pending = self.pending.lock();
        if let Some(handle) = pending.take() {
            handle.abort();
        }

        let callback = Arc::clone(&self.callback);
        let delay = self.delay;
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut callback = callback.lock();
            (*callback)(value);
        }));
    }

    /// Discard the pending delivery, if any.
    pub fn cancel(&self) {
        if let Some(handle) = self.pending.lock().take() {
            handle.abort();
        }
    }

    /// True while a delivery is scheduled but has not fired.
    pub fn is_pending(&self) -> bool {
        self.pending.lock().as_ref().is_some_and(|handle| !handle.is_finished())
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.lock().take() {
            handle.abort();
        }
    }
}
