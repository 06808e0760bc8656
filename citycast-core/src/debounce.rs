use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use tokio::{
    sync::mpsc::UnboundedSender,
    time::{Instant, sleep_until},
};

/// Delivers only the last value of a burst, once calls have been quiet for `delay`.
///
/// Each [`Debouncer::call`] supersedes the previous pending value. Delivery
/// happens on the channel handed to [`Debouncer::new`].
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    latest: Arc<AtomicU64>,
    tx: UnboundedSender<T>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new(delay: Duration, tx: UnboundedSender<T>) -> Self {
        Self {
            delay,
            latest: Arc::new(AtomicU64::new(0)),
            tx,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule `value`, replacing whatever was pending.
    pub fn call(&self, value: T) {
        let ticket = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        let deadline = Instant::now() + self.delay;
        let latest = Arc::clone(&self.latest);
        let tx = self.tx.clone();

        tokio::spawn(async move {
            sleep_until(deadline).await;
            if latest.load(Ordering::SeqCst) == ticket {
                // Receiver gone means the owner shut down.
                let _ = tx.send(value);
            }
        });
    }

    /// Drop the pending value, if any.
    pub fn cancel(&self) {
        self.latest.fetch_add(1, Ordering::SeqCst);
    }
}
