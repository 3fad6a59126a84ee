//! Debounce gate for rapidly-changing inputs.
//!
//! The search box feeds raw keystrokes in here; the catalog controller only
//! ever sees values that survived a full quiescent period. Each update
//! cancels the previously scheduled emission, so exactly one settled value
//! comes out per burst no matter how many updates went in.

use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;

pub struct DebounceGate<T> {
    delay: Duration,
    out: UnboundedSender<T>,
    pending: Option<CancellationToken>,
}

impl<T: Send + 'static> DebounceGate<T> {
    /// Create a gate and the channel its settled values arrive on.
    pub fn channel(delay: Duration) -> (Self, UnboundedReceiver<T>) {
        let (out, settled) = mpsc::unbounded_channel();
        (
            Self {
                delay,
                out,
                pending: None,
            },
            settled,
        )
    }

    /// Record the latest raw value and restart the settling timer.
    pub fn update(&mut self, value: T) {
        if let Some(pending) = self.pending.take() {
            pending.cancel();
        }
        let cancel = CancellationToken::new();
        self.pending = Some(cancel.clone());

        // The deadline is fixed here, not when the task first runs, so the
        // quiescent period is measured from the update itself.
        let deadline = Instant::now() + self.delay;
        let out = self.out.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = sleep_until(deadline) => {
                    // Receiver gone means the view unmounted; nothing to do.
                    let _ = out.send(value);
                }
            }
        });
    }

    /// Drop any pending emission without emitting.
    pub fn cancel(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.cancel();
        }
    }
}
