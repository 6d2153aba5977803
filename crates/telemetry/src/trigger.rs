//! Trigger - decides when a tick fires.
//!
//! Two disciplines:
//!
//! - `Trigger::Once`: fire on the first change event, then never again.
//! - `Trigger::Debounce`: fire immediately on a change, then ignore changes
//!   until the window lapses. In `fixed` mode the window is counted from the
//!   last fire; in `rolling` mode every ignored change restarts it. No
//!   trailing tick is emitted for ignored changes.
//!
//! `subscribe` runs the discipline in a background task and returns a
//! `Subscription`. Closing it is synchronous: once `close` returns, no tick
//! callback is running and none will start.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use datapost_config::{DebounceMode, UploadConfig};
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// Source of change events.
#[async_trait]
pub trait ChangeStream: Send + 'static {
    /// Wait for the next change. `None` ends the stream.
    async fn next_change(&mut self) -> Option<Value>;
}

#[async_trait]
impl ChangeStream for mpsc::Receiver<Value> {
    async fn next_change(&mut self) -> Option<Value> {
        self.recv().await
    }
}

#[async_trait]
impl ChangeStream for mpsc::UnboundedReceiver<Value> {
    async fn next_change(&mut self) -> Option<Value> {
        self.recv().await
    }
}

/// When to run a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Fire once, on the first change
    Once,
    /// Fire on change, at most once per window
    Debounce { window: Duration, mode: DebounceMode },
}

impl Trigger {
    /// Fixed-window debounce
    pub fn debounce(window: Duration) -> Self {
        Self::Debounce {
            window,
            mode: DebounceMode::Fixed,
        }
    }

    /// Trigger for an upload section: debounce when a positive interval is
    /// configured, otherwise one-shot.
    pub fn from_config(upload: &UploadConfig) -> Self {
        match upload.interval() {
            Some(window) => Self::Debounce {
                window,
                mode: upload.debounce,
            },
            None => Self::Once,
        }
    }
}

/// Debounce-immediate gate.
#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    mode: DebounceMode,
    quiet: Quiet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quiet {
    Open,
    Until(Instant),
    /// The window reaches past what `Instant` can represent
    Forever,
}

impl Debouncer {
    pub fn new(window: Duration, mode: DebounceMode) -> Self {
        Self {
            window,
            mode,
            quiet: Quiet::Open,
        }
    }

    /// Whether a change at `now` fires a tick.
    pub fn admit(&mut self, now: Instant) -> bool {
        let suppressed = match self.quiet {
            Quiet::Open => false,
            Quiet::Until(quiet_at) => now < quiet_at,
            Quiet::Forever => true,
        };
        if suppressed && self.mode == DebounceMode::Fixed {
            return false;
        }
        self.quiet = now
            .checked_add(self.window)
            .map_or(Quiet::Forever, Quiet::Until);
        !suppressed
    }
}

/// Live subscription of a tick callback to a change stream.
///
/// Closed explicitly with `close` or implicitly on drop.
#[derive(Debug)]
pub struct Subscription {
    open: Arc<Mutex<bool>>,
    cancel: CancellationToken,
}

impl Subscription {
    /// Detach from the change stream.
    ///
    /// Waits for a tick callback that is already running, so no callback
    /// runs after this returns. Returns `true` only for the call that
    /// actually closed the subscription.
    pub fn close(&self) -> bool {
        let was_open = std::mem::replace(&mut *self.open.lock(), false);
        self.cancel.cancel();
        was_open
    }

    /// Whether `close` has been called
    pub fn is_closed(&self) -> bool {
        !*self.open.lock()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.close();
    }
}

/// Run `on_tick` for every change `trigger` lets through.
///
/// Ticks are serialized: the callback for one change returns before the
/// next change is considered. Must be called from within a tokio runtime.
pub fn subscribe<S, F>(trigger: Trigger, mut stream: S, mut on_tick: F) -> Subscription
where
    S: ChangeStream,
    F: FnMut(Value) + Send + 'static,
{
    let open = Arc::new(Mutex::new(true));
    let cancel = CancellationToken::new();

    let gate = Arc::clone(&open);
    let token = cancel.clone();

    tokio::spawn(async move {
        let mut debouncer = match trigger {
            Trigger::Once => None,
            Trigger::Debounce { window, mode } => Some(Debouncer::new(window, mode)),
        };

        loop {
            let value = tokio::select! {
                biased;
                _ = token.cancelled() => break,
                next = stream.next_change() => match next {
                    Some(value) => value,
                    None => {
                        trace!("change stream ended");
                        break;
                    }
                },
            };

            let fire = match debouncer.as_mut() {
                Some(debouncer) => debouncer.admit(Instant::now()),
                None => true,
            };
            if !fire {
                trace!("change inside debounce window, ignored");
                continue;
            }

            {
                let open = gate.lock();
                if !*open {
                    break;
                }
                on_tick(value);
            }

            if debouncer.is_none() {
                trace!("one-shot trigger fired");
                break;
            }
        }
    });

    Subscription { open, cancel }
}

#[cfg(test)]
#[path = "trigger_test.rs"]
mod trigger_test;
