use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, interval_at};

pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Returned by a `drive` callback to keep or stop the ticker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickFlow {
    Continue,
    Stop,
}

/// Repeating one-second tick source backed by a tokio task.
///
/// Ticks arrive numbered from 1. Stopping or dropping the ticker aborts the
/// task, so no periodic work outlives the attempt that owns it.
pub struct CountdownTicker {
    rx: mpsc::Receiver<u64>,
    handle: Option<JoinHandle<()>>,
}

impl CountdownTicker {
    /// Start ticking every second. Must be called inside a tokio runtime.
    #[must_use]
    pub fn start() -> Self {
        Self::with_interval(TICK_INTERVAL)
    }

    #[must_use]
    pub fn with_interval(period: Duration) -> Self {
        let (tx, rx) = mpsc::channel(8);
        let handle = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            let mut seq = 0_u64;
            loop {
                interval.tick().await;
                seq += 1;
                if tx.send(seq).await.is_err() {
                    break;
                }
            }
        });
        tracing::debug!(?period, "countdown ticker started");
        Self {
            rx,
            handle: Some(handle),
        }
    }

    /// Wait for the next tick. `None` once stopped.
    pub async fn next_tick(&mut self) -> Option<u64> {
        if self.handle.is_none() {
            return None;
        }
        self.rx.recv().await
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            self.rx.close();
            tracing::debug!("countdown ticker stopped");
        }
    }

    /// Feed ticks to `on_tick` until it returns [`TickFlow::Stop`], then stop.
    pub async fn drive(mut self, mut on_tick: impl FnMut() -> TickFlow) {
        while self.next_tick().await.is_some() {
            if on_tick() == TickFlow::Stop {
                break;
            }
        }
        self.stop();
    }
}

impl Drop for CountdownTicker {
    fn drop(&mut self) {
        self.stop();
    }
}
