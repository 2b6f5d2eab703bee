use std::ops::ControlFlow;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Periodic tick task owned by a quiz session.
///
/// The first tick fires one `period` after spawning. The callback returns
/// `ControlFlow::Break` to end the task. Dropping the handle stops it.
pub(crate) struct Countdown {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl Countdown {
    pub(crate) fn spawn<F>(period: Duration, mut on_tick: F) -> Self
    where
        F: FnMut() -> ControlFlow<()> + Send + 'static,
    {
        let (shutdown, mut shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        if on_tick().is_break() {
                            break;
                        }
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }
        });
        Self { shutdown, handle }
    }

    pub(crate) fn stop(&self) {
        let _ = self.shutdown.send(true);
    }

    #[cfg(test)]
    pub(crate) fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.stop();
        self.handle.abort();
    }
}
