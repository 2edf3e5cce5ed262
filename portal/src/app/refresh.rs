//! Periodic background refresh.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

type Tick = Arc<dyn Fn() -> std::pin::Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

/// Runs a refresh job every `period` until stopped or dropped.
///
/// The first run happens one period after `start`; callers load eagerly
/// themselves. Ticks missed while a job is still running are skipped rather
/// than queued.
pub struct RefreshTimer {
    period: Duration,
    tick: Tick,
    handle: Option<JoinHandle<()>>,
}

impl RefreshTimer {
    pub fn start<F, Fut>(period: Duration, job: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let tick: Tick = Arc::new(move || Box::pin(job()));
        let mut timer = Self {
            period,
            tick,
            handle: None,
        };
        timer.spawn();
        timer
    }

    fn spawn(&mut self) {
        let period = self.period;
        let tick = Arc::clone(&self.tick);
        self.handle = Some(tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                tracing::trace!(period_ms = period.as_millis() as u64, "Refresh tick");
                tick().await;
            }
        }));
    }

    /// Start over with a fresh period, e.g. after the inputs changed.
    pub fn restart(&mut self) {
        self.stop();
        self.spawn();
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().map_or(false, |h| !h.is_finished())
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}

impl Drop for RefreshTimer {
    fn drop(&mut self) {
        self.stop();
    }
}
