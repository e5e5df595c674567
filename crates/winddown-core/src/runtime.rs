//! Repeating tick task bound to a [`BreakTimer`].
//!
//! A [`Session`] owns the timer behind a mutex and a tokio task that calls
//! `update()` once per tick period. Stopping or dropping the session aborts
//! the task.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::error::ValidationError;
use crate::events::Event;
use crate::host::EditorHost;
use crate::timer::{BreakTimer, WinddownConfig};

pub struct Session<H, C = SystemClock> {
    timer: Arc<Mutex<BreakTimer<H, C>>>,
    /// Feeds period changes to the running task.
    period_tx: Option<watch::Sender<Duration>>,
    task: Option<JoinHandle<()>>,
}

impl<H, C> Session<H, C> {
    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    fn abort_task(&mut self) {
        self.period_tx = None;
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl<H, C> Session<H, C>
where
    H: EditorHost + Send + 'static,
    C: Clock + Send + 'static,
{
    pub fn new(timer: BreakTimer<H, C>) -> Self {
        Self {
            timer: Arc::new(Mutex::new(timer)),
            period_tx: None,
            task: None,
        }
    }

    /// Start ticking and clear anything left over from a previous run.
    ///
    /// Starting a running session restarts it; there is never more than one
    /// tick task per session.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn start(&mut self) -> Event {
        if self.is_running() {
            warn!("session already running, restarting tick task");
            self.abort_task();
        }

        let mut timer = lock(&self.timer);
        let period = timer.config().tick_period();
        let (period_tx, period_rx) = watch::channel(period);
        self.task = Some(tokio::spawn(run_ticks(Arc::clone(&self.timer), period_rx)));
        self.period_tx = Some(period_tx);
        timer.reset();

        let tick_period_ms = period.as_millis() as u64;
        info!(tick_period_ms, "break timer session started");
        Event::SessionStarted {
            tick_period_ms,
            at: timer.clock().now(),
        }
    }

    /// Clear the wind-down and stop ticking.
    pub fn stop(&mut self) -> Event {
        let at = {
            let mut timer = lock(&self.timer);
            timer.reset();
            timer.clock().now()
        };
        self.abort_task();
        info!("break timer session stopped");
        Event::SessionStopped { at }
    }

    /// Replace the configuration, tick once, and re-arm the task if the
    /// tick period changed.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the configuration is rejected; the
    /// session keeps its previous configuration.
    pub fn configure(&self, config: WinddownConfig) -> Result<Vec<Event>, ValidationError> {
        let period = config.tick_period();
        let events = lock(&self.timer).configure(config)?;
        if let Some(tx) = &self.period_tx {
            tx.send_if_modified(|current| {
                if *current == period {
                    return false;
                }
                *current = period;
                true
            });
        }
        Ok(events)
    }

    pub fn postpone(&self) -> Event {
        lock(&self.timer).postpone()
    }

    pub fn log_activity(&self) -> Event {
        lock(&self.timer).log_activity()
    }

    /// Tick now, outside the regular cadence.
    pub fn update(&self) -> Option<Event> {
        lock(&self.timer).update()
    }

    pub fn snapshot(&self) -> Event {
        lock(&self.timer).snapshot()
    }

    /// Run `f` with exclusive access to the timer.
    pub fn with_timer<R>(&self, f: impl FnOnce(&mut BreakTimer<H, C>) -> R) -> R {
        f(&mut lock(&self.timer))
    }
}

impl<H, C> Drop for Session<H, C> {
    fn drop(&mut self) {
        self.abort_task();
    }
}

async fn run_ticks<H: EditorHost, C: Clock>(
    timer: Arc<Mutex<BreakTimer<H, C>>>,
    mut period_rx: watch::Receiver<Duration>,
) {
    let mut ticks = ticker(*period_rx.borrow_and_update());
    loop {
        tokio::select! {
            _ = ticks.tick() => {
                let event = lock(&timer).update();
                if let Some(event) = event {
                    debug!(?event, "tick");
                }
            }
            changed = period_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let period = *period_rx.borrow_and_update();
                debug!(period_ms = period.as_millis() as u64, "tick period changed");
                ticks = ticker(period);
            }
        }
    }
}

/// First tick one full period from now.
fn ticker(period: Duration) -> Interval {
    let mut ticks = interval_at(Instant::now() + period, period);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ticks
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
