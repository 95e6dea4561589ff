//! Background thread driving a [`RefillScheduler`].
//!
//! The thread sleeps for the computed delay, fires, and re-arms itself with the
//! delay the fire returned. It runs for as long as the process does unless it
//! is explicitly shut down through its handle; dropping the handle detaches it.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use super::{RefillScheduler, RefillStats};

/// Name given to the refill thread.
pub const THREAD_NAME: &str = "trng-refill";

/// Handle to a running refill thread.
pub struct SchedulerHandle {
    stop: Arc<AtomicBool>,
    thread: JoinHandle<RefillScheduler>,
}

impl RefillScheduler {
    /// Moves the scheduler onto its own thread, first fire after [`initial_delay`].
    ///
    /// [`initial_delay`]: RefillScheduler::initial_delay
    pub fn spawn(self) -> io::Result<SchedulerHandle> {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);

        let thread = thread::Builder::new()
            .name(THREAD_NAME.into())
            .spawn(move || run(self, &flag))?;

        log::info!("Refill scheduler started");
        Ok(SchedulerHandle { stop, thread })
    }
}

impl SchedulerHandle {
    /// Stops the thread after its current fire and returns its final statistics.
    ///
    /// # Errors
    /// Returns the panic payload if the refill thread panicked.
    pub fn shutdown(self) -> thread::Result<RefillStats> {
        self.stop.store(true, Ordering::Release);
        self.thread.thread().unpark();
        let scheduler = self.thread.join()?;
        log::info!("Refill scheduler stopped");
        Ok(scheduler.stats())
    }

    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }
}

/// Scheduled -> Running -> Scheduled, until asked to stop.
fn run(mut scheduler: RefillScheduler, stop: &AtomicBool) -> RefillScheduler {
    let mut delay = scheduler.initial_delay();
    loop {
        if !sleep_for(delay, stop) {
            return scheduler;
        }
        delay = scheduler.on_fire();
    }
}

/// Parks for `delay`. Returns `false` if a stop was requested meanwhile.
///
/// Measures elapsed time instead of computing a deadline, so any `delay` is accepted.
fn sleep_for(delay: Duration, stop: &AtomicBool) -> bool {
    let start = Instant::now();
    loop {
        if stop.load(Ordering::Acquire) {
            return false;
        }
        let elapsed = start.elapsed();
        if elapsed >= delay {
            return true;
        }
        thread::park_timeout((delay - elapsed).max(Duration::from_micros(1)));
    }
}
