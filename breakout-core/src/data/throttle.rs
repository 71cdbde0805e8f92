//! Minimum spacing between outbound requests.

use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Blocks callers so that consecutive `wait()` returns are at least
/// `min_interval` apart.
#[derive(Debug)]
pub struct Throttle {
    min_interval: Duration,
    last: Mutex<Option<Instant>>,
}

impl Throttle {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last: Mutex::new(None),
        }
    }

    /// Sleep until the interval since the previous call has elapsed, then
    /// record now as the latest request time.
    pub fn wait(&self) {
        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.min_interval {
                std::thread::sleep(self.min_interval - elapsed);
            }
        }
        *last = Some(Instant::now());
    }
}
