//! Elapsed-time tracker for a running session

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, interval_at};

const TICK: Duration = Duration::from_secs(1);

/// Counts whole seconds on a one-second tick until stopped or dropped
pub struct ElapsedTimer {
    pub(super) seconds: Arc<AtomicU64>,
    handle: Option<JoinHandle<()>>,
}

impl ElapsedTimer {
    /// Start ticking. Must be called from within a tokio runtime.
    pub fn start() -> Self {
        let seconds = Arc::new(AtomicU64::new(0));
        let counter = seconds.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + TICK, TICK);
            loop {
                ticker.tick().await;
                counter.fetch_add(1, Ordering::Relaxed);
            }
        });

        Self {
            seconds,
            handle: Some(handle),
        }
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.seconds.load(Ordering::Relaxed)
    }

    /// Cancel the tick and return the final count
    pub fn stop(&mut self) -> u64 {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
        self.elapsed_secs()
    }
}

impl Drop for ElapsedTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Format seconds as `m:ss`; minutes are not capped at 59
pub fn format_time(total_secs: u64) -> String {
    format!("{}:{:02}", total_secs / 60, total_secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0), "0:00");
        assert_eq!(format_time(5), "0:05");
        assert_eq!(format_time(59), "0:59");
        assert_eq!(format_time(60), "1:00");
        assert_eq!(format_time(3661), "61:01");
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_counts_seconds() {
        let timer = ElapsedTimer::start();
        assert_eq!(timer.elapsed_secs(), 0);

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(timer.elapsed_secs(), 0);

        tokio::time::sleep(Duration::from_millis(3000)).await;
        assert_eq!(timer.elapsed_secs(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_stops() {
        let mut timer = ElapsedTimer::start();
        tokio::time::sleep(Duration::from_millis(2500)).await;

        let final_secs = timer.stop();
        assert_eq!(final_secs, 2);
        assert!(timer.handle.is_none());

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(timer.elapsed_secs(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_drop_cancels_task() {
        let timer = ElapsedTimer::start();
        let counter = timer.seconds.clone();
        tokio::time::sleep(Duration::from_millis(1500)).await;
        drop(timer);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(counter.load(Ordering::Relaxed), 1);
    }
}
