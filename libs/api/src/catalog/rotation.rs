use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

/// Process-wide tick counter behind the "featured" rotation. A single
/// background task advances it on a fixed period; changing the category
/// filter changes which item the count selects but never the cadence.
#[derive(Debug)]
pub struct RotationClock {
    ticks: Arc<AtomicU64>,
    handle: JoinHandle<()>,
}

impl RotationClock {
    pub fn start(period: Duration) -> Self {
        let ticks = Arc::new(AtomicU64::new(0));
        let counter = ticks.clone();

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // the first tick of an interval completes immediately
            interval.tick().await;
            loop {
                interval.tick().await;
                counter.fetch_add(1, Ordering::Relaxed);
            }
        });

        Self { ticks, handle }
    }

    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }
}

impl Drop for RotationClock {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_clock_advances_once_per_period() {
        // Arrange
        let clock = RotationClock::start(Duration::from_millis(7000));
        assert_eq!(clock.ticks(), 0);

        // Act: paused time auto-advances through three periods
        tokio::time::sleep(Duration::from_millis(21_500)).await;

        // Assert
        assert_eq!(clock.ticks(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_the_clock_aborts_its_task() {
        // Arrange
        let clock = RotationClock::start(Duration::from_millis(7000));
        let handle = clock.handle.abort_handle();

        // Act
        drop(clock);
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }

        // Assert
        assert!(handle.is_finished());
    }
}
