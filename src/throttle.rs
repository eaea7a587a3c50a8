//! Fixed-window request throttle.
//!
//! Before every request, once `every` requests have gone out since the last
//! pause, execution sleeps for `pause`. The counter belongs to whoever created
//! the throttle, so state never leaks between runs.

use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct Throttle {
    every: u32,
    pause: Duration,
    sent: u32,
}

impl Throttle {
    /// Pause for `pause` after every `every` requests. `every == 0` disables throttling.
    pub fn new(every: u32, pause: Duration) -> Self {
        Self {
            every,
            pause,
            sent: 0,
        }
    }

    /// Wait if the current window is full, then count one request.
    ///
    /// Returns whether a pause happened.
    pub async fn acquire(&mut self) -> bool {
        let should_pause = self.every > 0 && self.sent > 0 && self.sent % self.every == 0;
        if should_pause {
            debug!("Throttling after {} requests for {:?}", self.sent, self.pause);
            sleep(self.pause).await;
        }
        self.sent += 1;
        should_pause
    }

    /// Requests counted so far
    pub fn sent(&self) -> u32 {
        self.sent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pauses_every_fifth_request() {
        let mut throttle = Throttle::new(5, Duration::from_millis(1));
        let mut pauses = Vec::new();
        for _ in 0..11 {
            pauses.push(throttle.acquire().await);
        }
        // Requests 6 and 11 wait
        let paused_at: Vec<_> = pauses
            .iter()
            .enumerate()
            .filter(|(_, paused)| **paused)
            .map(|(i, _)| i + 1)
            .collect();
        assert_eq!(paused_at, vec![6, 11]);
        assert_eq!(throttle.sent(), 11);
    }

    #[tokio::test]
    async fn test_disabled_throttle_never_pauses() {
        let mut throttle = Throttle::new(0, Duration::from_secs(10));
        for _ in 0..20 {
            assert!(!throttle.acquire().await);
        }
    }

    #[tokio::test]
    async fn test_pause_duration_is_observed() {
        let mut throttle = Throttle::new(1, Duration::from_millis(50));
        let start = std::time::Instant::now();
        throttle.acquire().await;
        throttle.acquire().await;
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[test]
    fn test_first_request_never_waits() {
        let mut throttle = Throttle::new(1, Duration::from_secs(60));
        let paused = tokio_test::block_on(throttle.acquire());
        assert!(!paused);
    }
}
