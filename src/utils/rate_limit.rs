//! Global sliding-window rate limiter shared by every registry worker.

use log::debug;
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Caps the number of recorded calls within any trailing window, counted
/// globally across all concurrent workers.
///
/// `acquire` prunes timestamps that have left the window, sleeps until the
/// oldest retained call expires when the cap is reached, then records the
/// call. The whole sequence runs under one lock, so workers serialize through
/// it and the cap holds no matter how many tasks are in flight.
pub struct SlidingWindowLimiter {
    max_calls: usize,
    period: Duration,
    calls: Mutex<VecDeque<Instant>>,
}

impl SlidingWindowLimiter {
    pub fn new(max_calls: usize, period: Duration) -> Self {
        Self {
            max_calls,
            period,
            calls: Mutex::new(VecDeque::new()),
        }
    }

    /// Block until a call slot is available, then record the call.
    pub async fn acquire(&self) {
        // The guard is held across the sleep: prune, check, sleep and append
        // form a single critical section.
        let mut calls = self.calls.lock().await;

        let now = Instant::now();
        Self::prune(&mut calls, now, self.period);

        if calls.len() >= self.max_calls {
            if let Some(oldest) = calls.front().copied() {
                let elapsed = now.duration_since(oldest);
                let wait = self.period.saturating_sub(elapsed);
                if !wait.is_zero() {
                    debug!(
                        "Rate limit reached ({} calls / {:?}), sleeping {:?}",
                        self.max_calls, self.period, wait
                    );
                    tokio::time::sleep(wait).await;
                }
                Self::prune(&mut calls, Instant::now(), self.period);
            }
        }

        calls.push_back(Instant::now());
    }

    fn prune(calls: &mut VecDeque<Instant>, now: Instant, period: Duration) {
        while calls
            .front()
            .map_or(false, |t| now.duration_since(*t) >= period)
        {
            calls.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_first_calls_are_immediate() {
        let limiter = SlidingWindowLimiter::new(3, Duration::from_secs(1));

        let start = Instant::now();
        limiter.acquire().await;
        limiter.acquire().await;
        limiter.acquire().await;

        // Under the cap, nothing should block
        assert!(
            start.elapsed().as_millis() < 100,
            "first {} calls should be immediate, took {:?}",
            3,
            start.elapsed()
        );
    }

    #[tokio::test]
    async fn test_cap_forces_wait() {
        let limiter = SlidingWindowLimiter::new(2, Duration::from_millis(300));

        let start = Instant::now();
        limiter.acquire().await;
        limiter.acquire().await;
        limiter.acquire().await; // third call must wait for the window

        assert!(
            start.elapsed().as_millis() >= 250,
            "third call should wait out the window, took {:?}",
            start.elapsed()
        );
    }

    #[tokio::test]
    async fn test_window_holds_under_concurrent_callers() {
        let limiter = Arc::new(SlidingWindowLimiter::new(2, Duration::from_millis(200)));
        let acquired: Arc<Mutex<Vec<Instant>>> = Arc::new(Mutex::new(Vec::new()));

        let mut handles = Vec::new();
        for _ in 0..6 {
            let limiter = Arc::clone(&limiter);
            let acquired = Arc::clone(&acquired);
            handles.push(tokio::spawn(async move {
                limiter.acquire().await;
                acquired.lock().await.push(Instant::now());
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let mut times = acquired.lock().await.clone();
        times.sort();
        assert_eq!(times.len(), 6);

        // In any trailing 200ms window at most 2 calls were recorded: the
        // (i+2)-th acquisition must land roughly a full window after the i-th.
        for i in 0..times.len() - 2 {
            let gap = times[i + 2].duration_since(times[i]);
            assert!(
                gap.as_millis() >= 150,
                "calls {} and {} only {:?} apart",
                i,
                i + 2,
                gap
            );
        }
    }
}
