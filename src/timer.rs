use std::pin::Pin;
use std::time::Duration;

use tokio::time::{Instant, Sleep, sleep};

/// The rotation's only timer. Arming always replaces the pending deadline,
/// so there is never more than one tick outstanding.
#[derive(Debug)]
pub struct TickTimer {
    sleep: Pin<Box<Sleep>>,
    interval: Duration,
    armed: bool,
}

impl TickTimer {
    /// A disarmed timer. Must be created inside a tokio runtime.
    pub fn new() -> Self {
        Self {
            sleep: Box::pin(sleep(Duration::ZERO)),
            interval: Duration::ZERO,
            armed: false,
        }
    }

    /// Cancel whatever is pending and fire `interval` from now, then every `interval`.
    pub fn arm(&mut self, interval: Duration) {
        self.interval = interval;
        self.sleep.as_mut().reset(Instant::now() + interval);
        self.armed = true;
    }

    pub fn cancel(&mut self) {
        self.armed = false;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Resolve at the next deadline and re-arm for the following one.
    /// Never resolves while disarmed. Cancel-safe.
    pub async fn fired(&mut self) {
        if !self.armed {
            std::future::pending::<()>().await;
        }
        self.sleep.as_mut().await;
        self.sleep.as_mut().reset(Instant::now() + self.interval);
    }
}

impl Default for TickTimer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::timeout;

    #[tokio::test(start_paused = true)]
    async fn fires_repeatedly_at_interval() {
        let mut timer = TickTimer::new();
        timer.arm(Duration::from_millis(1000));
        let start = Instant::now();
        timer.fired().await;
        assert_eq!(start.elapsed(), Duration::from_millis(1000));
        timer.fired().await;
        assert_eq!(start.elapsed(), Duration::from_millis(2000));
    }

    #[tokio::test(start_paused = true)]
    async fn rearming_replaces_pending_deadline() {
        let mut timer = TickTimer::new();
        timer.arm(Duration::from_millis(5000));
        tokio::time::advance(Duration::from_millis(4000)).await;
        timer.arm(Duration::from_millis(2000));
        let start = Instant::now();
        timer.fired().await;
        assert_eq!(start.elapsed(), Duration::from_millis(2000));
    }

    #[tokio::test(start_paused = true)]
    async fn disarmed_timer_never_fires() {
        let mut timer = TickTimer::new();
        assert!(
            timeout(Duration::from_secs(60), timer.fired())
                .await
                .is_err()
        );
        timer.arm(Duration::from_millis(1000));
        timer.cancel();
        assert!(!timer.is_armed());
        assert!(
            timeout(Duration::from_secs(60), timer.fired())
                .await
                .is_err()
        );
    }
}
