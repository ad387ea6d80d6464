//! Retransmit timer arithmetic.
//!
//! Every slot in the window carries the time of its last transmission.  A slot
//! has expired once strictly more than `timeout` has elapsed since then.  The
//! sender sleeps until the oldest slot's deadline, which lies one `tick` past
//! its expiry instant, so a timeout is seen no later than `timeout + tick`
//! after the send.

use std::time::Duration;

use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetransmitTimer {
    timeout: Duration,
    tick: Duration,
}

impl RetransmitTimer {
    pub fn new(timeout: Duration, tick: Duration) -> Self {
        Self { timeout, tick }
    }

    /// `true` when `now - sent_at > timeout`.
    pub fn expired(&self, sent_at: Instant, now: Instant) -> bool {
        now.saturating_duration_since(sent_at) > self.timeout
    }

    /// When to wake up to check a slot last sent at `sent_at`.
    pub fn deadline(&self, sent_at: Instant) -> Instant {
        sent_at + self.timeout + self.tick
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expiry_is_strict() {
        let timer = RetransmitTimer::new(Duration::from_secs(1), Duration::from_millis(10));
        let t0 = Instant::now();
        assert!(!timer.expired(t0, t0));
        assert!(!timer.expired(t0, t0 + Duration::from_secs(1)));
        assert!(timer.expired(t0, t0 + Duration::from_millis(1001)));
    }

    #[test]
    fn deadline_is_past_expiry_by_one_tick() {
        let timer = RetransmitTimer::new(Duration::from_secs(1), Duration::from_millis(10));
        let t0 = Instant::now();
        let deadline = timer.deadline(t0);
        assert_eq!(deadline - t0, Duration::from_millis(1010));
        assert!(timer.expired(t0, deadline));
    }

    #[test]
    fn send_in_the_future_never_expires() {
        let timer = RetransmitTimer::new(Duration::from_millis(5), Duration::from_millis(1));
        let t0 = Instant::now();
        assert!(!timer.expired(t0 + Duration::from_secs(1), t0));
    }
}
