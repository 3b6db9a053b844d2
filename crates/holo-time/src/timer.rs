//! Single-shot phase timer
//!
//! One pending deadline at most. Rescheduling or cancelling invalidates the
//! previous token, so a stale expiry can never be delivered into a phase it
//! was not scheduled for.

use std::time::Duration;

use holo_core::SceneTime;

/// Identifies one scheduled expiry
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerToken(u64);

impl TimerToken {
    #[inline]
    pub fn generation(self) -> u64 {
        self.0
    }
}

/// An expiry that has come due
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimerExpiry {
    pub token: TimerToken,
    /// When it was due (not when it was observed)
    pub deadline: SceneTime,
}

#[derive(Clone, Copy, Debug)]
struct Pending {
    token: TimerToken,
    deadline: SceneTime,
}

/// Cancellable single-shot timer
#[derive(Debug, Default)]
pub struct PhaseTimer {
    generation: u64,
    pending: Option<Pending>,
}

impl PhaseTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule an expiry at `deadline`, replacing any pending one
    pub fn schedule_at(&mut self, deadline: SceneTime) -> TimerToken {
        self.generation += 1;
        let token = TimerToken(self.generation);
        self.pending = Some(Pending { token, deadline });
        token
    }

    /// Schedule an expiry `after` from `now`
    pub fn schedule(&mut self, now: SceneTime, after: Duration) -> TimerToken {
        self.schedule_at(now + after)
    }

    /// Cancel the pending expiry (if any)
    pub fn cancel(&mut self) -> Option<TimerToken> {
        self.pending.take().map(|p| p.token)
    }

    /// Take the pending expiry if it is due at `now`
    pub fn poll(&mut self, now: SceneTime) -> Option<TimerExpiry> {
        match self.pending {
            Some(p) if p.deadline <= now => {
                self.pending = None;
                Some(TimerExpiry {
                    token: p.token,
                    deadline: p.deadline,
                })
            }
            _ => None,
        }
    }

    /// Is `token` the one currently pending?
    pub fn is_current(&self, token: TimerToken) -> bool {
        self.pending.is_some_and(|p| p.token == token)
    }

    pub fn deadline(&self) -> Option<SceneTime> {
        self.pending.map(|p| p.deadline)
    }

    /// Token and deadline of the pending expiry
    pub fn pending(&self) -> Option<(TimerToken, SceneTime)> {
        self.pending.map(|p| (p.token, p.deadline))
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_fires_once() {
        let mut timer = PhaseTimer::new();
        let token = timer.schedule(SceneTime::ZERO, Duration::from_secs(1));

        assert!(timer.poll(SceneTime::from_millis(999)).is_none());

        let expiry = timer.poll(SceneTime::from_millis(1000)).unwrap();
        assert_eq!(expiry.token, token);
        assert_eq!(expiry.deadline, SceneTime::from_millis(1000));

        assert!(timer.poll(SceneTime::from_millis(5000)).is_none());
    }

    #[test]
    fn test_reschedule_invalidates_previous() {
        let mut timer = PhaseTimer::new();
        let first = timer.schedule(SceneTime::ZERO, Duration::from_secs(3));
        let second = timer.schedule(SceneTime::ZERO, Duration::from_secs(1));

        assert_ne!(first, second);
        assert!(!timer.is_current(first));
        assert!(timer.is_current(second));

        let expiry = timer.poll(SceneTime::from_millis(1000)).unwrap();
        assert_eq!(expiry.token, second);
    }

    #[test]
    fn test_cancel() {
        let mut timer = PhaseTimer::new();
        let token = timer.schedule(SceneTime::ZERO, Duration::from_millis(100));

        assert_eq!(timer.cancel(), Some(token));
        assert!(!timer.is_pending());
        assert!(timer.poll(SceneTime::from_millis(200)).is_none());
    }

    #[test]
    fn test_late_poll_reports_deadline() {
        let mut timer = PhaseTimer::new();
        timer.schedule(SceneTime::from_millis(10), Duration::from_millis(100));

        let expiry = timer.poll(SceneTime::from_millis(500)).unwrap();
        assert_eq!(expiry.deadline, SceneTime::from_millis(110));
    }

    proptest::proptest! {
        #[test]
        fn test_never_fires_early(
            delay_ms in 0u64..10_000,
            polls in proptest::collection::vec(0u64..20_000, 1..50),
        ) {
            let mut timer = PhaseTimer::new();
            timer.schedule(SceneTime::ZERO, Duration::from_millis(delay_ms));
            let mut fired = 0;
            let mut polls = polls;
            polls.sort_unstable();
            for at in polls {
                if let Some(expiry) = timer.poll(SceneTime::from_millis(at)) {
                    proptest::prop_assert!(at >= delay_ms);
                    proptest::prop_assert_eq!(expiry.deadline, SceneTime::from_millis(delay_ms));
                    fired += 1;
                }
            }
            proptest::prop_assert!(fired <= 1);
        }
    }
}
