use std::time::Duration;

use tokio::time::Instant;

/// Pure debouncer: one resettable deadline, no business logic.
///
/// Every `touch` pushes the deadline out to `now + delay`, so only the
/// last touch of a burst ever becomes ready.
#[derive(Debug)]
pub(super) struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub(super) fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Record activity, restarting the quiet period.
    pub(super) fn touch(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub(super) fn cancel(&mut self) {
        self.deadline = None;
    }

    pub(super) fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub(super) fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Fire if the quiet period has elapsed. Fires at most once per burst.
    pub(super) fn take_if_ready(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(500);

    #[tokio::test]
    async fn test_fires_once_after_quiet_period() {
        let t0 = Instant::now();
        let mut debouncer = Debouncer::new(DELAY);
        assert!(!debouncer.take_if_ready(t0 + DELAY));

        debouncer.touch(t0);
        assert!(!debouncer.take_if_ready(t0 + DELAY / 2));
        assert!(debouncer.take_if_ready(t0 + DELAY));
        assert!(!debouncer.take_if_ready(t0 + DELAY * 2));
    }

    #[tokio::test]
    async fn test_touch_restarts_window() {
        let t0 = Instant::now();
        let mut debouncer = Debouncer::new(DELAY);

        debouncer.touch(t0);
        debouncer.touch(t0 + Duration::from_millis(400));
        assert!(!debouncer.take_if_ready(t0 + DELAY));
        assert_eq!(
            debouncer.deadline(),
            Some(t0 + Duration::from_millis(900))
        );
    }

    #[tokio::test]
    async fn test_cancel() {
        let t0 = Instant::now();
        let mut debouncer = Debouncer::new(DELAY);

        debouncer.touch(t0);
        assert!(debouncer.is_pending());
        debouncer.cancel();
        assert!(!debouncer.is_pending());
        assert!(!debouncer.take_if_ready(t0 + DELAY * 2));
    }
}
