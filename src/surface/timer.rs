use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Source of wall-clock time for frame pacing.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Clock backed by [`Instant::now`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock(Rc<Cell<Instant>>);

impl ManualClock {
    pub fn new() -> Self {
        Self(Rc::new(Cell::new(Instant::now())))
    }

    pub fn advance(&self, by: Duration) {
        self.0.set(self.0.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.0.get()
    }
}

/// Measures the time between presented frames.
pub(crate) struct FrameTimer {
    clock: Box<dyn Clock>,
    last: Option<Instant>,
}

impl FrameTimer {
    pub fn new(clock: Box<dyn Clock>) -> Self {
        Self { clock, last: None }
    }

    /// Start measuring from now.
    pub fn restart(&mut self) {
        self.last = Some(self.clock.now());
    }

    /// Time since the previous lap (or restart), then start a new lap.
    pub fn lap(&mut self) -> Duration {
        let now = self.clock.now();
        let elapsed = self
            .last
            .map(|last| now.saturating_duration_since(last))
            .unwrap_or_default();
        self.last = Some(now);
        elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lap_measures_between_calls() {
        let clock = ManualClock::new();
        let mut timer = FrameTimer::new(Box::new(clock.clone()));
        timer.restart();

        clock.advance(Duration::from_millis(16));
        assert_eq!(timer.lap(), Duration::from_millis(16));

        clock.advance(Duration::from_millis(5));
        clock.advance(Duration::from_millis(5));
        assert_eq!(timer.lap(), Duration::from_millis(10));
    }

    #[test]
    fn lap_without_restart_is_zero() {
        let clock = ManualClock::new();
        let mut timer = FrameTimer::new(Box::new(clock.clone()));
        clock.advance(Duration::from_secs(1));
        assert_eq!(timer.lap(), Duration::ZERO);
    }

    #[test]
    fn system_clock_moves_forward() {
        let clock = SystemClock;
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
