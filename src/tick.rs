use std::time::Duration;

/// Identity of a host frame, as reported by the host frame clock.
///
/// Stamps are monotonically non-decreasing. The host may deliver the same stamp several times
/// for a single logical frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FrameStamp(Duration);

impl FrameStamp {
    pub fn new(since_clock_start: Duration) -> Self {
        Self(since_clock_start)
    }

    pub fn from_millis(ms: u64) -> Self {
        Self(Duration::from_millis(ms))
    }

    pub fn as_duration(&self) -> Duration {
        self.0
    }
}

impl From<Duration> for FrameStamp {
    fn from(d: Duration) -> Self {
        Self(d)
    }
}

/// What a single frame-clock tick resulted in.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Tick arrived while the frame clock should not be driving this surface
    #[default]
    Ignored,
    /// Same (or an older) frame as the last recorded one
    Duplicate,
    /// New frame recorded, no redraw since the surface is not rendering continuously
    Recorded,
    /// New frame recorded and a redraw has been requested from the host
    RedrawRequested,
}

impl TickOutcome {
    pub fn needs_redraw(&self) -> bool {
        matches!(self, TickOutcome::RedrawRequested)
    }
}

/// Suppresses repeated frame-clock callbacks for the same host frame.
#[derive(Debug, Default, Clone)]
pub struct FrameGate {
    last: Option<FrameStamp>,
}

impl FrameGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when `stamp` belongs to a frame that has not been seen yet, and records it.
    /// Stamps that are equal to or older than the last recorded one are rejected.
    pub fn admit(&mut self, stamp: FrameStamp) -> bool {
        if let Some(last) = self.last {
            if stamp <= last {
                return false;
            }
        }
        self.last = Some(stamp);
        true
    }

    /// Last recorded stamp
    pub fn last(&self) -> Option<FrameStamp> {
        self.last
    }
}
