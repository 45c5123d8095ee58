//! Surface driving: lifecycle, frame pacing, and backend size negotiation.

use std::fmt::Display;
use uuid::Uuid;

mod driver;
mod lifecycle;
mod negotiator;
mod timer;

#[cfg(test)]
pub(crate) mod test_support;

pub use driver::{FrameContext, PaintOutcome, SurfaceDriver};
pub use lifecycle::LifecycleState;
pub use negotiator::{Negotiation, SurfaceNegotiator};
pub use timer::{Clock, ManualClock, SystemClock};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(Uuid);

impl SurfaceId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SurfaceId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for SurfaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
