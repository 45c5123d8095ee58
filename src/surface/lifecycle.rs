use crate::errors::SurfaceError;
use crate::render::backend::{FramebufferHandle, SurfaceBackend};

/// Lifecycle of a surface. Moves forward only: a surface is started once and never restarted.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Created, no backend yet
    #[default]
    Unstarted,
    /// Backend constructed, frames are being driven
    Started,
    /// Host detached the control; backend collapsed to zero size
    Unloaded,
}

impl LifecycleState {
    pub fn is_started(&self) -> bool {
        matches!(self, LifecycleState::Started)
    }

    /// Fails unless the surface can still be started.
    pub(crate) fn check_can_start(&self) -> Result<(), SurfaceError> {
        match self {
            LifecycleState::Unstarted => Ok(()),
            LifecycleState::Started => Err(SurfaceError::AlreadyStarted),
            LifecycleState::Unloaded => Err(SurfaceError::Unloaded),
        }
    }
}

/// Backend owned by a surface, if any.
#[derive(Default)]
pub(crate) enum BackendSlot {
    #[default]
    NoBackend,
    Backend(Box<dyn SurfaceBackend>),
}

impl BackendSlot {
    pub fn handle(&self) -> FramebufferHandle {
        match self {
            BackendSlot::NoBackend => FramebufferHandle::NONE,
            BackendSlot::Backend(b) => b.handle(),
        }
    }

    pub fn width(&self) -> u32 {
        match self {
            BackendSlot::NoBackend => 0,
            BackendSlot::Backend(b) => b.width(),
        }
    }

    pub fn height(&self) -> u32 {
        match self {
            BackendSlot::NoBackend => 0,
            BackendSlot::Backend(b) => b.height(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            BackendSlot::NoBackend => "none",
            BackendSlot::Backend(b) => b.name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::backends::null::NullBackend;

    #[test]
    fn only_unstarted_can_start() {
        assert!(LifecycleState::Unstarted.check_can_start().is_ok());
        assert!(matches!(
            LifecycleState::Started.check_can_start(),
            Err(SurfaceError::AlreadyStarted)
        ));
        assert!(matches!(
            LifecycleState::Unloaded.check_can_start(),
            Err(SurfaceError::Unloaded)
        ));
    }

    #[test]
    fn empty_slot_reads_as_zero() {
        let slot = BackendSlot::default();
        assert!(slot.handle().is_none());
        assert_eq!((slot.width(), slot.height()), (0, 0));
        assert_eq!(slot.name(), "none");
    }

    #[test]
    fn filled_slot_reads_through() {
        let slot = BackendSlot::Backend(Box::new(NullBackend::new().unwrap()));
        assert_eq!(slot.name(), "NullBackend");
        assert!(!slot.handle().is_none());
        assert_eq!((slot.width(), slot.height()), (0, 0));
    }
}
