//! Host notifications delivered to a surface.
//!
//! The host UI framework translates its own callbacks into [`HostEvent`]s and hands them to
//! [`SurfaceDriver::handle_event`](crate::surface::SurfaceDriver::handle_event). Paint requests
//! are not events; they go through [`SurfaceDriver::paint`](crate::surface::SurfaceDriver::paint)
//! because they carry the host's drawing surface.
//!
//! # Main Types
//!
//! - [`HostEvent`]: visibility, frame clock, layout, lifecycle and keyboard notifications.
//! - [`SizeChange`]: old and new layout size of the control.
//! - [`KeyEvent`] / [`Modifiers`]: raw keyboard events for the rerouting shim.

use crate::render::Viewport;
use crate::tick::FrameStamp;
use bitflags::bitflags;
use std::fmt::Display;

bitflags! {
    pub struct Modifiers: u8 {
        const SHIFT   = 0b0001;
        const CONTROL = 0b0010;
        const ALT     = 0b0100;
        const META    = 0b1000;
    }
}

/// `Shift+Control`, or `None` when no modifier is held. Used in key rerouting logs.
impl Display for Modifiers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        const NAMES: [(Modifiers, &str); 4] = [
            (Modifiers::SHIFT, "Shift"),
            (Modifiers::CONTROL, "Control"),
            (Modifiers::ALT, "Alt"),
            (Modifiers::META, "Meta"),
        ];

        let mut held = NAMES.iter().filter(|(flag, _)| self.contains(*flag)).map(|(_, name)| *name);
        match held.next() {
            None => f.write_str("None"),
            Some(first) => {
                f.write_str(first)?;
                held.try_for_each(|name| write!(f, "+{}", name))
            }
        }
    }
}

/// Where a routed keyboard event originally came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventSource {
    /// The surface control itself raised the event
    ThisControl,
    /// Some other element in the host tree raised it
    Other,
}

/// A raw keyboard event as seen by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyEvent {
    pub key: String,
    pub code: String,
    pub modifiers: Modifiers,
    pub is_repeat: bool,
    pub source: EventSource,
}

/// Layout size change reported by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeChange {
    pub old: Viewport,
    pub new: Viewport,
    pub width_changed: bool,
    pub height_changed: bool,
}

impl SizeChange {
    /// Builds a change, deriving which dimensions moved from the two sizes.
    pub fn between(old: Viewport, new: Viewport) -> Self {
        Self {
            old,
            new,
            width_changed: old.width != new.width,
            height_changed: old.height != new.height,
        }
    }

    pub fn any_changed(&self) -> bool {
        self.width_changed || self.height_changed
    }
}

/// Notifications from the host UI framework.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    /// The control became visible (`true`) or hidden (`false`)
    VisibilityChanged(bool),
    /// The host frame clock fired
    FrameTick(FrameStamp),
    /// The layout pass assigned a new size
    SizeChanged(SizeChange),
    /// The control was attached to a live host tree
    Loaded,
    /// The control was detached from the host tree
    Unloaded,
    /// Key pressed
    KeyDown(KeyEvent),
    /// Key released
    KeyUp(KeyEvent),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modifiers_display_empty_is_none() {
        assert_eq!(Modifiers::empty().to_string(), "None");
    }

    #[test]
    fn modifiers_display_combo_in_order() {
        let all = Modifiers::SHIFT | Modifiers::CONTROL | Modifiers::ALT | Modifiers::META;
        assert_eq!(all.to_string(), "Shift+Control+Alt+Meta");
        assert_eq!((Modifiers::META | Modifiers::SHIFT).to_string(), "Shift+Meta");
    }

    #[test]
    fn size_change_between_detects_dimensions() {
        let c = SizeChange::between(Viewport::new(100.0, 100.0), Viewport::new(100.0, 120.0));
        assert!(!c.width_changed);
        assert!(c.height_changed);
        assert!(c.any_changed());

        let same = SizeChange::between(Viewport::new(100.0, 100.0), Viewport::new(100.0, 100.0));
        assert!(!same.any_changed());
    }

    #[test]
    fn key_event_debug_mentions_source() {
        let e = KeyEvent {
            key: "A".into(),
            code: "KeyA".into(),
            modifiers: Modifiers::SHIFT,
            is_repeat: false,
            source: EventSource::Other,
        };
        let dbg = format!("{:?}", HostEvent::KeyDown(e));
        assert!(dbg.contains("KeyDown"));
        assert!(dbg.contains("Other"));
    }
}
