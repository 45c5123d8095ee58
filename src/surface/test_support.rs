use crate::events::KeyEvent;
use crate::host::{DeviceTransform, Placeholder, SurfaceHost};
use crate::render::backend::PaintSurface;
use std::any::Any;

/// Host that records everything a driver asks of it.
#[derive(Debug, Default)]
pub(crate) struct RecordingHost {
    pub redraws: usize,
    pub subscribed: bool,
    pub subscribe_calls: usize,
    pub unsubscribe_calls: usize,
    pub transform: Option<DeviceTransform>,
    pub design_mode: bool,
    pub placeholders: Vec<Placeholder>,
    pub rerouted: Vec<(KeyEvent, bool)>,
}

impl SurfaceHost for RecordingHost {
    fn request_redraw(&mut self) {
        self.redraws += 1;
    }

    fn subscribe_frame_clock(&mut self) {
        assert!(!self.subscribed, "frame clock subscribed twice");
        self.subscribed = true;
        self.subscribe_calls += 1;
    }

    fn unsubscribe_frame_clock(&mut self) {
        assert!(self.subscribed, "frame clock unsubscribed while not subscribed");
        self.subscribed = false;
        self.unsubscribe_calls += 1;
    }

    fn device_transform(&self) -> Option<DeviceTransform> {
        self.transform
    }

    fn is_design_mode(&self) -> bool {
        self.design_mode
    }

    fn draw_placeholder(&mut self, _surface: &mut dyn PaintSurface, placeholder: Placeholder) {
        self.placeholders.push(placeholder);
    }

    fn reroute_key(&mut self, event: &KeyEvent, pressed: bool) {
        self.rerouted.push((event.clone(), pressed));
    }
}

/// Paint surface that accepts anything the null backend presents.
pub(crate) struct BlankSurface;

impl PaintSurface for BlankSurface {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
