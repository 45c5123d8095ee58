use crate::events::KeyEvent;
use crate::render::backend::PaintSurface;

/// Device transform of the host tree the surface is attached to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceTransform {
    pub m11: f64,
    pub m12: f64,
    pub m21: f64,
    pub m22: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl DeviceTransform {
    pub const IDENTITY: DeviceTransform = DeviceTransform {
        m11: 1.0,
        m12: 0.0,
        m21: 0.0,
        m22: 1.0,
        offset_x: 0.0,
        offset_y: 0.0,
    };

    /// Pure scale transform, as used by most hosts for DPI
    pub fn scale(x: f64, y: f64) -> Self {
        Self { m11: x, m22: y, ..Self::IDENTITY }
    }

    /// Horizontal and vertical scale factors
    pub fn dpi_scale(&self) -> DpiScale {
        DpiScale { x: self.m11, y: self.m22 }
    }
}

/// Logical-to-device scale factors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DpiScale {
    pub x: f64,
    pub y: f64,
}

impl DpiScale {
    pub const IDENTITY: DpiScale = DpiScale { x: 1.0, y: 1.0 };
}

impl Default for DpiScale {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Visual drawn instead of the backend content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    /// Design or preview tool is hosting the control
    DesignTime,
    /// The surface has not been started yet
    Unstarted,
}

/// The host UI framework, as seen from a surface driver.
///
/// All calls happen on the host UI thread.
pub trait SurfaceHost {
    /// Schedule a paint pass for the control.
    fn request_redraw(&mut self);

    /// Start delivering [`HostEvent::FrameTick`](crate::events::HostEvent::FrameTick).
    fn subscribe_frame_clock(&mut self);

    /// Stop delivering frame ticks.
    fn unsubscribe_frame_clock(&mut self);

    /// Device transform of the tree the control lives in, `None` while detached.
    fn device_transform(&self) -> Option<DeviceTransform>;

    /// True inside designers and previewers.
    fn is_design_mode(&self) -> bool {
        false
    }

    /// Draw a placeholder visual onto the paint surface.
    fn draw_placeholder(&mut self, _surface: &mut dyn PaintSurface, _placeholder: Placeholder) {}

    /// Re-dispatch a keyboard event so listeners registered on the host see it.
    fn reroute_key(&mut self, _event: &KeyEvent, _pressed: bool) {}
}
