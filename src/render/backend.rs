use crate::config::BackendSettings;
use std::any::Any;
use std::sync::atomic::{AtomicU64, Ordering};

/// Channel layout of the backend framebuffer. Switching between the two requires a full
/// reallocation, not just a flag on the presented image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PixelFormat {
    /// No alpha channel; the host can treat the surface as fully covering its area
    #[default]
    Opaque,
    /// Alpha channel is kept so the host can blend the surface with what is behind it
    Alpha,
}

/// Configuration of a backend framebuffer.
///
/// `width` and `height` are logical units as handed out by the layout pass. The backend is
/// responsible for turning them into device pixels with the scale factors.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceConfig {
    pub width: i32,
    pub height: i32,
    pub dpi_scale_x: f64,
    pub dpi_scale_y: f64,
    pub format: PixelFormat,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self::collapsed()
    }
}

impl SurfaceConfig {
    /// Zero sized, unscaled, opaque. Holds no GPU-sized resources.
    pub const fn collapsed() -> Self {
        Self {
            width: 0,
            height: 0,
            dpi_scale_x: 1.0,
            dpi_scale_y: 1.0,
            format: PixelFormat::Opaque,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Size in device pixels, rounded up so the framebuffer always covers the logical area.
    pub fn device_size(&self) -> (u32, u32) {
        if self.is_empty() {
            return (0, 0);
        }
        let w = (self.width as f64 * self.dpi_scale_x).ceil().max(0.0) as u32;
        let h = (self.height as f64 * self.dpi_scale_y).ceil().max(0.0) as u32;
        (w, h)
    }
}

/// Opaque backend framebuffer identifier. `0` means there is no framebuffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct FramebufferHandle(pub u64);

impl FramebufferHandle {
    pub const NONE: FramebufferHandle = FramebufferHandle(0);

    pub fn is_none(&self) -> bool {
        self.0 == 0
    }

    /// Allocate a fresh process-unique handle. Never returns [`FramebufferHandle::NONE`].
    pub fn next() -> FramebufferHandle {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        FramebufferHandle(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Type-erased drawing surface handed out by the host's paint pass.
pub trait PaintSurface: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Backend interface. Calls occur on the thread owning the surface driver.
pub trait SurfaceBackend {
    /// Name of the backend, for logging
    fn name(&self) -> &str;

    /// Current configuration of the framebuffer.
    fn config(&self) -> SurfaceConfig;

    /// Reallocate the framebuffer for the given configuration. Potentially expensive.
    fn set_size(&mut self, config: SurfaceConfig) -> anyhow::Result<()>;

    /// Make the current framebuffer content visible on the host's paint surface.
    fn present(&mut self, surface: &mut dyn PaintSurface) -> anyhow::Result<()>;

    /// Handle of the current framebuffer
    fn handle(&self) -> FramebufferHandle;

    /// Framebuffer width in device pixels
    fn width(&self) -> u32;

    /// Framebuffer height in device pixels
    fn height(&self) -> u32;
}

/// Creates the backend when a surface is started.
pub trait BackendFactory {
    fn construct(&self, settings: &BackendSettings) -> anyhow::Result<Box<dyn SurfaceBackend>>;
}

impl<F> BackendFactory for F
where
    F: Fn(&BackendSettings) -> anyhow::Result<Box<dyn SurfaceBackend>>,
{
    fn construct(&self, settings: &BackendSettings) -> anyhow::Result<Box<dyn SurfaceBackend>> {
        self(settings)
    }
}
