//! CPU framebuffer backend.
//!
//! Allocates an RGBA8 pixel buffer in device pixels and copies it into a [`PixelSurface`] on
//! present. Opaque framebuffers keep the alpha byte at 255; alpha framebuffers start fully
//! transparent.

use crate::config::BackendSettings;
use crate::render::backend::{
    BackendFactory, FramebufferHandle, PaintSurface, PixelFormat, SurfaceBackend, SurfaceConfig,
};
use anyhow::{anyhow, bail, Result};
use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

/// CPU pixels in RGBA8, row-major.
#[derive(Clone, Debug, Default)]
pub struct Framebuffer {
    pub width: u32,
    pub height: u32,
    pub stride: u32,
    pub format: PixelFormat,
    pub pixels: Vec<u8>,
}

impl Framebuffer {
    /// Allocate a cleared framebuffer, failing when the byte size does not fit in memory.
    fn allocate(width: u32, height: u32, format: PixelFormat) -> Result<Self> {
        let stride = width
            .checked_mul(4)
            .ok_or_else(|| anyhow!("framebuffer width {} overflows the row stride", width))?;
        let len = (stride as usize)
            .checked_mul(height as usize)
            .ok_or_else(|| anyhow!("framebuffer {}x{} overflows the address space", width, height))?;

        let mut pixels = Vec::new();
        pixels
            .try_reserve_exact(len)
            .map_err(|e| anyhow!("cannot allocate {}x{} framebuffer: {}", width, height, e))?;
        pixels.resize(len, 0);

        let mut fb = Self {
            width,
            height,
            stride,
            format,
            pixels,
        };
        fb.clear([0, 0, 0, 0]);
        Ok(fb)
    }

    /// Fill the whole framebuffer. Alpha is ignored for opaque framebuffers.
    pub fn clear(&mut self, rgba: [u8; 4]) {
        let px = self.encode(rgba);
        for chunk in self.pixels.chunks_exact_mut(4) {
            chunk.copy_from_slice(&px);
        }
    }

    /// Write a single pixel. Out of bounds writes are dropped.
    pub fn put_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let px = self.encode(rgba);
        let offset = self.offset(x, y);
        self.pixels[offset..offset + 4].copy_from_slice(&px);
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = self.offset(x, y);
        let mut px = [0u8; 4];
        px.copy_from_slice(&self.pixels[offset..offset + 4]);
        Some(px)
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        y as usize * self.stride as usize + x as usize * 4
    }

    fn encode(&self, [r, g, b, a]: [u8; 4]) -> [u8; 4] {
        match self.format {
            PixelFormat::Opaque => [r, g, b, 255],
            PixelFormat::Alpha => [r, g, b, a],
        }
    }
}

/// Framebuffer shared between the backend and the application drawing into it.
pub type SharedFramebuffer = Rc<RefCell<Framebuffer>>;

/// Paint target for [`SoftwareBackend`]: the host hands this to `paint` and composites the
/// copied pixels afterwards.
#[derive(Clone, Debug, Default)]
pub struct PixelSurface {
    pub width: u32,
    pub height: u32,
    pub stride: u32,
    /// True when the pixels carry meaningful alpha
    pub has_alpha: bool,
    pub pixels: Vec<u8>,
    /// Frame id of the last presented frame
    pub frame_id: u64,
}

impl PixelSurface {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PaintSurface for PixelSurface {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Software backend rendering into CPU memory.
pub struct SoftwareBackend {
    config: SurfaceConfig,
    framebuffer: SharedFramebuffer,
    /// Handle reported while the backend holds a framebuffer
    id: FramebufferHandle,
    /// Set once the backend was collapsed to an empty configuration
    released: bool,
    frame_id: u64,
}

impl SoftwareBackend {
    pub fn new() -> Self {
        Self {
            config: SurfaceConfig::collapsed(),
            framebuffer: Rc::new(RefCell::new(Framebuffer::default())),
            id: FramebufferHandle::next(),
            released: false,
            frame_id: 0,
        }
    }

    /// Framebuffer the application draws into. Stays valid across resizes.
    pub fn framebuffer(&self) -> SharedFramebuffer {
        self.framebuffer.clone()
    }
}

impl Default for SoftwareBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl SurfaceBackend for SoftwareBackend {
    fn name(&self) -> &str {
        "SoftwareBackend"
    }

    fn config(&self) -> SurfaceConfig {
        self.config
    }

    fn set_size(&mut self, config: SurfaceConfig) -> Result<()> {
        if config.width < 0 || config.height < 0 {
            bail!("negative framebuffer size {}x{}", config.width, config.height);
        }

        let (w, h) = config.device_size();
        let fb = if w == 0 || h == 0 {
            Framebuffer::default()
        } else {
            Framebuffer::allocate(w, h, config.format)?
        };
        *self.framebuffer.borrow_mut() = fb;
        self.released = config.is_empty();

        log::debug!(
            "SoftwareBackend: framebuffer {}x{} ({:?}) for {}x{} @ {}x{}",
            w,
            h,
            config.format,
            config.width,
            config.height,
            config.dpi_scale_x,
            config.dpi_scale_y
        );
        self.config = config;
        Ok(())
    }

    fn present(&mut self, surface: &mut dyn PaintSurface) -> Result<()> {
        let target = surface
            .as_any_mut()
            .downcast_mut::<PixelSurface>()
            .ok_or_else(|| anyhow!("SoftwareBackend used with non-pixel surface"))?;

        let fb = self.framebuffer.borrow();
        target.width = fb.width;
        target.height = fb.height;
        target.stride = fb.stride;
        target.has_alpha = fb.format == PixelFormat::Alpha;
        target.pixels.clear();
        target.pixels.extend_from_slice(&fb.pixels);

        self.frame_id = self.frame_id.wrapping_add(1);
        target.frame_id = self.frame_id;
        Ok(())
    }

    fn handle(&self) -> FramebufferHandle {
        if self.released {
            FramebufferHandle::NONE
        } else {
            self.id
        }
    }

    fn width(&self) -> u32 {
        self.framebuffer.borrow().width
    }

    fn height(&self) -> u32 {
        self.framebuffer.borrow().height
    }
}

/// Builds [`SoftwareBackend`]s.
///
/// A factory can be tied to an existing context with [`SoftwareBackendFactory::sharing`]; it
/// then refuses settings that would need a different context.
#[derive(Default)]
pub struct SoftwareBackendFactory {
    shared_context: Option<BackendSettings>,
    last: RefCell<Option<SharedFramebuffer>>,
}

impl SoftwareBackendFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sharing(context: BackendSettings) -> Self {
        Self {
            shared_context: Some(context),
            last: RefCell::new(None),
        }
    }

    /// Framebuffer of the most recently constructed backend
    pub fn last_framebuffer(&self) -> Option<SharedFramebuffer> {
        self.last.borrow().clone()
    }
}

impl BackendFactory for SoftwareBackendFactory {
    fn construct(&self, settings: &BackendSettings) -> Result<Box<dyn SurfaceBackend>> {
        if let Some(shared) = &self.shared_context {
            if !shared.would_result_in_same_context(settings) {
                bail!(
                    "settings {}.{} {:?} are incompatible with the shared context {}.{} {:?}",
                    settings.major_version,
                    settings.minor_version,
                    settings.profile,
                    shared.major_version,
                    shared.minor_version,
                    shared.profile
                );
            }
        }

        let backend = SoftwareBackend::new();
        *self.last.borrow_mut() = Some(backend.framebuffer());
        Ok(Box::new(backend))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GraphicsProfile;

    fn config(w: i32, h: i32, scale: f64, format: PixelFormat) -> SurfaceConfig {
        SurfaceConfig {
            width: w,
            height: h,
            dpi_scale_x: scale,
            dpi_scale_y: scale,
            format,
        }
    }

    #[test]
    fn allocates_device_pixels() {
        let mut b = SoftwareBackend::new();
        b.set_size(config(10, 4, 1.5, PixelFormat::Alpha)).unwrap();

        assert_eq!((b.width(), b.height()), (15, 6));
        let fb = b.framebuffer();
        assert_eq!(fb.borrow().pixels.len(), 15 * 6 * 4);
        assert_eq!(fb.borrow().pixel(0, 0), Some([0, 0, 0, 0]));
    }

    #[test]
    fn handle_is_stable_until_collapse() {
        let mut b = SoftwareBackend::new();
        let handle = b.handle();
        assert!(!handle.is_none());

        b.set_size(config(8, 8, 1.0, PixelFormat::Opaque)).unwrap();
        b.set_size(config(16, 8, 2.0, PixelFormat::Alpha)).unwrap();
        assert_eq!(b.handle(), handle);

        b.set_size(SurfaceConfig::collapsed()).unwrap();
        assert!(b.handle().is_none());
    }

    #[test]
    fn oversized_framebuffer_is_refused() {
        let mut b = SoftwareBackend::new();
        b.set_size(config(4, 4, 1.0, PixelFormat::Alpha)).unwrap();

        let err = b.set_size(config(1_200_000_000, 1, 1.0, PixelFormat::Alpha)).unwrap_err();
        assert!(err.to_string().contains("overflows"), "{}", err);

        // Previous allocation is untouched
        assert_eq!((b.width(), b.height()), (4, 4));
        assert_eq!(b.config().width, 4);
    }

    #[test]
    fn opaque_framebuffer_forces_alpha() {
        let mut b = SoftwareBackend::new();
        b.set_size(config(2, 2, 1.0, PixelFormat::Opaque)).unwrap();

        let fb = b.framebuffer();
        assert_eq!(fb.borrow().pixel(1, 1), Some([0, 0, 0, 255]));
        fb.borrow_mut().put_pixel(1, 1, [10, 20, 30, 40]);
        assert_eq!(fb.borrow().pixel(1, 1), Some([10, 20, 30, 255]));
        assert_eq!(fb.borrow().pixel(2, 0), None);
    }

    #[test]
    fn collapse_frees_pixels() {
        let mut b = SoftwareBackend::new();
        b.set_size(config(64, 64, 2.0, PixelFormat::Alpha)).unwrap();
        b.set_size(SurfaceConfig::collapsed()).unwrap();

        assert_eq!((b.width(), b.height()), (0, 0));
        assert!(b.handle().is_none());
        assert!(b.framebuffer().borrow().pixels.is_empty());
    }

    #[test]
    fn negative_size_is_refused() {
        let mut b = SoftwareBackend::new();
        assert!(b.set_size(config(-1, 5, 1.0, PixelFormat::Opaque)).is_err());
        assert_eq!(b.config(), SurfaceConfig::collapsed());
    }

    #[test]
    fn present_copies_into_pixel_surface() {
        let mut b = SoftwareBackend::new();
        b.set_size(config(3, 2, 1.0, PixelFormat::Alpha)).unwrap();
        b.framebuffer().borrow_mut().clear([1, 2, 3, 4]);

        let mut surface = PixelSurface::new();
        b.present(&mut surface).unwrap();

        assert_eq!((surface.width, surface.height, surface.stride), (3, 2, 12));
        assert!(surface.has_alpha);
        assert_eq!(&surface.pixels[0..4], &[1, 2, 3, 4]);
        assert_eq!(surface.frame_id, 1);
    }

    #[test]
    fn present_rejects_foreign_surface() {
        struct Other;
        impl PaintSurface for Other {
            fn as_any(&self) -> &dyn Any { self }
            fn as_any_mut(&mut self) -> &mut dyn Any { self }
        }

        let mut b = SoftwareBackend::new();
        assert!(b.present(&mut Other).is_err());
    }

    #[test]
    fn shared_factory_refuses_incompatible_settings() {
        let factory = SoftwareBackendFactory::sharing(BackendSettings::default());
        let other = BackendSettings {
            profile: GraphicsProfile::Compatibility,
            ..BackendSettings::default()
        };
        assert!(factory.construct(&other).is_err());
        assert!(factory.last_framebuffer().is_none());

        let msaa = BackendSettings { samples: 4, ..BackendSettings::default() };
        assert!(factory.construct(&msaa).is_ok());
        assert!(factory.last_framebuffer().is_some());
    }
}
