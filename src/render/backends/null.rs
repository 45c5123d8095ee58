use crate::config::BackendSettings;
use crate::render::backend::{
    BackendFactory, FramebufferHandle, PaintSurface, SurfaceBackend, SurfaceConfig,
};
use anyhow::Result;
use std::cell::RefCell;
use std::rc::Rc;

/// Counters shared between a [`NullBackend`] and whoever wants to observe it.
#[derive(Debug, Default)]
struct Counters {
    constructed: u32,
    resizes: Vec<SurfaceConfig>,
    presents: u64,
}

/// Shared view on what the null backends created by a factory have been asked to do.
#[derive(Clone, Debug, Default)]
pub struct NullStats(Rc<RefCell<Counters>>);

impl NullStats {
    /// Number of backends constructed
    pub fn constructed(&self) -> u32 {
        self.0.borrow().constructed
    }

    /// Every configuration passed to `set_size`, in order
    pub fn resizes(&self) -> Vec<SurfaceConfig> {
        self.0.borrow().resizes.clone()
    }

    pub fn resize_count(&self) -> usize {
        self.0.borrow().resizes.len()
    }

    pub fn last_resize(&self) -> Option<SurfaceConfig> {
        self.0.borrow().resizes.last().copied()
    }

    pub fn presents(&self) -> u64 {
        self.0.borrow().presents
    }
}

/// Null backend that keeps track of its configuration but does not allocate or draw anything.
pub struct NullBackend {
    config: SurfaceConfig,
    /// Handle reported while the backend holds a framebuffer
    id: FramebufferHandle,
    /// Set once the backend was collapsed to an empty configuration
    released: bool,
    frame_id: u64,
    stats: NullStats,
}

impl NullBackend {
    /// Creates a new instance of the null backend.
    pub fn new() -> Result<Self> {
        Ok(Self::with_stats(NullStats::default()))
    }

    pub fn with_stats(stats: NullStats) -> Self {
        stats.0.borrow_mut().constructed += 1;
        Self {
            config: SurfaceConfig::collapsed(),
            id: FramebufferHandle::next(),
            released: false,
            frame_id: 0,
            stats,
        }
    }

    /// Number of frames presented so far
    pub fn frame_id(&self) -> u64 {
        self.frame_id
    }
}

impl SurfaceBackend for NullBackend {
    fn name(&self) -> &str {
        "NullBackend"
    }

    fn config(&self) -> SurfaceConfig {
        self.config
    }

    fn set_size(&mut self, config: SurfaceConfig) -> Result<()> {
        self.stats.0.borrow_mut().resizes.push(config);
        self.config = config;
        self.released = config.is_empty();
        Ok(())
    }

    fn present(&mut self, _surface: &mut dyn PaintSurface) -> Result<()> {
        self.frame_id = self.frame_id.wrapping_add(1);
        self.stats.0.borrow_mut().presents += 1;
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
        self.config.device_size().0
    }

    fn height(&self) -> u32 {
        self.config.device_size().1
    }
}

/// Builds [`NullBackend`]s that all report into the same [`NullStats`].
#[derive(Clone, Debug, Default)]
pub struct NullBackendFactory {
    stats: NullStats,
}

impl NullBackendFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> NullStats {
        self.stats.clone()
    }
}

impl BackendFactory for NullBackendFactory {
    fn construct(&self, _settings: &BackendSettings) -> Result<Box<dyn SurfaceBackend>> {
        Ok(Box::new(NullBackend::with_stats(self.stats.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::backend::PixelFormat;
    use std::any::Any;

    struct Dummy;
    impl PaintSurface for Dummy {
        fn as_any(&self) -> &dyn Any { self }
        fn as_any_mut(&mut self) -> &mut dyn Any { self }
    }

    #[test]
    fn new_backend_has_handle_but_no_pixels() {
        let b = NullBackend::new().unwrap();
        assert!(!b.handle().is_none());
        assert_eq!((b.width(), b.height()), (0, 0));
        assert_eq!(b.name(), "NullBackend");
    }

    #[test]
    fn resize_allocates_and_collapse_releases() {
        let factory = NullBackendFactory::new();
        let mut b = factory.construct(&BackendSettings::default()).unwrap();
        let handle = b.handle();

        b.set_size(SurfaceConfig {
            width: 100,
            height: 50,
            dpi_scale_x: 2.0,
            dpi_scale_y: 2.0,
            format: PixelFormat::Alpha,
        })
        .unwrap();
        assert_eq!(b.handle(), handle);
        assert_eq!((b.width(), b.height()), (200, 100));

        b.set_size(SurfaceConfig::collapsed()).unwrap();
        assert!(b.handle().is_none());
        assert_eq!((b.width(), b.height()), (0, 0));

        let stats = factory.stats();
        assert_eq!(stats.constructed(), 1);
        assert_eq!(stats.resize_count(), 2);
        assert_eq!(stats.last_resize(), Some(SurfaceConfig::collapsed()));
    }

    #[test]
    fn present_counts_frames() {
        let mut b = NullBackend::new().unwrap();
        let mut surface = Dummy;
        b.present(&mut surface).unwrap();
        b.present(&mut surface).unwrap();
        assert_eq!(b.frame_id(), 2);
        assert_eq!(b.stats.presents(), 2);
    }
}
