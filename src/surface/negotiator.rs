//! Backend size and format policy.
//!
//! The negotiator runs once per paint pass. It works out which [`SurfaceConfig`] the backend
//! should have for the current layout size, device scale and background mode, and forwards a
//! resize only when that differs from what the backend already has. Reallocating a
//! framebuffer is expensive, so unchanged paints never touch the backend.

use crate::config::Settings;
use crate::host::{DeviceTransform, DpiScale};
use crate::render::backend::{PixelFormat, SurfaceBackend, SurfaceConfig};
use crate::render::Viewport;

/// Result of a negotiation round.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Negotiation {
    /// Backend already had the wanted configuration
    Unchanged,
    /// Backend was resized to the given configuration
    Resized(SurfaceConfig),
    /// Layout size has no area; nothing was asked of the backend
    Degenerate,
}

#[derive(Debug, Clone, Copy)]
pub struct SurfaceNegotiator {
    use_device_dpi: bool,
    format: PixelFormat,
}

impl SurfaceNegotiator {
    pub fn new(settings: &Settings) -> Self {
        let format = if settings.transparent_background {
            PixelFormat::Alpha
        } else {
            PixelFormat::Opaque
        };

        Self {
            use_device_dpi: settings.use_device_dpi,
            format,
        }
    }

    /// Pixel format every configuration produced by this negotiator uses.
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Scale factors for the given device transform. Identity when device DPI is disabled or
    /// the transform cannot be resolved.
    pub fn dpi_scale(&self, transform: Option<DeviceTransform>) -> DpiScale {
        if !self.use_device_dpi {
            return DpiScale::IDENTITY;
        }

        match transform.map(|t| t.dpi_scale()) {
            Some(scale) if is_usable(scale.x) && is_usable(scale.y) => scale,
            Some(scale) => {
                log::debug!("ignoring unusable device scale {}x{}", scale.x, scale.y);
                DpiScale::IDENTITY
            }
            None => {
                log::trace!("no device transform available, using identity scale");
                DpiScale::IDENTITY
            }
        }
    }

    /// Configuration the backend should have, or `None` when the layout has no area.
    pub fn target_config(&self, layout: Viewport, transform: Option<DeviceTransform>) -> Option<SurfaceConfig> {
        if layout.is_degenerate() {
            return None;
        }

        let (width, height) = layout.pixel_size();
        let scale = self.dpi_scale(transform);
        Some(SurfaceConfig {
            width,
            height,
            dpi_scale_x: scale.x,
            dpi_scale_y: scale.y,
            format: self.format,
        })
    }

    /// Bring the backend in line with the target configuration, resizing only on change.
    pub fn negotiate(
        &self,
        layout: Viewport,
        transform: Option<DeviceTransform>,
        backend: &mut dyn SurfaceBackend,
    ) -> anyhow::Result<Negotiation> {
        let Some(target) = self.target_config(layout, transform) else {
            log::trace!("skipping resize for degenerate layout {:?}", layout);
            return Ok(Negotiation::Degenerate);
        };

        if backend.config() == target {
            return Ok(Negotiation::Unchanged);
        }

        log::debug!(
            "{}: resizing {:?} -> {:?}",
            backend.name(),
            backend.config(),
            target
        );
        backend.set_size(target)?;
        Ok(Negotiation::Resized(target))
    }
}

fn is_usable(scale: f64) -> bool {
    scale.is_finite() && scale > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::backends::null::{NullBackend, NullStats};

    fn negotiator(use_device_dpi: bool, transparent: bool) -> SurfaceNegotiator {
        let settings = Settings::builder()
            .use_device_dpi(use_device_dpi)
            .transparent_background(transparent)
            .build()
            .unwrap();
        SurfaceNegotiator::new(&settings)
    }

    #[test]
    fn format_follows_transparent_background() {
        let layout = Viewport::new(10.0, 10.0);
        let alpha = negotiator(true, true).target_config(layout, None).unwrap();
        let opaque = negotiator(true, false).target_config(layout, None).unwrap();
        assert_eq!(alpha.format, PixelFormat::Alpha);
        assert_eq!(opaque.format, PixelFormat::Opaque);
    }

    #[test]
    fn device_dpi_disabled_ignores_transform() {
        let n = negotiator(false, false);
        let scale = n.dpi_scale(Some(DeviceTransform::scale(2.0, 2.0)));
        assert_eq!(scale, DpiScale::IDENTITY);
    }

    #[test]
    fn missing_transform_falls_back_to_identity() {
        let n = negotiator(true, false);
        let cfg = n.target_config(Viewport::new(320.0, 200.0), None).unwrap();
        assert_eq!((cfg.dpi_scale_x, cfg.dpi_scale_y), (1.0, 1.0));
        assert_eq!((cfg.width, cfg.height), (320, 200));
    }

    #[test]
    fn broken_transform_falls_back_to_identity() {
        let n = negotiator(true, false);
        assert_eq!(n.dpi_scale(Some(DeviceTransform::scale(0.0, 1.0))), DpiScale::IDENTITY);
        assert_eq!(n.dpi_scale(Some(DeviceTransform::scale(f64::NAN, 1.0))), DpiScale::IDENTITY);
    }

    #[test]
    fn size_is_not_premultiplied() {
        let n = negotiator(true, false);
        let cfg = n
            .target_config(Viewport::new(100.9, 50.2), Some(DeviceTransform::scale(1.5, 1.25)))
            .unwrap();
        assert_eq!((cfg.width, cfg.height), (100, 50));
        assert_eq!((cfg.dpi_scale_x, cfg.dpi_scale_y), (1.5, 1.25));
    }

    #[test]
    fn degenerate_layout_never_resizes() {
        let stats = NullStats::default();
        let mut backend = NullBackend::with_stats(stats.clone());
        let n = negotiator(true, false);

        for layout in [Viewport::new(0.0, 100.0), Viewport::new(100.0, 0.0), Viewport::new(-3.0, 5.0)] {
            let res = n.negotiate(layout, None, &mut backend).unwrap();
            assert_eq!(res, Negotiation::Degenerate);
        }
        assert_eq!(stats.resize_count(), 0);
    }

    #[test]
    fn repeated_negotiation_resizes_once() {
        let stats = NullStats::default();
        let mut backend = NullBackend::with_stats(stats.clone());
        let n = negotiator(true, true);
        let transform = Some(DeviceTransform::scale(2.0, 2.0));
        let layout = Viewport::new(640.0, 480.0);

        let first = n.negotiate(layout, transform, &mut backend).unwrap();
        assert!(matches!(first, Negotiation::Resized(_)));
        for _ in 0..10 {
            assert_eq!(n.negotiate(layout, transform, &mut backend).unwrap(), Negotiation::Unchanged);
        }
        assert_eq!(stats.resize_count(), 1);
    }

    #[test]
    fn scale_change_alone_triggers_resize() {
        let stats = NullStats::default();
        let mut backend = NullBackend::with_stats(stats.clone());
        let n = negotiator(true, false);
        let layout = Viewport::new(100.0, 100.0);

        n.negotiate(layout, Some(DeviceTransform::scale(1.0, 1.0)), &mut backend).unwrap();
        n.negotiate(layout, Some(DeviceTransform::scale(1.5, 1.5)), &mut backend).unwrap();

        assert_eq!(stats.resize_count(), 2);
        assert_eq!(stats.last_resize().unwrap().dpi_scale_x, 1.5);
    }
}
