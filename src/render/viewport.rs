//! Logical layout size of the hosting control.
//!
//! A [`Viewport`] is what the host's layout pass assigned to the control, in logical
//! (DPI-independent) units. It is never pre-multiplied by the DPI scale; the backend turns
//! it into device pixels.
//!
//! # Examples
//!
//! ```
//! use surface_host::render::Viewport;
//!
//! let vp = Viewport::new(800.0, 600.0);
//! assert_eq!(vp.pixel_size(), (800, 600));
//!
//! let thin = Viewport::new(1024.7, 0.4);
//! assert_eq!(thin.pixel_size(), (1024, 0));
//! assert!(thin.is_degenerate());
//! ```

/// Logical size of the control.
#[derive(Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    /// Width in logical units.
    pub width: f64,

    /// Height in logical units.
    pub height: f64,
}

impl std::fmt::Debug for Viewport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Viewport {{ width: {}, height: {} }}", self.width, self.height)
    }
}

impl Viewport {
    /// Creates a new [`Viewport`] with the given logical size.
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Both dimensions are strictly positive.
    pub fn has_area(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    /// Integer size handed to the backend. Fractions are truncated.
    pub fn pixel_size(&self) -> (i32, i32) {
        (self.width as i32, self.height as i32)
    }

    /// True when the integer size has a zero or negative dimension.
    pub fn is_degenerate(&self) -> bool {
        let (w, h) = self.pixel_size();
        w <= 0 || h <= 0
    }
}
