pub mod backend;

/// Backends the surface driver can be started with.
pub mod backends {
    /// Null backend, no allocations and no drawing
    pub mod null;
    /// CPU framebuffer backend
    #[cfg(feature = "backend_software")]
    pub mod software;
}

mod viewport;

pub use viewport::Viewport;
