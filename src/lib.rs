//! Drive an embedded rendering surface from a host UI framework.
//!
//! A [`SurfaceDriver`] sits between a host control (which knows about layout, visibility,
//! device scale and the frame clock) and a [`SurfaceBackend`](render::backend::SurfaceBackend)
//! (which owns the framebuffer). The host forwards its notifications as [`HostEvent`]s and
//! calls [`SurfaceDriver::paint`] whenever it paints the control.

pub mod config;
pub mod errors;
pub mod events;
pub mod host;
pub mod logging;
pub mod render;
pub mod surface;
pub mod tick;

pub use config::{BackendSettings, Settings};
pub use errors::{SettingsError, SurfaceError};
pub use events::HostEvent;
pub use host::SurfaceHost;
pub use surface::{FrameContext, LifecycleState, PaintOutcome, SurfaceDriver};
