//! Surface configuration.
//!
//! [`Settings`] is the snapshot a [`SurfaceDriver`](crate::surface::SurfaceDriver) is started
//! with. The driver keeps its own copy, so changing the caller's value after
//! [`start`](crate::surface::SurfaceDriver::start) has no effect on a running surface.
//!
//! Settings can be built in code, through the validating [`SettingsBuilder`], or loaded from
//! JSON with [`Settings::from_json`]. Missing JSON fields fall back to their defaults.
//!
//! # Examples
//!
//! ## Use defaults
//! ```rust
//! use surface_host::config::Settings;
//! let settings = Settings::default();
//! assert!(settings.render_continuously);
//! assert!(settings.use_device_dpi);
//! assert!(!settings.transparent_background);
//! ```
//!
//! ## Customize with the builder
//! ```rust
//! use surface_host::config::{GraphicsProfile, Settings};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = Settings::builder()
//!     .render_continuously(false)
//!     .transparent_background(true)
//!     .version(4, 1)
//!     .profile(GraphicsProfile::Core)
//!     .samples(4)
//!     .build()?;
//! assert_eq!(settings.backend.samples, 4);
//! # Ok(()) }
//! ```
//!
//! ## Load from JSON
//! ```rust
//! use surface_host::config::Settings;
//! let settings = Settings::from_json(r#"{ "use_device_dpi": false }"#).unwrap();
//! assert!(!settings.use_device_dpi);
//! assert!(settings.render_continuously);
//! ```

use crate::errors::SettingsError;
use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Which flavour of graphics context the backend should create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GraphicsProfile {
    /// Core profile, no deprecated functionality
    Core,
    /// Compatibility profile, deprecated functionality still available
    Compatibility,
}

bitflags! {
    /// Extra flags passed to the backend when the context is created.
    pub struct ContextFlags: u8 {
        const DEBUG              = 0b0001;
        const FORWARD_COMPATIBLE = 0b0010;
        const OFFSCREEN          = 0b0100;
    }
}

impl Serialize for ContextFlags {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.bits())
    }
}

impl<'de> Deserialize<'de> for ContextFlags {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bits = u8::deserialize(deserializer)?;
        Ok(ContextFlags::from_bits_truncate(bits))
    }
}

/// Parameters used by a [`BackendFactory`](crate::render::backend::BackendFactory) to construct
/// the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendSettings {
    /// Major version of the requested graphics API
    pub major_version: u32,
    /// Minor version of the requested graphics API
    pub minor_version: u32,
    /// Context profile
    pub profile: GraphicsProfile,
    /// Context creation flags
    pub context_flags: ContextFlags,
    /// Number of MSAA samples, 0 disables multisampling
    pub samples: u32,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            major_version: 3,
            minor_version: 3,
            profile: GraphicsProfile::Core,
            context_flags: ContextFlags::empty(),
            samples: 0,
        }
    }
}

impl BackendSettings {
    /// Returns true when a context created with `self` can be used by a surface that asks
    /// for `other`. The sample count is a framebuffer property and does not matter here.
    pub fn would_result_in_same_context(&self, other: &BackendSettings) -> bool {
        self.major_version == other.major_version
            && self.minor_version == other.minor_version
            && self.profile == other.profile
            && self.context_flags == other.context_flags
    }
}

/// Configuration snapshot for a single surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Redraw on every host frame instead of only on invalidation
    pub render_continuously: bool,
    /// Scale the backend framebuffer by the device DPI
    pub use_device_dpi: bool,
    /// Allocate an alpha-capable framebuffer so the host can blend it
    pub transparent_background: bool,
    /// Re-dispatch keyboard events that did not originate from this control to the host
    pub reroute_keyboard_events: bool,
    /// Backend construction parameters
    pub backend: BackendSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            render_continuously: true,
            use_device_dpi: true,
            transparent_background: false,
            reroute_keyboard_events: true,
            backend: BackendSettings::default(),
        }
    }
}

impl Settings {
    pub fn builder() -> SettingsBuilder {
        SettingsBuilder::default()
    }

    /// Parse and validate settings from a JSON document.
    pub fn from_json(json: &str) -> Result<Settings, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        validate(&settings)?;
        Ok(settings)
    }

    /// Check that the settings describe something a backend can construct.
    pub fn validate(&self) -> Result<(), SettingsError> {
        validate(self)
    }
}

/// Builder for [`Settings`].
#[derive(Debug, Clone, Default)]
pub struct SettingsBuilder {
    inner: Settings,
}

impl SettingsBuilder {
    #[inline]
    fn map(mut self, f: impl FnOnce(&mut Settings)) -> Self {
        f(&mut self.inner);
        self
    }

    pub fn render_continuously(self, on: bool) -> Self { self.map(|s| s.render_continuously = on) }
    pub fn use_device_dpi(self, on: bool) -> Self { self.map(|s| s.use_device_dpi = on) }
    pub fn transparent_background(self, on: bool) -> Self { self.map(|s| s.transparent_background = on) }
    pub fn reroute_keyboard_events(self, on: bool) -> Self { self.map(|s| s.reroute_keyboard_events = on) }
    pub fn version(self, major: u32, minor: u32) -> Self {
        self.map(|s| {
            s.backend.major_version = major;
            s.backend.minor_version = minor;
        })
    }
    pub fn profile(self, profile: GraphicsProfile) -> Self { self.map(|s| s.backend.profile = profile) }
    pub fn context_flags(self, flags: ContextFlags) -> Self { self.map(|s| s.backend.context_flags = flags) }
    pub fn samples(self, samples: u32) -> Self { self.map(|s| s.backend.samples = samples) }

    /// Apply multiple changes in one go.
    pub fn with(self, f: impl FnOnce(&mut Settings)) -> Self { self.map(f) }

    /// Validate and build the final settings.
    pub fn build(self) -> Result<Settings, SettingsError> {
        validate(&self.inner)?;
        Ok(self.inner)
    }
}

fn validate(s: &Settings) -> Result<(), SettingsError> {
    let b = &s.backend;
    if b.major_version == 0 {
        return Err(SettingsError::InvalidVersion {
            major: b.major_version,
            minor: b.minor_version,
        });
    }
    if !matches!(b.samples, 0 | 1 | 2 | 4 | 8 | 16) {
        return Err(SettingsError::InvalidSampleCount(b.samples));
    }
    if b.context_flags.contains(ContextFlags::FORWARD_COMPATIBLE) && b.profile != GraphicsProfile::Core {
        return Err(SettingsError::ForwardCompatibleRequiresCore);
    }
    Ok(())
}

/// Log verbosity, mapped onto [`log::LevelFilter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Error,
    #[default]
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}
