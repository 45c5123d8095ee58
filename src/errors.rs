#[derive(Debug, thiserror::Error)]
pub enum SurfaceError {
    #[error("Surface has already been started")]
    AlreadyStarted,

    #[error("Surface has been unloaded and cannot be started again")]
    Unloaded,

    #[error("Invalid settings: {0}")]
    InvalidSettings(#[from] SettingsError),

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Invalid context version {major}.{minor}")]
    InvalidVersion { major: u32, minor: u32 },

    #[error("Invalid sample count {0} (expected 0, 1, 2, 4, 8 or 16)")]
    InvalidSampleCount(u32),

    #[error("Forward compatible contexts require the core profile")]
    ForwardCompatibleRequiresCore,

    #[error("Cannot parse settings: {0}")]
    Json(#[from] serde_json::Error),
}
