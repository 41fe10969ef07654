use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),
}

/// Failures inside the browser bridge.
///
/// None of these are fatal to the host: measurement failures are absorbed
/// by the viewport logic, and the lifecycle barrier never reports a timeout
/// as an error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BridgeError {
    #[error("content measurement unavailable: {0}")]
    MeasurementUnavailable(String),

    #[error("browser handle used after destroy: {0}")]
    UseAfterDestroy(&'static str),

    #[error("session already terminated")]
    AlreadyTerminated,

    #[error("browser backend error: {0}")]
    Backend(String),
}

#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Bridge(#[from] BridgeError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("launch data error: {0}")]
    LaunchData(String),
}
