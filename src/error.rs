/// Errors raised while configuring or drawing a gauge.
#[derive(Debug, thiserror::Error)]
pub enum GaugeError {
    #[error("Invalid gauge range: min {min} must be finite and below max {max}")]
    InvalidRange { min: f64, max: f64 },

    #[error("Container has no drawable area: {width}x{height}")]
    EmptyContainer { width: u32, height: u32 },

    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("Font error: {0}")]
    Font(String),

    #[error("Window error: {0}")]
    Window(String),

    #[error(transparent)]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GaugeError>;
