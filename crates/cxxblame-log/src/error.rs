use thiserror::Error;

/// Failures that abort a parse run.
///
/// Lines that simply do not match a pattern are never errors; parsers report
/// them by returning `Ok(false)`.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to read build output: {0}")]
    Io(#[from] std::io::Error),

    #[error("build output exceeds the {limit} byte limit ({actual} bytes read)")]
    InputTooLarge { limit: usize, actual: usize },

    #[error("invalid settings: {0}")]
    Settings(#[from] serde_json::Error),
}

pub type Result<T, E = ParseError> = std::result::Result<T, E>;
