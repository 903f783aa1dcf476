use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    #[error("unknown elevation method `{0}`")]
    UnknownMethod(String),
    #[error("invalid configuration for `{field}`: {reason}")]
    InvalidConfiguration { field: &'static str, reason: String },
    #[error("route point {index} has a non-finite coordinate ({lat}, {lon})")]
    InvalidCoordinate { index: usize, lat: f64, lon: f64 },
}

impl EngineError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        EngineError::InvalidConfiguration {
            field,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
