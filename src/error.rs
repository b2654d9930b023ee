use thiserror::Error;

use crate::domain::error::{LifecycleError, MathError, PricingError, ValidationError};
use crate::domain::{FeedId, PoolId};

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Failures of the external value source consulted at resolution.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValueSourceError {
    #[error("no price published for feed {0}")]
    FeedNotFound(FeedId),

    #[error("price for feed {feed_id} published at {publish_time}, before deadline {deadline}")]
    StalePrice {
        feed_id: FeedId,
        publish_time: i64,
        deadline: i64,
    },

    #[error("price confidence {confidence} too wide for price {price} (max {max_bps} bp)")]
    ConfidenceTooWide {
        price: i64,
        confidence: u64,
        max_bps: u32,
    },

    #[error("pool {pool} unavailable: {reason}")]
    PoolUnavailable { pool: PoolId, reason: String },

    #[error("update fee too low: required {required}, provided {provided}")]
    InsufficientUpdateFee { required: u128, provided: u128 },

    #[error("invalid price update: {0}")]
    InvalidUpdate(String),
}

/// Coarse error taxonomy, for callers that react per category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Validation,
    Lifecycle,
    Math,
    ValueSource,
    Config,
    Io,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error(transparent)]
    Math(#[from] MathError),

    #[error(transparent)]
    ValueSource(#[from] ValueSourceError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation(_) => ErrorCategory::Validation,
            Self::Lifecycle(_) => ErrorCategory::Lifecycle,
            Self::Math(_) => ErrorCategory::Math,
            Self::ValueSource(_) => ErrorCategory::ValueSource,
            Self::Config(_) => ErrorCategory::Config,
            Self::Json(_) | Self::Io(_) => ErrorCategory::Io,
        }
    }
}

impl From<PricingError> for Error {
    fn from(err: PricingError) -> Self {
        match err {
            PricingError::Validation(e) => Self::Validation(e),
            PricingError::Math(e) => Self::Math(e),
        }
    }
}
