// This is free and unencumbered software released into the public domain.

use std::error::Error as StdError;
use thiserror::Error;

pub type DroneResult<T> = Result<T, DroneError>;

#[derive(Debug, Error)]
pub enum DroneError {
    #[error("no camera attached to the product")]
    NoCamera,

    #[error("capturer is already started")]
    AlreadyStarted,

    #[error("unsupported: {0}")]
    Unsupported(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("driver error while {context}")]
    DriverError {
        context: &'static str,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

impl DroneError {
    #[inline]
    pub fn driver(context: &'static str, source: impl StdError + Send + Sync + 'static) -> Self {
        Self::DriverError {
            context,
            source: Box::new(source),
        }
    }

    #[inline]
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }

    #[inline]
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
