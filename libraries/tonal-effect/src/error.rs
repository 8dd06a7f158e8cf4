/// Effect control errors
use thiserror::Error;
use tonal_eq::EqError;

/// Result type alias using `EffectError`
pub type Result<T> = std::result::Result<T, EffectError>;

/// errno-style status for an invalid argument
pub const STATUS_INVALID_ARGUMENT: i32 = -22;

/// errno-style status for a call the current state does not allow
pub const STATUS_NOT_SUPPORTED: i32 = -38;

/// errno-style status for a process call that produced nothing
pub const STATUS_NO_DATA: i32 = -61;

/// Effect control error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EffectError {
    /// Malformed or out-of-range argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Call not allowed in the current state
    #[error("Not supported: {0}")]
    NotSupported(String),

    /// Effect was released
    #[error("Effect is not initialized")]
    Uninitialized,

    /// Engine rejected the request
    #[error(transparent)]
    Engine(#[from] EqError),
}

impl EffectError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Status code reported to the host
    pub fn status(&self) -> i32 {
        match self {
            Self::InvalidArgument(_) | Self::Uninitialized | Self::Engine(_) => {
                STATUS_INVALID_ARGUMENT
            }
            Self::NotSupported(_) => STATUS_NOT_SUPPORTED,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        assert_eq!(EffectError::invalid("x").status(), -22);
        assert_eq!(EffectError::Uninitialized.status(), -22);
        assert_eq!(
            EffectError::from(EqError::InvalidBand { band: 9, count: 5 }).status(),
            -22
        );
        assert_eq!(EffectError::NotSupported("enable".into()).status(), -38);
    }
}
