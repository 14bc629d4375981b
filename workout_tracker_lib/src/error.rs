use thiserror::Error;

use crate::session::SessionState;

/// Failure reported by the location source.
///
/// The first three mirror the geolocation error codes 1, 2 and 3.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,
    #[error("position unavailable")]
    PositionUnavailable,
    #[error("no fix before timeout")]
    Timeout,
    #[error("location source error: {0}")]
    Other(String),
}

impl LocationError {
    pub fn from_code(code: u16, message: impl Into<String>) -> Self {
        match code {
            1 => LocationError::PermissionDenied,
            2 => LocationError::PositionUnavailable,
            3 => LocationError::Timeout,
            _ => LocationError::Other(message.into()),
        }
    }
}

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("location tracking is not supported in this environment")]
    UnsupportedEnvironment,
    #[error("cannot {action} while {state}")]
    InvalidTransition { state: SessionState, action: &'static str },
    #[error(transparent)]
    LocationSource(#[from] LocationError),
    #[error("wake lock: {0}")]
    WakeLock(String),
    #[error("remote rejected the session ({status}): {message}")]
    RemoteRejected { status: u16, message: String },
    #[error("transport: {0}")]
    Transport(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

#[test]
fn location_codes() {
    assert_eq!(LocationError::from_code(1, ""), LocationError::PermissionDenied);
    assert_eq!(LocationError::from_code(3, ""), LocationError::Timeout);
    assert_eq!(LocationError::from_code(9, "weird"), LocationError::Other("weird".into()));
}
