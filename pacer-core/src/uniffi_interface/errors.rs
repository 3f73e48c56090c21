use crate::timer::TimerError;
use thiserror::Error as ThisError;
use uniffi::Error;

#[derive(Debug, ThisError, Error)]
#[uniffi(flat_error)]
#[non_exhaustive]
pub enum PacerError {
    #[error("error: {0}")]
    Common(String),
    #[error("timer: {0}")]
    Timer(String),
}

impl From<anyhow::Error> for PacerError {
    fn from(e: anyhow::Error) -> Self {
        match e.downcast_ref::<TimerError>() {
            Some(t) => PacerError::Timer(t.to_string()),
            None => PacerError::Common(e.to_string()),
        }
    }
}

impl From<TimerError> for PacerError {
    fn from(e: TimerError) -> Self {
        PacerError::Timer(e.to_string())
    }
}

impl From<String> for PacerError {
    fn from(s: String) -> Self {
        PacerError::Common(s)
    }
}

impl From<&str> for PacerError {
    fn from(s: &str) -> Self {
        PacerError::Common(s.to_string())
    }
}
