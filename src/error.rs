//! Error types.
//!
//! - [`DistError`] is returned by every library operation (fitting, likelihood,
//!   bootstrap). Its variants mirror the three ways a call can go wrong.
//! - [`AppError`] is the binary-facing error: a message plus a process exit code.

use thiserror::Error;

/// Library error for sample validation, estimation and configuration problems.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DistError {
    /// Empty sample, negative or non-finite values, or values outside the
    /// support of the requested family.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The optimizer failed to converge or the MLE is degenerate.
    #[error("estimation failed: {0}")]
    Estimation(String),

    /// Invalid configuration or parameter vector.
    #[error("invalid parameter: {0}")]
    Parameter(String),
}

impl DistError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn estimation(message: impl Into<String>) -> Self {
        Self::Estimation(message.into())
    }

    pub fn parameter(message: impl Into<String>) -> Self {
        Self::Parameter(message.into())
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<DistError> for AppError {
    fn from(err: DistError) -> Self {
        let exit_code = match err {
            DistError::InvalidInput(_) | DistError::Parameter(_) => 2,
            DistError::Estimation(_) => 4,
        };
        AppError::new(exit_code, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
