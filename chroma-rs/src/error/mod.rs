use core::{error, fmt};

use crate::kernel::{ConfigError, ExecInvariantViolation};

/// Errors raised whilst analysing a chromatogram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Arguments passed into the pipeline were invalid.
    InvalidInput {
        /// The invalid arg.
        arg: &'static str,
        /// Explaining why arg is invalid.
        reason: String,
    },
    /// Mean and standard deviation of the positive scores could not be computed.
    ///
    /// Distinct from an empty peak list: it means the detection threshold
    /// itself is undefined.
    DegenerateStatistics {
        /// Number of strictly positive scores that were available.
        positive_scores: usize,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidInput { reason, .. } => write!(f, "Invalid input: {reason}"),
            Error::DegenerateStatistics { positive_scores } => {
                write!(
                    f,
                    "Degenerate score statistics: {positive_scores} positive score(s), need at least 2."
                )
            }
        }
    }
}

impl error::Error for Error {}

impl From<ConfigError> for Error {
    fn from(value: ConfigError) -> Self {
        let arg = match &value {
            ConfigError::EmptyInput { arg }
            | ConfigError::InvalidArgument { arg, .. }
            | ConfigError::NonContiguous { arg }
            | ConfigError::LengthMismatch { arg, .. } => *arg,
        };
        Error::InvalidInput {
            arg,
            reason: value.to_string(),
        }
    }
}

impl From<ExecInvariantViolation> for Error {
    fn from(value: ExecInvariantViolation) -> Self {
        match value {
            ExecInvariantViolation::DegenerateStatistics { positive_scores } => {
                Error::DegenerateStatistics { positive_scores }
            }
            ExecInvariantViolation::Config(err) => err.into(),
            ExecInvariantViolation::LengthMismatch { arg, .. } => Error::InvalidInput {
                arg,
                reason: value.to_string(),
            },
        }
    }
}
