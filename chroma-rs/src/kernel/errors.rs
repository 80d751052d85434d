use core::fmt;

/// Rejected configuration or input, reported before any scoring runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// `time` or `signal` has no samples.
    EmptyInput {
        /// Offending argument.
        arg: &'static str,
    },
    /// A value is outside its domain, e.g. a zero window or a non-increasing time axis.
    InvalidArgument {
        /// Offending argument.
        arg: &'static str,
        /// What the value must satisfy.
        reason: &'static str,
    },
    /// An ndarray input is strided and cannot be borrowed as a slice.
    NonContiguous {
        /// Offending argument.
        arg: &'static str,
    },
    /// `signal` does not pair one-to-one with `time`.
    LengthMismatch {
        /// Offending argument.
        arg: &'static str,
        /// Length of `time`.
        expected: usize,
        /// Length supplied.
        got: usize,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyInput { arg } => write!(f, "`{arg}` has no samples"),
            Self::InvalidArgument { arg, reason } => write!(f, "`{arg}` rejected: {reason}"),
            Self::NonContiguous { arg } => write!(f, "`{arg}` must be a contiguous buffer"),
            Self::LengthMismatch { arg, expected, got } => {
                write!(f, "`{arg}` has {got} samples, expected {expected}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Failure while a validated kernel runs over a chromatogram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecInvariantViolation {
    /// A score or output buffer is not `n - 2k` long.
    LengthMismatch {
        /// Offending buffer.
        arg: &'static str,
        /// `n - 2k` for the bound signal.
        expected: usize,
        /// Length actually supplied.
        got: usize,
    },
    /// Mean and sample standard deviation of the positive scores are undefined.
    DegenerateStatistics {
        /// Number of strictly positive scores that were available.
        positive_scores: usize,
    },
    /// Input rejected while binding adapters or validating the chromatogram.
    Config(ConfigError),
}

impl From<ConfigError> for ExecInvariantViolation {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl fmt::Display for ExecInvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LengthMismatch { arg, expected, got } => {
                write!(f, "`{arg}` buffer holds {got} values, expected {expected}")
            }
            Self::DegenerateStatistics { positive_scores } => write!(
                f,
                "score threshold undefined with {positive_scores} positive score(s), need at least 2"
            ),
            Self::Config(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ExecInvariantViolation {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_argument() {
        let err = ConfigError::LengthMismatch {
            arg: "signal",
            expected: 43,
            got: 10,
        };
        assert_eq!(err.to_string(), "`signal` has 10 samples, expected 43");

        let exec = ExecInvariantViolation::from(err.clone());
        assert_eq!(exec.to_string(), err.to_string());
    }

    #[test]
    fn short_score_buffer_reports_expected_length() {
        let err = ExecInvariantViolation::LengthMismatch {
            arg: "scores",
            expected: 35,
            got: 34,
        };
        assert_eq!(err.to_string(), "`scores` buffer holds 34 values, expected 35");
    }
}
