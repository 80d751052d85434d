//! Paired time and intensity samples, validated once and borrowed by every stage.

use crate::kernel::ConfigError;
use crate::signal::LabeledPoint;
use num_traits::Float;

/// Tolerance used when locating a sample by its time stamp.
pub const TIME_MATCH_TOLERANCE: f64 = 1e-6;

/// Validated, borrowed view over paired `time`/`signal` samples.
///
/// Construction checks that both slices are non-empty, have equal length and
/// that `time` is strictly increasing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Chromatogram<'a, F> {
    time: &'a [F],
    signal: &'a [F],
}

impl<'a, F> Chromatogram<'a, F>
where
    F: Float,
{
    /// Validate and wrap a chromatogram.
    ///
    /// ```
    /// use chroma_rs::signal::Chromatogram;
    ///
    /// let chrom = Chromatogram::try_new(&[0.0, 0.5, 1.0], &[1.0, 3.0, 1.0]).unwrap();
    /// assert_eq!(chrom.len(), 3);
    /// assert!(Chromatogram::try_new(&[0.0, 0.0], &[1.0, 1.0]).is_err());
    /// ```
    pub fn try_new(time: &'a [F], signal: &'a [F]) -> Result<Self, ConfigError> {
        if time.is_empty() {
            return Err(ConfigError::EmptyInput { arg: "time" });
        }
        if signal.len() != time.len() {
            return Err(ConfigError::LengthMismatch {
                arg: "signal",
                expected: time.len(),
                got: signal.len(),
            });
        }
        if time.windows(2).any(|w| !(w[1] > w[0])) {
            return Err(ConfigError::InvalidArgument {
                arg: "time",
                reason: "time samples must be strictly increasing",
            });
        }
        Ok(Self { time, signal })
    }

    /// Time samples.
    pub fn time(&self) -> &'a [F] {
        self.time
    }

    /// Intensity samples.
    pub fn signal(&self) -> &'a [F] {
        self.signal
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.time.len()
    }

    /// Always `false` for a validated chromatogram.
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Raw sample at `index`, if in bounds.
    pub fn point(&self, index: usize) -> Option<LabeledPoint<F>> {
        Some(LabeledPoint::new(
            *self.time.get(index)?,
            *self.signal.get(index)?,
        ))
    }

    /// Index of the first sample whose time is within [`TIME_MATCH_TOLERANCE`] of `t`.
    pub fn index_of_time(&self, t: F) -> Option<usize> {
        let tol = F::from(TIME_MATCH_TOLERANCE).unwrap_or_else(F::epsilon);
        self.time.iter().position(|ti| (*ti - t).abs() < tol)
    }
}
