//! Peak detection pipeline: score, label, segment.

use core::iter::Sum;

use crate::error::Error;
use crate::kernel::{ConfigError, ExecInvariantViolation, KernelLifecycle, Read1D};
use crate::signal::traits::{PeakDetect1D, PeakScore1D};
use crate::signal::{
    label_peaks, split_peaks, Chromatogram, PeakRegion, ScoreConfig, ScoreKernel, ScoreStrategy,
};
use num_traits::Float;
use tracing::debug;

/// Options for [`detect_peaks`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(default, bound(deserialize = "F: num_traits::Float + serde::Deserialize<'de>"))
)]
pub struct PeakDetectConfig<F> {
    /// Half-width `k` of the score neighbourhood.
    pub window_size: usize,
    /// Multiplier `h` on the standard deviation of the positive scores.
    pub threshold: F,
    /// Score function.
    pub strategy: ScoreStrategy,
}

impl<F> Default for PeakDetectConfig<F>
where
    F: Float,
{
    /// `k = 5`, `h = 1.5`, max-drop scores.
    fn default() -> Self {
        let one = F::one();
        Self {
            window_size: 5,
            threshold: one + one / (one + one),
            strategy: ScoreStrategy::MaxDrop,
        }
    }
}

/// Trait-first peak detection kernel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakDetectKernel<F> {
    score: ScoreKernel,
    threshold: F,
}

impl<F> PeakDetectKernel<F>
where
    F: Float,
{
    /// Return configured half-width.
    pub fn window_size(&self) -> usize {
        self.score.window_size()
    }

    /// Return configured threshold multiplier.
    pub fn threshold(&self) -> F {
        self.threshold
    }

    /// Return configured score function.
    pub fn strategy(&self) -> ScoreStrategy {
        self.score.strategy()
    }
}

impl<F> KernelLifecycle for PeakDetectKernel<F>
where
    F: Float,
{
    type Config = PeakDetectConfig<F>;

    fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
        if !config.threshold.is_finite() || config.threshold < F::zero() {
            return Err(ConfigError::InvalidArgument {
                arg: "threshold",
                reason: "threshold must be finite and non-negative",
            });
        }
        let score = ScoreKernel::try_new(ScoreConfig {
            window_size: config.window_size,
            strategy: config.strategy,
        })?;
        Ok(Self {
            score,
            threshold: config.threshold,
        })
    }
}

impl<F> PeakDetectKernel<F>
where
    F: Float + Default + Sum,
{
    /// Detect peak regions in a validated chromatogram.
    ///
    /// A signal without a single positive score has no peak-like sample
    /// anywhere and yields no regions.
    pub fn detect(
        &self,
        chrom: &Chromatogram<'_, F>,
    ) -> Result<Vec<PeakRegion<F>>, ExecInvariantViolation> {
        let scores = self.score.run_alloc(chrom.signal())?;
        if scores.iter().all(|s| !(*s > F::zero())) {
            debug!(samples = chrom.len(), "no positive peak scores");
            return Ok(Vec::new());
        }
        let labeled = label_peaks(
            chrom.time(),
            chrom.signal(),
            &scores,
            self.window_size(),
            self.threshold,
        )?;
        let regions = split_peaks(&labeled);
        debug!(
            samples = chrom.len(),
            window_size = self.window_size(),
            regions = regions.len(),
            "peak detection complete"
        );
        Ok(regions)
    }
}

impl<F> PeakDetect1D<F> for PeakDetectKernel<F>
where
    F: Float + Default + Sum,
{
    fn run<I1, I2>(&self, time: &I1, signal: &I2) -> Result<Vec<PeakRegion<F>>, ExecInvariantViolation>
    where
        I1: Read1D<F> + ?Sized,
        I2: Read1D<F> + ?Sized,
    {
        let time = time.read_slice().map_err(ExecInvariantViolation::from)?;
        let signal = signal.read_slice().map_err(ExecInvariantViolation::from)?;
        let chrom = Chromatogram::try_new(time, signal).map_err(ExecInvariantViolation::from)?;
        self.detect(&chrom)
    }
}

/// Detect peak regions in a chromatogram.
///
/// Runs the score, label and segment stages with `config`. Invalid input
/// (mismatched lengths, non-increasing time, a window that does not fit, a
/// negative threshold) fails before any computation. If the positive scores
/// are too few for a sample standard deviation,
/// [`Error::DegenerateStatistics`] is returned.
///
/// ```
/// use chroma_rs::signal::{detect_peaks, PeakDetectConfig};
///
/// let time: Vec<f64> = (0..24).map(f64::from).collect();
/// let mut signal: Vec<f64> = (0..24).map(|i| [1.0, 1.1, 1.0, 0.9][i % 4]).collect();
/// signal[12] = 6.0;
///
/// let config = PeakDetectConfig { window_size: 3, ..Default::default() };
/// let regions = detect_peaks(&time, &signal, &config).unwrap();
/// assert_eq!(regions.len(), 1);
/// assert_eq!(regions[0].points()[0].time, 12.0);
/// ```
pub fn detect_peaks<F>(
    time: &[F],
    signal: &[F],
    config: &PeakDetectConfig<F>,
) -> Result<Vec<PeakRegion<F>>, Error>
where
    F: Float + Default + Sum,
{
    let kernel = PeakDetectKernel::try_new(*config)?;
    let chrom = Chromatogram::try_new(time, signal)?;
    Ok(kernel.detect(&chrom)?)
}
