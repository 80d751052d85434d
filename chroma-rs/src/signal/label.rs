//! Statistical thresholding of peak scores.

use crate::kernel::{check_window, ExecInvariantViolation};
use crate::stats::positive_threshold_stats;
use core::iter::Sum;
use num_traits::Float;
use tracing::debug;

/// A `(time, intensity)` sample after classification.
///
/// Baseline samples carry an intensity of exactly zero, so a genuine
/// zero-valued peak sample cannot be told apart from baseline.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LabeledPoint<F> {
    /// Sample time.
    pub time: F,
    /// Original intensity for peak samples, zero for baseline.
    pub intensity: F,
}

impl<F> LabeledPoint<F>
where
    F: Float,
{
    /// Create a labeled point.
    pub fn new(time: F, intensity: F) -> Self {
        Self { time, intensity }
    }

    /// Baseline sample at `time`.
    pub fn baseline(time: F) -> Self {
        Self::new(time, F::zero())
    }

    /// Whether the sample belongs to a peak (strictly positive intensity).
    pub fn is_peak(&self) -> bool {
        self.intensity > F::zero()
    }
}

/// Classify each scored index as peak or baseline.
///
/// `scores[j]` must be the score of `signal[j + window_size]`, as produced by
/// [`ScoreKernel`](crate::signal::ScoreKernel). Index `j` is a peak when its
/// score is positive and exceeds `mean + threshold * stdev` of the positive
/// scores. One point per score is emitted, at `time[j + window_size]`.
///
/// Fewer than two positive scores make the threshold undefined and yield
/// [`ExecInvariantViolation::DegenerateStatistics`].
pub fn label_peaks<F>(
    time: &[F],
    signal: &[F],
    scores: &[F],
    window_size: usize,
    threshold: F,
) -> Result<Vec<LabeledPoint<F>>, ExecInvariantViolation>
where
    F: Float + Default + Sum,
{
    if signal.len() != time.len() {
        return Err(ExecInvariantViolation::LengthMismatch {
            arg: "signal",
            expected: time.len(),
            got: signal.len(),
        });
    }
    check_window(window_size, time.len()).map_err(ExecInvariantViolation::from)?;
    let expected = time.len() - 2 * window_size;
    if scores.len() != expected {
        return Err(ExecInvariantViolation::LengthMismatch {
            arg: "scores",
            expected,
            got: scores.len(),
        });
    }

    let stats = positive_threshold_stats(scores)?;
    let cutoff = stats.threshold(threshold);
    debug!(
        positive_scores = stats.count,
        mean = stats.mean.to_f64(),
        stdev = stats.stdev.to_f64(),
        cutoff = cutoff.to_f64(),
        "peak score threshold"
    );

    let labeled = scores
        .iter()
        .enumerate()
        .map(|(j, score)| {
            let idx = j + window_size;
            if *score > F::zero() && *score > cutoff {
                LabeledPoint::new(time[idx], signal[idx])
            } else {
                LabeledPoint::baseline(time[idx])
            }
        })
        .collect();
    Ok(labeled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::KernelLifecycle;
    use crate::signal::tests::{demo_time, DEMO_SIGNAL};
    use crate::signal::{PeakScore1D, ScoreConfig, ScoreKernel, ScoreStrategy};

    fn demo_scores() -> Vec<f64> {
        ScoreKernel::try_new(ScoreConfig {
            window_size: 4,
            strategy: ScoreStrategy::MaxDrop,
        })
        .expect("score kernel")
        .run_alloc(&DEMO_SIGNAL)
        .expect("scores")
    }

    #[test]
    fn labels_align_with_signal_indices() {
        let time = demo_time();
        let labeled = label_peaks(&time, &DEMO_SIGNAL, &demo_scores(), 4, 1.5).expect("labels");
        assert_eq!(labeled.len(), DEMO_SIGNAL.len() - 8);
        assert_eq!(labeled[0].time, time[4]);
        assert_eq!(labeled[labeled.len() - 1].time, time[38]);

        let peaks: Vec<_> = labeled.iter().filter(|p| p.is_peak()).collect();
        assert_eq!(
            peaks,
            vec![&LabeledPoint::new(24.0, 5.0), &LabeledPoint::new(35.0, 4.0)]
        );
    }

    #[test]
    fn zero_threshold_keeps_scores_above_mean() {
        let time = demo_time();
        let labeled = label_peaks(&time, &DEMO_SIGNAL, &demo_scores(), 4, 0.0).expect("labels");
        // Scores above the positive mean of ~0.714: 1.5, 1.0, 4.0, 2.0, 1.25, 1.15, 3.0, 2.0, 1.4.
        assert_eq!(labeled.iter().filter(|p| p.is_peak()).count(), 9);
    }

    #[test]
    fn flat_scores_are_degenerate() {
        let time = [1.0f64, 2.0, 3.0, 4.0, 5.0];
        let signal = [1.0f64; 5];
        let scores = [0.0f64; 3];
        assert_eq!(
            label_peaks(&time, &signal, &scores, 1, 1.5),
            Err(ExecInvariantViolation::DegenerateStatistics { positive_scores: 0 })
        );
    }

    #[test]
    fn score_length_must_match_window() {
        let time = demo_time();
        let err = label_peaks(&time, &DEMO_SIGNAL, &[1.0, 2.0], 4, 1.5).expect_err("mismatch");
        assert_eq!(
            err,
            ExecInvariantViolation::LengthMismatch {
                arg: "scores",
                expected: 35,
                got: 2
            }
        );
    }
}
