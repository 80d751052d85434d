//! Windowed local-asymmetry scores.
//!
//! Every score looks at `x[i]` against its `k` left neighbours and its `k` right
//! neighbours. Callers must keep `k <= i < x.len() - k`; out-of-window indices panic.

use crate::kernel::{check_window, ConfigError, ExecInvariantViolation, KernelLifecycle, Read1D, Write1D};
use crate::signal::traits::PeakScore1D;
use num_traits::Float;

/// Selects the score function used by detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ScoreStrategy {
    /// Mean of the largest left drop and the largest right drop. See [`max_drop`].
    #[default]
    MaxDrop,
    /// Average drop with the right-window quirk. See [`average_drop`].
    AverageDrop,
    /// Distance to the neighbour means with the right-window quirk. See [`mean_reference`].
    MeanReference,
    /// Distance to both full neighbour means. See [`windowed_mean`].
    WindowedMean,
}

impl ScoreStrategy {
    /// Score index `i` of `x` with half-width `k`.
    pub fn score<F>(&self, x: &[F], i: usize, k: usize) -> F
    where
        F: Float,
    {
        match self {
            ScoreStrategy::MaxDrop => max_drop(x, i, k),
            ScoreStrategy::AverageDrop => average_drop(x, i, k),
            ScoreStrategy::MeanReference => mean_reference(x, i, k),
            ScoreStrategy::WindowedMean => windowed_mean(x, i, k),
        }
    }
}

fn two<F: Float>() -> F {
    F::one() + F::one()
}

fn window_len<F: Float>(k: usize) -> F {
    F::from(k).unwrap_or_else(F::one)
}

/// Max-drop score.
///
/// `left = max(0, max_j x[i] - x[i-j])`, `right = max(0, max_j x[i] - x[i+j])`
/// for `j` in `1..=k`, score is `(left + right) / 2`. Never negative.
///
/// ```
/// use chroma_rs::signal::max_drop;
///
/// let x = [1.0f64, 2.0, 5.0, 3.0, 1.0];
/// assert_eq!(max_drop(&x, 2, 2), 4.0);
/// ```
pub fn max_drop<F>(x: &[F], i: usize, k: usize) -> F
where
    F: Float,
{
    let center = x[i];
    let left = (1..=k).fold(F::zero(), |acc, j| acc.max(center - x[i - j]));
    let right = (1..=k).fold(F::zero(), |acc, j| acc.max(center - x[i + j]));
    (left + right) / two()
}

/// Average-drop score.
///
/// The left side averages `x[i] - x[i-j]` over the window. The right side keeps
/// only the outermost term, `(x[i] - x[i+k]) / k`, instead of a windowed average.
/// That asymmetry is kept for compatibility with existing results; use
/// [`windowed_mean`] for the symmetric form.
pub fn average_drop<F>(x: &[F], i: usize, k: usize) -> F
where
    F: Float,
{
    let center = x[i];
    let n = window_len::<F>(k);
    let left = (1..=k).fold(F::zero(), |acc, j| acc + (center - x[i - j])) / n;
    let right = (center - x[i + k]) / n;
    (left + right) / two()
}

/// Mean-reference score.
///
/// The left side is `x[i] - mean(x[i-k..i])`. The right side is
/// `x[i] - x[i+k] / k`, the same outermost-term quirk as [`average_drop`].
pub fn mean_reference<F>(x: &[F], i: usize, k: usize) -> F
where
    F: Float,
{
    let center = x[i];
    let n = window_len::<F>(k);
    let left = center - (1..=k).fold(F::zero(), |acc, j| acc + x[i - j]) / n;
    let right = center - x[i + k] / n;
    (left + right) / two()
}

/// Symmetric windowed-mean score.
///
/// `((x[i] - mean(left window)) + (x[i] - mean(right window))) / 2`.
///
/// ```
/// use chroma_rs::signal::windowed_mean;
///
/// let x = [1.0f64, 3.0, 5.0, 3.0, 1.0];
/// assert_eq!(windowed_mean(&x, 2, 2), 3.0);
/// ```
pub fn windowed_mean<F>(x: &[F], i: usize, k: usize) -> F
where
    F: Float,
{
    let center = x[i];
    let n = window_len::<F>(k);
    let left = (1..=k).fold(F::zero(), |acc, j| acc + x[i - j]) / n;
    let right = (1..=k).fold(F::zero(), |acc, j| acc + x[i + j]) / n;
    ((center - left) + (center - right)) / two()
}

/// Constructor config for [`ScoreKernel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreConfig {
    /// Half-width `k` of the neighbourhood.
    pub window_size: usize,
    /// Score function.
    pub strategy: ScoreStrategy,
}

/// Trait-first windowed score kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreKernel {
    window_size: usize,
    strategy: ScoreStrategy,
}

impl ScoreKernel {
    /// Return configured half-width.
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Return configured score function.
    pub fn strategy(&self) -> ScoreStrategy {
        self.strategy
    }

    fn scores<'a, F>(&'a self, x: &'a [F]) -> impl Iterator<Item = F> + 'a
    where
        F: Float,
    {
        let k = self.window_size;
        (k..x.len() - k).map(move |i| self.strategy.score(x, i, k))
    }
}

impl KernelLifecycle for ScoreKernel {
    type Config = ScoreConfig;

    fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
        if config.window_size == 0 {
            return Err(ConfigError::InvalidArgument {
                arg: "window_size",
                reason: "window size must be at least 1",
            });
        }
        Ok(Self {
            window_size: config.window_size,
            strategy: config.strategy,
        })
    }
}

impl<F> PeakScore1D<F> for ScoreKernel
where
    F: Float,
{
    fn run_into<I, O>(&self, input: &I, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<F> + ?Sized,
        O: Write1D<F> + ?Sized,
    {
        let input = input.read_slice().map_err(ExecInvariantViolation::from)?;
        check_window(self.window_size, input.len()).map_err(ExecInvariantViolation::from)?;
        let out = out
            .write_slice_mut()
            .map_err(ExecInvariantViolation::from)?;
        let expected = input.len() - 2 * self.window_size;
        if out.len() != expected {
            return Err(ExecInvariantViolation::LengthMismatch {
                arg: "out",
                expected,
                got: out.len(),
            });
        }
        out.iter_mut()
            .zip(self.scores(input))
            .for_each(|(out, score)| *out = score);
        Ok(())
    }

    fn run_alloc<I>(&self, input: &I) -> Result<Vec<F>, ExecInvariantViolation>
    where
        I: Read1D<F> + ?Sized,
    {
        let input = input.read_slice().map_err(ExecInvariantViolation::from)?;
        check_window(self.window_size, input.len()).map_err(ExecInvariantViolation::from)?;
        Ok(self.scores(input).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::tests::DEMO_SIGNAL;
    use approx::assert_relative_eq;

    const DEMO_MAX_DROP: [f64; 35] = [
        0.0, 0.1, 0.1, 0.2, 0.1, 0.0, 0.05, 0.15, 0.35, 0.05, 0.05, 0.05, 0.15, 0.25, 0.0, 0.5,
        0.0, 1.5, 1.0, 4.0, 2.0, 0.55, 0.05, 0.05, 0.05, 0.0, 0.05, 0.05, 1.25, 1.15, 3.0, 2.0,
        1.4, 0.5, 0.0,
    ];

    #[test]
    fn max_drop_scores_demo_chromatogram() {
        let kernel = ScoreKernel::try_new(ScoreConfig {
            window_size: 4,
            strategy: ScoreStrategy::MaxDrop,
        })
        .expect("score kernel");
        let scores: Vec<f64> = kernel.run_alloc(&DEMO_SIGNAL).expect("scores");
        assert_eq!(scores.len(), DEMO_SIGNAL.len() - 8);
        scores
            .iter()
            .zip(DEMO_MAX_DROP.iter())
            .for_each(|(a, b)| assert_relative_eq!(*a, *b, epsilon = 1e-12));
    }

    #[test]
    fn max_drop_is_never_negative() {
        let valley = [3.0f64, 2.0, 1.0, 2.0, 3.0];
        assert_eq!(max_drop(&valley, 2, 2), 0.0);
    }

    #[test]
    fn quirky_variants_keep_outermost_right_term() {
        let expected_average = [-0.35, 1.0375, 0.3125, 2.0625];
        let expected_reference = [0.025, 2.1625, 1.0625, 3.9375];
        for (offset, i) in (20..24).enumerate() {
            assert_relative_eq!(
                average_drop(&DEMO_SIGNAL, i, 4),
                expected_average[offset],
                epsilon = 1e-12
            );
            assert_relative_eq!(
                mean_reference(&DEMO_SIGNAL, i, 4),
                expected_reference[offset],
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn averaged_scores_divide_by_window_in_f32() {
        let x = [1.0f32, 1.0, 1.0, 4.0, 2.0, 1.0, 1.0];
        assert_relative_eq!(window_len::<f32>(3), 3.0f32);
        assert_relative_eq!(windowed_mean(&x, 3, 3), 17.0f32 / 6.0, epsilon = 1e-6);
        assert_relative_eq!(average_drop(&x, 3, 3), 2.0f32, epsilon = 1e-6);
    }

    #[test]
    fn windowed_mean_averages_both_sides() {
        // Left neighbours 1.5, 1, 3, 2 and right neighbours 3, 2, 1, 1 around 5.0.
        assert_relative_eq!(windowed_mean(&DEMO_SIGNAL, 23, 4), 3.1875, epsilon = 1e-12);
        assert_relative_eq!(
            ScoreStrategy::WindowedMean.score(&DEMO_SIGNAL, 23, 4),
            3.1875,
            epsilon = 1e-12
        );
    }

    #[test]
    fn strategies_dispatch_to_their_score_function() {
        let x = [0.0f64, 1.0, 4.0, 2.0, 1.0];
        assert_eq!(ScoreStrategy::default(), ScoreStrategy::MaxDrop);
        assert_relative_eq!(ScoreStrategy::MaxDrop.score(&x, 2, 2), 3.5);
        assert_relative_eq!(ScoreStrategy::AverageDrop.score(&x, 2, 2), 2.5);
        assert_relative_eq!(ScoreStrategy::MeanReference.score(&x, 2, 2), 3.5);
    }

    #[test]
    fn run_into_validates_output_length() {
        let kernel = ScoreKernel::try_new(ScoreConfig {
            window_size: 4,
            strategy: ScoreStrategy::MaxDrop,
        })
        .expect("score kernel");
        let mut out = vec![0.0f64; 3];
        let err = kernel
            .run_into(&DEMO_SIGNAL, &mut out)
            .expect_err("length mismatch should fail");
        assert_eq!(
            err,
            ExecInvariantViolation::LengthMismatch {
                arg: "out",
                expected: 35,
                got: 3
            }
        );
    }

    #[test]
    fn oversized_window_is_rejected() {
        let kernel = ScoreKernel::try_new(ScoreConfig {
            window_size: 3,
            strategy: ScoreStrategy::MaxDrop,
        })
        .expect("score kernel");
        let short = [1.0f64, 2.0, 3.0, 2.0, 1.0, 0.0];
        let err = PeakScore1D::<f64>::run_alloc(&kernel, &short[..]).expect_err("window too large");
        assert!(matches!(
            err,
            ExecInvariantViolation::Config(ConfigError::InvalidArgument {
                arg: "window_size",
                ..
            })
        ));
        assert!(ScoreKernel::try_new(ScoreConfig {
            window_size: 0,
            strategy: ScoreStrategy::MaxDrop,
        })
        .is_err());
    }
}
