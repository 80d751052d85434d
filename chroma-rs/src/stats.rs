use crate::kernel::ExecInvariantViolation;
use core::{borrow::Borrow, iter::Sum, ops::Add};
use num_traits::{Float, Num, NumCast};

///
/// Compute the mean of the signal, `y`
///
/// Return the mean and the number of points averaged
///
/// ```
/// use approx::assert_relative_eq;
/// use chroma_rs::stats::mean;
///
/// let y: [f64; 5] = [1.,2.,3.,4.,5.];
/// assert_relative_eq!(3f64, mean(y.iter()).0);
///
/// let y: &[f32] = &[];
/// assert_eq!((0f32, 0), mean(y.iter()));
///
/// ```
///
pub fn mean<YI, F>(y: YI) -> (F, usize)
where
    F: Num + NumCast + Default + Copy + Add,
    YI: Iterator,
    YI::Item: Borrow<F>,
{
    let (sum, count) = y.fold(Default::default(), |acc: (F, usize), yi| {
        (acc.0 + *yi.borrow(), acc.1 + 1)
    });
    match F::from(count) {
        Some(n) if count > 0 => (sum / n, count),
        _ => Default::default(),
    }
}

///
/// Compute the Bessel-corrected sample variance of the signal, `y`
///
/// The sum of squared deviations is divided by `n - 1`. With fewer than two
/// points the variance is undefined and `(0, n)` is returned; callers that
/// must distinguish that case inspect the count.
///
/// ```
/// use approx::assert_relative_eq;
/// use chroma_rs::stats::sample_variance;
///
/// let y: [f64; 5] = [1.,2.,3.,4.,5.];
/// assert_relative_eq!(2.5f64, sample_variance(y.iter()).0);
///
/// let y: [f64; 1] = [7.];
/// assert_eq!((0f64, 1), sample_variance(y.iter()));
///
/// ```
///
pub fn sample_variance<YI, F>(y: YI) -> (F, usize)
where
    F: Float + Default + Sum,
    YI: Iterator + Clone,
    YI::Item: Borrow<F>,
{
    let (avg, n) = mean(y.clone());
    if n < 2 {
        return (F::zero(), n);
    }
    let sum: F = y
        .map(|f| {
            let delta = *f.borrow() - avg;
            delta * delta
        })
        .sum::<F>();
    match F::from(n - 1) {
        Some(dof) => (sum / dof, n),
        None => (F::zero(), n),
    }
}

///
/// Compute the Bessel-corrected sample standard deviation of the signal, `y`
///
/// ```
/// use approx::assert_relative_eq;
/// use chroma_rs::stats::sample_stdev;
///
/// let y: [f64; 5] = [1.,2.,3.,4.,5.];
/// assert_relative_eq!(1.58113883008, sample_stdev(y.iter()).0, max_relative = 1e-8);
///
/// ```
pub fn sample_stdev<YI, F>(y: YI) -> (F, usize)
where
    F: Float + Default + Sum,
    YI: Iterator + Clone,
    YI::Item: Borrow<F>,
{
    let (v, n) = sample_variance(y);
    (v.sqrt(), n)
}

/// Mean and sample standard deviation of the strictly positive peak scores.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ThresholdStats<F> {
    /// Mean of the positive scores.
    pub mean: F,
    /// Bessel-corrected standard deviation of the positive scores.
    pub stdev: F,
    /// Number of positive scores.
    pub count: usize,
}

impl<F> ThresholdStats<F>
where
    F: Float,
{
    /// Detection threshold `mean + h * stdev`.
    pub fn threshold(&self, h: F) -> F {
        self.mean + h * self.stdev
    }
}

/// Compute [`ThresholdStats`] over the strictly positive entries of `scores`.
///
/// Zero and negative scores never count as peak evidence and are excluded.
/// Fewer than two positive scores leave the sample standard deviation
/// undefined and are reported as
/// [`ExecInvariantViolation::DegenerateStatistics`].
///
/// ```
/// use approx::assert_relative_eq;
/// use chroma_rs::stats::positive_threshold_stats;
///
/// let scores = [0.0f64, 1.0, -2.0, 3.0];
/// let stats = positive_threshold_stats(&scores).unwrap();
/// assert_eq!(stats.count, 2);
/// assert_relative_eq!(stats.mean, 2.0);
/// assert_relative_eq!(stats.threshold(1.0), 2.0 + 2f64.sqrt());
/// ```
pub fn positive_threshold_stats<F>(scores: &[F]) -> Result<ThresholdStats<F>, ExecInvariantViolation>
where
    F: Float + Default + Sum,
{
    let positive = scores.iter().filter(|s| **s > F::zero());
    let (stdev, count) = sample_stdev(positive.clone());
    if count < 2 {
        return Err(ExecInvariantViolation::DegenerateStatistics {
            positive_scores: count,
        });
    }
    let (mean, _) = mean(positive);
    Ok(ThresholdStats { mean, stdev, count })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn mean_of_empty_is_zero() {
        let y: [f64; 0] = [];
        assert_eq!(mean::<_, f64>(y.iter()), (0.0, 0));
    }

    #[test]
    fn sample_variance_uses_bessel_correction() {
        let y = [2.0f64, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let (v, n) = sample_variance::<_, f64>(y.iter());
        assert_eq!(n, 8);
        assert_relative_eq!(v, 32.0 / 7.0, epsilon = 1e-12);
    }

    #[test]
    fn threshold_stats_ignore_non_positive_scores() {
        let scores = [0.0f64, 0.1, 0.1, 0.2, 0.0, 0.5, 4.0, 0.0];
        let stats = positive_threshold_stats(&scores).expect("stats");
        let reference = [0.1f64, 0.1, 0.2, 0.5, 4.0];
        assert_eq!(stats.count, 5);
        assert_relative_eq!(stats.mean, mean::<_, f64>(reference.iter()).0);
        assert_relative_eq!(stats.stdev, sample_stdev::<_, f64>(reference.iter()).0);
    }

    #[test]
    fn threshold_stats_match_documented_example() {
        // Max-drop scores of the 43-sample demo chromatogram with k = 4.
        let scores = [
            0.0f64, 0.1, 0.1, 0.2, 0.1, 0.0, 0.05, 0.15, 0.35, 0.05, 0.05, 0.05, 0.15, 0.25, 0.0,
            0.5, 0.0, 1.5, 1.0, 4.0, 2.0, 0.55, 0.05, 0.05, 0.05, 0.0, 0.05, 0.05, 1.25, 1.15,
            3.0, 2.0, 1.4, 0.5, 0.0,
        ];
        let stats = positive_threshold_stats(&scores).expect("stats");
        assert_eq!(stats.count, 29);
        assert_relative_eq!(stats.mean, 0.713_793_103_448_275_8, epsilon = 1e-9);
        assert_relative_eq!(stats.stdev, 0.990_030_352_323_688_9, epsilon = 1e-9);
        assert_relative_eq!(stats.threshold(1.5), 2.198_838_631_933_809, epsilon = 1e-9);
    }

    #[test]
    fn degenerate_statistics_are_reported() {
        let flat = [0.0f64; 6];
        assert_eq!(
            positive_threshold_stats(&flat),
            Err(ExecInvariantViolation::DegenerateStatistics { positive_scores: 0 })
        );
        let single = [0.0f64, 3.0, 0.0];
        assert_eq!(
            positive_threshold_stats(&single),
            Err(ExecInvariantViolation::DegenerateStatistics { positive_scores: 1 })
        );
    }
}
