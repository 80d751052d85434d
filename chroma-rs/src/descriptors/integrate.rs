//! Simpson-weighted peak area.

use num_traits::Float;

/// Integrate uniformly spaced `values` with Simpson-style weights.
///
/// Endpoints get weight 1 and interior points alternate 4, 2, 4, ... starting
/// with the second value. The weighted sum is multiplied by `step / 3`.
/// Fewer than two values integrate to zero.
///
/// Samples must be uniformly spaced by `step`; non-uniform data should be
/// resampled first or the area will be wrong.
///
/// ```
/// use chroma_rs::descriptors::integrate;
///
/// assert_eq!(integrate(&[2.0, 2.0, 2.0, 2.0, 2.0], 1.0), 8.0);
/// ```
pub fn integrate<F>(values: &[F], step: F) -> F
where
    F: Float,
{
    let n = values.len();
    if n < 2 {
        return F::zero();
    }
    let two = F::one() + F::one();
    let four = two + two;
    let interior = values[1..n - 1]
        .iter()
        .enumerate()
        .fold(F::zero(), |acc, (j, y)| {
            let weight = if j % 2 == 0 { four } else { two };
            acc + weight * *y
        });
    (values[0] + values[n - 1] + interior) * step / (two + F::one())
}
