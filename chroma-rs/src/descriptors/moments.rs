//! Band-broadening central moments over trapezoid-weighted sample pairs.

use itertools::Itertools;
use num_traits::Float;

/// Weighted sums over consecutive sample pairs.
///
/// Returns `(Σ w·m, Σ w)` where `w = s_i + s_{i+1}` and `m` is produced by
/// `f(t_i + t_{i+1})`.
fn pair_sums<F, M>(time: &[F], signal: &[F], f: M) -> (F, F)
where
    F: Float,
    M: Fn(F) -> F,
{
    time.iter()
        .zip(signal.iter())
        .tuple_windows()
        .fold((F::zero(), F::zero()), |(num, den), ((t0, s0), (t1, s1))| {
            let weight = *s0 + *s1;
            (num + weight * f(*t0 + *t1), den + weight)
        })
}

/// First central moment (retention-time centroid).
///
/// `Mu1 = Σ (s_i + s_{i+1})(t_i + t_{i+1}) / (2 Σ (s_i + s_{i+1}))` over
/// consecutive pairs. Returns zero when there are fewer than two samples or
/// the intensity sum is zero. Extra samples in the longer slice are ignored.
///
/// ```
/// use chroma_rs::descriptors::first_moment;
///
/// assert_eq!(first_moment(&[1.0, 3.0], &[5.0, 5.0]), 2.0);
/// assert_eq!(first_moment(&[1.0], &[5.0]), 0.0);
/// ```
pub fn first_moment<F>(time: &[F], signal: &[F]) -> F
where
    F: Float,
{
    let (num, den) = pair_sums(time, signal, |t| t);
    if den == F::zero() {
        return F::zero();
    }
    num / ((F::one() + F::one()) * den)
}

/// Second central moment (band variance) around `mu1`.
///
/// `Mu2 = Σ (s_i + s_{i+1})((t_i + t_{i+1})/2 - Mu1)² / Σ (s_i + s_{i+1})`.
/// When `mu1` is `None` or zero it is computed with [`first_moment`]. Returns
/// zero when the intensity sum is zero.
///
/// ```
/// use chroma_rs::descriptors::second_moment;
///
/// // Equal weights on midpoints 1.5 and 2.5 around 2.0.
/// assert_eq!(second_moment(&[1.0, 2.0, 3.0], &[1.0, 1.0, 1.0], None), 0.25);
/// ```
pub fn second_moment<F>(time: &[F], signal: &[F], mu1: Option<F>) -> F
where
    F: Float,
{
    let mu1 = match mu1 {
        Some(m) if m != F::zero() => m,
        _ => first_moment(time, signal),
    };
    let two = F::one() + F::one();
    let (num, den) = pair_sums(time, signal, |t| {
        let d = t / two - mu1;
        d * d
    });
    if den == F::zero() {
        return F::zero();
    }
    num / den
}
