//! Run-length segmentation of labeled samples into peak regions.

use crate::signal::LabeledPoint;
use num_traits::Float;

/// An ordered run of samples belonging to one peak.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PeakRegion<F> {
    points: Vec<LabeledPoint<F>>,
}

impl<F> PeakRegion<F>
where
    F: Float,
{
    /// Build a region from points, ordered by time.
    pub fn from_points(mut points: Vec<LabeledPoint<F>>) -> Self {
        sort_by_time(&mut points);
        Self { points }
    }

    /// Samples of the region in time order.
    pub fn points(&self) -> &[LabeledPoint<F>] {
        &self.points
    }

    /// Consume the region, returning its samples.
    pub fn into_points(self) -> Vec<LabeledPoint<F>> {
        self.points
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the region holds no samples.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Earliest sample.
    pub fn first(&self) -> Option<&LabeledPoint<F>> {
        self.points.first()
    }

    /// Latest sample.
    pub fn last(&self) -> Option<&LabeledPoint<F>> {
        self.points.last()
    }

    /// Time column.
    pub fn times(&self) -> Vec<F> {
        self.points.iter().map(|p| p.time).collect()
    }

    /// Intensity column.
    pub fn intensities(&self) -> Vec<F> {
        self.points.iter().map(|p| p.intensity).collect()
    }

    /// Most intense sample.
    pub fn apex(&self) -> Option<&LabeledPoint<F>> {
        self.points.iter().reduce(|best, p| {
            if p.intensity > best.intensity {
                p
            } else {
                best
            }
        })
    }
}

pub(crate) fn sort_by_time<F: Float>(points: &mut [LabeledPoint<F>]) {
    points.sort_by(|a, b| {
        a.time
            .partial_cmp(&b.time)
            .unwrap_or(core::cmp::Ordering::Equal)
    });
}

/// Split labeled samples into maximal runs of peak samples.
///
/// A sample with zero intensity closes the open run. A run still open at the
/// end of the input is emitted as the final region. Regions are never empty
/// and never contain a baseline sample.
///
/// ```
/// use chroma_rs::signal::{split_peaks, LabeledPoint};
///
/// let points = [
///     LabeledPoint::new(1.0, 0.0),
///     LabeledPoint::new(2.0, 3.0),
///     LabeledPoint::new(3.0, 4.0),
///     LabeledPoint::new(4.0, 0.0),
///     LabeledPoint::new(5.0, 2.0),
/// ];
/// let regions = split_peaks(&points);
/// assert_eq!(regions.len(), 2);
/// assert_eq!(regions[0].len(), 2);
/// assert_eq!(regions[1].len(), 1);
/// ```
// TODO: merge regions separated by fewer than `window_size` baseline samples.
pub fn split_peaks<F>(points: &[LabeledPoint<F>]) -> Vec<PeakRegion<F>>
where
    F: Float,
{
    points
        .chunk_by(|a, b| a.is_peak() == b.is_peak())
        .filter(|run| run.first().is_some_and(LabeledPoint::is_peak))
        .map(|run| PeakRegion {
            points: run.to_vec(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points(values: &[f64]) -> Vec<LabeledPoint<f64>> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| LabeledPoint::new(i as f64, *v))
            .collect()
    }

    #[test]
    fn trailing_peak_is_flushed() {
        let labeled = points(&[0.0, 2.0, 0.0, 0.0, 1.0, 3.0]);
        let regions = split_peaks(&labeled);
        assert_eq!(regions.len(), 2);
        assert_eq!(
            regions[1].points(),
            &[LabeledPoint::new(4.0, 1.0), LabeledPoint::new(5.0, 3.0)]
        );
    }

    #[test]
    fn all_baseline_yields_nothing() {
        assert!(split_peaks(&points(&[0.0; 6])).is_empty());
        assert!(split_peaks::<f64>(&[]).is_empty());
    }

    #[test]
    fn whole_input_can_be_one_region() {
        let regions = split_peaks(&points(&[1.0, 2.0, 1.0]));
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].len(), 3);
    }

    #[test]
    fn regions_are_non_empty_positive_and_ordered() {
        let labeled = points(&[0.0, 1.0, 0.0, 2.0, 2.5, 0.0, 0.0, 4.0, 0.0, 1.0]);
        let regions = split_peaks(&labeled);
        assert_eq!(regions.len(), 4);
        assert!(regions.iter().all(|r| !r.is_empty()));
        assert!(regions
            .iter()
            .all(|r| r.points().iter().all(LabeledPoint::is_peak)));
        assert!(regions.iter().map(PeakRegion::len).sum::<usize>() <= labeled.len());
        assert!(regions.windows(2).all(|w| {
            let (prev, next) = (&w[0], &w[1]);
            prev.last().map(|p| p.time) < next.first().map(|p| p.time)
        }));
    }

    #[test]
    fn from_points_orders_by_time() {
        let region = PeakRegion::from_points(vec![
            LabeledPoint::new(3.0f64, 1.0),
            LabeledPoint::new(1.0, 2.0),
            LabeledPoint::new(2.0, 5.0),
        ]);
        assert_eq!(region.times(), vec![1.0, 2.0, 3.0]);
        assert_eq!(region.intensities(), vec![2.0, 5.0, 1.0]);
        assert_eq!(region.apex(), Some(&LabeledPoint::new(2.0, 5.0)));
    }
}
