//! Widening peak regions with neighbouring raw samples.
//!
//! Both operations return a new region and leave the input untouched. The
//! added samples carry raw intensities from the chromatogram, so an extended
//! region may contain baseline-level values.

use crate::signal::{Chromatogram, LabeledPoint, PeakRegion};
use num_traits::Float;
use tracing::debug;

/// Prepend up to `npnt` raw samples preceding the region's first point.
///
/// The region's first time stamp is located in `chrom` within
/// [`TIME_MATCH_TOLERANCE`](crate::signal::TIME_MATCH_TOLERANCE). The start index is
/// clamped at zero. If the time cannot be located the region is returned unchanged.
///
/// ```
/// use chroma_rs::signal::{extend_left, Chromatogram, LabeledPoint, PeakRegion};
///
/// let time = [1.0, 2.0, 3.0, 4.0];
/// let signal = [0.5, 1.0, 4.0, 1.0];
/// let chrom = Chromatogram::try_new(&time, &signal).unwrap();
/// let region = PeakRegion::from_points(vec![LabeledPoint::new(3.0, 4.0)]);
///
/// let wider = extend_left(&chrom, &region, 5);
/// assert_eq!(wider.times(), vec![1.0, 2.0, 3.0]);
/// ```
pub fn extend_left<F>(chrom: &Chromatogram<'_, F>, region: &PeakRegion<F>, npnt: usize) -> PeakRegion<F>
where
    F: Float,
{
    let Some(start) = anchor(chrom, region.first(), npnt) else {
        return region.clone();
    };
    let from = start.saturating_sub(npnt);
    let mut points: Vec<LabeledPoint<F>> = (from..start).filter_map(|i| chrom.point(i)).collect();
    points.extend_from_slice(region.points());
    PeakRegion::from_points(points)
}

/// Append up to `npnt` raw samples following the region's last point.
///
/// The end index is clamped at the last sample of `chrom`. If the time cannot
/// be located the region is returned unchanged.
///
/// ```
/// use chroma_rs::signal::{extend_right, Chromatogram, LabeledPoint, PeakRegion};
///
/// let time = [1.0, 2.0, 3.0, 4.0];
/// let signal = [0.5, 1.0, 4.0, 1.0];
/// let chrom = Chromatogram::try_new(&time, &signal).unwrap();
/// let region = PeakRegion::from_points(vec![LabeledPoint::new(3.0, 4.0)]);
///
/// let wider = extend_right(&chrom, &region, 5);
/// assert_eq!(wider.times(), vec![3.0, 4.0]);
/// ```
pub fn extend_right<F>(chrom: &Chromatogram<'_, F>, region: &PeakRegion<F>, npnt: usize) -> PeakRegion<F>
where
    F: Float,
{
    let Some(end) = anchor(chrom, region.last(), npnt) else {
        return region.clone();
    };
    let to = end.saturating_add(npnt).min(chrom.len() - 1);
    let mut points = region.points().to_vec();
    points.extend((end + 1..=to).filter_map(|i| chrom.point(i)));
    PeakRegion::from_points(points)
}

fn anchor<F>(chrom: &Chromatogram<'_, F>, edge: Option<&LabeledPoint<F>>, npnt: usize) -> Option<usize>
where
    F: Float,
{
    if npnt == 0 {
        return None;
    }
    let edge = edge?;
    let index = chrom.index_of_time(edge.time);
    if index.is_none() {
        debug!(
            time = edge.time.to_f64(),
            "region edge not found in chromatogram, leaving region unchanged"
        );
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIME: [f64; 8] = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
    const SIGNAL: [f64; 8] = [1.0, 1.0, 2.0, 5.0, 3.0, 1.0, 1.0, 1.0];

    fn apex_region() -> PeakRegion<f64> {
        PeakRegion::from_points(vec![LabeledPoint::new(4.0, 5.0), LabeledPoint::new(5.0, 3.0)])
    }

    #[test]
    fn zero_points_is_a_no_op() {
        let chrom = Chromatogram::try_new(&TIME, &SIGNAL).expect("chromatogram");
        let region = apex_region();
        assert_eq!(extend_left(&chrom, &region, 0), region);
        assert_eq!(extend_right(&chrom, &region, 0), region);
    }

    #[test]
    fn extends_both_sides_with_raw_samples() {
        let chrom = Chromatogram::try_new(&TIME, &SIGNAL).expect("chromatogram");
        let region = apex_region();
        let wider = extend_right(&chrom, &extend_left(&chrom, &region, 2), 2);
        assert_eq!(wider.times(), vec![2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        assert_eq!(wider.intensities(), vec![1.0, 2.0, 5.0, 3.0, 1.0, 1.0]);
        // The caller's region is left as it was.
        assert_eq!(region.len(), 2);
    }

    #[test]
    fn extension_is_clamped_to_bounds() {
        let chrom = Chromatogram::try_new(&TIME, &SIGNAL).expect("chromatogram");
        let region = apex_region();
        assert_eq!(extend_left(&chrom, &region, 100).first().map(|p| p.time), Some(1.0));
        assert_eq!(extend_right(&chrom, &region, 100).last().map(|p| p.time), Some(8.0));
        assert_eq!(extend_left(&chrom, &region, 100).len(), 5);
        assert_eq!(extend_right(&chrom, &region, 100).len(), 5);
    }

    #[test]
    fn unknown_edge_time_leaves_region_unchanged() {
        let chrom = Chromatogram::try_new(&TIME, &SIGNAL).expect("chromatogram");
        let region = PeakRegion::from_points(vec![LabeledPoint::new(4.5, 5.0)]);
        assert_eq!(extend_left(&chrom, &region, 2), region);
        assert_eq!(extend_right(&chrom, &region, 2), region);
    }
}
