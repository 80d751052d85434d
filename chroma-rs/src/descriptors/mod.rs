//! Per-peak shape descriptors.
//!
//! Central moments describe band broadening: the first moment is the
//! retention-time centroid and the second is the band variance around it.
//! The area is a Simpson-weighted quadrature over the region's intensities.

mod integrate;
mod moments;

pub use integrate::*;
pub use moments::*;

use crate::kernel::{ConfigError, KernelLifecycle};
use crate::signal::{PeakDescribe, PeakRegion};
use num_traits::Float;
use tracing::{trace, warn};

/// Relative tolerance on sample spacing for a region to count as uniform.
const UNIFORM_STEP_TOLERANCE: f64 = 1e-9;

/// Descriptor set for one peak region.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PeakDescriptors<F> {
    /// First central moment (centroid).
    pub mu1: F,
    /// Second central moment (band variance).
    pub mu2: F,
    /// Integrated area.
    pub area: F,
}

impl<F> PeakRegion<F>
where
    F: Float,
{
    /// First central moment of the region. See [`first_moment`].
    pub fn first_moment(&self) -> F {
        first_moment(&self.times(), &self.intensities())
    }

    /// Second central moment of the region. See [`second_moment`].
    pub fn second_moment(&self, mu1: Option<F>) -> F {
        second_moment(&self.times(), &self.intensities(), mu1)
    }

    /// Area under the region with uniform time `step`. See [`integrate`].
    pub fn area(&self, step: F) -> F {
        integrate(&self.intensities(), step)
    }

    /// Spacing between the first two samples.
    pub fn sample_step(&self) -> Option<F> {
        match self.points() {
            [a, b, ..] => Some(b.time - a.time),
            _ => None,
        }
    }

    /// Whether all consecutive samples share the same spacing.
    pub fn is_uniformly_spaced(&self) -> bool {
        let Some(step) = self.sample_step() else {
            return true;
        };
        let tol = F::from(UNIFORM_STEP_TOLERANCE).unwrap_or_else(F::epsilon) * step.abs();
        self.points()
            .windows(2)
            .all(|w| ((w[1].time - w[0].time) - step).abs() <= tol)
    }

    /// Compute all descriptors.
    ///
    /// `step` defaults to [`sample_step`](Self::sample_step). Single-sample
    /// regions describe as all zeros.
    pub fn describe(&self, step: Option<F>) -> PeakDescriptors<F> {
        let times = self.times();
        let intensities = self.intensities();
        let step = step.or_else(|| self.sample_step()).unwrap_or_else(F::zero);
        if !self.is_uniformly_spaced() {
            warn!(
                samples = self.len(),
                "peak region is not uniformly spaced, area is approximate"
            );
        }
        let mu1 = first_moment(&times, &intensities);
        let descriptors = PeakDescriptors {
            mu1,
            mu2: second_moment(&times, &intensities, Some(mu1)),
            area: integrate(&intensities, step),
        };
        trace!(
            samples = self.len(),
            mu1 = descriptors.mu1.to_f64(),
            mu2 = descriptors.mu2.to_f64(),
            area = descriptors.area.to_f64(),
            "described peak region"
        );
        descriptors
    }
}

/// Constructor config for [`DescriptorKernel`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DescriptorConfig<F> {
    /// Uniform time step for the area. `None` uses each region's own spacing.
    pub step: Option<F>,
}

/// Trait-first descriptor kernel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DescriptorKernel<F> {
    step: Option<F>,
}

impl<F> DescriptorKernel<F>
where
    F: Float,
{
    /// Return configured step.
    pub fn step(&self) -> Option<F> {
        self.step
    }
}

impl<F> KernelLifecycle for DescriptorKernel<F>
where
    F: Float,
{
    type Config = DescriptorConfig<F>;

    fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
        if let Some(step) = config.step {
            if !step.is_finite() || step <= F::zero() {
                return Err(ConfigError::InvalidArgument {
                    arg: "step",
                    reason: "step must be finite and positive",
                });
            }
        }
        Ok(Self { step: config.step })
    }
}

impl<F> PeakDescribe<F> for DescriptorKernel<F>
where
    F: Float,
{
    type Output = PeakDescriptors<F>;

    fn run(&self, regions: &[PeakRegion<F>]) -> Vec<Self::Output> {
        regions.iter().map(|r| r.describe(self.step)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::LabeledPoint;
    use approx::assert_relative_eq;

    fn region(time: &[f64], signal: &[f64]) -> PeakRegion<f64> {
        PeakRegion::from_points(
            time.iter()
                .zip(signal.iter())
                .map(|(t, s)| LabeledPoint::new(*t, *s))
                .collect(),
        )
    }

    #[test]
    fn describes_extended_demo_peak() {
        let r = region(&[22.0, 23.0, 24.0, 25.0, 26.0], &[3.0, 2.0, 5.0, 3.0, 2.0]);
        let d = r.describe(None);
        assert_relative_eq!(d.mu1, 24.02, epsilon = 1e-12);
        assert_relative_eq!(d.mu2, 1.0496, epsilon = 1e-12);
        assert_relative_eq!(d.area, 35.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(r.first_moment(), d.mu1);
        assert_relative_eq!(r.second_moment(None), d.mu2);
        assert_relative_eq!(r.area(1.0), d.area);
    }

    #[test]
    fn single_sample_region_is_all_zero() {
        let r = region(&[24.0], &[5.0]);
        assert_eq!(
            r.describe(None),
            PeakDescriptors {
                mu1: 0.0,
                mu2: 0.0,
                area: 0.0
            }
        );
    }

    #[test]
    fn spacing_checks() {
        let uniform = region(&[0.0, 0.5, 1.0, 1.5], &[1.0, 2.0, 2.0, 1.0]);
        assert_eq!(uniform.sample_step(), Some(0.5));
        assert!(uniform.is_uniformly_spaced());

        let ragged = region(&[0.0, 0.5, 1.5], &[1.0, 2.0, 1.0]);
        assert!(!ragged.is_uniformly_spaced());
        assert_eq!(region(&[1.0], &[1.0]).sample_step(), None);
    }

    #[test]
    fn kernel_describes_regions_in_order() {
        let kernel = DescriptorKernel::try_new(DescriptorConfig { step: Some(0.5) }).expect("kernel");
        let regions = vec![
            region(&[0.0, 0.5, 1.0], &[1.0, 1.0, 1.0]),
            region(&[4.0, 4.5, 5.0], &[0.0, 2.0, 0.0]),
        ];
        let out = kernel.run(&regions);
        assert_eq!(out.len(), 2);
        assert_relative_eq!(out[0].mu1, 0.5, epsilon = 1e-12);
        assert_relative_eq!(out[0].area, 1.0, epsilon = 1e-12);
        assert_relative_eq!(out[1].mu1, 4.5, epsilon = 1e-12);
        assert_relative_eq!(out[1].area, 8.0 * 0.5 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn kernel_rejects_bad_step() {
        for step in [0.0f64, -1.0, f64::NAN, f64::INFINITY] {
            assert!(DescriptorKernel::try_new(DescriptorConfig { step: Some(step) }).is_err());
        }
        assert!(DescriptorKernel::<f64>::try_new(DescriptorConfig::default()).is_ok());
    }
}
