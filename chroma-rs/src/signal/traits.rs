//! Trait interfaces for chromatogram analysis capabilities.
//!
//! These traits define the trait-first API shape used by the kernels.

use crate::kernel::{ExecInvariantViolation, Read1D, Write1D};
use crate::signal::PeakRegion;

/// Windowed peak-score capability.
pub trait PeakScore1D<T> {
    /// Score every index in `[k, n - k)` into a caller-provided buffer of length `n - 2k`.
    fn run_into<I, O>(&self, input: &I, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized,
        O: Write1D<T> + ?Sized;

    /// Score every index in `[k, n - k)` and allocate output.
    fn run_alloc<I>(&self, input: &I) -> Result<Vec<T>, ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized;
}

/// Score, label and segment a chromatogram into peak regions.
pub trait PeakDetect1D<T> {
    /// Detect peak regions in paired `time`/`signal` input.
    fn run<I1, I2>(&self, time: &I1, signal: &I2) -> Result<Vec<PeakRegion<T>>, ExecInvariantViolation>
    where
        I1: Read1D<T> + ?Sized,
        I2: Read1D<T> + ?Sized;
}

/// Per-region shape descriptor capability.
pub trait PeakDescribe<T> {
    /// Descriptor record produced for each region.
    type Output;

    /// Describe every region, preserving order.
    fn run(&self, regions: &[PeakRegion<T>]) -> Vec<Self::Output>;
}
