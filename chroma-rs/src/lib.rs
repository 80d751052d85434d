//! Chromatogram peak detection and band-broadening descriptors.
//!
//! A chromatogram is a time-ordered series of detector intensities. This crate
//! finds peaks with a windowed local-extremum score, splits the signal into
//! contiguous peak regions and describes each region by its central moments and
//! integrated area.
//!
//! ```
//! use chroma_rs::signal::{detect_peaks, extend_left, extend_right, Chromatogram, PeakDetectConfig};
//!
//! let time: Vec<f64> = (1..=43).map(f64::from).collect();
//! let signal = [
//!     1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.1, 1.0, 0.8, 0.9, 1.0, 1.2, 0.9, 1.0, 1.0, 1.1, 1.2,
//!     1.0, 1.5, 1.0, 3.0, 2.0, 5.0, 3.0, 2.0, 1.0, 1.0, 1.0, 0.9, 1.0, 1.0, 3.0, 2.6, 4.0, 3.0,
//!     3.2, 2.0, 1.0, 1.0, 1.0, 1.0, 1.0,
//! ];
//! let config = PeakDetectConfig { window_size: 4, threshold: 1.5, ..Default::default() };
//! let regions = detect_peaks(&time, &signal, &config).unwrap();
//! assert_eq!(regions.len(), 2);
//!
//! let chrom = Chromatogram::try_new(&time, &signal).unwrap();
//! let band = extend_right(&chrom, &extend_left(&chrom, &regions[0], 2), 2);
//! let d = band.describe(None);
//! assert!((d.mu1 - 24.02).abs() < 1e-9);
//! ```

pub mod descriptors;
pub mod error;
pub mod kernel;
pub mod signal;
pub mod stats;

pub use error::Error;
