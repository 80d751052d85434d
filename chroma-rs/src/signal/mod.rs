//! Peak detection over chromatogram signals.
//!
//! The pipeline runs in four forward stages, each producing a new sequence:
//!
//! 1. [`score`]: windowed local-asymmetry score per sample.
//! 2. [`label`]: threshold the scores at `mean + h * stdev` of the positive ones.
//! 3. [`segment`]: group consecutive peak samples into [`PeakRegion`]s.
//! 4. [`crate::descriptors`]: moments and area per region.
//!
//! [`detect_peaks`] runs stages 1 to 3. [`extend_left`] and [`extend_right`]
//! widen a detected region with neighbouring raw samples.

mod chromatogram;
mod extend;
pub mod label;
mod peak;
pub mod score;
pub mod segment;
pub mod traits;

pub use chromatogram::*;
pub use extend::*;
pub use label::*;
pub use peak::*;
pub use score::*;
pub use segment::*;
pub use traits::*;
