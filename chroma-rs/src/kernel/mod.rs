//! Shared trait-first kernel substrate.
//!
//! This module defines reusable interfaces for constructor validation and
//! 1D buffer adapters used by the scoring, labeling and descriptor kernels.

mod errors;
mod io;
mod lifecycle;

pub use errors::*;
pub use io::*;
pub use lifecycle::KernelLifecycle;

pub(crate) use lifecycle::check_window;
