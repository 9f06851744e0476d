//! Cross-correlation of real `f32` signals.
//!
//! `sigcorr` correlates a long signal `x` against a short reference `h`,
//!
//! ```text
//! out[n] = Σ_{k=0}^{h.len()-1} x[n + k] · h[k],   n ∈ [0, x.len()),
//! ```
//!
//! with `x` treated as zero past its end. Three strategies are available
//! (a single zero-padded FFT, segmented overlap-save, and direct sliding dot
//! products) plus an adaptive kernel that picks the cheapest one for a given
//! shape. Handles are sized once for a fixed `(x.len(), h.len())` pair and
//! reuse their transform plans and scratch buffers across calls.
//!
//! ```
//! use sigcorr::kernel::HandleLifecycle;
//! use sigcorr::signal::correlate::{CrossCorrelateConfig, CrossCorrelateKernel};
//! use sigcorr::signal::traits::CrossCorrelate1D;
//!
//! let x = [1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
//! let h = [1.0f32, 0.0, -1.0];
//! let mut kernel = CrossCorrelateKernel::try_new(CrossCorrelateConfig::new(x.len(), h.len()))
//!     .expect("valid shape");
//! let out = kernel.run_alloc(&x, &h).expect("lengths match the handle");
//! assert!((out[0] - -2.0).abs() < 1e-5);
//! assert!((out[7] - 8.0).abs() < 1e-5);
//! kernel.finalize();
//! ```

pub mod kernel;
pub mod signal;

/// Elementwise kernels and backend selection, re-exported from `sigcorr-core`.
pub use sigcorr_core::vector;
