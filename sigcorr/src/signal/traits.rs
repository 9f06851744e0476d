//! Trait interfaces for signal-processing capabilities.
//!
//! Kernels are built once through [`crate::kernel::HandleLifecycle`] and then
//! driven through the capability traits below.

use crate::kernel::{ExecInvariantViolation, Samples, SamplesMut};

/// Cross-correlation of a long signal `x` against a short reference `h`.
///
/// Every implementation produces `x.len()` samples
/// `out[n] = Σ_k x[n + k] · h[k]` with `x` treated as zero past its end.
pub trait CrossCorrelate1D {
    /// Correlate into a caller-provided output buffer.
    fn run_into<X, H, O>(&mut self, x: &X, h: &H, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        X: Samples<f32> + ?Sized,
        H: Samples<f32> + ?Sized,
        O: SamplesMut<f32> + ?Sized;

    /// Correlate and overwrite `x` with the result.
    fn run_in_place<X, H>(&mut self, x: &mut X, h: &H) -> Result<(), ExecInvariantViolation>
    where
        X: SamplesMut<f32> + ?Sized,
        H: Samples<f32> + ?Sized;

    /// Correlate and allocate the output.
    fn run_alloc<X, H>(&mut self, x: &X, h: &H) -> Result<Vec<f32>, ExecInvariantViolation>
    where
        X: Samples<f32> + ?Sized,
        H: Samples<f32> + ?Sized,
    {
        let x = x.samples().map_err(ExecInvariantViolation::from)?;
        let mut out = vec![0.0f32; x.len()];
        self.run_into(x, h, out.as_mut_slice())?;
        Ok(out)
    }
}
