//! Cross-correlation of a long signal against a short reference.
//!
//! Three strategies compute the same `x.len()` output samples:
//!
//! - [`FftCorrelateKernel`]: one zero-padded transform pair, best when the
//!   reference is a sizeable fraction of the signal.
//! - [`OverlapSaveKernel`]: short segmented transforms, best for long signals
//!   and moderate references.
//! - [`DirectCorrelateKernel`] / [`cross_correlate_simd`]: sliding dot
//!   products, best for short references.
//!
//! [`CrossCorrelateKernel`] picks one of them with a [`CostModel`]. Each
//! strategy is also exposed as a free-function triple
//! (`*_initialize`, compute, `*_finalize`) over plain slices.

macro_rules! impl_cross_correlate {
    ($kernel:ty) => {
        impl $crate::signal::traits::CrossCorrelate1D for $kernel {
            fn run_into<X, H, O>(
                &mut self,
                x: &X,
                h: &H,
                out: &mut O,
            ) -> Result<(), $crate::kernel::ExecInvariantViolation>
            where
                X: $crate::kernel::Samples<f32> + ?Sized,
                H: $crate::kernel::Samples<f32> + ?Sized,
                O: $crate::kernel::SamplesMut<f32> + ?Sized,
            {
                let (io, h) = $crate::signal::correlate::bind_into(self.shape(), x, h, out)?;
                self.process(io, h);
                Ok(())
            }

            fn run_in_place<X, H>(
                &mut self,
                x: &mut X,
                h: &H,
            ) -> Result<(), $crate::kernel::ExecInvariantViolation>
            where
                X: $crate::kernel::SamplesMut<f32> + ?Sized,
                H: $crate::kernel::Samples<f32> + ?Sized,
            {
                let (io, h) = $crate::signal::correlate::bind_in_place(self.shape(), x, h)?;
                self.process(io, h);
                Ok(())
            }
        }
    };
}
pub(crate) use impl_cross_correlate;

pub mod direct;
pub mod dispatch;
pub mod fft;
pub mod overlap_save;
mod plan;
mod shape;

pub use direct::{
    cross_correlate_simd, cross_correlate_simd_in_place, DirectCorrelateConfig,
    DirectCorrelateKernel,
};
pub use dispatch::{CostModel, CrossCorrelateConfig, CrossCorrelateKernel, Strategy};
pub use fft::{FftCorrelateConfig, FftCorrelateKernel};
pub use overlap_save::{OverlapSaveConfig, OverlapSaveKernel, DEFAULT_SEGMENT_FACTOR};
pub use shape::SignalShape;

use crate::kernel::{ConfigError, ExecInvariantViolation, HandleLifecycle, Samples, SamplesMut};
use crate::signal::traits::CrossCorrelate1D;

/// Input and output of one call, either as two buffers or as one buffer
/// that is read and then overwritten.
pub(crate) enum SignalIo<'a> {
    Split { x: &'a [f32], out: &'a mut [f32] },
    InPlace(&'a mut [f32]),
}

impl SignalIo<'_> {
    pub(crate) fn input(&self) -> &[f32] {
        match self {
            SignalIo::Split { x, .. } => *x,
            SignalIo::InPlace(buf) => &**buf,
        }
    }

    pub(crate) fn output(&mut self) -> &mut [f32] {
        match self {
            SignalIo::Split { out, .. } => &mut **out,
            SignalIo::InPlace(buf) => &mut **buf,
        }
    }
}

pub(crate) fn bind_into<'a, X, H, O>(
    shape: SignalShape,
    x: &'a X,
    h: &'a H,
    out: &'a mut O,
) -> Result<(SignalIo<'a>, &'a [f32]), ExecInvariantViolation>
where
    X: Samples<f32> + ?Sized,
    H: Samples<f32> + ?Sized,
    O: SamplesMut<f32> + ?Sized,
{
    let x = x.samples()?;
    let h = h.samples()?;
    let out = out.samples_mut()?;
    shape.check(x.len(), h.len(), out.len())?;
    Ok((SignalIo::Split { x, out }, h))
}

pub(crate) fn bind_in_place<'a, X, H>(
    shape: SignalShape,
    x: &'a mut X,
    h: &'a H,
) -> Result<(SignalIo<'a>, &'a [f32]), ExecInvariantViolation>
where
    X: SamplesMut<f32> + ?Sized,
    H: Samples<f32> + ?Sized,
{
    let x = x.samples_mut()?;
    let h = h.samples()?;
    shape.check(x.len(), h.len(), x.len())?;
    Ok((SignalIo::InPlace(x), h))
}

/// Build an FFT correlation handle for `(x_len, h_len)` on the detected backend.
pub fn cross_correlate_fft_initialize(
    x_len: usize,
    h_len: usize,
) -> Result<FftCorrelateKernel, ConfigError> {
    FftCorrelateKernel::try_new(FftCorrelateConfig::new(x_len, h_len))
}

/// Correlate `x` against `h` into `result` with an FFT handle.
pub fn cross_correlate_fft(
    handle: &mut FftCorrelateKernel,
    x: &[f32],
    h: &[f32],
    result: &mut [f32],
) -> Result<(), ExecInvariantViolation> {
    handle.run_into(x, h, result)
}

/// [`cross_correlate_fft`] writing the result over `x`.
pub fn cross_correlate_fft_in_place(
    handle: &mut FftCorrelateKernel,
    x: &mut [f32],
    h: &[f32],
) -> Result<(), ExecInvariantViolation> {
    handle.run_in_place(x, h)
}

/// Release an FFT handle.
pub fn cross_correlate_fft_finalize(handle: FftCorrelateKernel) {
    handle.finalize();
}

/// Build an overlap-save handle with the default segment factor.
pub fn cross_correlate_overlap_save_initialize(
    x_len: usize,
    h_len: usize,
) -> Result<OverlapSaveKernel, ConfigError> {
    OverlapSaveKernel::try_new(OverlapSaveConfig::new(x_len, h_len))
}

/// Correlate `x` against `h` into `result` with an overlap-save handle.
pub fn cross_correlate_overlap_save(
    handle: &mut OverlapSaveKernel,
    x: &[f32],
    h: &[f32],
    result: &mut [f32],
) -> Result<(), ExecInvariantViolation> {
    handle.run_into(x, h, result)
}

/// [`cross_correlate_overlap_save`] writing the result over `x`.
pub fn cross_correlate_overlap_save_in_place(
    handle: &mut OverlapSaveKernel,
    x: &mut [f32],
    h: &[f32],
) -> Result<(), ExecInvariantViolation> {
    handle.run_in_place(x, h)
}

/// Release an overlap-save handle.
pub fn cross_correlate_overlap_save_finalize(handle: OverlapSaveKernel) {
    handle.finalize();
}

/// Build an adaptive handle, selecting the cheapest strategy for the shape.
pub fn cross_correlate_initialize(
    x_len: usize,
    h_len: usize,
) -> Result<CrossCorrelateKernel, ConfigError> {
    CrossCorrelateKernel::try_new(CrossCorrelateConfig::new(x_len, h_len))
}

/// Correlate `x` against `h` into `result` with an adaptive handle.
pub fn cross_correlate(
    handle: &mut CrossCorrelateKernel,
    x: &[f32],
    h: &[f32],
    result: &mut [f32],
) -> Result<(), ExecInvariantViolation> {
    handle.run_into(x, h, result)
}

/// [`cross_correlate`] writing the result over `x`.
pub fn cross_correlate_in_place(
    handle: &mut CrossCorrelateKernel,
    x: &mut [f32],
    h: &[f32],
) -> Result<(), ExecInvariantViolation> {
    handle.run_in_place(x, h)
}

/// Release an adaptive handle and the strategy it holds.
pub fn cross_correlate_finalize(handle: CrossCorrelateKernel) {
    handle.finalize();
}


#[cfg(test)]
mod tests {
    use super::testing::{assert_close, reference, signal};
    use super::*;
    use rand::Rng;
    use sigcorr_core::vector::VectorBackend;

    fn run(strategy: Strategy, x: &[f32], h: &[f32]) -> Vec<f32> {
        let config = CrossCorrelateConfig::new(x.len(), h.len()).with_strategy(strategy);
        let mut kernel = CrossCorrelateKernel::try_new(config).expect("kernel");
        let out = kernel.run_alloc(x, h).expect("run");
        kernel.finalize();
        out
    }

    #[test]
    fn concrete_scenario_on_every_strategy() {
        let x = [1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let h = [1.0f32, 0.0, -1.0];
        let expected = [-2.0f32, -2.0, -2.0, -2.0, -2.0, -2.0, 7.0, 8.0];
        for strategy in Strategy::ALL {
            assert_close(&run(strategy, &x, &h), &expected);
        }
        let mut out = [0.0f32; 8];
        cross_correlate_simd(false, &x, &h, &mut out).expect("direct");
        assert_eq!(out, expected);
    }

    #[test]
    fn strategies_agree_on_random_inputs() {
        let mut rng = rand::rng();
        for (x_len, h_len) in [(1, 1), (5, 5), (31, 4), (200, 17), (1000, 10), (1024, 300)] {
            let x: Vec<f32> = (0..x_len).map(|_| rng.random_range(-1.0..1.0)).collect();
            let h: Vec<f32> = (0..h_len).map(|_| rng.random_range(-1.0..1.0)).collect();
            let expected = reference(&x, &h);
            for strategy in Strategy::ALL {
                assert_close(&run(strategy, &x, &h), &expected);
            }
        }
    }

    #[test]
    fn linear_in_the_signal() {
        let (x_len, h_len) = (96, 11);
        let x1 = signal(x_len, 0.2);
        let x2 = signal(x_len, 1.3);
        let h = signal(h_len, 2.1);
        let (a, b) = (0.75f32, -1.5f32);
        let mixed: Vec<f32> = x1.iter().zip(&x2).map(|(p, q)| a * p + b * q).collect();
        for strategy in Strategy::ALL {
            let y1 = run(strategy, &x1, &h);
            let y2 = run(strategy, &x2, &h);
            let combined: Vec<f32> = y1.iter().zip(&y2).map(|(p, q)| a * p + b * q).collect();
            assert_close(&run(strategy, &mixed, &h), &combined);
        }
    }

    #[test]
    fn zero_reference_gives_zero_output() {
        let x = signal(64, 0.4);
        let h = vec![0.0f32; 9];
        for strategy in Strategy::ALL {
            let out = run(strategy, &x, &h);
            assert!(out.iter().all(|v| v.abs() < 1e-6), "{strategy}: {out:?}");
        }
    }

    #[test]
    fn unit_reference_copies_the_signal() {
        let x = signal(40, 0.9);
        for strategy in Strategy::ALL {
            assert_close(&run(strategy, &x, &[1.0]), &x);
        }
    }

    #[test]
    fn equal_lengths() {
        let x = signal(33, 0.1);
        let h = signal(33, 0.5);
        let out = run(Strategy::Direct, &x, &h);
        // The first output is the full overlap.
        let full: f32 = x.iter().zip(&h).map(|(a, b)| a * b).sum();
        assert!((out[0] - full).abs() < 1e-4);
        // The last output only sees x[x_len - 1] · h[0].
        assert!((out[32] - x[32] * h[0]).abs() < 1e-6);
        for strategy in Strategy::ALL {
            assert_close(&run(strategy, &x, &h), &reference(&x, &h));
        }
    }

    #[test]
    fn in_place_matches_out_of_place() {
        let x = signal(16, 0.3);
        let h = signal(4, 1.1);
        for strategy in Strategy::ALL {
            for backend in VectorBackend::ALL {
                let config = CrossCorrelateConfig::new(16, 4)
                    .with_strategy(strategy)
                    .with_backend(backend);
                let mut kernel = CrossCorrelateKernel::try_new(config).expect("kernel");
                let expected = kernel.run_alloc(&x, &h).expect("out of place");
                let mut buffer = x.clone();
                kernel.run_in_place(&mut buffer, &h).expect("in place");
                assert_eq!(buffer, expected, "{strategy} on {backend}");
            }
        }
        let mut buffer = x.clone();
        cross_correlate_simd_in_place(true, &mut buffer, &h);
        assert_close(&buffer, &reference(&x, &h));
    }

    #[test]
    fn repeated_calls_on_one_handle() {
        for strategy in Strategy::ALL {
            let config = CrossCorrelateConfig::new(300, 20).with_strategy(strategy);
            let mut kernel = CrossCorrelateKernel::try_new(config).expect("kernel");
            let mut out = vec![0.0f32; 300];
            for phase in [0.0f32, 0.5, 4.0, 0.0] {
                let x = signal(300, phase);
                let h = signal(20, phase + 1.0);
                kernel.run_into(&x, &h, &mut out).expect("run");
                assert_close(&out, &reference(&x, &h));
            }
            kernel.finalize();
        }
    }

    #[test]
    fn mismatched_lengths_are_reported() {
        let mut kernel = cross_correlate_initialize(16, 4).expect("kernel");
        let x = signal(16, 0.0);
        let h = signal(4, 0.0);
        let mut short = vec![0.0f32; 15];
        assert_eq!(
            cross_correlate(&mut kernel, &x, &h, &mut short),
            Err(ExecInvariantViolation::LengthMismatch {
                arg: "out",
                expected: 16,
                got: 15
            })
        );
        let mut out = vec![0.0f32; 16];
        assert_eq!(
            cross_correlate(&mut kernel, &x, &h[..3], &mut out),
            Err(ExecInvariantViolation::LengthMismatch {
                arg: "h",
                expected: 4,
                got: 3
            })
        );
        let mut long = signal(17, 0.0);
        assert_eq!(
            cross_correlate_in_place(&mut kernel, &mut long, &h),
            Err(ExecInvariantViolation::LengthMismatch {
                arg: "x",
                expected: 16,
                got: 17
            })
        );
        cross_correlate_finalize(kernel);
    }

    #[test]
    fn free_function_handles() {
        let x = signal(500, 0.8);
        let h = signal(24, 0.2);
        let expected = reference(&x, &h);
        let mut out = vec![0.0f32; 500];

        let mut fft = cross_correlate_fft_initialize(500, 24).expect("fft");
        cross_correlate_fft(&mut fft, &x, &h, &mut out).expect("fft run");
        assert_close(&out, &expected);
        let mut buffer = x.clone();
        cross_correlate_fft_in_place(&mut fft, &mut buffer, &h).expect("fft in place");
        assert_close(&buffer, &expected);
        cross_correlate_fft_finalize(fft);

        let mut ols = cross_correlate_overlap_save_initialize(500, 24).expect("overlap-save");
        cross_correlate_overlap_save(&mut ols, &x, &h, &mut out).expect("ols run");
        assert_close(&out, &expected);
        let mut buffer = x.clone();
        cross_correlate_overlap_save_in_place(&mut ols, &mut buffer, &h).expect("ols in place");
        assert_close(&buffer, &expected);
        cross_correlate_overlap_save_finalize(ols);

        let mut adaptive = cross_correlate_initialize(500, 24).expect("adaptive");
        cross_correlate(&mut adaptive, &x, &h, &mut out).expect("adaptive run");
        assert_close(&out, &expected);
        cross_correlate_finalize(adaptive);
    }

    #[test]
    fn ndarray_buffers_are_accepted() {
        let x = ndarray::Array1::from(signal(50, 0.6));
        let h = signal(6, 0.6);
        let mut out = ndarray::Array1::<f32>::zeros(50);
        let mut kernel = cross_correlate_initialize(50, 6).expect("kernel");
        kernel.run_into(&x, &h, &mut out).expect("run");
        let expected = reference(x.as_slice().expect("contiguous"), &h);
        assert_close(out.as_slice().expect("contiguous"), &expected);
    }

    #[test]
    fn initialize_failures_allocate_nothing() {
        assert_eq!(
            cross_correlate_fft_initialize(0, 1).err(),
            Some(ConfigError::EmptyInput { arg: "x_len" })
        );
        assert!(matches!(
            cross_correlate_overlap_save_initialize(4, 8).err(),
            Some(ConfigError::InvalidArgument { arg: "h_len", .. })
        ));
        assert_eq!(
            cross_correlate_initialize(8, 0).err(),
            Some(ConfigError::EmptyInput { arg: "h_len" })
        );
    }

    #[test]
    fn oversized_handles_report_out_of_memory() {
        let x_len = 1usize << 48;
        assert!(matches!(
            cross_correlate_fft_initialize(x_len, 1).err(),
            Some(ConfigError::OutOfMemory { .. })
        ));
        assert!(matches!(
            cross_correlate_overlap_save_initialize(x_len, x_len >> 2).err(),
            Some(ConfigError::OutOfMemory { .. })
        ));
        for strategy in [Strategy::Fft, Strategy::OverlapSave] {
            let config = CrossCorrelateConfig::new(x_len, x_len >> 2).with_strategy(strategy);
            assert!(matches!(
                CrossCorrelateKernel::try_new(config).err(),
                Some(ConfigError::OutOfMemory { .. })
            ));
        }
    }
}
