//! Single zero-padded transform per call.

use super::plan::{load_padded, store_real, zeroed_buffer, TransformPlan};
use super::{SignalIo, SignalShape};
use crate::kernel::{ConfigError, HandleLifecycle};
use rustfft::num_complex::Complex32;
use sigcorr_core::vector::{VectorBackend, VectorKernels};

/// Constructor config for [`FftCorrelateKernel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FftCorrelateConfig {
    /// Length of the long signal.
    pub x_len: usize,
    /// Length of the reference.
    pub h_len: usize,
    /// Elementwise kernels used for the spectral product and scaling.
    pub backend: VectorBackend,
}

impl FftCorrelateConfig {
    /// Config for the given shape on the detected vector backend.
    pub fn new(x_len: usize, h_len: usize) -> Self {
        Self {
            x_len,
            h_len,
            backend: VectorBackend::detect(),
        }
    }
}

/// Cross-correlation through one forward/inverse transform pair of length
/// `next_power_of_two(x_len + h_len - 1)`.
///
/// The padding guarantees the circular correlation computed in the
/// frequency domain never wraps into the `x_len` samples that are kept.
#[derive(Debug)]
pub struct FftCorrelateKernel {
    shape: SignalShape,
    backend: VectorBackend,
    plan: TransformPlan,
    signal: Vec<Complex32>,
    reference: Vec<Complex32>,
}

impl FftCorrelateKernel {
    /// Shape this handle was built for.
    pub fn shape(&self) -> SignalShape {
        self.shape
    }

    /// Transform length `N`.
    pub fn transform_len(&self) -> usize {
        self.plan.len()
    }

    pub(crate) fn process(&mut self, mut io: SignalIo<'_>, h: &[f32]) {
        load_padded(&mut self.signal, io.input());
        load_padded(&mut self.reference, h);
        self.plan.forward(&mut self.signal);
        self.plan.forward(&mut self.reference);

        // X[k] · conj(H[k]) is the spectrum of the correlation.
        self.backend
            .complex_multiply_conjugate(&mut self.signal, &self.reference);
        self.plan.inverse(&mut self.signal);

        let scale = self.plan.inverse_scale();
        let out = io.output();
        let len = out.len();
        store_real(out, &self.signal[..len]);
        self.backend.scale(out, scale);
    }
}

impl HandleLifecycle for FftCorrelateKernel {
    type Config = FftCorrelateConfig;

    fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
        let shape = SignalShape::try_new(config.x_len, config.h_len)?;
        let n = shape.padded_len().ok_or(ConfigError::InvalidArgument {
            arg: "x_len",
            reason: "padded transform length overflows usize",
        })?;
        // Reserve before planning: the planner's own tables abort on failure.
        let signal = zeroed_buffer("signal_spectrum", n)?;
        let reference = zeroed_buffer("reference_spectrum", n)?;
        let plan = TransformPlan::try_new(n)?;
        log::debug!(
            "fft correlator: x_len={} h_len={} transform_len={n} backend={}",
            shape.x_len(),
            shape.h_len(),
            config.backend
        );
        Ok(Self {
            shape,
            backend: config.backend,
            plan,
            signal,
            reference,
        })
    }

    fn finalize(self) {
        log::trace!("fft correlator released (transform_len={})", self.plan.len());
    }
}

super::impl_cross_correlate!(FftCorrelateKernel);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::correlate::testing::{assert_close, reference, signal};
    use crate::signal::traits::CrossCorrelate1D;

    #[test]
    fn transform_length_covers_linear_correlation() {
        let kernel = FftCorrelateKernel::try_new(FftCorrelateConfig::new(8, 3)).expect("kernel");
        assert_eq!(kernel.transform_len(), 16);
        let kernel = FftCorrelateKernel::try_new(FftCorrelateConfig::new(9, 8)).expect("kernel");
        assert_eq!(kernel.transform_len(), 16);
        let kernel = FftCorrelateKernel::try_new(FftCorrelateConfig::new(9, 9)).expect("kernel");
        assert_eq!(kernel.transform_len(), 32);
    }

    #[test]
    fn matches_direct_sum_on_every_backend() {
        for backend in VectorBackend::ALL {
            for (x_len, h_len) in [(1, 1), (8, 3), (100, 7), (257, 64), (512, 512)] {
                let x = signal(x_len, 0.37);
                let h = signal(h_len, 1.9);
                let mut kernel = FftCorrelateKernel::try_new(FftCorrelateConfig {
                    x_len,
                    h_len,
                    backend,
                })
                .expect("kernel");
                let out = kernel.run_alloc(&x, &h).expect("run");
                assert_close(&out, &reference(&x, &h));
            }
        }
    }

    #[test]
    fn repeated_calls_reuse_the_plan() {
        let mut kernel =
            FftCorrelateKernel::try_new(FftCorrelateConfig::new(64, 5)).expect("kernel");
        for phase in [0.1f32, 0.7, 2.3] {
            let x = signal(64, phase);
            let h = signal(5, phase * 3.0);
            let out = kernel.run_alloc(&x, &h).expect("run");
            assert_close(&out, &reference(&x, &h));
        }
    }

    #[test]
    fn unreservable_transform_reports_out_of_memory() {
        for x_len in [1usize << 48, 1 << 60] {
            let err = FftCorrelateKernel::try_new(FftCorrelateConfig::new(x_len, 1))
                .expect_err("no room for the spectra");
            assert_eq!(
                err,
                ConfigError::OutOfMemory {
                    arg: "signal_spectrum",
                    requested: x_len,
                }
            );
        }
    }

    #[test]
    fn rejects_wrong_lengths() {
        let mut kernel =
            FftCorrelateKernel::try_new(FftCorrelateConfig::new(16, 4)).expect("kernel");
        let x = signal(15, 0.0);
        let h = signal(4, 0.0);
        let mut out = vec![0.0f32; 16];
        assert!(kernel.run_into(&x, &h, &mut out).is_err());
    }
}
