//! Direct sliding dot products.

use super::{SignalIo, SignalShape};
use crate::kernel::{ConfigError, ExecInvariantViolation, HandleLifecycle};
use sigcorr_core::vector::{VectorBackend, VectorKernels};

/// Products are formed in blocks of this many taps before being reduced.
const PRODUCT_BLOCK: usize = 256;

// Widest lane group, so every block reduces in the same order on every call.
#[repr(C, align(32))]
struct ProductBlock([f32; PRODUCT_BLOCK]);

/// Constructor config for [`DirectCorrelateKernel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectCorrelateConfig {
    /// Length of the long signal.
    pub x_len: usize,
    /// Length of the reference.
    pub h_len: usize,
    /// Compute dot products with the backend's multiply and sum kernels
    /// instead of a scalar accumulation loop.
    pub vector_path: bool,
    /// Elementwise kernels used when `vector_path` is set.
    pub backend: VectorBackend,
}

impl DirectCorrelateConfig {
    /// Config for the given shape using the vector path on the detected backend.
    pub fn new(x_len: usize, h_len: usize) -> Self {
        Self {
            x_len,
            h_len,
            vector_path: true,
            backend: VectorBackend::detect(),
        }
    }
}

/// Brute-force correlation, `O(x_len · h_len)` per call.
///
/// Holds no buffers; the handle only remembers its shape and kernel choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectCorrelateKernel {
    shape: SignalShape,
    kernels: Option<VectorBackend>,
}

impl DirectCorrelateKernel {
    /// Shape this handle was built for.
    pub fn shape(&self) -> SignalShape {
        self.shape
    }

    pub(crate) fn process(&mut self, io: SignalIo<'_>, h: &[f32]) {
        correlate(self.kernels, io, h);
    }
}

impl HandleLifecycle for DirectCorrelateKernel {
    type Config = DirectCorrelateConfig;

    fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
        let shape = SignalShape::try_new(config.x_len, config.h_len)?;
        let kernels = config.vector_path.then_some(config.backend);
        log::debug!(
            "direct correlator: x_len={} h_len={} kernels={}",
            shape.x_len(),
            shape.h_len(),
            kernels.map_or("scalar loop", |k| k.name())
        );
        Ok(Self { shape, kernels })
    }
}

super::impl_cross_correlate!(DirectCorrelateKernel);

/// Brute-force cross-correlation without a handle.
///
/// Writes `x.len()` samples into `result`. `h` may be of any length,
/// including longer than `x` or empty. With `use_vector_path` the window dot
/// products run on [`VectorBackend::detect`]; otherwise on a scalar loop.
pub fn cross_correlate_simd(
    use_vector_path: bool,
    x: &[f32],
    h: &[f32],
    result: &mut [f32],
) -> Result<(), ExecInvariantViolation> {
    if result.len() != x.len() {
        return Err(ExecInvariantViolation::LengthMismatch {
            arg: "result",
            expected: x.len(),
            got: result.len(),
        });
    }
    let kernels = use_vector_path.then(VectorBackend::detect);
    correlate(kernels, SignalIo::Split { x, out: result }, h);
    Ok(())
}

/// [`cross_correlate_simd`] writing the result over `x`.
pub fn cross_correlate_simd_in_place(use_vector_path: bool, x: &mut [f32], h: &[f32]) {
    let kernels = use_vector_path.then(VectorBackend::detect);
    correlate(kernels, SignalIo::InPlace(x), h);
}

fn correlate(kernels: Option<VectorBackend>, mut io: SignalIo<'_>, h: &[f32]) {
    let x_len = io.input().len();
    let mut products = ProductBlock([0.0; PRODUCT_BLOCK]);
    // Output n only reads x[n..], so producing outputs in increasing order
    // keeps the in-place form correct.
    for n in 0..x_len {
        let value = {
            let x = io.input();
            let taps = h.len().min(x_len - n);
            let window = &x[n..n + taps];
            match kernels {
                Some(kernels) => dot_blocked(&kernels, window, &h[..taps], &mut products.0),
                None => dot_scalar(window, &h[..taps]),
            }
        };
        io.output()[n] = value;
    }
}

fn dot_scalar(a: &[f32], b: &[f32]) -> f32 {
    let mut acc = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        acc += x * y;
    }
    acc
}

fn dot_blocked<K: VectorKernels>(kernels: &K, a: &[f32], b: &[f32], products: &mut [f32]) -> f32 {
    let mut acc = 0.0f32;
    for (ca, cb) in a.chunks(products.len()).zip(b.chunks(products.len())) {
        let block = &mut products[..ca.len()];
        kernels.real_multiply(ca, cb, block);
        acc += kernels.sum(block);
    }
    acc
}
