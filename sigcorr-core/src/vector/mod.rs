//! Elementwise vector kernels.
//!
//! Three implementations share the [`VectorKernels`] interface:
//!
//! * [`Scalar`] is the portable fallback and the numeric reference.
//! * [`Lanes4`] processes four `f32` lanes per step (SSE2, NEON, simd128).
//! * [`Lanes8`] processes eight `f32` lanes per step (AVX).
//!
//! [`VectorBackend`] is the tagged dispatch table over them. It is chosen
//! once per process by [`VectorBackend::detect`] and then passed by value to
//! whoever needs it.

mod align;
mod backend;
mod lanes;
mod scalar;

pub use align::align_complement;
pub(crate) use align::split_point;
pub use backend::{ParseBackendError, VectorBackend};
pub use lanes::{Lanes4, Lanes8};
pub use scalar::Scalar;

use num_complex::Complex32;

/// Stateless elementwise primitives consumed by the correlators.
///
/// Operands handed to one call are expected to have equal lengths; every
/// implementation processes the shortest of them and leaves the rest alone.
pub trait VectorKernels {
    /// Number of `f32` lanes processed per vector step.
    fn lanes(&self) -> usize;

    /// `out[i] = a[i] * b[i]`.
    fn real_multiply(&self, a: &[f32], b: &[f32], out: &mut [f32]);

    /// `a[i] = a[i] * b[i]` over complex values.
    fn complex_multiply(&self, a: &mut [Complex32], b: &[Complex32]);

    /// `a[i] = a[i] * conj(b[i])`.
    fn complex_multiply_conjugate(&self, a: &mut [Complex32], b: &[Complex32]);

    /// `a[i] = conj(a[i])`.
    fn complex_conjugate(&self, a: &mut [Complex32]);

    /// `a[i] = a[i] * factor`.
    fn scale(&self, a: &mut [f32], factor: f32);

    /// Sum of all elements of `a`.
    fn sum(&self, a: &[f32]) -> f32;

    /// `a[i] = a[i] + value`.
    fn add_to_all(&self, a: &mut [f32], value: f32);
}
