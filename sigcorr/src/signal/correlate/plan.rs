//! Transform plans and scratch allocation shared by the spectral strategies.

use crate::kernel::ConfigError;
use core::fmt;
use rustfft::num_complex::Complex32;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

/// Reserve a zero-filled buffer, reporting allocation failure instead of aborting.
pub(crate) fn zeroed_buffer<T: Clone + Default>(
    arg: &'static str,
    len: usize,
) -> Result<Vec<T>, ConfigError> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(len)
        .map_err(|_| ConfigError::OutOfMemory {
            arg,
            requested: len,
        })?;
    buffer.resize(len, T::default());
    Ok(buffer)
}

/// Forward and inverse complex transforms of one fixed length.
///
/// rustfft leaves the inverse unnormalized; callers multiply by
/// [`TransformPlan::inverse_scale`].
pub(crate) struct TransformPlan {
    len: usize,
    forward: Arc<dyn Fft<f32>>,
    inverse: Arc<dyn Fft<f32>>,
    scratch: Vec<Complex32>,
}

impl TransformPlan {
    pub(crate) fn try_new(len: usize) -> Result<Self, ConfigError> {
        let mut planner = FftPlanner::<f32>::new();
        let forward = planner.plan_fft_forward(len);
        let inverse = planner.plan_fft_inverse(len);
        let scratch_len = forward
            .get_inplace_scratch_len()
            .max(inverse.get_inplace_scratch_len());
        let scratch = zeroed_buffer("transform_scratch", scratch_len)?;
        Ok(Self {
            len,
            forward,
            inverse,
            scratch,
        })
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn forward(&mut self, buffer: &mut [Complex32]) {
        self.forward.process_with_scratch(buffer, &mut self.scratch);
    }

    pub(crate) fn inverse(&mut self, buffer: &mut [Complex32]) {
        self.inverse.process_with_scratch(buffer, &mut self.scratch);
    }

    pub(crate) fn inverse_scale(&self) -> f32 {
        1.0 / self.len as f32
    }
}

impl fmt::Debug for TransformPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformPlan")
            .field("len", &self.len)
            .field("scratch_len", &self.scratch.len())
            .finish()
    }
}

/// Copy `src` into the real parts of `dst`, zeroing everything else.
pub(crate) fn load_padded(dst: &mut [Complex32], src: &[f32]) {
    let (head, tail) = dst.split_at_mut(src.len());
    for (d, &s) in head.iter_mut().zip(src) {
        *d = Complex32::new(s, 0.0);
    }
    tail.fill(Complex32::new(0.0, 0.0));
}

/// Copy the real parts of `src` into `dst`.
pub(crate) fn store_real(dst: &mut [f32], src: &[Complex32]) {
    for (d, s) in dst.iter_mut().zip(src) {
        *d = s.re;
    }
}
