//! Segmented overlap-save correlation with one small reusable transform.

use super::plan::{load_padded, store_real, zeroed_buffer, TransformPlan};
use super::{SignalIo, SignalShape};
use crate::kernel::{ConfigError, HandleLifecycle};
use rustfft::num_complex::Complex32;
use sigcorr_core::vector::{VectorBackend, VectorKernels};

/// Default ratio between the segment length and the reference length.
pub const DEFAULT_SEGMENT_FACTOR: usize = 4;

/// Constructor config for [`OverlapSaveKernel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlapSaveConfig {
    /// Length of the long signal.
    pub x_len: usize,
    /// Length of the reference.
    pub h_len: usize,
    /// The segment length is the smallest power of two `>= segment_factor * h_len`.
    pub segment_factor: usize,
    /// Elementwise kernels used for the spectral product and scaling.
    pub backend: VectorBackend,
}

impl OverlapSaveConfig {
    /// Config for the given shape with [`DEFAULT_SEGMENT_FACTOR`] on the
    /// detected vector backend.
    pub fn new(x_len: usize, h_len: usize) -> Self {
        Self {
            x_len,
            h_len,
            segment_factor: DEFAULT_SEGMENT_FACTOR,
            backend: VectorBackend::detect(),
        }
    }
}

/// Overlap-save cross-correlation.
///
/// `x` is cut into segments of length `L` that start every
/// `S = L - h_len + 1` samples. Each segment is correlated circularly with
/// `h` in the frequency domain; the first `S` outputs of a segment never see
/// the wraparound and are kept, the remaining `h_len - 1` are discarded.
/// Segments past the end of `x` are zero-padded.
///
/// Nothing is carried between calls: every call restarts from the `x` it is
/// given.
#[derive(Debug)]
pub struct OverlapSaveKernel {
    shape: SignalShape,
    backend: VectorBackend,
    stride: usize,
    plan: TransformPlan,
    segment: Vec<Complex32>,
    reference: Vec<Complex32>,
}

impl OverlapSaveKernel {
    /// Shape this handle was built for.
    pub fn shape(&self) -> SignalShape {
        self.shape
    }

    /// Segment (transform) length `L`.
    pub fn segment_len(&self) -> usize {
        self.plan.len()
    }

    /// Valid outputs per segment, `L - h_len + 1`.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Number of segments one call processes.
    pub fn segment_count(&self) -> usize {
        self.shape.x_len().div_ceil(self.stride)
    }

    pub(crate) fn process(&mut self, mut io: SignalIo<'_>, h: &[f32]) {
        let segment_len = self.plan.len();
        let scale = self.plan.inverse_scale();
        let x_len = self.shape.x_len();

        load_padded(&mut self.reference, h);
        self.plan.forward(&mut self.reference);

        // Segment i reads x[i*S .. i*S + L) and writes out[i*S .. i*S + S).
        // Reads of later segments start at or after the last write, so the
        // in-place form never consumes an overwritten sample.
        let mut start = 0;
        while start < x_len {
            let end = start.saturating_add(segment_len).min(x_len);
            load_padded(&mut self.segment, &io.input()[start..end]);
            self.plan.forward(&mut self.segment);
            self.backend
                .complex_multiply_conjugate(&mut self.segment, &self.reference);
            self.plan.inverse(&mut self.segment);

            let valid = self.stride.min(x_len - start);
            let out = &mut io.output()[start..start + valid];
            store_real(out, &self.segment[..valid]);
            self.backend.scale(out, scale);
            start += self.stride;
        }
    }
}

impl HandleLifecycle for OverlapSaveKernel {
    type Config = OverlapSaveConfig;

    fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
        let shape = SignalShape::try_new(config.x_len, config.h_len)?;
        if config.segment_factor == 0 {
            return Err(ConfigError::InvalidArgument {
                arg: "segment_factor",
                reason: "segment factor must be > 0",
            });
        }
        let segment_len =
            shape
                .segment_len(config.segment_factor)
                .ok_or(ConfigError::InvalidArgument {
                    arg: "segment_factor",
                    reason: "segment length overflows usize",
                })?;
        let stride = segment_len - shape.h_len() + 1;
        // Reserve before planning: the planner's own tables abort on failure.
        let segment = zeroed_buffer("segment_spectrum", segment_len)?;
        let reference = zeroed_buffer("reference_spectrum", segment_len)?;
        let plan = TransformPlan::try_new(segment_len)?;
        log::debug!(
            "overlap-save correlator: x_len={} h_len={} segment_len={segment_len} stride={stride} backend={}",
            shape.x_len(),
            shape.h_len(),
            config.backend
        );
        Ok(Self {
            shape,
            backend: config.backend,
            stride,
            plan,
            segment,
            reference,
        })
    }

    fn finalize(self) {
        log::trace!(
            "overlap-save correlator released (segment_len={})",
            self.plan.len()
        );
    }
}

super::impl_cross_correlate!(OverlapSaveKernel);
