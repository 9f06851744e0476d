use super::{Lanes4, Lanes8, Scalar, VectorKernels};
use core::fmt;
use core::str::FromStr;
use num_complex::Complex32;
use std::sync::OnceLock;

static DETECTED: OnceLock<VectorBackend> = OnceLock::new();

/// Tagged dispatch table over the available kernel implementations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum VectorBackend {
    /// [`Scalar`], always available.
    #[default]
    Scalar,
    /// [`Lanes4`].
    Lanes4,
    /// [`Lanes8`].
    Lanes8,
}

macro_rules! dispatch {
    ($backend:expr, $kernels:ident => $call:expr) => {
        match $backend {
            VectorBackend::Scalar => {
                let $kernels = Scalar;
                $call
            }
            VectorBackend::Lanes4 => {
                let $kernels = Lanes4;
                $call
            }
            VectorBackend::Lanes8 => {
                let $kernels = Lanes8;
                $call
            }
        }
    };
}

impl VectorBackend {
    /// Every backend, narrowest first.
    pub const ALL: [VectorBackend; 3] = [
        VectorBackend::Scalar,
        VectorBackend::Lanes4,
        VectorBackend::Lanes8,
    ];

    /// The widest backend the running CPU supports.
    ///
    /// Detection runs on the first call only; the answer is fixed for the
    /// lifetime of the process.
    pub fn detect() -> Self {
        *DETECTED.get_or_init(|| {
            let backend = Self::probe();
            log::debug!("vector backend detected: {backend}");
            backend
        })
    }

    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    fn probe() -> Self {
        if std::arch::is_x86_feature_detected!("avx") {
            VectorBackend::Lanes8
        } else if std::arch::is_x86_feature_detected!("sse2") {
            VectorBackend::Lanes4
        } else {
            VectorBackend::Scalar
        }
    }

    #[cfg(any(
        target_arch = "aarch64",
        all(target_arch = "wasm32", target_feature = "simd128")
    ))]
    fn probe() -> Self {
        VectorBackend::Lanes4
    }

    #[cfg(not(any(
        target_arch = "x86",
        target_arch = "x86_64",
        target_arch = "aarch64",
        all(target_arch = "wasm32", target_feature = "simd128")
    )))]
    fn probe() -> Self {
        VectorBackend::Scalar
    }

    /// Short lowercase name, as accepted by [`FromStr`].
    pub fn name(&self) -> &'static str {
        match self {
            VectorBackend::Scalar => "scalar",
            VectorBackend::Lanes4 => "lanes4",
            VectorBackend::Lanes8 => "lanes8",
        }
    }
}

impl VectorKernels for VectorBackend {
    fn lanes(&self) -> usize {
        dispatch!(self, k => k.lanes())
    }

    fn real_multiply(&self, a: &[f32], b: &[f32], out: &mut [f32]) {
        dispatch!(self, k => k.real_multiply(a, b, out))
    }

    fn complex_multiply(&self, a: &mut [Complex32], b: &[Complex32]) {
        dispatch!(self, k => k.complex_multiply(a, b))
    }

    fn complex_multiply_conjugate(&self, a: &mut [Complex32], b: &[Complex32]) {
        dispatch!(self, k => k.complex_multiply_conjugate(a, b))
    }

    fn complex_conjugate(&self, a: &mut [Complex32]) {
        dispatch!(self, k => k.complex_conjugate(a))
    }

    fn scale(&self, a: &mut [f32], factor: f32) {
        dispatch!(self, k => k.scale(a, factor))
    }

    fn sum(&self, a: &[f32]) -> f32 {
        dispatch!(self, k => k.sum(a))
    }

    fn add_to_all(&self, a: &mut [f32], value: f32) {
        dispatch!(self, k => k.add_to_all(a, value))
    }
}

impl fmt::Display for VectorBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a backend name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseBackendError {
    name: String,
}

impl fmt::Display for ParseBackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Unknown vector backend `{}`. Expected one of: scalar, lanes4, lanes8.",
            self.name
        )
    }
}

impl std::error::Error for ParseBackendError {}

impl FromStr for VectorBackend {
    type Err = ParseBackendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VectorBackend::ALL
            .into_iter()
            .find(|backend| backend.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseBackendError { name: s.to_owned() })
    }
}
