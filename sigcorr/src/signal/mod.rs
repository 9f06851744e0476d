//! Signal processing kernels.

pub mod correlate;
pub mod traits;
