//! Elementwise building blocks for the `sigcorr` correlation engine.
//!
//! The correlators never branch on hardware capabilities themselves. They
//! receive a [`vector::VectorBackend`] (or any [`vector::VectorKernels`]
//! implementation) and call through it, so the portable scalar path and the
//! lane-parallel paths stay interchangeable.

pub mod vector;

pub use num_complex::Complex32;
