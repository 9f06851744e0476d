//! Handle plumbing shared by every correlator.
//!
//! [`HandleLifecycle`] builds and releases handles, [`Samples`] and
//! [`SamplesMut`] borrow caller buffers, and the error enums report failures
//! at construction and at call time.

mod errors;
mod io;
mod lifecycle;

pub use errors::{ConfigError, ExecInvariantViolation};
pub use io::{Samples, SamplesMut};
pub use lifecycle::HandleLifecycle;
