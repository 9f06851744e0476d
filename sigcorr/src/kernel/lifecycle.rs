use super::ConfigError;

/// Acquire / release lifecycle shared by every correlation handle.
///
/// `try_new` performs all planning and allocation up front. `finalize`
/// consumes the handle, so a released handle cannot be used again.
pub trait HandleLifecycle: Sized {
    /// Construction parameters.
    type Config;

    /// Validate `config` and build the handle.
    fn try_new(config: Self::Config) -> Result<Self, ConfigError>;

    /// Release the handle and everything it owns.
    fn finalize(self) {
        drop(self);
    }
}
