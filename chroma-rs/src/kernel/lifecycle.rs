use super::ConfigError;

/// Constructor validation lifecycle shared by kernel structs.
pub trait KernelLifecycle: Sized {
    /// Kernel config type.
    type Config;

    /// Construct a validated kernel from config.
    fn try_new(config: Self::Config) -> Result<Self, ConfigError>;
}

/// Check a window half-width against the number of samples it will slide over.
///
/// A window of half-width `k` needs `2k < len` to produce at least one score.
pub(crate) fn check_window(window_size: usize, len: usize) -> Result<(), ConfigError> {
    if window_size == 0 {
        return Err(ConfigError::InvalidArgument {
            arg: "window_size",
            reason: "window size must be at least 1",
        });
    }
    if window_size.saturating_mul(2) >= len {
        return Err(ConfigError::InvalidArgument {
            arg: "window_size",
            reason: "window size must satisfy 2 * window_size < number of samples",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::check_window;

    #[test]
    fn window_must_fit_twice_inside_signal() {
        assert!(check_window(4, 43).is_ok());
        assert!(check_window(4, 9).is_ok());
        assert!(check_window(4, 8).is_err());
        assert!(check_window(0, 8).is_err());
        assert!(check_window(usize::MAX, 8).is_err());
    }
}
