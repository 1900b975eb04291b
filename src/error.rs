//! Error type shared by every kernel in the crate.
//!
//! Validation always happens before any state is touched, so an `Err`
//! result guarantees the receiver is unchanged.

/// Error returned by kernel operations.
#[derive(Debug, Clone, PartialEq)]
pub enum KernelError {
    /// An argument is outside the operation's domain (negative count,
    /// non-positive modulus, probability outside `[0, 1]`, ...).
    InvalidArgument(String),
    /// A statistic was requested before enough samples were accumulated.
    InsufficientData {
        /// Minimum number of samples the statistic needs.
        required: u64,
        /// Number of samples actually available.
        available: u64,
    },
    /// A non-finite value was offered to a streaming estimator.
    InvalidValue(f64),
}

impl std::fmt::Display for KernelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KernelError::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            KernelError::InsufficientData {
                required,
                available,
            } => write!(
                f,
                "insufficient data: need at least {required} samples, have {available}"
            ),
            KernelError::InvalidValue(v) => write!(f, "invalid value: {v} is not finite"),
        }
    }
}

impl std::error::Error for KernelError {}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, KernelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let e = KernelError::InvalidArgument("modulus must be positive, got 0".into());
        assert_eq!(e.to_string(), "invalid argument: modulus must be positive, got 0");

        let e = KernelError::InsufficientData {
            required: 2,
            available: 1,
        };
        assert_eq!(
            e.to_string(),
            "insufficient data: need at least 2 samples, have 1"
        );

        let e = KernelError::InvalidValue(f64::INFINITY);
        assert_eq!(e.to_string(), "invalid value: inf is not finite");
    }

    #[test]
    fn test_is_std_error() {
        fn assert_error<E: std::error::Error>(_: &E) {}
        assert_error(&KernelError::InvalidValue(f64::NAN));
    }
}
