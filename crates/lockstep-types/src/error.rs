//! Unified error interface for LOCKSTEP.
//!
//! Every error type in the workspace implements [`ErrorCode`] so that
//! callers can branch on a stable machine-readable code and decide on
//! retries without matching concrete enum variants across crates.
//!
//! # Code Convention
//!
//! | Crate | Prefix |
//! |-------|--------|
//! | `lockstep-event` | `LISTENER_` |
//! | `lockstep-kernel` | `KERNEL_` |
//!
//! Codes are UPPER_SNAKE_CASE and stable once published; each crate
//! verifies its full variant set with [`assert_error_codes`] in unit
//! tests.

/// Unified error code interface.
///
/// # Example
///
/// ```
/// use lockstep_types::ErrorCode;
///
/// #[derive(Debug)]
/// enum MyError {
///     Busy,
///     Corrupt,
/// }
///
/// impl ErrorCode for MyError {
///     fn code(&self) -> &'static str {
///         match self {
///             Self::Busy => "MY_BUSY",
///             Self::Corrupt => "MY_CORRUPT",
///         }
///     }
///
///     fn is_recoverable(&self) -> bool {
///         matches!(self, Self::Busy)
///     }
/// }
///
/// assert_eq!(MyError::Busy.code(), "MY_BUSY");
/// assert!(MyError::Busy.is_recoverable());
/// ```
pub trait ErrorCode {
    /// Returns a machine-readable error code.
    ///
    /// UPPER_SNAKE_CASE, prefixed with the owning domain, stable
    /// across versions (changing a code is a breaking change).
    fn code(&self) -> &'static str;

    /// Returns whether retrying the operation may succeed.
    fn is_recoverable(&self) -> bool;
}

/// Validates that an error code follows the workspace convention.
///
/// # Panics
///
/// Panics with a descriptive message if the code is empty, lacks the
/// expected prefix, or is not UPPER_SNAKE_CASE.
///
/// # Example
///
/// ```
/// use lockstep_types::{assert_error_code, ErrorCode};
///
/// #[derive(Debug)]
/// struct Oops;
///
/// impl ErrorCode for Oops {
///     fn code(&self) -> &'static str { "TEST_OOPS" }
///     fn is_recoverable(&self) -> bool { false }
/// }
///
/// assert_error_code(&Oops, "TEST_");
/// ```
pub fn assert_error_code<E: ErrorCode>(err: &E, expected_prefix: &str) {
    let code = err.code();

    assert!(!code.is_empty(), "Error code must not be empty");

    assert!(
        code.starts_with(expected_prefix),
        "Error code '{}' must start with prefix '{}'",
        code,
        expected_prefix
    );

    assert!(
        is_upper_snake_case(code),
        "Error code '{}' must be UPPER_SNAKE_CASE",
        code
    );
}

/// Validates a slice of errors at once.
///
/// Use this with the full variant set of an error enum so a newly
/// added variant cannot ship a malformed code.
pub fn assert_error_codes<E: ErrorCode>(errors: &[E], expected_prefix: &str) {
    for err in errors {
        assert_error_code(err, expected_prefix);
    }
}

/// Checks if a string is UPPER_SNAKE_CASE.
fn is_upper_snake_case(s: &str) -> bool {
    if s.is_empty() || s.starts_with('_') || s.ends_with('_') || s.contains("__") {
        return false;
    }

    s.chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}
