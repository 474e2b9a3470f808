//! Error types for chirp validation.

use thiserror::Error;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, ChirpError>;

/// Reasons a chirp body is rejected.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChirpError {
    /// Body is longer than [`crate::MAX_CHIRP_LENGTH`].
    #[error("Chirp is too long")]
    TooLong,
}
