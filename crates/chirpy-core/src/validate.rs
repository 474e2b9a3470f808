//! Chirp body validation and profanity redaction.
//!
//! Validation is a pure function: it never logs and never touches shared
//! state, so handlers call it directly from any task.

use crate::error::{ChirpError, Result};
use crate::{BANNED_WORDS, MAX_CHIRP_LENGTH, REDACTION_MARKER};

/// Validate a chirp body and return its cleaned form.
///
/// The length check runs first. A body over [`MAX_CHIRP_LENGTH`] bytes is
/// rejected with [`ChirpError::TooLong`] and never sanitized.
///
/// # Example
///
/// ```
/// use chirpy_core::validate_chirp;
///
/// let cleaned = validate_chirp("what a kerfuffle").unwrap();
/// assert_eq!(cleaned, "what a ****");
/// ```
pub fn validate_chirp(body: &str) -> Result<String> {
    if body.len() > MAX_CHIRP_LENGTH {
        return Err(ChirpError::TooLong);
    }

    Ok(clean_body(body))
}

/// Replace every banned token in `body` with [`REDACTION_MARKER`].
///
/// Tokens are separated by a single `' '`. Consecutive spaces produce empty
/// tokens, so the original spacing survives the split and rejoin.
pub fn clean_body(body: &str) -> String {
    body.split(' ')
        .map(|word| {
            if is_banned(word) {
                REDACTION_MARKER
            } else {
                word
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whether `word` is a banned token, ignoring case.
pub fn is_banned(word: &str) -> bool {
    let lowered = word.to_lowercase();
    BANNED_WORDS.contains(&lowered.as_str())
}
