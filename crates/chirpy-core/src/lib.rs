//! Core types, validation, and shared utilities for Chirpy.
//!
//! This crate provides:
//! - Chirp validation: length limit and profanity redaction
//! - Prometheus metrics helpers
//! - Shared error types

mod error;
pub mod metrics;
mod validate;

// ═══════════════════════════════════════════════════════════════════════════
// Constants
// ═══════════════════════════════════════════════════════════════════════════

/// Maximum chirp body length, in bytes of UTF-8.
pub const MAX_CHIRP_LENGTH: usize = 140;

/// Words that are redacted from chirp bodies (compared lowercase, whole token).
pub const BANNED_WORDS: [&str; 3] = ["kerfuffle", "sharbert", "fornax"];

/// Replacement for a redacted token.
pub const REDACTION_MARKER: &str = "****";

pub use error::{ChirpError, Result};
pub use validate::{clean_body, is_banned, validate_chirp};
