//! Error types for the verification engine

use thiserror::Error;

/// Errors surfaced to the caller of a verification call.
///
/// Only genuine input errors abort a call; unavailable regions, OCR
/// failures, and format mismatches all degrade into the fraud score
/// instead.
#[derive(Debug, Error)]
pub enum VerifyError {
    /// Image buffer has zero width or height
    #[error("empty image: width or height is zero")]
    EmptyImage,
}
