//! Retryable vs. permanent provider failures.

use paywatch_core::traits::ProviderError;

/// Whether a later retry of the same send has a reasonable chance to succeed.
///
/// Rate limiting, request timeouts and server errors are retryable; other
/// client errors and anything reporting invalid input are not. Failures
/// without a status fall back to the message text and default to retryable.
pub fn is_retryable(error: &ProviderError) -> bool {
    if let Some(status) = error.status {
        return match status {
            429 | 408 => true,
            500..=599 => true,
            400..=499 => false,
            _ => true,
        };
    }

    let message = error.message.to_ascii_lowercase();
    if message.contains("rate limit") {
        return true;
    }
    if message.contains("invalid") {
        return false;
    }
    true
}
