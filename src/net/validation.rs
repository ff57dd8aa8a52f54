//! Checks on untrusted client payloads
//!
//! Applied by the router before anything reaches the registry or a session.
//! With the `input_validation` feature disabled only the normalization
//! happens and every payload is passed through.

use crate::game::constants::{net, session};
use crate::game::state::SessionId;
use crate::lobby::id;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("session id must be {expected} letters, got {actual} characters")]
    IdLength { expected: usize, actual: usize },
    #[error("session id contains a non-letter character")]
    IdCharset,
    #[error("mouse delta is not a finite number")]
    NonFiniteDelta,
    #[error("mouse delta {0} exceeds the maximum of {max}", max = net::MAX_MOUSE_DELTA)]
    DeltaOutOfRange(f32),
}

/// Normalize a client-supplied session id and check its shape
pub fn session_id(raw: &str) -> Result<SessionId, ValidationError> {
    let normalized = id::normalize(raw);
    if cfg!(feature = "input_validation") {
        let actual = normalized.chars().count();
        if actual != session::ID_LENGTH {
            return Err(ValidationError::IdLength {
                expected: session::ID_LENGTH,
                actual,
            });
        }
        if !normalized.bytes().all(|c| session::ID_ALPHABET.contains(&c)) {
            return Err(ValidationError::IdCharset);
        }
    }
    Ok(normalized)
}

/// Check a horizontal mouse delta
pub fn mouse_delta(dx: f32) -> Result<f32, ValidationError> {
    if cfg!(feature = "input_validation") {
        if !dx.is_finite() {
            return Err(ValidationError::NonFiniteDelta);
        }
        if dx.abs() > net::MAX_MOUSE_DELTA {
            return Err(ValidationError::DeltaOutOfRange(dx));
        }
    }
    Ok(dx)
}

#[cfg(all(test, feature = "input_validation"))]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn test_valid_ids_are_normalized() {
        assert_eq!(session_id("abcdef").unwrap(), "ABCDEF");
        assert_eq!(session_id("QwErTy").unwrap(), "QWERTY");
    }

    #[test]
    fn test_wrong_length() {
        assert_eq!(
            session_id("ABC"),
            Err(ValidationError::IdLength {
                expected: 6,
                actual: 3
            })
        );
        assert_err!(session_id(""));
        assert_err!(session_id("ABCDEFG"));
        assert_ok!(session_id("zzzzzz"));
    }

    #[test]
    fn test_bad_characters() {
        assert_eq!(session_id("ABC12F"), Err(ValidationError::IdCharset));
        assert_eq!(session_id("ABC DE"), Err(ValidationError::IdCharset));
        // six characters, more than six bytes
        assert_eq!(session_id("ABCDEÉ"), Err(ValidationError::IdCharset));
    }

    #[test]
    fn test_mouse_delta() {
        assert_eq!(mouse_delta(12.5), Ok(12.5));
        assert_eq!(mouse_delta(-4096.0), Ok(-4096.0));
        assert_eq!(mouse_delta(f32::NAN), Err(ValidationError::NonFiniteDelta));
        assert_eq!(mouse_delta(f32::INFINITY), Err(ValidationError::NonFiniteDelta));
        assert_eq!(mouse_delta(5000.0), Err(ValidationError::DeltaOutOfRange(5000.0)));
    }
}
