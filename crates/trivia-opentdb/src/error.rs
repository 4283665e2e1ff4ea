//! Errors emitted by the Open Trivia Database client.

use thiserror::Error;
use trivia_core::error::{DomainError, ValidationError};

/// Errors emitted by `OpenTdbClient`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum OpenTdbError {
    #[error("question bank request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error("question bank answered with response code {code}: {reason}")]
    ResponseCode { code: u8, reason: &'static str },
    #[error("question bank returned no questions")]
    Empty,
    #[error("field `{field}` is not valid base64: {source}")]
    Base64 {
        field: &'static str,
        source: base64::DecodeError,
    },
    #[error("field `{0}` is not valid UTF-8")]
    Utf8(&'static str),
    #[error(transparent)]
    Malformed(#[from] ValidationError),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl OpenTdbError {
    /// Maps a non-zero `response_code` to an error.
    #[must_use]
    pub fn from_response_code(code: u8) -> Self {
        let reason = match code {
            1 => "no results",
            2 => "invalid parameter",
            3 => "session token not found",
            4 => "session token exhausted",
            5 => "rate limited",
            _ => "unknown",
        };
        Self::ResponseCode { code, reason }
    }
}

impl From<OpenTdbError> for DomainError {
    fn from(err: OpenTdbError) -> Self {
        Self::Provider(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_codes_are_described() {
        let err = OpenTdbError::from_response_code(5);

        assert_eq!(
            err.to_string(),
            "question bank answered with response code 5: rate limited"
        );
    }

    #[test]
    fn test_converts_into_provider_error() {
        let err: DomainError = OpenTdbError::Empty.into();

        assert!(matches!(err, DomainError::Provider(msg) if msg.contains("no questions")));
    }
}
