use thiserror::Error;

use crate::api::types::ApiErrorBody;

/// Failure of a console operation, classified for display.
///
/// Every kind ends the operation that produced it; nothing here is retried
/// automatically.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsoleError {
    #[error("{0}")]
    IllegalTransition(String),
    #[error("{0}")]
    MissingReason(String),
    /// Rejected input other than a missing reason, e.g. an overlong reason.
    #[error("{0}")]
    Invalid(String),
    /// Not signed in, or signed in without review authority.
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    TransientFailure(String),
    #[error("unexpected response ({status}): {message}")]
    Unexpected { status: u16, message: String },
}

impl ConsoleError {
    /// Only transient failures may be retried, and only by the user.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ConsoleError::TransientFailure(_))
    }

    /// The view is out of date and must be re-fetched before acting again.
    ///
    /// An illegal transition means the action was offered for a state the
    /// account is no longer in.
    pub fn requires_refresh(&self) -> bool {
        matches!(
            self,
            ConsoleError::NotFound(_)
                | ConsoleError::Conflict(_)
                | ConsoleError::IllegalTransition(_)
        )
    }

    pub fn from_response(status: u16, body: Option<ApiErrorBody>) -> Self {
        let body = body.unwrap_or_default();
        let message = if body.error.is_empty() {
            default_message(status).to_string()
        } else {
            body.error
        };

        match body.code.as_str() {
            "ILLEGAL_TRANSITION" => return ConsoleError::IllegalTransition(message),
            "MISSING_REASON" => return ConsoleError::MissingReason(message),
            "CONFLICT" => return ConsoleError::Conflict(message),
            "NOT_FOUND" => return ConsoleError::NotFound(message),
            "UNAUTHORIZED" | "FORBIDDEN" => return ConsoleError::Unauthorized(message),
            _ => {}
        }

        match status {
            401 | 403 => ConsoleError::Unauthorized(message),
            404 => ConsoleError::NotFound(message),
            409 => ConsoleError::Conflict(message),
            422 => ConsoleError::MissingReason(message),
            400 => ConsoleError::Invalid(message),
            408 | 429 | 500..=599 => ConsoleError::TransientFailure(message),
            _ => ConsoleError::Unexpected { status, message },
        }
    }

    pub fn from_transport(err: &reqwest::Error) -> Self {
        if err.is_decode() {
            return ConsoleError::Unexpected {
                status: err.status().map(|s| s.as_u16()).unwrap_or(0),
                message: format!("Failed to parse response: {}", err),
            };
        }
        ConsoleError::TransientFailure(format!("Request failed: {}", err))
    }
}

fn default_message(status: u16) -> &'static str {
    match status {
        401 => "Please sign in again",
        403 => "You are not allowed to review accounts",
        404 => "Account not found",
        409 => "The account changed; refresh and try again",
        422 => "A reason is required",
        408 | 429 | 500..=599 => "The server is unavailable; try again",
        _ => "Unexpected response",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(code: &str) -> Option<ApiErrorBody> {
        Some(ApiErrorBody {
            error: format!("{} message", code),
            code: code.to_string(),
            details: None,
        })
    }

    #[test]
    fn codes_take_precedence_over_status() {
        assert!(matches!(
            ConsoleError::from_response(409, body("ILLEGAL_TRANSITION")),
            ConsoleError::IllegalTransition(_)
        ));
        assert!(matches!(
            ConsoleError::from_response(409, body("CONFLICT")),
            ConsoleError::Conflict(_)
        ));
        assert!(matches!(
            ConsoleError::from_response(403, body("FORBIDDEN")),
            ConsoleError::Unauthorized(_)
        ));
        assert_eq!(
            ConsoleError::from_response(422, body("MISSING_REASON")),
            ConsoleError::MissingReason("MISSING_REASON message".into())
        );
    }

    #[test]
    fn status_fallback_without_body() {
        assert!(matches!(
            ConsoleError::from_response(503, None),
            ConsoleError::TransientFailure(_)
        ));
        assert!(matches!(
            ConsoleError::from_response(429, None),
            ConsoleError::TransientFailure(_)
        ));
        assert!(matches!(
            ConsoleError::from_response(404, None),
            ConsoleError::NotFound(_)
        ));
        assert!(matches!(
            ConsoleError::from_response(400, body("VALIDATION_ERROR")),
            ConsoleError::Invalid(_)
        ));
        assert!(matches!(
            ConsoleError::from_response(418, None),
            ConsoleError::Unexpected { status: 418, .. }
        ));
    }

    #[test]
    fn retry_and_refresh_flags() {
        let transient = ConsoleError::TransientFailure("x".into());
        assert!(transient.is_retryable());
        assert!(!transient.requires_refresh());

        for err in [
            ConsoleError::Conflict("x".into()),
            ConsoleError::NotFound("x".into()),
            ConsoleError::IllegalTransition("x".into()),
        ] {
            assert!(err.requires_refresh());
            assert!(!err.is_retryable());
        }

        for err in [
            ConsoleError::MissingReason("x".into()),
            ConsoleError::Unauthorized("x".into()),
        ] {
            assert!(!err.is_retryable());
            assert!(!err.requires_refresh());
        }
    }
}
