use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

use crate::model::UpstreamError;
use crate::web::models::ErrorResponse;

/// Everything that can end a `/chat` request early. Each variant maps to a
/// fixed client-facing message; details stay in the server log.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("GROQ_API_KEY not set on server")]
    MissingCredential,

    #[error("Request body could not be read")]
    UnreadableBody(String),

    #[error("Invalid JSON")]
    MalformedInput(#[source] serde_json::Error),

    #[error("Missing \"message\" string in body")]
    MissingMessage,

    #[error("Error talking to Groq API")]
    Upstream(#[from] UpstreamError),
}

impl ResponseError for RelayError {
    fn status_code(&self) -> StatusCode {
        match self {
            RelayError::UnreadableBody(_)
            | RelayError::MalformedInput(_)
            | RelayError::MissingMessage => StatusCode::BAD_REQUEST,
            RelayError::MissingCredential | RelayError::Upstream(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_bad_requests() {
        let malformed = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(
            RelayError::MalformedInput(malformed).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(RelayError::MissingMessage.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            RelayError::UnreadableBody("payload reached size limit".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn server_side_failures_are_internal_errors() {
        assert_eq!(
            RelayError::MissingCredential.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        let upstream = UpstreamError::Status {
            status: reqwest::StatusCode::BAD_GATEWAY,
            body: "secret upstream detail".to_string(),
        };
        let err = RelayError::from(upstream);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Error talking to Groq API");
    }
}
