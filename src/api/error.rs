//! Error taxonomy for the remote API boundary.

use reqwest::StatusCode;
use thiserror::Error;

use crate::models::ValidationError;

/// Failure modes of a remote call, split so the worker can tell a
/// structured server rejection apart from plain transport trouble.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network or protocol level failure from reqwest.
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx response without a recognizable validation payload.
    #[error("server returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// Server rejected the uploaded file with a validation payload.
    #[error("validation failed: {0}")]
    Validation(ValidationError),

    /// Login succeeded at the HTTP level but no known token field was
    /// present in the response body.
    #[error("unrecognized login response shape")]
    UnrecognizedLogin,
}

impl ApiError {
    /// Extract the validation payload, synthesizing one from the error
    /// message otherwise, so a failed task always carries a populated
    /// error description.
    pub fn into_validation(self) -> ValidationError {
        match self {
            ApiError::Validation(v) => v,
            other => ValidationError::from_message(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_payload_passes_through() {
        let v = ValidationError::from_message("bad rows");
        let got = ApiError::Validation(v.clone()).into_validation();
        assert_eq!(got, v);
    }

    #[test]
    fn unstructured_failures_get_a_synthesized_message() {
        let got = ApiError::Status {
            status: StatusCode::BAD_GATEWAY,
            body: "upstream down".into(),
        }
        .into_validation();
        assert!(got.message.contains("502"));
        assert!(got.details.is_empty());
    }
}
