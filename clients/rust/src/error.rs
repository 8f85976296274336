use thiserror::Error;

use crate::model::ErrorBody;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

const GENERIC_REQUEST_FAILED: &str = "The server could not complete the request.";

#[derive(Error, Debug)]
pub enum Error {
    #[error("The request URL is invalid.")]
    InvalidUrl { input: String },
    #[error("{message}")]
    RequestFailed {
        status: u16,
        body: Vec<u8>,
        message: String,
    },
    #[error("The server response could not be read.")]
    DecodingFailed(#[source] serde_json::Error),
    #[error("The request data could not be prepared.")]
    EncodingFailed(#[source] serde_json::Error),
    #[error("No internet connection. Check your network and try again.")]
    NoInternetConnection,
    #[error("The request timed out. Please try again.")]
    RequestTimedOut,
    #[error("The server is unavailable. Please try again later.")]
    ServerUnavailable,
    #[error("An unexpected error occurred.")]
    Unexpected(#[source] BoxError),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn invalid_url(input: impl Into<String>) -> Self {
        Self::InvalidUrl {
            input: input.into(),
        }
    }

    /// Builds `RequestFailed`, preferring the server's `"message"` field
    /// over the generic text. The body is kept as received.
    pub fn request_failed(status: u16, body: Vec<u8>) -> Self {
        let message = serde_json::from_slice::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.message)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| GENERIC_REQUEST_FAILED.to_string());
        Self::RequestFailed {
            status,
            body,
            message,
        }
    }

    pub(crate) fn unexpected<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self::Unexpected(err.into())
    }

    /// HTTP status of a `RequestFailed` error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RequestFailed { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_failed_prefers_server_message() {
        let err = Error::request_failed(401, br#"{"message":"token expired"}"#.to_vec());
        assert_eq!(err.to_string(), "token expired");
        assert_eq!(err.status(), Some(401));
    }

    #[test]
    fn request_failed_falls_back_on_blank_message() {
        let err = Error::request_failed(500, br#"{"message":"   "}"#.to_vec());
        assert_eq!(err.to_string(), GENERIC_REQUEST_FAILED);
    }

    #[test]
    fn request_failed_falls_back_on_non_json_body() {
        let err = Error::request_failed(502, b"<html>bad gateway</html>".to_vec());
        assert_eq!(err.to_string(), GENERIC_REQUEST_FAILED);
        match err {
            Error::RequestFailed { body, .. } => {
                assert_eq!(body, b"<html>bad gateway</html>".to_vec());
            }
            _ => panic!("expected RequestFailed"),
        }
    }

    #[test]
    fn request_failed_ignores_non_string_message() {
        let err = Error::request_failed(400, br#"{"message":42}"#.to_vec());
        assert_eq!(err.to_string(), GENERIC_REQUEST_FAILED);
    }

    #[test]
    fn transport_variants_have_fixed_messages() {
        assert_eq!(
            Error::RequestTimedOut.to_string(),
            "The request timed out. Please try again."
        );
        assert_eq!(
            Error::invalid_url("::").to_string(),
            "The request URL is invalid."
        );
        assert!(Error::ServerUnavailable.status().is_none());
    }
}
