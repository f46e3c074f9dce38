use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Reasons a message is rejected before it leaves the process
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("message is invalid")]
    InvalidMessage,

    #[error("target is invalid. topic, token or condition maybe used")]
    InvalidTarget,

    #[error("messages time-to-live is invalid")]
    InvalidTimeToLive,

    #[error("apns message priority is invalid")]
    InvalidApnsPriority,

    #[error("apns payload is malformed: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Non-2xx answer from the FCM endpoint.
///
/// Both sides of the exchange are kept verbatim so operators can log them.
/// The dumps include the `Authorization` header; treat them as secrets.
#[derive(Error, Debug, Clone)]
#[error("{message}")]
pub struct HttpError {
    pub status: http::StatusCode,
    pub request_dump: String,
    pub response_dump: String,
    message: String,
}

impl HttpError {
    pub fn new(status: http::StatusCode, request_dump: String, response_dump: String) -> Self {
        Self {
            status,
            request_dump,
            response_dump,
            message: format!("{} error: {}", status.as_u16(), status),
        }
    }

    pub fn is_server_error(&self) -> bool {
        self.status.is_server_error()
    }
}

/// FCM Client Error Types
#[derive(Error, Debug)]
pub enum FCMError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("fcm: failed to read credentials file at '{}': {source}", path.display())]
    CredentialsRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("fcm: failed to get JWT config for the firebase.messaging scope: {0}")]
    InvalidCredentials(String),

    #[error("Failed to parse private key: {0}")]
    KeyParseError(String),

    #[error("Failed to encode JWT: {0}")]
    JwtEncodeError(String),

    #[error("fcm: failed to generate Bearer token: {0}")]
    TokenError(String),

    #[error("Failed to serialize FCM request: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("FCM send request failed: {0}")]
    SendRequestError(String),

    #[error(transparent)]
    Http(#[from] HttpError),

    #[error("Failed to parse FCM response: {0}")]
    ResponseParseError(String),

    #[error("FCM send timed out after {0:?}")]
    Timeout(Duration),

    #[error("Invalid FCM configuration: {0}")]
    Config(String),
}

impl FCMError {
    /// Validation kind, when the message was rejected locally
    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            FCMError::Validation(err) => Some(err),
            _ => None,
        }
    }

    /// HTTP diagnostics, when the service answered with a non-2xx status
    pub fn http(&self) -> Option<&HttpError> {
        match self {
            FCMError::Http(err) => Some(err),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, FCMError>;
