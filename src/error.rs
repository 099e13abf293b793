use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Webhook authentication failures. Reported to the sender as 401.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("secret configured but request carries no signature header")]
    MissingSecret,
    #[error("signature mismatch")]
    SignatureMismatch,
}

/// Request decoding failures. Reported to the sender as 400/415.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("missing x-gitlab-event header")]
    MissingEventHeader,
    #[error("malformed body: {0}")]
    MalformedBody(String),
    #[error("unsupported content type: {0}")]
    UnsupportedContentType(String),
}

/// Outbound call failures against the GitLab API.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    #[error("network error: {0}")]
    Network(String),
    #[error("gitlab returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid response body: {0}")]
    Decode(String),
}

/// Anything a handler can fail with. Logged, never surfaced to the webhook sender.
#[derive(Debug, Clone, thiserror::Error)]
pub enum HandlerError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("payload missing field: {0}")]
    Payload(String),
    #[error("handler panicked: {0}")]
    Panicked(String),
    #[error("{0}")]
    Other(String),
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unauthorized: {0}")]
    Auth(#[from] AuthError),
    #[error("bad request: {0}")]
    Parse(#[from] ParseError),
    #[error("config error: {0}")]
    Config(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::Auth(_) => StatusCode::UNAUTHORIZED,
            Error::Parse(ParseError::UnsupportedContentType(_)) => {
                StatusCode::UNSUPPORTED_MEDIA_TYPE
            }
            Error::Parse(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}

pub type Result<T> = std::result::Result<T, Error>;
