use eda_core::EdaError;
use hyper::{Body, Response, StatusCode};
use serde::Serialize;
use thiserror::Error;

/// Errors returned by the HTTP handlers.
///
/// Every variant renders as a `{"detail": "..."}` body.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found")]
    NotFound,

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("{0}")]
    BadRequest(String),

    #[error("Upload exceeds the limit of {0} bytes")]
    PayloadTooLarge(u64),

    /// Failures from loading or profiling the upload.
    #[error(transparent)]
    Core(#[from] EdaError),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Core(e) if e.is_user_error() => StatusCode::BAD_REQUEST,
            Self::Core(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn into_response(self) -> Response<Body> {
        let status = self.status();
        let body = ErrorBody {
            detail: self.to_string(),
        };
        crate::json_response(status, &body)
    }
}
