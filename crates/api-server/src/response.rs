//! JSON response envelope and error mapping
//!
//! Every body has the shape `{status, data?, error?: {code, desc}}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tasks_core::Error;

pub const FIELD_BAD_FORMAT: &str = "FIELD_BADFORMAT";
pub const FIELD_INCORRECT: &str = "FIELD_INCORRECT";
pub const FIELD_NOT_FOUND: &str = "FIELD_NOT_FOUND";
pub const SERVICE_UNAVAILABLE: &str = "SERVICE_UNAVAILABLE";
pub const SERVICE_UNAVAILABLE_DESC: &str =
    "Service is currently unavailable. Please try again later.";

#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub desc: String,
}

impl<T: Serialize> Envelope<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: "success",
            data: Some(data),
            error: None,
        }
    }
}

impl Envelope<()> {
    pub fn ok() -> Self {
        Self {
            status: "success",
            data: None,
            error: None,
        }
    }
}

/// Handler failure, already classified for the client
#[derive(Debug)]
pub enum ApiError {
    /// Body, path or query could not be parsed
    BadFormat(String),
    /// Parsed but failed validation
    Incorrect(String),
    NotFound(String),
    /// Internal failure; detail stays in the logs
    Unavailable,
    /// Deadline or cancellation; the client may retry
    Interrupted,
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            Self::BadFormat(desc) => (StatusCode::BAD_REQUEST, FIELD_BAD_FORMAT, desc.clone()),
            Self::Incorrect(desc) => (StatusCode::BAD_REQUEST, FIELD_INCORRECT, desc.clone()),
            Self::NotFound(desc) => (StatusCode::NOT_FOUND, FIELD_NOT_FOUND, desc.clone()),
            Self::Unavailable => (
                StatusCode::INTERNAL_SERVER_ERROR,
                SERVICE_UNAVAILABLE,
                SERVICE_UNAVAILABLE_DESC.to_string(),
            ),
            Self::Interrupted => (
                StatusCode::SERVICE_UNAVAILABLE,
                SERVICE_UNAVAILABLE,
                SERVICE_UNAVAILABLE_DESC.to_string(),
            ),
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::Validation(msg) => Self::Incorrect(msg),
            Error::NotFound(msg) => Self::NotFound(msg),
            Error::Internal(msg) => {
                tracing::error!(error = %msg, "Repository failure");
                Self::Unavailable
            }
            Error::Cancelled(msg) => {
                tracing::warn!(error = %msg, "Repository operation interrupted");
                Self::Interrupted
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, desc) = self.parts();
        let body = Envelope::<()> {
            status: "error",
            data: None,
            error: Some(ErrorBody { code, desc }),
        };
        (status, Json(body)).into_response()
    }
}
