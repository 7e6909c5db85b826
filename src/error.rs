use axum::{
    http::StatusCode,
    response::{ IntoResponse, Response },
    Json,
};
use thiserror::Error;

use crate::models::plan::{ ErrorBody, MessageBody };

/// Failures surfaced to the form controller. Each renders as the single
/// message shown next to the submit control.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlannerError {
    #[error("Please enter a destination or trip request.")]
    Validation,

    #[error("Backend error: HTTP {status}: {}", or_unknown(.detail))]
    Backend {
        status: u16,
        detail: String,
    },

    #[error("Could not reach the planner: {0}")]
    Transport(String),

    #[error("Unexpected response from the planner: {0}")]
    Decode(String),

    #[error("Proxy could not reach upstream: {0}")]
    ProxyUpstream(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Saved plan storage error: {0}")]
    Storage(String),
}

fn or_unknown(detail: &str) -> &str {
    if detail.trim().is_empty() { "unknown" } else { detail }
}

/// Set on responses where the proxy itself failed, so clients can tell them
/// apart from an upstream error relayed verbatim.
pub const PROXY_ERROR_HEADER: &str = "x-riff-proxy-error";

/// Errors returned by the HTTP front-end.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Malformed payload")]
    MalformedPayload,

    #[error("Destination is required.")]
    MissingDestination,

    #[error("{0}")]
    Upstream(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::MalformedPayload | ApiError::MissingDestination => {
                (StatusCode::BAD_REQUEST, Json(MessageBody { message: self.to_string() })).into_response()
            }
            ApiError::Upstream(_) => {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    [(PROXY_ERROR_HEADER, "upstream-unreachable")],
                    Json(ErrorBody { error: self.to_string() }),
                ).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_message_falls_back_to_unknown() {
        let err = PlannerError::Backend { status: 502, detail: String::new() };
        assert_eq!(err.to_string(), "Backend error: HTTP 502: unknown");

        let err = PlannerError::Backend { status: 400, detail: "{\"message\":\"nope\"}".into() };
        assert_eq!(err.to_string(), "Backend error: HTTP 400: {\"message\":\"nope\"}");
    }
}
