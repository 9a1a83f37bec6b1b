//! `GatewayError`: maps `mc3e::McError` onto HTTP status codes for the
//! single-read endpoints. Batch reads never surface this — each item's
//! failure is isolated into its own `ReadOutcome.error` string instead.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error(transparent)]
    Mc(#[from] mc3e::McError),

    #[error("{0}")]
    BadRequest(String),
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = match &self {
            GatewayError::BadRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::Mc(mc3e::McError::ParseError(_)) => StatusCode::BAD_REQUEST,
            GatewayError::Mc(mc3e::McError::DeviceCodeError { .. }) => StatusCode::BAD_REQUEST,
            GatewayError::Mc(mc3e::McError::CommTypeError) => StatusCode::BAD_REQUEST,
            GatewayError::Mc(mc3e::McError::PLCTypeError) => StatusCode::BAD_REQUEST,
            GatewayError::Mc(mc3e::McError::ConnectError(_)) => StatusCode::SERVICE_UNAVAILABLE,
            GatewayError::Mc(mc3e::McError::ProtocolError(_)) => StatusCode::BAD_GATEWAY,
        };
        (status, self.to_string()).into_response()
    }
}
