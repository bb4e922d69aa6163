//! HTTP mapping for dispatch failures.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use mediator_core::MediatorError;
use serde_json::json;
use tracing::{error, warn};

#[derive(Debug)]
pub struct ApiError(pub MediatorError);

impl From<MediatorError> for ApiError {
    fn from(err: MediatorError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            MediatorError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self.0, "dispatch failed");
        } else {
            warn!(error = %self.0, "rejected request");
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}
