use crate::{Error, ErrorType};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::{error, warn};

/// An error returned by a handler. The body is `{"detail": <message>}`.
#[derive(Debug)]
pub(crate) struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    pub(crate) fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }
}

/// Every failure of the ledger is reported as a 500 with the error message, whatever its type.
/// A request that cannot be understood is a 422.
impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        match e.error_type() {
            ErrorType::Request => {
                warn!("Rejected request: {e}");
                Self::new(StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
            }
            error_type => {
                error!("Request failed ({error_type}): {e}");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}
