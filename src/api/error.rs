//! Error responses

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::error::LedgerError;

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

impl IntoResponse for LedgerError {
    fn into_response(self) -> Response {
        let message = match &self {
            LedgerError::Storage(detail) => {
                error!(error = %detail, "Storage failure");
                "internal storage error".to_string()
            }
            other => other.to_string(),
        };

        let body = ErrorBody {
            error: self.kind().to_string(),
            message,
        };
        (self.status_code(), Json(body)).into_response()
    }
}
