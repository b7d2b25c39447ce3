//! Error conversion
//!
//! Every [`GatewayError`] renders as a JSON body with the mapped status:
//!
//! ```json
//! { "error": "Error message", "status": 400 }
//! ```

use crate::backend::error::types::GatewayError;
use axum::{
    response::{IntoResponse, Response},
    Json,
};

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.message();
        if status.is_server_error() {
            tracing::warn!("[Gateway] {} {}", status.as_u16(), message);
        }

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });
        (status, Json(body)).into_response()
    }
}
