/**
 * Error Conversion
 *
 * `BackendError` becomes a JSON response:
 *
 * ```json
 * { "message": "Event is full", "status": 409 }
 * ```
 */

use axum::response::{IntoResponse, Json, Response};

use crate::backend::error::types::BackendError;
use crate::shared::ErrorBody;

impl IntoResponse for BackendError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("{}", self);
        } else {
            tracing::debug!(status = status.as_u16(), "{}", self);
        }

        let body = ErrorBody {
            message: self.message(),
            status: status.as_u16(),
        };
        (status, Json(body)).into_response()
    }
}
