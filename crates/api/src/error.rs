use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use fleetd_core::Error;
use fleetd_wire::ErrorBody;

/// Wraps the core error taxonomy (§7) so it can implement `IntoResponse`
/// without `fleetd-core` taking an axum dependency.
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::Invalid(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Conflict(_) => StatusCode::CONFLICT,
            Error::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Error::Forbidden(_) => StatusCode::FORBIDDEN,
            Error::RuntimeUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Error::ImagePull(_) => StatusCode::BAD_GATEWAY,
            Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self.0, "request failed");
        } else {
            tracing::warn!(error = %self.0, status = %status, "request rejected");
        }
        (status, Json(ErrorBody::new(self.0.to_string()))).into_response()
    }
}
