//! HTTP error mapping.
//!
//! Every handler returns the domain taxonomy; this module translates it to
//! a status code and the `{success: false, error}` body. The `stack` field
//! carries the debug rendering in non-release builds only.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use solver_types::SolverError;

/// Wrapper giving `SolverError` an HTTP rendering.
#[derive(Debug)]
pub struct ApiError(pub SolverError);

impl From<SolverError> for ApiError {
	fn from(e: SolverError) -> Self {
		Self(e)
	}
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let status = match &self.0 {
			SolverError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
			SolverError::NotFound(_) => StatusCode::NOT_FOUND,
			SolverError::NoPool(_)
			| SolverError::NoLiquidity(_)
			| SolverError::InsufficientBalance { .. }
			| SolverError::NoFeeCoin => StatusCode::BAD_REQUEST,
			SolverError::Reverted { .. }
			| SolverError::Transient(_)
			| SolverError::Config(_)
			| SolverError::Fatal(_) => StatusCode::INTERNAL_SERVER_ERROR,
		};

		let mut body = json!({
			"success": false,
			"error": self.0.to_string(),
		});
		#[cfg(debug_assertions)]
		{
			body["stack"] = json!(format!("{:?}", self.0));
		}

		(status, Json(body)).into_response()
	}
}

/// Shorthand for request-validation failures.
pub fn invalid(message: impl Into<String>) -> ApiError {
	ApiError(SolverError::InvalidArgument(message.into()))
}

#[cfg(test)]
mod tests {
	use super::*;

	fn status_of(e: SolverError) -> StatusCode {
		ApiError(e).into_response().status()
	}

	#[test]
	fn taxonomy_maps_to_status_codes() {
		assert_eq!(
			status_of(SolverError::InvalidArgument("x".into())),
			StatusCode::BAD_REQUEST
		);
		assert_eq!(
			status_of(SolverError::NotFound("x".into())),
			StatusCode::NOT_FOUND
		);
		assert_eq!(
			status_of(SolverError::NoPool("x".into())),
			StatusCode::BAD_REQUEST
		);
		assert_eq!(
			status_of(SolverError::NoLiquidity("x".into())),
			StatusCode::BAD_REQUEST
		);
		assert_eq!(
			status_of(SolverError::reverted(2)),
			StatusCode::INTERNAL_SERVER_ERROR
		);
		assert_eq!(
			status_of(SolverError::Transient("x".into())),
			StatusCode::INTERNAL_SERVER_ERROR
		);
	}
}
