//! Request handlers for the orderdesk API.
//!
//! Handlers are thin: deserialize, delegate to the core services, map
//! service errors onto the uniform HTTP error taxonomy, and shape the
//! response bodies.

pub mod auth;
pub mod notifications;
pub mod orders;

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use orderdesk_core::{AccountError, NotificationError, WorkflowError};
use orderdesk_types::ApiError;

/// JSON body extractor whose rejection carries the uniform error body.
///
/// The stock extractor answers malformed or mistyped bodies with a
/// plain-text 422; every bad request body here must surface as a 400
/// with the `{message}` shape instead.
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
	axum::Json<T>: FromRequest<S, Rejection = JsonRejection>,
	S: Send + Sync,
{
	type Rejection = ApiError;

	async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
		match axum::Json::<T>::from_request(req, state).await {
			Ok(axum::Json(value)) => Ok(ApiJson(value)),
			Err(rejection) => Err(ApiError::BadRequest(rejection.body_text())),
		}
	}
}

/// Maps workflow failures onto HTTP statuses.
pub fn workflow_error(err: WorkflowError) -> ApiError {
	match err {
		WorkflowError::OrderNotFound(_) => ApiError::NotFound("Order not found".to_string()),
		WorkflowError::InvalidTransition { .. } | WorkflowError::RestrictedTarget(_) => {
			ApiError::BadRequest(err.to_string())
		}
		WorkflowError::Storage(detail) => ApiError::Internal(detail),
	}
}

/// Maps notification-service failures onto HTTP statuses.
pub fn notification_error(err: NotificationError) -> ApiError {
	match err {
		NotificationError::NotFound(_) => {
			ApiError::NotFound("Notification not found".to_string())
		}
		NotificationError::Storage(detail) => ApiError::Internal(detail),
	}
}

/// Maps account-service failures onto HTTP statuses.
pub fn account_error(err: AccountError) -> ApiError {
	match err {
		AccountError::EmailTaken | AccountError::InvalidOtp => {
			ApiError::BadRequest(err.to_string())
		}
		AccountError::InvalidCredentials => ApiError::Unauthorized(err.to_string()),
		AccountError::Inactive => ApiError::Forbidden(err.to_string()),
		AccountError::UserNotFound => ApiError::NotFound(err.to_string()),
		AccountError::Storage(detail)
		| AccountError::Mailer(detail)
		| AccountError::Auth(detail) => ApiError::Internal(detail),
	}
}
