//! Authentication handlers.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use orderdesk_core::{LoginOutcome, Registration};
use orderdesk_types::{ApiError, UserProfile};
use serde::{Deserialize, Serialize};

use super::ApiJson;
use crate::server::{AppState, AuthUser};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
	pub company_name: String,
	pub purchasing_email: String,
	pub password: String,
	/// Login email. Defaults to the purchasing address when absent.
	pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
	pub message: String,
	pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
	pub email: String,
	pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
	pub token: String,
	pub user: UserProfile,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationRequiredResponse {
	pub message: String,
	pub requires_verification: bool,
}

#[derive(Debug, Deserialize)]
pub struct VerifyOtpRequest {
	pub email: String,
	pub otp: String,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
	pub user: UserProfile,
}

/// Handles POST /api/auth/register.
pub async fn register(
	State(state): State<AppState>,
	ApiJson(request): ApiJson<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
	let email = state
		.accounts
		.register(Registration {
			email: request
				.email
				.unwrap_or_else(|| request.purchasing_email.clone()),
			password: request.password,
			company_name: request.company_name,
			purchasing_email: request.purchasing_email,
		})
		.await
		.map_err(super::account_error)?;

	Ok((
		StatusCode::CREATED,
		Json(RegisterResponse {
			message: "Registration successful. Please check your email for the verification code."
				.to_string(),
			email,
		}),
	))
}

/// Handles POST /api/auth/login.
///
/// An unverified account yields 403 with `requiresVerification` so the
/// client can switch to the code-entry flow.
pub async fn login(
	State(state): State<AppState>,
	ApiJson(request): ApiJson<LoginRequest>,
) -> Result<axum::response::Response, ApiError> {
	let outcome = state
		.accounts
		.login(&request.email, &request.password)
		.await
		.map_err(super::account_error)?;

	let response = match outcome {
		LoginOutcome::Authenticated { token, user } => {
			Json(TokenResponse { token, user }).into_response()
		}
		LoginOutcome::VerificationRequired => (
			StatusCode::FORBIDDEN,
			Json(VerificationRequiredResponse {
				message: "Email not verified. A new verification code has been sent.".to_string(),
				requires_verification: true,
			}),
		)
			.into_response(),
	};
	Ok(response)
}

/// Handles POST /api/auth/verify-otp.
pub async fn verify_otp(
	State(state): State<AppState>,
	ApiJson(request): ApiJson<VerifyOtpRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
	let (token, user) = state
		.accounts
		.verify_otp(&request.email, &request.otp)
		.await
		.map_err(super::account_error)?;
	Ok(Json(TokenResponse { token, user }))
}

/// Handles GET /api/auth/profile.
pub async fn profile(
	auth: AuthUser,
	State(state): State<AppState>,
) -> Result<Json<ProfileResponse>, ApiError> {
	let user = state
		.accounts
		.profile(&auth.user_id)
		.await
		.map_err(super::account_error)?;
	Ok(Json(ProfileResponse { user }))
}
