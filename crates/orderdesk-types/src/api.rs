//! API types for the orderdesk HTTP API.
//!
//! This module defines the pagination envelope, page parameters, and the
//! structured error type with its HTTP status mapping. Every error leaves
//! the service as a uniform `{"message": "..."}` body.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Pagination envelope returned alongside every list response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
	/// Total number of records matching the query.
	pub total: usize,
	/// Total number of pages at the requested limit.
	pub pages: usize,
	/// The page that was returned (1-based).
	pub current_page: usize,
	/// Whether records exist beyond the returned page.
	pub has_more: bool,
}

impl Pagination {
	/// Builds the envelope from the query outcome.
	///
	/// `returned` is the number of records actually on this page, so
	/// `has_more` follows the `skip + returned < total` rule.
	pub fn new(total: usize, page: usize, limit: usize, returned: usize) -> Self {
		let skip = (page.saturating_sub(1)) * limit;
		Self {
			total,
			pages: total.div_ceil(limit.max(1)),
			current_page: page,
			has_more: skip + returned < total,
		}
	}
}

/// Page selection parameters shared by the list endpoints.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageParams {
	/// 1-based page number.
	pub page: usize,
	/// Records per page. No upper bound is enforced.
	pub limit: usize,
}

impl PageParams {
	/// Creates page parameters, falling back to defaults for absent or
	/// zero values.
	pub fn new(page: Option<usize>, limit: Option<usize>, default_limit: usize) -> Self {
		Self {
			page: page.filter(|p| *p > 0).unwrap_or(1),
			limit: limit.filter(|l| *l > 0).unwrap_or(default_limit),
		}
	}

	/// Number of records to skip before this page.
	pub fn skip(&self) -> usize {
		(self.page - 1) * self.limit
	}
}

/// Uniform error body sent to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
	/// Human-readable description surfaced by the frontend.
	pub message: String,
}

/// Structured API error with its HTTP status mapping.
///
/// Internal failures carry detail for the logs but leave the service as a
/// generic message; everything else surfaces its message verbatim.
#[derive(Debug)]
pub enum ApiError {
	/// Malformed or unsupported input, or an illegal state transition (400).
	BadRequest(String),
	/// Missing, invalid, or expired credentials (401).
	Unauthorized(String),
	/// Deactivated or unverified account (403).
	Forbidden(String),
	/// Missing entity or cross-owner access (404).
	NotFound(String),
	/// Unexpected failure; detail is logged, not exposed (500).
	Internal(String),
}

impl ApiError {
	/// Get the HTTP status code for this error.
	pub fn status_code(&self) -> u16 {
		match self {
			ApiError::BadRequest(_) => 400,
			ApiError::Unauthorized(_) => 401,
			ApiError::Forbidden(_) => 403,
			ApiError::NotFound(_) => 404,
			ApiError::Internal(_) => 500,
		}
	}

	/// The message clients see. Internal detail never crosses the wire.
	pub fn client_message(&self) -> &str {
		match self {
			ApiError::BadRequest(message)
			| ApiError::Unauthorized(message)
			| ApiError::Forbidden(message)
			| ApiError::NotFound(message) => message,
			ApiError::Internal(_) => "Server error",
		}
	}
}

impl fmt::Display for ApiError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ApiError::BadRequest(message) => write!(f, "Bad Request: {}", message),
			ApiError::Unauthorized(message) => write!(f, "Unauthorized: {}", message),
			ApiError::Forbidden(message) => write!(f, "Forbidden: {}", message),
			ApiError::NotFound(message) => write!(f, "Not Found: {}", message),
			ApiError::Internal(message) => write!(f, "Internal Server Error: {}", message),
		}
	}
}

impl std::error::Error for ApiError {}

impl axum::response::IntoResponse for ApiError {
	fn into_response(self) -> axum::response::Response {
		use axum::{http::StatusCode, response::Json};

		if let ApiError::Internal(detail) = &self {
			tracing::error!("Internal error: {}", detail);
		}

		let status = StatusCode::from_u16(self.status_code())
			.unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
		let body = ErrorBody {
			message: self.client_message().to_string(),
		};
		(status, Json(body)).into_response()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn envelope_math_matches_skip_limit_semantics() {
		// 12 records, limit 5: page 1 holds 5, page 3 holds the last 2.
		let first = Pagination::new(12, 1, 5, 5);
		assert_eq!(first.pages, 3);
		assert!(first.has_more);

		let last = Pagination::new(12, 3, 5, 2);
		assert_eq!(last.current_page, 3);
		assert!(!last.has_more);
	}

	#[test]
	fn empty_result_has_no_more_pages() {
		let envelope = Pagination::new(0, 1, 10, 0);
		assert_eq!(envelope.total, 0);
		assert_eq!(envelope.pages, 0);
		assert!(!envelope.has_more);
	}

	#[test]
	fn page_params_default_and_clamp() {
		let params = PageParams::new(None, None, 10);
		assert_eq!((params.page, params.limit), (1, 10));

		let params = PageParams::new(Some(0), Some(0), 10);
		assert_eq!((params.page, params.limit), (1, 10));

		let params = PageParams::new(Some(2), Some(10), 10);
		assert_eq!(params.skip(), 10);
	}

	#[test]
	fn internal_errors_hide_detail_from_clients() {
		let error = ApiError::Internal("storage backend offline".into());
		assert_eq!(error.client_message(), "Server error");
		assert_eq!(error.status_code(), 500);

		let error = ApiError::NotFound("Order not found".into());
		assert_eq!(error.client_message(), "Order not found");
	}
}
