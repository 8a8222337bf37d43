//! Notification handlers.

use axum::{
	extract::{Path, Query, State},
	http::StatusCode,
	response::IntoResponse,
	Json,
};
use orderdesk_core::notifications::DEFAULT_NOTIFICATION_PAGE_SIZE;
use orderdesk_types::{
	ApiError, Notification, NotificationKind, PageParams, Pagination, ResolvedNotification,
};
use serde::{Deserialize, Serialize};

use super::ApiJson;
use crate::server::{AppState, AuthUser};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
	pub page: Option<usize>,
	pub limit: Option<usize>,
	#[serde(default)]
	pub show_all: bool,
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
	pub notifications: Vec<ResolvedNotification>,
	pub pagination: Pagination,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequest {
	#[serde(rename = "type")]
	pub kind: NotificationKind,
	pub message: String,
	pub related_order: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NotificationResponse {
	pub notification: Notification,
}

/// Handles GET /api/notifications.
pub async fn list(
	auth: AuthUser,
	State(state): State<AppState>,
	Query(query): Query<ListQuery>,
) -> Result<Json<ListResponse>, ApiError> {
	let params = PageParams::new(query.page, query.limit, DEFAULT_NOTIFICATION_PAGE_SIZE);
	let (notifications, pagination) = state
		.notifications
		.list(&auth.user_id, params, query.show_all)
		.await
		.map_err(super::notification_error)?;
	Ok(Json(ListResponse {
		notifications,
		pagination,
	}))
}

/// Handles POST /api/notifications.
///
/// Unknown `type` values fail body deserialization and surface as a 400
/// with the uniform error body.
pub async fn create(
	auth: AuthUser,
	State(state): State<AppState>,
	ApiJson(request): ApiJson<CreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
	let notification = state
		.notifications
		.create(
			&auth.user_id,
			request.kind,
			request.message,
			request.related_order,
		)
		.await
		.map_err(super::notification_error)?;
	Ok((StatusCode::CREATED, Json(NotificationResponse { notification })))
}

/// Handles PUT /api/notifications/{id}/read.
pub async fn mark_read(
	auth: AuthUser,
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<Json<NotificationResponse>, ApiError> {
	let notification = state
		.notifications
		.mark_read(&auth.user_id, &id)
		.await
		.map_err(super::notification_error)?;
	Ok(Json(NotificationResponse { notification }))
}
