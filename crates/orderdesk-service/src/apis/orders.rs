//! Order handlers.

use axum::{
	extract::{Path, Query, State},
	Json,
};
use orderdesk_core::workflow::DEFAULT_ORDER_PAGE_SIZE;
use orderdesk_types::{ApiError, Notification, Order, OrderStatus, PageParams, Pagination};
use serde::{Deserialize, Serialize};

use super::ApiJson;
use crate::server::{AppState, AuthUser};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
	pub page: Option<usize>,
	pub limit: Option<usize>,
	pub search: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
	pub orders: Vec<Order>,
	pub pagination: Pagination,
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
	pub order: Order,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
	/// Raw status value; parsed here so unknown values map to 400
	/// instead of a body-rejection status.
	pub status: String,
}

#[derive(Debug, Serialize)]
pub struct UpdateStatusResponse {
	pub order: Order,
	pub notification: Notification,
}

#[derive(Debug, Serialize)]
pub struct DecisionResponse {
	pub success: bool,
	pub message: String,
	pub order: Order,
}

/// Handles GET /api/orders.
pub async fn list(
	auth: AuthUser,
	State(state): State<AppState>,
	Query(query): Query<ListQuery>,
) -> Result<Json<ListResponse>, ApiError> {
	let params = PageParams::new(query.page, query.limit, DEFAULT_ORDER_PAGE_SIZE);
	let (orders, pagination) = state
		.workflow
		.list_orders(&auth.user_id, params, query.search.as_deref())
		.await
		.map_err(super::workflow_error)?;
	Ok(Json(ListResponse { orders, pagination }))
}

/// Handles GET /api/orders/{id}.
pub async fn get_by_id(
	auth: AuthUser,
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
	let order = state
		.workflow
		.get_order(&auth.user_id, &id)
		.await
		.map_err(super::workflow_error)?;
	Ok(Json(OrderResponse { order }))
}

/// Handles PUT /api/orders/{id}/status.
pub async fn update_status(
	auth: AuthUser,
	State(state): State<AppState>,
	Path(id): Path<String>,
	ApiJson(request): ApiJson<UpdateStatusRequest>,
) -> Result<Json<UpdateStatusResponse>, ApiError> {
	let status: OrderStatus = request
		.status
		.parse()
		.map_err(|_| ApiError::BadRequest(format!("Invalid status value: {}", request.status)))?;

	let (order, notification) = state
		.workflow
		.update_status(&auth.user_id, &id, status)
		.await
		.map_err(super::workflow_error)?;
	Ok(Json(UpdateStatusResponse {
		order,
		notification,
	}))
}

/// Handles POST /api/orders/{id}/confirm.
pub async fn confirm(
	auth: AuthUser,
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<Json<DecisionResponse>, ApiError> {
	let order = state
		.workflow
		.confirm(&auth.user_id, &id)
		.await
		.map_err(super::workflow_error)?;
	Ok(Json(DecisionResponse {
		success: true,
		message: format!("Order {} confirmed", order.order_code),
		order,
	}))
}

/// Handles POST /api/orders/{id}/reject.
pub async fn reject(
	auth: AuthUser,
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<Json<DecisionResponse>, ApiError> {
	let order = state
		.workflow
		.reject(&auth.user_id, &id)
		.await
		.map_err(super::workflow_error)?;
	Ok(Json(DecisionResponse {
		success: true,
		message: format!("Order {} rejected", order.order_code),
		order,
	}))
}
