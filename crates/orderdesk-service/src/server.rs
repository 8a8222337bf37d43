//! HTTP server for the orderdesk API.
//!
//! Hosts the routing table under `/api` and the bearer-token extractor
//! guarding the authenticated routes.

use axum::{
	extract::FromRequestParts,
	http::request::Parts,
	routing::{get, post, put},
	Router,
};
use orderdesk_auth::TokenSigner;
use orderdesk_config::ServerConfig;
use orderdesk_core::{AccountService, NotificationService, OrderWorkflow};
use orderdesk_types::ApiError;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::apis;

/// Shared application state for the API server.
#[derive(Clone)]
pub struct AppState {
	/// Order transitions and notification synchronization.
	pub workflow: Arc<OrderWorkflow>,
	/// Notification queries and mutations.
	pub notifications: Arc<NotificationService>,
	/// Registration, verification, and login.
	pub accounts: Arc<AccountService>,
	/// Token verification for the bearer extractor.
	pub tokens: Arc<TokenSigner>,
}

/// The identity established by a verified bearer token.
///
/// Handlers take this as an extractor argument; requests without a valid
/// `Authorization: Bearer` header are rejected with 401 before the
/// handler runs.
pub struct AuthUser {
	/// User id from the token's `sub` claim.
	pub user_id: String,
}

impl FromRequestParts<AppState> for AuthUser {
	type Rejection = ApiError;

	async fn from_request_parts(
		parts: &mut Parts,
		state: &AppState,
	) -> Result<Self, Self::Rejection> {
		let header = parts
			.headers
			.get(axum::http::header::AUTHORIZATION)
			.and_then(|value| value.to_str().ok())
			.ok_or_else(|| ApiError::Unauthorized("Missing authorization token".to_string()))?;

		let token = header
			.strip_prefix("Bearer ")
			.ok_or_else(|| ApiError::Unauthorized("Missing authorization token".to_string()))?;

		let claims = state
			.tokens
			.verify(token)
			.map_err(|_| ApiError::Unauthorized("Invalid or expired token".to_string()))?;

		Ok(AuthUser {
			user_id: claims.sub,
		})
	}
}

/// Starts the HTTP server.
pub async fn start_server(
	server_config: ServerConfig,
	state: AppState,
) -> Result<(), Box<dyn std::error::Error>> {
	let app = router(state);

	let bind_address = format!("{}:{}", server_config.host, server_config.port);
	let listener = TcpListener::bind(&bind_address).await?;

	tracing::info!("orderdesk API server starting on {}", bind_address);

	axum::serve(listener, app).await?;

	Ok(())
}

/// Builds the routing table under the `/api` base path.
pub fn router(state: AppState) -> Router {
	Router::new()
		.nest(
			"/api",
			Router::new()
				.route("/auth/register", post(apis::auth::register))
				.route("/auth/login", post(apis::auth::login))
				.route("/auth/verify-otp", post(apis::auth::verify_otp))
				.route("/auth/profile", get(apis::auth::profile))
				.route("/orders", get(apis::orders::list))
				.route("/orders/{id}", get(apis::orders::get_by_id))
				.route("/orders/{id}/status", put(apis::orders::update_status))
				.route("/orders/{id}/confirm", post(apis::orders::confirm))
				.route("/orders/{id}/reject", post(apis::orders::reject))
				.route(
					"/notifications",
					get(apis::notifications::list).post(apis::notifications::create),
				)
				.route(
					"/notifications/{id}/read",
					put(apis::notifications::mark_read),
				),
		)
		.layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
		.with_state(state)
}

#[cfg(test)]
mod tests {
	use super::*;
	use axum::body::{to_bytes, Body};
	use axum::http::{header, Request, StatusCode};
	use chrono::Utc;
	use orderdesk_auth::mailer::LogMailer;
	use orderdesk_storage::implementations::memory::MemoryStorage;
	use orderdesk_storage::StorageService;
	use orderdesk_core::NewOrder;
	use orderdesk_types::{OrderItem, SecretString};
	use rust_decimal::Decimal;
	use tower::ServiceExt;

	fn sample_order(user_id: &str) -> NewOrder {
		NewOrder {
			user_id: user_id.to_string(),
			company_name: "Precision Parts Inc.".to_string(),
			items: vec![OrderItem {
				name: "Circuit Board A1".to_string(),
				quantity: 2,
				price: Decimal::from(150),
			}],
			total: Decimal::from(300),
			email_subject: "New purchase order".to_string(),
			received_at: Utc::now(),
			notes: None,
		}
	}

	fn test_state() -> (AppState, Arc<StorageService>) {
		let storage = Arc::new(StorageService::new(Box::new(MemoryStorage::new())));
		let secret = SecretString::from("test-secret");
		let state = AppState {
			workflow: Arc::new(OrderWorkflow::new(Arc::clone(&storage))),
			notifications: Arc::new(NotificationService::new(Arc::clone(&storage))),
			accounts: Arc::new(AccountService::new(
				Arc::clone(&storage),
				TokenSigner::new(&secret, 24),
				Box::new(LogMailer::new("orderdesk@example.com".to_string())),
				10,
			)),
			tokens: Arc::new(TokenSigner::new(&secret, 24)),
		};
		(state, storage)
	}

	async fn body_json(response: axum::response::Response) -> serde_json::Value {
		let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
		serde_json::from_slice(&bytes).unwrap()
	}

	#[tokio::test]
	async fn authenticated_routes_reject_missing_token() {
		let (state, _storage) = test_state();
		let app = router(state);

		let response = app
			.oneshot(
				Request::builder()
					.uri("/api/orders")
					.body(Body::empty())
					.unwrap(),
			)
			.await
			.unwrap();
		assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

		let body = body_json(response).await;
		assert_eq!(body["message"], "Missing authorization token");
	}

	#[tokio::test]
	async fn garbage_tokens_are_rejected() {
		let (state, _storage) = test_state();
		let app = router(state);

		let response = app
			.oneshot(
				Request::builder()
					.uri("/api/notifications")
					.header(header::AUTHORIZATION, "Bearer not-a-token")
					.body(Body::empty())
					.unwrap(),
			)
			.await
			.unwrap();
		assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
	}

	#[tokio::test]
	async fn register_verify_and_list_orders_over_http() {
		let (state, storage) = test_state();
		let workflow = Arc::clone(&state.workflow);
		let app = router(state);

		// Spec request shape: companyName, purchasingEmail, password.
		// The login email defaults to the purchasing address.
		let response = app
			.clone()
			.oneshot(
				Request::builder()
					.method("POST")
					.uri("/api/auth/register")
					.header(header::CONTENT_TYPE, "application/json")
					.body(Body::from(
						r#"{
							"companyName": "Precision Parts Inc.",
							"purchasingEmail": "buyer@example.com",
							"password": "hunter2hunter2"
						}"#,
					))
					.unwrap(),
			)
			.await
			.unwrap();
		assert_eq!(response.status(), StatusCode::CREATED);
		let body = body_json(response).await;
		assert_eq!(body["email"], "buyer@example.com");

		// Read the stored challenge; the log mailer does not expose it.
		let user_id: String = storage
			.retrieve(
				orderdesk_types::StorageKey::UserEmailIndex.as_str(),
				"buyer@example.com",
			)
			.await
			.unwrap();
		let user: orderdesk_types::User = storage
			.retrieve(orderdesk_types::StorageKey::Users.as_str(), &user_id)
			.await
			.unwrap();
		let code = user.otp.as_ref().unwrap().code.clone();

		let response = app
			.clone()
			.oneshot(
				Request::builder()
					.method("POST")
					.uri("/api/auth/verify-otp")
					.header(header::CONTENT_TYPE, "application/json")
					.body(Body::from(format!(
						r#"{{"email": "buyer@example.com", "otp": "{}"}}"#,
						code
					)))
					.unwrap(),
			)
			.await
			.unwrap();
		assert_eq!(response.status(), StatusCode::OK);
		let body = body_json(response).await;
		let token = body["token"].as_str().unwrap().to_string();
		assert_eq!(body["user"]["companyName"], "Precision Parts Inc.");

		let order = workflow.create_order(sample_order(&user_id)).await.unwrap();

		let response = app
			.oneshot(
				Request::builder()
					.uri("/api/orders")
					.header(header::AUTHORIZATION, format!("Bearer {}", token))
					.body(Body::empty())
					.unwrap(),
			)
			.await
			.unwrap();
		assert_eq!(response.status(), StatusCode::OK);
		let body = body_json(response).await;
		assert_eq!(body["pagination"]["total"], 1);
		assert_eq!(body["orders"][0]["orderCode"], order.order_code);
		assert_eq!(body["orders"][0]["status"], "pending");
	}

	#[tokio::test]
	async fn bad_status_values_map_to_400() {
		let (state, storage) = test_state();
		let workflow = Arc::clone(&state.workflow);
		let tokens = Arc::clone(&state.tokens);
		let app = router(state);

		let user = orderdesk_types::User {
			id: "u1".to_string(),
			email: "buyer@example.com".to_string(),
			password_hash: String::new(),
			company_name: "Precision Parts Inc.".to_string(),
			purchasing_email: "buyer@example.com".to_string(),
			role: orderdesk_types::UserRole::User,
			is_verified: true,
			is_active: true,
			otp: None,
			last_login: None,
			created_at: Utc::now(),
		};
		storage
			.store(orderdesk_types::StorageKey::Users.as_str(), "u1", &user)
			.await
			.unwrap();
		let token = tokens.issue(&user).unwrap();
		let order = workflow.create_order(sample_order("u1")).await.unwrap();

		let response = app
			.oneshot(
				Request::builder()
					.method("PUT")
					.uri(format!("/api/orders/{}/status", order.id))
					.header(header::AUTHORIZATION, format!("Bearer {}", token))
					.header(header::CONTENT_TYPE, "application/json")
					.body(Body::from(r#"{"status": "shipped"}"#))
					.unwrap(),
			)
			.await
			.unwrap();
		assert_eq!(response.status(), StatusCode::BAD_REQUEST);
		let body = body_json(response).await;
		assert_eq!(body["message"], "Invalid status value: shipped");
	}

	#[tokio::test]
	async fn register_accepts_distinct_login_email() {
		let (state, _storage) = test_state();
		let app = router(state);

		let response = app
			.oneshot(
				Request::builder()
					.method("POST")
					.uri("/api/auth/register")
					.header(header::CONTENT_TYPE, "application/json")
					.body(Body::from(
						r#"{
							"companyName": "Precision Parts Inc.",
							"purchasingEmail": "purchasing@example.com",
							"password": "hunter2hunter2",
							"email": "owner@example.com"
						}"#,
					))
					.unwrap(),
			)
			.await
			.unwrap();
		assert_eq!(response.status(), StatusCode::CREATED);
		let body = body_json(response).await;
		assert_eq!(body["email"], "owner@example.com");
	}

	#[tokio::test]
	async fn malformed_bodies_get_the_uniform_error_shape() {
		let (state, storage) = test_state();
		let tokens = Arc::clone(&state.tokens);
		let app = router(state);

		// Missing required field.
		let response = app
			.clone()
			.oneshot(
				Request::builder()
					.method("POST")
					.uri("/api/auth/register")
					.header(header::CONTENT_TYPE, "application/json")
					.body(Body::from(r#"{"companyName": "Precision Parts Inc."}"#))
					.unwrap(),
			)
			.await
			.unwrap();
		assert_eq!(response.status(), StatusCode::BAD_REQUEST);
		let body = body_json(response).await;
		assert!(body["message"].is_string());

		// Unknown notification kind.
		let user = orderdesk_types::User {
			id: "u1".to_string(),
			email: "buyer@example.com".to_string(),
			password_hash: String::new(),
			company_name: "Precision Parts Inc.".to_string(),
			purchasing_email: "buyer@example.com".to_string(),
			role: orderdesk_types::UserRole::User,
			is_verified: true,
			is_active: true,
			otp: None,
			last_login: None,
			created_at: Utc::now(),
		};
		storage
			.store(orderdesk_types::StorageKey::Users.as_str(), "u1", &user)
			.await
			.unwrap();
		let token = tokens.issue(&user).unwrap();

		let response = app
			.oneshot(
				Request::builder()
					.method("POST")
					.uri("/api/notifications")
					.header(header::AUTHORIZATION, format!("Bearer {}", token))
					.header(header::CONTENT_TYPE, "application/json")
					.body(Body::from(r#"{"type": "email", "message": "hello"}"#))
					.unwrap(),
			)
			.await
			.unwrap();
		assert_eq!(response.status(), StatusCode::BAD_REQUEST);
		let body = body_json(response).await;
		assert!(body["message"].as_str().unwrap().contains("unknown variant"));
	}
}
