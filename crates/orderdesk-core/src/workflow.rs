//! Order workflow implementation.
//!
//! Manages order state transitions with validation and keeps the linked
//! notification record synchronized with the order record. All mutations
//! route through the single transition table on `OrderStatus`; the
//! dedicated confirm/reject operations are the only paths that produce
//! the `confirmed` and `rejected` states.

use chrono::{DateTime, Utc};
use orderdesk_storage::{StorageError, StorageService};
use orderdesk_types::{
	Notification, NotificationKind, Order, OrderItem, OrderStatus, PageParams, Pagination,
	StorageKey,
};
use rand::Rng;
use rust_decimal::Decimal;
use std::sync::Arc;
use thiserror::Error;

/// Default page size for order listings.
pub const DEFAULT_ORDER_PAGE_SIZE: usize = 10;

/// Errors that can occur during order workflow operations.
#[derive(Debug, Error)]
pub enum WorkflowError {
	/// The storage backend failed.
	#[error("Storage error: {0}")]
	Storage(String),
	/// The order does not exist or belongs to another owner. The two
	/// cases are deliberately indistinguishable.
	#[error("Order not found: {0}")]
	OrderNotFound(String),
	/// The requested transition is not in the transition table.
	#[error("Invalid state transition from {from} to {to}")]
	InvalidTransition { from: OrderStatus, to: OrderStatus },
	/// The generic status-update path refuses confirm/reject targets.
	#[error("Orders are {0} through the dedicated endpoint")]
	RestrictedTarget(OrderStatus),
}

impl From<StorageError> for WorkflowError {
	fn from(err: StorageError) -> Self {
		WorkflowError::Storage(err.to_string())
	}
}

/// Input for the order ingestion seam.
///
/// Orders always enter the system as `pending`; the caller supplies the
/// precomputed total and is responsible for keeping it consistent with
/// the items.
#[derive(Debug, Clone)]
pub struct NewOrder {
	/// The user that will own the order.
	pub user_id: String,
	/// Company display name copied onto the order.
	pub company_name: String,
	/// Line items.
	pub items: Vec<OrderItem>,
	/// Precomputed total.
	pub total: Decimal,
	/// Subject line of the source email.
	pub email_subject: String,
	/// When the source email arrived.
	pub received_at: DateTime<Utc>,
	/// Free-text notes.
	pub notes: Option<String>,
}

/// Manages order state transitions and persistence.
pub struct OrderWorkflow {
	storage: Arc<StorageService>,
}

impl OrderWorkflow {
	pub fn new(storage: Arc<StorageService>) -> Self {
		Self { storage }
	}

	/// Lists an owner's orders, newest-received first, with optional
	/// case-insensitive substring search across order code, company
	/// name, status, and item names.
	pub async fn list_orders(
		&self,
		user_id: &str,
		params: PageParams,
		search: Option<&str>,
	) -> Result<(Vec<Order>, Pagination), WorkflowError> {
		let mut orders: Vec<Order> = self
			.storage
			.retrieve_all(StorageKey::Orders.as_str())
			.await?
			.into_iter()
			.filter(|order: &Order| order.user_id == user_id)
			.filter(|order| match search {
				Some(term) if !term.trim().is_empty() => order.matches_search(term.trim()),
				_ => true,
			})
			.collect();

		orders.sort_by(|a, b| b.email_details.received_at.cmp(&a.email_details.received_at));

		let total = orders.len();
		let page: Vec<Order> = orders
			.into_iter()
			.skip(params.skip())
			.take(params.limit)
			.collect();
		let pagination = Pagination::new(total, params.page, params.limit, page.len());

		Ok((page, pagination))
	}

	/// Gets an order strictly scoped to its owner.
	pub async fn get_order(&self, user_id: &str, order_id: &str) -> Result<Order, WorkflowError> {
		let order: Order = self
			.storage
			.retrieve(StorageKey::Orders.as_str(), order_id)
			.await
			.map_err(|e| match e {
				StorageError::NotFound => WorkflowError::OrderNotFound(order_id.to_string()),
				other => WorkflowError::Storage(other.to_string()),
			})?;

		// A foreign-owned order looks exactly like a missing one.
		if order.user_id != user_id {
			return Err(WorkflowError::OrderNotFound(order_id.to_string()));
		}
		Ok(order)
	}

	/// Applies a generic status change to an order.
	///
	/// The transition must be legal per the shared transition table, and
	/// `confirmed`/`rejected` targets are refused here: those states are
	/// only reachable through [`OrderWorkflow::confirm`] and
	/// [`OrderWorkflow::reject`]. On success a `status_update`
	/// notification is appended.
	pub async fn update_status(
		&self,
		user_id: &str,
		order_id: &str,
		new_status: OrderStatus,
	) -> Result<(Order, Notification), WorkflowError> {
		let mut order = self.get_order(user_id, order_id).await?;

		if matches!(new_status, OrderStatus::Confirmed | OrderStatus::Rejected) {
			return Err(WorkflowError::RestrictedTarget(new_status));
		}
		if !order.status.can_transition_to(new_status) {
			return Err(WorkflowError::InvalidTransition {
				from: order.status,
				to: new_status,
			});
		}

		let old_status = order.status;
		order.status = new_status;
		order.updated_at = Utc::now();
		self.storage
			.update(StorageKey::Orders.as_str(), &order.id, &order)
			.await?;

		let notification = Notification {
			id: uuid::Uuid::new_v4().to_string(),
			user_id: user_id.to_string(),
			kind: NotificationKind::StatusUpdate,
			message: format!(
				"Order {} status changed from {} to {}",
				order.order_code, old_status, new_status
			),
			read: false,
			related_order: Some(order.id.clone()),
			created_at: Utc::now(),
		};
		// The order write already succeeded; a failing notification
		// write is logged, not rolled back.
		if let Err(e) = self
			.storage
			.store(StorageKey::Notifications.as_str(), &notification.id, &notification)
			.await
		{
			tracing::warn!(order_id = %order.id, "Failed to store status notification: {}", e);
		}

		Ok((order, notification))
	}

	/// Confirms a pending order.
	///
	/// The matching `confirmation_required` notification, if one exists,
	/// is rewritten in place to `order_confirmed`.
	pub async fn confirm(&self, user_id: &str, order_id: &str) -> Result<Order, WorkflowError> {
		self.decide(
			user_id,
			order_id,
			OrderStatus::Confirmed,
			NotificationKind::OrderConfirmed,
			|code| format!("Order {} has been confirmed and will be processed soon.", code),
		)
		.await
	}

	/// Rejects a pending order.
	///
	/// Symmetric to [`OrderWorkflow::confirm`]; the linked notification
	/// becomes `order_rejected`.
	pub async fn reject(&self, user_id: &str, order_id: &str) -> Result<Order, WorkflowError> {
		self.decide(
			user_id,
			order_id,
			OrderStatus::Rejected,
			NotificationKind::OrderRejected,
			|code| format!("Order {} has been rejected.", code),
		)
		.await
	}

	/// Shared confirm/reject path: validates the `pending` source state,
	/// writes the order, then rewrites the linked notification.
	async fn decide(
		&self,
		user_id: &str,
		order_id: &str,
		target: OrderStatus,
		kind: NotificationKind,
		message: impl Fn(&str) -> String,
	) -> Result<Order, WorkflowError> {
		let mut order = self.get_order(user_id, order_id).await?;

		if !order.status.can_transition_to(target) {
			return Err(WorkflowError::InvalidTransition {
				from: order.status,
				to: target,
			});
		}

		order.status = target;
		order.updated_at = Utc::now();
		self.storage
			.update(StorageKey::Orders.as_str(), &order.id, &order)
			.await?;

		if let Err(e) = self.rewrite_confirmation_notice(&order, kind, message(&order.order_code)).await {
			tracing::warn!(order_id = %order.id, "Failed to update linked notification: {}", e);
		}

		Ok(order)
	}

	/// Rewrites the order's `confirmation_required` notification in place.
	///
	/// A missing notification is a no-op, not an error.
	async fn rewrite_confirmation_notice(
		&self,
		order: &Order,
		kind: NotificationKind,
		message: String,
	) -> Result<(), WorkflowError> {
		let notifications: Vec<Notification> = self
			.storage
			.retrieve_all(StorageKey::Notifications.as_str())
			.await?;

		let linked = notifications.into_iter().find(|n| {
			n.kind == NotificationKind::ConfirmationRequired
				&& n.related_order.as_deref() == Some(order.id.as_str())
		});

		if let Some(mut notification) = linked {
			notification.kind = kind;
			notification.message = message;
			self.storage
				.update(
					StorageKey::Notifications.as_str(),
					&notification.id,
					&notification,
				)
				.await?;
		}
		Ok(())
	}

	/// Ingestion seam: stores a new pending order and emits its
	/// `confirmation_required` notification.
	pub async fn create_order(&self, new_order: NewOrder) -> Result<Order, WorkflowError> {
		let now = Utc::now();
		let order = Order {
			id: uuid::Uuid::new_v4().to_string(),
			order_code: self.unique_order_code().await?,
			user_id: new_order.user_id.clone(),
			company_name: new_order.company_name,
			status: OrderStatus::Pending,
			items: new_order.items,
			total: new_order.total,
			email_details: orderdesk_types::EmailDetails {
				subject: new_order.email_subject,
				received_at: new_order.received_at,
				processed_at: Some(now),
			},
			notes: new_order.notes,
			created_at: now,
			updated_at: now,
		};
		self.storage
			.store(StorageKey::Orders.as_str(), &order.id, &order)
			.await?;

		let notification = Notification {
			id: uuid::Uuid::new_v4().to_string(),
			user_id: new_order.user_id,
			kind: NotificationKind::ConfirmationRequired,
			message: format!("Order {} requires your confirmation.", order.order_code),
			read: false,
			related_order: Some(order.id.clone()),
			created_at: now,
		};
		self.storage
			.store(StorageKey::Notifications.as_str(), &notification.id, &notification)
			.await?;

		Ok(order)
	}

	/// Generates an order code (`ORD-` + 3 letters + 2 digits) that does
	/// not collide with an existing one.
	async fn unique_order_code(&self) -> Result<String, WorkflowError> {
		let existing: Vec<Order> = self
			.storage
			.retrieve_all(StorageKey::Orders.as_str())
			.await?;

		loop {
			let code = generate_order_code();
			if !existing.iter().any(|order| order.order_code == code) {
				return Ok(code);
			}
		}
	}
}

/// Generates a human-readable order code of the form `ORD-ABC12`.
fn generate_order_code() -> String {
	const LETTERS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
	let mut rng = rand::thread_rng();
	let letters: String = (0..3)
		.map(|_| LETTERS[rng.gen_range(0..LETTERS.len())] as char)
		.collect();
	format!("ORD-{}{:02}", letters, rng.gen_range(0..100))
}
