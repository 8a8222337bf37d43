//! Notification service implementation.
//!
//! Reads and mutates a user's notifications. The default listing view is
//! the action feed: only `confirmation_required` notifications, newest
//! first, five per page. The full history is available behind the
//! `show_all` switch.

use orderdesk_storage::{StorageError, StorageService};
use orderdesk_types::{
	Notification, NotificationKind, Order, OrderSummary, PageParams, Pagination,
	ResolvedNotification, StorageKey,
};
use std::sync::Arc;
use thiserror::Error;

/// Default page size for notification listings.
pub const DEFAULT_NOTIFICATION_PAGE_SIZE: usize = 5;

/// Errors that can occur during notification operations.
#[derive(Debug, Error)]
pub enum NotificationError {
	/// The storage backend failed.
	#[error("Storage error: {0}")]
	Storage(String),
	/// The notification does not exist or belongs to another owner.
	#[error("Notification not found: {0}")]
	NotFound(String),
}

impl From<StorageError> for NotificationError {
	fn from(err: StorageError) -> Self {
		NotificationError::Storage(err.to_string())
	}
}

/// Reads and mutates per-user notifications.
pub struct NotificationService {
	storage: Arc<StorageService>,
}

impl NotificationService {
	pub fn new(storage: Arc<StorageService>) -> Self {
		Self { storage }
	}

	/// Lists an owner's notifications, newest first.
	///
	/// Unless `show_all` is set, only `confirmation_required`
	/// notifications are returned. Related orders that still exist are
	/// resolved to summaries; dangling references resolve to `None`.
	pub async fn list(
		&self,
		user_id: &str,
		params: PageParams,
		show_all: bool,
	) -> Result<(Vec<ResolvedNotification>, Pagination), NotificationError> {
		let mut notifications: Vec<Notification> = self
			.storage
			.retrieve_all(StorageKey::Notifications.as_str())
			.await?
			.into_iter()
			.filter(|n: &Notification| n.user_id == user_id)
			.filter(|n| show_all || n.kind == NotificationKind::ConfirmationRequired)
			.collect();

		notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));

		let total = notifications.len();
		let page: Vec<Notification> = notifications
			.into_iter()
			.skip(params.skip())
			.take(params.limit)
			.collect();
		let pagination = Pagination::new(total, params.page, params.limit, page.len());

		let mut resolved = Vec::with_capacity(page.len());
		for notification in page {
			let summary = self.resolve_order(&notification).await?;
			resolved.push(ResolvedNotification::new(notification, summary));
		}

		Ok((resolved, pagination))
	}

	/// Marks an owner's notification as read.
	pub async fn mark_read(
		&self,
		user_id: &str,
		notification_id: &str,
	) -> Result<Notification, NotificationError> {
		let mut notification: Notification = self
			.storage
			.retrieve(StorageKey::Notifications.as_str(), notification_id)
			.await
			.map_err(|e| match e {
				StorageError::NotFound => {
					NotificationError::NotFound(notification_id.to_string())
				}
				other => NotificationError::Storage(other.to_string()),
			})?;

		if notification.user_id != user_id {
			return Err(NotificationError::NotFound(notification_id.to_string()));
		}

		notification.read = true;
		self.storage
			.update(
				StorageKey::Notifications.as_str(),
				&notification.id,
				&notification,
			)
			.await?;
		Ok(notification)
	}

	/// Stores a new unread notification for a user.
	pub async fn create(
		&self,
		user_id: &str,
		kind: NotificationKind,
		message: String,
		related_order: Option<String>,
	) -> Result<Notification, NotificationError> {
		let notification = Notification {
			id: uuid::Uuid::new_v4().to_string(),
			user_id: user_id.to_string(),
			kind,
			message,
			read: false,
			related_order,
			created_at: chrono::Utc::now(),
		};
		self.storage
			.store(
				StorageKey::Notifications.as_str(),
				&notification.id,
				&notification,
			)
			.await?;
		Ok(notification)
	}

	async fn resolve_order(
		&self,
		notification: &Notification,
	) -> Result<Option<OrderSummary>, NotificationError> {
		let Some(order_id) = notification.related_order.as_deref() else {
			return Ok(None);
		};
		match self
			.storage
			.retrieve::<Order>(StorageKey::Orders.as_str(), order_id)
			.await
		{
			Ok(order) => Ok(Some(OrderSummary::from(&order))),
			Err(StorageError::NotFound) => Ok(None),
			Err(other) => Err(NotificationError::Storage(other.to_string())),
		}
	}
}
