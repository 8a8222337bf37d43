//! Notification types for the orderdesk system.
//!
//! Notifications mirror order-state changes for user-facing alerts. They
//! carry a weak reference to the order they describe; the referenced order
//! is resolved at query time, never owned.

use crate::OrderSummary;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical set of notification kinds.
///
/// This is the single tagged union used everywhere a notification kind
/// appears; requests carrying anything outside this set fail
/// deserialization and are rejected as bad input.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
	/// A pending order awaits the customer's confirm/reject decision.
	ConfirmationRequired,
	/// The customer confirmed the order.
	OrderConfirmed,
	/// Work on a confirmed order has started.
	ProcessingStarted,
	/// The order has been fulfilled.
	OrderCompleted,
	/// The customer rejected the order.
	OrderRejected,
	/// A generic status change outside the confirm/reject flow.
	StatusUpdate,
	/// Service-level announcement not tied to an order.
	System,
}

impl fmt::Display for NotificationKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let s = match self {
			NotificationKind::ConfirmationRequired => "confirmation_required",
			NotificationKind::OrderConfirmed => "order_confirmed",
			NotificationKind::ProcessingStarted => "processing_started",
			NotificationKind::OrderCompleted => "order_completed",
			NotificationKind::OrderRejected => "order_rejected",
			NotificationKind::StatusUpdate => "status_update",
			NotificationKind::System => "system",
		};
		f.write_str(s)
	}
}

/// A user-facing notification record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
	/// System-generated unique identifier.
	pub id: String,
	/// The user who should see this notification.
	pub user_id: String,
	/// Kind tag driving client presentation and filtering.
	#[serde(rename = "type")]
	pub kind: NotificationKind,
	/// Free-text description of the event.
	pub message: String,
	/// Whether the user has read this notification.
	pub read: bool,
	/// Weak reference (by id) to the related order, if any.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub related_order: Option<String>,
	/// Timestamp when this notification was created.
	pub created_at: DateTime<Utc>,
}

/// A notification with its related order resolved to a projection.
///
/// This is the shape returned by the notification list endpoint: the
/// `related_order` id is replaced by a subset of the order's fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedNotification {
	/// System-generated unique identifier.
	pub id: String,
	/// The user who should see this notification.
	pub user_id: String,
	/// Kind tag driving client presentation and filtering.
	#[serde(rename = "type")]
	pub kind: NotificationKind,
	/// Free-text description of the event.
	pub message: String,
	/// Whether the user has read this notification.
	pub read: bool,
	/// Projected fields of the related order, when it still resolves.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub related_order: Option<OrderSummary>,
	/// Timestamp when this notification was created.
	pub created_at: DateTime<Utc>,
}

impl ResolvedNotification {
	/// Attaches an optional order projection to a notification record.
	pub fn new(notification: Notification, related_order: Option<OrderSummary>) -> Self {
		Self {
			id: notification.id,
			user_id: notification.user_id,
			kind: notification.kind,
			message: notification.message,
			read: notification.read,
			related_order,
			created_at: notification.created_at,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn kind_uses_snake_case_on_the_wire() {
		assert_eq!(
			serde_json::to_string(&NotificationKind::ConfirmationRequired).unwrap(),
			"\"confirmation_required\""
		);
		let parsed: NotificationKind = serde_json::from_str("\"order_rejected\"").unwrap();
		assert_eq!(parsed, NotificationKind::OrderRejected);
	}

	#[test]
	fn unknown_kind_fails_deserialization() {
		// "email" was only ever an ad-hoc tag; it is not part of the
		// canonical set and must be rejected.
		let result: Result<NotificationKind, _> = serde_json::from_str("\"email\"");
		assert!(result.is_err());
	}

	#[test]
	fn kind_field_serializes_as_type() {
		let notification = Notification {
			id: "n-1".into(),
			user_id: "u-1".into(),
			kind: NotificationKind::System,
			message: "maintenance window".into(),
			read: false,
			related_order: None,
			created_at: Utc::now(),
		};
		let json = serde_json::to_value(&notification).unwrap();
		assert_eq!(json["type"], "system");
		assert!(json.get("relatedOrder").is_none());
	}
}
