//! Purchase order types for the orderdesk system.
//!
//! This module defines the order record, its embedded line items, and the
//! status enum with the single transition table shared by every code path
//! that mutates an order.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a purchase order.
///
/// `Pending` is the sole initial state. Confirmation and rejection are only
/// reachable from `Pending`; `Completed` and `Rejected` are terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
	/// Order has been ingested and awaits the customer's decision.
	Pending,
	/// Order was confirmed and is being worked on.
	Processing,
	/// Order has been fulfilled.
	Completed,
	/// Order was rejected by the customer.
	Rejected,
	/// Order was confirmed by the customer.
	Confirmed,
}

impl OrderStatus {
	/// Checks whether a transition from `self` to `to` is legal.
	///
	/// This is the single transition table used by both the generic
	/// status-update path and the dedicated confirm/reject operations.
	pub fn can_transition_to(&self, to: OrderStatus) -> bool {
		use OrderStatus::*;
		matches!(
			(self, to),
			(Pending, Confirmed) | (Pending, Rejected) | (Confirmed, Processing) | (Processing, Completed)
		)
	}

	/// Returns true for states with no outgoing transitions.
	pub fn is_terminal(&self) -> bool {
		matches!(self, OrderStatus::Completed | OrderStatus::Rejected)
	}

	/// Returns the lowercase wire representation of the status.
	pub fn as_str(&self) -> &'static str {
		match self {
			OrderStatus::Pending => "pending",
			OrderStatus::Processing => "processing",
			OrderStatus::Completed => "completed",
			OrderStatus::Rejected => "rejected",
			OrderStatus::Confirmed => "confirmed",
		}
	}
}

impl fmt::Display for OrderStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl std::str::FromStr for OrderStatus {
	type Err = ();

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"pending" => Ok(OrderStatus::Pending),
			"processing" => Ok(OrderStatus::Processing),
			"completed" => Ok(OrderStatus::Completed),
			"rejected" => Ok(OrderStatus::Rejected),
			"confirmed" => Ok(OrderStatus::Confirmed),
			_ => Err(()),
		}
	}
}

/// A single line item on an order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
	/// Item description as it appeared on the source email.
	pub name: String,
	/// Number of units ordered.
	pub quantity: u32,
	/// Unit price.
	pub price: Decimal,
}

/// Provenance metadata for the email an order was ingested from.
///
/// Immutable after creation except for `processed_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailDetails {
	/// Subject line of the source email.
	pub subject: String,
	/// When the email arrived.
	pub received_at: DateTime<Utc>,
	/// When ingestion turned the email into an order.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub processed_at: Option<DateTime<Utc>>,
}

/// A purchase order owned by a single user.
///
/// `total` is stored redundantly and is never recomputed from `items`;
/// the ingestion side is responsible for keeping the two consistent.
/// Use [`Order::computed_total`] to check for drift.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
	/// System-generated unique identifier.
	pub id: String,
	/// Human-readable order code, unique across all orders.
	pub order_code: String,
	/// The user that owns this order. Ownership never transfers.
	pub user_id: String,
	/// Company display name copied at creation time.
	pub company_name: String,
	/// Current lifecycle status.
	pub status: OrderStatus,
	/// Ordered sequence of line items.
	pub items: Vec<OrderItem>,
	/// Precomputed sum of the line items, stored redundantly.
	pub total: Decimal,
	/// Provenance metadata for the source email.
	pub email_details: EmailDetails,
	/// Free-text notes.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub notes: Option<String>,
	/// Timestamp when this order was created.
	pub created_at: DateTime<Utc>,
	/// Timestamp when this order was last updated.
	pub updated_at: DateTime<Utc>,
}

impl Order {
	/// Recomputes the total from the line items.
	///
	/// The stored `total` is authoritative on the wire; this exists so
	/// callers and tests can flag a mismatch between the two.
	pub fn computed_total(&self) -> Decimal {
		self.items
			.iter()
			.map(|item| item.price * Decimal::from(item.quantity))
			.sum()
	}

	/// Case-insensitive substring match against order code, company name,
	/// status, and item names (logical OR across fields).
	pub fn matches_search(&self, term: &str) -> bool {
		let term = term.to_lowercase();
		if term.is_empty() {
			return true;
		}
		self.order_code.to_lowercase().contains(&term)
			|| self.company_name.to_lowercase().contains(&term)
			|| self.status.as_str().contains(&term)
			|| self
				.items
				.iter()
				.any(|item| item.name.to_lowercase().contains(&term))
	}
}

/// Projected subset of order fields attached to resolved notifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
	/// Human-readable order code.
	pub order_code: String,
	/// Current lifecycle status.
	pub status: OrderStatus,
	/// Line items of the order.
	pub items: Vec<OrderItem>,
	/// Stored order total.
	pub total: Decimal,
}

impl From<&Order> for OrderSummary {
	fn from(order: &Order) -> Self {
		Self {
			order_code: order.order_code.clone(),
			status: order.status,
			items: order.items.clone(),
			total: order.total,
		}
	}
}
