//! Storage-related types for the orderdesk system.

/// Storage keys for the persisted collections.
///
/// This enum provides type safety for storage operations by replacing
/// string literals with strongly typed variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
	/// Key for storing order records
	Orders,
	/// Key for storing notification records
	Notifications,
	/// Key for storing user accounts
	Users,
	/// Key mapping login emails to user ids
	UserEmailIndex,
}

impl StorageKey {
	/// Returns the string representation of the storage key.
	pub fn as_str(&self) -> &'static str {
		match self {
			StorageKey::Orders => "orders",
			StorageKey::Notifications => "notifications",
			StorageKey::Users => "users",
			StorageKey::UserEmailIndex => "user_email_idx",
		}
	}
}
