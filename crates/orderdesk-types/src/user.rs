//! User account types for the orderdesk system.
//!
//! The full [`User`] record is a storage shape and never leaves the
//! service; clients only ever see [`UserProfile`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role attached to a user account.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
	/// Regular customer-portal user.
	User,
	/// Back-office administrator.
	Admin,
}

impl Default for UserRole {
	fn default() -> Self {
		UserRole::User
	}
}

/// One-time verification code with an explicit expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpChallenge {
	/// Six-digit numeric code.
	pub code: String,
	/// Point in time after which the code is no longer accepted.
	pub expires_at: DateTime<Utc>,
}

impl OtpChallenge {
	/// Checks whether the given code matches and has not expired.
	pub fn accepts(&self, code: &str, now: DateTime<Utc>) -> bool {
		self.code == code && now < self.expires_at
	}
}

/// A registered account.
///
/// Accounts start unverified; the OTP flow flips `is_verified` once the
/// user proves ownership of the email address.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
	/// System-generated unique identifier.
	pub id: String,
	/// Login email, unique across accounts.
	pub email: String,
	/// Argon2id hash of the password.
	pub password_hash: String,
	/// Company display name.
	pub company_name: String,
	/// Email address purchase orders arrive from.
	pub purchasing_email: String,
	/// Account role.
	#[serde(default)]
	pub role: UserRole,
	/// Whether the OTP flow has been completed.
	pub is_verified: bool,
	/// Deactivated accounts cannot log in.
	pub is_active: bool,
	/// Outstanding verification challenge, if any.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub otp: Option<OtpChallenge>,
	/// Timestamp of the most recent successful login.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub last_login: Option<DateTime<Utc>>,
	/// Timestamp when the account was created.
	pub created_at: DateTime<Utc>,
}

/// The subset of account fields exposed to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
	/// Login email.
	pub email: String,
	/// Company display name.
	pub company_name: String,
	/// Account role.
	pub role: UserRole,
}

impl From<&User> for UserProfile {
	fn from(user: &User) -> Self {
		Self {
			email: user.email.clone(),
			company_name: user.company_name.clone(),
			role: user.role,
		}
	}
}
