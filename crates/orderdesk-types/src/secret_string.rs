//! Secure string type for handling sensitive configuration values.
//!
//! This module provides `SecretString`, a wrapper around sensitive string
//! data such as the token signing key. The value is zeroed on drop and is
//! redacted in Debug/Display output and serialization so it cannot leak
//! through logs or serialized config.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use zeroize::Zeroizing;

/// A string that zeroes its memory on drop and never appears in logs.
#[derive(Clone)]
pub struct SecretString(Zeroizing<String>);

impl SecretString {
	/// Creates a new SecretString from a regular string.
	pub fn new(s: String) -> Self {
		Self(Zeroizing::new(s))
	}

	/// Exposes the secret as a string slice.
	///
	/// Use only at the point the secret is actually consumed (e.g. key
	/// derivation) and never log the exposed value.
	pub fn expose_secret(&self) -> &str {
		&self.0
	}

	/// Returns true if the secret string is empty.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl From<String> for SecretString {
	fn from(s: String) -> Self {
		Self::new(s)
	}
}

impl From<&str> for SecretString {
	fn from(s: &str) -> Self {
		Self::new(s.to_string())
	}
}

impl fmt::Debug for SecretString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "SecretString(***REDACTED***)")
	}
}

impl fmt::Display for SecretString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "***REDACTED***")
	}
}

impl Serialize for SecretString {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str("***REDACTED***")
	}
}

impl<'de> Deserialize<'de> for SecretString {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let s = String::deserialize(deserializer)?;
		Ok(SecretString::new(s))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn debug_and_display_redact_the_value() {
		let secret = SecretString::from("signing-key");
		assert_eq!(format!("{:?}", secret), "SecretString(***REDACTED***)");
		assert_eq!(format!("{}", secret), "***REDACTED***");
	}

	#[test]
	fn expose_returns_the_value() {
		let secret = SecretString::from("signing-key");
		assert_eq!(secret.expose_secret(), "signing-key");
		assert!(!secret.is_empty());
	}

	#[test]
	fn serialization_redacts_deserialization_keeps() {
		let secret = SecretString::from("signing-key");
		let json = serde_json::to_string(&secret).unwrap();
		assert!(!json.contains("signing-key"));

		let parsed: SecretString = serde_json::from_str("\"from-config\"").unwrap();
		assert_eq!(parsed.expose_secret(), "from-config");
	}
}
