//! Authentication primitives for the orderdesk system.
//!
//! This module provides password hashing (Argon2id), bearer-token
//! issuance and verification, one-time verification codes, and the
//! outgoing-mail seam used to deliver them. Account business logic lives
//! in the core crate; this crate only owns the cryptographic and
//! delivery primitives.

use argon2::{
	password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
	Argon2,
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use orderdesk_types::{OtpChallenge, SecretString, User, UserRole};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod mailer;

pub use mailer::{get_all_implementations, MailerError, MailerFactory, MailerInterface};

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
	/// Password hashing or verification failed at the library level.
	#[error("Password hashing error: {0}")]
	Hashing(String),
	/// Token could not be created.
	#[error("Token creation error: {0}")]
	TokenCreation(String),
	/// Token is malformed, has a bad signature, or has expired.
	#[error("Invalid or expired token")]
	InvalidToken,
}

/// Hashes a password with Argon2id and a per-password random salt.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
	let salt = SaltString::generate(&mut OsRng);
	Argon2::default()
		.hash_password(password.as_bytes(), &salt)
		.map(|hash| hash.to_string())
		.map_err(|e| AuthError::Hashing(e.to_string()))
}

/// Verifies a password against a stored Argon2id hash.
///
/// A wrong password is `Ok(false)`; only a malformed stored hash is an
/// error.
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, AuthError> {
	let parsed = PasswordHash::new(password_hash).map_err(|e| AuthError::Hashing(e.to_string()))?;
	Ok(Argon2::default()
		.verify_password(password.as_bytes(), &parsed)
		.is_ok())
}

/// Generates a six-digit one-time verification code.
pub fn generate_otp() -> String {
	rand::thread_rng().gen_range(100_000..1_000_000).to_string()
}

/// Creates a fresh OTP challenge expiring after `ttl_minutes`.
pub fn new_otp_challenge(ttl_minutes: u64, now: DateTime<Utc>) -> OtpChallenge {
	OtpChallenge {
		code: generate_otp(),
		expires_at: now + Duration::minutes(ttl_minutes as i64),
	}
}

/// Claims embedded in issued bearer tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
	/// User id the token was issued for.
	pub sub: String,
	/// Login email of the user.
	pub email: String,
	/// Company display name, for non-sensitive UI hints only.
	pub company_name: String,
	/// Account role.
	pub role: UserRole,
	/// Expiry as Unix seconds.
	pub exp: u64,
}

/// Issues and verifies HS256 bearer tokens.
///
/// The signer owns the secret and token lifetime; it is constructed once
/// at startup from configuration and shared via the application state.
pub struct TokenSigner {
	encoding_key: EncodingKey,
	decoding_key: DecodingKey,
	token_ttl: Duration,
}

impl TokenSigner {
	/// Creates a signer from the configured secret and lifetime.
	pub fn new(secret: &SecretString, token_ttl_hours: u64) -> Self {
		let bytes = secret.expose_secret().as_bytes();
		Self {
			encoding_key: EncodingKey::from_secret(bytes),
			decoding_key: DecodingKey::from_secret(bytes),
			token_ttl: Duration::hours(token_ttl_hours as i64),
		}
	}

	/// Issues a token for the given user.
	pub fn issue(&self, user: &User) -> Result<String, AuthError> {
		let claims = Claims {
			sub: user.id.clone(),
			email: user.email.clone(),
			company_name: user.company_name.clone(),
			role: user.role,
			exp: (Utc::now() + self.token_ttl).timestamp() as u64,
		};
		encode(&Header::default(), &claims, &self.encoding_key)
			.map_err(|e| AuthError::TokenCreation(e.to_string()))
	}

	/// Verifies a token and returns its claims.
	///
	/// Expiry is validated; any failure collapses to `InvalidToken` so
	/// callers cannot distinguish forged from expired tokens.
	pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
		decode::<Claims>(token, &self.decoding_key, &Validation::default())
			.map(|data| data.claims)
			.map_err(|_| AuthError::InvalidToken)
	}
}
