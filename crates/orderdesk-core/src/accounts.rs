//! Account service implementation.
//!
//! Registration, email verification, and login. New accounts start
//! unverified; a one-time code is mailed through the injected mailer and
//! the account only becomes usable once the code is presented back.
//! Email uniqueness is enforced through a dedicated email index
//! namespace mapping login email to user id.

use chrono::Utc;
use orderdesk_auth::{
	hash_password, new_otp_challenge, verify_password, AuthError, MailerInterface, TokenSigner,
};
use orderdesk_storage::{StorageError, StorageService};
use orderdesk_types::{StorageKey, User, UserProfile, UserRole};
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur during account operations.
#[derive(Debug, Error)]
pub enum AccountError {
	/// The storage backend failed.
	#[error("Storage error: {0}")]
	Storage(String),
	/// The email already belongs to a verified account.
	#[error("Email already registered")]
	EmailTaken,
	/// Unknown email or wrong password. The two cases are deliberately
	/// indistinguishable.
	#[error("Invalid email or password")]
	InvalidCredentials,
	/// The account has been deactivated.
	#[error("Account is deactivated")]
	Inactive,
	/// The verification code is missing, expired, or wrong.
	#[error("Invalid or expired verification code")]
	InvalidOtp,
	/// No account exists for the given identifier.
	#[error("User not found")]
	UserNotFound,
	/// The verification code could not be delivered.
	#[error("Failed to send verification code: {0}")]
	Mailer(String),
	/// Hashing or token issuance failed.
	#[error("Auth error: {0}")]
	Auth(String),
}

impl From<StorageError> for AccountError {
	fn from(err: StorageError) -> Self {
		AccountError::Storage(err.to_string())
	}
}

impl From<AuthError> for AccountError {
	fn from(err: AuthError) -> Self {
		AccountError::Auth(err.to_string())
	}
}

/// Result of a login attempt against a live account.
pub enum LoginOutcome {
	/// Credentials and verification state check out.
	Authenticated { token: String, user: UserProfile },
	/// Credentials check out but the email is unverified. A fresh code
	/// has been mailed.
	VerificationRequired,
}

/// Input for account registration.
#[derive(Debug, Clone)]
pub struct Registration {
	pub email: String,
	pub password: String,
	pub company_name: String,
	pub purchasing_email: String,
}

/// Handles registration, verification, and login.
pub struct AccountService {
	storage: Arc<StorageService>,
	tokens: TokenSigner,
	mailer: Box<dyn MailerInterface>,
	otp_ttl_minutes: u64,
}

impl AccountService {
	pub fn new(
		storage: Arc<StorageService>,
		tokens: TokenSigner,
		mailer: Box<dyn MailerInterface>,
		otp_ttl_minutes: u64,
	) -> Self {
		Self {
			storage,
			tokens,
			mailer,
			otp_ttl_minutes,
		}
	}

	/// Registers a new account and mails its verification code.
	///
	/// A verified account already holding the email is rejected. An
	/// unverified one is refreshed in place, so an interrupted signup can
	/// simply be repeated.
	pub async fn register(&self, registration: Registration) -> Result<String, AccountError> {
		let now = Utc::now();
		let otp = new_otp_challenge(self.otp_ttl_minutes, now);

		let user = match self.find_by_email(&registration.email).await? {
			Some(existing) if existing.is_verified => return Err(AccountError::EmailTaken),
			Some(mut unverified) => {
				unverified.password_hash = hash_password(&registration.password)?;
				unverified.company_name = registration.company_name;
				unverified.purchasing_email = registration.purchasing_email;
				unverified.otp = Some(otp);
				self.storage
					.update(StorageKey::Users.as_str(), &unverified.id, &unverified)
					.await?;
				unverified
			}
			None => {
				let user = User {
					id: uuid::Uuid::new_v4().to_string(),
					email: registration.email.clone(),
					password_hash: hash_password(&registration.password)?,
					company_name: registration.company_name,
					purchasing_email: registration.purchasing_email,
					role: UserRole::User,
					is_verified: false,
					is_active: true,
					otp: Some(otp),
					last_login: None,
					created_at: now,
				};
				self.storage
					.store(StorageKey::Users.as_str(), &user.id, &user)
					.await?;
				self.storage
					.store(
						StorageKey::UserEmailIndex.as_str(),
						&user.email,
						&user.id,
					)
					.await?;
				user
			}
		};

		self.send_otp(&user).await?;
		Ok(user.email)
	}

	/// Authenticates an account by email and password.
	///
	/// An unverified account gets a fresh code mailed and a
	/// `VerificationRequired` outcome instead of a token.
	pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AccountError> {
		let mut user = self
			.find_by_email(email)
			.await?
			.ok_or(AccountError::InvalidCredentials)?;

		if !verify_password(password, &user.password_hash)? {
			return Err(AccountError::InvalidCredentials);
		}
		if !user.is_active {
			return Err(AccountError::Inactive);
		}
		if !user.is_verified {
			user.otp = Some(new_otp_challenge(self.otp_ttl_minutes, Utc::now()));
			self.storage
				.update(StorageKey::Users.as_str(), &user.id, &user)
				.await?;
			self.send_otp(&user).await?;
			return Ok(LoginOutcome::VerificationRequired);
		}

		user.last_login = Some(Utc::now());
		self.storage
			.update(StorageKey::Users.as_str(), &user.id, &user)
			.await?;

		let token = self.tokens.issue(&user)?;
		Ok(LoginOutcome::Authenticated {
			token,
			user: UserProfile::from(&user),
		})
	}

	/// Redeems a verification code, marking the account verified and
	/// logging it in.
	pub async fn verify_otp(
		&self,
		email: &str,
		code: &str,
	) -> Result<(String, UserProfile), AccountError> {
		let mut user = self
			.find_by_email(email)
			.await?
			.ok_or(AccountError::UserNotFound)?;

		let accepted = user
			.otp
			.as_ref()
			.is_some_and(|challenge| challenge.accepts(code, Utc::now()));
		if !accepted {
			return Err(AccountError::InvalidOtp);
		}

		user.is_verified = true;
		user.otp = None;
		user.last_login = Some(Utc::now());
		self.storage
			.update(StorageKey::Users.as_str(), &user.id, &user)
			.await?;

		let token = self.tokens.issue(&user)?;
		Ok((token, UserProfile::from(&user)))
	}

	/// Fetches the profile projection for a known user id.
	pub async fn profile(&self, user_id: &str) -> Result<UserProfile, AccountError> {
		let user: User = self
			.storage
			.retrieve(StorageKey::Users.as_str(), user_id)
			.await
			.map_err(|e| match e {
				StorageError::NotFound => AccountError::UserNotFound,
				other => AccountError::Storage(other.to_string()),
			})?;
		Ok(UserProfile::from(&user))
	}

	async fn find_by_email(&self, email: &str) -> Result<Option<User>, AccountError> {
		let user_id: String = match self
			.storage
			.retrieve(StorageKey::UserEmailIndex.as_str(), email)
			.await
		{
			Ok(id) => id,
			Err(StorageError::NotFound) => return Ok(None),
			Err(other) => return Err(AccountError::Storage(other.to_string())),
		};
		match self
			.storage
			.retrieve(StorageKey::Users.as_str(), &user_id)
			.await
		{
			Ok(user) => Ok(Some(user)),
			// A dangling index entry is treated as an unknown email.
			Err(StorageError::NotFound) => Ok(None),
			Err(other) => Err(AccountError::Storage(other.to_string())),
		}
	}

	async fn send_otp(&self, user: &User) -> Result<(), AccountError> {
		let code = user
			.otp
			.as_ref()
			.map(|challenge| challenge.code.as_str())
			.unwrap_or_default();
		self.mailer
			.send_otp(&user.purchasing_email, code)
			.await
			.map_err(|e| AccountError::Mailer(e.to_string()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use async_trait::async_trait;
	use chrono::Duration;
	use orderdesk_auth::MailerError;
	use orderdesk_storage::implementations::memory::MemoryStorage;
	use orderdesk_types::SecretString;
	use std::sync::Mutex;

	/// Captures sent codes so tests can redeem them.
	struct RecordingMailer {
		sent: Arc<Mutex<Vec<(String, String)>>>,
	}

	#[async_trait]
	impl MailerInterface for RecordingMailer {
		async fn send_otp(&self, email: &str, code: &str) -> Result<(), MailerError> {
			self.sent
				.lock()
				.unwrap()
				.push((email.to_string(), code.to_string()));
			Ok(())
		}
	}

	fn service() -> (AccountService, Arc<StorageService>, Arc<Mutex<Vec<(String, String)>>>) {
		let storage = Arc::new(StorageService::new(Box::new(MemoryStorage::new())));
		let sent = Arc::new(Mutex::new(Vec::new()));
		let service = AccountService::new(
			Arc::clone(&storage),
			TokenSigner::new(&SecretString::from("test-secret"), 24),
			Box::new(RecordingMailer {
				sent: Arc::clone(&sent),
			}),
			10,
		);
		(service, storage, sent)
	}

	fn registration() -> Registration {
		Registration {
			email: "buyer@example.com".into(),
			password: "hunter2hunter2".into(),
			company_name: "Precision Parts Inc.".into(),
			purchasing_email: "purchasing@example.com".into(),
		}
	}

	fn last_code(sent: &Arc<Mutex<Vec<(String, String)>>>) -> String {
		sent.lock().unwrap().last().unwrap().1.clone()
	}

	#[tokio::test]
	async fn register_verify_login_round_trip() {
		let (service, _storage, sent) = service();

		let email = service.register(registration()).await.unwrap();
		assert_eq!(email, "buyer@example.com");
		// The code goes to the purchasing address.
		assert_eq!(sent.lock().unwrap()[0].0, "purchasing@example.com");

		let code = last_code(&sent);
		let (token, profile) = service.verify_otp(&email, &code).await.unwrap();
		assert!(!token.is_empty());
		assert_eq!(profile.company_name, "Precision Parts Inc.");

		let outcome = service
			.login("buyer@example.com", "hunter2hunter2")
			.await
			.unwrap();
		assert!(matches!(outcome, LoginOutcome::Authenticated { .. }));
	}

	#[tokio::test]
	async fn login_before_verification_mails_a_fresh_code() {
		let (service, _storage, sent) = service();
		service.register(registration()).await.unwrap();

		let outcome = service
			.login("buyer@example.com", "hunter2hunter2")
			.await
			.unwrap();
		assert!(matches!(outcome, LoginOutcome::VerificationRequired));
		assert_eq!(sent.lock().unwrap().len(), 2);

		// Only the freshest code redeems.
		let code = last_code(&sent);
		service.verify_otp("buyer@example.com", &code).await.unwrap();
	}

	#[tokio::test]
	async fn wrong_password_and_unknown_email_look_alike() {
		let (service, _storage, sent) = service();
		service.register(registration()).await.unwrap();
		let code = last_code(&sent);
		service.verify_otp("buyer@example.com", &code).await.unwrap();

		let wrong = service.login("buyer@example.com", "bad-password").await;
		assert!(matches!(wrong, Err(AccountError::InvalidCredentials)));
		let unknown = service.login("nobody@example.com", "hunter2hunter2").await;
		assert!(matches!(unknown, Err(AccountError::InvalidCredentials)));
	}

	#[tokio::test]
	async fn verified_email_cannot_register_again() {
		let (service, _storage, sent) = service();
		service.register(registration()).await.unwrap();
		let code = last_code(&sent);
		service.verify_otp("buyer@example.com", &code).await.unwrap();

		let again = service.register(registration()).await;
		assert!(matches!(again, Err(AccountError::EmailTaken)));
	}

	#[tokio::test]
	async fn unverified_registration_can_be_repeated() {
		let (service, _storage, sent) = service();
		service.register(registration()).await.unwrap();

		let mut second = registration();
		second.company_name = "Precision Parts International".into();
		service.register(second).await.unwrap();

		let code = last_code(&sent);
		let (_, profile) = service.verify_otp("buyer@example.com", &code).await.unwrap();
		assert_eq!(profile.company_name, "Precision Parts International");
	}

	#[tokio::test]
	async fn wrong_and_expired_codes_are_rejected() {
		let (service, storage, sent) = service();
		service.register(registration()).await.unwrap();

		let wrong = service.verify_otp("buyer@example.com", "000000").await;
		assert!(matches!(wrong, Err(AccountError::InvalidOtp)));

		// Age the stored challenge past its expiry.
		let user_id: String = storage
			.retrieve(StorageKey::UserEmailIndex.as_str(), "buyer@example.com")
			.await
			.unwrap();
		let mut user: User = storage
			.retrieve(StorageKey::Users.as_str(), &user_id)
			.await
			.unwrap();
		if let Some(challenge) = user.otp.as_mut() {
			challenge.expires_at = Utc::now() - Duration::minutes(1);
		}
		storage
			.update(StorageKey::Users.as_str(), &user_id, &user)
			.await
			.unwrap();

		let code = last_code(&sent);
		let expired = service.verify_otp("buyer@example.com", &code).await;
		assert!(matches!(expired, Err(AccountError::InvalidOtp)));
	}

	#[tokio::test]
	async fn deactivated_accounts_cannot_log_in() {
		let (service, storage, sent) = service();
		service.register(registration()).await.unwrap();
		let code = last_code(&sent);
		service.verify_otp("buyer@example.com", &code).await.unwrap();

		let user_id: String = storage
			.retrieve(StorageKey::UserEmailIndex.as_str(), "buyer@example.com")
			.await
			.unwrap();
		let mut user: User = storage
			.retrieve(StorageKey::Users.as_str(), &user_id)
			.await
			.unwrap();
		user.is_active = false;
		storage
			.update(StorageKey::Users.as_str(), &user_id, &user)
			.await
			.unwrap();

		let outcome = service.login("buyer@example.com", "hunter2hunter2").await;
		assert!(matches!(outcome, Err(AccountError::Inactive)));
	}

	#[tokio::test]
	async fn profile_returns_the_projection() {
		let (service, storage, sent) = service();
		service.register(registration()).await.unwrap();
		let code = last_code(&sent);
		service.verify_otp("buyer@example.com", &code).await.unwrap();

		let user_id: String = storage
			.retrieve(StorageKey::UserEmailIndex.as_str(), "buyer@example.com")
			.await
			.unwrap();
		let profile = service.profile(&user_id).await.unwrap();
		assert_eq!(profile.email, "buyer@example.com");

		let missing = service.profile("absent").await;
		assert!(matches!(missing, Err(AccountError::UserNotFound)));
	}
}
