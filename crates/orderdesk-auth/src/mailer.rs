//! Outgoing-mail seam for the orderdesk service.
//!
//! The mailer is a constructor-injected trait object built from explicit
//! configuration at startup; there is no lazily-initialized global
//! transport. Real SMTP delivery is out of scope for this service; the
//! shipped implementation records sends through tracing.

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur while sending mail.
#[derive(Debug, Error)]
pub enum MailerError {
	/// The message could not be handed to the transport.
	#[error("Send error: {0}")]
	Send(String),
	/// Error that occurs during configuration validation.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Trait defining the interface for outgoing mail implementations.
#[async_trait]
pub trait MailerInterface: Send + Sync {
	/// Delivers a one-time verification code to the given address.
	async fn send_otp(&self, email: &str, code: &str) -> Result<(), MailerError>;
}

/// Type alias for mailer factory functions.
pub type MailerFactory = fn(&toml::Value) -> Result<Box<dyn MailerInterface>, MailerError>;

/// Get all registered mailer implementations.
pub fn get_all_implementations() -> Vec<(&'static str, MailerFactory)> {
	vec![("log", create_log_mailer)]
}

/// Mailer implementation that records sends through tracing.
///
/// Used in development and test environments; the OTP code itself is not
/// logged.
pub struct LogMailer {
	/// Sender identity announced in the log line.
	from: String,
}

impl LogMailer {
	/// Creates a new LogMailer with the given sender identity.
	pub fn new(from: String) -> Self {
		Self { from }
	}
}

#[async_trait]
impl MailerInterface for LogMailer {
	async fn send_otp(&self, email: &str, _code: &str) -> Result<(), MailerError> {
		tracing::info!(from = %self.from, to = %email, "Sent login OTP email");
		Ok(())
	}
}

/// Factory function to create a logging mailer from configuration.
///
/// Configuration parameters:
/// - `from`: Sender identity (default: "orderdesk <no-reply@localhost>")
pub fn create_log_mailer(config: &toml::Value) -> Result<Box<dyn MailerInterface>, MailerError> {
	let from = config
		.get("from")
		.and_then(|v| v.as_str())
		.unwrap_or("orderdesk <no-reply@localhost>")
		.to_string();

	Ok(Box::new(LogMailer::new(from)))
}
