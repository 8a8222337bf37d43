//! Core business logic for the orderdesk system.
//!
//! This crate hosts the three services behind the HTTP layer: the order
//! workflow (status transitions and notification synchronization), the
//! notification query service, and the account service (registration,
//! login, and OTP verification).

/// Account registration, login, and OTP verification.
pub mod accounts;
/// Paginated notification retrieval and mutation.
pub mod notifications;
/// Order status transitions and notification synchronization.
pub mod workflow;

pub use accounts::{AccountError, AccountService, LoginOutcome, Registration};
pub use notifications::{NotificationError, NotificationService};
pub use workflow::{NewOrder, OrderWorkflow, WorkflowError};
