//! Common types module for the orderdesk system.
//!
//! This module defines the core data types and structures used throughout
//! the order-management service. It provides a centralized location for
//! shared types to ensure consistency across all components.

/// API envelope types, pagination, and the HTTP error taxonomy.
pub mod api;
/// Notification records and the canonical notification kind enum.
pub mod notification;
/// Purchase order records, line items, and the status transition table.
pub mod order;
/// Secure string type for secrets such as the token signing key.
pub mod secret_string;
/// Storage namespace keys for persisted collections.
pub mod storage;
/// User accounts and the OTP verification challenge.
pub mod user;

// Re-export all types for convenient access
pub use api::*;
pub use notification::*;
pub use order::*;
pub use secret_string::SecretString;
pub use storage::*;
pub use user::*;
