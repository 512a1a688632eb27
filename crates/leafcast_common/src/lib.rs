// --- File: crates/leafcast_common/src/lib.rs ---

// Declare modules within this crate
pub mod error; // Error handling
pub mod logging; // Logging utilities
pub mod models; // Domain model

// Re-export error types and utilities for easier access
pub use error::{parse_error, validation_error, LeafcastError};

// Re-export the domain model for easier access
pub use models::{Device, Subscription, SubscriptionKeys};

// Re-export logging utilities for easier access
pub use logging::{init, init_from_config, init_with_level};
