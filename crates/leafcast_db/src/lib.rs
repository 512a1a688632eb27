//! Device persistence for Leafcast
//!
//! This crate stores the push-notification endpoints ("devices") of users in
//! a relational database, using SQLx as the underlying database library.
//!
//! # Features
//!
//! - `sqlite` (default): SQLite through a pooled `sqlx::SqlitePool`
//! - `postgres`: PostgreSQL; takes precedence when both are enabled
//!
//! # Guarantees
//!
//! - A user has at most one device per key; creating it again returns the
//!   stored device.
//! - Stored subscriptions are validated on write and on read. A corrupted
//!   subscription makes a point read fail, and is skipped when listing.
//! - Bulk deletion is always scoped to the owning user.
//!
//! # Example
//!
//! ```rust,no_run
//! use leafcast_config::load_config;
//! use leafcast_db::{DbClient, DeviceRepository, SqlDeviceRepository};
//! use std::sync::Arc;
//!
//! async fn list_devices(user_id: i64) -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Arc::new(load_config()?);
//!     let repository = SqlDeviceRepository::new(DbClient::new(&config).await?);
//!     repository.init_schema().await?;
//!     for device in repository.get_devices_by_user(user_id).await? {
//!         println!("{} -> {}", device.key, device.subscription.endpoint);
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod factory;
pub mod repositories;
pub mod repository;

// Re-export the client, factory, and repository traits for ease of use
pub use client::{Db, DbClient, DbPool, DbRow};
pub use error::DbError;
pub use factory::DbClientFactory;
pub use repository::{Repository, RepositoryFactory};

// Re-export the repositories module components for ease of use
pub use repositories::{
    DbDevice, Device, DeviceRepository, DeviceRepositoryFactory, SqlDeviceRepository,
};
