//! Repository for devices
//!
//! This module provides the interface for storing and retrieving push
//! notification devices, and the mapping from a `devices` row to a [`Device`].

use crate::client::DbRow;
use crate::error::DbError;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, Row};

// Re-export Device from leafcast_common for convenience
pub use leafcast_common::models::Device;
use leafcast_common::models::Subscription;

/// A raw `devices` row, with the subscription still in its stored text form
///
/// Columns are read by position, in the order of
/// [`DEVICE_COLUMNS`](super::device_query::DEVICE_COLUMNS).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbDevice {
    pub id: i64,
    pub user_id: i64,
    pub key: String,
    pub subscription: String,
    pub created_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, DbRow> for DbDevice {
    fn from_row(row: &'r DbRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get(0)?,
            user_id: row.try_get(1)?,
            key: row.try_get(2)?,
            subscription: row.try_get(3)?,
            created_at: row.try_get(4)?,
        })
    }
}

/// Validates the stored subscription; a row whose subscription doesn't parse
/// can't become a [`Device`].
impl TryFrom<DbDevice> for Device {
    type Error = DbError;

    fn try_from(db: DbDevice) -> Result<Self, Self::Error> {
        let subscription = Subscription::parse(&db.subscription)?;
        Ok(Self {
            id: Some(db.id),
            user_id: db.user_id,
            key: db.key,
            subscription,
            created_at: Some(db.created_at),
        })
    }
}

/// Repository for devices
///
/// A device is identified by its id, and by its natural key: the pair
/// (user id, device key), which is unique.
pub trait DeviceRepository {
    /// Initialize the database schema
    ///
    /// Creates the `devices` table if it doesn't already exist. An existing
    /// table is never altered.
    fn init_schema(&self) -> impl std::future::Future<Output = Result<(), DbError>> + Send;

    /// Create a device
    ///
    /// If a device already exists for the same user and key it is returned
    /// unchanged. Otherwise the device is validated and inserted.
    ///
    /// # Arguments
    ///
    /// * `device` - The device to store; its `id` and `created_at` are ignored
    ///
    /// # Returns
    ///
    /// The stored device with its id and creation time set
    fn create_device(
        &self,
        device: Device,
    ) -> impl std::future::Future<Output = Result<Device, DbError>> + Send;

    /// Find a device by id
    ///
    /// # Returns
    ///
    /// The device if found, or None if not found. A stored subscription that
    /// fails validation is an error.
    fn get_device_by_id(
        &self,
        id: i64,
    ) -> impl std::future::Future<Output = Result<Option<Device>, DbError>> + Send;

    /// Find a device by user id and device key
    ///
    /// # Returns
    ///
    /// The device if found, or None if not found
    fn get_device_by_user_and_key(
        &self,
        user_id: i64,
        key: &str,
    ) -> impl std::future::Future<Output = Result<Option<Device>, DbError>> + Send;

    /// Find all devices of a user
    ///
    /// Devices whose stored subscription fails validation are skipped.
    ///
    /// # Returns
    ///
    /// The user's devices, in no particular order
    fn get_devices_by_user(
        &self,
        user_id: i64,
    ) -> impl std::future::Future<Output = Result<Vec<Device>, DbError>> + Send;

    /// Count the devices of a user, including those with an invalid subscription
    fn count_devices_by_user(
        &self,
        user_id: i64,
    ) -> impl std::future::Future<Output = Result<i64, DbError>> + Send;

    /// Delete a device by id
    ///
    /// Ownership is not checked here: the caller must already know the
    /// device belongs to the acting user.
    ///
    /// # Errors
    ///
    /// [`DbError::NotFound`] if the device has no id or no row was removed
    fn delete_device(
        &self,
        device: &Device,
    ) -> impl std::future::Future<Output = Result<(), DbError>> + Send;

    /// Delete the devices of a user among a set of ids
    ///
    /// Ids belonging to another user are left alone.
    ///
    /// # Returns
    ///
    /// The number of devices removed
    fn delete_devices(
        &self,
        user_id: i64,
        ids: &[i64],
    ) -> impl std::future::Future<Output = Result<u64, DbError>> + Send;
}
