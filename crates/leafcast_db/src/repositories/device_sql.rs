//! SQL implementation of the device repository
//!
//! This module provides a SQL implementation of the DeviceRepository trait.

use crate::error::DbError;
use crate::repositories::device::{DbDevice, Device, DeviceRepository};
use crate::repositories::device_query;
use crate::{DbClient, Repository};
use futures_util::TryStreamExt;
use tracing::{debug, error, info, warn};

#[cfg(not(feature = "postgres"))]
const CREATE_DEVICES_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS devices (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        key TEXT NOT NULL,
        subscription TEXT NOT NULL,
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        UNIQUE(user_id, key)
    )
"#;

#[cfg(feature = "postgres")]
const CREATE_DEVICES_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS devices (
        id BIGSERIAL PRIMARY KEY,
        user_id BIGINT NOT NULL,
        key TEXT NOT NULL,
        subscription TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        UNIQUE(user_id, key)
    )
"#;

/// SQL implementation of the device repository
///
/// Holds nothing but a handle on the shared pool, so it can be cloned into
/// every request handler.
#[derive(Debug, Clone)]
pub struct SqlDeviceRepository {
    /// The database client
    db_client: DbClient,
}

impl SqlDeviceRepository {
    /// Create a new SQL device repository
    ///
    /// # Arguments
    ///
    /// * `db_client` - The database client
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }

    async fn insert_device(
        &self,
        user_id: i64,
        key: &str,
        subscription: String,
    ) -> Result<Device, DbError> {
        let mut query = device_query::insert(user_id, key, subscription);
        let row = query
            .build_query_as::<DbDevice>()
            .fetch_one(self.db_client.pool())
            .await?;
        Device::try_from(row)
    }

    /// Return the row that won a concurrent insert of `(user_id, key)`.
    ///
    /// `violation` is the uniqueness error of the losing insert; it is
    /// returned unchanged when the winning row can't be read back.
    async fn resolve_lost_race(
        &self,
        violation: DbError,
        user_id: i64,
        key: &str,
    ) -> Result<Device, DbError> {
        warn!(user_id, key, "Device created concurrently, reading it back");

        match self.get_device_by_user_and_key(user_id, key).await {
            Ok(Some(existing)) => Ok(existing),
            Ok(None) => {
                warn!(user_id, key, "Concurrently created device is gone");
                Err(violation)
            }
            Err(e) => {
                error!(
                    user_id,
                    key,
                    error = %e,
                    "Failed to read back concurrently created device"
                );
                Err(violation)
            }
        }
    }

    async fn find_one(
        &self,
        mut query: sqlx::QueryBuilder<'_, crate::Db>,
    ) -> Result<Option<Device>, DbError> {
        let row = query
            .build_query_as::<DbDevice>()
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to find device: {}", e);
                DbError::from(e)
            })?;

        row.map(Device::try_from).transpose()
    }

    async fn remove_by_id(&self, id: i64) -> Result<u64, DbError> {
        let mut query = device_query::delete_by_id(id);
        let result = query
            .build()
            .execute(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to delete device {}: {}", id, e);
                DbError::from(e)
            })?;

        Ok(result.rows_affected())
    }
}

impl DeviceRepository for SqlDeviceRepository {
    async fn init_schema(&self) -> Result<(), DbError> {
        debug!("Initializing device schema");

        self.db_client.execute(CREATE_DEVICES_TABLE).await?;

        info!("Device schema initialized successfully");
        Ok(())
    }

    async fn create_device(&self, device: Device) -> Result<Device, DbError> {
        debug!(user_id = device.user_id, key = %device.key, "Creating device");

        if let Some(existing) = self
            .get_device_by_user_and_key(device.user_id, &device.key)
            .await?
        {
            debug!(device_id = ?existing.id, "Device already registered");
            return Ok(existing);
        }

        device.validate()?;
        let subscription = device.subscription_text()?;

        match self
            .insert_device(device.user_id, &device.key, subscription)
            .await
        {
            Ok(created) => {
                info!(
                    device_id = ?created.id,
                    user_id = created.user_id,
                    "Device created successfully"
                );
                Ok(created)
            }
            Err(err) if err.is_unique_violation() => {
                // Another caller inserted the same natural key since the lookup.
                self.resolve_lost_race(err, device.user_id, &device.key).await
            }
            Err(err) => {
                error!("Failed to insert device: {}", err);
                Err(err)
            }
        }
    }

    async fn get_device_by_id(&self, id: i64) -> Result<Option<Device>, DbError> {
        debug!(device_id = id, "Finding device by id");

        self.find_one(device_query::select_by_id(id)).await
    }

    async fn get_device_by_user_and_key(
        &self,
        user_id: i64,
        key: &str,
    ) -> Result<Option<Device>, DbError> {
        debug!(user_id, key, "Finding device by user and key");

        self.find_one(device_query::select_by_user_and_key(user_id, key))
            .await
    }

    async fn get_devices_by_user(&self, user_id: i64) -> Result<Vec<Device>, DbError> {
        debug!(user_id, "Finding all devices of user");

        let mut query = device_query::select_by_user(user_id);
        let mut rows = query
            .build_query_as::<DbDevice>()
            .fetch(self.db_client.pool());

        let mut devices = Vec::new();
        while let Some(row) = rows.try_next().await.map_err(|e| {
            error!("Failed to read devices of user {}: {}", user_id, e);
            DbError::from(e)
        })? {
            let device_id = row.id;
            match Device::try_from(row) {
                Ok(device) => devices.push(device),
                Err(e) => warn!(
                    device_id,
                    user_id,
                    error = %e,
                    "Skipping device with invalid subscription"
                ),
            }
        }

        Ok(devices)
    }

    async fn count_devices_by_user(&self, user_id: i64) -> Result<i64, DbError> {
        debug!(user_id, "Counting devices of user");

        let mut query = device_query::count_by_user(user_id);
        let count = query
            .build_query_scalar::<i64>()
            .fetch_one(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to count devices of user {}: {}", user_id, e);
                DbError::from(e)
            })?;

        Ok(count)
    }

    async fn delete_device(&self, device: &Device) -> Result<(), DbError> {
        let id = device
            .id
            .ok_or_else(|| DbError::NotFound("device has no id".to_string()))?;
        debug!(device_id = id, "Deleting device");

        if self.remove_by_id(id).await? == 0 {
            return Err(DbError::NotFound(format!(
                "no device has been removed (id {})",
                id
            )));
        }

        info!(device_id = id, "Device deleted successfully");
        Ok(())
    }

    async fn delete_devices(&self, user_id: i64, ids: &[i64]) -> Result<u64, DbError> {
        debug!(user_id, ?ids, "Deleting devices of user");

        let Some(mut query) = device_query::delete_by_user_and_ids(user_id, ids) else {
            return Ok(0);
        };

        let result = query
            .build()
            .execute(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to delete devices of user {}: {}", user_id, e);
                DbError::from(e)
            })?;

        info!(user_id, count = result.rows_affected(), "Devices deleted");
        Ok(result.rows_affected())
    }
}

impl Repository<Device, DbError> for SqlDeviceRepository {
    type Id = i64;

    async fn create(&self, entity: Device) -> Result<Device, DbError> {
        self.create_device(entity).await
    }

    async fn read(&self, id: i64) -> Result<Option<Device>, DbError> {
        self.get_device_by_id(id).await
    }

    async fn delete(&self, id: i64) -> Result<bool, DbError> {
        Ok(self.remove_by_id(id).await? > 0)
    }
}
