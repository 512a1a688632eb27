//! Factory for creating device repositories

use crate::repositories::device_sql::SqlDeviceRepository;
use crate::{DbClient, RepositoryFactory};

/// Factory for creating device repositories on top of a database client
#[derive(Debug, Clone, Default)]
pub struct DeviceRepositoryFactory;

impl DeviceRepositoryFactory {
    pub fn new() -> Self {
        Self
    }
}

impl RepositoryFactory<SqlDeviceRepository, DbClient> for DeviceRepositoryFactory {
    /// Create a new device repository sharing the client's pool
    fn create_repository(&self, db_client: DbClient) -> SqlDeviceRepository {
        SqlDeviceRepository::new(db_client)
    }
}
