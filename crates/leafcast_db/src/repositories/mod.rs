//! Repository modules for database access
//!
//! Query assembly, row mapping and the repository API for each entity.

pub mod device;
pub mod device_factory;
pub mod device_query;
pub mod device_sql;

// Re-export the device repository and factory for ease of use
pub use device::{DbDevice, Device, DeviceRepository};
pub use device_factory::DeviceRepositoryFactory;
pub use device_sql::SqlDeviceRepository;
