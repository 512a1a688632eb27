//! Repository traits for database access
//!
//! This module defines traits for database repositories that can be implemented
//! by different storage backends, so callers can stay agnostic of the
//! concrete implementation.

use std::error::Error;
use std::fmt::Debug;

/// A trait for database repositories
///
/// This trait defines the basic operations that all database repositories
/// should support. It is generic over the entity type and the error type.
/// Entities are immutable once stored, so there is no update operation.
pub trait Repository<T, E>
where
    T: Clone + Debug,
    E: Error + Debug,
{
    /// The identifier of a stored entity
    type Id: Debug + Send + Sync;

    /// Create a new entity in the repository
    ///
    /// # Returns
    ///
    /// The created entity, or an error if the operation failed
    fn create(&self, entity: T) -> impl std::future::Future<Output = Result<T, E>> + Send;

    /// Read an entity from the repository by ID
    ///
    /// # Returns
    ///
    /// The entity if found, or None if not found, or an error if the operation failed
    fn read(
        &self,
        id: Self::Id,
    ) -> impl std::future::Future<Output = Result<Option<T>, E>> + Send;

    /// Delete an entity from the repository by ID
    ///
    /// # Returns
    ///
    /// `true` if the entity was deleted, `false` if it was not found,
    /// or an error if the operation failed
    fn delete(&self, id: Self::Id) -> impl std::future::Future<Output = Result<bool, E>> + Send;
}

/// A trait for database repository factories
///
/// This trait defines a factory for creating repository instances.
/// It is generic over the repository type and the configuration type.
pub trait RepositoryFactory<R, C> {
    /// Create a new repository instance
    ///
    /// # Arguments
    ///
    /// * `config` - The configuration for the repository
    fn create_repository(&self, config: C) -> R;
}
