//! Stored-ability repository trait definition.

use roundtable_types::ability::Ability;
use roundtable_types::error::RepositoryError;

/// Repository trait for the dynamic (stored) ability layer.
///
/// Stored abilities are the highest-precedence layer: when an id here
/// collides with a built-in or configured ability, this definition wins.
pub trait StoredAbilityRepository: Send + Sync {
    /// Create a new stored ability. Returns the created ability.
    fn create(
        &self,
        ability: &Ability,
    ) -> impl std::future::Future<Output = Result<Ability, RepositoryError>> + Send;

    /// Get a stored ability by id.
    fn get_by_id(
        &self,
        id: &str,
    ) -> impl std::future::Future<Output = Result<Option<Ability>, RepositoryError>> + Send;

    /// List all stored abilities, ordered by id.
    fn list(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<Ability>, RepositoryError>> + Send;

    /// Update a stored ability. Returns the updated ability.
    fn update(
        &self,
        ability: &Ability,
    ) -> impl std::future::Future<Output = Result<Ability, RepositoryError>> + Send;

    /// Permanently delete a stored ability by id.
    fn delete(
        &self,
        id: &str,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
