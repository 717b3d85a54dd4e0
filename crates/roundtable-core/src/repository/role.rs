//! Role repository trait definition.

use roundtable_types::error::RepositoryError;
use roundtable_types::role::{PromptVersion, Role};

/// Repository trait for role and prompt-version persistence.
///
/// Implementations live in roundtable-infra (e.g., SqliteRoleRepository).
/// Uses native async fn in traits (Rust 2024 edition, no async_trait macro).
pub trait RoleRepository: Send + Sync {
    /// Create a new role. Returns the created role.
    fn create(
        &self,
        role: &Role,
    ) -> impl std::future::Future<Output = Result<Role, RepositoryError>> + Send;

    /// Get a role by its unique name.
    fn get_by_name(
        &self,
        name: &str,
    ) -> impl std::future::Future<Output = Result<Option<Role>, RepositoryError>> + Send;

    /// List all roles, ordered by name.
    fn list(&self) -> impl std::future::Future<Output = Result<Vec<Role>, RepositoryError>> + Send;

    /// Update an existing role. Returns the updated role.
    fn update(
        &self,
        role: &Role,
    ) -> impl std::future::Future<Output = Result<Role, RepositoryError>> + Send;

    /// Permanently delete a role and its prompt versions by name.
    fn delete(
        &self,
        name: &str,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Append a new prompt version for a role.
    fn append_prompt_version(
        &self,
        version: &PromptVersion,
    ) -> impl std::future::Future<Output = Result<PromptVersion, RepositoryError>> + Send;

    /// Get the highest-numbered prompt version for a role, if any.
    fn latest_prompt_version(
        &self,
        role_name: &str,
    ) -> impl std::future::Future<Output = Result<Option<PromptVersion>, RepositoryError>> + Send;

    /// List all prompt versions for a role, ascending by version.
    fn list_prompt_versions(
        &self,
        role_name: &str,
    ) -> impl std::future::Future<Output = Result<Vec<PromptVersion>, RepositoryError>> + Send;
}
