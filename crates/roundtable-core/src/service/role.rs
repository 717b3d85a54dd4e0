//! Role management service.
//!
//! Creating a role writes the role record plus prompt version 1;
//! editing the prompt appends the next version rather than mutating
//! history. Bound ability identifiers are checked against the merged
//! ability namespace at write time.

use chrono::Utc;

use roundtable_types::error::{RepositoryError, RoleError};
use roundtable_types::role::{PromptVersion, Role, RoleStatus, validate_role_name};

use crate::ability::AbilityRegistry;
use crate::repository::{RoleRepository, StoredAbilityRepository};

/// Request payload for creating a role.
#[derive(Debug, Clone)]
pub struct CreateRoleRequest {
    pub name: String,
    pub description: Option<String>,
    pub prompt: Option<String>,
    pub abilities: Vec<String>,
    pub preferred_model: Option<String>,
}

/// Request payload for updating a role. `None` fields stay unchanged;
/// a new prompt appends the next version.
#[derive(Debug, Clone, Default)]
pub struct UpdateRoleRequest {
    pub description: Option<String>,
    pub status: Option<RoleStatus>,
    pub prompt: Option<String>,
    pub abilities: Option<Vec<String>>,
    pub preferred_model: Option<Option<String>>,
}

/// Service orchestrating the role lifecycle.
pub struct RoleService<R, S> {
    roles: R,
    registry: AbilityRegistry<S>,
}

impl<R: RoleRepository, S: StoredAbilityRepository> RoleService<R, S> {
    pub fn new(roles: R, registry: AbilityRegistry<S>) -> Self {
        Self { roles, registry }
    }

    /// Create a role and its prompt version 1.
    pub async fn create(&self, request: CreateRoleRequest) -> Result<Role, RoleError> {
        let name = request.name.trim().to_string();
        validate_role_name(&name).map_err(RoleError::InvalidName)?;
        self.check_abilities(&request.abilities).await?;

        let now = Utc::now();
        let role = Role {
            name: name.clone(),
            description: request.description.unwrap_or_default(),
            status: RoleStatus::Enabled,
            abilities: request.abilities,
            preferred_model: request.preferred_model,
            created_at: now,
            updated_at: now,
        };

        let role = self.roles.create(&role).await.map_err(|e| match e {
            RepositoryError::Conflict(_) => RoleError::NameConflict(name.clone()),
            other => RoleError::StorageError(other.to_string()),
        })?;

        let version = PromptVersion {
            role_name: name,
            version: 1,
            content: request.prompt.unwrap_or_default(),
            created_at: now,
        };
        self.roles
            .append_prompt_version(&version)
            .await
            .map_err(|e| RoleError::StorageError(e.to_string()))?;

        Ok(role)
    }

    /// Apply an update; a prompt change appends the next version.
    pub async fn update(&self, name: &str, request: UpdateRoleRequest) -> Result<Role, RoleError> {
        let mut role = self
            .roles
            .get_by_name(name)
            .await
            .map_err(|e| RoleError::StorageError(e.to_string()))?
            .ok_or(RoleError::NotFound)?;

        if let Some(description) = request.description {
            role.description = description;
        }
        if let Some(status) = request.status {
            role.status = status;
        }
        if let Some(abilities) = request.abilities {
            self.check_abilities(&abilities).await?;
            role.abilities = abilities;
        }
        if let Some(preferred_model) = request.preferred_model {
            role.preferred_model = preferred_model;
        }
        role.updated_at = Utc::now();

        let role = self
            .roles
            .update(&role)
            .await
            .map_err(|e| RoleError::StorageError(e.to_string()))?;

        if let Some(content) = request.prompt {
            let next = self
                .roles
                .latest_prompt_version(name)
                .await
                .map_err(|e| RoleError::StorageError(e.to_string()))?
                .map_or(1, |v| v.version + 1);
            let version = PromptVersion {
                role_name: name.to_string(),
                version: next,
                content,
                created_at: Utc::now(),
            };
            self.roles
                .append_prompt_version(&version)
                .await
                .map_err(|e| RoleError::StorageError(e.to_string()))?;
        }

        Ok(role)
    }

    pub async fn get(&self, name: &str) -> Result<Role, RoleError> {
        self.roles
            .get_by_name(name)
            .await
            .map_err(|e| RoleError::StorageError(e.to_string()))?
            .ok_or(RoleError::NotFound)
    }

    pub async fn list(&self) -> Result<Vec<Role>, RoleError> {
        self.roles
            .list()
            .await
            .map_err(|e| RoleError::StorageError(e.to_string()))
    }

    pub async fn delete(&self, name: &str) -> Result<(), RoleError> {
        self.get(name).await?;
        self.roles
            .delete(name)
            .await
            .map_err(|e| RoleError::StorageError(e.to_string()))
    }

    /// Latest prompt version content, if the role has one.
    pub async fn latest_prompt(&self, name: &str) -> Result<Option<PromptVersion>, RoleError> {
        self.roles
            .latest_prompt_version(name)
            .await
            .map_err(|e| RoleError::StorageError(e.to_string()))
    }

    /// Full prompt history, ascending by version.
    pub async fn prompt_history(&self, name: &str) -> Result<Vec<PromptVersion>, RoleError> {
        self.get(name).await?;
        self.roles
            .list_prompt_versions(name)
            .await
            .map_err(|e| RoleError::StorageError(e.to_string()))
    }

    async fn check_abilities(&self, ids: &[String]) -> Result<(), RoleError> {
        for id in ids {
            let resolved = self
                .registry
                .resolve(id)
                .await
                .map_err(|e| RoleError::StorageError(e.to_string()))?;
            if resolved.is_none() {
                return Err(RoleError::UnknownAbility(id.clone()));
            }
        }
        Ok(())
    }
}
