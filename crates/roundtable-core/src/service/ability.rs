//! Stored-ability management service.
//!
//! The dynamic layer is the only writable one. The built-in dialogue
//! identifier can never be created, edited, or deleted here, and
//! configured-layer identifiers are likewise read-only at runtime.

use roundtable_types::ability::{Ability, AbilityKind, DIALOGUE_ABILITY_ID, ResolvedAbility};
use roundtable_types::error::{AbilityError, RepositoryError};

use crate::ability::AbilityRegistry;
use crate::repository::StoredAbilityRepository;

/// Request payload for creating or replacing a stored ability.
#[derive(Debug, Clone)]
pub struct UpsertAbilityRequest {
    pub id: String,
    pub name: String,
    pub description: String,
    pub command: Option<Vec<String>>,
    pub prompt_template: Option<String>,
}

impl UpsertAbilityRequest {
    fn into_ability(self) -> Result<Ability, AbilityError> {
        let kind = match (self.command, self.prompt_template) {
            (Some(template), None) => AbilityKind::Command { template },
            (None, Some(template)) => AbilityKind::Prompt { template },
            _ => return Err(AbilityError::NoTemplate(self.id)),
        };
        Ok(Ability {
            id: self.id,
            name: self.name,
            description: self.description,
            kind,
        })
    }
}

/// Service for the stored ability layer, with merged-namespace reads.
pub struct AbilityService<S> {
    registry: AbilityRegistry<S>,
    stored: S,
}

impl<S: StoredAbilityRepository + Clone> AbilityService<S> {
    /// The stored repository is shared with the registry so dynamic
    /// writes are visible on the next resolve.
    pub fn new(configured: Vec<Ability>, stored: S) -> Self {
        Self {
            registry: AbilityRegistry::new(configured, stored.clone()),
            stored,
        }
    }

    /// List the merged namespace, one entry per identifier.
    pub async fn list(&self) -> Result<Vec<ResolvedAbility>, AbilityError> {
        self.registry
            .list()
            .await
            .map_err(|e| AbilityError::StorageError(e.to_string()))
    }

    /// Resolve one identifier through the merged namespace.
    pub async fn resolve(&self, id: &str) -> Result<ResolvedAbility, AbilityError> {
        self.registry
            .resolve(id)
            .await
            .map_err(|e| AbilityError::StorageError(e.to_string()))?
            .ok_or_else(|| AbilityError::NotFound(id.to_string()))
    }

    /// Create a stored ability. Exactly one template must be supplied.
    pub async fn create(&self, request: UpsertAbilityRequest) -> Result<Ability, AbilityError> {
        self.guard_writable(&request.id)?;
        let ability = request.into_ability()?;
        self.stored.create(&ability).await.map_err(|e| match e {
            RepositoryError::Conflict(_) => AbilityError::IdConflict(ability.id.clone()),
            other => AbilityError::StorageError(other.to_string()),
        })
    }

    /// Update a stored ability in place.
    pub async fn update(&self, request: UpsertAbilityRequest) -> Result<Ability, AbilityError> {
        self.guard_writable(&request.id)?;
        let existing = self
            .stored
            .get_by_id(&request.id)
            .await
            .map_err(|e| AbilityError::StorageError(e.to_string()))?;
        if existing.is_none() {
            return Err(AbilityError::NotFound(request.id));
        }
        let ability = request.into_ability()?;
        self.stored
            .update(&ability)
            .await
            .map_err(|e| AbilityError::StorageError(e.to_string()))
    }

    /// Delete a stored ability.
    pub async fn delete(&self, id: &str) -> Result<(), AbilityError> {
        self.guard_writable(id)?;
        let existing = self
            .stored
            .get_by_id(id)
            .await
            .map_err(|e| AbilityError::StorageError(e.to_string()))?;
        if existing.is_none() {
            return Err(AbilityError::NotFound(id.to_string()));
        }
        self.stored
            .delete(id)
            .await
            .map_err(|e| AbilityError::StorageError(e.to_string()))
    }

    fn guard_writable(&self, id: &str) -> Result<(), AbilityError> {
        if id == DIALOGUE_ABILITY_ID {
            return Err(AbilityError::BuiltinImmutable);
        }
        if self.registry.is_configured(id) {
            return Err(AbilityError::ConfiguredImmutable(id.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roundtable_types::ability::AbilitySource;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct MemStore {
        rows: Arc<Mutex<HashMap<String, Ability>>>,
    }

    impl StoredAbilityRepository for MemStore {
        async fn create(&self, ability: &Ability) -> Result<Ability, RepositoryError> {
            let mut rows = self.rows.lock().unwrap();
            if rows.contains_key(&ability.id) {
                return Err(RepositoryError::Conflict(ability.id.clone()));
            }
            rows.insert(ability.id.clone(), ability.clone());
            Ok(ability.clone())
        }

        async fn get_by_id(&self, id: &str) -> Result<Option<Ability>, RepositoryError> {
            Ok(self.rows.lock().unwrap().get(id).cloned())
        }

        async fn list(&self) -> Result<Vec<Ability>, RepositoryError> {
            let mut all: Vec<Ability> = self.rows.lock().unwrap().values().cloned().collect();
            all.sort_by(|a, b| a.id.cmp(&b.id));
            Ok(all)
        }

        async fn update(&self, ability: &Ability) -> Result<Ability, RepositoryError> {
            self.rows
                .lock()
                .unwrap()
                .insert(ability.id.clone(), ability.clone());
            Ok(ability.clone())
        }

        async fn delete(&self, id: &str) -> Result<(), RepositoryError> {
            self.rows.lock().unwrap().remove(id);
            Ok(())
        }
    }

    fn configured_echo() -> Ability {
        Ability {
            id: "echo".to_string(),
            name: "Echo".to_string(),
            description: String::new(),
            kind: AbilityKind::Command {
                template: vec!["echo".to_string()],
            },
        }
    }

    fn request(id: &str) -> UpsertAbilityRequest {
        UpsertAbilityRequest {
            id: id.to_string(),
            name: id.to_string(),
            description: String::new(),
            command: Some(vec!["true".to_string()]),
            prompt_template: None,
        }
    }

    #[tokio::test]
    async fn test_dialogue_cannot_be_created() {
        let service = AbilityService::new(vec![], MemStore::default());
        let err = service.create(request(DIALOGUE_ABILITY_ID)).await.unwrap_err();
        assert!(matches!(err, AbilityError::BuiltinImmutable));
    }

    #[tokio::test]
    async fn test_dialogue_cannot_be_deleted() {
        let service = AbilityService::new(vec![], MemStore::default());
        let err = service.delete(DIALOGUE_ABILITY_ID).await.unwrap_err();
        assert!(matches!(err, AbilityError::BuiltinImmutable));
    }

    #[tokio::test]
    async fn test_configured_ability_is_read_only() {
        let service = AbilityService::new(vec![configured_echo()], MemStore::default());
        let err = service.create(request("echo")).await.unwrap_err();
        assert!(matches!(err, AbilityError::ConfiguredImmutable(_)));
    }

    #[tokio::test]
    async fn test_create_requires_exactly_one_template() {
        let service = AbilityService::new(vec![], MemStore::default());
        let mut both = request("x");
        both.prompt_template = Some("{message}".to_string());
        assert!(matches!(
            service.create(both).await.unwrap_err(),
            AbilityError::NoTemplate(_)
        ));

        let mut neither = request("y");
        neither.command = None;
        assert!(matches!(
            service.create(neither).await.unwrap_err(),
            AbilityError::NoTemplate(_)
        ));
    }

    #[tokio::test]
    async fn test_stored_write_visible_in_merged_listing() {
        let service = AbilityService::new(vec![], MemStore::default());
        service.create(request("count")).await.unwrap();

        let resolved = service.resolve("count").await.unwrap();
        assert_eq!(resolved.source, AbilitySource::Stored);

        let all = service.list().await.unwrap();
        assert!(all.iter().any(|r| r.ability.id == "count"));
        assert!(all.iter().any(|r| r.ability.id == DIALOGUE_ABILITY_ID));
    }

    #[tokio::test]
    async fn test_update_missing_ability_not_found() {
        let service = AbilityService::new(vec![], MemStore::default());
        let err = service.update(request("ghost")).await.unwrap_err();
        assert!(matches!(err, AbilityError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_duplicate_create_conflicts() {
        let service = AbilityService::new(vec![], MemStore::default());
        service.create(request("x")).await.unwrap();
        let err = service.create(request("x")).await.unwrap_err();
        assert!(matches!(err, AbilityError::IdConflict(_)));
    }
}
