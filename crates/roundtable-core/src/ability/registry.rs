//! Three-layer ability namespace.
//!
//! Built-in (fixed, only the dialogue ability) < configured (from
//! `config.toml`) < stored (editable at runtime). The merge is
//! recomputed per call from the layers rather than cached, so a write
//! to the stored layer is visible on the very next resolve.

use std::collections::BTreeMap;

use roundtable_types::ability::{Ability, AbilitySource, ResolvedAbility};
use roundtable_types::error::RepositoryError;

use crate::repository::StoredAbilityRepository;

/// Merges the three ability layers into a single lookup by identifier.
pub struct AbilityRegistry<S> {
    configured: Vec<Ability>,
    stored: S,
}

impl<S: StoredAbilityRepository> AbilityRegistry<S> {
    pub fn new(configured: Vec<Ability>, stored: S) -> Self {
        Self { configured, stored }
    }

    /// Resolve one identifier to the single visible definition, with
    /// later layers overriding earlier ones.
    pub async fn resolve(&self, id: &str) -> Result<Option<ResolvedAbility>, RepositoryError> {
        if let Some(ability) = self.stored.get_by_id(id).await? {
            return Ok(Some(ResolvedAbility {
                ability,
                source: AbilitySource::Stored,
            }));
        }
        if let Some(ability) = self.configured.iter().find(|a| a.id == id) {
            return Ok(Some(ResolvedAbility {
                ability: ability.clone(),
                source: AbilitySource::Configured,
            }));
        }
        let dialogue = Ability::dialogue();
        if id == dialogue.id {
            return Ok(Some(ResolvedAbility {
                ability: dialogue,
                source: AbilitySource::Builtin,
            }));
        }
        Ok(None)
    }

    /// Union of all three layers, one entry per identifier, last writer
    /// wins. Ordered by identifier for stable listings.
    pub async fn list(&self) -> Result<Vec<ResolvedAbility>, RepositoryError> {
        let mut merged: BTreeMap<String, ResolvedAbility> = BTreeMap::new();

        let dialogue = Ability::dialogue();
        merged.insert(
            dialogue.id.clone(),
            ResolvedAbility {
                ability: dialogue,
                source: AbilitySource::Builtin,
            },
        );
        for ability in &self.configured {
            merged.insert(
                ability.id.clone(),
                ResolvedAbility {
                    ability: ability.clone(),
                    source: AbilitySource::Configured,
                },
            );
        }
        for ability in self.stored.list().await? {
            merged.insert(
                ability.id.clone(),
                ResolvedAbility {
                    ability,
                    source: AbilitySource::Stored,
                },
            );
        }

        Ok(merged.into_values().collect())
    }

    /// Whether the identifier shadows the configured layer (used to
    /// block dynamic edits of configured abilities).
    pub fn is_configured(&self, id: &str) -> bool {
        self.configured.iter().any(|a| a.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roundtable_types::ability::{AbilityKind, DIALOGUE_ABILITY_ID};
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Minimal in-memory stored layer for registry tests.
    struct MemStore {
        rows: Mutex<HashMap<String, Ability>>,
    }

    impl MemStore {
        fn new(abilities: Vec<Ability>) -> Self {
            Self {
                rows: Mutex::new(abilities.into_iter().map(|a| (a.id.clone(), a)).collect()),
            }
        }
    }

    impl StoredAbilityRepository for MemStore {
        async fn create(&self, ability: &Ability) -> Result<Ability, RepositoryError> {
            self.rows
                .lock()
                .unwrap()
                .insert(ability.id.clone(), ability.clone());
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
            self.create(ability).await
        }

        async fn delete(&self, id: &str) -> Result<(), RepositoryError> {
            self.rows.lock().unwrap().remove(id);
            Ok(())
        }
    }

    fn command_ability(id: &str, name: &str) -> Ability {
        Ability {
            id: id.to_string(),
            name: name.to_string(),
            description: String::new(),
            kind: AbilityKind::Command {
                template: vec!["echo".to_string(), "{message}".to_string()],
            },
        }
    }

    #[tokio::test]
    async fn test_stored_overrides_configured() {
        let registry = AbilityRegistry::new(
            vec![command_ability("echo", "Configured echo")],
            MemStore::new(vec![command_ability("echo", "Stored echo")]),
        );
        let resolved = registry.resolve("echo").await.unwrap().unwrap();
        assert_eq!(resolved.source, AbilitySource::Stored);
        assert_eq!(resolved.ability.name, "Stored echo");
    }

    #[tokio::test]
    async fn test_configured_overrides_builtin() {
        let registry = AbilityRegistry::new(
            vec![command_ability(DIALOGUE_ABILITY_ID, "Shadowed dialogue")],
            MemStore::new(vec![]),
        );
        let resolved = registry.resolve(DIALOGUE_ABILITY_ID).await.unwrap().unwrap();
        assert_eq!(resolved.source, AbilitySource::Configured);
    }

    #[tokio::test]
    async fn test_builtin_dialogue_always_present() {
        let registry = AbilityRegistry::new(vec![], MemStore::new(vec![]));
        let resolved = registry.resolve(DIALOGUE_ABILITY_ID).await.unwrap().unwrap();
        assert_eq!(resolved.source, AbilitySource::Builtin);
    }

    #[tokio::test]
    async fn test_unknown_id_resolves_to_none() {
        let registry = AbilityRegistry::new(vec![], MemStore::new(vec![]));
        assert!(registry.resolve("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_is_one_entry_per_id() {
        let registry = AbilityRegistry::new(
            vec![command_ability("echo", "Configured echo")],
            MemStore::new(vec![
                command_ability("echo", "Stored echo"),
                command_ability("count", "Count"),
            ]),
        );
        let all = registry.list().await.unwrap();
        let ids: Vec<&str> = all.iter().map(|r| r.ability.id.as_str()).collect();
        assert_eq!(ids, vec!["count", DIALOGUE_ABILITY_ID, "echo"]);

        let echo = all.iter().find(|r| r.ability.id == "echo").unwrap();
        assert_eq!(echo.source, AbilitySource::Stored);
        assert_eq!(echo.ability.name, "Stored echo");
    }

    #[tokio::test]
    async fn test_write_visible_on_next_resolve() {
        let store = MemStore::new(vec![]);
        store.create(&command_ability("late", "Late")).await.unwrap();
        let registry = AbilityRegistry::new(vec![], store);
        assert!(registry.resolve("late").await.unwrap().is_some());
    }
}
