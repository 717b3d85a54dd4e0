//! Room orchestration.
//!
//! Fans out one reply generation per validly addressed role, waits for
//! all of them, and persists replies in address order rather than
//! completion order. Attribution reconstruction depends on that order,
//! so it is the load-bearing invariant here. A panic or failure in one
//! generation becomes that role's fixed failure message and never
//! aborts siblings or the persist step.

use std::sync::Arc;

use tokio::task::JoinSet;

use roundtable_types::error::RepositoryError;
use roundtable_types::message::Message;
use roundtable_types::room::Room;

use crate::mention::{parse_mentions, resolve_mentions};
use crate::repository::{MessageRepository, RoleRepository, StoredAbilityRepository};
use crate::room::reply::{ReplyGenerator, ReplyInput, failure_reply};

/// Stored when a message in a task room addresses no valid role.
pub const CONTEXT_ONLY_ACK: &str =
    "No role was addressed, so this message was recorded as shared context.";

/// Coordinates reply generation for one room message.
pub struct RoomOrchestrator<R, M, S> {
    roles: Arc<R>,
    messages: Arc<M>,
    generator: Arc<ReplyGenerator<S>>,
}

impl<R, M, S> Clone for RoomOrchestrator<R, M, S> {
    fn clone(&self) -> Self {
        Self {
            roles: Arc::clone(&self.roles),
            messages: Arc::clone(&self.messages),
            generator: Arc::clone(&self.generator),
        }
    }
}

impl<R, M, S> RoomOrchestrator<R, M, S>
where
    R: RoleRepository + 'static,
    M: MessageRepository + 'static,
    S: StoredAbilityRepository + 'static,
{
    pub fn new(roles: Arc<R>, messages: Arc<M>, generator: Arc<ReplyGenerator<S>>) -> Self {
        Self {
            roles,
            messages,
            generator,
        }
    }

    /// Generate and persist replies for an already-stored human message.
    ///
    /// Intended to run as a detached unit of work after the submitting
    /// request has been acknowledged.
    pub async fn handle_message(
        &self,
        room: &Room,
        message: &Message,
    ) -> Result<(), RepositoryError> {
        let raw_tokens = parse_mentions(&message.content);
        let all_roles = self.roles.list().await?;
        let known_names: Vec<String> = all_roles.iter().map(|r| r.name.clone()).collect();
        let addressed = resolve_mentions(&raw_tokens, &known_names);

        if addressed.is_empty() {
            tracing::debug!(room_id = %room.id, "no valid mentions, storing context ack");
            let ack = Message::generated(room.id, CONTEXT_ONLY_ACK, None);
            self.messages.append(&ack).await?;
            return Ok(());
        }

        tracing::info!(
            room_id = %room.id,
            roles = addressed.len(),
            "dispatching reply generation"
        );

        // Read-only snapshot at dispatch time: every generation sees the
        // same history and role definitions.
        let history = self.messages.list_for_room(&room.id).await?;

        let mut set: JoinSet<(usize, (String, Option<String>))> = JoinSet::new();
        for (idx, name) in addressed.iter().enumerate() {
            // Resolved against the same list, so the lookup cannot miss.
            let Some(role) = all_roles.iter().find(|r| &r.name == name).cloned() else {
                continue;
            };
            let latest_prompt = self
                .roles
                .latest_prompt_version(name)
                .await?
                .map(|v| v.content);
            let peers: Vec<String> = addressed
                .iter()
                .filter(|n| *n != name)
                .cloned()
                .collect();
            let input = ReplyInput {
                role,
                latest_prompt,
                peers,
                history: history.clone(),
                trigger_text: message.content.clone(),
            };
            let generator = Arc::clone(&self.generator);
            set.spawn(async move { (idx, generator.generate(&input).await) });
        }

        // Collect by original index; completion order is irrelevant.
        let mut replies: Vec<Option<(String, Option<String>)>> = vec![None; addressed.len()];
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((idx, reply)) => replies[idx] = Some(reply),
                Err(err) => {
                    tracing::error!(error = %err, "reply generation task panicked");
                }
            }
        }

        // Persist in address order. A slot left empty by a panic gets
        // the same fixed failure message a failed adapter call would.
        for (idx, slot) in replies.into_iter().enumerate() {
            let (text, model) =
                slot.unwrap_or_else(|| (failure_reply(&addressed[idx]), None));
            let reply = Message::generated(room.id, text, model);
            self.messages.append(&reply).await?;
        }

        tracing::info!(room_id = %room.id, "replies persisted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ability::{AbilityExecutor, AbilityRegistry};
    use crate::intent::HeuristicIntentStrategy;
    use crate::model::{BoxModelAdapter, ModelAdapter};
    use chrono::Utc;
    use roundtable_types::ability::{Ability, AbilityKind};
    use roundtable_types::message::{AuthorKind, MessageId};
    use roundtable_types::model::{ModelError, ModelRequest};
    use roundtable_types::role::{PromptVersion, Role, RoleStatus};
    use roundtable_types::room::RoomId;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    struct MemRoles {
        rows: Vec<Role>,
    }

    impl RoleRepository for MemRoles {
        async fn create(&self, role: &Role) -> Result<Role, RepositoryError> {
            Ok(role.clone())
        }

        async fn get_by_name(&self, name: &str) -> Result<Option<Role>, RepositoryError> {
            Ok(self.rows.iter().find(|r| r.name == name).cloned())
        }

        async fn list(&self) -> Result<Vec<Role>, RepositoryError> {
            Ok(self.rows.clone())
        }

        async fn update(&self, role: &Role) -> Result<Role, RepositoryError> {
            Ok(role.clone())
        }

        async fn delete(&self, _name: &str) -> Result<(), RepositoryError> {
            Ok(())
        }

        async fn append_prompt_version(
            &self,
            version: &PromptVersion,
        ) -> Result<PromptVersion, RepositoryError> {
            Ok(version.clone())
        }

        async fn latest_prompt_version(
            &self,
            _role_name: &str,
        ) -> Result<Option<PromptVersion>, RepositoryError> {
            Ok(None)
        }

        async fn list_prompt_versions(
            &self,
            _role_name: &str,
        ) -> Result<Vec<PromptVersion>, RepositoryError> {
            Ok(vec![])
        }
    }

    #[derive(Default)]
    struct MemMessages {
        rows: Mutex<Vec<Message>>,
    }

    impl MessageRepository for MemMessages {
        async fn append(&self, message: &Message) -> Result<Message, RepositoryError> {
            self.rows.lock().unwrap().push(message.clone());
            Ok(message.clone())
        }

        async fn get_by_id(&self, id: &MessageId) -> Result<Option<Message>, RepositoryError> {
            Ok(self.rows.lock().unwrap().iter().find(|m| &m.id == id).cloned())
        }

        async fn list_for_room(&self, room_id: &RoomId) -> Result<Vec<Message>, RepositoryError> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|m| &m.room_id == room_id)
                .cloned()
                .collect())
        }

        async fn list_recent(
            &self,
            room_id: &RoomId,
            limit: i64,
        ) -> Result<Vec<Message>, RepositoryError> {
            let all = self.list_for_room(room_id).await?;
            let skip = all.len().saturating_sub(limit as usize);
            Ok(all.into_iter().skip(skip).collect())
        }

        async fn clear_room(&self, room_id: &RoomId) -> Result<u64, RepositoryError> {
            let mut rows = self.rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|m| &m.room_id != room_id);
            Ok((before - rows.len()) as u64)
        }
    }

    struct EmptyStore;

    impl StoredAbilityRepository for EmptyStore {
        async fn create(&self, ability: &Ability) -> Result<Ability, RepositoryError> {
            Ok(ability.clone())
        }

        async fn get_by_id(&self, _id: &str) -> Result<Option<Ability>, RepositoryError> {
            Ok(None)
        }

        async fn list(&self) -> Result<Vec<Ability>, RepositoryError> {
            Ok(vec![])
        }

        async fn update(&self, ability: &Ability) -> Result<Ability, RepositoryError> {
            Ok(ability.clone())
        }

        async fn delete(&self, _id: &str) -> Result<(), RepositoryError> {
            Ok(())
        }
    }

    /// Adapter keyed on the role name in the system prompt: each role
    /// gets its own delay, reply text, and failure flag.
    struct ScriptedAdapter {
        scripts: HashMap<String, (Duration, Result<String, ()>)>,
    }

    impl ModelAdapter for ScriptedAdapter {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn call(&self, request: &ModelRequest) -> Result<String, ModelError> {
            let system = request
                .turns
                .first()
                .map(|t| t.content.clone())
                .unwrap_or_default();
            for (role, (delay, outcome)) in &self.scripts {
                if system.contains(&format!("\"{role}\"")) {
                    tokio::time::sleep(*delay).await;
                    return match outcome {
                        Ok(text) => Ok(text.clone()),
                        Err(()) => Err(ModelError::Transport("scripted failure".to_string())),
                    };
                }
            }
            // Unscripted roles reflect the last turn back, which makes
            // ability evidence visible in the reply.
            Ok(request
                .turns
                .last()
                .map(|t| t.content.clone())
                .unwrap_or_default())
        }
    }

    fn role(name: &str, abilities: &[&str]) -> Role {
        Role {
            name: name.to_string(),
            description: String::new(),
            status: RoleStatus::Enabled,
            abilities: abilities.iter().map(|s| s.to_string()).collect(),
            preferred_model: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn room() -> Room {
        Room {
            id: RoomId::new(),
            title: "task".to_string(),
            task_room: true,
            assigned_roles: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn orchestrator(
        roles: Vec<Role>,
        configured: Vec<Ability>,
        scripts: HashMap<String, (Duration, Result<String, ()>)>,
    ) -> (
        RoomOrchestrator<MemRoles, MemMessages, EmptyStore>,
        Arc<MemMessages>,
    ) {
        let adapter = Arc::new(BoxModelAdapter::new(ScriptedAdapter { scripts }));
        let registry = Arc::new(AbilityRegistry::new(configured, EmptyStore));
        let executor = Arc::new(AbilityExecutor::new(
            Arc::clone(&adapter),
            "test-model",
            Duration::from_secs(5),
        ));
        let generator = Arc::new(ReplyGenerator::new(
            registry,
            executor,
            adapter,
            Arc::new(HeuristicIntentStrategy),
            "test-model",
        ));
        let messages = Arc::new(MemMessages::default());
        let orchestrator =
            RoomOrchestrator::new(Arc::new(MemRoles { rows: roles }), Arc::clone(&messages), generator);
        (orchestrator, messages)
    }

    async fn submit(
        orchestrator: &RoomOrchestrator<MemRoles, MemMessages, EmptyStore>,
        messages: &MemMessages,
        room: &Room,
        text: &str,
    ) {
        let human = Message::human(room.id, text);
        messages.append(&human).await.unwrap();
        orchestrator.handle_message(room, &human).await.unwrap();
    }

    #[tokio::test]
    async fn test_replies_persist_in_address_order_despite_delays() {
        // A is slow, B is fast: B finishes first but A's reply must
        // still be persisted first.
        let scripts = HashMap::from([
            (
                "A".to_string(),
                (Duration::from_millis(120), Ok("from A".to_string())),
            ),
            (
                "B".to_string(),
                (Duration::from_millis(5), Ok("from B".to_string())),
            ),
        ]);
        let (orchestrator, messages) =
            orchestrator(vec![role("A", &[]), role("B", &[])], vec![], scripts);
        let room = room();

        submit(&orchestrator, &messages, &room, "@A @B hello").await;

        let log = messages.list_for_room(&room.id).await.unwrap();
        assert_eq!(log.len(), 3);
        assert_eq!(log[1].content, "from A");
        assert_eq!(log[2].content, "from B");
    }

    #[tokio::test]
    async fn test_one_failure_does_not_block_sibling() {
        let scripts = HashMap::from([
            ("A".to_string(), (Duration::ZERO, Err(()))),
            (
                "B".to_string(),
                (Duration::ZERO, Ok("from B".to_string())),
            ),
        ]);
        let (orchestrator, messages) =
            orchestrator(vec![role("A", &[]), role("B", &[])], vec![], scripts);
        let room = room();

        submit(&orchestrator, &messages, &room, "@A @B hello").await;

        let log = messages.list_for_room(&room.id).await.unwrap();
        assert_eq!(log.len(), 3);
        assert_eq!(log[1].content, failure_reply("A"));
        assert!(log[1].model.is_none());
        assert_eq!(log[2].content, "from B");
    }

    #[tokio::test]
    async fn test_no_valid_mentions_stores_context_ack() {
        let (orchestrator, messages) = orchestrator(vec![role("A", &[])], vec![], HashMap::new());
        let room = room();

        submit(&orchestrator, &messages, &room, "@nobody hi").await;

        let log = messages.list_for_room(&room.id).await.unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log[1].content, CONTEXT_ONLY_ACK);
        assert_eq!(log[1].author, AuthorKind::Generated);
    }

    #[tokio::test]
    async fn test_ability_bound_role_reply_contains_result() {
        let echo = Ability {
            id: "echo".to_string(),
            name: "Echo".to_string(),
            description: String::new(),
            kind: AbilityKind::Command {
                template: vec!["echo".to_string(), "echoed".to_string()],
            },
        };
        // A is scripted to a plain reply; B is unscripted, so the
        // adapter reflects B's evidence turn back.
        let scripts = HashMap::from([(
            "A".to_string(),
            (Duration::ZERO, Ok("plain reply from A".to_string())),
        )]);
        let (orchestrator, messages) = orchestrator(
            vec![role("A", &[]), role("B", &["echo"])],
            vec![echo],
            scripts,
        );
        let room = room();

        submit(&orchestrator, &messages, &room, "@A @B run echo").await;

        let log = messages.list_for_room(&room.id).await.unwrap();
        assert_eq!(log.len(), 3);
        assert_eq!(log[1].content, "plain reply from A");
        assert!(log[2].content.contains("echoed"), "got: {}", log[2].content);
    }

    #[tokio::test]
    async fn test_duplicate_mentions_yield_one_reply() {
        let scripts = HashMap::from([(
            "A".to_string(),
            (Duration::ZERO, Ok("once".to_string())),
        )]);
        let (orchestrator, messages) = orchestrator(vec![role("A", &[])], vec![], scripts);
        let room = room();

        submit(&orchestrator, &messages, &room, "@A @A hello").await;

        let log = messages.list_for_room(&room.id).await.unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log[1].content, "once");
    }
}
