//! Per-role reply generation.
//!
//! Drives one role's end-to-end reply: optional ability pre-execution,
//! context assembly, then the model call. This path never raises past
//! its own boundary; every failure resolves to a reply string.

use std::collections::HashMap;
use std::sync::Arc;

use roundtable_types::ability::AbilityOutcome;
use roundtable_types::message::{AuthorKind, Message};
use roundtable_types::model::{ChatTurn, ModelRequest};
use roundtable_types::role::Role;

use crate::ability::{AbilityExecutor, AbilityRegistry};
use crate::intent::{DetectedIntent, IntentStrategy, count_folders_reply};
use crate::model::BoxModelAdapter;
use crate::repository::StoredAbilityRepository;
use crate::room::context::RoleContextBuilder;

/// The fixed failure message for a role whose generation failed.
pub fn failure_reply(role_name: &str) -> String {
    format!(
        "[{role_name}] Unable to generate a reply. Please check that the \
         model backend is reachable and credentials are configured."
    )
}

/// Read-only snapshot handed to one generation, taken at dispatch time.
#[derive(Debug, Clone)]
pub struct ReplyInput {
    pub role: Role,
    /// Content of the role's highest prompt version, if any.
    pub latest_prompt: Option<String>,
    /// The other roles addressed in the same triggering message.
    pub peers: Vec<String>,
    /// Room history including the triggering message, oldest first.
    pub history: Vec<Message>,
    /// Text of the triggering message.
    pub trigger_text: String,
}

/// Generates one role's reply in isolation.
pub struct ReplyGenerator<S> {
    registry: Arc<AbilityRegistry<S>>,
    executor: Arc<AbilityExecutor>,
    adapter: Arc<BoxModelAdapter>,
    intent: Arc<dyn IntentStrategy>,
    default_model: String,
}

impl<S: StoredAbilityRepository> ReplyGenerator<S> {
    pub fn new(
        registry: Arc<AbilityRegistry<S>>,
        executor: Arc<AbilityExecutor>,
        adapter: Arc<BoxModelAdapter>,
        intent: Arc<dyn IntentStrategy>,
        default_model: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            executor,
            adapter,
            intent,
            default_model: default_model.into(),
        }
    }

    /// Produce the reply text and the model identifier used.
    ///
    /// Never errors: adapter failures, empty responses, and ability
    /// execution problems all resolve to reply text.
    pub async fn generate(&self, input: &ReplyInput) -> (String, Option<String>) {
        let model = input
            .role
            .preferred_model
            .clone()
            .unwrap_or_else(|| self.default_model.clone());

        let evidence = self.gather_evidence(input).await;
        let system_prompt = self.build_context(input).await;

        let mut turns = vec![ChatTurn::system(system_prompt)];
        for message in &input.history {
            match message.author {
                AuthorKind::Human => turns.push(ChatTurn::user(message.content.clone())),
                AuthorKind::Generated => {
                    turns.push(ChatTurn::assistant(message.content.clone()));
                }
            }
        }
        if let Some(evidence) = evidence {
            turns.push(ChatTurn::user(format!(
                "Supporting evidence from ability execution:\n{evidence}"
            )));
        }

        let request = ModelRequest {
            model: model.clone(),
            turns,
        };
        match self.adapter.call(&request).await {
            Ok(text) => {
                let trimmed = text.trim().to_string();
                if trimmed.is_empty() {
                    tracing::warn!(role = %input.role.name, "model returned empty reply");
                    (failure_reply(&input.role.name), None)
                } else {
                    (trimmed, Some(model))
                }
            }
            Err(err) => {
                tracing::warn!(role = %input.role.name, error = %err, "model call failed");
                (failure_reply(&input.role.name), None)
            }
        }
    }

    /// Run intent detection and, when it matches, execute the ability
    /// or built-in computation. Failures degrade to a short note.
    async fn gather_evidence(&self, input: &ReplyInput) -> Option<String> {
        let intent = self
            .intent
            .detect(&input.trigger_text, &input.role.abilities)?;

        match intent {
            DetectedIntent::InvokeAbility {
                ability_id,
                argument,
            } => {
                let resolved = match self.registry.resolve(&ability_id).await {
                    Ok(Some(resolved)) => resolved,
                    Ok(None) => return Some(format!("Ability '{ability_id}' is not defined.")),
                    Err(err) => {
                        tracing::warn!(ability = %ability_id, error = %err, "ability lookup failed");
                        return Some(format!("Ability '{ability_id}' could not be resolved."));
                    }
                };
                let mut params = HashMap::new();
                params.insert("message".to_string(), argument);
                match self.executor.execute(&resolved.ability, &params).await {
                    Ok(AbilityOutcome::Command {
                        stdout,
                        stderr,
                        exit_code,
                    }) => {
                        let mut text = format!(
                            "Ability '{ability_id}' exited with status {}.",
                            exit_code.map_or("unknown".to_string(), |c| c.to_string())
                        );
                        if !stdout.trim().is_empty() {
                            text.push_str(&format!("\nOutput:\n{}", stdout.trim()));
                        }
                        if !stderr.trim().is_empty() {
                            text.push_str(&format!("\nErrors:\n{}", stderr.trim()));
                        }
                        Some(text)
                    }
                    Ok(AbilityOutcome::Prompt { text }) => Some(text),
                    Ok(AbilityOutcome::Dialogue) => None,
                    Err(err) => Some(format!("Ability '{ability_id}' failed: {err}")),
                }
            }
            DetectedIntent::CountFolders { path } => Some(count_folders_reply(&path)),
        }
    }

    async fn build_context(&self, input: &ReplyInput) -> String {
        let mut abilities = Vec::with_capacity(input.role.abilities.len());
        for id in &input.role.abilities {
            match self.registry.resolve(id).await {
                Ok(Some(resolved)) => abilities.push(resolved.ability),
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!(ability = %id, error = %err, "skipping unresolvable ability");
                }
            }
        }
        RoleContextBuilder::build(
            &input.role,
            &input.peers,
            input.latest_prompt.as_deref(),
            &abilities,
        )
    }
}
