use serde::{Deserialize, Serialize};

use std::fmt;

/// Identifier of the built-in dialogue ability.
///
/// Every role implicitly carries it; it has no template and can never
/// be created, edited, or deleted through the dynamic layer.
pub const DIALOGUE_ABILITY_ID: &str = "dialogue";

/// A callable capability a role may invoke.
///
/// Exactly one execution shape applies, encoded in [`AbilityKind`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ability {
    /// Stable identifier, the key abilities are bound and merged by.
    pub id: String,
    /// Display name.
    pub name: String,
    pub description: String,
    pub kind: AbilityKind,
}

impl Ability {
    /// The fixed built-in dialogue ability.
    pub fn dialogue() -> Self {
        Self {
            id: DIALOGUE_ABILITY_ID.to_string(),
            name: "Dialogue".to_string(),
            description: "Understand the user's message and reply in plain conversation."
                .to_string(),
            kind: AbilityKind::Dialogue,
        }
    }
}

/// How an ability executes. An ability carries exactly one of a
/// command template or a prompt template; the built-in dialogue
/// ability carries neither.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AbilityKind {
    /// Restricted command: a token list where `{name}` placeholders are
    /// substituted from parameters, then run as a direct argument
    /// vector (never through a shell).
    Command { template: Vec<String> },
    /// Prompt template with a `{message}` placeholder, sent through the
    /// model adapter as a single-turn call.
    Prompt { template: String },
    /// No template; execution is a no-op signal meaning "handle this as
    /// plain dialogue".
    Dialogue,
}

/// Which layer an ability definition came from. Later layers override
/// earlier ones when identifiers collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AbilitySource {
    Builtin,
    Configured,
    Stored,
}

impl fmt::Display for AbilitySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbilitySource::Builtin => write!(f, "builtin"),
            AbilitySource::Configured => write!(f, "configured"),
            AbilitySource::Stored => write!(f, "stored"),
        }
    }
}

/// An ability together with the layer it resolved from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedAbility {
    pub ability: Ability,
    pub source: AbilitySource,
}

/// Outcome of executing an ability.
///
/// Command failures below the spawn boundary (non-zero exit) are data,
/// not errors: the exit code and both output streams are surfaced for
/// the caller to interpret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbilityOutcome {
    Command {
        stdout: String,
        stderr: String,
        /// None when the process was terminated by a signal.
        exit_code: Option<i32>,
    },
    Prompt {
        text: String,
    },
    /// The dialogue ability was "executed": nothing ran, the plain
    /// dialogue path should handle the message.
    Dialogue,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialogue_ability_shape() {
        let ability = Ability::dialogue();
        assert_eq!(ability.id, DIALOGUE_ABILITY_ID);
        assert_eq!(ability.kind, AbilityKind::Dialogue);
    }

    #[test]
    fn test_source_override_order() {
        assert!(AbilitySource::Builtin < AbilitySource::Configured);
        assert!(AbilitySource::Configured < AbilitySource::Stored);
    }

    #[test]
    fn test_ability_kind_serde() {
        let kind = AbilityKind::Command {
            template: vec!["echo".to_string(), "{message}".to_string()],
        };
        let json = serde_json::to_string(&kind).unwrap();
        let parsed: AbilityKind = serde_json::from_str(&json).unwrap();
        assert_eq!(kind, parsed);
    }
}
