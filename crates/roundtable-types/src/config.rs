//! Global configuration types for Roundtable.
//!
//! `GlobalConfig` represents the top-level `config.toml` that controls
//! the HTTP server, the model backend, and the configured ability layer.

use serde::{Deserialize, Serialize};

use crate::ability::{Ability, AbilityKind};

/// Top-level configuration for the Roundtable service.
///
/// Loaded from `~/.roundtable/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub model: ModelConfig,

    /// Abilities defined in configuration. They override built-ins with
    /// the same id and are overridden by stored abilities in turn.
    #[serde(default)]
    pub abilities: Vec<ConfiguredAbility>,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            model: ModelConfig::default(),
            abilities: Vec::new(),
        }
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8420
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Model backend settings for an OpenAI-compatible chat endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Base URL of the chat-completions API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model used when a role declares no preference.
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Environment variable holding the API key. The key itself never
    /// appears in the config file.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Per-call timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_api_key_env() -> String {
    "ROUNDTABLE_API_KEY".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            default_model: default_model(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// One ability defined in `config.toml`.
///
/// Carries at most one of `command` and `prompt_template`; with neither
/// set the entry is ignored at load time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfiguredAbility {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Command token list. `{name}` placeholders are substituted from
    /// parameters at execution time.
    #[serde(default)]
    pub command: Option<Vec<String>>,
    /// Prompt template with a `{message}` placeholder.
    #[serde(default)]
    pub prompt_template: Option<String>,
}

impl ConfiguredAbility {
    /// Convert to a domain [`Ability`], or `None` when no template is set.
    pub fn into_ability(self) -> Option<Ability> {
        let kind = match (self.command, self.prompt_template) {
            (Some(template), _) => AbilityKind::Command { template },
            (None, Some(template)) => AbilityKind::Prompt { template },
            (None, None) => return None,
        };
        Some(Ability {
            id: self.id,
            name: self.name,
            description: self.description,
            kind,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_config_default_values() {
        let config = GlobalConfig::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8420);
        assert_eq!(config.model.timeout_secs, 60);
        assert!(config.abilities.is_empty());
    }

    #[test]
    fn test_global_config_deserialize_with_defaults() {
        let toml_str = "";
        let config: GlobalConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.port, 8420);
        assert_eq!(config.model.api_key_env, "ROUNDTABLE_API_KEY");
    }

    #[test]
    fn test_global_config_deserialize_with_values() {
        let toml_str = r#"
[server]
port = 9000

[model]
base_url = "http://localhost:11434/v1"
default_model = "llama3"

[[abilities]]
id = "count_lines"
name = "Count lines"
command = ["wc", "-l", "{file}"]

[[abilities]]
id = "summarize"
name = "Summarize"
prompt_template = "Summarize the following: {message}"
"#;
        let config: GlobalConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.model.default_model, "llama3");
        assert_eq!(config.abilities.len(), 2);
    }

    #[test]
    fn test_configured_ability_command_wins_over_prompt() {
        let entry = ConfiguredAbility {
            id: "x".to_string(),
            name: "X".to_string(),
            description: String::new(),
            command: Some(vec!["echo".to_string()]),
            prompt_template: Some("ignored {message}".to_string()),
        };
        let ability = entry.into_ability().unwrap();
        assert!(matches!(ability.kind, AbilityKind::Command { .. }));
    }

    #[test]
    fn test_configured_ability_without_template_is_skipped() {
        let entry = ConfiguredAbility {
            id: "x".to_string(),
            name: "X".to_string(),
            description: String::new(),
            command: None,
            prompt_template: None,
        };
        assert!(entry.into_ability().is_none());
    }
}
