use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// An AI persona that can be addressed in a room with `@name`.
///
/// The name is the identity key: it is what users type after `@` and
/// what replies are attributed to. Prompt content lives in an
/// append-only version log (see [`PromptVersion`]); only the highest
/// version is exposed to reply generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    /// Unique name, also the address token (may contain spaces).
    pub name: String,
    /// Short description shown in listings and the role's identity line.
    pub description: String,
    /// Whether the role is enabled. Status does not affect
    /// addressability -- a disabled role still receives replies.
    pub status: RoleStatus,
    /// Ordered bound ability identifiers. The built-in dialogue
    /// ability is implicitly present and never listed here.
    pub abilities: Vec<String>,
    /// Preferred model identifier for this role's replies, if any.
    pub preferred_model: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Role lifecycle states.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleStatus {
    Enabled,
    Disabled,
}

impl fmt::Display for RoleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoleStatus::Enabled => write!(f, "enabled"),
            RoleStatus::Disabled => write!(f, "disabled"),
        }
    }
}

impl FromStr for RoleStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "enabled" => Ok(RoleStatus::Enabled),
            "disabled" => Ok(RoleStatus::Disabled),
            other => Err(format!("invalid role status: '{other}'")),
        }
    }
}

impl Default for RoleStatus {
    fn default() -> Self {
        RoleStatus::Enabled
    }
}

/// One immutable entry in a role's prompt history.
///
/// Versions start at 1 and only ever grow; editing a role's prompt
/// appends the next version rather than mutating an old one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptVersion {
    pub role_name: String,
    pub version: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Validate a role name: non-empty words of ASCII letters, digits,
/// underscore, or hyphen, separated by single spaces.
///
/// This is the same grammar the mention parser recognizes, so any
/// valid role name is addressable verbatim.
pub fn validate_role_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("role name must not be empty".to_string());
    }
    let mut prev_space = true;
    for c in name.chars() {
        match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '_' | '-' => prev_space = false,
            ' ' => {
                if prev_space {
                    return Err(format!(
                        "role name '{name}' must use single spaces between words"
                    ));
                }
                prev_space = true;
            }
            other => {
                return Err(format!(
                    "role name '{name}' contains unsupported character '{other}'"
                ));
            }
        }
    }
    if prev_space {
        return Err(format!("role name '{name}' must not end with a space"));
    }
    Ok(())
}
