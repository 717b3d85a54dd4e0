use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

use crate::room::RoomId;

/// Unique identifier for a message, wrapping a UUID v7 (time-sortable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub Uuid);

impl MessageId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MessageId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthorKind {
    /// Typed by a person.
    Human,
    /// Produced by a role's reply generation (or a system acknowledgment).
    Generated,
}

impl fmt::Display for AuthorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthorKind::Human => write!(f, "human"),
            AuthorKind::Generated => write!(f, "generated"),
        }
    }
}

impl FromStr for AuthorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" => Ok(AuthorKind::Human),
            "generated" => Ok(AuthorKind::Generated),
            other => Err(format!("invalid author kind: '{other}'")),
        }
    }
}

/// One entry in a room's flat, time-ordered log.
///
/// Messages are immutable once created; rooms support bulk clear and
/// cascade delete only. Insertion order is authoritative -- there is
/// no explicit reply-to link, attribution is reconstructed from order
/// and address tokens after the fact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub room_id: RoomId,
    pub author: AuthorKind,
    pub content: String,
    /// Model identifier that produced a generated message, if known.
    pub model: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Build a human message for a room, timestamped now.
    pub fn human(room_id: RoomId, content: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            room_id,
            author: AuthorKind::Human,
            content: content.into(),
            model: None,
            created_at: Utc::now(),
        }
    }

    /// Build a generated message for a room, timestamped now.
    pub fn generated(
        room_id: RoomId,
        content: impl Into<String>,
        model: Option<String>,
    ) -> Self {
        Self {
            id: MessageId::new(),
            room_id,
            author: AuthorKind::Generated,
            content: content.into(),
            model,
            created_at: Utc::now(),
        }
    }
}
