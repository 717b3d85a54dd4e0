//! Room management service.
//!
//! Rooms are created empty and accumulate messages; deletion cascades
//! to the message log. Assigned role names are validated against
//! existing roles at write time even though assignment is informational.

use chrono::Utc;

use roundtable_types::error::{RepositoryError, RoomError};
use roundtable_types::room::{Room, RoomId};

use crate::repository::{MessageRepository, RoleRepository, RoomRepository};

/// Request payload for creating a room.
#[derive(Debug, Clone)]
pub struct CreateRoomRequest {
    pub title: String,
    pub task_room: bool,
    pub assigned_roles: Vec<String>,
}

/// Service orchestrating the room lifecycle.
pub struct RoomService<Ro, M, R> {
    rooms: Ro,
    messages: M,
    roles: R,
}

impl<Ro, M, R> RoomService<Ro, M, R>
where
    Ro: RoomRepository,
    M: MessageRepository,
    R: RoleRepository,
{
    pub fn new(rooms: Ro, messages: M, roles: R) -> Self {
        Self {
            rooms,
            messages,
            roles,
        }
    }

    pub async fn create(&self, request: CreateRoomRequest) -> Result<Room, RoomError> {
        let title = request.title.trim().to_string();
        if title.is_empty() {
            return Err(RoomError::EmptyTitle);
        }
        self.check_assigned_roles(&request.assigned_roles).await?;

        let now = Utc::now();
        let room = Room {
            id: RoomId::new(),
            title,
            task_room: request.task_room,
            assigned_roles: request.assigned_roles,
            created_at: now,
            updated_at: now,
        };
        self.rooms
            .create(&room)
            .await
            .map_err(|e| RoomError::StorageError(e.to_string()))
    }

    pub async fn get(&self, id: &RoomId) -> Result<Room, RoomError> {
        self.rooms
            .get_by_id(id)
            .await
            .map_err(|e| RoomError::StorageError(e.to_string()))?
            .ok_or(RoomError::NotFound)
    }

    pub async fn list(&self) -> Result<Vec<Room>, RoomError> {
        self.rooms
            .list()
            .await
            .map_err(|e| RoomError::StorageError(e.to_string()))
    }

    /// Rename a room.
    pub async fn rename(&self, id: &RoomId, title: &str) -> Result<Room, RoomError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(RoomError::EmptyTitle);
        }
        let mut room = self.get(id).await?;
        room.title = title.to_string();
        room.updated_at = Utc::now();
        self.rooms
            .update(&room)
            .await
            .map_err(|e| RoomError::StorageError(e.to_string()))
    }

    /// Replace the assigned role list.
    pub async fn assign_roles(&self, id: &RoomId, roles: Vec<String>) -> Result<Room, RoomError> {
        self.check_assigned_roles(&roles).await?;
        let mut room = self.get(id).await?;
        room.assigned_roles = roles;
        room.updated_at = Utc::now();
        self.rooms
            .update(&room)
            .await
            .map_err(|e| RoomError::StorageError(e.to_string()))
    }

    /// Delete all messages in the room. Returns the number removed.
    pub async fn clear_messages(&self, id: &RoomId) -> Result<u64, RoomError> {
        self.get(id).await?;
        self.messages
            .clear_room(id)
            .await
            .map_err(|e| RoomError::StorageError(e.to_string()))
    }

    /// Delete the room; messages go with it.
    pub async fn delete(&self, id: &RoomId) -> Result<(), RoomError> {
        self.get(id).await?;
        self.rooms
            .delete(id)
            .await
            .map_err(|e| RoomError::StorageError(e.to_string()))
    }

    async fn check_assigned_roles(&self, names: &[String]) -> Result<(), RoomError> {
        for name in names {
            let found = self
                .roles
                .get_by_name(name)
                .await
                .map_err(|e| RoomError::StorageError(e.to_string()))?;
            if found.is_none() {
                return Err(RoomError::UnknownAssignedRole(name.clone()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roundtable_types::message::{Message, MessageId};
    use roundtable_types::role::{PromptVersion, Role, RoleStatus};
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemRooms {
        rows: Mutex<HashMap<RoomId, Room>>,
    }

    impl RoomRepository for MemRooms {
        async fn create(&self, room: &Room) -> Result<Room, RepositoryError> {
            self.rows.lock().unwrap().insert(room.id, room.clone());
            Ok(room.clone())
        }

        async fn get_by_id(&self, id: &RoomId) -> Result<Option<Room>, RepositoryError> {
            Ok(self.rows.lock().unwrap().get(id).cloned())
        }

        async fn list(&self) -> Result<Vec<Room>, RepositoryError> {
            Ok(self.rows.lock().unwrap().values().cloned().collect())
        }

        async fn update(&self, room: &Room) -> Result<Room, RepositoryError> {
            self.rows.lock().unwrap().insert(room.id, room.clone());
            Ok(room.clone())
        }

        async fn delete(&self, id: &RoomId) -> Result<(), RepositoryError> {
            self.rows.lock().unwrap().remove(id);
            Ok(())
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

    struct MemRoles {
        names: Vec<String>,
    }

    impl RoleRepository for MemRoles {
        async fn create(&self, role: &Role) -> Result<Role, RepositoryError> {
            Ok(role.clone())
        }

        async fn get_by_name(&self, name: &str) -> Result<Option<Role>, RepositoryError> {
            if !self.names.iter().any(|n| n == name) {
                return Ok(None);
            }
            let now = Utc::now();
            Ok(Some(Role {
                name: name.to_string(),
                description: String::new(),
                status: RoleStatus::Enabled,
                abilities: vec![],
                preferred_model: None,
                created_at: now,
                updated_at: now,
            }))
        }

        async fn list(&self) -> Result<Vec<Role>, RepositoryError> {
            Ok(vec![])
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

    fn service(known_roles: &[&str]) -> RoomService<MemRooms, MemMessages, MemRoles> {
        RoomService::new(
            MemRooms::default(),
            MemMessages::default(),
            MemRoles {
                names: known_roles.iter().map(|s| s.to_string()).collect(),
            },
        )
    }

    fn request(title: &str, assigned: &[&str]) -> CreateRoomRequest {
        CreateRoomRequest {
            title: title.to_string(),
            task_room: true,
            assigned_roles: assigned.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn test_create_and_rename() {
        let service = service(&[]);
        let room = service.create(request("ops", &[])).await.unwrap();
        let renamed = service.rename(&room.id, "ops v2").await.unwrap();
        assert_eq!(renamed.title, "ops v2");
    }

    #[tokio::test]
    async fn test_empty_title_rejected() {
        let service = service(&[]);
        assert!(matches!(
            service.create(request("   ", &[])).await.unwrap_err(),
            RoomError::EmptyTitle
        ));
    }

    #[tokio::test]
    async fn test_unknown_assigned_role_rejected() {
        let service = service(&["A"]);
        let err = service.create(request("ops", &["A", "ghost"])).await.unwrap_err();
        assert!(matches!(err, RoomError::UnknownAssignedRole(name) if name == "ghost"));
    }

    #[tokio::test]
    async fn test_clear_messages_counts_removed() {
        let service = service(&[]);
        let room = service.create(request("ops", &[])).await.unwrap();
        service
            .messages
            .append(&Message::human(room.id, "one"))
            .await
            .unwrap();
        service
            .messages
            .append(&Message::human(room.id, "two"))
            .await
            .unwrap();

        let removed = service.clear_messages(&room.id).await.unwrap();
        assert_eq!(removed, 2);
        assert!(service
            .messages
            .list_for_room(&room.id)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_missing_room_not_found() {
        let service = service(&[]);
        assert!(matches!(
            service.get(&RoomId::new()).await.unwrap_err(),
            RoomError::NotFound
        ));
    }
}
