//! Room CLI commands: create, list, show, rename, clear, delete.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use roundtable_core::mention::{parse_mentions, resolve_mentions};
use roundtable_core::repository::{MessageRepository, RoleRepository};
use roundtable_core::room::attribute_generated;
use roundtable_core::service::room::CreateRoomRequest;
use roundtable_types::message::AuthorKind;
use roundtable_types::room::RoomId;

use crate::state::AppState;

fn parse_room_id(raw: &str) -> Result<RoomId> {
    raw.parse::<RoomId>()
        .map_err(|_| anyhow::anyhow!("invalid room id '{raw}'"))
}

pub async fn create_room(
    state: &AppState,
    title: String,
    plain: bool,
    roles: Vec<String>,
    json: bool,
) -> Result<()> {
    let room = state
        .room_service
        .create(CreateRoomRequest {
            title,
            task_room: !plain,
            assigned_roles: roles,
        })
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&room)?);
        return Ok(());
    }

    println!();
    println!("  {} Room created.", style("✓").green().bold());
    println!("  {}  {}", style("Title:").bold(), style(&room.title).cyan());
    println!("  {}     {}", style("Id:").bold(), style(room.id).dim());
    if room.task_room {
        println!(
            "  Messages that address a role with {} will get replies.",
            style("@name").yellow()
        );
    }
    println!();

    Ok(())
}

/// List rooms, newest first.
pub async fn list_rooms(state: &AppState, json: bool) -> Result<()> {
    let rooms = state.room_service.list().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&rooms)?);
        return Ok(());
    }

    if rooms.is_empty() {
        println!();
        println!(
            "  {} No rooms yet. Create one with: {}",
            style("i").blue().bold(),
            style("rtab room create <title>").yellow()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Title").fg(Color::White),
        Cell::new("Kind").fg(Color::White),
        Cell::new("Roles").fg(Color::White),
        Cell::new("Id").fg(Color::White),
    ]);

    for room in &rooms {
        let kind_cell = if room.task_room {
            Cell::new("task").fg(Color::Green)
        } else {
            Cell::new("plain").fg(Color::DarkGrey)
        };
        table.add_row(vec![
            Cell::new(&room.title).fg(Color::Cyan),
            kind_cell,
            Cell::new(room.assigned_roles.join(", ")),
            Cell::new(room.id.to_string()).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");
    println!();

    Ok(())
}

/// Print a room's message log with attribution annotations.
pub async fn show_room(state: &AppState, id: &str, json: bool) -> Result<()> {
    let room = state.room_service.get(&parse_room_id(id)?).await?;
    let messages = state.messages.list_for_room(&room.id).await?;
    let known_names: Vec<String> = state
        .roles
        .list()
        .await?
        .into_iter()
        .map(|r| r.name)
        .collect();
    let origins = attribute_generated(&messages, &known_names);

    if json {
        let entries: Vec<serde_json::Value> = messages
            .iter()
            .zip(&origins)
            .map(|(message, origin)| {
                let mentioned = match message.author {
                    AuthorKind::Human => {
                        resolve_mentions(&parse_mentions(&message.content), &known_names)
                    }
                    AuthorKind::Generated => Vec::new(),
                };
                serde_json::json!({
                    "message": message,
                    "mentioned_roles": mentioned,
                    "originating_role": origin,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    println!();
    println!("  {}", style(&room.title).cyan().bold());
    println!();

    if messages.is_empty() {
        println!("  {}", style("(no messages)").dim());
        println!();
        return Ok(());
    }

    for (message, origin) in messages.iter().zip(&origins) {
        let who = match (message.author, origin) {
            (AuthorKind::Human, _) => style("you".to_string()).bold(),
            (AuthorKind::Generated, Some(role)) => style(format!("@{role}")).cyan(),
            (AuthorKind::Generated, None) => style("system".to_string()).dim(),
        };
        println!(
            "  {} {}",
            who,
            style(message.created_at.format("%H:%M:%S")).dim()
        );
        for line in message.content.lines() {
            println!("    {line}");
        }
        println!();
    }

    Ok(())
}

pub async fn rename_room(state: &AppState, id: &str, title: &str, json: bool) -> Result<()> {
    let room = state.room_service.rename(&parse_room_id(id)?, title).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&room)?);
    } else {
        println!(
            "  {} Room renamed to '{}'.",
            style("✓").green().bold(),
            style(&room.title).cyan()
        );
    }

    Ok(())
}

pub async fn clear_room(state: &AppState, id: &str, json: bool) -> Result<()> {
    let removed = state.room_service.clear_messages(&parse_room_id(id)?).await?;

    if json {
        println!("{}", serde_json::json!({"cleared": removed}));
    } else {
        println!(
            "  {} Removed {} message{}.",
            style("✓").green().bold(),
            style(removed).bold(),
            if removed == 1 { "" } else { "s" }
        );
    }

    Ok(())
}

pub async fn delete_room(state: &AppState, id: &str, json: bool) -> Result<()> {
    state.room_service.delete(&parse_room_id(id)?).await?;

    if json {
        println!("{}", serde_json::json!({"deleted": true, "id": id}));
    } else {
        println!("  {} Room deleted.", style("✓").red().bold());
    }

    Ok(())
}
