//! Role lifecycle CLI commands: create, list, show, prompt, history, delete.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use roundtable_core::service::role::{CreateRoleRequest, UpdateRoleRequest};
use roundtable_types::role::RoleStatus;

use crate::state::AppState;

pub async fn create_role(
    state: &AppState,
    name: String,
    description: Option<String>,
    prompt: Option<String>,
    abilities: Vec<String>,
    model: Option<String>,
    json: bool,
) -> Result<()> {
    let role = state
        .role_service
        .create(CreateRoleRequest {
            name,
            description,
            prompt,
            abilities,
            preferred_model: model,
        })
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&role)?);
        return Ok(());
    }

    println!();
    println!("  {} Role created.", style("✓").green().bold());
    println!();
    println!("  {}  {}", style("Name:").bold(), style(&role.name).cyan());
    if !role.description.is_empty() {
        println!("  {}  {}", style("About:").bold(), &role.description);
    }
    if !role.abilities.is_empty() {
        println!(
            "  {}  {}",
            style("Abilities:").bold(),
            role.abilities.join(", ")
        );
    }
    println!();
    println!(
        "  Address it in a task room with {}",
        style(format!("@{}", role.name)).yellow()
    );
    println!();

    Ok(())
}

/// List all roles in a table.
pub async fn list_roles(state: &AppState, json: bool) -> Result<()> {
    let roles = state.role_service.list().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&roles)?);
        return Ok(());
    }

    if roles.is_empty() {
        println!();
        println!(
            "  {} No roles yet. Create one with: {}",
            style("i").blue().bold(),
            style("rtab role create <name>").yellow()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Name").fg(Color::White),
        Cell::new("Status").fg(Color::White),
        Cell::new("Abilities").fg(Color::White),
        Cell::new("Model").fg(Color::White),
        Cell::new("Description").fg(Color::White),
    ]);

    for role in &roles {
        let status_cell = match role.status {
            RoleStatus::Enabled => Cell::new("● enabled").fg(Color::Green),
            RoleStatus::Disabled => Cell::new("○ disabled").fg(Color::Yellow),
        };
        table.add_row(vec![
            Cell::new(&role.name).fg(Color::Cyan),
            status_cell,
            Cell::new(role.abilities.join(", ")),
            Cell::new(role.preferred_model.as_deref().unwrap_or("(default)"))
                .fg(Color::DarkGrey),
            Cell::new(&role.description),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} role{}",
        style(roles.len()).bold(),
        if roles.len() == 1 { "" } else { "s" }
    );
    println!();

    Ok(())
}

/// Show one role with its latest prompt.
pub async fn show_role(state: &AppState, name: &str, json: bool) -> Result<()> {
    let role = state.role_service.get(name).await?;
    let latest = state.role_service.latest_prompt(name).await?;

    if json {
        let out = serde_json::json!({
            "role": role,
            "latest_prompt": latest,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    println!("  {}", style(&role.name).cyan().bold());
    if !role.description.is_empty() {
        println!("  {}", style(&role.description).dim());
    }
    println!();
    println!("  {}     {}", style("Status:").bold(), role.status);
    println!(
        "  {}  {}",
        style("Abilities:").bold(),
        if role.abilities.is_empty() {
            "(dialogue only)".to_string()
        } else {
            role.abilities.join(", ")
        }
    );
    println!(
        "  {}      {}",
        style("Model:").bold(),
        role.preferred_model.as_deref().unwrap_or("(default)")
    );
    println!();

    match latest {
        Some(version) => {
            println!(
                "  {}",
                style(format!("── Prompt (version {}) ──", version.version)).dim()
            );
            for line in version.content.lines() {
                println!("  {line}");
            }
        }
        None => {
            println!("  {}", style("(no prompt versions)").dim());
        }
    }
    println!();

    Ok(())
}

/// Append a new prompt version.
pub async fn append_prompt(state: &AppState, name: &str, content: String, json: bool) -> Result<()> {
    state
        .role_service
        .update(
            name,
            UpdateRoleRequest {
                prompt: Some(content),
                ..Default::default()
            },
        )
        .await?;
    let latest = state.role_service.latest_prompt(name).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&latest)?);
        return Ok(());
    }

    if let Some(version) = latest {
        println!(
            "  {} Prompt version {} saved for '{}'.",
            style("✓").green().bold(),
            style(version.version).bold(),
            name
        );
    }

    Ok(())
}

/// Show the prompt version history.
pub async fn prompt_history(state: &AppState, name: &str, json: bool) -> Result<()> {
    let versions = state.role_service.prompt_history(name).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&versions)?);
        return Ok(());
    }

    println!();
    println!(
        "  Prompt history for {}",
        style(name).cyan().bold()
    );
    println!();
    for version in &versions {
        let preview: String = version.content.chars().take(60).collect();
        let suffix = if version.content.chars().count() > 60 {
            "..."
        } else {
            ""
        };
        println!(
            "  {}  {}  {}{}",
            style(format!("v{}", version.version)).bold(),
            style(version.created_at.format("%Y-%m-%d %H:%M UTC")).dim(),
            preview.replace('\n', " "),
            suffix
        );
    }
    println!();

    Ok(())
}

/// Delete a role.
pub async fn delete_role(state: &AppState, name: &str, json: bool) -> Result<()> {
    state.role_service.delete(name).await?;

    if json {
        println!("{}", serde_json::json!({"deleted": true, "name": name}));
    } else {
        println!("  {} Role '{name}' deleted.", style("✓").red().bold());
    }

    Ok(())
}
