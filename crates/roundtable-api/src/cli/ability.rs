//! Ability CLI commands: list and show the merged namespace.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use roundtable_types::ability::AbilityKind;

use crate::state::AppState;

pub async fn list_abilities(state: &AppState, json: bool) -> Result<()> {
    let abilities = state.ability_service.list().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&abilities)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Id").fg(Color::White),
        Cell::new("Name").fg(Color::White),
        Cell::new("Kind").fg(Color::White),
        Cell::new("Layer").fg(Color::White),
    ]);

    for resolved in &abilities {
        table.add_row(vec![
            Cell::new(&resolved.ability.id).fg(Color::Cyan),
            Cell::new(&resolved.ability.name),
            Cell::new(kind_label(&resolved.ability.kind)),
            Cell::new(resolved.source.to_string()).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");
    println!();

    Ok(())
}

pub async fn show_ability(state: &AppState, id: &str, json: bool) -> Result<()> {
    let resolved = state.ability_service.resolve(id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&resolved)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} {}",
        style(&resolved.ability.id).cyan().bold(),
        style(format!("({})", resolved.source)).dim()
    );
    if !resolved.ability.description.is_empty() {
        println!("  {}", style(&resolved.ability.description).dim());
    }
    println!();
    match &resolved.ability.kind {
        AbilityKind::Command { template } => {
            println!("  {}  {}", style("Command:").bold(), template.join(" "));
        }
        AbilityKind::Prompt { template } => {
            println!("  {}", style("Prompt template:").bold());
            for line in template.lines() {
                println!("    {line}");
            }
        }
        AbilityKind::Dialogue => {
            println!("  {}", style("Built-in plain dialogue.").dim());
        }
    }
    println!();

    Ok(())
}

fn kind_label(kind: &AbilityKind) -> &'static str {
    match kind {
        AbilityKind::Command { .. } => "command",
        AbilityKind::Prompt { .. } => "prompt",
        AbilityKind::Dialogue => "dialogue",
    }
}
