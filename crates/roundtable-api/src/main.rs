//! Roundtable CLI and REST API entry point.
//!
//! Binary name: `rtab`
//!
//! Parses CLI arguments, initializes database and services, then dispatches
//! to the appropriate command handler or starts the REST API server.

mod cli;
mod http;
mod state;

use clap::Parser;
use clap_complete::generate;
use tracing_subscriber::EnvFilter;

use cli::{AbilityCommand, Cli, Commands, RoleCommand, RoomCommand};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,roundtable=debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "rtab", &mut std::io::stdout());
        return Ok(());
    }

    // Initialize application state (config, DB, services)
    let state = AppState::init().await?;

    match cli.command {
        Commands::Role { action } => match action {
            RoleCommand::Create {
                name,
                description,
                prompt,
                abilities,
                model,
            } => {
                cli::role::create_role(&state, name, description, prompt, abilities, model, cli.json)
                    .await?;
            }
            RoleCommand::List => {
                cli::role::list_roles(&state, cli.json).await?;
            }
            RoleCommand::Show { name } => {
                cli::role::show_role(&state, &name, cli.json).await?;
            }
            RoleCommand::Prompt { name, content } => {
                cli::role::append_prompt(&state, &name, content, cli.json).await?;
            }
            RoleCommand::History { name } => {
                cli::role::prompt_history(&state, &name, cli.json).await?;
            }
            RoleCommand::Delete { name } => {
                cli::role::delete_role(&state, &name, cli.json).await?;
            }
        },

        Commands::Room { action } => match action {
            RoomCommand::Create { title, plain, roles } => {
                cli::room::create_room(&state, title, plain, roles, cli.json).await?;
            }
            RoomCommand::List => {
                cli::room::list_rooms(&state, cli.json).await?;
            }
            RoomCommand::Show { id } => {
                cli::room::show_room(&state, &id, cli.json).await?;
            }
            RoomCommand::Rename { id, title } => {
                cli::room::rename_room(&state, &id, &title, cli.json).await?;
            }
            RoomCommand::Clear { id } => {
                cli::room::clear_room(&state, &id, cli.json).await?;
            }
            RoomCommand::Delete { id } => {
                cli::room::delete_room(&state, &id, cli.json).await?;
            }
        },

        Commands::Ability { action } => match action {
            AbilityCommand::List => {
                cli::ability::list_abilities(&state, cli.json).await?;
            }
            AbilityCommand::Show { id } => {
                cli::ability::show_ability(&state, &id, cli.json).await?;
            }
        },

        Commands::Serve { port, host } => {
            let host = host.unwrap_or_else(|| state.config.server.host.clone());
            let port = port.unwrap_or(state.config.server.port);
            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            println!(
                "  {} Roundtable API listening on {}",
                console::style("⚡").bold(),
                console::style(format!("http://{addr}")).cyan()
            );
            println!("  {}", console::style("Press Ctrl+C to stop").dim());

            let router = http::router::build_router(state);

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            println!("\n  Server stopped.");
        }

        Commands::Completions { .. } => unreachable!("handled above"),
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
