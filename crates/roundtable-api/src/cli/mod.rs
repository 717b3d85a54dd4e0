//! CLI command definitions and dispatch for the `rtab` binary.
//!
//! Uses clap derive macros for argument parsing. Commands are grouped
//! by noun (e.g., `rtab role create`, `rtab room list`).

pub mod ability;
pub mod role;
pub mod room;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Run AI roles around a shared table.
#[derive(Parser)]
#[command(name = "rtab", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage roles (create, list, show, update, delete, prompts).
    Role {
        #[command(subcommand)]
        action: RoleCommand,
    },

    /// Manage rooms (create, list, show, rename, clear, delete).
    Room {
        #[command(subcommand)]
        action: RoomCommand,
    },

    /// Inspect the merged ability namespace.
    Ability {
        #[command(subcommand)]
        action: AbilityCommand,
    },

    /// Start the REST API server.
    Serve {
        /// Port to listen on (overrides config).
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (overrides config).
        #[arg(long)]
        host: Option<String>,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum RoleCommand {
    /// Create a new role.
    Create {
        /// Role name, the token users address with `@`.
        name: String,

        /// Short description.
        #[arg(long)]
        description: Option<String>,

        /// Initial prompt content (becomes version 1).
        #[arg(long)]
        prompt: Option<String>,

        /// Bound ability identifiers (repeatable).
        #[arg(long = "ability")]
        abilities: Vec<String>,

        /// Preferred model for this role's replies.
        #[arg(long)]
        model: Option<String>,
    },

    /// List all roles.
    #[command(alias = "ls")]
    List,

    /// Show a role with its latest prompt.
    Show {
        /// Role name.
        name: String,
    },

    /// Append a new prompt version to a role.
    Prompt {
        /// Role name.
        name: String,

        /// New prompt content.
        content: String,
    },

    /// Show a role's prompt version history.
    History {
        /// Role name.
        name: String,
    },

    /// Delete a role and its prompt history.
    #[command(alias = "rm")]
    Delete {
        /// Role name.
        name: String,
    },
}

#[derive(Subcommand)]
pub enum RoomCommand {
    /// Create a new room.
    Create {
        /// Room title.
        title: String,

        /// Create a plain conversation room instead of a task room.
        #[arg(long)]
        plain: bool,

        /// Assigned role names (repeatable).
        #[arg(long = "role")]
        roles: Vec<String>,
    },

    /// List all rooms, newest first.
    #[command(alias = "ls")]
    List,

    /// Show a room's message log.
    Show {
        /// Room id.
        id: String,
    },

    /// Rename a room.
    Rename {
        /// Room id.
        id: String,

        /// New title.
        title: String,
    },

    /// Delete all messages in a room.
    Clear {
        /// Room id.
        id: String,
    },

    /// Delete a room and its messages.
    #[command(alias = "rm")]
    Delete {
        /// Room id.
        id: String,
    },
}

#[derive(Subcommand)]
pub enum AbilityCommand {
    /// List the merged ability namespace.
    #[command(alias = "ls")]
    List,

    /// Show one ability and the layer it resolved from.
    Show {
        /// Ability identifier.
        id: String,
    },
}
