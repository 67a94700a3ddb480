// Lifevault — CLI Module
//
// Command-line interface using clap derive macros. Each invocation
// authenticates, performs one operation, and exits; the menu loop of a
// long-running session is deliberately absent.

mod commands;

use clap::{Parser, Subcommand};

pub use commands::execute;

/// Lifevault — an encrypted personal data vault with emergency access.
#[derive(Parser, Debug)]
#[command(name = "lifevault")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize lifevault: create the database and the encryption key file.
    Init,

    /// Show the fixed set of entry categories.
    Categories,

    /// Register a new account. Does not log you in.
    Register {
        /// Account handle (at least 3 characters, unique).
        #[arg(long)]
        handle: String,

        /// Account password (at least 6 characters).
        /// Passing secrets as flags exposes them to shell history; prefer an
        /// environment-driven wrapper where that matters.
        #[arg(long)]
        secret: String,

        /// 4-digit emergency PIN.
        #[arg(long)]
        pin: String,

        /// Contact email (optional).
        #[arg(long)]
        email: Option<String>,
    },

    /// Add an encrypted vault entry.
    Add {
        #[arg(long)]
        handle: String,

        #[arg(long)]
        secret: String,

        /// Category key (medical, financial, emergency, personal, work,
        /// legal, travel, other).
        #[arg(long)]
        category: String,

        #[arg(long)]
        title: String,

        /// Plaintext content; encrypted before it is stored.
        #[arg(long)]
        content: String,
    },

    /// List all entries, decrypted and grouped by category.
    List {
        #[arg(long)]
        handle: String,

        #[arg(long)]
        secret: String,

        /// Emit JSON instead of the table view.
        #[arg(long)]
        json: bool,
    },

    /// Search entries by title or content (case-insensitive).
    Search {
        #[arg(long)]
        handle: String,

        #[arg(long)]
        secret: String,

        /// The term to look for.
        term: String,
    },

    /// Edit an entry; omitted fields keep their current values.
    Edit {
        #[arg(long)]
        handle: String,

        #[arg(long)]
        secret: String,

        /// The entry id (see `list`).
        #[arg(long)]
        id: i64,

        #[arg(long)]
        category: Option<String>,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        content: Option<String>,
    },

    /// Delete an entry.
    Delete {
        #[arg(long)]
        handle: String,

        #[arg(long)]
        secret: String,

        #[arg(long)]
        id: i64,
    },

    /// Entry counts per category and recent updates.
    Stats {
        #[arg(long)]
        handle: String,

        #[arg(long)]
        secret: String,
    },

    /// Manage emergency contacts.
    Contact {
        #[command(subcommand)]
        command: ContactCommands,
    },

    /// Emergency access: PIN-gated, read-only, restricted to the categories
    /// your emergency contacts are permitted to see.
    Emergency {
        #[arg(long)]
        handle: String,

        /// 4-digit emergency PIN.
        #[arg(long)]
        pin: String,
    },

    /// Change the account password.
    ChangePassword {
        #[arg(long)]
        handle: String,

        #[arg(long)]
        current: String,

        #[arg(long)]
        new: String,
    },

    /// Update the account email (requires the current password).
    UpdateEmail {
        #[arg(long)]
        handle: String,

        #[arg(long)]
        secret: String,

        #[arg(long)]
        new_email: String,
    },

    /// Show failed login and PIN counts against the lockout threshold.
    Status {
        #[arg(long)]
        handle: String,

        #[arg(long)]
        secret: String,
    },

    /// Change the emergency PIN (requires the current password).
    ChangePin {
        #[arg(long)]
        handle: String,

        #[arg(long)]
        secret: String,

        #[arg(long)]
        new_pin: String,
    },

    /// Show the most recent security events, newest first.
    Events {
        #[arg(long)]
        handle: String,

        #[arg(long)]
        secret: String,

        #[arg(long, default_value = "20")]
        limit: usize,

        /// Emit JSON instead of the table view.
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ContactCommands {
    /// Add an emergency contact.
    Add {
        #[arg(long)]
        handle: String,

        #[arg(long)]
        secret: String,

        #[arg(long)]
        name: String,

        #[arg(long)]
        phone: String,

        #[arg(long)]
        email: Option<String>,

        /// Comma-separated category keys this contact may see
        /// (e.g. "medical,financial").
        #[arg(long)]
        categories: String,
    },

    /// List emergency contacts.
    List {
        #[arg(long)]
        handle: String,

        #[arg(long)]
        secret: String,
    },

    /// Edit a contact; omitted fields keep their current values.
    Edit {
        #[arg(long)]
        handle: String,

        #[arg(long)]
        secret: String,

        #[arg(long)]
        id: i64,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        categories: Option<String>,
    },

    /// Delete a contact.
    Delete {
        #[arg(long)]
        handle: String,

        #[arg(long)]
        secret: String,

        #[arg(long)]
        id: i64,
    },
}
