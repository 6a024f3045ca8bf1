//! CLI module - Command-line interface for Sonora
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand};

/// Sonora - personal YouTube audio library
#[derive(Parser)]
#[command(name = "sonora")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API server (default)
    #[command(alias = "web")]
    Serve,

    /// Create default config file
    #[command(alias = "init")]
    InitConfig,

    /// Create a user account
    AddUser {
        username: String,
        email: String,
        /// Grant the admin tier
        #[arg(long)]
        admin: bool,
        /// Password for the new account
        #[arg(long, env = "SONORA_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// List user accounts with their download counts
    #[command(alias = "ls")]
    ListUsers,
}

pub use commands::*;
