pub mod cli;
pub mod toml_config;

pub use cli::FileSessionStore;
pub use toml_config::VoteConfig;

#[cfg(feature = "cli")]
use crate::domain::model::Category;
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "bestof-vote")]
#[command(about = "Search, rank and submit your best-of-the-year picks")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "vote-config.toml")]
    pub config: String,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Unlock the ballot with the shared password
    Login { password: String },
    /// Forget the stored session
    Logout,
    /// One-off search in a single category
    Search {
        #[arg(value_enum)]
        category: Category,
        query: String,
    },
    /// Interactive voting session
    Vote,
}
