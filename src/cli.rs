use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(author, version, about = "Find video tours of a property listing")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Search the web for videos of a property
    Search(SearchArgs),
    /// Generate the promotional tutorial video
    Promo,
    /// Manage saved searches
    History {
        /// Identity of the acting user
        #[arg(long)]
        user: String,
        #[command(subcommand)]
        action: HistoryAction,
    },
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    #[arg(long)]
    pub street: String,
    #[arg(long)]
    pub city: String,
    #[arg(long)]
    pub state: String,
    #[arg(long)]
    pub zip: String,
    #[arg(long = "mls")]
    pub mls_number: String,
    /// Photo of the front of the property
    #[arg(long)]
    pub front: Option<PathBuf>,
    /// Photo of the back of the property
    #[arg(long)]
    pub back: Option<PathBuf>,
    /// Save the result to history under this user
    #[arg(long)]
    pub save_as: Option<String>,
    /// Title for the saved search
    #[arg(long, requires = "save_as")]
    pub title: Option<String>,
    /// Write a text report to this file
    #[arg(long)]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum HistoryAction {
    List,
    Show { id: Uuid },
    Rename { id: Uuid, title: String },
    /// Replace the list of users the search is shared with
    Share {
        id: Uuid,
        #[arg(num_args = 0..)]
        viewers: Vec<String>,
    },
    Delete { id: Uuid },
    Export { id: Uuid, path: PathBuf },
}
