use std::path::PathBuf;

use clap::{Parser, Subcommand};
use todolist_core::{TaskFilter, TaskSort};

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "todolist")]
#[command(about = "Local to-do list with one-way sync from the demo API")]
#[command(version)]
pub struct Cli {
    /// SQLite database file
    #[arg(long, global = true, value_name = "PATH", env = "TODOLIST_DB")]
    pub db: Option<PathBuf>,

    /// Directory for rotating log files
    #[arg(long, global = true, value_name = "DIR", env = "TODOLIST_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// trace|debug|info|warn|error
    #[arg(long, global = true, value_name = "LEVEL", env = "TODOLIST_LOG_LEVEL")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show tasks with an optional filter and sort order
    List {
        #[arg(long, default_value_t = TaskFilter::All)]
        filter: TaskFilter,
        #[arg(long, default_value_t = TaskSort::Default)]
        sort: TaskSort,
        /// Print tasks as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create a task
    Add {
        title: String,
        #[arg(long, short)]
        description: Option<String>,
    },
    /// Change title and/or description
    Edit {
        /// Task id or a unique prefix of it
        id: String,
        #[arg(long, short)]
        title: Option<String>,
        #[arg(long, short)]
        description: Option<String>,
    },
    /// Flip completion
    Toggle { id: String },
    /// Delete a task
    Delete { id: String },
    /// Show task details
    Show { id: String },
    /// Print the share card of a task
    Share { id: String },
    /// Search title and description
    Search {
        query: String,
        /// Only tasks created locally
        #[arg(long)]
        local: bool,
    },
    /// Import todos from the remote API
    Sync {
        /// Base URL of the remote API
        #[arg(long, env = "TODOLIST_REMOTE_URL")]
        url: Option<String>,
    },
    /// Delete every task
    Clear,
}
