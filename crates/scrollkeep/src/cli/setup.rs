use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "scrollkeep", bin_name = "scrollkeep", version)]
#[command(
    about = "Keeps a folder tree of notes, their basenames and their indexes in agreement",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Vault directory (default: nearest ancestor with a .scrollkeep folder, else cwd)
    #[arg(long, global = true, help_heading = "Options")]
    pub vault: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true, help_heading = "Options")]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Bring every file, folder and codex into canonical form
    Heal,

    /// Show the library tree
    #[command(alias = "ls")]
    Tree {
        /// Section to list (default: whole library)
        path: Option<String>,

        /// Print the snapshot as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add scrolls (missing sections are created)
    Add {
        #[arg(required = true, num_args = 1..)]
        paths: Vec<String>,
    },

    /// Remove notes or sections
    #[command(alias = "remove")]
    Rm {
        #[arg(required = true, num_args = 1..)]
        paths: Vec<String>,
    },

    /// Mark notes or whole sections done
    Done {
        #[arg(required = true, num_args = 1..)]
        paths: Vec<String>,
    },

    /// Mark notes or whole sections not started
    Reopen {
        #[arg(required = true, num_args = 1..)]
        paths: Vec<String>,
    },

    /// Move a note or section (into TO if it is an existing section)
    #[command(alias = "move")]
    Mv { from: String, to: String },

    /// Watch the vault and heal changes as they happen
    Watch,
}

pub fn parse_cli() -> Cli {
    Cli::parse()
}
