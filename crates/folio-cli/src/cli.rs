use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Portfolio page configuration store and editor", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (default: platform config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// SQLite database file (overrides storage.database_path)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Owner to act on (default from config: cli.default_owner)
    #[arg(long, global = true, env = "FOLIO_OWNER")]
    pub owner: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API server
    Serve {
        #[arg(long)]
        host: Option<String>,

        #[arg(long)]
        port: Option<u16>,

        #[arg(long)]
        read_only: bool,
    },

    /// Show the current configuration
    Show,

    /// List saved versions, newest first
    Versions,

    /// Make a saved version current again
    Restore {
        /// Version ID
        version_id: String,
    },

    /// Publish the current configuration
    Publish,

    /// Import a configuration JSON file and save it as a new version
    Import {
        /// Path to the configuration JSON
        file: PathBuf,

        /// Optional label for the version
        #[arg(long)]
        label: Option<String>,
    },

    /// Export the current configuration as JSON
    Export {
        /// Output file (default: stdout)
        file: Option<PathBuf>,
    },

    /// Apply a JSON array of edits to the current configuration
    Edit {
        /// Path to the edits JSON
        file: PathBuf,

        /// Optional label for the version
        #[arg(long)]
        label: Option<String>,

        /// Print the result instead of saving it
        #[arg(long)]
        dry_run: bool,
    },

    /// Add a section from its template and save
    AddSection {
        /// Section type (hero, about, skills, portfolio-grid, timeline, ...)
        kind: String,

        /// Section name (default: the template name)
        #[arg(long)]
        name: Option<String>,

        /// Optional label for the version
        #[arg(long)]
        label: Option<String>,
    },

    /// List section templates
    Templates,

    /// Generate shell completions
    Completions {
        shell: Shell,
    },
}
