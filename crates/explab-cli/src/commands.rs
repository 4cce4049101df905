use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "explab")]
#[command(version = "0.1.0")]
#[command(propagate_version = true)]
#[command(about = "Lifecycle agent for optional experiment packages", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Lists the known server environments
    #[command(alias = "env")]
    Envs,
    /// Shows the client identity and installed experiment state
    Status {
        /// Enable debug mode for verbose output
        #[arg(long)]
        debug: bool,
    },
    /// Synchronizes installed experiment state with the remote service
    Sync {
        /// Server environment to sync against (persisted as the new preference)
        #[arg(long)]
        env: Option<String>,
        /// Enable debug mode for verbose output
        #[arg(long)]
        debug: bool,
        /// Only log errors
        #[arg(short = 'q', long)]
        quiet: bool,
    },
}
