pub mod commands;
pub mod handlers;

use clap::Parser;

use commands::{Cli, Commands};
use handlers::{EnvsHandler, StatusHandler, SyncHandler};

pub fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Envs => {
            explab_logger::init_logger(false);
            EnvsHandler::list()
        }
        Commands::Status { debug } => {
            explab_logger::init_logger(false);
            StatusHandler::show(*debug)
        }
        Commands::Sync { env, debug, quiet } => {
            explab_logger::init_logger(*quiet);
            SyncHandler::sync(env.as_deref(), *debug)
        }
    }
}
