// Author: Dustin Pilgrim
// License: MIT

mod app;
mod cli;
mod config;
mod core;
mod ipc;
mod log;
mod services;
mod tracker;

use clap::Parser;

use app::AnyError;
use cli::Command;

#[tokio::main]
async fn main() {
    let args = cli::Args::parse();
    log::set_verbose(args.verbose);

    if let Err(e) = run(&args).await {
        eprintln!("presence: {e}");
        std::process::exit(1);
    }
}

async fn run(args: &cli::Args) -> Result<(), AnyError> {
    let cfg = config::load(args.config.as_deref()).map_err(|e| -> AnyError { format!("{e:#}").into() })?;

    match &args.command {
        Command::Serve => app::serve_mode::run(args, &cfg).await,
        Command::Watch => app::watch_mode::run(args, &cfg).await,
        Command::Set { status, yes } => app::command::set(args, &cfg, *status, *yes).await,
        Command::Info { json } => app::command::info(args, &cfg, *json).await,
        Command::Options => app::command::options(args, &cfg),
    }
}
