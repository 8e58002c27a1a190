// Author: Dustin Pilgrim
// License: MIT

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::core::status::{Role, StatusKey};

#[derive(Parser, Debug)]
#[command(
    name = "presence",
    version = env!("CARGO_PKG_VERSION"),
    about = "Worker status tracker"
)]
pub struct Args {
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[arg(short, long, action)]
    pub verbose: bool,

    /// BranchManager, HR or Employee. Overrides presence.role.
    #[arg(long, value_name = "ROLE")]
    pub role: Option<Role>,

    /// Authority socket. Overrides presence.socket.
    #[arg(long, value_name = "PATH")]
    pub socket: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    #[command(about = "Run the authority daemon")]
    Serve,

    #[command(about = "Track the current session live and switch status from stdin")]
    Watch,

    #[command(about = "Request a status change")]
    Set {
        status: StatusKey,

        /// Skip the confirmation prompt.
        #[arg(short, long)]
        yes: bool,
    },

    #[command(about = "Display today's durations")]
    Info {
        #[arg(long)]
        json: bool,
    },

    #[command(about = "List the statuses available to the role")]
    Options,
}
