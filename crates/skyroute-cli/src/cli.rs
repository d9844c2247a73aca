//! CLI argument definitions.

use clap::{Parser, Subcommand};

use crate::commands::{exec, login, logout, operations, refresh, test_connection};

/// Bluesky XRPC client with a managed session.
#[derive(Parser, Debug)]
#[command(name = "skyroute")]
#[command(author, version = env!("SKYROUTE_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a session and store it
    Login(login::LoginArgs),

    /// List the operations that can be executed
    Operations(operations::OperationsArgs),

    /// Execute an operation with the stored session
    Exec(exec::ExecArgs),

    /// Probe the server with the stored session
    Test(test_connection::TestArgs),

    /// Refresh the stored session tokens
    Refresh(refresh::RefreshArgs),

    /// Revoke the stored session and remove it
    Logout(logout::LogoutArgs),
}
