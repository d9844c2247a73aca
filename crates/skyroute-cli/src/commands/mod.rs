//! Subcommand implementations.

pub mod exec;
pub mod login;
pub mod logout;
pub mod operations;
pub mod refresh;
pub mod test_connection;

use anyhow::Result;

use crate::cli::Commands;

pub async fn handle(command: Commands) -> Result<()> {
    match command {
        Commands::Login(args) => login::run(args).await,
        Commands::Operations(args) => operations::run(args).await,
        Commands::Exec(args) => exec::run(args).await,
        Commands::Test(args) => test_connection::run(args).await,
        Commands::Refresh(args) => refresh::run(args).await,
        Commands::Logout(args) => logout::run(args).await,
    }
}
