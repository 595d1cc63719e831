//! Subcommand implementations.

pub mod login;
pub mod logout;
pub mod refresh;
pub mod request;
pub mod whoami;

use anyhow::Result;

use crate::cli::{Cli, Commands};
use crate::session::{self, Connection};

pub async fn handle(cli: Cli) -> Result<()> {
    let connection = Connection {
        api: cli.api,
        timeout_secs: cli.timeout_secs,
    };

    match cli.command {
        Commands::Login(args) => login::run(args, session::connect(&connection)?).await,
        Commands::Logout(args) => logout::run(args, session::connect(&connection)?).await,
        Commands::Whoami(args) => whoami::run(args, session::open_store()?),
        Commands::Refresh(args) => refresh::run(args, session::connect(&connection)?).await,
        Commands::Request(args) => request::run(args, session::connect(&connection)?).await,
    }
}
