//! CLI argument definitions.

use clap::{Parser, Subcommand};

use bazaar_http::{API_URL_ENV, TIMEOUT_ENV};

use crate::commands::{login, logout, refresh, request, whoami};

/// Command-line client for the bazaar API.
#[derive(Parser, Debug)]
#[command(name = "bazaar")]
#[command(author, version = env!("BAZAAR_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// API base URL
    #[arg(long, env = API_URL_ENV, global = true)]
    pub api: Option<String>,

    /// Request timeout in seconds
    #[arg(long, env = TIMEOUT_ENV, global = true)]
    pub timeout_secs: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in and store the session
    Login(login::LoginArgs),

    /// Sign out and forget the stored session
    Logout(logout::LogoutArgs),

    /// Display the signed-in user
    Whoami(whoami::WhoamiArgs),

    /// Renew the session tokens
    Refresh(refresh::RefreshArgs),

    /// Send a request to the API with the stored session
    Request(request::RequestArgs),
}
