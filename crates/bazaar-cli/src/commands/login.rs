//! Login command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use bazaar_core::Credentials;
use bazaar_http::ApiClient;

use crate::output;

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Account email address
    #[arg(long)]
    pub email: String,

    /// Account password
    #[arg(long)]
    pub password: String,
}

pub async fn run(args: LoginArgs, client: ApiClient) -> Result<()> {
    let credentials = Credentials::new(&args.email, &args.password);

    eprintln!("{}", "Logging in...".dimmed());

    let session = client
        .login(&credentials)
        .await
        .context("Failed to login")?;

    output::success("Logged in successfully");
    println!();
    output::field("API", client.config().base_url.as_str());
    if let Some(user) = &session.user {
        output::user(user);
    }

    Ok(())
}
