//! Refresh command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use bazaar_http::ApiClient;

use crate::output;

#[derive(Args, Debug)]
pub struct RefreshArgs {}

pub async fn run(_args: RefreshArgs, client: ApiClient) -> Result<()> {
    if !client.session().is_authenticated() {
        anyhow::bail!("No active session. Run 'bazaar login' first.");
    }

    eprintln!("{}", "Refreshing session...".dimmed());

    client
        .refresh()
        .await
        .context("Failed to refresh session")?;

    output::success("Session refreshed successfully");

    Ok(())
}
