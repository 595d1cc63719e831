//! Whoami command implementation.

use anyhow::{Context, Result};
use clap::Args;

use bazaar_core::Session;
use bazaar_file::FileStore;

use crate::output;

#[derive(Args, Debug)]
pub struct WhoamiArgs {}

pub fn run(_args: WhoamiArgs, store: FileStore) -> Result<()> {
    let session = Session::load(&store);
    if !session.is_authenticated() {
        anyhow::bail!("No active session. Run 'bazaar login' first.");
    }

    let user = session
        .user
        .context("Session has no stored user. Run 'bazaar login' again.")?;
    output::user(&user);

    Ok(())
}
