//! Logout command - remove the stored Garmin Connect session.
//!
//! Deletes the OAuth2 token bundle. Other files in the token
//! directory (the config file, tokens written by other Garmin
//! tooling) are left alone.

use anyhow::{Context, Result};
use colored::Colorize;

use crate::config::Config;
use crate::connect::{ConnectClient, TokenStore};

/// Arguments for the logout command.
#[derive(clap::Args)]
#[command(after_help = "EXAMPLES:\n    \
    vitals logout                Remove the stored Garmin Connect session")]
pub struct Args {}

/// Executes the logout command.
pub fn run(_args: Args) -> Result<()> {
    let store = TokenStore::new()?;

    match store.load().context("Failed to check login status")? {
        Some(tokens) => {
            // Best effort: name the account when the session still
            // verifies, but never let that block the logout.
            let name = if tokens.is_expired() {
                None
            } else {
                Config::load()
                    .ok()
                    .and_then(|config| ConnectClient::with_session(&tokens, &config).ok())
                    .and_then(|mut client| {
                        client.verify().ok()?;
                        Some(client.display_name().to_string())
                    })
            };

            store.delete().context("Failed to delete tokens")?;

            match name {
                Some(name) => println!("Logged out from {}", name.cyan()),
                None => println!("Logged out."),
            }
        }
        None => {
            println!("{}", "Not currently logged in.".yellow());
        }
    }

    Ok(())
}
