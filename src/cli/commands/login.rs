//! Login command - authenticate with Garmin Connect.
//!
//! Prompts for credentials (and an MFA code when the account requires
//! one), walks the SSO flow, and stores the resulting OAuth2 token
//! bundle under `~/.garminconnect` for the query commands to use.

use anyhow::{Context, Result};
use colored::Colorize;
use std::io::{self, Write};

use crate::config::Config;
use crate::connect::{sso, ConnectClient, TokenStore};

/// Arguments for the login command.
#[derive(clap::Args)]
#[command(after_help = "EXAMPLES:\n    \
    vitals login                 Authenticate with Garmin Connect\n    \
    vitals login --domain garmin.cn\n                                 Authenticate against the China deployment")]
pub struct Args {
    /// Garmin domain to authenticate against (garmin.com or garmin.cn).
    #[arg(long)]
    pub domain: Option<String>,
}

/// Executes the login command.
///
/// Idempotent: when stored tokens still verify, reports the account
/// and returns without prompting for anything.
pub fn run(args: Args) -> Result<()> {
    let mut config = Config::load()?;
    if let Some(domain) = args.domain {
        config.domain = domain;
    }

    let store = TokenStore::new()?;

    // Check for an existing session first
    if store.has_tokens() {
        match verify_existing(&store, &config) {
            Ok(name) => {
                println!("Already logged in as {}", name.cyan());
                println!("Run 'vitals logout' first to switch accounts.");
                return Ok(());
            }
            Err(e) => {
                println!("Existing tokens are invalid ({e}), logging in again...");
                println!();
            }
        }
    }

    let email = prompt("Email: ")?;
    let password = rpassword::prompt_password("Password: ").context("Failed to read password")?;

    let tokens = sso::login(&email, &password, &config.domain, || {
        print!("Enter MFA code: ");
        io::stdout().flush()?;
        let mut code = String::new();
        io::stdin().read_line(&mut code)?;
        Ok(code)
    })
    .context("Login failed")?;

    store.save(&tokens).context("Failed to store tokens")?;

    let mut client = ConnectClient::with_session(&tokens, &config)?;
    client
        .verify()
        .context("Login succeeded but the session did not verify")?;

    println!();
    println!(
        "{} Logged in as {}",
        "Success!".green().bold(),
        client.display_name().cyan()
    );
    println!("Tokens saved to {}", store.dir().display());

    Ok(())
}

/// Loads and verifies the stored bundle, returning the display name.
fn verify_existing(store: &TokenStore, config: &Config) -> Result<String> {
    let tokens = store
        .load()?
        .ok_or_else(|| anyhow::anyhow!("token bundle missing"))?;
    if tokens.is_expired() {
        anyhow::bail!("OAuth token expired");
    }

    let mut client = ConnectClient::with_session(&tokens, config)?;
    client.verify()?;
    Ok(client.display_name().to_string())
}

fn prompt(label: &str) -> Result<String> {
    print!("{label}");
    io::stdout().flush().context("Failed to flush stdout")?;

    let mut line = String::new();
    io::stdin()
        .read_line(&mut line)
        .context("Failed to read input")?;
    Ok(line.trim().to_string())
}
