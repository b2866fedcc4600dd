use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod config;
mod connect;
mod queries;

use cli::commands;

/// The main CLI command line interface.
#[derive(Parser)]
#[command(name = "vitals")]
#[command(version)]
#[command(about = "Query Garmin Connect health and fitness data as JSON")]
#[command(long_about = "Vitals pulls health, fitness, and training data out of Garmin\n\
    Connect and prints it as JSON, one document per invocation.\n\n\
    Run 'vitals login' once to store a session, then call any query\n\
    command. 'vitals help' prints the full query catalog as JSON.")]
#[command(disable_help_subcommand = true)]
#[command(after_help = "EXAMPLES:\n    \
    vitals login             Authenticate with Garmin Connect\n    \
    vitals today             Today's steps, heart rate, sleep, stress\n    \
    vitals steps 2026-08-01  Step count for a specific day\n    \
    vitals sleep             Last night's sleep detail\n    \
    vitals activities 10     Ten most recent activities\n    \
    vitals week              Seven-day roll-up\n    \
    vitals help              Full query catalog as JSON\n\n\
    For the interactive commands, run 'vitals <command> --help'.")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available CLI subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Authenticate with Garmin Connect and store a session
    #[command(long_about = "Prompts for Garmin Connect credentials (and an MFA code when the\n\
        account requires one), then stores the OAuth2 token bundle under\n\
        ~/.garminconnect with owner-only permissions. When valid tokens\n\
        already exist, verifies them and reports the account instead of\n\
        prompting again.")]
    Login(commands::login::Args),

    /// Remove the stored Garmin Connect session
    Logout(commands::logout::Args),

    /// Everything else is looked up in the query catalog
    #[command(external_subcommand)]
    Query(Vec<String>),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging. Stdout is reserved for the JSON documents,
    // so diagnostics go to stderr.
    let filter = if cli.verbose {
        "vitals=debug"
    } else {
        "vitals=info"
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    match cli.command {
        Some(Commands::Login(args)) => commands::login::run(args),
        Some(Commands::Logout(args)) => commands::logout::run(args),
        Some(Commands::Query(argv)) => commands::query::run(argv),
        None => commands::query::no_command(),
    }
}
