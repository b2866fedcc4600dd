//! Query dispatch - look up a registry command, run it, print JSON.
//!
//! This is the machine-readable half of the CLI: every invocation
//! writes exactly one pretty-printed JSON document to stdout. Unknown
//! commands and session failures exit non-zero with an error document;
//! an `error` field produced by a mapper itself does not change the
//! exit code.

use anyhow::Result;
use serde_json::{json, Value};

use crate::connect::ConnectClient;
use crate::queries;

/// Runs the query named by the first element of `argv`.
pub fn run(argv: Vec<String>) -> Result<()> {
    let Some(name) = argv.first() else {
        return no_command();
    };
    let name = name.to_lowercase();
    let args = &argv[1..];

    if name == "help" {
        return print_document(&queries::help_catalog());
    }

    let Some(command) = queries::find(&name) else {
        print_document(&json!({
            "error": format!("Unknown command: {name}"),
            "available": queries::command_names(),
        }))?;
        std::process::exit(1);
    };

    let client = match ConnectClient::acquire() {
        Ok(client) => client,
        Err(e) => {
            print_document(&json!({"error": e.to_string()}))?;
            std::process::exit(1);
        }
    };

    tracing::debug!("running {} with {} args", command.name, args.len());
    print_document(&(command.run)(&client, args))
}

/// Invoked when the CLI is started with no command at all.
pub fn no_command() -> Result<()> {
    print_document(&json!({
        "error": "No command specified",
        "available_commands": queries::command_names(),
    }))?;
    std::process::exit(1);
}

fn print_document(document: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(document)?);
    Ok(())
}
