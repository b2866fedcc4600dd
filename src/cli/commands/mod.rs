//! CLI commands for Vitals.
//!
//! Each submodule implements a single CLI command with its argument
//! parsing and execution logic.

/// Authenticate with Garmin Connect and store a session.
pub mod login;

/// Remove the stored Garmin Connect session.
pub mod logout;

/// Dispatch a query from the registry and print its JSON document.
pub mod query;
