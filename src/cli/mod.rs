//! Command-line interface for Vitals.
//!
//! Two interactive commands (`login`, `logout`) manage the stored
//! Garmin Connect session; every other invocation is dispatched
//! through the query registry and prints a single JSON document.

/// Individual CLI command implementations.
pub mod commands;
