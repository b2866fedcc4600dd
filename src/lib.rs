//! Vitals - Garmin Connect health data from the command line
//!
//! Vitals authenticates against Garmin Connect and exposes read-only
//! health, fitness, and training queries, each printed as one JSON
//! document on stdout.

pub mod config;
pub mod connect;
pub mod queries;
