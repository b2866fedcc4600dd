//! Query registry and the mappers behind it.
//!
//! Every read-only query is one entry in a static table: a canonical
//! name, the aliases accepted on the command line, and a mapper that
//! fetches the backing Connect resource and reduces it to one flat
//! JSON document. Mappers never fail; fetch and decode problems
//! surface as `error` fields inside the document they return.

pub mod activities;
pub mod convert;
pub mod daily;
pub mod profile;
pub mod training;
pub mod value;
pub mod wellness;

use serde_json::{json, Map, Value};

use crate::connect::ConnectClient;

/// A mapper reduces fetched Connect data to one JSON document.
pub type QueryFn = fn(&ConnectClient, &[String]) -> Value;

/// One entry in the query registry.
pub struct QueryCommand {
    /// Canonical command name.
    pub name: &'static str,
    /// Alternate names accepted on the command line.
    pub aliases: &'static [&'static str],
    /// Usage line shown in the help catalog.
    pub usage: &'static str,
    /// One-line description shown in the help catalog.
    pub about: &'static str,
    /// The mapper behind the command.
    pub run: QueryFn,
}

/// Every query command, in help-catalog order.
pub const COMMANDS: &[QueryCommand] = &[
    QueryCommand {
        name: "today",
        aliases: &[],
        usage: "today [date]",
        about: "Daily summary (steps, HR, sleep, stress)",
        run: daily::today,
    },
    QueryCommand {
        name: "steps",
        aliases: &[],
        usage: "steps [date]",
        about: "Step count and distance",
        run: daily::steps,
    },
    QueryCommand {
        name: "hr",
        aliases: &["heart"],
        usage: "hr [date]",
        about: "Heart rate data",
        run: daily::hr,
    },
    QueryCommand {
        name: "hrv",
        aliases: &[],
        usage: "hrv [date]",
        about: "Heart rate variability",
        run: wellness::hrv,
    },
    QueryCommand {
        name: "sleep",
        aliases: &[],
        usage: "sleep [date]",
        about: "Detailed sleep data",
        run: wellness::sleep,
    },
    QueryCommand {
        name: "stress",
        aliases: &[],
        usage: "stress [date]",
        about: "Stress and body battery",
        run: daily::stress,
    },
    QueryCommand {
        name: "body",
        aliases: &["weight"],
        usage: "body",
        about: "Body composition (weight, BMI, body fat)",
        run: wellness::body,
    },
    QueryCommand {
        name: "activities",
        aliases: &[],
        usage: "activities [limit]",
        about: "Recent activities",
        run: activities::activities,
    },
    QueryCommand {
        name: "activity",
        aliases: &[],
        usage: "activity <id>",
        about: "Detailed activity data",
        run: activities::activity,
    },
    QueryCommand {
        name: "running",
        aliases: &["runs"],
        usage: "running [limit]",
        about: "Recent running activities",
        run: activities::running,
    },
    QueryCommand {
        name: "training",
        aliases: &[],
        usage: "training",
        about: "Training status and load",
        run: training::training,
    },
    QueryCommand {
        name: "readiness",
        aliases: &[],
        usage: "readiness [date]",
        about: "Training readiness score",
        run: training::readiness,
    },
    QueryCommand {
        name: "vo2max",
        aliases: &["vo2"],
        usage: "vo2max",
        about: "VO2 Max history",
        run: training::vo2max,
    },
    QueryCommand {
        name: "race",
        aliases: &["predictions"],
        usage: "race",
        about: "Race time predictions",
        run: training::race,
    },
    QueryCommand {
        name: "devices",
        aliases: &[],
        usage: "devices",
        about: "Connected devices",
        run: profile::devices,
    },
    QueryCommand {
        name: "week",
        aliases: &["weekly"],
        usage: "week",
        about: "Weekly summary",
        run: daily::week,
    },
    QueryCommand {
        name: "badges",
        aliases: &[],
        usage: "badges",
        about: "Earned badges",
        run: profile::badges,
    },
    QueryCommand {
        name: "records",
        aliases: &["pr"],
        usage: "records",
        about: "Personal records",
        run: profile::records,
    },
    QueryCommand {
        name: "spo2",
        aliases: &["oxygen"],
        usage: "spo2 [date]",
        about: "Blood oxygen data",
        run: wellness::spo2,
    },
    QueryCommand {
        name: "respiration",
        aliases: &["breathing"],
        usage: "respiration [date]",
        about: "Breathing rate",
        run: wellness::respiration,
    },
    QueryCommand {
        name: "hydration",
        aliases: &["water"],
        usage: "hydration [date]",
        about: "Water intake",
        run: wellness::hydration,
    },
];

/// Looks up a command by name or alias, case-insensitively.
pub fn find(name: &str) -> Option<&'static QueryCommand> {
    let name = name.to_lowercase();
    COMMANDS
        .iter()
        .find(|command| command.name == name || command.aliases.contains(&name.as_str()))
}

/// Every accepted command name and alias, sorted.
pub fn command_names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = COMMANDS
        .iter()
        .flat_map(|command| std::iter::once(command.name).chain(command.aliases.iter().copied()))
        .collect();
    names.sort_unstable();
    names
}

/// The `help` document: usage line and description for every command.
pub fn help_catalog() -> Value {
    let mut catalog = Map::new();
    for command in COMMANDS {
        catalog.insert(command.usage.to_string(), json!(command.about));
    }
    json!({"commands": catalog})
}
