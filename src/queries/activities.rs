//! Activity mappers: the recent list, single-activity detail, and the
//! running-focused view.

use chrono::{Duration, Local};
use serde_json::{json, Map, Value};

use super::convert::{meters_to_km, nonzero, pace_min_km, round2, seconds_to_minutes};
use super::value::{no_data, ValueExt};
use crate::connect::ConnectClient;

/// Activities returned by `activities` when no limit is given.
const DEFAULT_ACTIVITY_LIMIT: u32 = 5;

/// Runs returned by `running` when no limit is given.
const DEFAULT_RUN_LIMIT: usize = 10;

/// How far back `running` scans for runs.
const RUN_WINDOW_DAYS: i64 = 90;

/// Parses a numeric limit argument. Anything unparseable falls back
/// to the default, same as malformed dates fall back to today.
fn parse_limit<T: std::str::FromStr>(args: &[String], default: T) -> T {
    let Some(raw) = args.first() else {
        return default;
    };
    match raw.parse() {
        Ok(limit) => limit,
        Err(_) => {
            tracing::debug!("ignoring malformed limit {raw:?}");
            default
        }
    }
}

/// Most recent activities of any type, newest first.
pub fn activities(client: &ConnectClient, args: &[String]) -> Value {
    let limit = parse_limit(args, DEFAULT_ACTIVITY_LIMIT);
    build_activities(client.activities(0, limit).map_err(|e| e.to_string()))
}

fn build_activities(payload: Result<Value, String>) -> Value {
    let payload = match payload {
        Ok(payload) => payload,
        Err(e) => return json!({"error": e}),
    };
    let entries: Vec<Value> = payload
        .as_array()
        .map(|acts| acts.iter().map(activity_entry).collect())
        .unwrap_or_default();
    json!({"activities": entries})
}

fn activity_entry(act: &Value) -> Value {
    json!({
        "id": act.raw("activityId"),
        "name": act.raw("activityName"),
        "type": act.raw("activityType.typeKey"),
        "date": act.raw("startTimeLocal"),
        "duration_min": seconds_to_minutes(act.f64_at("duration")).unwrap_or(0.0),
        "distance_km": meters_to_km(nonzero(act.f64_at("distance"))),
        "calories": act.raw("calories"),
        "avg_hr": act.raw("averageHR"),
        "max_hr": act.raw("maxHR"),
        "avg_pace_min_km": nonzero(act.f64_at("averageSpeed"))
            .map(|speed| round2(1000.0 / speed / 60.0)),
    })
}

/// Full detail for one activity by id.
pub fn activity(client: &ConnectClient, args: &[String]) -> Value {
    // The id check runs before any fetch.
    let Some(id) = args.first() else {
        return json!({"error": "Activity ID required"});
    };
    build_activity(client.activity(id).map_err(|e| e.to_string()))
}

fn build_activity(payload: Result<Value, String>) -> Value {
    let act = match payload {
        Ok(payload) => payload,
        Err(e) => return json!({"error": e}),
    };
    let mut doc = Map::new();
    doc.insert("id".into(), act.raw("activityId"));
    doc.insert("name".into(), act.raw("activityName"));
    doc.insert("type".into(), act.raw("activityType.typeKey"));
    doc.insert("date".into(), act.raw("startTimeLocal"));
    doc.insert(
        "duration_min".into(),
        json!(seconds_to_minutes(act.f64_at("duration")).unwrap_or(0.0)),
    );
    doc.insert(
        "distance_km".into(),
        json!(meters_to_km(nonzero(act.f64_at("distance")))),
    );
    doc.insert("elevation_gain_m".into(), act.raw("elevationGain"));
    doc.insert("calories".into(), act.raw("calories"));
    doc.insert("avg_hr".into(), act.raw("averageHR"));
    doc.insert("max_hr".into(), act.raw("maxHR"));
    doc.insert(
        "avg_cadence".into(),
        act.raw("averageRunningCadenceInStepsPerMinute"),
    );
    doc.insert("avg_stride_length_m".into(), act.raw("avgStrideLength"));
    doc.insert(
        "training_effect_aerobic".into(),
        act.raw("aerobicTrainingEffect"),
    );
    doc.insert(
        "training_effect_anaerobic".into(),
        act.raw("anaerobicTrainingEffect"),
    );
    doc.insert("vo2max_running".into(), act.raw("vO2MaxValue"));
    if let Some(pace) = pace_min_km(act.f64_at("averageSpeed")) {
        doc.insert("avg_pace".into(), json!(pace));
    }
    if let Some(zones) = act.at("hrZones").filter(|zones| !no_data(zones)) {
        doc.insert("hr_zones".into(), zones.clone());
    }
    Value::Object(doc)
}

/// Recent runs from the last three months.
pub fn running(client: &ConnectClient, args: &[String]) -> Value {
    let limit = parse_limit(args, DEFAULT_RUN_LIMIT);
    let end = Local::now().date_naive();
    let start = end - Duration::days(RUN_WINDOW_DAYS);
    build_running(
        limit,
        client
            .activities_by_date(start, end, "running")
            .map_err(|e| e.to_string()),
    )
}

fn build_running(limit: usize, payload: Result<Value, String>) -> Value {
    let payload = match payload {
        Ok(payload) => payload,
        Err(e) => return json!({"error": e}),
    };
    let runs: Vec<Value> = payload
        .as_array()
        .map(|acts| acts.iter().take(limit).map(run_entry).collect())
        .unwrap_or_default();
    json!({"count": runs.len(), "runs": runs})
}

fn run_entry(act: &Value) -> Value {
    json!({
        "id": act.raw("activityId"),
        "name": act.raw("activityName"),
        "date": act.raw("startTimeLocal"),
        "distance_km": meters_to_km(nonzero(act.f64_at("distance"))),
        "duration_min": seconds_to_minutes(act.f64_at("duration")).unwrap_or(0.0),
        "avg_pace": pace_min_km(act.f64_at("averageSpeed")),
        "avg_hr": act.raw("averageHR"),
        "max_hr": act.raw("maxHR"),
        "calories": act.raw("calories"),
        "cadence": act.raw("averageRunningCadenceInStepsPerMinute"),
        "elevation_gain": act.raw("elevationGain"),
        "training_effect": act.raw("aerobicTrainingEffect"),
    })
}
