//! Training metric mappers: status, readiness, VO2 max, and race
//! predictions.

use chrono::{Duration, Local, NaiveDate};
use serde_json::{json, Map, Value};

use super::convert::resolve_date;
use super::value::{no_data, ValueExt};
use crate::connect::ConnectClient;

/// How far back `vo2max` scans for max-metrics entries.
const VO2_WINDOW_DAYS: i64 = 365;

/// Aggregated training status and load for today.
pub fn training(client: &ConnectClient, _args: &[String]) -> Value {
    let today = Local::now().date_naive();
    build_training(
        today,
        client.training_status(today).map_err(|e| e.to_string()),
    )
}

fn build_training(date: NaiveDate, payload: Result<Value, String>) -> Value {
    let payload = match payload {
        Ok(payload) => payload,
        Err(e) => return json!({"error": e}),
    };
    let mut doc = Map::new();
    doc.insert("date".into(), json!(date.to_string()));
    if !no_data(&payload) {
        doc.insert("training_load".into(), payload.raw("trainingLoad7Day"));
        doc.insert(
            "training_load_balance".into(),
            payload.raw("trainingLoadBalance"),
        );
        doc.insert("training_status".into(), payload.raw("trainingStatus"));
        doc.insert("vo2max_running".into(), payload.raw("vo2MaxPreciseValue"));
        doc.insert(
            "lactate_threshold_hr".into(),
            payload.raw("lactateThresholdHeartRate"),
        );
    }
    Value::Object(doc)
}

/// Training readiness score and its inputs for one day.
pub fn readiness(client: &ConnectClient, args: &[String]) -> Value {
    let date = resolve_date(args.first().map(String::as_str));
    build_readiness(
        date,
        client.training_readiness(date).map_err(|e| e.to_string()),
    )
}

fn build_readiness(date: NaiveDate, payload: Result<Value, String>) -> Value {
    let payload = match payload {
        Ok(payload) => payload,
        Err(e) => return json!({"date": date.to_string(), "error": e}),
    };
    // The endpoint has answered with both a bare object and a
    // one-element array over service versions.
    let entry = match &payload {
        Value::Array(items) => items.first(),
        other if !no_data(other) => Some(other),
        _ => None,
    };
    let Some(entry) = entry else {
        return json!({"date": date.to_string(), "error": "No training readiness data"});
    };
    json!({
        "date": date.to_string(),
        "score": entry.raw("score"),
        "level": entry.raw("level"),
        "sleep_score": entry.raw("sleepScore"),
        "recovery_score": entry.raw("recoveryScore"),
        "hrv_score": entry.raw("hrvScore"),
        "stress_score": entry.raw("stressScore"),
        "training_load_score": entry.raw("trainingLoadScore"),
    })
}

/// Latest VO2 max estimates from the past year of max-metrics entries.
pub fn vo2max(client: &ConnectClient, _args: &[String]) -> Value {
    let end = Local::now().date_naive();
    let start = end - Duration::days(VO2_WINDOW_DAYS);
    build_vo2max(client.max_metrics(start, end).map_err(|e| e.to_string()))
}

fn build_vo2max(payload: Result<Value, String>) -> Value {
    let payload = match payload {
        Ok(payload) => payload,
        Err(e) => return json!({"error": e}),
    };
    let Some(latest) = latest_metrics(&payload) else {
        return json!({"error": "No VO2 Max data available"});
    };
    json!({
        "vo2max_running": latest.raw("generic.vo2MaxPreciseValue"),
        "vo2max_cycling": latest.raw("cycling.vo2MaxPreciseValue"),
        "fitness_age": latest.raw("generic.fitnessAge"),
        "updated": latest.raw("calendarDate"),
    })
}

/// Picks the metrics entry to report. The payload has shipped as
/// `{"maxMetricsDTO": {...}}`, `{"maxMetricsDTO": [...]}`, and as a
/// bare top-level array depending on endpoint vintage.
fn latest_metrics(payload: &Value) -> Option<&Value> {
    match payload.at("maxMetricsDTO") {
        Some(Value::Array(items)) => items.first(),
        Some(entry) if !no_data(entry) => Some(entry),
        _ => match payload {
            Value::Array(items) => items.first(),
            _ => None,
        },
    }
}

/// Predicted race times from 5K to marathon.
pub fn race(client: &ConnectClient, _args: &[String]) -> Value {
    build_race(client.race_predictions().map_err(|e| e.to_string()))
}

fn build_race(payload: Result<Value, String>) -> Value {
    let payload = match payload {
        Ok(payload) => payload,
        Err(e) => return json!({"error": e}),
    };
    if no_data(&payload) {
        return json!({"error": "No race predictions available"});
    }
    json!({
        "5k": payload.raw("racePredictions.5k.time"),
        "10k": payload.raw("racePredictions.10k.time"),
        "half_marathon": payload.raw("racePredictions.halfMarathon.time"),
        "marathon": payload.raw("racePredictions.marathon.time"),
    })
}
