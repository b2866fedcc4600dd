//! Wellness mappers: sleep detail, HRV, body composition, pulse ox,
//! respiration, and hydration.

use chrono::{Duration, Local, NaiveDate};
use serde_json::{json, Map, Value};

use super::convert::{grams_to_kg, nonzero, resolve_date, seconds_to_hours};
use super::value::{no_data, ValueExt};
use crate::connect::ConnectClient;

/// How far back `body` scans for a weigh-in.
const WEIGH_IN_WINDOW_DAYS: i64 = 30;

/// Sleep stages, scores, and overnight averages for one night.
pub fn sleep(client: &ConnectClient, args: &[String]) -> Value {
    let date = resolve_date(args.first().map(String::as_str));
    build_sleep(date, client.sleep(date).map_err(|e| e.to_string()))
}

fn build_sleep(date: NaiveDate, payload: Result<Value, String>) -> Value {
    let payload = match payload {
        Ok(payload) => payload,
        Err(e) => return json!({"date": date.to_string(), "error": e}),
    };
    let Some(dto) = payload.at("dailySleepDTO").filter(|dto| !no_data(dto)) else {
        return json!({"date": date.to_string(), "error": "No sleep data available"});
    };
    let hours = |key: &str| seconds_to_hours(dto.f64_at(key)).unwrap_or(0.0);
    json!({
        "date": date.to_string(),
        "duration_hours": hours("sleepTimeSeconds"),
        "quality_score": dto.raw("sleepScores.overall.value"),
        "quality_qualifier": dto.raw("sleepScores.overall.qualifierKey"),
        "deep_hours": hours("deepSleepSeconds"),
        "light_hours": hours("lightSleepSeconds"),
        "rem_hours": hours("remSleepSeconds"),
        "awake_hours": hours("awakeSleepSeconds"),
        "avg_spo2": dto.raw("avgOxygenSaturation"),
        "avg_respiration": dto.raw("avgRespirationValue"),
        "avg_stress": dto.raw("avgSleepStress"),
        "sleep_start": dto.raw("sleepStartTimestampLocal"),
        "sleep_end": dto.raw("sleepEndTimestampLocal"),
    })
}

/// Overnight heart rate variability against the personal baseline.
pub fn hrv(client: &ConnectClient, args: &[String]) -> Value {
    let date = resolve_date(args.first().map(String::as_str));
    build_hrv(date, client.hrv(date).map_err(|e| e.to_string()))
}

fn build_hrv(date: NaiveDate, payload: Result<Value, String>) -> Value {
    let payload = match payload {
        Ok(payload) => payload,
        Err(e) => return json!({"date": date.to_string(), "error": e}),
    };
    if no_data(&payload) {
        return json!({"date": date.to_string(), "error": "No HRV data available"});
    }
    json!({
        "date": date.to_string(),
        "hrv_weekly_avg": payload.raw("hrvSummary.weeklyAvg"),
        "hrv_last_night": payload.raw("hrvSummary.lastNight"),
        "hrv_baseline": payload.raw("hrvSummary.baseline"),
        "status": payload.raw("hrvSummary.status"),
    })
}

/// Most recent body composition reading in the weigh-in window.
pub fn body(client: &ConnectClient, _args: &[String]) -> Value {
    let end = Local::now().date_naive();
    let start = end - Duration::days(WEIGH_IN_WINDOW_DAYS);
    build_body(end, client.weigh_ins(start, end).map_err(|e| e.to_string()))
}

fn build_body(end: NaiveDate, payload: Result<Value, String>) -> Value {
    let payload = match payload {
        Ok(payload) => payload,
        Err(e) => return json!({"error": e}),
    };
    let mut doc = Map::new();
    doc.insert("date".into(), json!(end.to_string()));

    // Daily summaries come newest first; the first entry's latest
    // weigh-in is the freshest reading in the window.
    let latest = payload
        .at("dailyWeightSummaries")
        .and_then(|summaries| summaries.get(0))
        .map(|summary| summary.raw("latestWeight"));

    if let Some(latest) = latest {
        doc.insert(
            "weight_kg".into(),
            json!(grams_to_kg(nonzero(latest.f64_at("weight")))),
        );
        doc.insert("bmi".into(), latest.raw("bmi"));
        doc.insert("body_fat_pct".into(), latest.raw("bodyFat"));
        doc.insert(
            "muscle_mass_kg".into(),
            json!(grams_to_kg(nonzero(latest.f64_at("muscleMass")))),
        );
        doc.insert(
            "bone_mass_kg".into(),
            json!(grams_to_kg(nonzero(latest.f64_at("boneMass")))),
        );
        doc.insert("body_water_pct".into(), latest.raw("bodyWater"));
    }

    Value::Object(doc)
}

/// Pulse oximetry summary for one day.
pub fn spo2(client: &ConnectClient, args: &[String]) -> Value {
    let date = resolve_date(args.first().map(String::as_str));
    build_spo2(date, client.spo2(date).map_err(|e| e.to_string()))
}

fn build_spo2(date: NaiveDate, payload: Result<Value, String>) -> Value {
    let payload = match payload {
        Ok(payload) => payload,
        Err(e) => return json!({"date": date.to_string(), "error": e}),
    };
    if no_data(&payload) {
        return json!({"date": date.to_string(), "error": "No SpO2 data available"});
    }
    json!({
        "date": date.to_string(),
        "avg_spo2": payload.raw("averageSpO2"),
        "min_spo2": payload.raw("lowestSpO2"),
        "max_spo2": payload.raw("highestSpO2"),
    })
}

/// Waking respiration rate summary for one day.
pub fn respiration(client: &ConnectClient, args: &[String]) -> Value {
    let date = resolve_date(args.first().map(String::as_str));
    build_respiration(date, client.respiration(date).map_err(|e| e.to_string()))
}

fn build_respiration(date: NaiveDate, payload: Result<Value, String>) -> Value {
    let payload = match payload {
        Ok(payload) => payload,
        Err(e) => return json!({"date": date.to_string(), "error": e}),
    };
    if no_data(&payload) {
        return json!({"date": date.to_string(), "error": "No respiration data available"});
    }
    json!({
        "date": date.to_string(),
        "avg_breaths_per_min": payload.raw("avgWakingRespirationValue"),
        "min_breaths": payload.raw("lowestRespirationValue"),
        "max_breaths": payload.raw("highestRespirationValue"),
    })
}

/// Water intake against the daily goal.
pub fn hydration(client: &ConnectClient, args: &[String]) -> Value {
    let date = resolve_date(args.first().map(String::as_str));
    build_hydration(date, client.hydration(date).map_err(|e| e.to_string()))
}

fn build_hydration(date: NaiveDate, payload: Result<Value, String>) -> Value {
    let payload = match payload {
        Ok(payload) => payload,
        Err(e) => return json!({"date": date.to_string(), "error": e}),
    };
    if no_data(&payload) {
        return json!({"date": date.to_string(), "error": "No hydration data available"});
    }
    json!({
        "date": date.to_string(),
        "intake_ml": payload.raw("intakeGoalInMilliliters"),
        "goal_ml": payload.raw("dailyGoalInMilliliters"),
        "sweat_loss_ml": payload.raw("sweatLossInMilliliters"),
    })
}
