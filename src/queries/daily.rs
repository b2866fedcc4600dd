//! Mappers over the daily summary: `today`, `steps`, `hr`, `stress`,
//! and the seven-day `week` roll-up.
//!
//! Each mapper owns its failure boundary. Fetch and decode problems
//! become `error` fields in the output document instead of bubbling
//! up, and `today` runs its two fetches independently so a dead sleep
//! endpoint still leaves the stats half populated.

use chrono::{Duration, Local, NaiveDate};
use serde_json::{json, Map, Value};

use super::convert::{meters_to_km, nonzero, resolve_date, round1, seconds_to_hours};
use super::value::{no_data, ValueExt};
use crate::connect::ConnectClient;

/// Composite daily summary: steps, heart rate, sleep, stress, and
/// body battery in one document.
pub fn today(client: &ConnectClient, args: &[String]) -> Value {
    let date = resolve_date(args.first().map(String::as_str));
    build_today(
        date,
        client.daily_summary(date).map_err(|e| e.to_string()),
        client.sleep(date).map_err(|e| e.to_string()),
    )
}

fn build_today(
    date: NaiveDate,
    stats: Result<Value, String>,
    sleep: Result<Value, String>,
) -> Value {
    let mut doc = Map::new();
    doc.insert("date".into(), json!(date.to_string()));
    for key in [
        "steps",
        "heart_rate",
        "sleep",
        "stress",
        "body_battery",
        "calories",
        "active_minutes",
        "floors",
        "distance_km",
    ] {
        doc.insert(key.into(), Value::Null);
    }

    match stats {
        Ok(stats) => {
            doc.insert("steps".into(), stats.raw("totalSteps"));
            doc.insert("calories".into(), stats.raw("totalKilocalories"));
            doc.insert("active_minutes".into(), json!(active_minutes(&stats)));
            doc.insert("floors".into(), stats.raw("floorsAscended"));
            doc.insert(
                "distance_km".into(),
                json!(meters_to_km(nonzero(stats.f64_at("totalDistanceMeters")))),
            );
            doc.insert(
                "heart_rate".into(),
                json!({
                    "resting": stats.raw("restingHeartRate"),
                    "min": stats.raw("minHeartRate"),
                    "max": stats.raw("maxHeartRate"),
                }),
            );
            doc.insert(
                "stress".into(),
                json!({
                    "avg": stats.raw("averageStressLevel"),
                    "max": stats.raw("maxStressLevel"),
                }),
            );
            doc.insert(
                "body_battery".into(),
                json!({
                    "high": stats.raw("bodyBatteryHighestValue"),
                    "low": stats.raw("bodyBatteryLowestValue"),
                }),
            );
        }
        Err(e) => {
            doc.insert("stats_error".into(), json!(e));
        }
    }

    match sleep {
        Ok(payload) => {
            if let Some(dto) = payload.at("dailySleepDTO").filter(|dto| !no_data(dto)) {
                let hours = |key: &str| seconds_to_hours(dto.f64_at(key)).unwrap_or(0.0);
                doc.insert(
                    "sleep".into(),
                    json!({
                        "duration_hours": hours("sleepTimeSeconds"),
                        "quality": dto.raw("sleepScores.overall.value"),
                        "deep_hours": hours("deepSleepSeconds"),
                        "light_hours": hours("lightSleepSeconds"),
                        "rem_hours": hours("remSleepSeconds"),
                        "awake_hours": hours("awakeSleepSeconds"),
                    }),
                );
            }
        }
        Err(e) => {
            doc.insert("sleep_error".into(), json!(e));
        }
    }

    Value::Object(doc)
}

/// Watches report total active minutes directly; older devices only
/// report the moderate and vigorous intensity buckets.
fn active_minutes(stats: &Value) -> i64 {
    match stats.i64_at("activeMinutes") {
        Some(minutes) if minutes != 0 => minutes,
        _ => {
            stats.i64_at("moderateIntensityMinutes").unwrap_or(0)
                + stats.i64_at("vigorousIntensityMinutes").unwrap_or(0)
        }
    }
}

/// Step count, goal, and distance for one day.
pub fn steps(client: &ConnectClient, args: &[String]) -> Value {
    let date = resolve_date(args.first().map(String::as_str));
    build_steps(date, client.daily_summary(date).map_err(|e| e.to_string()))
}

fn build_steps(date: NaiveDate, stats: Result<Value, String>) -> Value {
    let stats = match stats {
        Ok(stats) => stats,
        Err(e) => return json!({"date": date.to_string(), "error": e}),
    };
    json!({
        "date": date.to_string(),
        "steps": stats.raw("totalSteps"),
        "goal": stats.raw("dailyStepGoal"),
        "distance_km": meters_to_km(nonzero(stats.f64_at("totalDistanceMeters"))),
    })
}

/// Resting, min, max, and average heart rate, plus zone times when the
/// detail endpoint has them.
pub fn hr(client: &ConnectClient, args: &[String]) -> Value {
    let date = resolve_date(args.first().map(String::as_str));
    let stats = client.daily_summary(date).map_err(|e| e.to_string());
    let zones = if stats.is_ok() {
        match client.heart_rates(date) {
            Ok(payload) => Some(payload),
            Err(e) => {
                // Zone detail is a bonus; its endpoint failing does not
                // fail the command.
                tracing::debug!("skipping heart rate zone detail: {e}");
                None
            }
        }
    } else {
        None
    };
    build_hr(date, stats, zones)
}

fn build_hr(date: NaiveDate, stats: Result<Value, String>, zones: Option<Value>) -> Value {
    let stats = match stats {
        Ok(stats) => stats,
        Err(e) => return json!({"date": date.to_string(), "error": e}),
    };
    let mut doc = Map::new();
    doc.insert("date".into(), json!(date.to_string()));
    doc.insert("resting".into(), stats.raw("restingHeartRate"));
    doc.insert("min".into(), stats.raw("minHeartRate"));
    doc.insert("max".into(), stats.raw("maxHeartRate"));
    doc.insert("avg".into(), stats.raw("averageHeartRate"));
    if let Some(detail) = zones.filter(|payload| !no_data(payload)) {
        doc.insert("time_in_zones".into(), detail.raw("heartRateTimeInZones"));
    }
    Value::Object(doc)
}

/// Stress levels and body battery movement for one day.
pub fn stress(client: &ConnectClient, args: &[String]) -> Value {
    let date = resolve_date(args.first().map(String::as_str));
    build_stress(date, client.daily_summary(date).map_err(|e| e.to_string()))
}

fn build_stress(date: NaiveDate, stats: Result<Value, String>) -> Value {
    let stats = match stats {
        Ok(stats) => stats,
        Err(e) => return json!({"date": date.to_string(), "error": e}),
    };
    json!({
        "date": date.to_string(),
        "avg_stress": stats.raw("averageStressLevel"),
        "max_stress": stats.raw("maxStressLevel"),
        "stress_qualifier": stats.raw("stressQualifier"),
        "body_battery_high": stats.raw("bodyBatteryHighestValue"),
        "body_battery_low": stats.raw("bodyBatteryLowestValue"),
        "body_battery_charged": stats.raw("bodyBatteryChargedValue"),
        "body_battery_drained": stats.raw("bodyBatteryDrainedValue"),
    })
}

/// Roll-up of the seven days preceding today, walked oldest to newest.
pub fn week(client: &ConnectClient, _args: &[String]) -> Value {
    let end = Local::now().date_naive();
    let start = end - Duration::days(7);
    let fetched = (0..7)
        .map(|offset| {
            let day = start + Duration::days(offset);
            (day, client.daily_summary(day).map_err(|e| e.to_string()))
        })
        .collect();
    build_week(start, end, fetched)
}

fn build_week(
    start: NaiveDate,
    end: NaiveDate,
    fetched: Vec<(NaiveDate, Result<Value, String>)>,
) -> Value {
    let mut days = Vec::new();
    let mut total_steps: i64 = 0;
    let mut total_calories = 0.0;
    let mut total_active_min: i64 = 0;
    let mut total_distance_m = 0.0;

    for (day, outcome) in fetched {
        let stats = match outcome {
            Ok(stats) => stats,
            Err(e) => {
                tracing::debug!("dropping {day} from weekly summary: {e}");
                continue;
            }
        };
        let steps = stats.i64_at("totalSteps").unwrap_or(0);
        let calories = stats.f64_at("totalKilocalories").unwrap_or(0.0);
        let active = stats.i64_at("moderateIntensityMinutes").unwrap_or(0)
            + stats.i64_at("vigorousIntensityMinutes").unwrap_or(0);

        total_steps += steps;
        total_calories += calories;
        total_active_min += active;
        total_distance_m += stats.f64_at("totalDistanceMeters").unwrap_or(0.0);

        days.push(json!({
            "date": day.to_string(),
            "steps": steps,
            "calories": calories,
            "active_min": active,
        }));
    }

    json!({
        "period": format!("{start} to {end}"),
        "days": days,
        "totals": {
            "steps": total_steps,
            // Averaged over the full 7-day window, not over the days
            // that survived fetching.
            "avg_steps": total_steps / 7,
            "calories": total_calories,
            "active_minutes": total_active_min,
            "distance_km": round1(total_distance_m / 1000.0),
        },
    })
}
