//! Account mappers: registered devices, earned badges, and personal
//! records.

use serde_json::{json, Value};

use super::value::ValueExt;
use crate::connect::ConnectClient;

/// Most recent badges listed by `badges`.
const BADGE_LIMIT: usize = 20;

/// Registered devices with battery and sync state.
pub fn devices(client: &ConnectClient, _args: &[String]) -> Value {
    build_devices(client.devices().map_err(|e| e.to_string()))
}

fn build_devices(payload: Result<Value, String>) -> Value {
    let payload = match payload {
        Ok(payload) => payload,
        Err(e) => return json!({"error": e}),
    };
    let entries: Vec<Value> = payload
        .as_array()
        .map(|devices| devices.iter().map(device_entry).collect())
        .unwrap_or_default();
    json!({"devices": entries})
}

fn device_entry(device: &Value) -> Value {
    // Watches carry a user-set name; other hardware only has the
    // product display name.
    let name = match device.str_at("deviceName") {
        Some(name) if !name.is_empty() => json!(name),
        _ => device.raw("productDisplayName"),
    };
    json!({
        "id": device.raw("deviceId"),
        "name": name,
        "type": device.raw("deviceTypeName"),
        "battery": device.raw("batteryLevel"),
        "last_sync": device.raw("lastSyncTimestampGMT"),
    })
}

/// Earned badges, most recent first.
pub fn badges(client: &ConnectClient, _args: &[String]) -> Value {
    build_badges(client.earned_badges().map_err(|e| e.to_string()))
}

fn build_badges(payload: Result<Value, String>) -> Value {
    let payload = match payload {
        Ok(payload) => payload,
        Err(e) => return json!({"error": e}),
    };
    let entries: Vec<Value> = payload
        .as_array()
        .map(|badges| badges.iter().take(BADGE_LIMIT).map(badge_entry).collect())
        .unwrap_or_default();
    json!({"badges": entries})
}

fn badge_entry(badge: &Value) -> Value {
    json!({
        "name": badge.raw("badgeName"),
        "earned_date": badge.raw("badgeEarnedDate"),
        "points": badge.raw("badgePoints"),
    })
}

/// Personal records across all activity types.
pub fn records(client: &ConnectClient, _args: &[String]) -> Value {
    build_records(client.personal_records().map_err(|e| e.to_string()))
}

fn build_records(payload: Result<Value, String>) -> Value {
    let payload = match payload {
        Ok(payload) => payload,
        Err(e) => return json!({"error": e}),
    };
    let entries: Vec<Value> = payload
        .as_array()
        .map(|records| records.iter().map(record_entry).collect())
        .unwrap_or_default();
    json!({"records": entries})
}

fn record_entry(record: &Value) -> Value {
    json!({
        "type": record.raw("typeKey"),
        "value": record.raw("value"),
        "activity_id": record.raw("activityId"),
        "date": record.raw("prStartTimeGMT"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_devices_prefers_user_set_name() {
        let payload = json!([
            {
                "deviceId": 311,
                "deviceName": "Chris's Forerunner",
                "productDisplayName": "Forerunner 965",
                "deviceTypeName": "watch",
                "batteryLevel": 71,
                "lastSyncTimestampGMT": "2026-08-01T05:12:00.0",
            },
            {
                "deviceId": 412,
                "deviceName": "",
                "productDisplayName": "Index S2",
                "deviceTypeName": "scale",
            },
        ]);
        let doc = build_devices(Ok(payload));
        let devices = doc["devices"].as_array().unwrap();
        assert_eq!(devices[0]["name"], json!("Chris's Forerunner"));
        assert_eq!(devices[0]["battery"], json!(71));
        assert_eq!(devices[1]["name"], json!("Index S2"));
        assert!(devices[1]["battery"].is_null());
    }

    #[test]
    fn test_devices_empty_payload() {
        assert_eq!(build_devices(Ok(json!([]))), json!({"devices": []}));
        assert_eq!(build_devices(Ok(Value::Null)), json!({"devices": []}));
    }

    #[test]
    fn test_badges_truncates_to_limit() {
        let badges: Vec<Value> = (0..25)
            .map(|i| {
                json!({
                    "badgeName": format!("Badge {i}"),
                    "badgeEarnedDate": "2026-07-01",
                    "badgePoints": 1,
                })
            })
            .collect();
        let doc = build_badges(Ok(json!(badges)));
        let listed = doc["badges"].as_array().unwrap();
        assert_eq!(listed.len(), 20);
        assert_eq!(listed[0]["name"], json!("Badge 0"));
    }

    #[test]
    fn test_records_maps_fields() {
        let payload = json!([
            {
                "typeKey": "1km",
                "value": 212.4,
                "activityId": 19283746,
                "prStartTimeGMT": 1753900000000i64,
            },
        ]);
        let doc = build_records(Ok(payload));
        assert_eq!(doc["records"][0]["type"], json!("1km"));
        assert_eq!(doc["records"][0]["value"], json!(212.4));
        assert_eq!(doc["records"][0]["activity_id"], json!(19283746));
    }

    #[test]
    fn test_fetch_failures_surface_as_error_docs() {
        assert_eq!(
            build_badges(Err("timed out".to_string())),
            json!({"error": "timed out"})
        );
        assert_eq!(
            build_records(Err("502".to_string())),
            json!({"error": "502"})
        );
    }
}
