//! HTTP client for the Garmin Connect API.
//!
//! Provides the `ConnectClient` used by every query command. Each
//! method maps to one Connect resource and returns the raw response as
//! untyped JSON; Garmin does not guarantee payload shapes, so field
//! extraction is left to the query layer.

use chrono::NaiveDate;
use reqwest::blocking::Client;
use serde_json::Value;
use std::time::Duration;

use super::session::{SessionTokens, TokenStore};
use super::{ConnectError, USER_AGENT};
use crate::config::Config;

/// Timeout for establishing a connection.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for the entire request including response.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Authenticated client for the Connect API.
///
/// Several Connect resources key their URLs by the account's display
/// name, so construction is two-phase: build with a token bundle, then
/// `verify` against the social profile to learn the display name.
/// `acquire` performs both steps from the persisted session.
pub struct ConnectClient {
    /// HTTP client instance.
    http: Client,
    /// Base URL of the Connect API.
    base_url: String,
    /// OAuth2 bearer token.
    access_token: String,
    /// Account display name, filled in by `verify`.
    display_name: String,
}

impl ConnectClient {
    /// Acquires a verified session from the persisted token bundle.
    ///
    /// Fails with `NotLoggedIn` when no bundle exists, and with
    /// `SessionInvalid` when the bundle is expired or rejected by the
    /// service; both direct the user to the login flow.
    pub fn acquire() -> Result<Self, ConnectError> {
        let config = Config::load().map_err(|e| ConnectError::Config(e.to_string()))?;
        let store = TokenStore::new()?;
        let tokens = store.load()?.ok_or(ConnectError::NotLoggedIn)?;

        if tokens.is_expired() {
            return Err(ConnectError::SessionInvalid(
                "OAuth token expired".to_string(),
            ));
        }

        let mut client = Self::with_session(&tokens, &config)?;
        client.verify()?;
        Ok(client)
    }

    /// Builds an unverified client from a token bundle.
    pub fn with_session(tokens: &SessionTokens, config: &Config) -> Result<Self, ConnectError> {
        let http = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            http,
            base_url: config.connect_base_url(),
            access_token: tokens.access_token.clone(),
            display_name: String::new(),
        })
    }

    /// Verifies the session by fetching the social profile.
    ///
    /// Captures the account display name and returns the profile so
    /// callers can report who is logged in.
    pub fn verify(&mut self) -> Result<Value, ConnectError> {
        let profile = self
            .get("/userprofile-service/socialProfile", &[])
            .map_err(|e| ConnectError::SessionInvalid(e.to_string()))?;

        let name = profile
            .get("displayName")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                ConnectError::SessionInvalid("profile response missing displayName".to_string())
            })?;

        self.display_name = name.to_string();
        Ok(profile)
    }

    /// Returns the configured base URL.
    #[allow(dead_code)]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the account display name (empty before `verify`).
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    // ==================== Connect resources ====================

    /// Daily summary stats (steps, calories, heart rate, stress, body battery).
    pub fn daily_summary(&self, date: NaiveDate) -> Result<Value, ConnectError> {
        self.get(
            &format!("/usersummary-service/usersummary/daily/{}", self.display_name),
            &[("calendarDate", date.to_string())],
        )
    }

    /// Detailed heart rate samples and zone times for one day.
    pub fn heart_rates(&self, date: NaiveDate) -> Result<Value, ConnectError> {
        self.get(
            &format!("/wellness-service/wellness/dailyHeartRate/{}", self.display_name),
            &[("date", date.to_string())],
        )
    }

    /// Sleep detail for one night.
    pub fn sleep(&self, date: NaiveDate) -> Result<Value, ConnectError> {
        self.get(
            &format!("/wellness-service/wellness/dailySleepData/{}", self.display_name),
            &[
                ("date", date.to_string()),
                ("nonSleepBufferMinutes", "60".to_string()),
            ],
        )
    }

    /// Heart rate variability summary for one day.
    pub fn hrv(&self, date: NaiveDate) -> Result<Value, ConnectError> {
        self.get(&format!("/hrv-service/hrv/{date}"), &[])
    }

    /// Weigh-ins recorded in a date range.
    pub fn weigh_ins(&self, start: NaiveDate, end: NaiveDate) -> Result<Value, ConnectError> {
        self.get(
            &format!("/weight-service/weight/range/{start}/{end}"),
            &[("includeAll", "true".to_string())],
        )
    }

    /// Recent activities, newest first.
    pub fn activities(&self, start: u32, limit: u32) -> Result<Value, ConnectError> {
        self.get(
            "/activitylist-service/activities/search/activities",
            &[
                ("start", start.to_string()),
                ("limit", limit.to_string()),
            ],
        )
    }

    /// Activities in a date range, optionally filtered by type.
    pub fn activities_by_date(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        activity_type: &str,
    ) -> Result<Value, ConnectError> {
        self.get(
            "/activitylist-service/activities/search/activities",
            &[
                ("startDate", start.to_string()),
                ("endDate", end.to_string()),
                ("activityType", activity_type.to_string()),
            ],
        )
    }

    /// Full detail for a single activity.
    pub fn activity(&self, activity_id: &str) -> Result<Value, ConnectError> {
        self.get(&format!("/activity-service/activity/{activity_id}"), &[])
    }

    /// Aggregated training status (load, balance, VO2 max trend).
    pub fn training_status(&self, date: NaiveDate) -> Result<Value, ConnectError> {
        self.get(
            &format!("/metrics-service/metrics/trainingstatus/aggregated/{date}"),
            &[],
        )
    }

    /// Training readiness score and inputs for one day.
    pub fn training_readiness(&self, date: NaiveDate) -> Result<Value, ConnectError> {
        self.get(
            &format!("/metrics-service/metrics/trainingreadiness/{date}"),
            &[],
        )
    }

    /// Daily max-metrics (VO2 max) entries over a date range.
    pub fn max_metrics(&self, start: NaiveDate, end: NaiveDate) -> Result<Value, ConnectError> {
        self.get(
            &format!("/metrics-service/metrics/maxmet/daily/{start}/{end}"),
            &[],
        )
    }

    /// Latest race time predictions.
    pub fn race_predictions(&self) -> Result<Value, ConnectError> {
        self.get(
            &format!(
                "/metrics-service/metrics/racepredictions/latest/{}",
                self.display_name
            ),
            &[],
        )
    }

    /// Registered devices.
    pub fn devices(&self) -> Result<Value, ConnectError> {
        self.get("/device-service/deviceregistration/devices", &[])
    }

    /// Badges the account has earned.
    pub fn earned_badges(&self) -> Result<Value, ConnectError> {
        self.get("/badge-service/badge/earned", &[])
    }

    /// Personal records.
    pub fn personal_records(&self) -> Result<Value, ConnectError> {
        self.get(
            &format!(
                "/personalrecord-service/personalrecord/prs/{}",
                self.display_name
            ),
            &[],
        )
    }

    /// Pulse oximetry (SpO2) summary for one day.
    pub fn spo2(&self, date: NaiveDate) -> Result<Value, ConnectError> {
        self.get(&format!("/wellness-service/wellness/daily/spo2/{date}"), &[])
    }

    /// Respiration rate summary for one day.
    pub fn respiration(&self, date: NaiveDate) -> Result<Value, ConnectError> {
        self.get(
            &format!("/wellness-service/wellness/daily/respiration/{date}"),
            &[],
        )
    }

    /// Hydration log for one day.
    pub fn hydration(&self, date: NaiveDate) -> Result<Value, ConnectError> {
        self.get(
            &format!("/usersummary-service/usersummary/hydration/allData/{date}"),
            &[],
        )
    }

    // ==================== Request plumbing ====================

    /// Issues an authenticated GET and decodes the JSON response.
    ///
    /// An empty 2xx body decodes to `Value::Null`; Garmin answers some
    /// no-data queries that way instead of returning an empty object.
    fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value, ConnectError> {
        let url = format!("{}{}", self.base_url, path);

        let mut request = self
            .http
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.access_token));
        if !query.is_empty() {
            request = request.query(query);
        }

        let response = request.send()?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ConnectError::Server { status, message });
        }

        let body = response.text()?;
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&body).map_err(|e| ConnectError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connect::SessionTokens;

    fn test_client() -> ConnectClient {
        let tokens = SessionTokens::from_exchange(
            "token".to_string(),
            "Bearer".to_string(),
            None,
            3600,
            None,
        );
        ConnectClient::with_session(&tokens, &Config::default()).unwrap()
    }

    #[test]
    fn test_with_session_uses_default_base_url() {
        let client = test_client();
        assert_eq!(client.base_url(), "https://connectapi.garmin.com");
    }

    #[test]
    fn test_with_session_honors_connect_url_override() {
        let tokens = SessionTokens::from_exchange(
            "token".to_string(),
            "Bearer".to_string(),
            None,
            3600,
            None,
        );
        let config = Config {
            domain: "garmin.com".to_string(),
            connect_url: Some("http://127.0.0.1:9000".to_string()),
        };
        let client = ConnectClient::with_session(&tokens, &config).unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:9000");
    }

    #[test]
    fn test_display_name_empty_before_verify() {
        let client = test_client();
        assert_eq!(client.display_name(), "");
    }
}
