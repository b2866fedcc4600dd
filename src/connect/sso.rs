//! Interactive SSO login flow for Garmin Connect.
//!
//! Garmin has no public password grant; clients walk the embedded
//! browser sign-on instead: prime the embed widget so the SSO cookie
//! jar is populated, scrape the CSRF token from the sign-in page, post
//! credentials (plus an MFA code when the account requires one), then
//! trade the resulting service ticket for an OAuth2 bundle at the
//! Connect OAuth service.

use regex::Regex;
use reqwest::blocking::{Client, Response};
use serde_json::Value;
use std::io;
use std::time::Duration;

use super::session::SessionTokens;
use super::{connect_api_url, sso_url, ConnectError, USER_AGENT};

/// Timeout for establishing a connection.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for each SSO round-trip.
const SSO_TIMEOUT: Duration = Duration::from_secs(30);

/// Hidden CSRF input on the sign-in and MFA pages.
const CSRF_PATTERN: &str = r#"name="_csrf"\s+value="([^"]+)""#;

/// Service ticket embedded in the post-login response script.
const TICKET_PATTERN: &str = r#"embed\?ticket=([^"]+)""#;

/// Page title, used to detect the MFA interstitial.
const TITLE_PATTERN: &str = r"<title>([^<]*)</title>";

/// Runs the full SSO flow and returns a fresh token bundle.
///
/// `prompt_mfa` is only invoked when Garmin interposes the MFA page;
/// it should block until the user supplies their one-time code.
pub fn login(
    email: &str,
    password: &str,
    domain: &str,
    prompt_mfa: impl FnOnce() -> io::Result<String>,
) -> Result<SessionTokens, ConnectError> {
    let sso = sso_url(domain);
    let embed_url = format!("{sso}/embed");
    let signin_url = format!("{sso}/signin");
    let mfa_url = format!("{sso}/verifyMFA/loginEnterMfaCode");
    let exchange_url = format!(
        "{}/oauth-service/oauth/exchange/user/2.0",
        connect_api_url(domain)
    );

    let http = Client::builder()
        .cookie_store(true)
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(SSO_TIMEOUT)
        .user_agent(USER_AGENT)
        .build()?;

    // Prime the widget; Garmin rejects sign-in posts without its cookies.
    let embed_params = [
        ("id", "gauth-widget"),
        ("embedWidget", "true"),
        ("gauthHost", sso.as_str()),
    ];
    get_page(&http, &embed_url, &embed_params)?;

    let signin_params = [
        ("id", "gauth-widget"),
        ("embedWidget", "true"),
        ("gauthHost", embed_url.as_str()),
        ("service", embed_url.as_str()),
        ("source", embed_url.as_str()),
        ("redirectAfterAccountLoginUrl", embed_url.as_str()),
        ("redirectAfterAccountCreationUrl", embed_url.as_str()),
    ];
    let page = get_page(&http, &signin_url, &signin_params)?;
    let csrf = extract(CSRF_PATTERN, &page).ok_or_else(|| {
        ConnectError::AuthFailed("no CSRF token on the sign-in page".to_string())
    })?;

    tracing::debug!("submitting credentials to {signin_url}");
    let form = [
        ("username", email),
        ("password", password),
        ("embed", "true"),
        ("_csrf", csrf.as_str()),
    ];
    let mut body = post_form(&http, &signin_url, &signin_params, &form, &signin_url)?;

    if page_title(&body).is_some_and(|title| title.contains("MFA")) {
        tracing::debug!("account requires MFA");
        let code = prompt_mfa()
            .map_err(|e| ConnectError::AuthFailed(format!("could not read MFA code: {e}")))?;
        let code = code.trim().to_string();
        let csrf = extract(CSRF_PATTERN, &body).ok_or_else(|| {
            ConnectError::AuthFailed("no CSRF token on the MFA page".to_string())
        })?;

        let form = [
            ("mfa-code", code.as_str()),
            ("embed", "true"),
            ("_csrf", csrf.as_str()),
            ("fromPage", "setupEnterMfaCode"),
        ];
        body = post_form(&http, &mfa_url, &signin_params, &form, &signin_url)?;
    }

    let ticket = extract(TICKET_PATTERN, &body).ok_or_else(|| {
        ConnectError::AuthFailed(
            "Garmin did not issue a service ticket; check your email and password".to_string(),
        )
    })?;

    exchange(&http, &exchange_url, &embed_url, &ticket)
}

/// Trades the SSO service ticket for an OAuth2 token bundle.
fn exchange(
    http: &Client,
    url: &str,
    login_url: &str,
    ticket: &str,
) -> Result<SessionTokens, ConnectError> {
    let form = [
        ("ticket", ticket),
        ("login-url", login_url),
        ("accepts-mfa-tokens", "true"),
    ];

    let response = http.post(url).form(&form).send()?;

    if !response.status().is_success() {
        let status = response.status().as_u16();
        let message = response
            .text()
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(ConnectError::Server { status, message });
    }

    let payload: Value = response
        .json()
        .map_err(|e| ConnectError::Decode(e.to_string()))?;

    let access_token = payload
        .get("access_token")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            ConnectError::AuthFailed("token exchange response missing access_token".to_string())
        })?
        .to_string();
    let token_type = payload
        .get("token_type")
        .and_then(Value::as_str)
        .unwrap_or("Bearer")
        .to_string();
    let refresh_token = payload
        .get("refresh_token")
        .and_then(Value::as_str)
        .map(str::to_string);
    let expires_in = payload
        .get("expires_in")
        .and_then(Value::as_i64)
        .unwrap_or(3600);
    let refresh_token_expires_in = payload
        .get("refresh_token_expires_in")
        .and_then(Value::as_i64);

    Ok(SessionTokens::from_exchange(
        access_token,
        token_type,
        refresh_token,
        expires_in,
        refresh_token_expires_in,
    ))
}

// ==================== Page plumbing ====================

fn get_page(http: &Client, url: &str, query: &[(&str, &str)]) -> Result<String, ConnectError> {
    let response = http.get(url).query(query).send()?;
    read_body(response)
}

fn post_form(
    http: &Client,
    url: &str,
    query: &[(&str, &str)],
    form: &[(&str, &str)],
    referer: &str,
) -> Result<String, ConnectError> {
    let response = http
        .post(url)
        .query(query)
        .form(form)
        .header("referer", referer)
        .send()?;
    read_body(response)
}

fn read_body(response: Response) -> Result<String, ConnectError> {
    if !response.status().is_success() {
        let status = response.status().as_u16();
        let message = response
            .text()
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(ConnectError::Server { status, message });
    }

    Ok(response.text()?)
}

/// Returns the first capture of `pattern` in `html`.
fn extract(pattern: &str, html: &str) -> Option<String> {
    let re = Regex::new(pattern).ok()?;
    Some(re.captures(html)?.get(1)?.as_str().to_string())
}

fn page_title(html: &str) -> Option<String> {
    extract(TITLE_PATTERN, html)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_csrf_token() {
        let html = r#"<form><input type="hidden" name="_csrf" value="token-4f2a" /></form>"#;
        assert_eq!(extract(CSRF_PATTERN, html), Some("token-4f2a".to_string()));
    }

    #[test]
    fn test_extract_service_ticket() {
        let html = r#"var response_url = "https://sso.garmin.com/sso/embed?ticket=ST-012345-abcdef-cas";"#;
        assert_eq!(
            extract(TICKET_PATTERN, html),
            Some("ST-012345-abcdef-cas".to_string())
        );
    }

    #[test]
    fn test_extract_missing_returns_none() {
        assert_eq!(extract(CSRF_PATTERN, "<html></html>"), None);
        assert_eq!(extract(TICKET_PATTERN, "no ticket here"), None);
    }

    #[test]
    fn test_page_title() {
        let html = "<html><head><title>MFA Required</title></head></html>";
        assert_eq!(page_title(html), Some("MFA Required".to_string()));
    }

    #[test]
    fn test_page_title_success_page() {
        let html = "<head><title>Success</title></head>";
        assert!(page_title(html).is_some_and(|t| !t.contains("MFA")));
    }
}
