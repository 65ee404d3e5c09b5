//! OAuth2 authorization-code flow against Google's token endpoint

use anyhow::Result;
use reqwest::Client;
use serde::Deserialize;

use super::upstream_error;

pub const AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const OOB_REDIRECT_URI: &str = "urn:ietf:wg:oauth:2.0:oob";
pub const CALENDAR_SCOPES: [&str; 2] = [
    "https://www.googleapis.com/auth/calendar",
    "https://www.googleapis.com/auth/calendar.events",
];

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: Option<u64>,
    // Only present on the first consent with access_type=offline
    pub refresh_token: Option<String>,
    pub scope: Option<String>,
    pub token_type: Option<String>,
}

/// URL the user opens to grant calendar access. Forces the consent
/// screen so Google hands back a refresh token every time.
pub fn authorization_url(client_id: &str, redirect_uri: &str, scopes: &[&str]) -> String {
    format!(
        "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=offline&prompt=consent",
        AUTHORIZE_URL,
        urlencoding::encode(client_id),
        urlencoding::encode(redirect_uri),
        urlencoding::encode(&scopes.join(" "))
    )
}

pub async fn exchange_code_for_token(
    client: &Client,
    oauth_url: &str,
    client_id: &str,
    client_secret: &str,
    code: &str,
    redirect_uri: &str,
) -> Result<TokenResponse> {
    let params = [
        ("client_id", client_id),
        ("client_secret", client_secret),
        ("code", code),
        ("redirect_uri", redirect_uri),
        ("grant_type", "authorization_code"),
    ];
    request_token(client, oauth_url, &params).await
}

pub async fn refresh_access_token(
    client: &Client,
    oauth_url: &str,
    client_id: &str,
    client_secret: &str,
    refresh_token: &str,
) -> Result<TokenResponse> {
    let params = [
        ("client_id", client_id),
        ("client_secret", client_secret),
        ("refresh_token", refresh_token),
        ("grant_type", "refresh_token"),
    ];
    request_token(client, oauth_url, &params).await
}

async fn request_token(
    client: &Client,
    oauth_url: &str,
    params: &[(&str, &str)],
) -> Result<TokenResponse> {
    let url = format!("{}/token", oauth_url.trim_end_matches('/'));
    let res = client.post(&url).form(params).send().await?;
    let status = res.status();
    let text = res.text().await.unwrap_or_default();
    if !status.is_success() {
        tracing::error!("Token request failed: {} ({})", status, text);
        return Err(upstream_error(status.as_u16(), &text).into());
    }
    let token: TokenResponse = serde_json::from_str(&text)?;
    Ok(token)
}
