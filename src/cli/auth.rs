use std::env;
use std::io::{self, Write};

use anyhow::{Context, Result};
use reqwest::Client;

use crate::core::{ToolError, config::DEFAULT_OAUTH_URL};
use crate::google::oauth::{
    CALENDAR_SCOPES, OOB_REDIRECT_URI, authorization_url, exchange_code_for_token,
};

fn var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin()
        .read_line(&mut line)
        .context("Failed to read from stdin")?;
    Ok(line.trim().to_owned())
}

pub async fn run() -> Result<()> {
    let (client_id, client_secret) =
        match (var("GOOGLE_CLIENT_ID"), var("GOOGLE_CLIENT_SECRET")) {
            (Some(id), Some(secret)) => (id, secret),
            (id, secret) => {
                let mut missing = Vec::new();
                if id.is_none() {
                    missing.push("GOOGLE_CLIENT_ID".to_string());
                }
                if secret.is_none() {
                    missing.push("GOOGLE_CLIENT_SECRET".to_string());
                }
                return Err(ToolError::ConfigurationMissing(missing).into());
            }
        };
    let redirect_uri = var("GOOGLE_REDIRECT_URI").unwrap_or_else(|| OOB_REDIRECT_URI.to_string());
    let oauth_url = var("GOOGLE_OAUTH_URL").unwrap_or_else(|| DEFAULT_OAUTH_URL.to_string());

    let auth_url = authorization_url(&client_id, &redirect_uri, &CALENDAR_SCOPES);
    println!(
        "\nPlease open the following URL in your browser and authorize access:\n\n{}\n",
        auth_url
    );
    let code = prompt("Paste the authorization code shown by Google here: ")?;
    if code.is_empty() {
        return Err(ToolError::invalid("code", "no authorization code entered").into());
    }

    let client = Client::new();
    let token = exchange_code_for_token(
        &client,
        &oauth_url,
        &client_id,
        &client_secret,
        &code,
        &redirect_uri,
    )
    .await?;

    match token.refresh_token {
        Some(refresh_token) => {
            println!("\nRefresh token: {}", refresh_token);
            println!("Save this token in your .env as GOOGLE_REFRESH_TOKEN");
        }
        None => {
            eprintln!(
                "No refresh token was returned. Revoke the app's access in your Google account and run auth again."
            );
        }
    }
    Ok(())
}
