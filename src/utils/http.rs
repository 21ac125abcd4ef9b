// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use reqwest::{Response, StatusCode};

use crate::error::{AppError, Result};
use crate::models::HttpConfig;

/// Create a configured asynchronous HTTP client.
///
/// The client keeps cookies, so a login carries over to later requests.
pub fn create_client(config: &HttpConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .cookie_store(true)
        .build()?;
    Ok(client)
}

fn ensure_ok(response: &Response, context: &str) -> Result<()> {
    if response.status() != StatusCode::OK {
        return Err(AppError::transport(context, response.status().as_u16()));
    }
    Ok(())
}

/// Read a 200 response with a non-empty text body.
pub async fn read_text(response: Response, context: &str) -> Result<String> {
    ensure_ok(&response, context)?;
    let body = response.text().await?;
    if body.is_empty() {
        return Err(AppError::empty_body(context));
    }
    Ok(body)
}

/// Read a 200 response with a non-empty binary body.
pub async fn read_bytes(response: Response, context: &str) -> Result<Vec<u8>> {
    ensure_ok(&response, context)?;
    let body = response.bytes().await?;
    if body.is_empty() {
        return Err(AppError::empty_body(context));
    }
    Ok(body.to_vec())
}
