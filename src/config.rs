//! Client configuration: server URL resolution and the authenticated
//! HTTP client.

use anyhow::Result;
use log::debug;
use reqwest::{
    Client,
    header::{AUTHORIZATION, HeaderMap, HeaderValue},
};
use std::env;

use crate::http::ApiClient;

/// Default marketplace server, the management service's local address.
pub const DEFAULT_SERVER_URL: &str = "https://localhost:5000";

/// Environment variable carrying the API bearer token.
pub const TOKEN_ENV: &str = "MARKETPLACE_TOKEN";

pub struct Config {
    pub api: ApiClient,
}

impl Config {
    /// Build the API client. If `MARKETPLACE_TOKEN` is set it is sent as a
    /// bearer token on every request; session management itself is the
    /// auth layer's concern.
    pub fn new(server_url: Option<String>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Ok(token) = env::var(TOKEN_ENV) {
            let mut auth_value = HeaderValue::from_str(&format!("Bearer {}", token))?;
            auth_value.set_sensitive(true);
            headers.insert(AUTHORIZATION, auth_value);
            debug!("Using {} for authentication", TOKEN_ENV);
        }

        let client = Client::builder()
            .user_agent("plugmart-cli")
            .default_headers(headers)
            .build()?;

        let base_url = server_url.unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());

        Ok(Self {
            api: ApiClient::new(client, base_url),
        })
    }
}
