//! Thin wrapper around `reqwest::Client` bound to the marketplace base URL.
//!
//! Requests are issued exactly once: a failed install is recovered by the
//! operator re-triggering it, never by an automatic retry.

use anyhow::{Context, Result};
use log::debug;
use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Marketplace API client.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Wrap the given reqwest client. `base_url` is the server root, e.g.
    /// `https://localhost:5000`.
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET `path` and deserialize the JSON response.
    #[tracing::instrument(skip(self))]
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        debug!("GET {}...", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to send request")?
            .error_for_status()
            .context("Request failed")?;

        response
            .json::<T>()
            .await
            .context("Failed to parse JSON response")
    }

    /// PUT a JSON `body` to `path`. Any 2xx status is success; the
    /// response body is not inspected.
    #[tracing::instrument(skip(self, body))]
    pub async fn put_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<()> {
        let url = self.url(path);
        debug!("PUT {}...", url);

        self.client
            .put(&url)
            .json(body)
            .send()
            .await
            .context("Failed to send request")?
            .error_for_status()
            .context("Request failed")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_json_success() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("GET", "/test")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"name": "test", "value": 42}"#)
            .create_async()
            .await;

        let client = ApiClient::new(Client::new(), server.url());

        #[derive(serde::Deserialize, Debug, PartialEq)]
        struct TestResponse {
            name: String,
            value: i32,
        }

        let result: TestResponse = client.get_json("/test").await.unwrap();

        mock.assert_async().await;
        assert_eq!(result.name, "test");
        assert_eq!(result.value, 42);
    }

    #[tokio::test]
    async fn test_get_json_not_found() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("GET", "/test")
            .with_status(404)
            .create_async()
            .await;

        let client = ApiClient::new(Client::new(), server.url());
        let result: Result<serde_json::Value> = client.get_json("/test").await;

        mock.assert_async().await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_put_json_sends_body_and_content_type() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("PUT", "/install")
            .match_header("content-type", "application/json")
            .match_body(mockito::Matcher::Json(
                serde_json::json!({"name": "Foo", "version": "1.0.0"}),
            ))
            .with_status(200)
            .create_async()
            .await;

        let client = ApiClient::new(Client::new(), server.url());
        client
            .put_json(
                "/install",
                &serde_json::json!({"name": "Foo", "version": "1.0.0"}),
            )
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_put_json_any_2xx_is_success() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("PUT", "/install")
            .with_status(204)
            .create_async()
            .await;

        let client = ApiClient::new(Client::new(), server.url());
        let result = client
            .put_json("/install", &serde_json::json!({}))
            .await;

        mock.assert_async().await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_put_json_server_error_fails_without_retry() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("PUT", "/install")
            .with_status(500)
            .expect(1)
            .create_async()
            .await;

        let client = ApiClient::new(Client::new(), server.url());
        let result = client
            .put_json("/install", &serde_json::json!({}))
            .await;

        mock.assert_async().await;
        assert!(result.is_err());
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = ApiClient::new(Client::new(), "http://localhost:5000/");
        assert_eq!(client.base_url(), "http://localhost:5000");
    }
}
